/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::registry
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Enumerate, look up, select and remove installed runtimes
    under the install root.

  Security / Safety Notes:
    Removal only touches direct, non-hidden children of the
    root and makes the directory disappear with one rename
    before its contents are deleted.

  Dependencies:
    tempfile for the trash directory.

  Operational Scope:
    Read paths are lock-free; removal shares the install lock.

  Revision History:
    2026-10-16 COD  Implemented local registry.
  ------------------------------------------------------------
  SSE Principles Observed:
    - The filesystem is the only source of truth
    - Stable ordering by install directory name
============================================================*/

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SynjdkError};
use crate::installer::InstallOutcome;
use crate::manager::VersionManager;
use crate::metadata;
use crate::package_info::InstalledPackage;
use crate::platform;
use crate::query::PackageQuery;

const TRASH_PREFIX: &str = ".trash-";

impl VersionManager {
    /// All installs under the root, ordered by directory name.
    pub async fn list(&self) -> Result<Vec<InstalledPackage>> {
        let root = self.root.clone();
        let packages = tokio::task::spawn_blocking(move || scan_root(&root))
            .await
            .map_err(|err| SynjdkError::Runtime(format!("Registry scan task failed: {err}")))??;
        self.logger.debug(
            "REGISTRY",
            format!("{} install(s) under {}", packages.len(), self.root.display()),
        );
        Ok(packages)
    }

    /// The install whose descriptor carries `id`.
    pub async fn get_by_id(&self, id: &str) -> Result<InstalledPackage> {
        self.list()
            .await?
            .into_iter()
            .find(|package| package.id() == id)
            .ok_or_else(|| SynjdkError::NotFound(format!("package id {id}")))
    }

    /// First install of `distribution` at `major_version`.
    pub async fn find(&self, distribution: &str, major_version: u32) -> Result<InstalledPackage> {
        self.list()
            .await?
            .into_iter()
            .find(|package| {
                package.distribution() == distribution && package.major_version() == major_version
            })
            .ok_or_else(|| {
                SynjdkError::NotFound(format!("{distribution} {major_version} is not installed"))
            })
    }

    /// Return an installed match, installing one for the host platform if absent.
    pub async fn use_or_install(
        &self,
        distribution: &str,
        major_version: u32,
    ) -> Result<InstalledPackage> {
        match self.find(distribution, major_version).await {
            Ok(package) => {
                self.logger.debug(
                    "REGISTRY",
                    format!("Using {} at {}", package.id(), package.java_dir.display()),
                );
                Ok(package)
            }
            Err(err) if err.is_not_found() => {
                let query = PackageQuery::new()
                    .distribution(distribution)
                    .jdk_version(major_version)
                    .operating_system(platform::host_os())
                    .architecture(platform::host_arch());
                self.install(&query).await.map(InstallOutcome::into_package)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete an install from the root.
    pub async fn remove(&self, package: &InstalledPackage) -> Result<()> {
        let target = self.install_path_of(package)?;
        let _lock = self.lock_root().await?;

        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(SynjdkError::CorruptedState {
                    path: target,
                    reason: "install entry is not a directory".into(),
                })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(SynjdkError::NotFound(format!(
                    "{} is not installed",
                    target.display()
                )))
            }
            Err(err) => {
                return Err(SynjdkError::Filesystem(format!(
                    "Failed to stat {}: {err}",
                    target.display()
                )))
            }
        }

        let trash = tempfile::Builder::new()
            .prefix(TRASH_PREFIX)
            .tempdir_in(&self.root)
            .map_err(|err| {
                SynjdkError::Filesystem(format!(
                    "Failed to create trash directory in {}: {err}",
                    self.root.display()
                ))
            })?;
        let parked = trash.path().join(package.dir_name());
        // Moving a directory to a new parent needs write access to it.
        grant_owner_access(&target).map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to unlock {} for removal: {err}",
                target.display()
            ))
        })?;
        fs::rename(&target, &parked).map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to move {} out of the root: {err}",
                target.display()
            ))
        })?;
        self.logger.info(
            "REMOVE",
            format!("Removed {} from {}", package.id(), target.display()),
        );

        let trash_path = trash.path().to_path_buf();
        make_removable(&parked).map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to unlock {} for deletion: {err}",
                parked.display()
            ))
        })?;
        trash.close().map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to delete {}: {err}",
                trash_path.display()
            ))
        })
    }

    /// `java_dir` of `package`, accepted only as a direct, non-hidden child of the root.
    fn install_path_of(&self, package: &InstalledPackage) -> Result<PathBuf> {
        let name = package.dir_name();
        let inside = package.java_dir.parent() == Some(self.root.as_path())
            && !name.is_empty()
            && !name.starts_with('.');
        if !inside {
            return Err(SynjdkError::Filesystem(format!(
                "Refusing to remove {}: not an install under {}",
                package.java_dir.display(),
                self.root.display()
            )));
        }
        Ok(self.root.join(name))
    }
}

/// Give the owner full access to `path` if it is a directory. Returns
/// whether it was one.
#[cfg(unix)]
fn grant_owner_access(path: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let meta = fs::symlink_metadata(path)?;
    if !meta.is_dir() {
        return Ok(false);
    }
    let mode = meta.permissions().mode();
    if mode & 0o700 != 0o700 {
        fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o700))?;
    }
    Ok(true)
}

#[cfg(not(unix))]
fn grant_owner_access(path: &Path) -> std::io::Result<bool> {
    Ok(fs::symlink_metadata(path)?.is_dir())
}

/// Open up every directory below `dir`, so archives shipped with read-only
/// directories can still be deleted.
fn make_removable(dir: &Path) -> std::io::Result<()> {
    if grant_owner_access(dir)? {
        for entry in fs::read_dir(dir)? {
            make_removable(&entry?.path())?;
        }
    }
    Ok(())
}

fn scan_root(root: &Path) -> Result<Vec<InstalledPackage>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(SynjdkError::Filesystem(format!(
                "Failed to read install root {}: {err}",
                root.display()
            )))
        }
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            SynjdkError::Filesystem(format!("Failed to read {}: {err}", root.display()))
        })?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let file_type = entry.file_type().map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to stat {}: {err}",
                entry.path().display()
            ))
        })?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    dirs.into_iter()
        .map(|dir| {
            let descriptor = metadata::load(&dir).map_err(|err| SynjdkError::CorruptedState {
                path: dir.clone(),
                reason: err.to_string(),
            })?;
            Ok(InstalledPackage::at(descriptor, dir))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_info::PackageDescriptor;
    use tempfile::tempdir;

    fn install_fixture(root: &Path, dir: &str, id: &str, distribution: &str, major: u32) {
        let path = root.join(dir);
        fs::create_dir_all(path.join("bin")).unwrap();
        let descriptor = PackageDescriptor {
            id: id.into(),
            distribution: distribution.into(),
            major_version: major,
            ..PackageDescriptor::default()
        };
        metadata::save(&descriptor, &path).unwrap();
    }

    #[test]
    fn scan_skips_hidden_and_plain_files() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "zulu8", "a", "zulu", 8);
        fs::create_dir(dir.path().join(".staging-x")).unwrap();
        fs::write(dir.path().join(".lock"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();

        let packages = scan_root(dir.path()).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].dir_name(), "zulu8");
    }

    #[test]
    fn scan_orders_by_directory_name() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "temurin21", "b", "temurin", 21);
        install_fixture(dir.path(), "corretto17", "c", "corretto", 17);
        install_fixture(dir.path(), "zulu8", "a", "zulu", 8);

        let names: Vec<_> = scan_root(dir.path())
            .unwrap()
            .iter()
            .map(|package| package.dir_name().to_string())
            .collect();
        assert_eq!(names, ["corretto17", "temurin21", "zulu8"]);
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempdir().unwrap();
        assert!(scan_root(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn directory_without_metadata_is_corrupted() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "zulu8", "a", "zulu", 8);
        fs::create_dir(dir.path().join("stray")).unwrap();

        match scan_root(dir.path()).unwrap_err() {
            SynjdkError::CorruptedState { path, .. } => assert!(path.ends_with("stray")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
