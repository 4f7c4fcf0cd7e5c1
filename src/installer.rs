/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::installer
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Orchestrate resolve → already-installed check → download
    → extract → metadata for a package query, exactly once.

  Security / Safety Notes:
    Metadata is written into the staged tree before it is
    renamed into place, so an install directory is never
    visible without its `meta` file.

  Dependencies:
    tempfile for the scratch download area, tokio for the
    blocking extraction worker.

  Operational Scope:
    Backs VersionManager::install and use_or_install.

  Revision History:
    2026-10-16 COD  Authored installation pipeline.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Idempotent installs keyed by archive name
    - Already-present reported as an outcome, not an error
============================================================*/

use crate::cancel::{cancellable, ensure_active};
use crate::catalog::archive_filename;
use crate::error::{Result, SynjdkError};
use crate::extract;
use crate::manager::VersionManager;
use crate::metadata;
use crate::package_info::InstalledPackage;
use crate::query::{PackageQuery, SUPPORTED_ARCHIVE_TYPE};
use crate::resolver;

/// Result of [`VersionManager::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Downloaded and extracted by this call.
    Installed(InstalledPackage),
    /// Already present under the install root; nothing was downloaded.
    AlreadyPresent(InstalledPackage),
}

impl InstallOutcome {
    pub fn package(&self) -> &InstalledPackage {
        match self {
            InstallOutcome::Installed(package) | InstallOutcome::AlreadyPresent(package) => {
                package
            }
        }
    }

    pub fn into_package(self) -> InstalledPackage {
        match self {
            InstallOutcome::Installed(package) | InstallOutcome::AlreadyPresent(package) => {
                package
            }
        }
    }

    pub fn already_installed(&self) -> bool {
        matches!(self, InstallOutcome::AlreadyPresent(_))
    }
}

/// Install directory name for a download URL: its file name minus `.zip`.
pub fn install_dir_name(download_url: &str) -> Result<String> {
    let filename = archive_filename(download_url).ok_or_else(|| {
        SynjdkError::Resolution(format!("Download URL {download_url} has no file name"))
    })?;
    let suffix = format!(".{SUPPORTED_ARCHIVE_TYPE}");
    let name = filename.strip_suffix(&suffix).unwrap_or(&filename);

    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0']);
    if !valid {
        return Err(SynjdkError::Resolution(format!(
            "Download URL {download_url} yields unusable install directory `{name}`"
        )));
    }
    Ok(name.to_string())
}

impl VersionManager {
    /// Install the first catalog package matching `query`, unless an
    /// installation with the same archive name already exists.
    pub async fn install(&self, query: &PackageQuery) -> Result<InstallOutcome> {
        ensure_active(&self.cancel)?;

        let descriptor =
            cancellable(&self.cancel, resolver::resolve(self.catalog.as_ref(), query)).await?;
        self.logger.info(
            "RESOLVE",
            format!(
                "{query} → {} ({} {})",
                descriptor.id, descriptor.distribution, descriptor.java_version
            ),
        );

        let url = cancellable(
            &self.cancel,
            self.catalog.resolve_download_url(&descriptor.id),
        )
        .await?;
        let dir_name = install_dir_name(&url)?;
        let install_dir = self.root.join(&dir_name);

        let _lock = self.lock_root().await?;

        if metadata::exists(&install_dir)? {
            let stored = metadata::load(&install_dir).map_err(|err| SynjdkError::CorruptedState {
                path: install_dir.clone(),
                reason: err.to_string(),
            })?;
            self.logger.info(
                "INSTALL",
                format!("{dir_name} already present at {}", install_dir.display()),
            );
            return Ok(InstallOutcome::AlreadyPresent(InstalledPackage::at(
                stored,
                install_dir,
            )));
        }
        if std::fs::symlink_metadata(&install_dir).is_ok() {
            return Err(SynjdkError::CorruptedState {
                path: install_dir,
                reason: "install directory exists without metadata".into(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("synjdk-download-")
            .tempdir()
            .map_err(|err| {
                SynjdkError::Filesystem(format!("Failed to create download scratch area: {err}"))
            })?;
        let archive = scratch
            .path()
            .join(format!("{dir_name}.{SUPPORTED_ARCHIVE_TYPE}"));

        self.logger
            .info("INSTALL", format!("Downloading {} from {url}", descriptor.id));
        let bytes = cancellable(&self.cancel, self.downloader.download(&url, &archive)).await?;
        self.logger.debug(
            "INSTALL",
            format!("Fetched {bytes} bytes into {}", archive.display()),
        );

        let root = self.root.clone();
        let token = self.cancel.clone();
        let staged_archive = archive.clone();
        let staged = tokio::task::spawn_blocking(move || {
            extract::stage(&staged_archive, &root, &token)
        })
        .await
        .map_err(|err| SynjdkError::Runtime(format!("Extraction task failed: {err}")))??;
        self.logger.debug(
            "EXTRACT",
            format!("Staged {} at {}", dir_name, staged.content().display()),
        );

        metadata::save(&descriptor, staged.content())?;
        self.logger.debug(
            "METADATA",
            format!("Recorded {} for {dir_name}", metadata::META_FILE_NAME),
        );
        let java_dir = staged.commit(&install_dir)?;
        drop(scratch);

        self.logger.info(
            "INSTALL",
            format!("Installed {} at {}", descriptor.id, java_dir.display()),
        );
        Ok(InstallOutcome::Installed(InstalledPackage::at(
            descriptor, java_dir,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_info::PackageDescriptor;

    #[test]
    fn dir_name_strips_zip_suffix() {
        assert_eq!(
            install_dir_name("https://cdn.azul.com/zulu/bin/zulu8.zip").unwrap(),
            "zulu8"
        );
        assert_eq!(
            install_dir_name("https://cdn.example/jdk-21.0.2_linux-x64_bin.zip?sig=1").unwrap(),
            "jdk-21.0.2_linux-x64_bin"
        );
    }

    #[test]
    fn dir_name_keeps_other_suffixes() {
        assert_eq!(
            install_dir_name("https://cdn.example/openjdk.tar.gz").unwrap(),
            "openjdk.tar.gz"
        );
    }

    #[test]
    fn dir_name_rejects_unusable_names() {
        for url in [
            "https://cdn.example/",
            "https://cdn.example/.zip",
            "https://cdn.example/..zip",
            "https://cdn.example/%2E%2E",
            "not a url",
        ] {
            let err = install_dir_name(url).unwrap_err();
            assert!(matches!(err, SynjdkError::Resolution(_)), "{url}");
        }
    }

    #[test]
    fn outcome_accessors() {
        let package = InstalledPackage::at(PackageDescriptor::default(), "/srv/jdks/zulu8");
        let fresh = InstallOutcome::Installed(package.clone());
        let again = InstallOutcome::AlreadyPresent(package.clone());
        assert!(!fresh.already_installed());
        assert!(again.already_installed());
        assert_eq!(again.package(), &package);
        assert_eq!(fresh.into_package(), package);
    }
}
