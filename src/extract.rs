/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::extract
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Unpack downloaded zip archives into the install root,
    all-or-nothing, rejecting entries that escape it.

  Security / Safety Notes:
    Every entry name is validated before the first byte is
    written; absolute paths and `..` climbs above the target
    abort the whole extraction (zip-slip). Work happens in a
    hidden staging directory that is renamed into place only
    after every entry succeeded.

  Dependencies:
    zip for archive decoding, tempfile for staging areas.

  Operational Scope:
    Invoked by the installer on a blocking worker thread.

  Revision History:
    2026-10-16 COD  Implemented staged zip extraction.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Validate before mutate
    - No half-populated directories survive a failure
============================================================*/

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::cancel::{ensure_active, CancellationToken};
use crate::error::{Result, SynjdkError};

/// Prefix of the hidden staging directories created inside the destination.
pub const STAGING_PREFIX: &str = ".staging-";

/// Extract `archive` into `destination`.
///
/// Top-level entries of the archive appear in `destination` only once the
/// whole archive has been unpacked. Returns the number of entries written.
pub fn extract(archive: &Path, destination: &Path, cancel: &CancellationToken) -> Result<usize> {
    let staging = staging_dir(destination)?;
    let unpacked = unpack(archive, staging.path(), destination, cancel)?;

    let mut moves = Vec::new();
    for entry in read_dir(staging.path())? {
        let target = destination.join(entry.file_name());
        if target.exists() {
            return Err(SynjdkError::Filesystem(format!(
                "Refusing to overwrite existing {}",
                target.display()
            )));
        }
        moves.push((entry.path(), target));
    }
    move_all(&moves)?;
    unpacked.dir_modes.apply_under(staging.path(), destination)?;
    Ok(unpacked.entries)
}

/// An archive unpacked into a hidden staging directory, not yet visible.
///
/// Directory modes stored in the archive are held back until [`commit`],
/// so the content stays writable for the caller in the meantime.
///
/// [`commit`]: StagedTree::commit
#[derive(Debug)]
pub struct StagedTree {
    staging: TempDir,
    content: PathBuf,
    dir_modes: DirModes,
}

impl StagedTree {
    /// Directory that will become the install directory on commit.
    pub fn content(&self) -> &Path {
        &self.content
    }

    /// Rename the staged content to `target`, which must not exist yet, then
    /// apply the archive's directory modes there.
    pub fn commit(self, target: &Path) -> Result<PathBuf> {
        if target.exists() {
            return Err(SynjdkError::CorruptedState {
                path: target.to_path_buf(),
                reason: "install directory already exists".into(),
            });
        }
        let StagedTree {
            staging,
            content,
            dir_modes,
        } = self;
        rename(&content, target)?;
        // The staging root may now be gone; TempDir ignores the failed cleanup.
        drop(staging);
        dir_modes.apply_under(&content, target)?;
        Ok(target.to_path_buf())
    }
}

/// Unpack `archive` into a staging directory under `root`.
///
/// An archive with a single top-level directory stages that directory as the
/// content; any other layout stages the whole tree.
pub fn stage(archive: &Path, root: &Path, cancel: &CancellationToken) -> Result<StagedTree> {
    let staging = staging_dir(root)?;
    let unpacked = unpack(archive, staging.path(), root, cancel)?;
    ensure_active(cancel)?;

    let entries = read_dir(staging.path())?;
    let content = match entries.as_slice() {
        [single] if single.path().is_dir() => single.path(),
        _ => staging.path().to_path_buf(),
    };
    Ok(StagedTree {
        staging,
        content,
        dir_modes: unpacked.dir_modes,
    })
}

/// Extract `archive` so that its content ends up at `root/name`.
pub fn extract_as(
    archive: &Path,
    root: &Path,
    name: &str,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    stage(archive, root, cancel)?.commit(&root.join(name))
}

fn staging_dir(parent: &Path) -> Result<TempDir> {
    std::fs::create_dir_all(parent).map_err(|err| {
        SynjdkError::Filesystem(format!("Failed to create {}: {err}", parent.display()))
    })?;
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to create staging directory in {}: {err}",
                parent.display()
            ))
        })
}

/// Rename every `(source, target)` pair; a failure moves the earlier ones back.
fn move_all(moves: &[(PathBuf, PathBuf)]) -> Result<()> {
    for (done, (source, target)) in moves.iter().enumerate() {
        if let Err(err) = rename(source, target) {
            for (source, target) in moves[..done].iter().rev() {
                let _ = std::fs::rename(target, source);
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Stored directory modes, applied after the tree reaches its final place.
#[derive(Debug, Default)]
struct DirModes(Vec<(PathBuf, u32)>);

impl DirModes {
    /// Apply each mode to its path relocated from `from` to `to`.
    fn apply_under(mut self, from: &Path, to: &Path) -> Result<()> {
        // Deepest first so restrictive parents do not block their children.
        self.0.sort_by_key(|(dir, _)| std::cmp::Reverse(dir.components().count()));
        for (dir, mode) in &self.0 {
            let relocated = match dir.strip_prefix(from) {
                Ok(rest) if rest.as_os_str().is_empty() => to.to_path_buf(),
                Ok(rest) => to.join(rest),
                Err(_) => dir.clone(),
            };
            apply_mode(&relocated, *mode)?;
        }
        Ok(())
    }
}

struct PlannedEntry {
    index: usize,
    target: PathBuf,
    is_dir: bool,
    mode: Option<u32>,
}

struct Unpacked {
    entries: usize,
    dir_modes: DirModes,
}

/// Unpack every entry of `archive` under `into`. `reported` names the
/// destination in traversal errors.
fn unpack(
    archive: &Path,
    into: &Path,
    reported: &Path,
    cancel: &CancellationToken,
) -> Result<Unpacked> {
    let file = File::open(archive).map_err(|err| {
        SynjdkError::Filesystem(format!("Failed to open archive {}: {err}", archive.display()))
    })?;
    let mut zip = ZipArchive::new(file).map_err(|err| invalid_archive(archive, err))?;

    let mut plan = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip
            .by_index_raw(index)
            .map_err(|err| invalid_archive(archive, err))?;
        let is_dir = entry.is_dir();
        let target = match entry.enclosed_name().map(|relative| into.join(relative)) {
            Some(target) if is_dir || target != into => target,
            _ => {
                return Err(SynjdkError::PathTraversal {
                    entry: entry.name().to_string(),
                    destination: reported.to_path_buf(),
                })
            }
        };
        plan.push(PlannedEntry {
            index,
            target,
            is_dir,
            mode: entry.unix_mode(),
        });
    }

    let mut dir_modes = DirModes::default();
    for planned in &plan {
        ensure_active(cancel)?;
        if planned.is_dir {
            create_dir_all(&planned.target)?;
            if let Some(mode) = planned.mode {
                dir_modes.0.push((planned.target.clone(), mode));
            }
            continue;
        }

        if let Some(parent) = planned.target.parent() {
            create_dir_all(parent)?;
        }
        let mut entry = zip
            .by_index(planned.index)
            .map_err(|err| invalid_archive(archive, err))?;
        let mut out = open_truncating(&planned.target, planned.mode)?;
        io::copy(&mut entry, &mut out).map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to write {}: {err}",
                planned.target.display()
            ))
        })?;
        drop(out);
        if let Some(mode) = planned.mode {
            apply_mode(&planned.target, mode)?;
        }
    }

    Ok(Unpacked {
        entries: plan.len(),
        dir_modes,
    })
}

fn invalid_archive(archive: &Path, err: zip::result::ZipError) -> SynjdkError {
    SynjdkError::Serialization(format!("Invalid archive {}: {err}", archive.display()))
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>> {
    let entries = std::fs::read_dir(dir).map_err(|err| {
        SynjdkError::Filesystem(format!("Failed to read {}: {err}", dir.display()))
    })?;
    let mut collected = Vec::new();
    for entry in entries {
        collected.push(entry?);
    }
    Ok(collected)
}

fn rename(source: &Path, target: &Path) -> Result<()> {
    std::fs::rename(source, target).map_err(|err| {
        SynjdkError::Filesystem(format!(
            "Failed to move {} to {}: {err}",
            source.display(),
            target.display()
        ))
    })
}

fn create_dir_all(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| {
        SynjdkError::Filesystem(format!("Failed to create {}: {err}", dir.display()))
    })
}

fn open_truncating(path: &Path, mode: Option<u32>) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if let Some(mode) = mode {
            options.mode(mode & 0o777);
        }
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path).map_err(|err| {
        SynjdkError::Filesystem(format!("Failed to create {}: {err}", path.display()))
    })
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o777)).map_err(
        |err| {
            SynjdkError::Filesystem(format!(
                "Failed to set permissions on {}: {err}",
                path.display()
            ))
        },
    )
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn build_zip(path: &Path, entries: &[(&str, Option<&[u8]>)]) {
        build_zip_with_mode(path, entries, 0o755);
    }

    fn build_zip_with_mode(path: &Path, entries: &[(&str, Option<&[u8]>)], mode: u32) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default().unix_permissions(mode);
        for (name, content) in entries {
            match content {
                None => writer.add_directory(*name, options).unwrap(),
                Some(bytes) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(bytes).unwrap();
                }
            }
        }
        writer.finish().unwrap();
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    fn set_mode(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn escaping_entries_are_rejected() {
        for name in ["../../evil", "zulu8/../../evil", "zulu8/bin/../../../evil"] {
            let work = tempdir().unwrap();
            let archive = work.path().join("evil.zip");
            build_zip(&archive, &[("zulu8/bin/java", Some(b"java")), (name, Some(b"pwned"))]);
            let dest = work.path().join("a").join("b").join("root");

            let err = extract(&archive, &dest, &CancellationToken::new()).unwrap_err();

            assert!(matches!(err, SynjdkError::PathTraversal { .. }), "{name}");
            assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 0, "{name}");
        }
    }

    #[test]
    fn backslash_names_stay_inside_destination() {
        let work = tempdir().unwrap();
        let archive = work.path().join("evil.zip");
        build_zip(&archive, &[("..\\..\\evil", Some(b"pwned"))]);
        let dest = work.path().join("a").join("b").join("root");

        match extract(&archive, &dest, &CancellationToken::new()) {
            Ok(_) | Err(SynjdkError::PathTraversal { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
        assert!(!work.path().join("evil").exists());
        assert!(!work.path().join("a").join("evil").exists());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_directories_are_writable_until_commit() {
        let work = tempdir().unwrap();
        let archive = work.path().join("zulu8.zip");
        build_zip_with_mode(
            &archive,
            &[("zulu8/", None), ("zulu8/release", Some(b"JAVA_VERSION=\"1.8.0\"\n"))],
            0o555,
        );
        let root = work.path().join("root");

        let staged = stage(&archive, &root, &CancellationToken::new()).unwrap();
        std::fs::write(staged.content().join("meta"), b"{}").unwrap();
        let dir = staged.commit(&root.join("zulu8")).unwrap();

        assert_eq!(mode_of(&dir), 0o555);
        assert_eq!(mode_of(&dir.join("release")), 0o555);
        assert!(dir.join("meta").is_file());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 1);
        set_mode(&dir, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn dropped_stage_of_read_only_tree_cleans_up() {
        let work = tempdir().unwrap();
        let archive = work.path().join("zulu8.zip");
        build_zip_with_mode(
            &archive,
            &[("zulu8/", None), ("zulu8/lib/", None), ("zulu8/lib/modules", Some(b"m"))],
            0o555,
        );
        let root = work.path().join("root");

        let staged = stage(&archive, &root, &CancellationToken::new()).unwrap();
        drop(staged);

        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn move_all_rolls_back_on_failure() {
        let work = tempdir().unwrap();
        let first = work.path().join("first");
        std::fs::create_dir(&first).unwrap();
        let moves = vec![
            (first.clone(), work.path().join("first-moved")),
            (work.path().join("missing"), work.path().join("missing-moved")),
        ];

        assert!(move_all(&moves).is_err());
        assert!(first.is_dir());
        assert!(!work.path().join("first-moved").exists());
    }

    #[test]
    fn extracts_tree_with_modes() {
        let work = tempdir().unwrap();
        let archive = work.path().join("zulu8.zip");
        build_zip(
            &archive,
            &[
                ("zulu8/", None),
                ("zulu8/bin/", None),
                ("zulu8/bin/java", Some(b"#!/bin/sh\n")),
                ("zulu8/release", Some(b"JAVA_VERSION=\"1.8.0\"\n")),
            ],
        );
        let dest = work.path().join("root");

        let written = extract(&archive, &dest, &CancellationToken::new()).unwrap();

        assert_eq!(written, 4);
        let java = dest.join("zulu8").join("bin").join("java");
        assert_eq!(std::fs::read(&java).unwrap(), b"#!/bin/sh\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&java).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
        let leftovers: Vec<_> = std::fs::read_dir(&dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(leftovers, vec!["zulu8".to_string()]);
    }

    #[test]
    fn traversal_entry_aborts_without_writing() {
        let work = tempdir().unwrap();
        let archive = work.path().join("evil.zip");
        build_zip(
            &archive,
            &[
                ("pkg/", None),
                ("pkg/ok.txt", Some(b"fine")),
                ("../../evil", Some(b"pwned")),
            ],
        );
        let dest = work.path().join("a").join("b").join("root");

        let err = extract(&archive, &dest, &CancellationToken::new()).unwrap_err();

        match err {
            SynjdkError::PathTraversal { entry, destination } => {
                assert_eq!(entry, "../../evil");
                assert_eq!(destination, dest);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!work.path().join("a").join("evil").exists());
        assert!(!work.path().join("evil").exists());
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn extract_as_renames_single_top_directory() {
        let work = tempdir().unwrap();
        let archive = work.path().join("zulu11.zip");
        build_zip(
            &archive,
            &[
                ("zulu11.70.15-ca-jdk11.0.22/", None),
                ("zulu11.70.15-ca-jdk11.0.22/bin/java", Some(b"java")),
            ],
        );
        let root = work.path().join("root");

        let dir = extract_as(&archive, &root, "zulu11", &CancellationToken::new()).unwrap();

        assert_eq!(dir, root.join("zulu11"));
        assert!(dir.join("bin").join("java").exists());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 1);
    }

    #[test]
    fn extract_as_wraps_flat_archives() {
        let work = tempdir().unwrap();
        let archive = work.path().join("flat.zip");
        build_zip(
            &archive,
            &[("bin/java", Some(b"java")), ("release", Some(b"r"))],
        );
        let root = work.path().join("root");

        let dir = extract_as(&archive, &root, "flat", &CancellationToken::new()).unwrap();

        assert!(dir.join("bin").join("java").exists());
        assert!(dir.join("release").exists());
    }

    #[test]
    fn extract_as_refuses_existing_directory() {
        let work = tempdir().unwrap();
        let archive = work.path().join("zulu8.zip");
        build_zip(&archive, &[("zulu8/bin/java", Some(b"java"))]);
        let root = work.path().join("root");
        std::fs::create_dir_all(root.join("zulu8")).unwrap();

        let err = extract_as(&archive, &root, "zulu8", &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, SynjdkError::CorruptedState { .. }));
    }

    #[test]
    fn cancelled_extraction_leaves_nothing() {
        let work = tempdir().unwrap();
        let archive = work.path().join("zulu8.zip");
        build_zip(&archive, &[("zulu8/bin/java", Some(b"java"))]);
        let root = work.path().join("root");
        let token = CancellationToken::new();
        token.cancel();

        let err = extract_as(&archive, &root, "zulu8", &token).unwrap_err();

        assert!(matches!(err, SynjdkError::Cancelled));
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn garbage_archive_is_rejected() {
        let work = tempdir().unwrap();
        let archive = work.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();
        let err = extract(&archive, &work.path().join("root"), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, SynjdkError::Serialization(_)));
    }
}
