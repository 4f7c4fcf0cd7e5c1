/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::metadata
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Persist and reload the descriptor snapshot that marks an
    install directory as a completed installation.

  Security / Safety Notes:
    Writes go to a temporary sibling that is renamed over the
    final file, so a crash never leaves a truncated `meta`.

  Dependencies:
    serde_json for the document, tempfile for atomic writes.

  Operational Scope:
    Called by the installer (save) and by the registry and
    idempotency check (load).

  Revision History:
    2026-10-16 COD  Authored metadata store.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single source of truth for install presence
    - Absence reported distinctly from corruption
============================================================*/

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, SynjdkError};
use crate::package_info::PackageDescriptor;

/// File name of the metadata document inside an install directory.
pub const META_FILE_NAME: &str = "meta";

/// Location of the metadata file for `install_dir`.
pub fn meta_path(install_dir: &Path) -> PathBuf {
    install_dir.join(META_FILE_NAME)
}

/// Persist `descriptor` into `install_dir`, replacing any previous document.
pub fn save(descriptor: &PackageDescriptor, install_dir: &Path) -> Result<()> {
    let path = meta_path(install_dir);
    let mut staged = NamedTempFile::new_in(install_dir).map_err(|err| {
        SynjdkError::Filesystem(format!(
            "Failed to stage metadata in {}: {err}",
            install_dir.display()
        ))
    })?;
    serde_json::to_writer_pretty(staged.as_file_mut(), descriptor).map_err(|err| {
        SynjdkError::Serialization(format!(
            "Failed to encode metadata for {}: {err}",
            descriptor.id
        ))
    })?;
    staged
        .as_file_mut()
        .write_all(b"\n")
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| {
            SynjdkError::Filesystem(format!("Failed to flush metadata {}: {err}", path.display()))
        })?;
    staged.persist(&path).map_err(|err| {
        SynjdkError::Filesystem(format!(
            "Failed to write metadata {}: {}",
            path.display(),
            err.error
        ))
    })?;
    Ok(())
}

/// Load the descriptor stored in `install_dir`.
///
/// A missing file yields [`SynjdkError::NotFound`].
pub fn load(install_dir: &Path) -> Result<PackageDescriptor> {
    let path = meta_path(install_dir);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SynjdkError::NotFound(format!(
                "metadata {}",
                path.display()
            )))
        }
        Err(err) => {
            return Err(SynjdkError::Filesystem(format!(
                "Failed to read metadata {}: {err}",
                path.display()
            )))
        }
    };
    serde_json::from_str(&raw).map_err(|err| {
        SynjdkError::Serialization(format!("Malformed metadata {}: {err}", path.display()))
    })
}

/// Whether `install_dir` carries metadata. Errors other than absence surface.
pub fn exists(install_dir: &Path) -> Result<bool> {
    let path = meta_path(install_dir);
    match std::fs::metadata(&path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(SynjdkError::Filesystem(format!(
            "Failed to check metadata {}: {err}",
            path.display()
        ))),
    }
}
