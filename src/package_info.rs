/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::package_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing catalog package descriptors
    and the local installations built from them.

  Security / Safety Notes:
    Pure data containers; no I/O performed in this module.

  Dependencies:
    serde for the catalog wire format and on-disk metadata.

  Operational Scope:
    Used by the resolver, installer and registry to pass the
    descriptor snapshot and derived install paths around.

  Revision History:
    2026-10-16 COD  Introduced PackageDescriptor and
                    InstalledPackage.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Serializable structures for metadata persistence
============================================================*/

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platform;

/// Name of the runtime launcher inside `bin/`.
pub const RUNTIME_EXECUTABLE: &str = "java";

/// A downloadable build as described by the catalog.
///
/// The same structure is persisted verbatim as install metadata, so a later
/// catalog change never invalidates a local install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDescriptor {
    pub id: String,
    pub archive_type: String,
    pub distribution: String,
    pub major_version: u32,
    pub java_version: String,
    pub distribution_version: String,
    pub jdk_version: u32,
    pub latest_build_available: bool,
    pub release_status: Option<String>,
    pub term_of_support: Option<String>,
    pub operating_system: String,
    pub lib_c_type: Option<String>,
    pub architecture: String,
    pub fpu: Option<String>,
    pub package_type: Option<String>,
    pub javafx_bundled: bool,
    pub directly_downloadable: bool,
    pub filename: String,
    pub links: PackageLinks,
    pub free_use_in_production: bool,
    pub tck_tested: Option<String>,
    pub tck_cert_uri: Option<String>,
    pub aqavit_certified: Option<String>,
    pub aqavit_cert_uri: Option<String>,
    pub size: u64,
    pub feature: Vec<FeatureTag>,
}

/// Catalog links attached to a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageLinks {
    pub pkg_info_uri: Option<String>,
    pub pkg_download_redirect: Option<String>,
}

/// Auxiliary feature tag (e.g. `musl`, `crac`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureTag {
    pub name: String,
    pub ui_string: Option<String>,
    pub api_string: Option<String>,
}

/// A runtime that has been fully extracted under the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    /// Descriptor snapshot taken at install time.
    pub descriptor: PackageDescriptor,
    /// `<root>/<install dir name>`.
    pub java_dir: PathBuf,
    /// `<java_dir>/bin/java` (`java.exe` on Windows).
    pub java_exec_path: PathBuf,
}

impl InstalledPackage {
    /// Build the record for a descriptor installed at `java_dir`.
    pub fn at(descriptor: PackageDescriptor, java_dir: impl Into<PathBuf>) -> Self {
        let java_dir = java_dir.into();
        let java_exec_path = java_dir
            .join("bin")
            .join(platform::executable_name(RUNTIME_EXECUTABLE));
        Self {
            descriptor,
            java_dir,
            java_exec_path,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn distribution(&self) -> &str {
        &self.descriptor.distribution
    }

    pub fn major_version(&self) -> u32 {
        self.descriptor.major_version
    }

    /// Install directory name (final component of `java_dir`).
    pub fn dir_name(&self) -> &str {
        self.java_dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn java_dir(&self) -> &Path {
        &self.java_dir
    }
}
