/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Local Java runtime version manager. Resolves packages
    against a Disco-style catalog, installs zip archives under
    a single root and keeps a filesystem-backed registry of
    what is installed.

  Security / Safety Notes:
    Archive entries are validated before any byte is written;
    installs become visible atomically, with metadata.

  Dependencies:
    tokio, reqwest, zip, serde, fs2, tempfile.

  Operational Scope:
    Embedded by tooling that needs a JDK on disk, and by the
    `synjdk` binary.

  Revision History:
    2026-10-16 COD  Split Syn-JDK Core into library and binary.
  ------------------------------------------------------------
  SSE Principles Observed:
    - One owner per install root
    - Explicit Result propagation across every boundary
============================================================*/

//! Syn-JDK Core.
//!
//! ```no_run
//! # async fn demo() -> synjdk_core::Result<()> {
//! use synjdk_core::{SynjdkConfig, VersionManager};
//!
//! let manager = VersionManager::from_config(&SynjdkConfig::default())?;
//! let jdk = manager.use_or_install("zulu", 21).await?;
//! println!("{}", jdk.java_exec_path.display());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod installer;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod package_info;
pub mod platform;
pub mod query;
pub mod registry;
pub mod resolver;

pub use cancel::CancellationToken;
pub use catalog::{Catalog, DiscoClient, Downloader};
pub use config::SynjdkConfig;
pub use error::{Result, SynjdkError};
pub use installer::InstallOutcome;
pub use logger::Logger;
pub use manager::VersionManager;
pub use package_info::{InstalledPackage, PackageDescriptor};
pub use query::PackageQuery;
