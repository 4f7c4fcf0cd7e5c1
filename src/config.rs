/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration (install root, log location,
    catalog endpoint) from TOML with sensible defaults.

  Security / Safety Notes:
    Only user-owned paths are derived; no privileged locations
    are assumed.

  Dependencies:
    serde + toml for parsing, dirs for XDG/home resolution.

  Operational Scope:
    Read once by the binary; the resulting values are passed
    explicitly into the VersionManager constructor.

  Revision History:
    2026-10-16 COD  Introduced Syn-JDK configuration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit configuration over ambient process state
    - Defaults documented alongside their fields
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SynjdkError};

/// Public foojay Disco API endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://api.foojay.io/disco/v3.0";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const APP_DIR: &str = "syn-jdk";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SynjdkConfig {
    /// Directory holding one subdirectory per installed runtime.
    pub install_root: Option<PathBuf>,
    /// Directory receiving session log files.
    pub log_dir: Option<PathBuf>,
    pub catalog: CatalogConfig,
}

/// Catalog endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Catalog request deadline and download idle timeout, in seconds.
    pub timeout: u64,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("Syn-JDK-Core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SynjdkConfig {
    /// Load configuration from an explicit path, or the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SynjdkError::Config(format!("Failed to read config {}: {err}", path.display()))
        })?;
        Self::parse(&raw).map_err(|err| match err {
            SynjdkError::Config(msg) => SynjdkError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: SynjdkConfig = toml::from_str(raw)
            .map_err(|err| SynjdkError::Config(format!("Invalid configuration: {err}")))?;
        if config.catalog.base_url.trim().is_empty() {
            return Err(SynjdkError::Config("catalog.base_url must not be empty".into()));
        }
        if config.catalog.timeout == 0 {
            return Err(SynjdkError::Config("catalog.timeout must be positive".into()));
        }
        Ok(config)
    }

    /// Resolved install root; defaults to `~/.jlib`.
    pub fn install_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.install_root {
            return Ok(root.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".jlib"))
            .ok_or_else(|| SynjdkError::Config("Cannot determine home directory".into()))
    }

    /// Resolved log directory.
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        dirs::state_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("state")))
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join("logs")
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SynjdkConfig::parse("").unwrap();
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog.timeout, DEFAULT_TIMEOUT_SECS);
        assert!(config.install_root.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = SynjdkConfig::parse(
            r#"
            install_root = "/opt/jdks"
            log_dir = "/var/log/synjdk"

            [catalog]
            base_url = "https://mirror.example/disco/v3.0"
            timeout = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.install_root().unwrap(), PathBuf::from("/opt/jdks"));
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/synjdk"));
        assert_eq!(config.catalog.base_url, "https://mirror.example/disco/v3.0");
        assert_eq!(config.catalog.timeout, 5);
        assert!(config.catalog.user_agent.starts_with("Syn-JDK-Core/"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = SynjdkConfig::parse("[catalog]\ntimeout = 0\n").unwrap_err();
        assert!(matches!(err, SynjdkError::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = SynjdkConfig::load_from_optional_path(Some(&dir.path().join("absent.toml")))
            .unwrap_err();
        assert!(matches!(err, SynjdkError::Config(_)));
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "install_root = \"/tmp/jdk-root\"\n").unwrap();
        let config = SynjdkConfig::load_from_optional_path(Some(&path)).unwrap();
        assert_eq!(config.install_root().unwrap(), PathBuf::from("/tmp/jdk-root"));
    }
}
