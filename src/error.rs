/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-JDK-Core error types to provide consistent
    diagnostics and exit semantics.

  Security / Safety Notes:
    Error contexts expose install paths, package identifiers
    and catalog URLs only; no credentials are ever carried.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate recoverable failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2026-10-16 COD  Derived Syn-JDK error taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-JDK-Core operations.
pub type Result<T> = std::result::Result<T, SynjdkError>;

/// Enumerates high-level error domains surfaced by Syn-JDK-Core.
#[derive(Debug, Error)]
pub enum SynjdkError {
    #[error("Resolution: {0}")]
    Resolution(String),
    #[error("No catalog package matches {query}")]
    NoMatch { query: String },
    #[error("Network: {0}")]
    Network(String),
    #[error("Request to {url} exceeded {timeout_secs}s deadline")]
    DeadlineExceeded { url: String, timeout_secs: u64 },
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Archive entry `{entry}` escapes destination {}", destination.display())]
    PathTraversal { entry: String, destination: PathBuf },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Corrupted install state at {}: {reason}", path.display())]
    CorruptedState { path: PathBuf, reason: String },
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SynjdkError {
    /// True for the recoverable "not installed" / "metadata absent" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SynjdkError::NotFound(_))
    }

    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SynjdkError::Resolution(_) => ExitCode::from(10),
            SynjdkError::NoMatch { .. } => ExitCode::from(11),
            SynjdkError::Config(_) => ExitCode::from(20),
            SynjdkError::Network(_) => ExitCode::from(30),
            SynjdkError::Serialization(_) => ExitCode::from(31),
            SynjdkError::DeadlineExceeded { .. } => ExitCode::from(32),
            SynjdkError::Filesystem(_) => ExitCode::from(40),
            SynjdkError::Io(_) => ExitCode::from(41),
            SynjdkError::PathTraversal { .. } => ExitCode::from(42),
            SynjdkError::CorruptedState { .. } => ExitCode::from(43),
            SynjdkError::NotFound(_) => ExitCode::from(44),
            SynjdkError::Runtime(_) => ExitCode::from(50),
            SynjdkError::Cancelled => ExitCode::from(130),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_recoverable() {
        assert!(SynjdkError::NotFound("zulu 11".into()).is_not_found());
        assert!(!SynjdkError::Cancelled.is_not_found());
    }

    #[test]
    fn traversal_message_names_entry() {
        let err = SynjdkError::PathTraversal {
            entry: "../../evil".into(),
            destination: PathBuf::from("/srv/jdks"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("../../evil"));
        assert!(rendered.contains("/srv/jdks"));
    }
}
