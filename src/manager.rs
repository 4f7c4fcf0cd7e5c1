/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::manager
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Own one install root together with its catalog, transport,
    logger and cancellation signal. Install and registry
    operations are implemented on this type in sibling modules.

  Security / Safety Notes:
    Mutations of the root are serialized by an in-process
    mutex and an advisory lock file, so two installs never
    race past the already-installed check.

  Dependencies:
    tokio Mutex, fs2 advisory locks, tokio-util cancellation.

  Operational Scope:
    Constructed once per install root by embedding callers or
    the `synjdk` binary.

  Revision History:
    2026-10-16 COD  Introduced VersionManager.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit configuration passed at construction
    - Every wait observes cancellation
============================================================*/

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use tokio::sync::{Mutex, MutexGuard};

use crate::cancel::{cancellable, ensure_active, CancellationToken};
use crate::catalog::{Catalog, DiscoClient, Downloader};
use crate::config::SynjdkConfig;
use crate::error::{Result, SynjdkError};
use crate::logger::Logger;

/// Advisory lock file inside the install root.
pub const LOCK_FILE_NAME: &str = ".lock";

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Local version manager bound to a single install root.
pub struct VersionManager {
    pub(crate) root: PathBuf,
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) downloader: Arc<dyn Downloader>,
    pub(crate) logger: Arc<Logger>,
    pub(crate) cancel: CancellationToken,
    install_lock: Mutex<()>,
}

impl std::fmt::Debug for VersionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionManager")
            .field("root", &self.root)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl VersionManager {
    /// Build a manager over `root` with explicit collaborators.
    pub fn new(
        root: impl Into<PathBuf>,
        catalog: Arc<dyn Catalog>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            root: root.into(),
            catalog,
            downloader,
            logger: Arc::new(Logger::stderr(false)),
            cancel: CancellationToken::new(),
            install_lock: Mutex::new(()),
        }
    }

    /// Build a manager backed by the Disco API as described by `config`.
    pub fn from_config(config: &SynjdkConfig) -> Result<Self> {
        let client = Arc::new(DiscoClient::new(&config.catalog)?);
        Ok(Self::new(config.install_root()?, client.clone(), client))
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Observe `token` at every suspension point.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Serialize mutations of the root, in-process and across processes.
    pub(crate) async fn lock_root(&self) -> Result<RootLock<'_>> {
        ensure_active(&self.cancel)?;
        let guard = cancellable(&self.cancel, async {
            Ok::<_, SynjdkError>(self.install_lock.lock().await)
        })
        .await?;

        std::fs::create_dir_all(&self.root).map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to create install root {}: {err}",
                self.root.display()
            ))
        })?;
        let path = self.root.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| {
                SynjdkError::Filesystem(format!("Failed to open {}: {err}", path.display()))
            })?;

        let contended = fs2::lock_contended_error().kind();
        let mut announced = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(err) if err.kind() == contended => {
                    if !announced {
                        self.logger.info(
                            "LOCK",
                            format!("Waiting for another process holding {}", path.display()),
                        );
                        announced = true;
                    }
                    cancellable(&self.cancel, async {
                        tokio::time::sleep(LOCK_POLL_INTERVAL).await;
                        Ok::<_, SynjdkError>(())
                    })
                    .await?;
                }
                Err(err) => {
                    return Err(SynjdkError::Filesystem(format!(
                        "Failed to lock {}: {err}",
                        path.display()
                    )))
                }
            }
        }

        Ok(RootLock {
            _guard: guard,
            file,
        })
    }
}

/// Held for the duration of an install or removal.
pub(crate) struct RootLock<'a> {
    _guard: MutexGuard<'a, ()>,
    file: File,
}

impl Drop for RootLock<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
