/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::cancel
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Thread a caller-owned cancellation signal through every
    suspension point of the version manager.

  Security / Safety Notes:
    Cancelling drops the in-flight future; staging areas are
    cleaned up by their owners on drop.

  Dependencies:
    tokio-util CancellationToken, tokio::select!.

  Operational Scope:
    Wraps catalog requests, downloads and lock waits.

  Revision History:
    2026-10-16 COD  Added cancellation helpers.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single error value for every cancelled path
============================================================*/

use std::future::Future;

pub use tokio_util::sync::CancellationToken;

use crate::error::{Result, SynjdkError};

/// Run `fut` unless `token` fires first.
pub async fn cancellable<F, T>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(SynjdkError::Cancelled),
        result = fut => result,
    }
}

/// Fail fast if the token already fired.
pub fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(SynjdkError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = cancellable(&token, async { Ok::<_, SynjdkError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<()> = cancellable(&token, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(SynjdkError::Cancelled)));
        assert!(matches!(ensure_active(&token), Err(SynjdkError::Cancelled)));
    }

    #[tokio::test]
    async fn cancel_during_wait() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let result: Result<()> = cancellable(&token, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(SynjdkError::Cancelled)));
    }
}
