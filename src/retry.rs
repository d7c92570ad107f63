//! Bounded fixed-delay retry for fallible async operations.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` up to `attempts` times with a fixed `delay` between tries.
///
/// No backoff, no jitter. Failed attempts are logged under `label`; the final
/// attempt's error is returned unchanged. `attempts` of zero behaves as one.
pub async fn retry<T, F, Fut>(label: &str, attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("[{label}] attempt {attempt} failed: {err:#}");
                if attempt >= attempts {
                    return Err(err);
                }
                warn!("[{label}] retrying in {:.1}s", delay.as_secs_f32());
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_first_success_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry("ok", 3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = retry("flaky", 3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    bail!("transient");
                }
                Ok("done")
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_makes_exactly_n_attempts_and_keeps_last_error() {
        let calls = AtomicU32::new(0);
        let err = retry("doomed", 3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err::<(), _>(anyhow::anyhow!("failure #{n}")) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.to_string(), "failure #3");
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let err = retry("degenerate", 0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(anyhow::anyhow!("nope")) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.to_string(), "nope");
    }
}
