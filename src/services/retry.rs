//! Reintentos con backoff acotado
//!
//! Las llamadas a colaboradores externos (OTP, documentos, pagos) se
//! reintentan con backoff exponencial más jitter; agotados los intentos
//! se devuelve ExternalService al caller.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::utils::errors::{AppError, AppResult};

/// Ejecutar `operation` hasta `max_attempts` veces. El delay entre el
/// intento n y n+1 es `base_delay * 2^(n-1)` más un jitter aleatorio de
/// hasta la mitad del delay base.
pub async fn with_backoff<T, E, F, Fut>(
    operation: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut call: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt == max_attempts => {
                log::error!(
                    "❌ '{}' falló tras {} intentos: {}",
                    operation,
                    max_attempts,
                    e
                );
                return Err(AppError::ExternalService(format!(
                    "'{}' failed after {} attempts: {}",
                    operation, max_attempts, e
                )));
            }
            Err(e) => {
                let backoff = base_delay * 2u32.saturating_pow(attempt - 1);
                let jitter_ms = {
                    let half_base = (base_delay.as_millis() as u64 / 2).max(1);
                    rand::thread_rng().gen_range(0..half_base)
                };
                let delay = backoff + Duration::from_millis(jitter_ms);
                log::warn!(
                    "⚠️ '{}' intento {}/{} falló: {}. Reintentando en {:?}",
                    operation,
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                sleep(delay).await;
            }
        }
    }

    unreachable!("retry loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_backoff("otp.send", 3, Duration::from_millis(1), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("connection reset")
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_surface_external_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: AppResult<u32> =
            with_backoff("payout", 2, Duration::from_millis(1), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, _>("service unavailable")
                }
            })
            .await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_attempt_success_does_not_retry() {
        let result = with_backoff("documents.store", 3, Duration::from_millis(1), || async {
            Ok::<_, &str>("doc_1")
        })
        .await;

        assert_eq!(result.unwrap(), "doc_1");
    }
}
