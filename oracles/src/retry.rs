//! Bounded retry around raw service calls

use std::future::Future;

use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::{OracleError, OracleResult};
use crate::types::ApiFailure;

/// Run `call` under `policy`
///
/// Each attempt gets its own deadline. Retryable failures back off
/// exponentially until the attempt budget is spent; anything else is
/// returned immediately as [`OracleError::Rejected`].
pub async fn call_with_retries<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> OracleResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiFailure>>,
{
    let mut attempt: u32 = 0;

    loop {
        let outcome = match tokio::time::timeout(policy.call_timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(ApiFailure::Timeout(policy.call_timeout)),
        };

        let failure = match outcome {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempts = attempt + 1, "call succeeded after retry");
                }
                return Ok(value);
            }
            Err(failure) => failure,
        };

        if !failure.is_retryable() {
            return Err(OracleError::Rejected {
                operation: operation.to_string(),
                failure,
            });
        }

        match policy.backoff_for(attempt) {
            Some(delay) => {
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    error = %failure,
                    "call failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            None => {
                return Err(OracleError::Exhausted {
                    operation: operation.to_string(),
                    attempts: attempt + 1,
                    last: failure,
                });
            }
        }
    }
}
