//! Fixed-delay retry for calls that race the remote side's own propagation,
//! e.g. inviting a user into a conversation created a moment ago.

use std::future::Future;
use std::time::Duration;
use tfplug::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Invoke `operation` up to `policy.attempts` times, sleeping `policy.delay`
/// between failures. The last error is returned as is, also when `ctx` is
/// cancelled while waiting for the next attempt.
///
/// Tolerated remote codes must already be mapped to `Ok` by `operation`.
pub async fn retry<T, E, F, Fut>(
    ctx: &Context,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts || ctx.is_cancelled() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    attempt,
                    attempts,
                    delay_secs = policy.delay.as_secs_f64(),
                    error = %e,
                    "operation failed, retrying"
                );
                tokio::select! {
                    _ = tokio::time::sleep(policy.delay) => {}
                    _ = ctx.cancelled() => {
                        tracing::warn!(attempt, "request cancelled, giving up retries");
                        return Err(e);
                    }
                }
                attempt += 1;
            }
        }
    }
}
