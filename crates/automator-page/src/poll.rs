//! Poll-until-predicate wait primitive.
//!
//! The page offers no completion events for the state changes the adapter
//! cares about, so every wait re-evaluates a probe on a fixed cadence until
//! it yields a value or the timeout elapses.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::error::PollError;

/// Cadence and deadline of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Re-evaluate `probe` every `spec.interval` until it returns `Some`.
///
/// The probe runs at least once. A probe error ends the wait immediately as
/// [`PollError::Probe`]; running out of time yields [`PollError::Timeout`].
/// When `cancel` fires, the wait ends with [`PollError::Cancelled`] without
/// waiting for the current sleep to finish.
pub async fn poll_until<T, E, F, Fut>(
    clock: &dyn Clock,
    spec: PollSpec,
    cancel: Option<&CancellationToken>,
    mut probe: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = clock.now();

    loop {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(PollError::Cancelled);
        }

        if let Some(value) = probe().await.map_err(PollError::Probe)? {
            return Ok(value);
        }

        let elapsed = clock.now().saturating_sub(started);
        if elapsed >= spec.timeout {
            return Err(PollError::Timeout(spec.timeout));
        }

        let pause = spec.interval.min(spec.timeout - elapsed);
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(PollError::Cancelled),
                    _ = clock.sleep(pause) => {}
                }
            }
            None => clock.sleep(pause).await,
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
