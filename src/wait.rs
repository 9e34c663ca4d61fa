//! Bounded polling for DOM readiness.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound for explicit UI waits.
pub const UI_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between two probes of the same condition.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of an element lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The condition held; carries the probed value.
    Found(T),
    /// A one-shot lookup matched nothing.
    NotFound,
    /// A bounded wait expired before the condition held.
    TimedOut,
}

impl<T> Lookup<T> {
    /// Discard the reason for absence.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::TimedOut => None,
        }
    }

    /// Treat absence as an error describing `what` was looked for.
    pub fn require(self, what: &str) -> Result<T> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound => Err(Error::ElementNotFound(what.to_string())),
            Lookup::TimedOut => Err(Error::Timeout(what.to_string())),
        }
    }
}

/// Probe once; `None` means [`Lookup::NotFound`].
pub async fn once<T, Fut>(probe: Fut) -> Result<Lookup<T>>
where
    Fut: Future<Output = Result<Option<T>>>,
{
    Ok(match probe.await? {
        Some(value) => Lookup::Found(value),
        None => Lookup::NotFound,
    })
}

/// Call `probe` until it yields a value or `timeout` elapses.
///
/// The probe always runs at least once. Probe errors abort the wait.
pub async fn poll<T, F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Result<Lookup<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(Lookup::Found(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(Lookup::TimedOut);
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// [`poll`] with the default UI timeout and interval.
pub async fn poll_ui<T, F, Fut>(probe: F) -> Result<Lookup<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    poll(UI_TIMEOUT, POLL_INTERVAL, probe).await
}
