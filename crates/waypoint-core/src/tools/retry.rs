//! Bounded retry with linear backoff for transient store failures.

use std::{future::Future, time::Duration};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::millis;

/// How often, and how patiently, a failed call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * n`
    #[serde(with = "millis")]
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Error that can tell whether trying again might help.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Runs `call` until it succeeds, fails with a non-transient error, or
    /// the retries are used up. Returns the last result and the number of
    /// attempts made.
    pub async fn run<T, E, F, Fut>(&self, mut call: F) -> (Result<T, E>, u32)
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return (Ok(value), attempt),
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    let delay = self.base_delay * attempt;
                    debug!("Attempt {attempt} failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return (Err(e), attempt),
            }
        }
    }
}

impl Retryable for crate::store::StoreError {
    fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}
