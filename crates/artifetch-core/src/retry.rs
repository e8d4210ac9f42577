//! Retry loop for resolver calls
//!
//! Only transient failures are retried. `max_retries = N` allows `N + 1`
//! attempts in total, with a fixed sleep between attempts.

use crate::error::ResolverError;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// State handed to the retry observer before each backoff sleep
#[derive(Debug)]
pub struct RetryContext<'a> {
    /// 1-based number of the attempt that just failed
    pub try_count: u32,
    pub max_retries: u32,
    pub interval: Duration,
    pub last_error: &'a ResolverError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryFailure {
    /// The error was not transient, no retry was attempted for it
    Permanent { attempts: u32, error: ResolverError },
    /// Every allowed attempt failed
    Exhausted { attempts: u32, error: ResolverError },
}

impl RetryPolicy {
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            interval,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or runs out of retries
    ///
    /// `on_retry` is called once per scheduled retry, before sleeping.
    pub fn run<T, F, R>(&self, mut op: F, mut on_retry: R) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Result<T, ResolverError>,
        R: FnMut(&RetryContext<'_>),
    {
        let mut try_count = 0;
        loop {
            let error = match op() {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            try_count += 1;

            if !error.is_transient() {
                return Err(RetryFailure::Permanent {
                    attempts: try_count,
                    error,
                });
            }
            if try_count > self.max_retries {
                return Err(RetryFailure::Exhausted {
                    attempts: try_count,
                    error,
                });
            }

            on_retry(&RetryContext {
                try_count,
                max_retries: self.max_retries,
                interval: self.interval,
                last_error: &error,
            });

            if !self.interval.is_zero() {
                std::thread::sleep(self.interval);
            }
        }
    }
}
