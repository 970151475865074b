//! Retry-with-backoff, used by the concrete `UpstreamClient` and
//! `LedgerStore` adapters around every call that crosses a process
//! boundary (spec §7). Grounded on the resilience pattern of keeping the
//! backoff strategy as plain, serializable data executed by a small async
//! loop rather than reaching for a retry combinator crate — the policy is
//! then trivially unit-testable on its own.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    Exponential {
        initial: Duration,
        multiplier: f64,
        cap: Duration,
    },
}

impl BackoffStrategy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Exponential {
                initial,
                multiplier,
                cap,
            } => {
                let scaled = initial.as_secs_f64() * multiplier.powi(attempt as i32);
                Duration::from_secs_f64(scaled.min(cap.as_secs_f64()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
    pub total_timeout: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// The profile spec §7 calls for at the upstream client layer: 3
    /// attempts, 1s initial, 2x multiplier, 10s cap, 30s total timeout.
    pub fn upstream_default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial: Duration::from_secs(1),
                multiplier: 2.0,
                cap: Duration::from_secs(10),
            },
            total_timeout: Duration::from_secs(30),
            jitter: true,
        }
    }

    /// The profile spec §7 calls for at the persistence store layer: 3
    /// attempts, 500ms initial, 5s cap.
    pub fn persistence_default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial: Duration::from_millis(500),
                multiplier: 2.0,
                cap: Duration::from_secs(5),
            },
            total_timeout: Duration::from_secs(10),
            jitter: true,
        }
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff.delay_for(attempt);
        if !self.jitter {
            return base;
        }
        let mut rng = rand::thread_rng();
        let factor = rng.gen_range(0.75..=1.25);
        Duration::from_secs_f64(base.as_secs_f64() * factor)
    }

    /// Runs `f` until it succeeds, `max_attempts` is exhausted, or
    /// `total_timeout` elapses, whichever comes first. The last error is
    /// returned on exhaustion.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = std::time::Instant::now();
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    let exhausted = attempt >= self.max_attempts
                        || started.elapsed() >= self.total_timeout;
                    if exhausted {
                        return Err(err);
                    }
                    tokio_sleep(self.jittered_delay(attempt - 1)).await;
                }
            }
        }
    }
}

/// Named wrapper around `tokio::time::sleep` so call sites read as a retry
/// primitive, not a raw runtime call.
async fn tokio_sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
