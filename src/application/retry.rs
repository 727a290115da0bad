//! Bounded retry with a fixed interval.
//!
//! Each attempt sleeps one interval first, then probes. The loop never
//! errors on exhaustion; callers decide what an exhausted wait means.

use std::future::Future;
use std::time::Duration;

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T, E> {
    /// The condition holds; stop and return the value.
    Ready(T),
    /// Not yet; try again after the next interval.
    NotYet,
    /// Give up immediately.
    Abort(E),
}

/// Outcome of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Succeeded { attempts: u32, value: T },
    Exhausted { attempts: u32 },
    Aborted { attempts: u32, error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedRetry {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl BoundedRetry {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on the time a full run can take, ignoring probe latency.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Runs `probe` up to `max_attempts` times, sleeping one interval before each.
    ///
    /// The probe receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut probe: F) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Probe<T, E>>,
    {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;
            match probe(attempt).await {
                Probe::Ready(value) => {
                    return RetryOutcome::Succeeded {
                        attempts: attempt,
                        value,
                    }
                }
                Probe::Abort(error) => {
                    return RetryOutcome::Aborted {
                        attempts: attempt,
                        error,
                    }
                }
                Probe::NotYet => {}
            }
        }
        RetryOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn returns_on_first_ready_probe() {
        let retry = BoundedRetry::new(Duration::from_secs(2), 15);
        let start = Instant::now();

        let outcome: RetryOutcome<&str, ()> = retry
            .run(|attempt| async move {
                if attempt == 3 {
                    Probe::Ready("back")
                } else {
                    Probe::NotYet
                }
            })
            .await;

        assert_eq!(
            outcome,
            RetryOutcome::Succeeded {
                attempts: 3,
                value: "back"
            }
        );
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts_without_error() {
        let retry = BoundedRetry::new(Duration::from_secs(2), 15);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let outcome: RetryOutcome<(), ()> = retry
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Probe::NotYet }
            })
            .await;

        assert_eq!(outcome, RetryOutcome::Exhausted { attempts: 15 });
        assert_eq!(calls.load(Ordering::SeqCst), 15);
        assert_eq!(start.elapsed(), retry.max_wait());
    }

    #[tokio::test(start_paused = true)]
    async fn abort_stops_early() {
        let retry = BoundedRetry::new(Duration::from_millis(100), 10);
        let outcome: RetryOutcome<(), &str> = retry.run(|_| async { Probe::Abort("down") }).await;
        assert_eq!(
            outcome,
            RetryOutcome::Aborted {
                attempts: 1,
                error: "down"
            }
        );
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_before_the_first_probe() {
        let retry = BoundedRetry::new(Duration::from_secs(1), 1);
        let start = Instant::now();
        let outcome: RetryOutcome<(), ()> = retry.run(|_| async { Probe::Ready(()) }).await;
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }
}
