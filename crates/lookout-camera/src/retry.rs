use crate::{Camera, CameraError};
use lookout_base::Tensor;
use std::time::Duration;

/// How many consecutive transient capture failures to tolerate, and how long to wait between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fail_fast()
    }
}

impl RetryPolicy {
    /// Never retry: the first error is surfaced.
    pub fn fail_fast() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Retry up to `max_retries` times, doubling the wait from `initial_backoff`.
    ///
    /// The wait is capped at 32 times `initial_backoff` unless changed with
    /// [`with_max_backoff`](Self::with_max_backoff).
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff: initial_backoff.saturating_mul(32),
        }
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Wait before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Wraps a camera and retries transient failures according to a [`RetryPolicy`].
///
/// `Exhausted` and fatal errors pass straight through.
pub struct RetryingCamera<C> {
    inner: C,
    policy: RetryPolicy,
    failures: u32,
}

impl<C: Camera> RetryingCamera<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            failures: 0,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Camera> Camera for RetryingCamera<C> {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        loop {
            match self.inner.recv().await {
                Ok(frame) => {
                    self.failures = 0;
                    return Ok(frame);
                }
                Err(e) if e.is_transient() && self.failures < self.policy.max_retries => {
                    let wait = self.policy.backoff(self.failures);
                    self.failures += 1;
                    log::warn!(
                        "{e}; retry {}/{} in {wait:?}",
                        self.failures,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    self.failures = 0;
                    return Err(e);
                }
            }
        }
    }
}
