use std::time::Duration;

use backon::ExponentialBuilder;

/// Default socket timeout of a request.
pub const DEFAULT_INITIAL_TIMEOUT: Duration = Duration::from_millis(2500);

/// Default number of retries.
pub const DEFAULT_MAX_RETRIES: usize = 1;

/// Default backoff multiplier.
pub const DEFAULT_BACKOFF_MULTIPLIER: f32 = 1.0;

/// Retry policy attached to a request.
///
/// The policy is only described here, the transport layer is responsible for
/// executing the retries. Use [`RetryPolicy::backoff`] to obtain a `backon`
/// strategy matching the policy.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use wasp_core::RetryPolicy;
///
/// let policy = RetryPolicy::new(Duration::from_secs(5), 3, 2.0);
/// assert_eq!(policy.max_retries(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    initial_timeout: Duration,
    max_retries: usize,
    backoff_multiplier: f32,
}

impl RetryPolicy {
    /// Creates a new retry policy.
    pub fn new(initial_timeout: Duration, max_retries: usize, backoff_multiplier: f32) -> Self {
        Self {
            initial_timeout,
            max_retries,
            backoff_multiplier,
        }
    }

    /// Socket timeout of the first attempt.
    ///
    /// Transports apply it per attempt; [`backoff`](Self::backoff) also uses it
    /// as the delay before the first retry.
    pub fn initial_timeout(&self) -> Duration {
        self.initial_timeout
    }

    /// Maximum number of retries after the first attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Multiplier applied to the timeout, and to the retry delay, on each retry.
    pub fn backoff_multiplier(&self) -> f32 {
        self.backoff_multiplier
    }

    /// Builds an exponential backoff strategy for the transport.
    ///
    /// The strategy only yields the delays between attempts: the first delay is
    /// [`initial_timeout`](Self::initial_timeout), each next one is multiplied by
    /// [`backoff_multiplier`](Self::backoff_multiplier). It does not bound the
    /// duration of an attempt, the transport still applies the socket timeout.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_timeout)
            .with_factor(self.backoff_multiplier)
            .with_max_times(self.max_retries)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_INITIAL_TIMEOUT,
            DEFAULT_MAX_RETRIES,
            DEFAULT_BACKOFF_MULTIPLIER,
        )
    }
}
