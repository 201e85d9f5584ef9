//! Retry strategies and predicates for transient server failures.
//!
//! The client retries an exchange while its [`RetryPredicate`] accepts the
//! outcome and its [`RetryStrategy`] still has attempts left. The defaults
//! retry immediately on `500 Internal Server Error`, for at most five
//! attempts in total.

use crate::error::BoxError;
use http::StatusCode;
use rand::Rng;
use std::time::Duration;

/// Total attempts made by the default strategy.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Defines how many attempts are made and how long to wait between them.
///
/// # Examples
///
/// ```
/// use mailjet::RetryStrategy;
/// use std::time::Duration;
///
/// // Up to 5 attempts, back to back
/// let immediate = RetryStrategy::default();
/// assert_eq!(immediate.max_attempts(), 5);
///
/// // Exponential backoff: 100ms, 200ms, 400ms...
/// let exponential = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(30),
///     max_attempts: 5,
///     jitter: true,
/// };
/// # let _ = exponential;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// A single attempt.
    None,

    /// Retry without waiting.
    Immediate {
        /// Total number of attempts, including the first one.
        max_attempts: usize,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        /// The delay between attempts.
        delay: Duration,
        /// Total number of attempts, including the first one.
        max_attempts: usize,
    },

    /// Retry with exponentially increasing delays.
    ///
    /// The wait before retry `n` is `initial_delay * 2^(n - 1)`, capped at
    /// `max_delay`. Jitter scales each wait to 50-100% of its value.
    ExponentialBackoff {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between attempts.
        max_delay: Duration,
        /// Total number of attempts, including the first one.
        max_attempts: usize,
        /// Whether to add random jitter to delays.
        jitter: bool,
    },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::Immediate {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryStrategy {
    /// Total number of attempts allowed.
    pub fn max_attempts(&self) -> usize {
        match self {
            RetryStrategy::None => 1,
            RetryStrategy::Immediate { max_attempts }
            | RetryStrategy::Linear { max_attempts, .. }
            | RetryStrategy::ExponentialBackoff { max_attempts, .. } => *max_attempts,
        }
    }

    /// Returns the wait before `attempt` (2 = first retry), or `None` if
    /// that attempt is not allowed.
    pub fn delay_before(&self, attempt: usize) -> Option<Duration> {
        if attempt < 2 || attempt > self.max_attempts() {
            return None;
        }
        let retry = attempt - 1;

        match self {
            RetryStrategy::None => None,
            RetryStrategy::Immediate { .. } => Some(Duration::ZERO),
            RetryStrategy::Linear { delay, .. } => Some(*delay),
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                jitter,
                ..
            } => {
                let multiplier = 2u64.saturating_pow(retry.saturating_sub(1) as u32);
                let base_delay =
                    initial_delay.saturating_mul(multiplier.try_into().unwrap_or(u32::MAX));
                let delay = base_delay.min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(jitter_factor))
                } else {
                    Some(delay)
                }
            }
        }
    }
}

/// The result of a single attempt, as seen by a [`RetryPredicate`].
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// The server answered with this status.
    Status(StatusCode),
    /// The transport failed before a response was read.
    TransportError(&'a BoxError),
}

/// Decides whether an attempt's outcome is worth another attempt.
///
/// # Examples
///
/// ```
/// use mailjet::retry::{Outcome, RetryPredicate};
///
/// struct RetryOnBadGateway;
///
/// impl RetryPredicate for RetryOnBadGateway {
///     fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
///         matches!(outcome, Outcome::Status(status) if status.as_u16() == 502)
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// `attempt` is the 1-indexed attempt that produced `outcome`.
    fn should_retry(&self, outcome: &Outcome<'_>, attempt: usize) -> bool;
}

/// Retry only on `500 Internal Server Error`. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOnInternalServerError;

impl RetryPredicate for RetryOnInternalServerError {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        matches!(outcome, Outcome::Status(StatusCode::INTERNAL_SERVER_ERROR))
    }
}

/// Retry on any 5xx status.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        matches!(outcome, Outcome::Status(status) if status.is_server_error())
    }
}

/// Retry on transport failures (connection refused, reset, timeouts).
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, outcome: &Outcome<'_>, _attempt: usize) -> bool {
        matches!(outcome, Outcome::TransportError(_))
    }
}

/// Combine multiple retry predicates with OR logic.
///
/// # Examples
///
/// ```
/// use mailjet::retry::{OrPredicate, RetryOn5xx, RetryOnConnectionError};
///
/// let predicate = OrPredicate::new(vec![
///     Box::new(RetryOn5xx),
///     Box::new(RetryOnConnectionError),
/// ]);
/// # let _ = predicate;
/// ```
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, outcome: &Outcome<'_>, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(outcome, attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_five_immediate_attempts() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_attempts(), 5);
        assert_eq!(strategy.delay_before(1), None);
        for attempt in 2..=5 {
            assert_eq!(strategy.delay_before(attempt), Some(Duration::ZERO));
        }
        assert_eq!(strategy.delay_before(6), None);
    }

    #[test]
    fn test_exponential_backoff_delays() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            max_attempts: 5,
            jitter: false,
        };

        assert_eq!(strategy.delay_before(2), Some(Duration::from_millis(100)));
        assert_eq!(strategy.delay_before(3), Some(Duration::from_millis(200)));
        assert_eq!(strategy.delay_before(4), Some(Duration::from_millis(400)));
        assert_eq!(strategy.delay_before(5), Some(Duration::from_millis(500)));
        assert_eq!(strategy.delay_before(6), None);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            max_attempts: 3,
            jitter: true,
        };
        let delay = strategy.delay_before(2).unwrap();
        assert!(delay >= Duration::from_millis(50) && delay <= Duration::from_millis(100));
    }

    #[test]
    fn test_linear_and_none() {
        let strategy = RetryStrategy::Linear {
            delay: Duration::from_secs(1),
            max_attempts: 2,
        };
        assert_eq!(strategy.delay_before(2), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_before(3), None);

        assert_eq!(RetryStrategy::None.max_attempts(), 1);
        assert_eq!(RetryStrategy::None.delay_before(2), None);
    }

    #[test]
    fn test_predicates() {
        let internal = Outcome::Status(StatusCode::INTERNAL_SERVER_ERROR);
        let unavailable = Outcome::Status(StatusCode::SERVICE_UNAVAILABLE);
        let not_found = Outcome::Status(StatusCode::NOT_FOUND);
        let error: BoxError = "connection reset".into();
        let transport = Outcome::TransportError(&error);

        assert!(RetryOnInternalServerError.should_retry(&internal, 1));
        assert!(!RetryOnInternalServerError.should_retry(&unavailable, 1));
        assert!(!RetryOnInternalServerError.should_retry(&transport, 1));

        assert!(RetryOn5xx.should_retry(&unavailable, 1));
        assert!(!RetryOn5xx.should_retry(&not_found, 1));

        let either = OrPredicate::new(vec![
            Box::new(RetryOnInternalServerError),
            Box::new(RetryOnConnectionError),
        ]);
        assert!(either.should_retry(&transport, 1));
        assert!(either.should_retry(&internal, 1));
        assert!(!either.should_retry(&unavailable, 1));
    }
}
