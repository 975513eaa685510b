//! # Delay policy for retried boundary calls.
//!
//! [`Backoff`] controls how retry delays grow after repeated failures:
//! capped multiplicative growth from a starting delay, with optional
//! [`Jitter`] to spread synchronized retries.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use servisor::{Backoff, Jitter};
//!
//! let backoff = Backoff {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: Jitter::None,
//! };
//!
//! assert_eq!(backoff.next(None), Duration::from_millis(100));
//! assert_eq!(backoff.next(Some(Duration::from_millis(100))), Duration::from_millis(200));
//! // Growth is capped at `max`.
//! assert_eq!(backoff.next(Some(Duration::from_secs(20))), Duration::from_secs(10));
//! ```

use std::time::Duration;

use rand::Rng;

/// Retry delay policy with capped multiplicative growth.
#[derive(Clone, Copy, Debug)]
pub struct Backoff {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the computed delay.
    pub jitter: Jitter,
}

impl Default for Backoff {
    /// Returns a policy with `first = 100ms`, `max = 30s`, `factor = 2.0`,
    /// no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: Jitter::None,
        }
    }
}

impl Backoff {
    /// Computes the next delay from the previous one.
    ///
    /// - `prev == None` → `first`, clamped to `max`.
    /// - Otherwise the previous delay times `factor`, clamped to `max`.
    pub fn next(&self, prev: Option<Duration>) -> Duration {
        let grown = match prev {
            None => self.first,
            Some(d) => {
                let scaled = d.as_secs_f64() * self.factor;
                if scaled.is_finite() {
                    d.mul_f64(self.factor)
                } else {
                    self.max
                }
            }
        };
        self.jitter.apply(grown.min(self.max))
    }
}

/// Randomization policy for retry delays.
///
/// Spreads retries from multiple callers so they do not land on a struggling
/// backend at the same instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Use the exact computed delay.
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// `delay/2` plus random `[0, delay/2]`; keeps most of the backoff.
    Equal,
}

impl Jitter {
    /// Applies this policy to a computed delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(rng.random_range(0..=ms)),
            Jitter::Equal => {
                let half = ms / 2;
                let spread = if half == 0 { 0 } else { rng.random_range(0..=half) };
                Duration::from_millis(half + spread)
            }
        }
    }
}
