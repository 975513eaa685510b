//! # Consecutive-failure circuit breaker.
//!
//! [`Breaker`] rejects boundary calls after a run of failures and allows a
//! trial call once the cooldown has elapsed. State transitions are returned
//! to the caller, which logs and publishes them; the breaker itself holds no
//! observability handles.
//!
//! ## State machine
//! ```text
//! Closed ── threshold consecutive failures ──► Open
//! Open   ── cooldown elapsed ──► (trial call allowed)
//!             ├─ trial succeeds ──► Closed
//!             └─ trial fails ─────► Open (cooldown restarts)
//! ```

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Transition reported by [`Breaker::record_success`] / [`Breaker::record_failure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakerTransition {
    Opened,
    Closed,
}

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
pub struct Breaker {
    threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl Breaker {
    /// Creates a breaker that opens after `threshold` consecutive failures
    /// and allows a trial call after `cooldown`.
    ///
    /// A threshold of 0 disables the breaker.
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            state: Mutex::new(BreakerState {
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Returns false while the breaker is open and cooling down.
    pub fn allow(&self) -> bool {
        let state = self.state.lock().expect("breaker lock poisoned");
        match state.opened_at {
            Some(at) => at.elapsed() >= self.cooldown,
            None => true,
        }
    }

    /// Records a successful call; a success while open closes the breaker.
    pub fn record_success(&self) -> Option<BreakerTransition> {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        state.consecutive_failures = 0;
        if state.opened_at.take().is_some() {
            Some(BreakerTransition::Closed)
        } else {
            None
        }
    }

    /// Records a failed call; crossing the threshold opens the breaker, and
    /// a failed trial call restarts the cooldown.
    pub fn record_failure(&self) -> Option<BreakerTransition> {
        if self.threshold == 0 {
            return None;
        }
        let mut state = self.state.lock().expect("breaker lock poisoned");
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        match state.opened_at {
            Some(_) => {
                state.opened_at = Some(Instant::now());
                None
            }
            None if state.consecutive_failures >= self.threshold => {
                state.opened_at = Some(Instant::now());
                Some(BreakerTransition::Opened)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let b = Breaker::new(3, Duration::from_secs(60));
        assert_eq!(b.record_failure(), None);
        assert_eq!(b.record_failure(), None);
        assert_eq!(b.record_failure(), Some(BreakerTransition::Opened));
        assert!(!b.allow());
    }

    #[test]
    fn success_resets_the_failure_run() {
        let b = Breaker::new(2, Duration::from_secs(60));
        assert_eq!(b.record_failure(), None);
        assert_eq!(b.record_success(), None);
        assert_eq!(b.record_failure(), None);
        assert!(b.allow());
    }

    #[test]
    fn trial_success_closes_after_cooldown() {
        let b = Breaker::new(1, Duration::ZERO);
        assert_eq!(b.record_failure(), Some(BreakerTransition::Opened));
        // Zero cooldown: the trial call is allowed immediately.
        assert!(b.allow());
        assert_eq!(b.record_success(), Some(BreakerTransition::Closed));
        assert!(b.allow());
    }

    #[test]
    fn zero_threshold_never_opens() {
        let b = Breaker::new(0, Duration::from_secs(60));
        for _ in 0..10 {
            assert_eq!(b.record_failure(), None);
        }
        assert!(b.allow());
    }
}
