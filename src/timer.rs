//! One-shot deadline timer and cooperative cancellation.
//!
//! The [`Timer`] guards the match's wall-clock budget: it is armed once per
//! game and fires a callback on its own thread when the deadline elapses.
//! [`CancelToken`] is the flag threaded through every blocking wait so that
//! external events (a crashed agent process, an operator abort) can stop the
//! turn loop without forcibly interrupting anything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// A reusable one-shot timer.
///
/// At most one deadline can be armed at a time. Once the deadline fires the
/// timer disarms itself and a fresh [`Timer::start`] succeeds again.
#[derive(Debug, Default)]
pub struct Timer {
    armed: Arc<AtomicBool>,
}

impl Timer {
    /// Create a disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot deadline.
    ///
    /// Returns `false` without side effects if a previously armed deadline
    /// has not fired yet. Otherwise the callback runs exactly once, on a
    /// dedicated thread, after `duration` elapses. Concurrent `start` calls
    /// race on a single compare-and-swap, so exactly one of them wins.
    #[must_use = "a false return means the deadline was not armed"]
    pub fn start<F>(&self, duration: Duration, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let armed = Arc::clone(&self.armed);
        let spawned = thread::Builder::new()
            .name("deadline-timer".into())
            .spawn(move || {
                thread::sleep(duration);
                callback();
                // Disarm only after the callback finished, so a rearm cannot
                // produce two in-flight callbacks.
                armed.store(false, Ordering::Release);
            });

        match spawned {
            Ok(_) => true,
            Err(_) => {
                self.armed.store(false, Ordering::Release);
                false
            }
        }
    }

    /// Whether a deadline is currently armed and has not fired.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

/// A cloneable cooperative-cancellation flag.
///
/// Setting the token never preempts a blocked operation; waiters observe the
/// flag at their next poll step and return early. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Callable from any thread; idempotent.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether the flag has been set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
