//! Countdown Timer
//!
//! A single-purpose interval counter. The timer counts `remaining` down from
//! its duration and reports normalized progress (0.0 at start, 1.0 at end).
//!
//! # Invariants
//!
//! - `remaining` never goes negative
//! - The end callback fires exactly once per run until the timer is reset
//! - A timer with a non-positive duration cannot be constructed

use std::fmt;

use thiserror::Error;

/// Errors raised when configuring a timer
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimerError {
    /// Duration was zero, negative, or not a finite number
    #[error("timer duration must be a positive finite number of seconds, got {0}")]
    InvalidDuration(f32),
}

pub(crate) fn validate_duration(secs: f32) -> Result<f32, TimerError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(TimerError::InvalidDuration(secs))
    }
}

/// Callback invoked when a timer run ends
pub type TimerCallback = Box<dyn FnMut() + Send>;

/// Interval counter producing normalized progress
pub struct CountdownTimer {
    /// Length of one run in seconds
    duration_secs: f32,
    /// Seconds left in the current run
    remaining: f32,
    /// Re-initialize immediately after firing
    auto_reset: bool,
    /// Whether the current run has already fired
    has_fired: bool,
    /// Optional end-of-run listener
    on_end: Option<TimerCallback>,
}

impl CountdownTimer {
    /// Create a timer that runs for `duration_secs`
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if the duration is not a
    /// positive finite number.
    pub fn new(duration_secs: f32) -> Result<Self, TimerError> {
        let duration_secs = validate_duration(duration_secs)?;
        Ok(Self {
            duration_secs,
            remaining: duration_secs,
            auto_reset: false,
            has_fired: false,
            on_end: None,
        })
    }

    /// Create a timer from a duration already known to be valid
    pub(crate) fn from_valid(duration_secs: f32) -> Self {
        debug_assert!(validate_duration(duration_secs).is_ok());
        Self {
            duration_secs,
            remaining: duration_secs,
            auto_reset: false,
            has_fired: false,
            on_end: None,
        }
    }

    /// Restart the timer automatically every time it fires
    #[must_use]
    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset = auto_reset;
        self
    }

    /// Attach an end-of-run callback
    #[must_use]
    pub fn with_on_end(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Rewind to the start of a run
    pub fn initialize(&mut self) {
        self.remaining = self.duration_secs;
        self.has_fired = false;
    }

    /// Change the duration and rewind
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] and leaves the timer untouched
    /// if the new duration is invalid.
    pub fn reset_duration(&mut self, duration_secs: f32) -> Result<(), TimerError> {
        self.duration_secs = validate_duration(duration_secs)?;
        self.initialize();
        Ok(())
    }

    /// Advance the timer by `delta_secs`
    ///
    /// Negative deltas are clamped to zero. Returns `true` on the call that
    /// ended the run.
    pub fn tick(&mut self, delta_secs: f32) -> bool {
        if self.has_fired {
            return false;
        }
        self.remaining -= delta_secs.max(0.0);
        self.check_end()
    }

    /// End the current run immediately
    ///
    /// Returns `true` if this call fired the end of the run.
    pub fn force_finish(&mut self) -> bool {
        if self.has_fired {
            return false;
        }
        self.remaining = 0.0;
        self.check_end()
    }

    fn check_end(&mut self) -> bool {
        if self.remaining > 0.0 || self.has_fired {
            return false;
        }

        self.remaining = 0.0;
        self.has_fired = true;
        if let Some(callback) = self.on_end.as_mut() {
            callback();
        }
        if self.auto_reset {
            self.initialize();
        }
        true
    }

    /// Progress through the current run (0.0 = start, 1.0 = end)
    #[must_use]
    pub fn normalized_progress(&self) -> f32 {
        ((self.duration_secs - self.remaining) / self.duration_secs).clamp(0.0, 1.0)
    }

    /// Seconds left in the current run
    #[must_use]
    pub fn remaining_secs(&self) -> f32 {
        self.remaining
    }

    /// Length of one run in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    /// Whether the current run has fired
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    /// Whether the timer restarts itself after firing
    #[must_use]
    pub fn auto_reset(&self) -> bool {
        self.auto_reset
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("duration_secs", &self.duration_secs)
            .field("remaining", &self.remaining)
            .field("auto_reset", &self.auto_reset)
            .field("has_fired", &self.has_fired)
            .field("has_callback", &self.on_end.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use proptest::prelude::*;

    #[test]
    fn test_rejects_non_positive_duration() {
        assert_eq!(
            CountdownTimer::new(0.0).unwrap_err(),
            TimerError::InvalidDuration(0.0)
        );
        assert!(CountdownTimer::new(-1.0).is_err());
        assert!(CountdownTimer::new(f32::NAN).is_err());
        assert!(CountdownTimer::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_quarter_steps_fire_once_on_last_tick() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let mut timer = CountdownTimer::new(2.0)
            .unwrap()
            .with_on_end(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let mut progress = Vec::new();
        let mut fired_at = Vec::new();
        for step in 0..4 {
            if timer.tick(0.5) {
                fired_at.push(step);
            }
            progress.push(timer.normalized_progress());
        }

        assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(fired_at, vec![3]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Further ticks are no-ops until reset
        assert!(!timer.tick(0.5));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.remaining_secs().abs() < f32::EPSILON);
    }

    #[test]
    fn test_auto_reset_rewinds_after_firing() {
        let mut timer = CountdownTimer::new(1.0).unwrap().with_auto_reset(true);

        assert!(timer.tick(1.5));
        assert!(!timer.has_fired());
        assert!((timer.remaining_secs() - 1.0).abs() < f32::EPSILON);
        assert!(timer.tick(1.0));
    }

    #[test]
    fn test_force_finish_fires_without_elapsed_time() {
        let mut timer = CountdownTimer::new(3.0).unwrap();

        assert!(timer.force_finish());
        assert!(timer.has_fired());
        assert!((timer.normalized_progress() - 1.0).abs() < f32::EPSILON);
        assert!(!timer.force_finish());
    }

    #[test]
    fn test_reset_duration() {
        let mut timer = CountdownTimer::new(1.0).unwrap();
        timer.tick(2.0);
        assert!(timer.has_fired());

        timer.reset_duration(4.0).unwrap();
        assert!(!timer.has_fired());
        assert!((timer.duration_secs() - 4.0).abs() < f32::EPSILON);
        assert!(timer.normalized_progress().abs() < f32::EPSILON);

        assert!(timer.reset_duration(0.0).is_err());
        assert!((timer.duration_secs() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut timer = CountdownTimer::new(1.0).unwrap();
        timer.tick(-5.0);
        assert!(timer.normalized_progress().abs() < f32::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_remaining_never_negative(
            duration in 0.01f32..10.0,
            deltas in proptest::collection::vec(0.0f32..3.0, 0..50),
        ) {
            let mut timer = CountdownTimer::new(duration).unwrap();
            let mut fires = 0;
            for dt in deltas {
                if timer.tick(dt) {
                    fires += 1;
                }
                prop_assert!(timer.remaining_secs() >= 0.0);
                let p = timer.normalized_progress();
                prop_assert!((0.0..=1.0).contains(&p));
            }
            prop_assert!(fires <= 1);
        }
    }
}
