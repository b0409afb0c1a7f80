//! Transition Driver
//!
//! Combines a forward timer, a backward timer and an easing curve into a
//! single progress scalar. The driver knows nothing about what progress means
//! visually; panels hand the value to whatever target they animate.
//!
//! # Invariants
//!
//! - Progress is always in [0.0, 1.0] before easing is applied, and the eased
//!   value is only out of range for overshooting curves
//! - Exactly one timer is live at a time, selected by `direction`
//! - `finish()` always leaves progress at the direction's terminal value

use serde::{Deserialize, Serialize};

use super::easing::EasingFunction;
use super::timer::{validate_duration, CountdownTimer, TimerError};

/// Default length of one transition, in seconds
pub const DEFAULT_TRANSITION_SECS: f32 = 1.0;

/// Which way the driver is moving
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Progress moves from 0.0 toward 1.0
    #[default]
    Forward,
    /// Progress moves from 1.0 toward 0.0
    Backward,
}

impl Direction {
    /// The progress value this direction ends on
    #[must_use]
    pub fn target_progress(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => 0.0,
        }
    }

    /// The opposite direction
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Timing and shape of a driver
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Forward run length in seconds
    pub forward_secs: f32,
    /// Backward run length in seconds
    pub backward_secs: f32,
    /// Curve applied to the live timer's normalized progress
    pub easing: EasingFunction,
    /// Restart the same direction when a run ends
    pub looping: bool,
    /// Flip direction and restart when a run ends
    pub ping_pong: bool,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            forward_secs: DEFAULT_TRANSITION_SECS,
            backward_secs: DEFAULT_TRANSITION_SECS,
            easing: EasingFunction::Linear,
            looping: false,
            ping_pong: false,
        }
    }
}

impl DriverSettings {
    /// Settings with the given run lengths and easing
    #[must_use]
    pub fn new(forward_secs: f32, backward_secs: f32, easing: EasingFunction) -> Self {
        Self {
            forward_secs,
            backward_secs,
            easing,
            ..Self::default()
        }
    }

    /// Enable looping
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Copy of these settings with invalid run lengths replaced by
    /// [`DEFAULT_TRANSITION_SECS`]
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            forward_secs: fallback_secs(self.forward_secs, "forward"),
            backward_secs: fallback_secs(self.backward_secs, "backward"),
            ..self
        }
    }

    /// Enable ping-pong
    #[must_use]
    pub fn ping_pong(mut self, ping_pong: bool) -> Self {
        self.ping_pong = ping_pong;
        self
    }
}

fn fallback_secs(secs: f32, run: &str) -> f32 {
    match validate_duration(secs) {
        Ok(secs) => secs,
        Err(err) => {
            tracing::warn!(run, %err, fallback = DEFAULT_TRANSITION_SECS, "Invalid transition duration");
            DEFAULT_TRANSITION_SECS
        }
    }
}

/// Outcome of advancing the driver by one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverTick {
    /// The driver was not running
    Idle,
    /// A run is in progress
    Running,
    /// A run ended during this tick (the driver may have restarted)
    CycleCompleted,
}

/// Timer + easing unit producing one progress value per tick
#[derive(Debug)]
pub struct TransitionDriver {
    forward: CountdownTimer,
    backward: CountdownTimer,
    settings: DriverSettings,
    direction: Direction,
    progress: f32,
    active: bool,
}

impl TransitionDriver {
    /// Create an idle driver resting at progress 0.0
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if either run length is not
    /// positive.
    pub fn new(settings: DriverSettings) -> Result<Self, TimerError> {
        Ok(Self {
            forward: CountdownTimer::new(settings.forward_secs)?,
            backward: CountdownTimer::new(settings.backward_secs)?,
            settings,
            direction: Direction::Forward,
            progress: 0.0,
            active: false,
        })
    }

    /// Create an idle driver, substituting [`DEFAULT_TRANSITION_SECS`] for
    /// any run length that is not positive
    #[must_use]
    pub fn with_fallback(settings: DriverSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            forward: CountdownTimer::from_valid(settings.forward_secs),
            backward: CountdownTimer::from_valid(settings.backward_secs),
            settings,
            direction: Direction::Forward,
            progress: 0.0,
            active: false,
        }
    }

    /// Replace the driver's settings
    ///
    /// Only allowed while idle; returns `false` and keeps the old settings
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if either run length is not
    /// positive; the driver is left unchanged.
    pub fn set_settings(&mut self, settings: DriverSettings) -> Result<bool, TimerError> {
        if self.active {
            tracing::debug!("Ignoring driver reconfiguration while a run is active");
            return Ok(false);
        }
        let forward = CountdownTimer::new(settings.forward_secs)?;
        let backward = CountdownTimer::new(settings.backward_secs)?;
        self.forward = forward;
        self.backward = backward;
        self.settings = settings;
        Ok(true)
    }

    /// Start moving toward 1.0
    pub fn start_forward(&mut self) {
        self.start(Direction::Forward);
    }

    /// Start moving toward 0.0
    pub fn start_backward(&mut self) {
        self.start(Direction::Backward);
    }

    /// Start a run in `direction`
    ///
    /// Restarting the current direction only rewinds the live timer.
    pub fn start(&mut self, direction: Direction) {
        self.direction = direction;
        self.live_timer_mut().initialize();
        self.active = true;
        self.recompute();
    }

    /// Advance the live timer by `delta_secs`
    pub fn tick(&mut self, delta_secs: f32) -> DriverTick {
        if !self.active {
            return DriverTick::Idle;
        }

        let fired = self.live_timer_mut().tick(delta_secs);
        self.recompute();

        if fired {
            self.on_cycle_end();
            DriverTick::CycleCompleted
        } else {
            DriverTick::Running
        }
    }

    /// Jump to the end of the current run and go idle
    ///
    /// Loop and ping-pong settings do not apply; progress lands exactly on
    /// the direction's terminal value.
    pub fn finish(&mut self) {
        self.live_timer_mut().force_finish();
        self.recompute();
        self.progress = self.direction.target_progress();
        self.active = false;
    }

    /// Park the driver idle at `direction`'s terminal value
    pub fn rest_at(&mut self, direction: Direction) {
        self.direction = direction;
        self.finish();
    }

    fn on_cycle_end(&mut self) {
        if self.settings.ping_pong {
            self.start(self.direction.flipped());
        } else if self.settings.looping {
            self.start(self.direction);
        } else {
            self.active = false;
        }
    }

    fn live_timer(&self) -> &CountdownTimer {
        match self.direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn live_timer_mut(&mut self) -> &mut CountdownTimer {
        match self.direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }

    fn recompute(&mut self) {
        let eased = self
            .settings
            .easing
            .apply(self.live_timer().normalized_progress());
        self.progress = match self.direction {
            Direction::Forward => eased,
            Direction::Backward => 1.0 - eased,
        };
    }

    /// Current progress value
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Current direction
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a run is in progress
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current settings
    #[must_use]
    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }
}
