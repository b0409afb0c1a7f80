//! External animation contract
//!
//! Panels using `ExternalAnimation` hand playback to a component they do not
//! control. The panel writes two boolean parameters when a transition starts
//! and polls the component's reported state every tick until it reports the
//! expected state at normalized time >= 1.0.

/// Parameter enabling the external component
pub const PARAM_ENABLED: &str = "Enabled";
/// Parameter selecting the on/off state
pub const PARAM_ON: &str = "On";
/// State name reported once the component has settled on
pub const STATE_ON: &str = "On";
/// State name reported once the component has settled off
pub const STATE_OFF: &str = "Off";

/// Opaque animation component driven by a panel
pub trait ExternalAnimator: Send {
    /// Write a named boolean parameter
    fn set_parameter(&mut self, name: &str, value: bool);

    /// Name of the state currently playing
    fn current_state_name(&self) -> &str;

    /// Playback position within the current state (1.0 = end)
    fn current_state_normalized_time(&self) -> f32;

    /// Advance playback by one tick
    ///
    /// Components running on their own clock can ignore this.
    fn advance(&mut self, _delta_secs: f32) {}
}

/// Animator that settles into the requested state after a fixed time
///
/// Used for panels configured with an external animation but no host
/// component, such as in headless simulation.
#[derive(Debug, Clone)]
pub struct TimedAnimator {
    duration_secs: f32,
    elapsed: f32,
    enabled: bool,
    on: bool,
    state: &'static str,
}

impl TimedAnimator {
    /// Create an animator whose transitions take `duration_secs`
    ///
    /// Non-positive durations settle on the first advance.
    #[must_use]
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs: duration_secs.max(0.0),
            elapsed: 0.0,
            enabled: false,
            on: false,
            state: STATE_OFF,
        }
    }

    /// Whether the component is enabled
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn target_state(&self) -> &'static str {
        if self.on {
            STATE_ON
        } else {
            STATE_OFF
        }
    }
}

impl ExternalAnimator for TimedAnimator {
    fn set_parameter(&mut self, name: &str, value: bool) {
        match name {
            PARAM_ENABLED => self.enabled = value,
            PARAM_ON if self.on != value => {
                self.on = value;
                self.elapsed = 0.0;
                self.state = if value { "TurningOn" } else { "TurningOff" };
            }
            _ => {}
        }
    }

    fn current_state_name(&self) -> &str {
        self.state
    }

    fn current_state_normalized_time(&self) -> f32 {
        if self.duration_secs <= 0.0 {
            return if self.state == self.target_state() { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration_secs).min(1.0)
    }

    fn advance(&mut self, delta_secs: f32) {
        if !self.enabled || self.state == self.target_state() {
            return;
        }
        self.elapsed += delta_secs.max(0.0);
        if self.elapsed >= self.duration_secs {
            self.state = self.target_state();
            self.elapsed = self.duration_secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_animator_settles_after_duration() {
        let mut animator = TimedAnimator::new(0.5);
        animator.set_parameter(PARAM_ENABLED, true);
        animator.set_parameter(PARAM_ON, true);
        assert_eq!(animator.current_state_name(), "TurningOn");

        animator.advance(0.25);
        assert_eq!(animator.current_state_name(), "TurningOn");
        assert!((animator.current_state_normalized_time() - 0.5).abs() < 1e-6);

        animator.advance(0.25);
        assert_eq!(animator.current_state_name(), STATE_ON);
        assert!(animator.current_state_normalized_time() >= 1.0);
    }

    #[test]
    fn test_disabled_animator_does_not_advance() {
        let mut animator = TimedAnimator::new(0.1);
        animator.set_parameter(PARAM_ON, true);
        animator.advance(1.0);
        assert_ne!(animator.current_state_name(), STATE_ON);
    }

    #[test]
    fn test_zero_duration_settles_on_first_advance() {
        let mut animator = TimedAnimator::new(0.0);
        animator.set_parameter(PARAM_ENABLED, true);
        animator.set_parameter(PARAM_ON, true);
        animator.advance(0.0);
        assert_eq!(animator.current_state_name(), STATE_ON);
        assert!(animator.current_state_normalized_time() >= 1.0);
    }
}
