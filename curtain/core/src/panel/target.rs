//! Tween targets
//!
//! What a panel's progress value is written into. The built-in targets write
//! into the panel's [`VisualProperties`]; hosts can supply their own through
//! [`ProgressTarget`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::EasingFunction;

/// Two-component vector used for scale, position and offsets
pub type Vec2 = [f32; 2];

fn lerp2(easing: EasingFunction, from: Vec2, to: Vec2, t: f32) -> Vec2 {
    [
        easing.evaluate(from[0], to[0], t),
        easing.evaluate(from[1], to[1], t),
    ]
}

/// Presentation values a panel's tween writes into
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualProperties {
    /// Opacity, 0.0 transparent to 1.0 opaque
    pub alpha: f32,
    /// Per-axis scale
    pub scale: Vec2,
    /// Anchored position
    pub position: Vec2,
    /// Lower-left edge offset
    pub offset_min: Vec2,
    /// Upper-right edge offset
    pub offset_max: Vec2,
}

impl Default for VisualProperties {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            scale: [1.0, 1.0],
            position: [0.0, 0.0],
            offset_min: [0.0, 0.0],
            offset_max: [0.0, 0.0],
        }
    }
}

/// The panel's visual root: whether it is shown at all, and how
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualRoot {
    /// Whether the visual tree is active
    pub active: bool,
    /// Current presentation values
    pub properties: VisualProperties,
}

/// Receiver of raw progress values
///
/// Called once per tick while the panel animates and once more when the
/// transition is forced to finish.
pub trait ProgressTarget: Send {
    /// Apply progress `t`
    fn apply_progress(&mut self, t: f32);
}

/// Built-in appliers for the panel's own visual properties
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Leave properties untouched
    #[default]
    Hold,
    /// Write progress into alpha
    Fade,
    /// Write progress into both scale axes
    Scale,
}

/// One property interpolated by an organizer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum PropertyTween {
    /// Opacity
    Alpha {
        /// Value at progress 0.0
        from: f32,
        /// Value at progress 1.0
        to: f32,
        /// Curve applied on top of the panel's own easing
        #[serde(default)]
        easing: EasingFunction,
    },
    /// Scale
    Scale {
        /// Value at progress 0.0
        from: Vec2,
        /// Value at progress 1.0
        to: Vec2,
        /// Curve applied on top of the panel's own easing
        #[serde(default)]
        easing: EasingFunction,
    },
    /// Position
    Position {
        /// Value at progress 0.0
        from: Vec2,
        /// Value at progress 1.0
        to: Vec2,
        /// Curve applied on top of the panel's own easing
        #[serde(default)]
        easing: EasingFunction,
    },
    /// Lower-left offset
    OffsetMin {
        /// Value at progress 0.0
        from: Vec2,
        /// Value at progress 1.0
        to: Vec2,
        /// Curve applied on top of the panel's own easing
        #[serde(default)]
        easing: EasingFunction,
    },
    /// Upper-right offset
    OffsetMax {
        /// Value at progress 0.0
        from: Vec2,
        /// Value at progress 1.0
        to: Vec2,
        /// Curve applied on top of the panel's own easing
        #[serde(default)]
        easing: EasingFunction,
    },
}

impl PropertyTween {
    /// Write the interpolated value for `t` into `props`
    pub fn apply(&self, t: f32, props: &mut VisualProperties) {
        match *self {
            Self::Alpha { from, to, easing } => props.alpha = easing.evaluate(from, to, t),
            Self::Scale { from, to, easing } => props.scale = lerp2(easing, from, to, t),
            Self::Position { from, to, easing } => props.position = lerp2(easing, from, to, t),
            Self::OffsetMin { from, to, easing } => props.offset_min = lerp2(easing, from, to, t),
            Self::OffsetMax { from, to, easing } => props.offset_max = lerp2(easing, from, to, t),
        }
    }
}

/// Where a panel's tween progress goes
pub enum TweenTarget {
    /// Built-in applier for the panel's visual properties
    Apply(ApplyMode),
    /// Several properties, each with its own range and curve
    Organizer(Vec<PropertyTween>),
    /// Host-provided target
    Custom(Box<dyn ProgressTarget>),
}

impl TweenTarget {
    /// Apply progress `t`
    pub fn apply(&mut self, t: f32, props: &mut VisualProperties) {
        match self {
            Self::Apply(ApplyMode::Hold) => {}
            Self::Apply(ApplyMode::Fade) => props.alpha = t,
            Self::Apply(ApplyMode::Scale) => props.scale = [t, t],
            Self::Organizer(tweens) => {
                for tween in tweens.iter() {
                    tween.apply(t, props);
                }
            }
            Self::Custom(target) => target.apply_progress(t),
        }
    }
}

impl fmt::Debug for TweenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply(mode) => f.debug_tuple("Apply").field(mode).finish(),
            Self::Organizer(tweens) => f.debug_tuple("Organizer").field(tweens).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    #[test]
    fn test_fade_writes_alpha() {
        let mut props = VisualProperties::default();
        TweenTarget::Apply(ApplyMode::Fade).apply(0.25, &mut props);
        assert!((props.alpha - 0.25).abs() < f32::EPSILON);
        assert_eq!(props.scale, [1.0, 1.0]);
    }

    #[test]
    fn test_hold_leaves_properties() {
        let mut props = VisualProperties::default();
        TweenTarget::Apply(ApplyMode::Hold).apply(0.0, &mut props);
        assert_eq!(props, VisualProperties::default());
    }

    #[test]
    fn test_organizer_applies_every_property() {
        let mut target = TweenTarget::Organizer(vec![
            PropertyTween::Alpha {
                from: 0.0,
                to: 1.0,
                easing: EasingFunction::Linear,
            },
            PropertyTween::Position {
                from: [0.0, -100.0],
                to: [0.0, 0.0],
                easing: EasingFunction::Linear,
            },
        ]);
        let mut props = VisualProperties::default();
        target.apply(0.5, &mut props);

        assert!((props.alpha - 0.5).abs() < 1e-6);
        assert!((props.position[1] + 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_property_tween_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            tweens: Vec<PropertyTween>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[tweens]]
            property = "scale"
            from = [0.8, 0.8]
            to = [1.0, 1.0]
            easing = "ease_out_back"
            "#,
        )
        .unwrap();

        assert_eq!(
            doc.tweens,
            vec![PropertyTween::Scale {
                from: [0.8, 0.8],
                to: [1.0, 1.0],
                easing: EasingFunction::EaseOutBack,
            }]
        );
    }

    struct Recorder(Arc<Mutex<Vec<f32>>>);

    impl ProgressTarget for Recorder {
        fn apply_progress(&mut self, t: f32) {
            self.0.lock().unwrap().push(t);
        }
    }

    #[test]
    fn test_custom_target_receives_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut target = TweenTarget::Custom(Box::new(Recorder(Arc::clone(&seen))));
        let mut props = VisualProperties::default();

        target.apply(0.1, &mut props);
        target.apply(1.0, &mut props);

        assert_eq!(*seen.lock().unwrap(), vec![0.1, 1.0]);
    }
}
