//! Easing Functions
//!
//! Pure mapping of normalized progress to shaped progress. Every curve maps
//! 0.0 to 0.0 and 1.0 to 1.0; the Back, Elastic and Spring families overshoot
//! in between.

use serde::{Deserialize, Serialize};

/// Easing functions for smooth animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Slow start, fast end
    EaseIn,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,

    /// Damped oscillation that settles on the end value
    Spring,

    /// Quadratic ease in
    EaseInQuad,

    /// Quadratic ease out
    EaseOutQuad,

    /// Quadratic ease in and out
    EaseInOutQuad,

    /// Cubic ease in
    EaseInCubic,

    /// Cubic ease out
    EaseOutCubic,

    /// Cubic ease in and out
    EaseInOutCubic,

    /// Quartic ease in
    EaseInQuart,

    /// Quartic ease out
    EaseOutQuart,

    /// Quartic ease in and out
    EaseInOutQuart,

    /// Quintic ease in
    EaseInQuint,

    /// Quintic ease out
    EaseOutQuint,

    /// Quintic ease in and out
    EaseInOutQuint,

    /// Sinusoidal ease in
    EaseInSine,

    /// Sinusoidal ease out
    EaseOutSine,

    /// Sinusoidal ease in and out
    EaseInOutSine,

    /// Exponential ease in
    EaseInExpo,

    /// Exponential ease out
    EaseOutExpo,

    /// Exponential ease in and out
    EaseInOutExpo,

    /// Circular ease in
    EaseInCirc,

    /// Circular ease out
    EaseOutCirc,

    /// Circular ease in and out
    EaseInOutCirc,

    /// Pull back before moving
    EaseInBack,

    /// Overshoot then settle
    EaseOutBack,

    /// Pull back, overshoot, settle
    EaseInOutBack,

    /// Elastic wind-up at start
    EaseInElastic,

    /// Elastic effect at end
    EaseOutElastic,

    /// Elastic at both ends
    EaseInOutElastic,

    /// Bounce effect at start
    EaseInBounce,

    /// Bounce effect at end
    EaseOutBounce,

    /// Bounce at both ends
    EaseInOutBounce,
}

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * std::f32::consts::PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * std::f32::consts::PI) / 4.5;

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}

impl EasingFunction {
    /// Every curve, in declaration order
    pub const ALL: [EasingFunction; 35] = [
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::Spring,
        Self::EaseInQuad,
        Self::EaseOutQuad,
        Self::EaseInOutQuad,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
        Self::EaseInQuart,
        Self::EaseOutQuart,
        Self::EaseInOutQuart,
        Self::EaseInQuint,
        Self::EaseOutQuint,
        Self::EaseInOutQuint,
        Self::EaseInSine,
        Self::EaseOutSine,
        Self::EaseInOutSine,
        Self::EaseInExpo,
        Self::EaseOutExpo,
        Self::EaseInOutExpo,
        Self::EaseInCirc,
        Self::EaseOutCirc,
        Self::EaseInOutCirc,
        Self::EaseInBack,
        Self::EaseOutBack,
        Self::EaseInOutBack,
        Self::EaseInElastic,
        Self::EaseOutElastic,
        Self::EaseInOutElastic,
        Self::EaseInBounce,
        Self::EaseOutBounce,
        Self::EaseInOutBounce,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn | Self::EaseInQuad => t * t,
            Self::EaseOut | Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut | Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::Spring => {
                let s = (t * std::f32::consts::PI * (0.2 + 2.5 * t * t * t)).sin()
                    * (1.0 - t).powf(2.2)
                    + t;
                s * (1.0 + 1.2 * (1.0 - t))
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseInQuart => t.powi(4),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Self::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Self::EaseInQuint => t.powi(5),
            Self::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Self::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Self::EaseInSine => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
            Self::EaseOutSine => (t * std::f32::consts::FRAC_PI_2).sin(),
            Self::EaseInOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Self::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }
            Self::EaseOutExpo => {
                if (t - 1.0).abs() < f32::EPSILON {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::EaseInOutExpo => {
                if t == 0.0 {
                    0.0
                } else if (t - 1.0).abs() < f32::EPSILON {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::EaseInCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::EaseOutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Self::EaseInOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Self::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::EaseOutBack => {
                let t_minus_1 = t - 1.0;
                1.0 + BACK_C3 * t_minus_1.powi(3) + BACK_C1 * t_minus_1.powi(2)
            }
            Self::EaseInOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }
            Self::EaseInElastic => {
                if t == 0.0 {
                    0.0
                } else if (t - 1.0).abs() < f32::EPSILON {
                    1.0
                } else {
                    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Self::EaseOutElastic => {
                if t == 0.0 {
                    0.0
                } else if (t - 1.0).abs() < f32::EPSILON {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Self::EaseInOutElastic => {
                if t == 0.0 {
                    0.0
                } else if (t - 1.0).abs() < f32::EPSILON {
                    1.0
                } else if t < 0.5 {
                    -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                } else {
                    (2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                        + 1.0
                }
            }
            Self::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Self::EaseOutBounce => bounce_out(t),
            Self::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }

    /// Interpolate between `from` and `to` along this curve
    #[must_use]
    pub fn evaluate(self, from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * self.apply(t)
    }

    /// Shortcut for `evaluate(0.0, 1.0, t)`
    #[must_use]
    pub fn evaluate01(self, t: f32) -> f32 {
        self.evaluate(0.0, 1.0, t)
    }

    /// Shortcut for `evaluate(1.0, 0.0, t)`
    #[must_use]
    pub fn evaluate10(self, t: f32) -> f32 {
        self.evaluate(1.0, 0.0, t)
    }

    /// Canonical snake_case name, as used in configuration files
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease_in",
            Self::EaseOut => "ease_out",
            Self::EaseInOut => "ease_in_out",
            Self::Spring => "spring",
            Self::EaseInQuad => "ease_in_quad",
            Self::EaseOutQuad => "ease_out_quad",
            Self::EaseInOutQuad => "ease_in_out_quad",
            Self::EaseInCubic => "ease_in_cubic",
            Self::EaseOutCubic => "ease_out_cubic",
            Self::EaseInOutCubic => "ease_in_out_cubic",
            Self::EaseInQuart => "ease_in_quart",
            Self::EaseOutQuart => "ease_out_quart",
            Self::EaseInOutQuart => "ease_in_out_quart",
            Self::EaseInQuint => "ease_in_quint",
            Self::EaseOutQuint => "ease_out_quint",
            Self::EaseInOutQuint => "ease_in_out_quint",
            Self::EaseInSine => "ease_in_sine",
            Self::EaseOutSine => "ease_out_sine",
            Self::EaseInOutSine => "ease_in_out_sine",
            Self::EaseInExpo => "ease_in_expo",
            Self::EaseOutExpo => "ease_out_expo",
            Self::EaseInOutExpo => "ease_in_out_expo",
            Self::EaseInCirc => "ease_in_circ",
            Self::EaseOutCirc => "ease_out_circ",
            Self::EaseInOutCirc => "ease_in_out_circ",
            Self::EaseInBack => "ease_in_back",
            Self::EaseOutBack => "ease_out_back",
            Self::EaseInOutBack => "ease_in_out_back",
            Self::EaseInElastic => "ease_in_elastic",
            Self::EaseOutElastic => "ease_out_elastic",
            Self::EaseInOutElastic => "ease_in_out_elastic",
            Self::EaseInBounce => "ease_in_bounce",
            Self::EaseOutBounce => "ease_out_bounce",
            Self::EaseInOutBounce => "ease_in_out_bounce",
        }
    }

    /// Look up a curve by name
    ///
    /// Accepts snake_case, kebab-case and PascalCase spellings
    /// (`ease_out_back`, `ease-out-back`, `EaseOutBack`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|curve| curve.name().replace('_', "") == wanted)
    }

    /// Look up a curve by name, falling back to [`EasingFunction::Linear`]
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(easing = name, "Unknown easing curve, falling back to linear");
            Self::Linear
        })
    }
}
