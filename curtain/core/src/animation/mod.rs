//! Animation Primitives - Surface-Agnostic Transition Timing
//!
//! This module provides the timing building blocks the panel engine uses to
//! animate transitions. None of them know what is being animated: they only
//! produce a progress scalar that panels hand to their visual targets.
//!
//! # Design Philosophy
//!
//! - **Frame-rate independent**: Everything advances by delta seconds, never frames
//! - **Pure easing**: Curves are stateless functions of normalized progress
//! - **Deterministic**: The same tick sequence always yields the same progress
//!
//! # Architecture
//!
//! ```text
//! TransitionDriver (owned by a Panel)
//!     │
//!     ├─→ forward CountdownTimer  ─┐
//!     ├─→ backward CountdownTimer ─┼─→ normalized progress
//!     └─→ EasingFunction ──────────┘        │
//!                                           ▼
//!                                  progress ∈ [0, 1] per tick
//! ```

mod driver;
mod easing;
mod timer;

pub use driver::{Direction, DriverSettings, DriverTick, TransitionDriver, DEFAULT_TRANSITION_SECS};
pub use easing::EasingFunction;
pub use timer::{CountdownTimer, TimerCallback, TimerError};
