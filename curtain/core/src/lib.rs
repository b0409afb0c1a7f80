//! Curtain Core - Headless Panel Transition Engine
//!
//! This crate decides when UI panels open and close and drives the
//! animation in between, completely independent of any rendering stack. A
//! host feeds it frame deltas and transition requests; it reports lifecycle
//! events and a progress value per panel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             Host                                 │
//! │   frame deltas ──┐      requests ──┐      ┌── lifecycle events   │
//! └──────────────────┼─────────────────┼──────┼─────────────────────┘
//!                    │                 │      │
//! ┌──────────────────┼─────────────────┼──────┼─────────────────────┐
//! │                  ▼                 ▼      │     CURTAIN CORE     │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                  PanelOrchestrator                         │  │
//! │  │  ancestor cascade · sibling exclusivity · force / wait     │  │
//! │  │  ┌──────────────┐  ┌────────────┐  ┌───────────────────┐   │  │
//! │  │  │PanelRegistry │  │ EventQueue │  │ listeners/streams │   │  │
//! │  │  └──────┬───────┘  └────────────┘  └───────────────────┘   │  │
//! │  └─────────┼─────────────────────────────────────────────────┘  │
//! │            ▼                                                     │
//! │  ┌───────────────────┐   ┌───────────────────┐                   │
//! │  │ Panel (state      │──▶│ TransitionDriver  │── CountdownTimer  │
//! │  │ machine)          │   │                   │── EasingFunction  │
//! │  └───────────────────┘   └───────────────────┘                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`PanelOrchestrator`]: Owns the registry and applies cross-panel policy
//! - [`Panel`]: Per-panel state machine and motion strategy
//! - [`TransitionRequest`]: A turn-on/off request with its policy flags
//! - [`TransitionDriver`]: Timer + easing producing one progress value
//! - [`LifecycleEvent`]: `BeginOpen`, `BeginClose`, `Opened`, `Closed`
//!
//! # Quick Start
//!
//! ```
//! use curtain_core::{
//!     EasingFunction, FrameTime, Panel, PanelOrchestrator, PanelSettings, PanelState,
//!     TransitionRequest,
//! };
//!
//! let mut orchestrator = PanelOrchestrator::default();
//! orchestrator
//!     .register(Panel::new("menu", PanelSettings::tween(0.25, 0.25, EasingFunction::EaseOutCubic)))
//!     .unwrap();
//!
//! assert!(orchestrator.turn_on(TransitionRequest::on("menu")));
//! for _ in 0..20 {
//!     orchestrator.tick(FrameTime::uniform(1.0 / 60.0));
//! }
//! assert_eq!(orchestrator.state_of(&"menu".into()), Some(PanelState::On));
//! ```
//!
//! # Module Overview
//!
//! - [`animation`]: Countdown timer, easing curves and the transition driver
//! - [`panel`]: Panel state machine, tween targets and the external animator contract
//! - [`registry`]: Id-addressed panel arena
//! - [`orchestrator`]: Request resolution and queued event dispatch
//! - [`events`]: Lifecycle events, listeners and event streams
//! - [`messages`]: Panel ids, requests and action pairs
//! - [`config`]: TOML configuration loading
//!
//! # No Rendering Dependencies
//!
//! This crate has **zero** dependencies on any UI or rendering framework.
//! Visual output is limited to [`VisualProperties`] values and the
//! [`ProgressTarget`] / [`ExternalAnimator`] traits.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod config;
pub mod events;
pub mod messages;
pub mod orchestrator;
pub mod panel;
pub mod registry;

// Re-export commonly used types
pub use animation::{
    CountdownTimer, Direction, DriverSettings, DriverTick, EasingFunction, TimerError,
    TransitionDriver, DEFAULT_TRANSITION_SECS,
};
pub use events::{EventQueue, EventStream, LifecycleEvent, ListenerId, PanelEvent, RequestSink};
pub use messages::{ActionPair, PanelAction, PanelId, TransitionRequest, Turn};
pub use orchestrator::{
    AudioCue, AudioSink, FrameTime, OrchestratorSettings, PanelOrchestrator,
};
pub use panel::{
    ApplyMode, DeferredAction, ExternalAnimator, MotionStrategy, Panel, PanelSettings,
    PanelState, ProgressTarget, PropertyTween, TickMode, TimedAnimator, TweenTarget,
    VisualProperties, VisualRoot,
};
pub use registry::{PanelRegistry, RegistryError};

// Configuration
pub use config::{
    default_config_path, load_config, load_config_from_path, parse_config, ConfigError,
    ConfigOverrides, ConfigSource, CurtainConfig,
};
