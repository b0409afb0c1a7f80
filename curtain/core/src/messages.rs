//! Panel Messages
//!
//! The vocabulary callers use to address panels: identifiers, transition
//! requests and the static action pairs that describe cascades.
//!
//! # Design Philosophy
//!
//! Requests are plain data. They can be built in code, loaded from a script
//! or queued by a lifecycle listener, and the orchestrator decides what they
//! mean for each panel.

use serde::{Deserialize, Serialize};

/// Stable, unique panel identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(pub String);

impl PanelId {
    /// Create a panel ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PanelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PanelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Target presentation state of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    /// Show the panel
    On,
    /// Hide the panel
    Off,
}

impl Turn {
    /// The opposite turn
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Action a cascade applies to another panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelAction {
    /// Finish whatever the panel is doing, then turn it on
    TurnOn,
    /// Finish whatever the panel is doing, then turn it off
    TurnOff,
    /// Snap the panel's in-flight transition to completion
    ForceFinish,
}

/// A `(target, action)` pair fired when a lifecycle event occurs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPair {
    /// Panel the action applies to
    pub target: PanelId,
    /// What to do to it
    pub action: PanelAction,
}

impl ActionPair {
    /// Create an action pair
    pub fn new(target: impl Into<PanelId>, action: PanelAction) -> Self {
        Self {
            target: target.into(),
            action,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A request to turn a panel on or off, with its cross-panel policy
///
/// Defaults: force-finish the target's in-flight transition and force
/// same-level siblings; everything else off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Panel to turn
    pub panel: PanelId,
    /// Desired presentation state
    pub direction: Turn,
    /// Snap an opposite in-flight transition to completion, then proceed
    #[serde(default = "default_true")]
    pub force_finish_current: bool,
    /// Queue the turn until an opposite in-flight transition completes
    #[serde(default)]
    pub wait_for_current: bool,
    /// Turn on every inactive ancestor first (turn-on only)
    #[serde(default)]
    pub cascade_ancestors: bool,
    /// Turn off panels sharing the target's parent (turn-on only)
    #[serde(default)]
    pub exclusive_at_same_level: bool,
    /// Snap siblings that are mid-open to completion before turning them off
    #[serde(default = "default_true")]
    pub force_siblings: bool,
    /// Let siblings that are mid-open finish, then turn them off
    #[serde(default)]
    pub wait_siblings: bool,
}

impl TransitionRequest {
    /// Request with default policy
    pub fn new(panel: impl Into<PanelId>, direction: Turn) -> Self {
        Self {
            panel: panel.into(),
            direction,
            force_finish_current: true,
            wait_for_current: false,
            cascade_ancestors: false,
            exclusive_at_same_level: false,
            force_siblings: true,
            wait_siblings: false,
        }
    }

    /// Request to turn a panel on
    pub fn on(panel: impl Into<PanelId>) -> Self {
        Self::new(panel, Turn::On)
    }

    /// Request to turn a panel off
    pub fn off(panel: impl Into<PanelId>) -> Self {
        Self::new(panel, Turn::Off)
    }

    /// Set whether to force-finish the target's opposite transition
    #[must_use]
    pub fn force_finish_current(mut self, force: bool) -> Self {
        self.force_finish_current = force;
        self
    }

    /// Set whether to wait for the target's opposite transition
    #[must_use]
    pub fn wait_for_current(mut self, wait: bool) -> Self {
        self.wait_for_current = wait;
        self
    }

    /// Set whether to turn on inactive ancestors first
    #[must_use]
    pub fn cascade_ancestors(mut self, cascade: bool) -> Self {
        self.cascade_ancestors = cascade;
        self
    }

    /// Set whether to turn off same-level siblings
    #[must_use]
    pub fn exclusive_at_same_level(mut self, exclusive: bool) -> Self {
        self.exclusive_at_same_level = exclusive;
        self
    }

    /// Set whether siblings mid-open are force-finished
    #[must_use]
    pub fn force_siblings(mut self, force: bool) -> Self {
        self.force_siblings = force;
        self
    }

    /// Set whether siblings mid-open are allowed to finish first
    #[must_use]
    pub fn wait_siblings(mut self, wait: bool) -> Self {
        self.wait_siblings = wait;
        self
    }

    /// Only wait (never force) for the target's opposite transition
    #[must_use]
    pub fn waiting(self) -> Self {
        self.force_finish_current(false).wait_for_current(true)
    }
}
