//! Panel State Machine
//!
//! A panel is a UI surface with a binary presentation state and a transition
//! animation between the two. This module decides whether a requested
//! transition is legal, drives it through the configured motion strategy and
//! reports the four lifecycle events.
//!
//! # State Machine
//!
//! ```text
//!        request(On)                     tick / force_finish
//!   Off ─────────────▶ TransitioningToOn ────────────────────▶ On
//!    ▲   (BeginOpen)                          (Opened)          │
//!    │                                                          │ request(Off)
//!    │   tick / force_finish                                    │ (BeginClose)
//!    └──────────────────────── TransitioningToOff ◀─────────────┘
//!          (Closed)
//! ```
//!
//! A request while transitioning is rejected. The opposite direction can be
//! queued with [`Panel::defer`] and runs once the current transition
//! completes.
//!
//! Panels never call back into the rest of the system. Lifecycle events are
//! written into an [`EventQueue`] that the orchestrator drains afterwards.

mod external;
mod target;

pub use external::{
    ExternalAnimator, TimedAnimator, PARAM_ENABLED, PARAM_ON, STATE_OFF, STATE_ON,
};
pub use target::{
    ApplyMode, ProgressTarget, PropertyTween, TweenTarget, Vec2, VisualProperties, VisualRoot,
};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::{
    Direction, DriverSettings, DriverTick, EasingFunction, TransitionDriver,
    DEFAULT_TRANSITION_SECS,
};
use crate::events::{EventQueue, LifecycleEvent, PanelEvent};
use crate::messages::{ActionPair, PanelId, Turn};

/// Presentation state of a panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    /// Hidden and idle
    #[default]
    Off,
    /// Animating toward `On`
    TransitioningToOn,
    /// Shown and idle
    On,
    /// Animating toward `Off`
    TransitioningToOff,
}

impl PanelState {
    /// Whether a transition is in flight
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::TransitioningToOn | Self::TransitioningToOff)
    }

    /// Direction of the in-flight transition, if any
    #[must_use]
    pub fn pending_turn(self) -> Option<Turn> {
        match self {
            Self::TransitioningToOn => Some(Turn::On),
            Self::TransitioningToOff => Some(Turn::Off),
            Self::On | Self::Off => None,
        }
    }

    /// State the panel is in or heading toward
    #[must_use]
    pub fn heading(self) -> Turn {
        match self {
            Self::On | Self::TransitioningToOn => Turn::On,
            Self::Off | Self::TransitioningToOff => Turn::Off,
        }
    }

    fn stable(turn: Turn) -> Self {
        match turn {
            Turn::On => Self::On,
            Turn::Off => Self::Off,
        }
    }

    fn transitioning(turn: Turn) -> Self {
        match turn {
            Turn::On => Self::TransitioningToOn,
            Turn::Off => Self::TransitioningToOff,
        }
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::TransitioningToOn => "transitioning_to_on",
            Self::On => "on",
            Self::TransitioningToOff => "transitioning_to_off",
        };
        f.write_str(name)
    }
}

/// Opposite-direction request recorded while a transition is in flight
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredAction {
    /// Turn on once the current turn-off completes
    TurnOn,
    /// Turn off once the current turn-on completes
    TurnOff,
}

impl DeferredAction {
    /// The turn this action requests
    #[must_use]
    pub fn turn(self) -> Turn {
        match self {
            Self::TurnOn => Turn::On,
            Self::TurnOff => Turn::Off,
        }
    }
}

/// How a transition is animated and how its completion is detected
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionStrategy {
    /// Complete synchronously on request
    #[default]
    Instant,
    /// Poll an external animation component
    ExternalAnimation,
    /// Run the panel's transition driver
    Tween,
    /// Both the external component and the driver must finish
    AnimationAndTween,
}

impl MotionStrategy {
    /// Whether the transition driver is involved
    #[must_use]
    pub fn uses_tween(self) -> bool {
        matches!(self, Self::Tween | Self::AnimationAndTween)
    }

    /// Whether an external animator is involved
    #[must_use]
    pub fn uses_animator(self) -> bool {
        matches!(self, Self::ExternalAnimation | Self::AnimationAndTween)
    }
}

/// Which frame delta drives a panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Host's scaled (game) time
    #[default]
    Scaled,
    /// Host's real time
    Unscaled,
    /// Real time multiplied by the orchestrator's time scale
    Custom,
}

/// Per-panel configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSettings {
    /// Strategy used when turning on
    pub on_motion: MotionStrategy,
    /// Strategy used when turning off
    pub off_motion: MotionStrategy,
    /// Turn-on duration in seconds
    pub on_secs: f32,
    /// Turn-off duration in seconds
    pub off_secs: f32,
    /// Curve applied to tween progress
    pub easing: EasingFunction,
    /// Frame delta the panel consumes
    pub tick_mode: TickMode,
    /// Cue played when the panel starts opening
    pub open_audio: Option<String>,
    /// Cue played when the panel starts closing
    pub close_audio: Option<String>,
    /// Only play this panel's own cues, never the orchestrator defaults
    pub custom_audio: bool,
    /// Start in the `On` state
    pub turn_on_at_start: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            on_motion: MotionStrategy::Instant,
            off_motion: MotionStrategy::Instant,
            on_secs: DEFAULT_TRANSITION_SECS,
            off_secs: DEFAULT_TRANSITION_SECS,
            easing: EasingFunction::Linear,
            tick_mode: TickMode::Scaled,
            open_audio: None,
            close_audio: None,
            custom_audio: false,
            turn_on_at_start: false,
        }
    }
}

impl PanelSettings {
    /// Settings using `motion` in both directions
    #[must_use]
    pub fn with_motion(motion: MotionStrategy) -> Self {
        Self {
            on_motion: motion,
            off_motion: motion,
            ..Self::default()
        }
    }

    /// Tween in both directions with the given durations and curve
    #[must_use]
    pub fn tween(on_secs: f32, off_secs: f32, easing: EasingFunction) -> Self {
        Self {
            on_secs,
            off_secs,
            easing,
            ..Self::with_motion(MotionStrategy::Tween)
        }
    }

    /// Strategy for a turn
    #[must_use]
    pub fn motion_for(&self, turn: Turn) -> MotionStrategy {
        match turn {
            Turn::On => self.on_motion,
            Turn::Off => self.off_motion,
        }
    }

    fn driver_settings(&self) -> DriverSettings {
        DriverSettings::new(self.on_secs, self.off_secs, self.easing)
    }
}

/// Action pairs fired per lifecycle event, in configured order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionTable {
    begin_open: Vec<ActionPair>,
    begin_close: Vec<ActionPair>,
    opened: Vec<ActionPair>,
    closed: Vec<ActionPair>,
}

impl ActionTable {
    /// Pairs fired on `kind`
    #[must_use]
    pub fn get(&self, kind: LifecycleEvent) -> &[ActionPair] {
        match kind {
            LifecycleEvent::BeginOpen => &self.begin_open,
            LifecycleEvent::BeginClose => &self.begin_close,
            LifecycleEvent::Opened => &self.opened,
            LifecycleEvent::Closed => &self.closed,
        }
    }

    /// Append pairs fired on `kind`
    pub fn extend(&mut self, kind: LifecycleEvent, pairs: impl IntoIterator<Item = ActionPair>) {
        let list = match kind {
            LifecycleEvent::BeginOpen => &mut self.begin_open,
            LifecycleEvent::BeginClose => &mut self.begin_close,
            LifecycleEvent::Opened => &mut self.opened,
            LifecycleEvent::Closed => &mut self.closed,
        };
        list.extend(pairs);
    }

    /// Total number of pairs across all kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.begin_open.len() + self.begin_close.len() + self.opened.len() + self.closed.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn direction_of(turn: Turn) -> Direction {
    match turn {
        Turn::On => Direction::Forward,
        Turn::Off => Direction::Backward,
    }
}

/// A panel and its transition state
pub struct Panel {
    id: PanelId,
    parent: Option<PanelId>,
    children: Vec<PanelId>,
    settings: PanelSettings,
    state: PanelState,
    deferred: Option<DeferredAction>,
    driver: TransitionDriver,
    visual: VisualRoot,
    target: Option<TweenTarget>,
    animator: Option<Box<dyn ExternalAnimator>>,
    actions: ActionTable,
    warned_missing_target: bool,
    warned_missing_animator: bool,
}

impl Panel {
    /// Create a root panel in the `Off` state
    ///
    /// Non-positive durations are replaced by [`DEFAULT_TRANSITION_SECS`]
    /// with a warning.
    pub fn new(id: impl Into<PanelId>, settings: PanelSettings) -> Self {
        let id = id.into();
        let settings = sanitize(&id, settings);
        Self {
            driver: TransitionDriver::with_fallback(settings.driver_settings()),
            id,
            parent: None,
            children: Vec::new(),
            settings,
            state: PanelState::Off,
            deferred: None,
            visual: VisualRoot::default(),
            target: None,
            animator: None,
            actions: ActionTable::default(),
            warned_missing_target: false,
            warned_missing_animator: false,
        }
    }

    /// Attach to a structural parent
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<PanelId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the tween target
    #[must_use]
    pub fn with_target(mut self, target: TweenTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the external animator
    #[must_use]
    pub fn with_animator(mut self, animator: impl ExternalAnimator + 'static) -> Self {
        self.animator = Some(Box::new(animator));
        self
    }

    /// Add action pairs fired on `kind`
    #[must_use]
    pub fn with_actions(
        mut self,
        kind: LifecycleEvent,
        pairs: impl IntoIterator<Item = ActionPair>,
    ) -> Self {
        self.actions.extend(kind, pairs);
        self
    }

    /// Append action pairs fired on `kind` at runtime
    pub fn inject_actions(
        &mut self,
        kind: LifecycleEvent,
        pairs: impl IntoIterator<Item = ActionPair>,
    ) {
        self.actions.extend(kind, pairs);
    }

    /// Replace the tween target
    pub fn set_target(&mut self, target: Option<TweenTarget>) {
        self.target = target;
    }

    /// Replace the external animator
    pub fn set_animator(&mut self, animator: Option<Box<dyn ExternalAnimator>>) {
        self.animator = animator;
    }

    /// Apply new settings
    ///
    /// Rejected while a transition is in flight.
    pub fn reconfigure(&mut self, settings: PanelSettings) -> bool {
        if self.state.is_animating() {
            tracing::debug!(panel = %self.id, state = %self.state, "Ignoring reconfiguration while animating");
            return false;
        }
        let settings = sanitize(&self.id, settings);
        self.driver = TransitionDriver::with_fallback(settings.driver_settings());
        self.driver.rest_at(direction_of(self.state.heading()));
        self.settings = settings;
        true
    }

    /// Request a transition toward `turn`
    ///
    /// Returns `true` if a transition started. A request matching the current
    /// stable state, or any request while animating, is a no-op.
    pub fn request(&mut self, turn: Turn, events: &mut EventQueue) -> bool {
        if self.state.is_animating() {
            tracing::debug!(panel = %self.id, state = %self.state, ?turn, "Rejecting request while animating");
            return false;
        }
        if self.state == PanelState::stable(turn) {
            tracing::debug!(panel = %self.id, state = %self.state, "Panel already in requested state");
            return false;
        }
        self.begin(turn, events);
        true
    }

    fn begin(&mut self, turn: Turn, events: &mut EventQueue) {
        let motion = self.settings.motion_for(turn);
        let kind = LifecycleEvent::begin(turn);

        self.state = PanelState::transitioning(turn);
        self.warned_missing_target = false;
        self.warned_missing_animator = false;
        if turn == Turn::On {
            self.visual.active = true;
        }

        tracing::info!(panel = %self.id, %kind, ?motion, "Transition started");
        events.push(PanelEvent::new(self.id.clone(), kind));

        if motion.uses_animator() {
            if let Some(animator) = self.animator.as_mut() {
                animator.set_parameter(PARAM_ENABLED, true);
                animator.set_parameter(PARAM_ON, turn == Turn::On);
            }
        }
        if motion.uses_tween() {
            self.driver.start(direction_of(turn));
            self.apply_progress();
        }
        if motion == MotionStrategy::Instant {
            self.complete(events);
        }
    }

    /// Advance an in-flight transition by `delta_secs` and poll for
    /// completion
    pub fn tick(&mut self, delta_secs: f32, events: &mut EventQueue) {
        let Some(turn) = self.state.pending_turn() else {
            return;
        };
        let motion = self.settings.motion_for(turn);

        let tween_done = !motion.uses_tween() || self.poll_tween(delta_secs);
        let animation_done = !motion.uses_animator() || self.poll_animator(delta_secs, turn);

        if tween_done && animation_done {
            self.complete(events);
        }
    }

    // Overshooting curves (Back, Elastic) cross the terminal value mid-run,
    // so only the end of the timed run counts.
    fn poll_tween(&mut self, delta_secs: f32) -> bool {
        let tick = self.driver.tick(delta_secs);
        self.apply_progress();
        tick == DriverTick::CycleCompleted || !self.driver.is_active()
    }

    fn poll_animator(&mut self, delta_secs: f32, turn: Turn) -> bool {
        let Some(animator) = self.animator.as_mut() else {
            if !self.warned_missing_animator {
                tracing::warn!(panel = %self.id, "No external animator assigned; treating animation as finished");
                self.warned_missing_animator = true;
            }
            return true;
        };
        animator.advance(delta_secs);
        let expected = match turn {
            Turn::On => STATE_ON,
            Turn::Off => STATE_OFF,
        };
        animator.current_state_name() == expected && animator.current_state_normalized_time() >= 1.0
    }

    /// Complete the in-flight transition immediately
    ///
    /// Snaps progress to the terminal value, emits the completion event and
    /// consumes any deferred action. Returns `false` on a stable panel.
    pub fn force_finish(&mut self, events: &mut EventQueue) -> bool {
        if !self.state.is_animating() {
            return false;
        }
        tracing::debug!(panel = %self.id, state = %self.state, "Forcing transition to finish");
        self.complete(events);
        true
    }

    fn complete(&mut self, events: &mut EventQueue) {
        let Some(turn) = self.state.pending_turn() else {
            return;
        };
        let kind = LifecycleEvent::end(turn);

        self.driver.rest_at(direction_of(turn));
        self.apply_progress();
        self.state = PanelState::stable(turn);

        if turn == Turn::Off {
            if self.settings.off_motion.uses_animator() {
                if let Some(animator) = self.animator.as_mut() {
                    animator.set_parameter(PARAM_ENABLED, false);
                }
            }
            if self.deferred != Some(DeferredAction::TurnOn) {
                self.visual.active = false;
            }
        }

        tracing::info!(panel = %self.id, %kind, "Transition completed");
        events.push(PanelEvent::new(self.id.clone(), kind));

        if let Some(deferred) = self.deferred.take() {
            tracing::debug!(panel = %self.id, ?deferred, "Running deferred action");
            self.request(deferred.turn(), events);
        }
    }

    fn apply_progress(&mut self) {
        let progress = self.driver.progress();
        match self.target.as_mut() {
            Some(target) => target.apply(progress, &mut self.visual.properties),
            None => {
                let motion = self
                    .state
                    .pending_turn()
                    .map(|turn| self.settings.motion_for(turn));
                if motion.is_some_and(MotionStrategy::uses_tween) && !self.warned_missing_target {
                    tracing::warn!(panel = %self.id, "Tween strategy without a target; progress is not applied");
                    self.warned_missing_target = true;
                }
            }
        }
    }

    /// Queue the opposite transition to run once the current one completes
    ///
    /// Only accepted while animating, and only for the opposite direction.
    pub fn defer(&mut self, action: DeferredAction) -> bool {
        match self.state.pending_turn() {
            Some(turn) if turn != action.turn() => {
                tracing::debug!(panel = %self.id, ?action, "Deferred action recorded");
                self.deferred = Some(action);
                true
            }
            _ => {
                tracing::debug!(panel = %self.id, state = %self.state, ?action, "Deferred action not applicable");
                false
            }
        }
    }

    /// Drop a recorded deferred action
    pub fn clear_deferred(&mut self) -> Option<DeferredAction> {
        self.deferred.take()
    }

    /// Jump to a stable state without emitting events
    ///
    /// Used to apply start-up state. Any in-flight transition and deferred
    /// action are discarded.
    pub fn reset_to(&mut self, turn: Turn) {
        self.state = PanelState::stable(turn);
        self.deferred = None;
        self.driver.rest_at(direction_of(turn));
        self.visual.active = turn == Turn::On;
        if let Some(target) = self.target.as_mut() {
            target.apply(self.driver.progress(), &mut self.visual.properties);
        }
    }

    /// Force the visual root active
    pub fn activate_visual(&mut self) {
        self.visual.active = true;
    }

    /// Panel identifier
    #[must_use]
    pub fn id(&self) -> &PanelId {
        &self.id
    }

    /// Structural parent, `None` for roots
    #[must_use]
    pub fn parent(&self) -> Option<&PanelId> {
        self.parent.as_ref()
    }

    /// Registered children
    #[must_use]
    pub fn children(&self) -> &[PanelId] {
        &self.children
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Whether the panel is stably on
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state == PanelState::On
    }

    /// Whether a transition is in flight
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    /// Recorded deferred action
    #[must_use]
    pub fn deferred(&self) -> Option<DeferredAction> {
        self.deferred
    }

    /// Current driver progress
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.driver.progress()
    }

    /// Visual root
    #[must_use]
    pub fn visual(&self) -> &VisualRoot {
        &self.visual
    }

    /// Settings
    #[must_use]
    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    /// Action pairs fired on `kind`
    #[must_use]
    pub fn actions(&self, kind: LifecycleEvent) -> &[ActionPair] {
        self.actions.get(kind)
    }

    /// Whether a tween target is assigned
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Whether an external animator is assigned
    #[must_use]
    pub fn has_animator(&self) -> bool {
        self.animator.is_some()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<PanelId>) {
        self.parent = parent;
    }

    pub(crate) fn add_child(&mut self, child: PanelId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: &PanelId) {
        self.children.retain(|c| c != child);
    }

    pub(crate) fn take_children(&mut self) -> Vec<PanelId> {
        std::mem::take(&mut self.children)
    }
}

fn sanitize(id: &PanelId, mut settings: PanelSettings) -> PanelSettings {
    for (label, secs) in [("on_secs", &mut settings.on_secs), ("off_secs", &mut settings.off_secs)] {
        if !(secs.is_finite() && *secs > 0.0) {
            tracing::warn!(panel = %id, field = label, value = *secs, fallback = DEFAULT_TRANSITION_SECS, "Invalid panel duration");
            *secs = DEFAULT_TRANSITION_SECS;
        }
    }
    settings
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("state", &self.state)
            .field("deferred", &self.deferred)
            .field("progress", &self.driver.progress())
            .field("visual", &self.visual)
            .field("target", &self.target)
            .field("has_animator", &self.animator.is_some())
            .field("actions", &self.actions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    fn kinds(events: &mut EventQueue) -> Vec<LifecycleEvent> {
        std::iter::from_fn(|| events.pop()).map(|e| e.kind).collect()
    }

    fn tween_panel(id: &str) -> Panel {
        Panel::new(id, PanelSettings::tween(1.0, 1.0, EasingFunction::Linear))
            .with_target(TweenTarget::Apply(ApplyMode::Fade))
    }

    #[test]
    fn test_instant_request_completes_synchronously() {
        let mut panel = Panel::new("menu", PanelSettings::default());
        let mut events = EventQueue::new();

        assert!(panel.request(Turn::On, &mut events));
        assert_eq!(panel.state(), PanelState::On);
        assert!(panel.visual().active);
        assert!((panel.progress() - 1.0).abs() < f32::EPSILON);
        assert_eq!(
            kinds(&mut events),
            vec![LifecycleEvent::BeginOpen, LifecycleEvent::Opened]
        );

        assert!(panel.request(Turn::Off, &mut events));
        assert_eq!(panel.state(), PanelState::Off);
        assert!(!panel.visual().active);
    }

    #[test]
    fn test_request_matching_stable_state_is_noop() {
        let mut panel = Panel::new("menu", PanelSettings::default());
        let mut events = EventQueue::new();

        assert!(!panel.request(Turn::Off, &mut events));
        assert!(events.is_empty());

        panel.request(Turn::On, &mut events);
        events.clear();
        assert!(!panel.request(Turn::On, &mut events));
        assert!(events.is_empty());
        assert_eq!(panel.state(), PanelState::On);
    }

    #[test]
    fn test_tween_completes_after_ticks() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();

        assert!(panel.request(Turn::On, &mut events));
        assert_eq!(panel.state(), PanelState::TransitioningToOn);
        assert!(panel.visual().properties.alpha.abs() < f32::EPSILON);

        panel.tick(0.5, &mut events);
        assert_eq!(panel.state(), PanelState::TransitioningToOn);
        assert!((panel.visual().properties.alpha - 0.5).abs() < 1e-5);

        panel.tick(0.5, &mut events);
        assert_eq!(panel.state(), PanelState::On);
        assert_eq!(
            kinds(&mut events),
            vec![LifecycleEvent::BeginOpen, LifecycleEvent::Opened]
        );
    }

    #[test]
    fn test_overshooting_tween_runs_full_duration() {
        for easing in [EasingFunction::EaseOutBack, EasingFunction::EaseOutElastic] {
            let mut panel = Panel::new("menu", PanelSettings::tween(1.0, 1.0, easing))
                .with_target(TweenTarget::Apply(ApplyMode::Fade));
            let mut events = EventQueue::new();
            panel.request(Turn::On, &mut events);

            // EaseOutBack passes through 1.0 near t = 0.37
            panel.tick(0.3702, &mut events);
            for _ in 0..12 {
                panel.tick(0.05, &mut events);
                assert_eq!(panel.state(), PanelState::TransitioningToOn, "{easing:?}");
            }

            panel.tick(0.1, &mut events);
            assert_eq!(panel.state(), PanelState::On, "{easing:?}");
            assert!((panel.progress() - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_request_while_animating_is_rejected() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();
        panel.request(Turn::On, &mut events);

        assert!(!panel.request(Turn::Off, &mut events));
        assert!(!panel.request(Turn::On, &mut events));
        assert_eq!(panel.state(), PanelState::TransitioningToOn);
    }

    #[test]
    fn test_force_finish_snaps_and_emits() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();
        panel.request(Turn::On, &mut events);
        panel.tick(0.2, &mut events);
        events.clear();

        assert!(panel.force_finish(&mut events));
        assert_eq!(panel.state(), PanelState::On);
        assert!((panel.progress() - 1.0).abs() < f32::EPSILON);
        assert!((panel.visual().properties.alpha - 1.0).abs() < f32::EPSILON);
        assert_eq!(kinds(&mut events), vec![LifecycleEvent::Opened]);

        assert!(!panel.force_finish(&mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn test_deferred_turn_off_runs_after_opened() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();
        panel.request(Turn::On, &mut events);

        assert!(panel.defer(DeferredAction::TurnOff));
        panel.tick(1.0, &mut events);

        assert_eq!(panel.state(), PanelState::TransitioningToOff);
        assert_eq!(panel.deferred(), None);
        assert_eq!(
            kinds(&mut events),
            vec![
                LifecycleEvent::BeginOpen,
                LifecycleEvent::Opened,
                LifecycleEvent::BeginClose
            ]
        );
    }

    #[test]
    fn test_defer_rules() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();

        assert!(!panel.defer(DeferredAction::TurnOff));

        panel.request(Turn::On, &mut events);
        assert!(!panel.defer(DeferredAction::TurnOn));
        assert!(panel.defer(DeferredAction::TurnOff));
        assert_eq!(panel.clear_deferred(), Some(DeferredAction::TurnOff));
    }

    #[test]
    fn test_close_keeps_visual_when_turn_on_deferred() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();
        panel.reset_to(Turn::On);

        panel.request(Turn::Off, &mut events);
        panel.defer(DeferredAction::TurnOn);
        panel.force_finish(&mut events);

        assert!(panel.visual().active);
        assert_eq!(panel.state(), PanelState::TransitioningToOn);
    }

    #[test]
    fn test_missing_target_keeps_state_consistent() {
        let mut panel = Panel::new("menu", PanelSettings::tween(0.5, 0.5, EasingFunction::Linear));
        let mut events = EventQueue::new();

        panel.request(Turn::On, &mut events);
        panel.tick(0.5, &mut events);

        assert_eq!(panel.state(), PanelState::On);
        assert_eq!(panel.visual().properties, VisualProperties::default());
    }

    /// Animator that plays back one scripted `(state, time)` frame per tick
    struct ScriptedAnimator {
        params: Arc<Mutex<Vec<(String, bool)>>>,
        script: std::collections::VecDeque<(&'static str, f32)>,
        state: &'static str,
        time: f32,
    }

    impl ScriptedAnimator {
        fn new(script: &[(&'static str, f32)]) -> (Self, Arc<Mutex<Vec<(String, bool)>>>) {
            let params = Arc::new(Mutex::new(Vec::new()));
            let animator = Self {
                params: Arc::clone(&params),
                script: script.iter().copied().collect(),
                state: "Idle",
                time: 0.0,
            };
            (animator, params)
        }
    }

    impl ExternalAnimator for ScriptedAnimator {
        fn set_parameter(&mut self, name: &str, value: bool) {
            self.params.lock().unwrap().push((name.to_string(), value));
        }

        fn current_state_name(&self) -> &str {
            self.state
        }

        fn current_state_normalized_time(&self) -> f32 {
            self.time
        }

        fn advance(&mut self, _delta_secs: f32) {
            if let Some((state, time)) = self.script.pop_front() {
                self.state = state;
                self.time = time;
            }
        }
    }

    #[test]
    fn test_external_animation_polls_state_and_time() {
        let (animator, params) = ScriptedAnimator::new(&[("On", 0.5), ("Off", 1.0), ("On", 1.0)]);
        let mut panel = Panel::new(
            "menu",
            PanelSettings::with_motion(MotionStrategy::ExternalAnimation),
        )
        .with_animator(animator);
        let mut events = EventQueue::new();

        panel.request(Turn::On, &mut events);
        assert_eq!(
            *params.lock().unwrap(),
            vec![("Enabled".to_string(), true), ("On".to_string(), true)]
        );

        // Right state, not finished playing
        panel.tick(0.1, &mut events);
        assert_eq!(panel.state(), PanelState::TransitioningToOn);

        // Finished playing, wrong state
        panel.tick(0.1, &mut events);
        assert_eq!(panel.state(), PanelState::TransitioningToOn);

        panel.tick(0.1, &mut events);
        assert_eq!(panel.state(), PanelState::On);
    }

    #[test]
    fn test_animation_and_tween_needs_both() {
        let (animator, _params) = ScriptedAnimator::new(&[("TurningOn", 0.5), ("On", 1.0)]);
        let settings = PanelSettings {
            on_motion: MotionStrategy::AnimationAndTween,
            ..PanelSettings::tween(0.5, 0.5, EasingFunction::Linear)
        };
        let mut panel = Panel::new("menu", settings)
            .with_target(TweenTarget::Apply(ApplyMode::Fade))
            .with_animator(animator);
        let mut events = EventQueue::new();

        panel.request(Turn::On, &mut events);
        panel.tick(0.5, &mut events);
        assert!((panel.progress() - 1.0).abs() < f32::EPSILON);
        assert_eq!(panel.state(), PanelState::TransitioningToOn);

        panel.tick(0.1, &mut events);
        assert_eq!(panel.state(), PanelState::On);
    }

    #[test]
    fn test_missing_animator_finishes_on_first_poll() {
        let mut panel = Panel::new(
            "menu",
            PanelSettings::with_motion(MotionStrategy::ExternalAnimation),
        );
        let mut events = EventQueue::new();

        panel.request(Turn::On, &mut events);
        assert_eq!(panel.state(), PanelState::TransitioningToOn);
        panel.tick(0.0, &mut events);
        assert_eq!(panel.state(), PanelState::On);
    }

    #[test]
    fn test_invalid_durations_fall_back() {
        let panel = Panel::new("menu", PanelSettings::tween(0.0, -1.0, EasingFunction::Linear));
        assert!((panel.settings().on_secs - DEFAULT_TRANSITION_SECS).abs() < f32::EPSILON);
        assert!((panel.settings().off_secs - DEFAULT_TRANSITION_SECS).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reconfigure_only_when_idle() {
        let mut panel = tween_panel("menu");
        let mut events = EventQueue::new();
        panel.request(Turn::On, &mut events);

        assert!(!panel.reconfigure(PanelSettings::tween(2.0, 2.0, EasingFunction::Linear)));

        panel.force_finish(&mut events);
        assert!(panel.reconfigure(PanelSettings::tween(2.0, 2.0, EasingFunction::EaseOutQuad)));
        assert_eq!(panel.settings().easing, EasingFunction::EaseOutQuad);
        assert!((panel.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset_to_emits_nothing() {
        let mut panel = tween_panel("menu");
        panel.reset_to(Turn::On);
        assert!(panel.is_on());
        assert!(panel.visual().active);
        assert!((panel.visual().properties.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_action_table() {
        let panel = Panel::new("menu", PanelSettings::default()).with_actions(
            LifecycleEvent::Opened,
            [ActionPair::new("ticker", crate::messages::PanelAction::TurnOn)],
        );
        assert_eq!(panel.actions(LifecycleEvent::Opened).len(), 1);
        assert!(panel.actions(LifecycleEvent::Closed).is_empty());
    }
}
