//! Panel Orchestrator
//!
//! Resolves [`TransitionRequest`]s into panel state machine calls while
//! enforcing cross-panel policy: ancestor cascade, same-level exclusivity
//! and the force/wait rules for panels that are mid-transition.
//!
//! # Dispatch
//!
//! Panels write lifecycle events into a queue instead of calling out. After
//! every top-level call the orchestrator drains that queue:
//!
//! ```text
//!   turn_on / turn_off / tick
//!            │
//!            ▼
//!      ┌───────────┐  event   ┌────────────────────────────────────┐
//!      │ EventQueue│─────────▶│ listeners → audio → streams → pairs │
//!      └───────────┘          └────────────────────────────────────┘
//!            ▲                                 │ requests / actions
//!            │                                 ▼
//!            │                         ┌──────────────┐
//!            └─────────────────────────│ CommandQueue │
//!                                      └──────────────┘
//! ```
//!
//! Commands run only once every pending event has been dispatched, so a
//! cascade never mutates the registry in the middle of a sibling scan. The
//! loop is bounded by `max_cascade_steps`.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CurtainConfig;
use crate::events::{
    EventBroadcaster, EventQueue, EventStream, LifecycleEvent, ListenerId, ListenerRegistry, PanelEvent,
    RequestSink,
};
use crate::messages::{ActionPair, PanelAction, PanelId, TransitionRequest, Turn};
use crate::panel::{DeferredAction, Panel, PanelState, TickMode};
use crate::registry::{PanelRegistry, RegistryError};

/// Default bound on dispatch steps per top-level call
pub const DEFAULT_MAX_CASCADE_STEPS: usize = 256;

/// Orchestrator-wide settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Panel turned on (with its ancestors) by [`PanelOrchestrator::start`]
    pub entry_panel: Option<PanelId>,
    /// Cue played when a panel without its own cue starts opening
    pub default_open_audio: Option<String>,
    /// Cue played when a panel without its own cue starts closing
    pub default_close_audio: Option<String>,
    /// Multiplier applied to unscaled time for `TickMode::Custom` panels
    pub time_scale: f32,
    /// Upper bound on dispatched events plus executed commands per call
    pub max_cascade_steps: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            entry_panel: None,
            default_open_audio: None,
            default_close_audio: None,
            time_scale: 1.0,
            max_cascade_steps: DEFAULT_MAX_CASCADE_STEPS,
        }
    }
}

/// Frame deltas supplied by the host for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Scaled (game) time in seconds
    pub scaled: f32,
    /// Real time in seconds
    pub unscaled: f32,
}

impl FrameTime {
    /// Frame with distinct scaled and unscaled deltas
    #[must_use]
    pub fn new(scaled: f32, unscaled: f32) -> Self {
        Self { scaled, unscaled }
    }

    /// Frame where scaled and unscaled time agree
    #[must_use]
    pub fn uniform(delta_secs: f32) -> Self {
        Self::new(delta_secs, delta_secs)
    }
}

/// An audio cue to play
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCue {
    /// Panel the cue belongs to
    pub panel: PanelId,
    /// Event that triggered it
    pub kind: LifecycleEvent,
    /// Cue name
    pub name: String,
}

/// Plays panel audio cues
pub trait AudioSink: Send {
    /// Play `cue`
    fn play(&mut self, cue: &AudioCue);
}

#[derive(Debug, Clone)]
enum Command {
    Request(TransitionRequest),
    Action { source: PanelId, pair: ActionPair },
}

/// Owns the panel registry and applies cross-panel transition policy
pub struct PanelOrchestrator {
    settings: OrchestratorSettings,
    registry: PanelRegistry,
    events: EventQueue,
    commands: VecDeque<Command>,
    listeners: ListenerRegistry,
    streams: EventBroadcaster,
    audio: Option<Box<dyn AudioSink>>,
}

impl Default for PanelOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorSettings::default())
    }
}

impl PanelOrchestrator {
    /// Create an orchestrator with an empty registry
    #[must_use]
    pub fn new(settings: OrchestratorSettings) -> Self {
        Self {
            settings,
            registry: PanelRegistry::new(),
            events: EventQueue::new(),
            commands: VecDeque::new(),
            listeners: ListenerRegistry::new(),
            streams: EventBroadcaster::new(),
            audio: None,
        }
    }

    /// Build an orchestrator and register every configured panel
    ///
    /// Panels are registered parent-first regardless of file order. Panels
    /// whose parent never appears are skipped with a warning.
    #[must_use]
    pub fn from_config(config: &CurtainConfig) -> Self {
        let mut orchestrator = Self::new(config.orchestrator.clone());
        let mut pending: Vec<Panel> = config.panels.iter().map(|p| p.build()).collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for panel in pending {
                let ready = match panel.parent() {
                    Some(parent) => orchestrator.registry.contains(parent),
                    None => true,
                };
                if ready {
                    // Duplicates are logged by the registry
                    let _ = orchestrator.register(panel);
                } else {
                    deferred.push(panel);
                }
            }
            if deferred.len() == before {
                for panel in &deferred {
                    tracing::warn!(
                        panel = %panel.id(),
                        parent = ?panel.parent().map(PanelId::as_str),
                        "Skipping panel with unknown parent"
                    );
                }
                break;
            }
            pending = deferred;
        }

        orchestrator
    }

    /// Apply every panel's start state, then open the entry panel
    pub fn start(&mut self) {
        for (_, panel) in self.registry.iter_mut() {
            let turn = if panel.settings().turn_on_at_start {
                Turn::On
            } else {
                Turn::Off
            };
            panel.reset_to(turn);
        }
        tracing::info!(panels = self.registry.len(), "Orchestrator started");

        if let Some(entry) = self.settings.entry_panel.clone() {
            self.turn_on(TransitionRequest::on(entry).cascade_ancestors(true));
        }
    }

    /// Drop every panel, listener and stream
    pub fn shutdown(&mut self) {
        tracing::info!(
            panels = self.registry.len(),
            listeners = self.listeners.len(),
            "Orchestrator shutting down"
        );
        self.registry.clear();
        self.listeners.clear();
        self.streams.clear();
        self.events.clear();
        self.commands.clear();
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register a panel
    ///
    /// # Errors
    ///
    /// See [`PanelRegistry::register`].
    pub fn register(&mut self, panel: Panel) -> Result<(), RegistryError> {
        self.registry.register(panel)
    }

    /// Remove a panel, detaching it from its parent and orphaning its
    /// children
    pub fn unregister(&mut self, id: &PanelId) -> Option<Panel> {
        self.registry.unregister(id)
    }

    /// Whether `id` is registered and stably on
    #[must_use]
    pub fn is_on(&self, id: &PanelId) -> bool {
        self.registry.get(id).is_some_and(Panel::is_on)
    }

    /// Look up a panel
    #[must_use]
    pub fn get(&self, id: &PanelId) -> Option<&Panel> {
        self.registry.get(id)
    }

    /// Look up a panel mutably
    pub fn get_mut(&mut self, id: &PanelId) -> Option<&mut Panel> {
        self.registry.get_mut(id)
    }

    /// State of a panel
    #[must_use]
    pub fn state_of(&self, id: &PanelId) -> Option<PanelState> {
        self.registry.get(id).map(Panel::state)
    }

    /// The registry
    #[must_use]
    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    /// Settings
    #[must_use]
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Call `listener` whenever `panel` raises `kind`
    pub fn subscribe(
        &mut self,
        panel: impl Into<PanelId>,
        kind: LifecycleEvent,
        listener: impl FnMut(&PanelEvent, &mut RequestSink) + Send + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(panel.into(), kind, listener)
    }

    /// Remove a listener
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Stream of every lifecycle event
    pub fn event_stream(&mut self) -> EventStream {
        self.streams.subscribe()
    }

    /// Install the audio sink
    pub fn set_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.audio = Some(sink);
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Apply `request` in its direction
    pub fn turn(&mut self, request: TransitionRequest) -> bool {
        match request.direction {
            Turn::On => self.turn_on(request),
            Turn::Off => self.turn_off(request),
        }
    }

    /// Turn a panel on
    ///
    /// A panel whose parent is hidden stays off unless the request sets
    /// `cascade_ancestors`. Returns `true` if anything changed.
    pub fn turn_on(&mut self, request: TransitionRequest) -> bool {
        let changed = self.apply_turn_on(&request);
        self.drain();
        changed
    }

    /// Turn a panel off
    ///
    /// Returns `true` if anything changed.
    pub fn turn_off(&mut self, request: TransitionRequest) -> bool {
        let changed = self.apply_turn_off(&request);
        self.drain();
        changed
    }

    /// Advance every animating panel by one frame
    pub fn tick(&mut self, frame: FrameTime) {
        let time_scale = self.settings.time_scale;
        for (_, panel) in self.registry.iter_mut() {
            if !panel.is_animating() {
                continue;
            }
            let delta = match panel.settings().tick_mode {
                TickMode::Scaled => frame.scaled,
                TickMode::Unscaled => frame.unscaled,
                TickMode::Custom => frame.unscaled * time_scale,
            };
            panel.tick(delta, &mut self.events);
        }
        self.drain();
    }

    fn apply(&mut self, request: &TransitionRequest) -> bool {
        match request.direction {
            Turn::On => self.apply_turn_on(request),
            Turn::Off => self.apply_turn_off(request),
        }
    }

    fn apply_turn_on(&mut self, request: &TransitionRequest) -> bool {
        let id = &request.panel;
        if !self.registry.contains(id) {
            tracing::warn!(panel = %id, "Cannot turn on unregistered panel");
            return false;
        }

        let mut changed = false;
        if request.cascade_ancestors {
            for ancestor in self.registry.ancestors_of(id).iter().rev() {
                changed |= self.open_ancestor(ancestor, request);
            }
        }

        let parent_visible = self.parent_visible(id);
        let Some(panel) = self.registry.get_mut(id) else {
            return changed;
        };
        match panel.state() {
            PanelState::On if !request.exclusive_at_same_level => {
                tracing::debug!(panel = %id, "Panel already on");
                return changed;
            }
            PanelState::On | PanelState::TransitioningToOn => {}
            PanelState::Off | PanelState::TransitioningToOff if !parent_visible => {
                tracing::debug!(
                    panel = %id,
                    parent = ?panel.parent().map(PanelId::as_str),
                    "Parent is hidden; ignoring turn on"
                );
                return changed;
            }
            PanelState::Off => {
                panel.activate_visual();
                changed |= panel.request(Turn::On, &mut self.events);
            }
            PanelState::TransitioningToOff => {
                changed |= Self::reverse(panel, Turn::On, request, &mut self.events);
            }
        }

        if request.exclusive_at_same_level {
            changed |= self.close_siblings(id, request);
        }
        changed
    }

    fn apply_turn_off(&mut self, request: &TransitionRequest) -> bool {
        let id = &request.panel;
        let Some(panel) = self.registry.get_mut(id) else {
            tracing::warn!(panel = %id, "Cannot turn off unregistered panel");
            return false;
        };

        match panel.state() {
            PanelState::Off | PanelState::TransitioningToOff => {
                tracing::debug!(panel = %id, state = %panel.state(), "Panel already off or closing");
                false
            }
            PanelState::On => panel.request(Turn::Off, &mut self.events),
            PanelState::TransitioningToOn => {
                Self::reverse(panel, Turn::Off, request, &mut self.events)
            }
        }
    }

    /// Handle a request opposing the panel's in-flight transition
    fn reverse(
        panel: &mut Panel,
        turn: Turn,
        request: &TransitionRequest,
        events: &mut EventQueue,
    ) -> bool {
        if request.force_finish_current {
            panel.force_finish(events);
            if turn == Turn::On {
                panel.activate_visual();
            }
            panel.request(turn, events) || panel.state().heading() == turn
        } else if request.wait_for_current {
            let action = match turn {
                Turn::On => DeferredAction::TurnOn,
                Turn::Off => DeferredAction::TurnOff,
            };
            panel.defer(action)
        } else {
            tracing::debug!(panel = %panel.id(), state = %panel.state(), ?turn, "Request conflicts with transition in flight");
            false
        }
    }

    /// Whether `id`'s parent is shown; roots always count as shown
    fn parent_visible(&self, id: &PanelId) -> bool {
        let Some(parent) = self.registry.get(id).and_then(Panel::parent) else {
            return true;
        };
        match self.registry.get(parent) {
            Some(panel) => panel.visual().active,
            None => true,
        }
    }

    fn open_ancestor(&mut self, id: &PanelId, request: &TransitionRequest) -> bool {
        let Some(panel) = self.registry.get_mut(id) else {
            return false;
        };
        match panel.state() {
            PanelState::On | PanelState::TransitioningToOn => false,
            PanelState::Off => {
                tracing::debug!(panel = %id, target = %request.panel, "Opening ancestor");
                panel.activate_visual();
                panel.request(Turn::On, &mut self.events)
            }
            PanelState::TransitioningToOff => {
                Self::reverse(panel, Turn::On, request, &mut self.events)
            }
        }
    }

    fn close_siblings(&mut self, id: &PanelId, request: &TransitionRequest) -> bool {
        let mut changed = false;
        for sibling in self.registry.siblings_of(id) {
            let Some(panel) = self.registry.get_mut(&sibling) else {
                continue;
            };
            match panel.state() {
                PanelState::On => changed |= panel.request(Turn::Off, &mut self.events),
                PanelState::TransitioningToOn if request.force_siblings => {
                    panel.force_finish(&mut self.events);
                    changed |= panel.request(Turn::Off, &mut self.events)
                        || panel.state().heading() == Turn::Off;
                }
                PanelState::TransitioningToOn if request.wait_siblings => {
                    changed |= panel.defer(DeferredAction::TurnOff);
                }
                PanelState::TransitioningToOn => {
                    tracing::debug!(panel = %sibling, "Leaving opening sibling alone");
                }
                PanelState::Off | PanelState::TransitioningToOff => {}
            }
        }
        changed
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn drain(&mut self) {
        let limit = self.settings.max_cascade_steps;
        let mut steps = 0usize;

        loop {
            if let Some(event) = self.events.pop() {
                self.dispatch(&event);
            } else if let Some(command) = self.commands.pop_front() {
                self.execute(command);
            } else {
                break;
            }

            steps += 1;
            if steps >= limit && !(self.events.is_empty() && self.commands.is_empty()) {
                tracing::warn!(
                    limit,
                    dropped_events = self.events.len(),
                    dropped_commands = self.commands.len(),
                    "Cascade step limit reached; dropping remaining work"
                );
                self.events.clear();
                self.commands.clear();
                break;
            }
        }
    }

    fn dispatch(&mut self, event: &PanelEvent) {
        let mut sink = RequestSink::new();
        self.listeners.dispatch(event, &mut sink);
        self.commands
            .extend(sink.take().into_iter().map(Command::Request));

        if event.kind.is_begin() {
            self.play_cue(event);
        }
        self.streams.send(event);

        if let Some(panel) = self.registry.get(&event.panel) {
            self.commands
                .extend(panel.actions(event.kind).iter().map(|pair| Command::Action {
                    source: event.panel.clone(),
                    pair: pair.clone(),
                }));
        }
    }

    fn play_cue(&mut self, event: &PanelEvent) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        let Some(panel) = self.registry.get(&event.panel) else {
            return;
        };
        let settings = panel.settings();
        let (own, fallback) = match event.kind.turn() {
            Turn::On => (&settings.open_audio, &self.settings.default_open_audio),
            Turn::Off => (&settings.close_audio, &self.settings.default_close_audio),
        };
        let name = match own {
            Some(name) => Some(name),
            None if settings.custom_audio => None,
            None => fallback.as_ref(),
        };
        if let Some(name) = name {
            audio.play(&AudioCue {
                panel: event.panel.clone(),
                kind: event.kind,
                name: name.clone(),
            });
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Request(request) => {
                self.apply(&request);
            }
            Command::Action { source, pair } => {
                let parent_visible = self.parent_visible(&pair.target);
                let Some(panel) = self.registry.get_mut(&pair.target) else {
                    tracing::warn!(source = %source, target = %pair.target, action = ?pair.action, "Action targets unregistered panel");
                    return;
                };
                tracing::debug!(source = %source, target = %pair.target, action = ?pair.action, "Running panel action");
                match pair.action {
                    PanelAction::TurnOn if !parent_visible => {
                        tracing::debug!(source = %source, target = %pair.target, "Parent is hidden; skipping turn on action");
                    }
                    PanelAction::TurnOn => {
                        panel.force_finish(&mut self.events);
                        panel.activate_visual();
                        panel.request(Turn::On, &mut self.events);
                    }
                    PanelAction::TurnOff => {
                        panel.force_finish(&mut self.events);
                        panel.request(Turn::Off, &mut self.events);
                    }
                    PanelAction::ForceFinish => {
                        panel.force_finish(&mut self.events);
                    }
                }
            }
        }
    }
}

impl fmt::Debug for PanelOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelOrchestrator")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("pending_events", &self.events.len())
            .field("pending_commands", &self.commands.len())
            .field("listeners", &self.listeners)
            .field("streams", &self.streams.subscriber_count())
            .field("has_audio", &self.audio.is_some())
            .finish()
    }
}
