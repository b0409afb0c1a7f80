//! Lifecycle Events
//!
//! Panels report their progress through four lifecycle events. Events are
//! never delivered while a panel is being mutated: the panel writes them into
//! an [`EventQueue`] and the orchestrator dispatches the queue once the
//! triggering call has finished.
//!
//! Two delivery channels exist:
//! - **Listeners**: callbacks subscribed per `(panel, kind)`, invoked in
//!   registration order. A listener may queue follow-up requests through the
//!   [`RequestSink`] it is handed.
//! - **Streams**: unbounded tokio channels receiving every event, for hosts
//!   that consume lifecycle changes elsewhere.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::messages::{PanelId, TransitionRequest, Turn};

/// The four lifecycle moments of a panel transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A turn-on transition started
    BeginOpen,
    /// A turn-off transition started
    BeginClose,
    /// A turn-on transition completed
    Opened,
    /// A turn-off transition completed
    Closed,
}

impl LifecycleEvent {
    /// All kinds, in lifecycle order
    pub const ALL: [Self; 4] = [Self::BeginOpen, Self::BeginClose, Self::Opened, Self::Closed];

    /// Event emitted when a transition toward `turn` starts
    #[must_use]
    pub fn begin(turn: Turn) -> Self {
        match turn {
            Turn::On => Self::BeginOpen,
            Turn::Off => Self::BeginClose,
        }
    }

    /// Event emitted when a transition toward `turn` completes
    #[must_use]
    pub fn end(turn: Turn) -> Self {
        match turn {
            Turn::On => Self::Opened,
            Turn::Off => Self::Closed,
        }
    }

    /// Whether this marks the start of a transition
    #[must_use]
    pub fn is_begin(self) -> bool {
        matches!(self, Self::BeginOpen | Self::BeginClose)
    }

    /// Direction of the transition this event belongs to
    #[must_use]
    pub fn turn(self) -> Turn {
        match self {
            Self::BeginOpen | Self::Opened => Turn::On,
            Self::BeginClose | Self::Closed => Turn::Off,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeginOpen => "begin_open",
            Self::BeginClose => "begin_close",
            Self::Opened => "opened",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A lifecycle event raised by a specific panel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelEvent {
    /// Panel that raised the event
    pub panel: PanelId,
    /// What happened
    pub kind: LifecycleEvent,
}

impl PanelEvent {
    /// Create a panel event
    pub fn new(panel: impl Into<PanelId>, kind: LifecycleEvent) -> Self {
        Self {
            panel: panel.into(),
            kind,
        }
    }
}

/// Ordered buffer of events awaiting dispatch
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<PanelEvent>,
}

impl EventQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: PanelEvent) {
        self.events.push_back(event);
    }

    /// Take the oldest event
    pub fn pop(&mut self) -> Option<PanelEvent> {
        self.events.pop_front()
    }

    /// Number of pending events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Iterate pending events without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &PanelEvent> {
        self.events.iter()
    }
}

/// Collects requests issued from inside a listener
///
/// Requests are executed after the current dispatch round, never re-entrantly.
#[derive(Debug, Default)]
pub struct RequestSink {
    requests: Vec<TransitionRequest>,
}

impl RequestSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request
    pub fn push(&mut self, request: TransitionRequest) {
        self.requests.push(request);
    }

    /// Queue a default turn-on request
    pub fn turn_on(&mut self, panel: impl Into<PanelId>) {
        self.push(TransitionRequest::on(panel));
    }

    /// Queue a default turn-off request
    pub fn turn_off(&mut self, panel: impl Into<PanelId>) {
        self.push(TransitionRequest::off(panel));
    }

    /// Take every queued request
    pub fn take(&mut self) -> Vec<TransitionRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Whether no requests are queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Lifecycle callback
pub type Listener = Box<dyn FnMut(&PanelEvent, &mut RequestSink) + Send>;

struct Subscription {
    id: ListenerId,
    panel: PanelId,
    kind: LifecycleEvent,
    listener: Listener,
}

/// Per-`(panel, kind)` observer lists
#[derive(Default)]
pub struct ListenerRegistry {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl ListenerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `kind` events of `panel`
    pub fn subscribe(
        &mut self,
        panel: PanelId,
        kind: LifecycleEvent,
        listener: impl FnMut(&PanelEvent, &mut RequestSink) + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        tracing::debug!(panel = %panel, %kind, listener = %id, "Listener subscribed");
        self.subscriptions.push(Subscription {
            id,
            panel,
            kind,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener; returns `false` if it was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        before != self.subscriptions.len()
    }

    /// Invoke every listener matching `event`, in registration order
    pub fn dispatch(&mut self, event: &PanelEvent, sink: &mut RequestSink) -> usize {
        let mut delivered = 0;
        for sub in self
            .subscriptions
            .iter_mut()
            .filter(|sub| sub.kind == event.kind && sub.panel == event.panel)
        {
            (sub.listener)(event, sink);
            delivered += 1;
        }
        delivered
    }

    /// Number of active subscriptions
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether there are no subscriptions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("subscriptions", &self.subscriptions.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Receiving half of an event stream
pub type EventStream = mpsc::UnboundedReceiver<PanelEvent>;

/// Fan-out of every event to channel subscribers
#[derive(Debug, Default)]
pub struct EventBroadcaster {
    senders: Vec<mpsc::UnboundedSender<PanelEvent>>,
}

impl EventBroadcaster {
    /// Create a broadcaster with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stream
    pub fn subscribe(&mut self) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Send `event` to every open stream, pruning closed ones
    pub fn send(&mut self, event: &PanelEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of open streams
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }

    /// Close every stream
    pub fn clear(&mut self) {
        self.senders.clear();
    }
}
