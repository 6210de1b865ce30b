#![forbid(unsafe_code)]

//! Lifecycle signals and per-entity publish/subscribe channels.
//!
//! The guide, every tour, every spot and every marker own an [`EventBus`].
//! Dispatch is synchronous and fire-and-forget: listeners return nothing
//! and cannot veto a transition. Signals that must also reach guide-level
//! listeners and extensions are queued in an [`Outbox`] while a protocol
//! runs and flushed once it has finished mutating state.

use std::fmt;

/// Identity of a tour within one guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TourId(pub u32);

/// Identity of a spot within one guide. Unlike a spot's index it survives
/// removal of earlier spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpotId(pub u64);

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tour#{}", self.0)
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spot#{}", self.0)
    }
}

/// A lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A spot was appended to a tour.
    Add { tour: TourId, spot: SpotId },
    /// A spot is about to receive focus.
    PreFocus { tour: TourId, spot: SpotId },
    /// A spot received focus.
    Focus {
        tour: TourId,
        spot: SpotId,
        previous: Option<SpotId>,
    },
    /// A spot lost focus.
    Defocus {
        tour: TourId,
        spot: SpotId,
        next: Option<SpotId>,
    },
    /// A tour became the active tour.
    Start { tour: TourId },
    /// A tour stopped being the active tour.
    Stop { tour: TourId },
    /// The guide container was shown.
    Show,
    /// The guide container was hidden.
    Hide,
    /// The guide was dismissed by the reader.
    Dismiss,
    /// A marker is about to attach.
    Marking { tour: TourId, spot: SpotId },
    /// A marker attached and was placed.
    Marked { tour: TourId, spot: SpotId },
    /// A marker is about to detach.
    Unmarking { tour: TourId, spot: SpotId },
    /// A marker detached.
    Unmarked { tour: TourId, spot: SpotId },
}

impl Signal {
    /// Wire name of the signal.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::PreFocus { .. } => "pre-focus",
            Self::Focus { .. } => "focus",
            Self::Defocus { .. } => "defocus",
            Self::Start { .. } => "start",
            Self::Stop { .. } => "stop",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Dismiss => "dismiss",
            Self::Marking { .. } => "marking",
            Self::Marked { .. } => "marked",
            Self::Unmarking { .. } => "unmarking",
            Self::Unmarked { .. } => "unmarked",
        }
    }

    /// The tour the signal concerns, if any.
    #[must_use]
    pub const fn tour(&self) -> Option<TourId> {
        match self {
            Self::Add { tour, .. }
            | Self::PreFocus { tour, .. }
            | Self::Focus { tour, .. }
            | Self::Defocus { tour, .. }
            | Self::Start { tour }
            | Self::Stop { tour }
            | Self::Marking { tour, .. }
            | Self::Marked { tour, .. }
            | Self::Unmarking { tour, .. }
            | Self::Unmarked { tour, .. } => Some(*tour),
            Self::Show | Self::Hide | Self::Dismiss => None,
        }
    }

    /// The spot the signal concerns, if any.
    #[must_use]
    pub const fn spot(&self) -> Option<SpotId> {
        match self {
            Self::Add { spot, .. }
            | Self::PreFocus { spot, .. }
            | Self::Focus { spot, .. }
            | Self::Defocus { spot, .. }
            | Self::Marking { spot, .. }
            | Self::Marked { spot, .. }
            | Self::Unmarking { spot, .. }
            | Self::Unmarked { spot, .. } => Some(*spot),
            _ => None,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&Signal)>;

struct Listener {
    id: ListenerId,
    filter: Option<String>,
    callback: Callback,
}

/// Synchronous publish/subscribe channel owned by one entity.
///
/// A bus may carry a namespace: on the guide bus (namespace `tours`)
/// `start` is also addressable as `start.tours`.
#[derive(Default)]
pub struct EventBus {
    namespace: Option<&'static str>,
    next_id: u64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("namespace", &self.namespace)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose listeners may also filter on `<name>.<namespace>`.
    #[must_use]
    pub fn namespaced(namespace: &'static str) -> Self {
        Self {
            namespace: Some(namespace),
            ..Self::default()
        }
    }

    /// Listen to every signal.
    pub fn subscribe(&mut self, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.push(None, Box::new(callback))
    }

    /// Listen to signals with a given name (`"focus"`, `"start.tours"`).
    pub fn subscribe_to(
        &mut self,
        name: impl Into<String>,
        callback: impl FnMut(&Signal) + 'static,
    ) -> ListenerId {
        self.push(Some(name.into()), Box::new(callback))
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    /// Deliver a signal to every matching listener, in subscription order.
    pub fn emit(&mut self, signal: &Signal) {
        let namespace = self.namespace;
        for listener in &mut self.listeners {
            if matches_filter(listener.filter.as_deref(), signal.name(), namespace) {
                (listener.callback)(signal);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn push(&mut self, filter: Option<String>, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            filter,
            callback,
        });
        id
    }
}

fn matches_filter(filter: Option<&str>, name: &str, namespace: Option<&str>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    if filter == name {
        return true;
    }
    match (filter.split_once('.'), namespace) {
        (Some((head, ns)), Some(own)) => head == name && ns == own,
        _ => false,
    }
}

/// Signals queued for guide-level delivery.
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<Signal>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Signal) {
        self.queued.push(signal);
    }

    /// Take every queued signal, oldest first.
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.queued)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}
