#![forbid(unsafe_code)]

//! The tour navigation state machine.
//!
//! # States
//!
//! ```text
//!            start()
//!  Inactive ─────────▶ Active ──┐ next / prev / first / last / focus
//!     ▲                  │  ◀───┘
//!     └──────────────────┘
//!            stop()
//! ```
//!
//! # Invariants
//!
//! 1. `current == spots[cursor].id` whenever `cursor` is set.
//! 2. At most one spot is focused, and it is `current`.
//! 3. A failed or declined focus leaves `cursor`, `current` and `previous`
//!    unchanged.
//!
//! # Visibility recovery
//!
//! A hidden target is first given one chance to rebind its anchor. If it
//! is still hidden, its `bounce` option picks a substitute:
//!
//! | bounce     | candidates, in order                                     |
//! |------------|----------------------------------------------------------|
//! | `n`        | spot `n` only                                            |
//! | `forward`  | `i+1 .. len`                                             |
//! | `backward` | `i-1 ..= 0`                                              |
//! | unset      | `i+1 .. len`, then `i-1 ..= 0`                           |
//!
//! The target index itself is never a candidate. The first visible
//! candidate is focused through the same protocol; if none is visible the
//! call reports `false`.

use std::fmt;

use waymark_core::document::{Document, NodeId};
use waymark_core::event::{EventBus, Outbox, Signal, SpotId, TourId};
use waymark_core::options::{OptionSet, Optionable, resolve};
use waymark_core::schedule::{DeferredTask, TaskQueue};
use waymark_marker::Stage;

use crate::error::{SpotRef, TourError};
use crate::extension::Extensions;
use crate::spot::{Bounce, Spot, SpotBuilder};

/// Component id of tours.
pub const TOUR_COMPONENT: &str = "tour";

/// Compiled tour defaults.
#[must_use]
pub fn tour_defaults() -> OptionSet {
    OptionSet::new()
        .with("alwaysHighlight", true)
        .with("alwaysMark", true)
}

/// What [`Tour`] focus resolves to a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// Spot at this index.
    Index(usize),
    /// Spot with this id.
    Spot(SpotId),
    /// The current spot, else the first one.
    Resume,
}

impl From<usize> for FocusTarget {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<SpotId> for FocusTarget {
    fn from(id: SpotId) -> Self {
        Self::Spot(id)
    }
}

/// Guide-owned state a tour operation borrows.
pub(crate) struct Cx<'a, D> {
    pub doc: &'a mut D,
    pub tasks: &'a mut TaskQueue,
    pub out: &'a mut Outbox,
    pub bus: &'a mut EventBus,
    pub extensions: &'a mut Extensions,
    pub overlay: NodeId,
    pub global: &'a OptionSet,
}

impl<D> Cx<'_, D> {
    /// Deliver queued signals to the guide bus and enabled extensions
    /// without waiting for the operation to return. `own` is the calling
    /// tour's option set.
    fn flush(&mut self, tour: TourId, own: &OptionSet) {
        for signal in self.out.drain() {
            self.bus.emit(&signal);
            let tour_options = (signal.tour() == Some(tour)).then_some(own);
            self.extensions.deliver(&signal, self.global, tour_options);
        }
    }
}

/// An ordered, stateful collection of spots.
pub struct Tour {
    id: TourId,
    label: String,
    spots: Vec<Spot>,
    cursor: Option<usize>,
    current: Option<SpotId>,
    previous: Option<SpotId>,
    active: bool,
    own: OptionSet,
    options: OptionSet,
    bus: EventBus,
}

impl fmt::Debug for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tour")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("spots", &self.spots.len())
            .field("cursor", &self.cursor)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("active", &self.active)
            .finish()
    }
}

impl Optionable for Tour {
    fn component_id(&self) -> &str {
        TOUR_COMPONENT
    }

    fn resolved_options(&self) -> &OptionSet {
        &self.options
    }
}

impl Tour {
    pub(crate) fn new(id: TourId, label: String, own: OptionSet, global: &OptionSet) -> Self {
        let options = resolve(TOUR_COMPONENT, &tour_defaults(), Some(global), None, Some(&own));
        Self {
            id,
            label,
            spots: Vec::new(),
            cursor: None,
            current: None,
            previous: None,
            active: false,
            own,
            options,
            bus: EventBus::new(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn id(&self) -> TourId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn spot(&self, index: usize) -> Option<&Spot> {
        self.spots.get(index)
    }

    pub fn spot_by_id(&self, id: SpotId) -> Option<&Spot> {
        self.spots.iter().find(|s| s.id() == id)
    }

    /// Index of the current spot.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Spot> {
        self.cursor.and_then(|i| self.spots.get(i))
    }

    pub fn current_id(&self) -> Option<SpotId> {
        self.current
    }

    pub fn previous_id(&self) -> Option<SpotId> {
        self.previous
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The tour's own overrides, keyed by component id.
    pub fn own_options(&self) -> &OptionSet {
        &self.own
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Whether [`next`](crate::TourHandle::next) can move. A lone spot has
    /// nowhere to go.
    pub fn has_next(&self) -> bool {
        let len = self.spots.len();
        len > 1 && self.cursor.is_none_or(|c| c + 1 < len)
    }

    /// Whether [`prev`](crate::TourHandle::prev) can move.
    pub fn has_prev(&self) -> bool {
        self.spots.len() > 1 && self.cursor.is_some_and(|c| c > 0)
    }

    fn always_highlight(&self) -> bool {
        self.options.is_option_on("alwaysHighlight")
    }

    fn always_mark(&self) -> bool {
        self.options.is_option_on("alwaysMark")
    }

    fn index_of(&self, id: SpotId) -> Option<usize> {
        self.spots.iter().position(|s| s.id() == id)
    }

    pub(crate) fn spot_mut_by_id(&mut self, id: SpotId) -> Option<&mut Spot> {
        self.spots.iter_mut().find(|s| s.id() == id)
    }

    pub(crate) fn spots_mut(&mut self) -> &mut [Spot] {
        &mut self.spots
    }

    fn announce(&mut self, signal: Signal, out: &mut Outbox) {
        self.bus.emit(&signal);
        out.push(signal);
    }

    fn stage(&self, index: usize, overlay: NodeId) -> Stage {
        Stage {
            tour_active: self.active,
            is_current: self.cursor == Some(index),
            always_mark: self.always_mark(),
            overlay_root: overlay,
        }
    }

    fn sync_marker<D: Document>(&mut self, cx: &mut Cx<'_, D>, index: usize) {
        let stage = self.stage(index, cx.overlay);
        if let Some(spot) = self.spots.get_mut(index) {
            spot.sync_marker(cx.doc, &stage, cx.tasks, cx.out);
        }
    }

    fn sync_all_markers<D: Document>(&mut self, cx: &mut Cx<'_, D>) {
        for index in 0..self.spots.len() {
            self.sync_marker(cx, index);
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    pub(crate) fn start<D: Document>(&mut self, cx: &mut Cx<'_, D>) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        tracing::debug!(tour = %self.id, label = %self.label, "tour started");
        self.announce(Signal::Start { tour: self.id }, cx.out);

        let always = self.always_highlight();
        let cursor = self.cursor;
        for (i, spot) in self.spots.iter_mut().enumerate() {
            spot.highlight(cx.doc, always, cursor == Some(i));
        }
        if let Err(err) = self.focus(cx, FocusTarget::Resume) {
            tracing::warn!(tour = %self.id, error = %err, "initial focus failed");
        }
        self.sync_all_markers(cx);
        true
    }

    pub(crate) fn stop<D: Document>(&mut self, cx: &mut Cx<'_, D>) -> bool {
        if !self.active {
            return false;
        }
        let always = self.always_highlight();
        for spot in &mut self.spots {
            spot.dehighlight(cx.doc, true, always);
        }
        self.active = false;
        self.sync_all_markers(cx);
        tracing::debug!(tour = %self.id, label = %self.label, "tour stopped");
        self.announce(Signal::Stop { tour: self.id }, cx.out);
        true
    }

    /// Stop, then discard every spot and the cursor.
    pub(crate) fn reset<D: Document>(&mut self, cx: &mut Cx<'_, D>) {
        self.stop(cx);
        for mut spot in self.spots.drain(..) {
            spot.detach_from(cx.doc, cx.out);
        }
        let id = self.id;
        cx.tasks.cancel_where(|t| task_tour(t) == Some(id));
        self.cursor = None;
        self.current = None;
        self.previous = None;
        tracing::debug!(tour = %self.id, "tour reset");
    }

    // ── Membership ──────────────────────────────────────────────────────

    pub(crate) fn add_spot<D: Document>(
        &mut self,
        cx: &mut Cx<'_, D>,
        id: SpotId,
        builder: SpotBuilder,
    ) -> Result<SpotId, TourError> {
        let index = self.spots.len();
        let spot = builder.build(&*cx.doc, id, index, cx.global, &self.own)?;
        self.spots.push(spot);
        tracing::debug!(tour = %self.id, spot = %id, index, "spot added");
        self.announce(Signal::Add { tour: self.id, spot: id }, cx.out);

        if self.active {
            let always = self.always_highlight();
            self.spots[index].highlight(cx.doc, always, false);
            self.sync_marker(cx, index);
        }
        Ok(id)
    }

    pub(crate) fn remove_spot<D: Document>(
        &mut self,
        cx: &mut Cx<'_, D>,
        id: SpotId,
    ) -> Result<(), TourError> {
        let index = self.index_of(id).ok_or(TourError::BadSpot {
            tour: self.id,
            target: SpotRef::Id(id),
        })?;
        let mut spot = self.spots.remove(index);
        spot.detach_from(cx.doc, cx.out);
        let mut relabel = Vec::new();
        for (i, later) in self.spots.iter_mut().enumerate().skip(index) {
            if later.reindex(cx.doc, cx.out, i) {
                relabel.push(i);
            }
        }

        if self.current == Some(id) {
            self.cursor = None;
            self.current = None;
        } else if let Some(c) = self.cursor
            && c > index
        {
            self.cursor = Some(c - 1);
        }
        if self.previous == Some(id) {
            self.previous = None;
        }
        cx.tasks.cancel_where(|t| task_spot(t) == Some(id));
        tracing::debug!(tour = %self.id, spot = %id, index, "spot removed");
        if self.active {
            for i in relabel {
                self.sync_marker(cx, i);
            }
        }
        Ok(())
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub(crate) fn next<D: Document>(&mut self, cx: &mut Cx<'_, D>) -> Result<bool, TourError> {
        if !self.has_next() {
            return Ok(false);
        }
        let target = self.cursor.map_or(0, |c| c + 1);
        self.focus(cx, FocusTarget::Index(target))
    }

    pub(crate) fn prev<D: Document>(&mut self, cx: &mut Cx<'_, D>) -> Result<bool, TourError> {
        let Some(c) = self.cursor.filter(|_| self.has_prev()) else {
            return Ok(false);
        };
        self.focus(cx, FocusTarget::Index(c - 1))
    }

    pub(crate) fn first<D: Document>(&mut self, cx: &mut Cx<'_, D>) -> Result<bool, TourError> {
        if self.spots.is_empty() {
            return Ok(false);
        }
        self.focus(cx, FocusTarget::Index(0))
    }

    pub(crate) fn last<D: Document>(&mut self, cx: &mut Cx<'_, D>) -> Result<bool, TourError> {
        match self.spots.len() {
            0 => Ok(false),
            len => self.focus(cx, FocusTarget::Index(len - 1)),
        }
    }

    /// Run the focus protocol. `Ok(false)` means nothing moved.
    pub(crate) fn focus<D: Document>(
        &mut self,
        cx: &mut Cx<'_, D>,
        target: FocusTarget,
    ) -> Result<bool, TourError> {
        let _span = tracing::debug_span!("focus", tour = %self.id, ?target).entered();
        if !self.active {
            tracing::debug!("focus declined: tour inactive");
            return Ok(false);
        }
        let Some(index) = self.resolve_target(target)? else {
            return Ok(false);
        };
        self.focus_index(cx, index)
    }

    fn resolve_target(&self, target: FocusTarget) -> Result<Option<usize>, TourError> {
        let bad = |target| TourError::BadSpot {
            tour: self.id,
            target,
        };
        match target {
            FocusTarget::Index(i) if i < self.spots.len() => Ok(Some(i)),
            FocusTarget::Index(i) => Err(bad(SpotRef::Index(i))),
            FocusTarget::Spot(id) => self.index_of(id).map(Some).ok_or(bad(SpotRef::Id(id))),
            FocusTarget::Resume if self.spots.is_empty() => Ok(None),
            FocusTarget::Resume => Ok(Some(self.cursor.unwrap_or(0))),
        }
    }

    fn focus_index<D: Document>(
        &mut self,
        cx: &mut Cx<'_, D>,
        index: usize,
    ) -> Result<bool, TourError> {
        if self.spots[index].is_focused() {
            self.refresh_spot(cx, index);
            tracing::debug!(index, "focus declined: already focused");
            return Ok(false);
        }

        if !self.spots[index].is_visible(cx.doc, cx.out) {
            // Late-created anchors get one more chance.
            self.spots[index].rebind(cx.doc, cx.out);
            if !self.spots[index].is_visible(cx.doc, cx.out) {
                return match self.bounce_candidate(cx, index) {
                    Some(candidate) => {
                        tracing::debug!(from = index, to = candidate, "bouncing off hidden spot");
                        self.focus_index(cx, candidate)
                    }
                    None => {
                        tracing::debug!(index, "focus declined: no visible spot");
                        Ok(false)
                    }
                };
            }
        }

        self.commit_focus(cx, index);
        Ok(true)
    }

    fn bounce_candidate<D: Document>(&mut self, cx: &mut Cx<'_, D>, index: usize) -> Option<usize> {
        let len = self.spots.len();
        let candidates: Vec<usize> = match self.spots[index].bounce() {
            Some(Bounce::Index(i)) => vec![i],
            Some(Bounce::Forward) => (index + 1..len).collect(),
            Some(Bounce::Backward) => (0..index).rev().collect(),
            None => (index + 1..len).chain((0..index).rev()).collect(),
        };
        candidates
            .into_iter()
            .filter(|&i| i != index && i < len)
            .find(|&i| self.spots[i].is_visible(cx.doc, cx.out))
    }

    fn commit_focus<D: Document>(&mut self, cx: &mut Cx<'_, D>, index: usize) {
        let always = self.always_highlight();
        let next_id = self.spots[index].id();
        let previous = self.current;

        if let Some(old) = self.cursor
            && old != index
            && let Some(prev_id) = previous
        {
            self.spots[old].defocus(cx.doc, Some(next_id), always);
            self.announce(
                Signal::Defocus {
                    tour: self.id,
                    spot: prev_id,
                    next: Some(next_id),
                },
                cx.out,
            );
            self.previous = Some(prev_id);
        }

        self.announce(
            Signal::PreFocus {
                tour: self.id,
                spot: next_id,
            },
            cx.out,
        );
        // Observers see pre-focus before the spot's own callback runs.
        cx.flush(self.id, &self.own);
        self.spots[index].run_pre_focus();
        self.spots[index].focus(cx.doc, previous);

        self.cursor = Some(index);
        self.current = Some(next_id);
        self.spots[index].highlight(cx.doc, always, true);
        tracing::debug!(tour = %self.id, spot = %next_id, index, "spot focused");
        self.announce(
            Signal::Focus {
                tour: self.id,
                spot: next_id,
                previous,
            },
            cx.out,
        );

        if self.always_mark() {
            self.sync_marker(cx, index);
        } else {
            self.sync_all_markers(cx);
        }
        self.spots[index].request_scroll(cx.tasks);
    }

    // ── Refresh ─────────────────────────────────────────────────────────

    pub(crate) fn refresh<D: Document>(&mut self, cx: &mut Cx<'_, D>) {
        for index in 0..self.spots.len() {
            self.refresh_spot(cx, index);
        }
    }

    /// Re-apply highlight state and, for the focused spot, re-run focus so
    /// listeners recompute.
    pub(crate) fn refresh_spot<D: Document>(&mut self, cx: &mut Cx<'_, D>, index: usize) {
        let always = self.always_highlight();
        let is_current = self.cursor == Some(index);
        let active = self.active;
        let previous = self.previous;
        let Some(spot) = self.spots.get_mut(index) else {
            return;
        };
        // Rebinds a recreated anchor before anything touches it.
        spot.is_visible(cx.doc, cx.out);
        if active {
            spot.highlight(cx.doc, always, is_current);
        }
        if spot.is_focused() {
            spot.focus(cx.doc, previous);
        }
        self.sync_marker(cx, index);
        self.spots[index].request_scroll(cx.tasks);
    }
}

fn task_tour(task: &DeferredTask) -> Option<TourId> {
    match *task {
        DeferredTask::ScrollIntoView { tour, .. } | DeferredTask::AdjustArrow { tour, .. } => {
            Some(tour)
        }
        DeferredTask::RepositionOverlays => None,
    }
}

fn task_spot(task: &DeferredTask) -> Option<SpotId> {
    match *task {
        DeferredTask::ScrollIntoView { spot, .. } | DeferredTask::AdjustArrow { spot, .. } => {
            Some(spot)
        }
        DeferredTask::RepositionOverlays => None,
    }
}
