#![forbid(unsafe_code)]

//! The guide: the explicit context every tour lives in.
//!
//! A [`Guide`] owns the host document, the guide-level configuration, the
//! tours (keyed by label), the single active-tour pointer, the overlay
//! layer, the deferred task queue and the extension registry. Nothing is
//! process-global, so independent guides can coexist, one per document.
//!
//! # Signal flow
//!
//! Tours and markers announce transitions on their own buses and queue a
//! copy in the guide's outbox. Every public operation ends with a flush
//! that delivers the queued signals, in order, to the guide bus
//! (namespace `tours`) and to each enabled extension.
//!
//! # Deferred work
//!
//! Scroll-into-view, smart-arrow passes and resize repositioning wait in a
//! [`TaskQueue`] until the host calls [`Guide::settle`] after layout.

use ahash::AHashMap;
use web_time::Instant;

use waymark_core::config::GuideConfig;
use waymark_core::document::{Document, ElementRole, ElementSpec, NodeId, Positioning};
use waymark_core::event::{EventBus, ListenerId, Outbox, Signal, SpotId, TourId};
use waymark_core::options::{OptionError, OptionSet};
use waymark_core::schedule::{DeferredTask, ResizeThrottle, TaskQueue};
use waymark_marker::Placement;

use crate::error::TourError;
use crate::extension::{Extension, Extensions};
use crate::spot::SpotBuilder;
use crate::tour::{Cx, FocusTarget, Tour};

/// Class carried by the overlay layer.
pub const OVERLAY_CLASS: &str = "wm-overlay";
/// Attribute holding per-node spot overrides in the option mini-language.
pub const SPOT_ATTRIBUTE: &str = "data-waymark";
/// Attribute holding a discovered spot's text.
pub const TEXT_ATTRIBUTE: &str = "data-waymark-text";
/// Attribute holding a discovered spot's caption.
pub const CAPTION_ATTRIBUTE: &str = "data-waymark-caption";

/// Namespace of the guide bus.
pub const GUIDE_NAMESPACE: &str = "tours";

/// Upper bound on settle rounds; tasks may schedule follow-up tasks.
const MAX_SETTLE_ROUNDS: usize = 8;

/// Explicit tour context over a host document.
pub struct Guide<D: Document> {
    doc: D,
    config: GuideConfig,
    overlay: NodeId,
    tours: Vec<Tour>,
    labels: AHashMap<String, TourId>,
    active: Option<TourId>,
    shown: bool,
    bus: EventBus,
    tasks: TaskQueue,
    out: Outbox,
    throttle: ResizeThrottle,
    extensions: Extensions,
    next_spot: u64,
}

impl<D: Document> std::fmt::Debug for Guide<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guide")
            .field("tours", &self.tours)
            .field("active", &self.active)
            .field("shown", &self.shown)
            .field("pending_tasks", &self.tasks.len())
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl<D: Document> Guide<D> {
    /// Create a guide with default configuration.
    pub fn new(doc: D) -> Self {
        Self::with_config(doc, GuideConfig::default())
    }

    /// Create a guide. Appends the overlay layer to the document root.
    pub fn with_config(mut doc: D, config: GuideConfig) -> Self {
        let overlay =
            doc.create_element(ElementSpec::new(ElementRole::OverlayRoot).class(OVERLAY_CLASS));
        doc.set_positioning(overlay, Positioning::Absolute);
        let root = doc.root();
        doc.append_child(root, overlay);

        let throttle = ResizeThrottle::new(config.resize_throttle());
        let shown = config.start_shown;
        tracing::debug!(%overlay, shown, "guide created");
        Self {
            doc,
            config,
            overlay,
            tours: Vec::new(),
            labels: AHashMap::new(),
            active: None,
            shown,
            bus: EventBus::namespaced(GUIDE_NAMESPACE),
            tasks: TaskQueue::new(),
            out: Outbox::new(),
            throttle,
            extensions: Extensions::new(),
            next_spot: 0,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn doc(&self) -> &D {
        &self.doc
    }

    /// Mutable access to the host document, for hosts that re-render.
    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    /// The layer overlay markers attach to.
    pub fn overlay_root(&self) -> NodeId {
        self.overlay
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// The guide bus. Listeners may filter on `start.tours`.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn get_tour(&self, id: TourId) -> Option<&Tour> {
        self.tours.get(id.0 as usize)
    }

    pub fn tour_by_label(&self, label: &str) -> Option<&Tour> {
        self.labels.get(label).and_then(|&id| self.get_tour(id))
    }

    pub fn tours(&self) -> impl Iterator<Item = &Tour> {
        self.tours.iter()
    }

    pub fn active_tour(&self) -> Option<&Tour> {
        self.active.and_then(|id| self.get_tour(id))
    }

    // ── Tours ───────────────────────────────────────────────────────────

    /// The tour with this label, created on first request.
    pub fn tour(&mut self, label: &str) -> TourId {
        self.tour_with(label, OptionSet::new())
    }

    /// Like [`Guide::tour`], applying `options` if the tour is created.
    /// An existing tour keeps its options.
    pub fn tour_with(&mut self, label: &str, options: OptionSet) -> TourId {
        if let Some(&id) = self.labels.get(label) {
            return id;
        }
        let id = TourId(self.tours.len() as u32);
        self.tours
            .push(Tour::new(id, label.to_owned(), options, &self.config.options));
        self.labels.insert(label.to_owned(), id);
        tracing::debug!(tour = %id, label, "tour created");
        id
    }

    /// Navigation access to a tour.
    pub fn tour_mut(&mut self, id: TourId) -> Result<TourHandle<'_, D>, TourError> {
        if self.get_tour(id).is_none() {
            return Err(TourError::UnknownTour(id));
        }
        Ok(TourHandle { guide: self, id })
    }

    /// Add a spot to the tour its builder names.
    pub fn add_spot(&mut self, builder: SpotBuilder) -> Result<SpotId, TourError> {
        let tour = builder.tour().ok_or(TourError::MissingTour)?;
        let id = SpotId(self.next_spot);
        let result = self.with_tour(tour, |t, cx| t.add_spot(cx, id, builder))?;
        if result.is_ok() {
            self.next_spot += 1;
        }
        result
    }

    /// Run `f` against one tour with the rest of the guide borrowed, then
    /// flush queued signals.
    fn with_tour<R>(
        &mut self,
        id: TourId,
        f: impl FnOnce(&mut Tour, &mut Cx<'_, D>) -> R,
    ) -> Result<R, TourError> {
        let tour = self
            .tours
            .get_mut(id.0 as usize)
            .ok_or(TourError::UnknownTour(id))?;
        let mut cx = Cx {
            doc: &mut self.doc,
            tasks: &mut self.tasks,
            out: &mut self.out,
            bus: &mut self.bus,
            extensions: &mut self.extensions,
            overlay: self.overlay,
            global: &self.config.options,
        };
        let result = f(tour, &mut cx);
        self.flush();
        Ok(result)
    }

    fn start_tour(&mut self, id: TourId) -> Result<bool, TourError> {
        if self.get_tour(id).is_none() {
            return Err(TourError::UnknownTour(id));
        }
        if !self.shown {
            tracing::debug!(tour = %id, "showing guide before start");
            self.show();
        }
        if let Some(other) = self.active
            && other != id
        {
            self.stop_tour(other)?;
        }
        let started = self.with_tour(id, |t, cx| t.start(cx))?;
        if started {
            self.active = Some(id);
        }
        Ok(started)
    }

    fn stop_tour(&mut self, id: TourId) -> Result<bool, TourError> {
        let stopped = self.with_tour(id, |t, cx| t.stop(cx))?;
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(stopped)
    }

    // ── Container ───────────────────────────────────────────────────────

    /// Show the guide container. Returns whether it was hidden.
    pub fn show(&mut self) -> bool {
        if self.shown {
            return false;
        }
        self.shown = true;
        self.out.push(Signal::Show);
        self.flush();
        true
    }

    /// Hide the guide container. Returns whether it was shown.
    pub fn hide(&mut self) -> bool {
        if !self.shown {
            return false;
        }
        self.shown = false;
        self.out.push(Signal::Hide);
        self.flush();
        true
    }

    pub fn toggle(&mut self) -> bool {
        if self.shown { self.hide() } else { self.show() }
    }

    /// Stop the active tour, hide, and announce the dismissal.
    pub fn dismiss(&mut self) {
        if let Some(active) = self.active
            && let Err(err) = self.stop_tour(active)
        {
            tracing::warn!(error = %err, "stopping active tour on dismiss failed");
        }
        self.hide();
        self.out.push(Signal::Dismiss);
        self.flush();
    }

    // ── Extensions ──────────────────────────────────────────────────────

    /// Register a lifecycle collaborator.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<(), TourError> {
        self.extensions
            .register(extension, &self.config.options)
            .map_err(TourError::from)
    }

    // ── Scheduling ──────────────────────────────────────────────────────

    /// Report a window resize. Returns whether a repositioning pass was
    /// scheduled now rather than deferred to the trailing edge.
    pub fn on_resize(&mut self, now: Instant) -> bool {
        let run = self.throttle.hit(now);
        if run {
            self.tasks.schedule(DeferredTask::RepositionOverlays);
        }
        run
    }

    /// [`Guide::settle`], first releasing a trailing resize pass if its
    /// interval has elapsed.
    pub fn settle_at(&mut self, now: Instant) -> usize {
        if self.throttle.poll(now) {
            self.tasks.schedule(DeferredTask::RepositionOverlays);
        }
        self.settle()
    }

    /// Run deferred work now that layout has settled. Returns the number
    /// of tasks run.
    pub fn settle(&mut self) -> usize {
        let mut ran = 0;
        for _ in 0..MAX_SETTLE_ROUNDS {
            let batch = self.tasks.drain();
            if batch.is_empty() {
                break;
            }
            for task in batch {
                self.run_task(task);
                ran += 1;
            }
        }
        self.flush();
        ran
    }

    fn run_task(&mut self, task: DeferredTask) {
        tracing::trace!(?task, "running deferred task");
        match task {
            DeferredTask::ScrollIntoView { tour, spot } => {
                let Some(s) = self.tours.get(tour.0 as usize).and_then(|t| t.spot_by_id(spot))
                else {
                    return;
                };
                if !s.is_focused() {
                    return;
                }
                if let Some(target) = s.scroll_target(&self.doc)
                    && !self.doc.is_in_viewport(target)
                {
                    self.doc.scroll_into_view(target);
                }
            }
            DeferredTask::AdjustArrow { tour, spot } => {
                if let Some(marker) = self
                    .tours
                    .get_mut(tour.0 as usize)
                    .and_then(|t| t.spot_mut_by_id(spot))
                    .and_then(|s| s.marker_mut())
                {
                    marker.adjust_arrow(&mut self.doc);
                }
            }
            DeferredTask::RepositionOverlays => {
                let Some(tour) = self.active.and_then(|id| self.tours.get_mut(id.0 as usize))
                else {
                    return;
                };
                let id = tour.id();
                for spot in tour.spots_mut() {
                    let spot_id = spot.id();
                    let Some(marker) = spot.marker_mut() else {
                        continue;
                    };
                    if marker.is_shown() && marker.placement() == Placement::Overlay {
                        marker.place(&mut self.doc);
                        if marker.wants_arrow_pass() {
                            self.tasks.schedule(DeferredTask::AdjustArrow {
                                tour: id,
                                spot: spot_id,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Deliver queued signals to the guide bus and enabled extensions.
    fn flush(&mut self) {
        for signal in self.out.drain() {
            self.bus.emit(&signal);
            let tour_options = signal
                .tour()
                .and_then(|id| self.tours.get(id.0 as usize))
                .map(Tour::own_options);
            self.extensions
                .deliver(&signal, &self.config.options, tour_options);
        }
    }
}

/// Navigation access to one tour of a [`Guide`].
///
/// Every operation flushes the signals it caused before returning.
pub struct TourHandle<'g, D: Document> {
    guide: &'g mut Guide<D>,
    id: TourId,
}

impl<D: Document> TourHandle<'_, D> {
    pub fn id(&self) -> TourId {
        self.id
    }

    pub fn tour(&self) -> &Tour {
        // The handle is only constructed for an existing tour and tours are
        // never removed from a guide.
        &self.guide.tours[self.id.0 as usize]
    }

    pub fn doc_mut(&mut self) -> &mut D {
        self.guide.doc_mut()
    }

    /// Activate the tour, showing the guide and stopping any other active
    /// tour first. Returns `false` if it was already active.
    pub fn start(&mut self) -> Result<bool, TourError> {
        self.guide.start_tour(self.id)
    }

    /// Deactivate the tour. Returns `false` if it was not active.
    pub fn stop(&mut self) -> Result<bool, TourError> {
        self.guide.stop_tour(self.id)
    }

    pub fn next(&mut self) -> Result<bool, TourError> {
        self.guide.with_tour(self.id, |t, cx| t.next(cx))?
    }

    pub fn prev(&mut self) -> Result<bool, TourError> {
        self.guide.with_tour(self.id, |t, cx| t.prev(cx))?
    }

    pub fn first(&mut self) -> Result<bool, TourError> {
        self.guide.with_tour(self.id, |t, cx| t.first(cx))?
    }

    pub fn last(&mut self) -> Result<bool, TourError> {
        self.guide.with_tour(self.id, |t, cx| t.last(cx))?
    }

    /// Focus a spot by index or id. `Ok(false)` when the tour is inactive,
    /// the spot is already focused, or no visible spot could be found.
    pub fn focus(&mut self, target: impl Into<FocusTarget>) -> Result<bool, TourError> {
        let target = target.into();
        self.guide.with_tour(self.id, |t, cx| t.focus(cx, target))?
    }

    /// Append a spot. The builder's tour, if any, is replaced by this one.
    pub fn add_spot(&mut self, builder: SpotBuilder) -> Result<SpotId, TourError> {
        self.guide.add_spot(builder.in_tour(self.id))
    }

    /// Add one spot per node matching `selector`, in document order.
    ///
    /// Each node may carry overrides in a `data-waymark` attribute and
    /// content in `data-waymark-text` / `data-waymark-caption`. Every node
    /// is validated before any spot is added, so an error leaves the tour
    /// unchanged.
    pub fn add_spots_matching(&mut self, selector: &str) -> Result<Vec<SpotId>, TourError> {
        let doc = &self.guide.doc;
        let builders: Vec<SpotBuilder> = doc
            .query(selector)
            .into_iter()
            .map(|node| {
                let mut builder = SpotBuilder::node(node).in_tour(self.id);
                if let Some(raw) = doc.attribute(node, SPOT_ATTRIBUTE) {
                    match OptionSet::parse(&raw) {
                        Ok(options) => builder = builder.options(options),
                        Err(err) => warn_bad_overrides(node, &err),
                    }
                }
                if let Some(text) = doc.attribute(node, TEXT_ATTRIBUTE) {
                    builder = builder.text(text);
                }
                if let Some(caption) = doc.attribute(node, CAPTION_ATTRIBUTE) {
                    builder = builder.caption(caption);
                }
                builder
            })
            .collect();

        let tour = self.guide.get_tour(self.id).ok_or(TourError::UnknownTour(self.id))?;
        for builder in &builders {
            builder.validate(doc, &self.guide.config.options, tour.own_options())?;
        }

        let mut added = Vec::with_capacity(builders.len());
        for builder in builders {
            added.push(self.add_spot(builder)?);
        }
        Ok(added)
    }

    pub fn remove_spot(&mut self, spot: SpotId) -> Result<(), TourError> {
        self.guide.with_tour(self.id, |t, cx| t.remove_spot(cx, spot))?
    }

    /// Re-apply highlight and marker state to every spot.
    pub fn refresh(&mut self) -> Result<(), TourError> {
        self.guide.with_tour(self.id, |t, cx| t.refresh(cx))
    }

    /// Stop the tour and discard its spots.
    pub fn reset(&mut self) -> Result<(), TourError> {
        self.guide.with_tour(self.id, |t, cx| t.reset(cx))?;
        if self.guide.active == Some(self.id) {
            self.guide.active = None;
        }
        Ok(())
    }

    /// Subscribe to this tour's own bus.
    pub fn subscribe(&mut self, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.guide.tours[self.id.0 as usize].bus_mut().subscribe(callback)
    }
}

fn warn_bad_overrides(node: NodeId, err: &OptionError) {
    tracing::warn!(%node, error = %err, "ignoring malformed spot overrides");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use waymark_core::geometry::{Rect, Size};
    use waymark_core::memory::MemoryDocument;

    fn guide_with(spots: usize) -> (Guide<MemoryDocument>, TourId, Vec<NodeId>) {
        guide_with_config(spots, GuideConfig::default())
    }

    fn guide_with_config(
        spots: usize,
        config: GuideConfig,
    ) -> (Guide<MemoryDocument>, TourId, Vec<NodeId>) {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let nodes: Vec<_> = (0..spots)
            .map(|i| {
                let n = doc.insert(root, "section");
                doc.set_rect(n, Rect::new(10.0, 10.0 + i as f64 * 50.0, 100.0, 30.0));
                n
            })
            .collect();
        let mut guide = Guide::with_config(doc, config);
        let tour = guide.tour("intro");
        for &n in &nodes {
            guide
                .tour_mut(tour)
                .unwrap()
                .add_spot(SpotBuilder::node(n))
                .unwrap();
        }
        (guide, tour, nodes)
    }

    #[test]
    fn tour_factory_is_idempotent() {
        let mut guide = Guide::new(MemoryDocument::new(Size::new(10.0, 10.0)));
        let a = guide.tour("a");
        assert_eq!(guide.tour("a"), a);
        assert_ne!(guide.tour("b"), a);
        assert_eq!(guide.tours().count(), 2);
    }

    #[test]
    fn unknown_tour_is_an_error() {
        let mut guide = Guide::new(MemoryDocument::new(Size::new(10.0, 10.0)));
        assert_eq!(
            guide.tour_mut(TourId(3)).err(),
            Some(TourError::UnknownTour(TourId(3)))
        );
    }

    #[test]
    fn add_spot_without_tour_is_missing_tour() {
        let (mut guide, _, nodes) = guide_with(1);
        assert_eq!(
            guide.add_spot(SpotBuilder::node(nodes[0])),
            Err(TourError::MissingTour)
        );
    }

    #[test]
    fn start_shows_the_guide_first() {
        let (mut guide, tour, _) = guide_with(2);
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        guide
            .bus_mut()
            .subscribe(move |s| sink.borrow_mut().push(s.name()));
        assert!(!guide.is_shown());
        assert!(guide.tour_mut(tour).unwrap().start().unwrap());
        assert!(guide.is_shown());
        let names = names.borrow();
        assert_eq!(names[0], "show");
        assert_eq!(names[1], "start");
        assert!(names.contains(&"focus"));
    }

    #[test]
    fn namespaced_start_reaches_guide_listeners() {
        let (mut guide, tour, _) = guide_with(1);
        let hits = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&hits);
        guide
            .bus_mut()
            .subscribe_to("start.tours", move |_| *sink.borrow_mut() += 1);
        guide.tour_mut(tour).unwrap().start().unwrap();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn starting_another_tour_stops_the_active_one() {
        let (mut guide, first, nodes) = guide_with(1);
        let second = guide.tour("second");
        guide
            .tour_mut(second)
            .unwrap()
            .add_spot(SpotBuilder::node(nodes[0]))
            .unwrap();
        guide.tour_mut(first).unwrap().start().unwrap();
        guide.tour_mut(second).unwrap().start().unwrap();
        assert!(!guide.get_tour(first).unwrap().is_active());
        assert_eq!(guide.active_tour().map(Tour::id), Some(second));
    }

    #[test]
    fn dismiss_stops_and_hides() {
        let (mut guide, tour, _) = guide_with(2);
        guide.tour_mut(tour).unwrap().start().unwrap();
        guide.dismiss();
        assert!(!guide.is_shown());
        assert!(guide.active_tour().is_none());
        assert!(!guide.get_tour(tour).unwrap().is_active());
    }

    #[test]
    fn toggle_flips_visibility() {
        let mut guide = Guide::new(MemoryDocument::new(Size::new(10.0, 10.0)));
        assert!(guide.toggle());
        assert!(guide.is_shown());
        assert!(guide.toggle());
        assert!(!guide.is_shown());
    }

    #[test]
    fn settle_scrolls_focused_spot_into_view() {
        // Without markers the anchor itself is the scroll target.
        let config = GuideConfig::default()
            .with_options(OptionSet::parse("spot.withMarker: false").unwrap());
        let (mut guide, tour, nodes) = guide_with_config(2, config);
        guide
            .doc_mut()
            .set_rect(nodes[1], Rect::new(10.0, 1500.0, 100.0, 30.0));
        let mut handle = guide.tour_mut(tour).unwrap();
        handle.start().unwrap();
        handle.next().unwrap();
        assert!(guide.pending_tasks() > 0);
        assert!(!guide.doc().is_in_viewport(nodes[1]));
        guide.settle();
        assert!(guide.doc().is_in_viewport(nodes[1]));
        assert_eq!(guide.pending_tasks(), 0);
    }

    #[test]
    fn discovers_spots_from_attributes() {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let a = doc.insert(root, "button");
        doc.add_class(a, "tip");
        doc.set_attribute(a, SPOT_ATTRIBUTE, "marker.position: bottom");
        doc.set_attribute(a, CAPTION_ATTRIBUTE, "Save");
        let b = doc.insert(root, "button");
        doc.add_class(b, "tip");
        doc.set_attribute(b, SPOT_ATTRIBUTE, "nonsense");
        let mut guide = Guide::new(doc);
        let tour = guide.tour("t");
        let ids = guide
            .tour_mut(tour)
            .unwrap()
            .add_spots_matching(".tip")
            .unwrap();
        assert_eq!(ids.len(), 2);
        let t = guide.get_tour(tour).unwrap();
        assert_eq!(t.spot(0).and_then(|s| s.caption()), Some("Save"));
        assert_eq!(
            t.spot(0).and_then(|s| s.own_options().get_str("marker.position")),
            Some("bottom")
        );
        assert!(t.spot(1).is_some_and(|s| s.own_options().is_empty()));
    }

    #[test]
    fn discovery_is_all_or_nothing() {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let tips: Vec<_> = (0..3)
            .map(|_| {
                let n = doc.insert(root, "button");
                doc.add_class(n, "tip");
                n
            })
            .collect();
        doc.set_attribute(tips[2], SPOT_ATTRIBUTE, "marker.placement: floating");
        let mut guide = Guide::new(doc);
        let adds = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&adds);
        guide
            .bus_mut()
            .subscribe_to("add.tours", move |_| *sink.borrow_mut() += 1);
        let tour = guide.tour("t");

        let err = guide
            .tour_mut(tour)
            .unwrap()
            .add_spots_matching(".tip")
            .unwrap_err();
        assert!(matches!(err, TourError::Marker(_)));
        assert_eq!(guide.get_tour(tour).unwrap().len(), 0);
        assert_eq!(*adds.borrow(), 0);

        // Fixing the node lets the same call go through, with fresh ids.
        guide
            .doc_mut()
            .set_attribute(tips[2], SPOT_ATTRIBUTE, "marker.placement: inline");
        let ids = guide
            .tour_mut(tour)
            .unwrap()
            .add_spots_matching(".tip")
            .unwrap();
        assert_eq!(ids, vec![SpotId(0), SpotId(1), SpotId(2)]);
        assert_eq!(*adds.borrow(), 3);
    }
}
