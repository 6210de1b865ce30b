#![forbid(unsafe_code)]

//! Spots: one anchored, navigable region of the host document.
//!
//! A spot owns its highlight and focus state and at most one [`Marker`].
//! It never stores which spot is current; that belongs to the tour.
//!
//! The anchor is held as a node handle plus, optionally, the selector it
//! was found by. Hosts that re-render may destroy and recreate the anchor
//! after the spot was registered; the selector lets the spot rebind to
//! the replacement.

use std::fmt;

use waymark_core::document::{Document, NodeId};
use waymark_core::event::{EventBus, Outbox, Signal, SpotId, TourId};
use waymark_core::options::{OptionSet, OptionValue, Optionable, resolve};
use waymark_core::schedule::{DeferredTask, TaskQueue};
use waymark_marker::{Marker, MarkerContent, MarkerSettings, Stage, Template, marker_defaults};

use crate::error::TourError;

/// Class toggled on a highlighted anchor.
pub const HIGHLIGHT_CLASS: &str = "wm-highlighted";
/// Class toggled on the focused anchor.
pub const FOCUS_CLASS: &str = "wm-focused";

/// Component id of spots.
pub const SPOT_COMPONENT: &str = "spot";
/// Component id of markers.
pub const MARKER_COMPONENT: &str = "marker";

/// Compiled spot defaults.
#[must_use]
pub fn spot_defaults() -> OptionSet {
    OptionSet::new()
        .with("highlight", true)
        .with("autoScroll", true)
        .with("withMarker", true)
}

/// Callback run with the spot it concerns.
pub type SpotCallback = Box<dyn FnMut(&Spot)>;

/// Search policy for a visible substitute when a spot is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounce {
    /// Try exactly this spot index.
    Index(usize),
    /// Search increasing indices only.
    Forward,
    /// Search decreasing indices only.
    Backward,
}

impl Bounce {
    /// Read the `bounce` option. Unset or unrecognized values mean the
    /// default forward-then-backward search.
    #[must_use]
    pub fn from_option(value: Option<&OptionValue>) -> Option<Self> {
        match value? {
            OptionValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => {
                Some(Self::Index(*n as usize))
            }
            OptionValue::Str(s) => match s.trim() {
                "forward" => Some(Self::Forward),
                "backward" => Some(Self::Backward),
                other => match other.parse() {
                    Ok(index) => Some(Self::Index(index)),
                    Err(_) => {
                        tracing::warn!(bounce = other, "unrecognized bounce policy, using default");
                        None
                    }
                },
            },
            _ => None,
        }
    }
}

/// Everything needed to construct a [`Spot`].
///
/// ```rust,ignore
/// let spot = SpotBuilder::selector("#save")
///     .in_tour(tour)
///     .caption("Save")
///     .text("Writes the document to disk.")
///     .option("marker.position", "bottom");
/// guide.add_spot(spot)?;
/// ```
#[derive(Default)]
pub struct SpotBuilder {
    tour: Option<TourId>,
    node: Option<NodeId>,
    selector: Option<String>,
    text: Option<String>,
    caption: Option<String>,
    options: OptionSet,
    pre_focus: Option<SpotCallback>,
    on_defocus: Option<SpotCallback>,
}

impl fmt::Debug for SpotBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotBuilder")
            .field("tour", &self.tour)
            .field("node", &self.node)
            .field("selector", &self.selector)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SpotBuilder {
    /// Anchor the spot to a known node.
    #[must_use]
    pub fn node(node: NodeId) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }

    /// Anchor the spot to whatever node a selector resolves to.
    #[must_use]
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    /// Also remember a selector for rebinding a node-anchored spot.
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn in_tour(mut self, tour: TourId) -> Self {
        self.tour = Some(tour);
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Replace the spot's own option overrides.
    #[must_use]
    pub fn options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    /// Set one override by dot path.
    #[must_use]
    pub fn option(mut self, path: &str, value: impl Into<OptionValue>) -> Self {
        self.options.set_path(path, value.into());
        self
    }

    /// Runs before the spot takes focus.
    #[must_use]
    pub fn on_pre_focus(mut self, callback: impl FnMut(&Spot) + 'static) -> Self {
        self.pre_focus = Some(Box::new(callback));
        self
    }

    /// Runs after the spot loses focus.
    #[must_use]
    pub fn on_defocus(mut self, callback: impl FnMut(&Spot) + 'static) -> Self {
        self.on_defocus = Some(Box::new(callback));
        self
    }

    pub fn tour(&self) -> Option<TourId> {
        self.tour
    }

    /// Check the builder against `doc` and the option layers without
    /// consuming it.
    pub(crate) fn validate<D: Document>(
        &self,
        doc: &D,
        global: &OptionSet,
        tour_options: &OptionSet,
    ) -> Result<(), TourError> {
        self.resolve_parts(doc, global, tour_options).map(|_| ())
    }

    /// Validate and turn into a spot at `index`.
    pub(crate) fn build<D: Document>(
        self,
        doc: &D,
        id: SpotId,
        index: usize,
        global: &OptionSet,
        tour_options: &OptionSet,
    ) -> Result<Spot, TourError> {
        let parts = self.resolve_parts(doc, global, tour_options)?;
        Ok(Spot {
            id,
            index,
            tour: parts.tour,
            anchor: parts.anchor,
            selector: parts.selector,
            text: self.text,
            caption: self.caption,
            own: self.options,
            options: parts.options,
            marker_settings: parts.marker,
            focused: false,
            highlighted: false,
            marker: None,
            pre_focus: self.pre_focus,
            on_defocus: self.on_defocus,
            bus: EventBus::new(),
        })
    }

    fn resolve_parts<D: Document>(
        &self,
        doc: &D,
        global: &OptionSet,
        tour_options: &OptionSet,
    ) -> Result<Parts, TourError> {
        let tour = self.tour.ok_or(TourError::MissingTour)?;

        let selector = match self.selector.as_deref().map(str::trim) {
            Some("") => {
                return Err(TourError::InvalidSpot("anchor selector is empty".into()));
            }
            Some(s) => Some(s.to_owned()),
            None => None,
        };
        let anchor = match (self.node, &selector) {
            (Some(node), _) if !doc.contains(node) => {
                return Err(TourError::InvalidSpot(format!("{node} is not in the document")));
            }
            (Some(node), _) => Some(node),
            (None, Some(selector)) => single_match(doc, selector),
            (None, None) => return Err(TourError::InvalidSpot("no anchor given".into())),
        };

        let options = resolve(
            SPOT_COMPONENT,
            &spot_defaults(),
            Some(global),
            Some(tour_options),
            Some(&self.options),
        );
        let marker = if options.is_option_on("withMarker") {
            let marker_options = resolve(
                MARKER_COMPONENT,
                &marker_defaults(),
                Some(global),
                Some(tour_options),
                self.options.section(MARKER_COMPONENT),
            );
            marker_options
                .is_option_on("enabled")
                .then(|| MarkerSettings::from_options(&marker_options))
                .transpose()?
        } else {
            None
        };

        Ok(Parts {
            tour,
            selector,
            anchor,
            options,
            marker,
        })
    }
}

/// Everything a builder resolves to before it becomes a spot.
struct Parts {
    tour: TourId,
    selector: Option<String>,
    anchor: Option<NodeId>,
    options: OptionSet,
    marker: Option<MarkerSettings>,
}

fn single_match<D: Document>(doc: &D, selector: &str) -> Option<NodeId> {
    match doc.query(selector).as_slice() {
        [node] => Some(*node),
        _ => None,
    }
}

/// One anchored region of a tour.
pub struct Spot {
    id: SpotId,
    index: usize,
    tour: TourId,
    anchor: Option<NodeId>,
    selector: Option<String>,
    text: Option<String>,
    caption: Option<String>,
    own: OptionSet,
    options: OptionSet,
    marker_settings: Option<MarkerSettings>,
    focused: bool,
    highlighted: bool,
    marker: Option<Marker>,
    pre_focus: Option<SpotCallback>,
    on_defocus: Option<SpotCallback>,
    bus: EventBus,
}

impl fmt::Debug for Spot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spot")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("tour", &self.tour)
            .field("anchor", &self.anchor)
            .field("selector", &self.selector)
            .field("focused", &self.focused)
            .field("highlighted", &self.highlighted)
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

impl Optionable for Spot {
    fn component_id(&self) -> &str {
        SPOT_COMPONENT
    }

    fn resolved_options(&self) -> &OptionSet {
        &self.options
    }
}

impl Spot {
    pub fn id(&self) -> SpotId {
        self.id
    }

    /// Position in the owning tour. Shifts down when an earlier spot is removed.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tour(&self) -> TourId {
        self.tour
    }

    /// The currently bound anchor node, if any.
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// The spot's own overrides, before layering.
    pub fn own_options(&self) -> &OptionSet {
        &self.own
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn bounce(&self) -> Option<Bounce> {
        Bounce::from_option(self.options.get_path("bounce"))
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Move the spot to `index`. A marker labelled with the old position
    /// is torn down for the next sync to rebuild; returns whether it was.
    pub(crate) fn reindex<D: Document>(
        &mut self,
        doc: &mut D,
        out: &mut Outbox,
        index: usize,
    ) -> bool {
        if self.index == index {
            return false;
        }
        self.index = index;
        if self.content().template() != Template::IndexOnly {
            return false;
        }
        let Some(mut marker) = self.marker.take() else {
            return false;
        };
        marker.remove(doc, out);
        true
    }

    fn content(&self) -> MarkerContent {
        MarkerContent {
            index: self.index,
            caption: self.caption.clone(),
            text: self.text.clone(),
        }
    }

    // ── Visibility ──────────────────────────────────────────────────────

    /// Whether the anchor is one live, displayed node. A stale handle is
    /// rebound through the selector first.
    pub(crate) fn is_visible<D: Document>(&mut self, doc: &mut D, out: &mut Outbox) -> bool {
        let stale = self.anchor.is_none_or(|node| !doc.is_attached(node));
        if stale {
            self.rebind(doc, out);
        }
        self.anchor
            .is_some_and(|node| doc.is_attached(node) && doc.is_displayed(node))
    }

    /// Re-query the selector and bind to its single match, if it changed.
    /// Returns whether the anchor changed.
    pub(crate) fn rebind<D: Document>(&mut self, doc: &mut D, out: &mut Outbox) -> bool {
        let Some(selector) = self.selector.as_deref() else {
            return false;
        };
        let Some(node) = single_match(doc, selector) else {
            return false;
        };
        if self.anchor == Some(node) {
            return false;
        }
        tracing::debug!(spot = %self.id, selector, %node, "spot anchor rebound");
        // A marker built against the old anchor is stale.
        if let Some(mut marker) = self.marker.take() {
            marker.remove(doc, out);
        }
        self.anchor = Some(node);
        if self.focused {
            doc.add_class(node, FOCUS_CLASS);
        }
        if self.highlighted {
            doc.add_class(node, HIGHLIGHT_CLASS);
        }
        true
    }

    // ── Highlight ───────────────────────────────────────────────────────

    /// Apply the highlight state. Returns whether highlighting applies.
    pub(crate) fn highlight<D: Document>(
        &mut self,
        doc: &mut D,
        always_highlight: bool,
        is_current: bool,
    ) -> bool {
        let applicable = (always_highlight || is_current) && self.options.is_option_on("highlight");
        self.set_highlighted(doc, applicable);
        applicable
    }

    /// Clear the highlight when forced or when the tour does not keep
    /// every spot highlighted. Returns whether it applied.
    pub(crate) fn dehighlight<D: Document>(
        &mut self,
        doc: &mut D,
        force: bool,
        always_highlight: bool,
    ) -> bool {
        let applicable = force || !always_highlight;
        if applicable {
            self.set_highlighted(doc, false);
        }
        applicable
    }

    fn set_highlighted<D: Document>(&mut self, doc: &mut D, on: bool) {
        self.highlighted = on;
        if let Some(anchor) = self.anchor {
            if on {
                doc.add_class(anchor, HIGHLIGHT_CLASS);
            } else {
                doc.remove_class(anchor, HIGHLIGHT_CLASS);
            }
        }
    }

    // ── Focus ───────────────────────────────────────────────────────────

    pub(crate) fn run_pre_focus(&mut self) {
        if let Some(mut callback) = self.pre_focus.take() {
            callback(self);
            self.pre_focus = Some(callback);
        }
    }

    /// Take focus.
    pub(crate) fn focus<D: Document>(&mut self, doc: &mut D, previous: Option<SpotId>) {
        self.focused = true;
        if let Some(anchor) = self.anchor {
            doc.add_class(anchor, FOCUS_CLASS);
        }
        self.bus.emit(&Signal::Focus {
            tour: self.tour,
            spot: self.id,
            previous,
        });
    }

    /// Queue a scroll of the focused spot for after layout settles.
    ///
    /// Whether the target is on screen is only decided when the task runs,
    /// against geometry that includes a marker built in the same pass.
    pub(crate) fn request_scroll(&self, tasks: &mut TaskQueue) -> bool {
        self.focused
            && self.options.is_option_on("autoScroll")
            && tasks.schedule(DeferredTask::ScrollIntoView {
                tour: self.tour,
                spot: self.id,
            })
    }

    /// Drop focus.
    pub(crate) fn defocus<D: Document>(
        &mut self,
        doc: &mut D,
        next: Option<SpotId>,
        always_highlight: bool,
    ) {
        self.dehighlight(doc, false, always_highlight);
        self.focused = false;
        if let Some(anchor) = self.anchor {
            doc.remove_class(anchor, FOCUS_CLASS);
        }
        self.bus.emit(&Signal::Defocus {
            tour: self.tour,
            spot: self.id,
            next,
        });
        if let Some(mut callback) = self.on_defocus.take() {
            callback(self);
            self.on_defocus = Some(callback);
        }
    }

    /// The node auto-scroll brings into view: the shown marker if there is
    /// one, otherwise the anchor.
    pub(crate) fn scroll_target<D: Document>(&self, doc: &D) -> Option<NodeId> {
        self.marker
            .as_ref()
            .filter(|m| m.is_shown())
            .and_then(Marker::element)
            .filter(|&e| doc.is_attached(e))
            .or(self.anchor)
    }

    // ── Marker ──────────────────────────────────────────────────────────

    /// Build the marker if needed and show or hide it for `stage`.
    pub(crate) fn sync_marker<D: Document>(
        &mut self,
        doc: &mut D,
        stage: &Stage,
        tasks: &mut TaskQueue,
        out: &mut Outbox,
    ) {
        let Some(settings) = self.marker_settings else {
            return;
        };
        if self.marker.is_none() && stage.tour_active && self.is_visible(doc, out) {
            let Some(anchor) = self.anchor else {
                return;
            };
            let mut marker = Marker::new(self.tour, self.id, settings);
            match marker.build(doc, anchor, &self.content()) {
                Ok(_) => self.marker = Some(marker),
                Err(err) => {
                    tracing::warn!(spot = %self.id, error = %err, "marker build failed");
                    return;
                }
            }
        }
        let Some(marker) = self.marker.as_mut() else {
            return;
        };
        if marker.can_show(doc, stage) {
            marker.show(doc, stage, out);
            if marker.wants_arrow_pass() {
                tasks.schedule(DeferredTask::AdjustArrow {
                    tour: self.tour,
                    spot: self.id,
                });
            }
        } else {
            marker.hide(doc, out);
        }
    }

    pub(crate) fn marker_mut(&mut self) -> Option<&mut Marker> {
        self.marker.as_mut()
    }

    /// Tear down everything the spot put into the document.
    pub(crate) fn detach_from<D: Document>(&mut self, doc: &mut D, out: &mut Outbox) {
        if let Some(mut marker) = self.marker.take() {
            marker.remove(doc, out);
        }
        self.set_highlighted(doc, false);
        self.focused = false;
        if let Some(anchor) = self.anchor {
            doc.remove_class(anchor, FOCUS_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::geometry::{Rect, Size};
    use waymark_core::memory::MemoryDocument;
    use waymark_marker::{MarkerError, Placement, Position};

    fn doc() -> (MemoryDocument, NodeId) {
        let mut doc = MemoryDocument::new(Size::new(800.0, 600.0));
        let root = doc.root();
        let node = doc.insert(root, "button");
        doc.set_id(node, "save");
        doc.set_rect(node, Rect::new(10.0, 10.0, 50.0, 20.0));
        (doc, node)
    }

    fn build(doc: &MemoryDocument, builder: SpotBuilder) -> Result<Spot, TourError> {
        builder.build(doc, SpotId(1), 0, &OptionSet::new(), &OptionSet::new())
    }

    #[test]
    fn missing_tour_is_rejected() {
        let (doc, node) = doc();
        assert_eq!(
            build(&doc, SpotBuilder::node(node)).unwrap_err(),
            TourError::MissingTour
        );
    }

    #[test]
    fn bad_anchors_are_rejected() {
        let (doc, _) = doc();
        let t = TourId(0);
        for builder in [
            SpotBuilder::default().in_tour(t),
            SpotBuilder::selector("   ").in_tour(t),
            SpotBuilder::node(NodeId(99)).in_tour(t),
        ] {
            assert!(matches!(build(&doc, builder), Err(TourError::InvalidSpot(_))));
        }
    }

    #[test]
    fn selector_binds_single_match_lazily() {
        let (doc, node) = doc();
        let spot = build(&doc, SpotBuilder::selector("#save").in_tour(TourId(0))).unwrap();
        assert_eq!(spot.anchor(), Some(node));
        let spot = build(&doc, SpotBuilder::selector("#later").in_tour(TourId(0))).unwrap();
        assert_eq!(spot.anchor(), None);
    }

    #[test]
    fn bad_marker_options_fail_construction() {
        let (doc, node) = doc();
        let builder = SpotBuilder::node(node)
            .in_tour(TourId(0))
            .option("marker.position", "middle");
        assert_eq!(
            build(&doc, builder).unwrap_err(),
            TourError::Marker(MarkerError::BadPosition("middle".into()))
        );
    }

    #[test]
    fn marker_settings_layer_global_tour_and_own() {
        let (doc, node) = doc();
        let global = OptionSet::parse("marker.placement: overlay, marker.position: top").unwrap();
        let tour = OptionSet::parse("marker.position: bottom").unwrap();
        let spot = SpotBuilder::node(node)
            .in_tour(TourId(0))
            .build(&doc, SpotId(1), 0, &global, &tour)
            .unwrap();
        let settings = spot.marker_settings.unwrap();
        assert_eq!(settings.placement, Placement::Overlay);
        assert_eq!(settings.position, Position::Bottom);

        let spot = SpotBuilder::node(node)
            .in_tour(TourId(0))
            .option("withMarker", false)
            .build(&doc, SpotId(2), 0, &global, &tour)
            .unwrap();
        assert!(spot.marker_settings.is_none());
    }

    #[test]
    fn bounce_option_parses() {
        assert_eq!(Bounce::from_option(None), None);
        assert_eq!(
            Bounce::from_option(Some(&OptionValue::from("backward"))),
            Some(Bounce::Backward)
        );
        assert_eq!(
            Bounce::from_option(Some(&OptionValue::from(3))),
            Some(Bounce::Index(3))
        );
        assert_eq!(
            Bounce::from_option(Some(&OptionValue::from("2"))),
            Some(Bounce::Index(2))
        );
        assert_eq!(Bounce::from_option(Some(&OptionValue::from(-1))), None);
        assert_eq!(Bounce::from_option(Some(&OptionValue::from("sideways"))), None);
    }

    #[test]
    fn highlight_requires_own_option() {
        let (mut doc, node) = doc();
        let mut spot = build(&doc, SpotBuilder::node(node).in_tour(TourId(0))).unwrap();
        assert!(spot.highlight(&mut doc, false, true));
        assert!(doc.has_class(node, HIGHLIGHT_CLASS));
        assert!(!spot.highlight(&mut doc, false, false));
        assert!(!doc.has_class(node, HIGHLIGHT_CLASS));

        let mut off = build(
            &doc,
            SpotBuilder::node(node).in_tour(TourId(0)).option("highlight", false),
        )
        .unwrap();
        assert!(!off.highlight(&mut doc, true, true));
    }

    #[test]
    fn dehighlight_respects_always_highlight_unless_forced() {
        let (mut doc, node) = doc();
        let mut spot = build(&doc, SpotBuilder::node(node).in_tour(TourId(0))).unwrap();
        spot.highlight(&mut doc, true, false);
        assert!(!spot.dehighlight(&mut doc, false, true));
        assert!(spot.is_highlighted());
        assert!(spot.dehighlight(&mut doc, true, true));
        assert!(!spot.is_highlighted());
    }

    #[test]
    fn defocus_runs_callback_after_clearing_state() {
        use std::cell::Cell;
        use std::rc::Rc;

        let (mut doc, node) = doc();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let mut spot = build(
            &doc,
            SpotBuilder::node(node)
                .in_tour(TourId(0))
                .on_defocus(move |s| sink.set(Some(s.is_focused()))),
        )
        .unwrap();
        spot.focus(&mut doc, None);
        assert!(doc.has_class(node, FOCUS_CLASS));
        spot.defocus(&mut doc, None, true);
        assert_eq!(seen.get(), Some(false));
        assert!(!doc.has_class(node, FOCUS_CLASS));
    }

    #[test]
    fn scroll_requests_need_focus_and_auto_scroll() {
        let (mut doc, node) = doc();
        let mut spot = build(&doc, SpotBuilder::node(node).in_tour(TourId(0))).unwrap();
        let mut tasks = TaskQueue::new();
        assert!(!spot.request_scroll(&mut tasks));

        spot.focus(&mut doc, None);
        assert!(spot.request_scroll(&mut tasks));
        // Coalesced with the pending one.
        assert!(!spot.request_scroll(&mut tasks));
        assert_eq!(tasks.len(), 1);

        let quiet = build(
            &doc,
            SpotBuilder::node(node)
                .in_tour(TourId(0))
                .option("autoScroll", false),
        );
        let mut quiet = quiet.unwrap();
        quiet.focus(&mut doc, None);
        assert!(!quiet.request_scroll(&mut TaskQueue::new()));
    }

    #[test]
    fn stale_anchor_rebinds_through_selector() {
        let (mut doc, node) = doc();
        let mut spot = build(&doc, SpotBuilder::selector("#save").in_tour(TourId(0))).unwrap();
        doc.destroy(node);
        let root = doc.root();
        let replacement = doc.insert(root, "button");
        doc.set_id(replacement, "save");
        assert!(spot.is_visible(&mut doc, &mut Outbox::new()));
        assert_eq!(spot.anchor(), Some(replacement));
    }
}
