#![forbid(unsafe_code)]

//! Marker lifecycle: build, wrap, attach, place, show, hide, remove.
//!
//! A [`Marker`] is bound to one spot for its whole life. It is built at
//! most once, only while the anchor is visible, and is never rebuilt in
//! place: a stale marker is removed and a fresh one created.
//!
//! # Sibling wrapping
//!
//! Sibling placement needs the marker and the anchor to share a
//! positioned parent. Building a sibling marker inserts a neutral
//! `position: relative` wrapper immediately before the anchor and moves
//! the anchor inside it; removing the marker moves the anchor back to the
//! wrapper's slot and destroys the wrapper. Both directions are
//! idempotent.

use waymark_core::config::{DEFAULT_ARROW_TOLERANCE, DEFAULT_MARKER_SPACING};
use waymark_core::document::{Document, ElementRole, ElementSpec, NodeId, Positioning};
use waymark_core::event::{EventBus, Outbox, Signal, SpotId, TourId};
use waymark_core::geometry::{Point, Rect, Sides};
use waymark_core::options::OptionSet;

use crate::error::MarkerError;
use crate::layout;
use crate::placement::{Placement, Position};

/// Class carried by every marker element.
pub const MARKER_CLASS: &str = "wm-marker";
/// Class carried by the sibling wrapper.
pub const WRAPPER_CLASS: &str = "wm-marker-wrapper";
/// Class carried by the smart arrow.
pub const ARROW_CLASS: &str = "wm-marker-arrow";

/// Compiled marker defaults.
#[must_use]
pub fn marker_defaults() -> OptionSet {
    OptionSet::new()
        .with("enabled", true)
        .with("placement", Placement::default().as_str())
        .with("position", Position::default().as_str())
        .with("spacing", DEFAULT_MARKER_SPACING)
        .with("smartArrow", true)
        .with("arrowTolerance", DEFAULT_ARROW_TOLERANCE)
}

/// Validated marker settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSettings {
    pub placement: Placement,
    pub position: Position,
    /// Clearance between an overlay marker and its anchor.
    pub spacing: f64,
    pub smart_arrow: bool,
    /// Drift beyond which a smart arrow is created.
    pub arrow_tolerance: f64,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            position: Position::default(),
            spacing: DEFAULT_MARKER_SPACING,
            smart_arrow: true,
            arrow_tolerance: DEFAULT_ARROW_TOLERANCE,
        }
    }
}

impl MarkerSettings {
    /// Read settings from a merged option set.
    ///
    /// Missing keys fall back to defaults; a present but unrecognized
    /// placement or position fails.
    pub fn from_options(options: &OptionSet) -> Result<Self, MarkerError> {
        let defaults = Self::default();
        let placement = match options.get_path("placement") {
            None => defaults.placement,
            Some(value) => value
                .as_str()
                .ok_or_else(|| MarkerError::BadPlacement(value.to_string()))?
                .parse()?,
        };
        let position = match options.get_path("position") {
            None => defaults.position,
            Some(value) => value
                .as_str()
                .ok_or_else(|| MarkerError::BadPosition(value.to_string()))?
                .parse()?,
        };
        Ok(Self {
            placement,
            position,
            spacing: options.get_f64("spacing").unwrap_or(defaults.spacing),
            smart_arrow: options.get_bool("smartArrow").unwrap_or(defaults.smart_arrow),
            arrow_tolerance: options
                .get_f64("arrowTolerance")
                .unwrap_or(defaults.arrow_tolerance),
        })
    }
}

/// What a marker shows, by richness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Caption and text are both available.
    Full,
    /// Only text is available.
    TextOnly,
    /// Nothing but the spot's position in the tour.
    IndexOnly,
}

impl Template {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::TextOnly => "text",
            Self::IndexOnly => "index",
        }
    }
}

/// Content available to a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerContent {
    /// Zero-based position of the spot in its tour.
    pub index: usize,
    pub caption: Option<String>,
    pub text: Option<String>,
}

impl MarkerContent {
    #[must_use]
    pub fn template(&self) -> Template {
        let has = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        match (has(&self.caption), has(&self.text)) {
            (true, true) => Template::Full,
            (_, true) => Template::TextOnly,
            _ => Template::IndexOnly,
        }
    }

    fn label(&self) -> String {
        match self.template() {
            Template::Full => self.caption.clone().unwrap_or_default(),
            Template::TextOnly => self.text.clone().unwrap_or_default(),
            Template::IndexOnly => (self.index + 1).to_string(),
        }
    }
}

/// Whether the surrounding tour currently allows the marker on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub tour_active: bool,
    pub is_current: bool,
    pub always_mark: bool,
    /// Layer overlay markers attach to.
    pub overlay_root: NodeId,
}

/// A positioned annotation bound to one spot.
#[derive(Debug)]
pub struct Marker {
    tour: TourId,
    spot: SpotId,
    settings: MarkerSettings,
    anchor: Option<NodeId>,
    element: Option<NodeId>,
    wrapper: Option<NodeId>,
    arrow: Option<NodeId>,
    natural_margin: Sides,
    shown: bool,
    bus: EventBus,
}

impl Marker {
    /// Create an unbuilt marker for a spot.
    #[must_use]
    pub fn new(tour: TourId, spot: SpotId, settings: MarkerSettings) -> Self {
        Self {
            tour,
            spot,
            settings,
            anchor: None,
            element: None,
            wrapper: None,
            arrow: None,
            natural_margin: Sides::ZERO,
            shown: false,
            bus: EventBus::new(),
        }
    }

    /// Create an unbuilt marker, validating options first.
    pub fn from_options(
        tour: TourId,
        spot: SpotId,
        options: &OptionSet,
    ) -> Result<Self, MarkerError> {
        Ok(Self::new(tour, spot, MarkerSettings::from_options(options)?))
    }

    pub fn spot(&self) -> SpotId {
        self.spot
    }

    pub fn settings(&self) -> &MarkerSettings {
        &self.settings
    }

    pub fn placement(&self) -> Placement {
        self.settings.placement
    }

    pub fn position(&self) -> Position {
        self.settings.position
    }

    pub fn is_built(&self) -> bool {
        self.element.is_some()
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// The marker element, once built.
    pub fn element(&self) -> Option<NodeId> {
        self.element
    }

    /// The anchor the marker was built against.
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// The sibling wrapper, while wrapped.
    pub fn wrapper(&self) -> Option<NodeId> {
        self.wrapper
    }

    /// The smart arrow, while drift exceeds tolerance.
    pub fn arrow(&self) -> Option<NodeId> {
        self.arrow
    }

    /// The marker element's margins as they were before any placement.
    pub fn natural_margin(&self) -> Sides {
        self.natural_margin
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Styling hook set on the anchor while the marker is shown.
    #[must_use]
    pub fn anchor_flag(&self) -> String {
        format!(
            "wm-marked-{}-{}",
            self.settings.placement, self.settings.position
        )
    }

    /// Build the marker element. Returns `Ok(false)` if already built.
    pub fn build<D: Document>(
        &mut self,
        doc: &mut D,
        anchor: NodeId,
        content: &MarkerContent,
    ) -> Result<bool, MarkerError> {
        if self.is_built() {
            return Ok(false);
        }
        if !doc.is_attached(anchor) {
            return Err(MarkerError::AnchorDetached(anchor));
        }

        let template = content.template();
        let spec = ElementSpec::new(ElementRole::Marker)
            .class(MARKER_CLASS)
            .class(format!("{MARKER_CLASS}--{}", template.as_str()))
            .class(format!("{MARKER_CLASS}--{}", self.settings.placement))
            .class(format!("{MARKER_CLASS}--{}", self.settings.position))
            .text(content.label());
        let element = doc.create_element(spec);
        self.natural_margin = doc.margin(element);
        self.element = Some(element);
        self.anchor = Some(anchor);

        match self.settings.placement {
            Placement::Sibling => self.wrap(doc),
            Placement::Inline | Placement::Overlay => {
                doc.set_positioning(element, Positioning::Absolute);
            }
        }

        tracing::debug!(
            spot = %self.spot,
            %element,
            placement = %self.settings.placement,
            position = %self.settings.position,
            template = template.as_str(),
            "marker built"
        );
        Ok(true)
    }

    /// Move the anchor into a fresh relative wrapper. No-op unless this is
    /// a built sibling marker that is not already wrapped.
    pub fn wrap<D: Document>(&mut self, doc: &mut D) {
        if self.wrapper.is_some() || self.settings.placement != Placement::Sibling {
            return;
        }
        let Some(anchor) = self.anchor else {
            return;
        };
        if doc.parent(anchor).is_none() {
            return;
        }
        let wrapper =
            doc.create_element(ElementSpec::new(ElementRole::Wrapper).class(WRAPPER_CLASS));
        doc.set_positioning(wrapper, Positioning::Relative);
        doc.insert_before(wrapper, anchor);
        doc.append_child(wrapper, anchor);
        self.wrapper = Some(wrapper);
    }

    /// Reverse [`Marker::wrap`]. Safe to call when not wrapped.
    pub fn unwrap<D: Document>(&mut self, doc: &mut D) {
        let Some(wrapper) = self.wrapper.take() else {
            return;
        };
        if let Some(element) = self.element
            && doc.parent(element) == Some(wrapper)
        {
            doc.detach(element);
        }
        if let Some(anchor) = self.anchor
            && doc.parent(anchor) == Some(wrapper)
        {
            if doc.parent(wrapper).is_some() {
                doc.insert_before(anchor, wrapper);
            } else {
                doc.detach(anchor);
            }
        }
        doc.destroy(wrapper);
    }

    /// Insert the marker element at the structural point its placement needs.
    pub fn attach<D: Document>(&mut self, doc: &mut D, overlay_root: NodeId) {
        let (Some(element), Some(anchor)) = (self.element, self.anchor) else {
            return;
        };
        match self.settings.placement {
            Placement::Inline => doc.append_child(anchor, element),
            Placement::Sibling => {
                let Some(wrapper) = self.wrapper else {
                    return;
                };
                if self.settings.position.is_right_side() {
                    doc.append_child(wrapper, element);
                } else {
                    doc.prepend_child(wrapper, element);
                }
            }
            Placement::Overlay => doc.append_child(overlay_root, element),
        }
    }

    /// Remove the marker element from the document, keeping it for reuse.
    pub fn detach<D: Document>(&mut self, doc: &mut D) {
        if let Some(element) = self.element {
            doc.detach(element);
        }
    }

    /// Recompute layout-dependent geometry. Idempotent.
    pub fn place<D: Document>(&mut self, doc: &mut D) {
        let (Some(element), Some(anchor)) = (self.element, self.anchor) else {
            return;
        };
        let position = self.settings.position;
        match self.settings.placement {
            Placement::Inline => {
                let margin = layout::centering_margin(
                    position,
                    doc.outer_size(element),
                    doc.bounds(anchor),
                    doc.viewport(),
                    self.natural_margin,
                );
                doc.set_margin(element, margin);
            }
            Placement::Sibling => {
                let corrected =
                    layout::sibling_margin(position, doc.margin(anchor), self.natural_margin);
                let margin = layout::centering_margin(
                    position,
                    doc.outer_size(element),
                    doc.bounds(anchor),
                    doc.viewport(),
                    corrected,
                );
                doc.set_margin(element, margin);
            }
            Placement::Overlay => {
                doc.set_offset(element, Point::ZERO);
                let size = doc.outer_size(element);
                let offset =
                    layout::overlay_offset(position, doc.bounds(anchor), size, self.settings.spacing);
                doc.set_offset(element, offset);
            }
        }
        tracing::trace!(spot = %self.spot, "marker placed");
    }

    /// Whether the marker may be shown right now.
    pub fn can_show<D: Document>(&self, doc: &D, stage: &Stage) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        self.is_built()
            && stage.tour_active
            && doc.is_attached(anchor)
            && doc.is_displayed(anchor)
            && (stage.always_mark || stage.is_current)
    }

    /// Attach and place the marker. Re-places an already shown marker.
    ///
    /// Returns whether the marker is shown afterwards.
    pub fn show<D: Document>(&mut self, doc: &mut D, stage: &Stage, out: &mut Outbox) -> bool {
        if !self.can_show(doc, stage) {
            return false;
        }
        if self.shown {
            self.place(doc);
            return true;
        }
        let (tour, spot) = (self.tour, self.spot);
        self.announce(Signal::Marking { tour, spot }, out);
        self.attach(doc, stage.overlay_root);
        if let Some(anchor) = self.anchor {
            let flag = self.anchor_flag();
            doc.add_class(anchor, &flag);
        }
        self.shown = true;
        self.place(doc);
        tracing::debug!(spot = %self.spot, "marker shown");
        let (tour, spot) = (self.tour, self.spot);
        self.announce(Signal::Marked { tour, spot }, out);
        true
    }

    /// Detach the marker. Returns whether it was shown.
    pub fn hide<D: Document>(&mut self, doc: &mut D, out: &mut Outbox) -> bool {
        if !self.shown {
            return false;
        }
        let (tour, spot) = (self.tour, self.spot);
        self.announce(Signal::Unmarking { tour, spot }, out);
        self.detach(doc);
        if let Some(anchor) = self.anchor {
            let flag = self.anchor_flag();
            doc.remove_class(anchor, &flag);
        }
        self.shown = false;
        tracing::debug!(spot = %self.spot, "marker hidden");
        let (tour, spot) = (self.tour, self.spot);
        self.announce(Signal::Unmarked { tour, spot }, out);
        true
    }

    /// Hide, destroy the element and unwrap. The marker returns to the
    /// unbuilt state and should be dropped.
    pub fn remove<D: Document>(&mut self, doc: &mut D, out: &mut Outbox) {
        self.hide(doc, out);
        self.unwrap(doc);
        if let Some(element) = self.element.take() {
            doc.destroy(element);
        }
        self.arrow = None;
        self.anchor = None;
        tracing::debug!(spot = %self.spot, "marker removed");
    }

    /// Whether a deferred smart-arrow pass is worth scheduling.
    #[must_use]
    pub fn wants_arrow_pass(&self) -> bool {
        self.shown && self.settings.smart_arrow && self.settings.position.is_horizontal_edge()
    }

    /// Create, move or drop the smart arrow from committed geometry.
    ///
    /// Must run after [`Marker::place`] has settled.
    pub fn adjust_arrow<D: Document>(&mut self, doc: &mut D) {
        let (Some(element), Some(anchor)) = (self.element, self.anchor) else {
            return;
        };
        if !self.wants_arrow_pass() {
            self.drop_arrow(doc);
            return;
        }

        let marker_box = doc.bounds(element);
        let anchor_box = doc.bounds(anchor);
        if layout::arrow_drift(marker_box, anchor_box) <= self.settings.arrow_tolerance {
            self.drop_arrow(doc);
            return;
        }

        let arrow = match self.arrow {
            Some(arrow) if doc.contains(arrow) => arrow,
            _ => {
                let arrow =
                    doc.create_element(ElementSpec::new(ElementRole::Arrow).class(ARROW_CLASS));
                doc.set_positioning(arrow, Positioning::Absolute);
                doc.append_child(element, arrow);
                self.arrow = Some(arrow);
                arrow
            }
        };
        let size = doc.outer_size(arrow);
        let left = layout::arrow_left(marker_box, anchor_box, size.width);
        let top = match self.settings.position {
            // The arrow hangs off the edge that faces the anchor.
            Position::Top => marker_box.bottom(),
            _ => marker_box.top() - size.height,
        };
        doc.set_offset(arrow, Point::new(marker_box.left() + left, top));
        tracing::trace!(spot = %self.spot, left, "smart arrow adjusted");
    }

    /// The arrow's offset relative to the marker's left edge.
    pub fn arrow_left<D: Document>(&self, doc: &D) -> Option<f64> {
        let (arrow, element) = (self.arrow?, self.element?);
        Some(doc.offset(arrow).x - doc.offset(element).x)
    }

    /// Current document box of the marker element.
    pub fn bounds<D: Document>(&self, doc: &D) -> Option<Rect> {
        self.element.map(|e| doc.bounds(e))
    }

    fn drop_arrow<D: Document>(&mut self, doc: &mut D) {
        if let Some(arrow) = self.arrow.take() {
            doc.destroy(arrow);
        }
    }

    fn announce(&mut self, signal: Signal, out: &mut Outbox) {
        self.bus.emit(&signal);
        out.push(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::geometry::Size;
    use waymark_core::memory::MemoryDocument;

    const TOUR: TourId = TourId(1);
    const SPOT: SpotId = SpotId(7);

    fn fixture() -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new(Size::new(1000.0, 800.0));
        doc.set_intrinsic_size(ElementRole::Marker, Size::new(24.0, 16.0));
        doc.set_intrinsic_size(ElementRole::Arrow, Size::new(8.0, 4.0));
        let root = doc.root();
        let overlay = doc.insert(root, "div");
        let anchor = doc.insert(root, "button");
        doc.set_rect(anchor, Rect::new(100.0, 200.0, 80.0, 40.0));
        (doc, anchor, overlay)
    }

    fn stage(overlay: NodeId) -> Stage {
        Stage {
            tour_active: true,
            is_current: true,
            always_mark: true,
            overlay_root: overlay,
        }
    }

    fn settings(placement: Placement, position: Position) -> MarkerSettings {
        MarkerSettings {
            placement,
            position,
            ..MarkerSettings::default()
        }
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let s = MarkerSettings::from_options(&OptionSet::new()).unwrap();
        assert_eq!(s, MarkerSettings::default());
        let s = MarkerSettings::from_options(&marker_defaults()).unwrap();
        assert_eq!(s, MarkerSettings::default());
    }

    #[test]
    fn settings_reject_unknown_names() {
        let opts = OptionSet::parse("placement: floating").unwrap();
        assert_eq!(
            MarkerSettings::from_options(&opts),
            Err(MarkerError::BadPlacement("floating".into()))
        );
        let opts = OptionSet::parse("position: 4").unwrap();
        assert_eq!(
            MarkerSettings::from_options(&opts),
            Err(MarkerError::BadPosition("4".into()))
        );
    }

    #[test]
    fn template_follows_available_content() {
        let mut c = MarkerContent {
            index: 2,
            caption: Some("Save".into()),
            text: Some("Saves the file".into()),
        };
        assert_eq!(c.template(), Template::Full);
        c.caption = Some("  ".into());
        assert_eq!(c.template(), Template::TextOnly);
        c.text = None;
        assert_eq!(c.template(), Template::IndexOnly);
        assert_eq!(c.label(), "3");
    }

    #[test]
    fn build_twice_is_a_no_op() {
        let (mut doc, anchor, _) = fixture();
        let mut m = Marker::new(TOUR, SPOT, MarkerSettings::default());
        assert_eq!(m.build(&mut doc, anchor, &MarkerContent::default()), Ok(true));
        let element = m.element();
        assert_eq!(m.build(&mut doc, anchor, &MarkerContent::default()), Ok(false));
        assert_eq!(m.element(), element);
    }

    #[test]
    fn build_refuses_detached_anchor() {
        let (mut doc, anchor, _) = fixture();
        doc.detach(anchor);
        let mut m = Marker::new(TOUR, SPOT, MarkerSettings::default());
        assert_eq!(
            m.build(&mut doc, anchor, &MarkerContent::default()),
            Err(MarkerError::AnchorDetached(anchor))
        );
        assert!(!m.is_built());
    }

    #[test]
    fn sibling_left_prepends_into_wrapper() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, settings(Placement::Sibling, Position::Left));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        let mut out = Outbox::new();
        assert!(m.show(&mut doc, &stage(overlay), &mut out));
        let wrapper = m.wrapper().unwrap();
        assert_eq!(doc.children(wrapper), vec![m.element().unwrap(), anchor]);
        assert_eq!(doc.positioning(wrapper), Positioning::Relative);
    }

    #[test]
    fn show_and_hide_bracket_signals_and_flag() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, MarkerSettings::default());
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        let mut out = Outbox::new();

        assert!(m.show(&mut doc, &stage(overlay), &mut out));
        assert!(doc.has_class(anchor, "wm-marked-sibling-right"));
        assert!(m.hide(&mut doc, &mut out));
        assert!(!doc.has_class(anchor, "wm-marked-sibling-right"));
        assert!(!m.hide(&mut doc, &mut out));

        let names: Vec<_> = out.drain().iter().map(Signal::name).collect();
        assert_eq!(names, ["marking", "marked", "unmarking", "unmarked"]);
    }

    #[test]
    fn can_show_respects_stage() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, MarkerSettings::default());
        assert!(!m.can_show(&doc, &stage(overlay)));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        assert!(m.can_show(&doc, &stage(overlay)));

        let inactive = Stage {
            tour_active: false,
            ..stage(overlay)
        };
        assert!(!m.can_show(&doc, &inactive));

        let not_current = Stage {
            is_current: false,
            always_mark: false,
            ..stage(overlay)
        };
        assert!(!m.can_show(&doc, &not_current));

        doc.set_displayed(anchor, false);
        assert!(!m.can_show(&doc, &stage(overlay)));
    }

    #[test]
    fn place_is_idempotent() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, settings(Placement::Inline, Position::Bottom));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        m.show(&mut doc, &stage(overlay), &mut Outbox::new());
        let element = m.element().unwrap();
        let first = doc.margin(element);
        m.place(&mut doc);
        m.place(&mut doc);
        assert_eq!(doc.margin(element), first);
        assert_eq!(first.left, -12.0);
    }

    #[test]
    fn overlay_attaches_to_overlay_root() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, settings(Placement::Overlay, Position::Bottom));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        m.show(&mut doc, &stage(overlay), &mut Outbox::new());
        let element = m.element().unwrap();
        assert_eq!(doc.parent(element), Some(overlay));
        assert_eq!(doc.offset(element), Point::new(140.0 - 12.0, 240.0 + 15.0));
    }

    #[test]
    fn smart_arrow_tracks_drift() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, settings(Placement::Overlay, Position::Bottom));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        m.show(&mut doc, &stage(overlay), &mut Outbox::new());
        assert!(m.wants_arrow_pass());

        // Centered: no drift, no arrow.
        m.adjust_arrow(&mut doc);
        assert!(m.arrow().is_none());

        // Push the marker 40px right of center.
        let element = m.element().unwrap();
        doc.set_offset(element, Point::new(168.0, 255.0));
        m.adjust_arrow(&mut doc);
        let arrow = m.arrow().unwrap();
        assert_eq!(doc.parent(arrow), Some(element));
        assert_eq!(m.arrow_left(&doc), Some(0.0));

        // Back within tolerance: the arrow goes away.
        doc.set_offset(element, Point::new(133.0, 255.0));
        m.adjust_arrow(&mut doc);
        assert!(m.arrow().is_none());
        assert!(!doc.contains(arrow));
    }

    #[test]
    fn side_positions_never_want_arrows() {
        let (mut doc, anchor, overlay) = fixture();
        let mut m = Marker::new(TOUR, SPOT, settings(Placement::Overlay, Position::Right));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        m.show(&mut doc, &stage(overlay), &mut Outbox::new());
        assert!(!m.wants_arrow_pass());
    }

    #[test]
    fn remove_destroys_everything_it_created() {
        let (mut doc, anchor, overlay) = fixture();
        let before = doc.live_nodes();
        let mut m = Marker::new(TOUR, SPOT, settings(Placement::Sibling, Position::Top));
        m.build(&mut doc, anchor, &MarkerContent::default()).unwrap();
        m.show(&mut doc, &stage(overlay), &mut Outbox::new());
        m.remove(&mut doc, &mut Outbox::new());
        m.remove(&mut doc, &mut Outbox::new());
        assert_eq!(doc.live_nodes(), before);
        assert_eq!(doc.parent(anchor), Some(doc.root()));
        assert!(!m.is_built());
    }
}
