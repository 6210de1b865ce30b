#![forbid(unsafe_code)]

//! The host document seam.
//!
//! Everything Waymark does to the page (reparenting an anchor into a
//! wrapper, appending a marker, toggling a class, reading a box) goes
//! through [`Document`]. Hosts back it with whatever retained tree they
//! render from; [`MemoryDocument`](crate::memory::MemoryDocument) is the
//! in-process implementation used by tests and headless hosts.
//!
//! # Invariants
//!
//! 1. Node handles are never reused within one document, so a stale
//!    [`NodeId`] can be detected with [`Document::is_attached`].
//! 2. Reads on unknown or destroyed nodes return neutral values (zero
//!    geometry, no classes) instead of panicking.

use crate::geometry::{Point, Rect, Sides, Size};

/// Opaque handle to a node in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a synthesized element is for. Hosts use it to pick markup and
/// to report an intrinsic size before layout has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// The marker badge itself.
    Marker,
    /// The decorative arrow inside a marker.
    Arrow,
    /// The neutral container used by sibling placement.
    Wrapper,
    /// The absolutely positioned layer overlay markers attach to.
    OverlayRoot,
    /// Anything else.
    Generic,
}

/// CSS-style positioning scheme of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    #[default]
    Static,
    Relative,
    Absolute,
}

/// Description of an element to synthesize.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    pub role: ElementRole,
    pub tag: String,
    pub classes: Vec<String>,
    pub text: Option<String>,
}

impl ElementSpec {
    /// Create a spec for the given role with a default tag.
    #[must_use]
    pub fn new(role: ElementRole) -> Self {
        let tag = match role {
            ElementRole::Marker | ElementRole::Arrow | ElementRole::Wrapper => "span",
            ElementRole::OverlayRoot | ElementRole::Generic => "div",
        };
        Self {
            role,
            tag: tag.to_owned(),
            classes: Vec::new(),
            text: None,
        }
    }

    /// Add a class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Override the tag name.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// Structural and geometric access to the host document.
pub trait Document {
    // ── Structure ───────────────────────────────────────────────────────

    /// Whether the handle refers to a node that has not been destroyed.
    fn contains(&self, node: NodeId) -> bool;

    /// Whether the node is connected to the document root.
    fn is_attached(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// The root every attached node descends from.
    fn root(&self) -> NodeId;

    /// Synthesize a new, detached element.
    fn create_element(&mut self, spec: ElementSpec) -> NodeId;

    /// Move `child` to the end of `parent`'s children.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Move `child` to the start of `parent`'s children.
    fn prepend_child(&mut self, parent: NodeId, child: NodeId);

    /// Move `node` into `reference`'s parent, immediately before it.
    fn insert_before(&mut self, node: NodeId, reference: NodeId);

    /// Remove `node` from its parent, keeping it alive for reinsertion.
    fn detach(&mut self, node: NodeId);

    /// Detach and free `node` and its subtree.
    fn destroy(&mut self, node: NodeId);

    // ── Query ───────────────────────────────────────────────────────────

    /// Attached nodes matching `selector`, in document order.
    fn query(&self, selector: &str) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    // ── Classes ─────────────────────────────────────────────────────────

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn classes(&self, node: NodeId) -> Vec<String>;

    // ── Layout reads ────────────────────────────────────────────────────

    /// Whether the node and all its ancestors are displayed.
    fn is_displayed(&self, node: NodeId) -> bool;

    /// Document offset of the node's border box.
    fn offset(&self, node: NodeId) -> Point;

    /// Border-box size of the node.
    fn outer_size(&self, node: NodeId) -> Size;

    fn margin(&self, node: NodeId) -> Sides;

    /// The currently scrolled viewport, in document coordinates.
    fn viewport(&self) -> Rect;

    // ── Layout writes ───────────────────────────────────────────────────

    fn set_margin(&mut self, node: NodeId, margin: Sides);

    /// Place an absolutely positioned node at a document offset.
    fn set_offset(&mut self, node: NodeId, offset: Point);

    fn set_positioning(&mut self, node: NodeId, positioning: Positioning);

    fn positioning(&self, node: NodeId) -> Positioning;

    /// Scroll the viewport so `node` comes into view.
    fn scroll_into_view(&mut self, node: NodeId);

    // ── Provided ────────────────────────────────────────────────────────

    /// Document rectangle of the node's border box.
    fn bounds(&self, node: NodeId) -> Rect {
        Rect::from_parts(self.offset(node), self.outer_size(node))
    }

    /// Whether the node is attached, displayed and fully inside the viewport.
    fn is_in_viewport(&self, node: NodeId) -> bool {
        self.is_attached(node)
            && self.is_displayed(node)
            && self.viewport().contains_rect(&self.bounds(node))
    }
}
