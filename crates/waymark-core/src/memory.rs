#![forbid(unsafe_code)]

//! Arena-backed [`Document`] implementation.
//!
//! `MemoryDocument` keeps a real parent/child tree with classes,
//! attributes, margins and boxes, but performs no layout of its own: the
//! host (or test) assigns each node's box with [`MemoryDocument::set_rect`]
//! and synthesized elements take the intrinsic size registered for their
//! [`ElementRole`].
//!
//! # Example
//!
//! ```
//! use waymark_core::document::Document;
//! use waymark_core::geometry::{Rect, Size};
//! use waymark_core::memory::MemoryDocument;
//!
//! let mut doc = MemoryDocument::new(Size::new(1024.0, 768.0));
//! let root = doc.root();
//! let button = doc.insert(root, "button");
//! doc.set_id(button, "save");
//! doc.set_rect(button, Rect::new(40.0, 40.0, 120.0, 32.0));
//!
//! assert_eq!(doc.query("#save"), vec![button]);
//! assert!(doc.is_in_viewport(button));
//! ```

use ahash::AHashMap;

use crate::document::{Document, ElementRole, ElementSpec, NodeId, Positioning};
use crate::geometry::{Point, Rect, Sides, Size};

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    role: ElementRole,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    displayed: bool,
    origin: Point,
    size: Size,
    margin: Sides,
    positioning: Positioning,
    absolute: Option<Point>,
}

impl Node {
    fn new(tag: impl Into<String>, role: ElementRole) -> Self {
        Self {
            tag: tag.into(),
            role,
            classes: Vec::new(),
            attributes: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
            displayed: true,
            origin: Point::ZERO,
            size: Size::ZERO,
            margin: Sides::ZERO,
            positioning: Positioning::Static,
            absolute: None,
        }
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.attributes
                .iter()
                .any(|(name, value)| name == "id" && value == id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }
}

/// In-memory document tree.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    viewport: Rect,
    intrinsic: AHashMap<ElementRole, Size>,
}

impl MemoryDocument {
    /// Create a document whose viewport has the given size, scrolled to the top.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let mut root = Node::new("body", ElementRole::Generic);
        root.size = viewport;
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
            viewport: Rect::from_parts(Point::ZERO, viewport),
            intrinsic: AHashMap::new(),
        }
    }

    /// Insert a new element as the last child of `parent`.
    pub fn insert(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.alloc(Node::new(tag, ElementRole::Generic));
        self.append_child(parent, node);
        node
    }

    /// Set the `id` attribute.
    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.set_attribute(node, "id", id);
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            match n.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_owned(),
                None => n.attributes.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    /// Assign a laid-out box (origin before margins, border-box size).
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(n) = self.node_mut(node) {
            n.origin = rect.origin();
            n.size = rect.size();
        }
    }

    pub fn set_size(&mut self, node: NodeId, size: Size) {
        if let Some(n) = self.node_mut(node) {
            n.size = size;
        }
    }

    /// Toggle `display: none` on a node.
    pub fn set_displayed(&mut self, node: NodeId, displayed: bool) {
        if let Some(n) = self.node_mut(node) {
            n.displayed = displayed;
        }
    }

    /// Move or resize the viewport.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Size given to elements of `role` when they are synthesized.
    pub fn set_intrinsic_size(&mut self, role: ElementRole, size: Size) {
        self.intrinsic.insert(role, size);
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.tag.as_str())
    }

    pub fn role(&self, node: NodeId) -> Option<ElementRole> {
        self.node(node).map(|n| n.role)
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.node(node).and_then(|n| n.text.as_deref())
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_self_or_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        let mut steps = 0;
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.node_mut(node) {
            n.parent = None;
        }
    }

    /// Insert `child` into `parent` at `index`, refusing cycles.
    fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        if !self.contains(parent) || !self.contains(child) {
            return;
        }
        if self.is_self_or_ancestor(child, parent) {
            tracing::debug!(%parent, %child, "refusing to move a node into its own subtree");
            return;
        }
        self.unlink(child);
        if let Some(p) = self.node_mut(parent) {
            let at = index.unwrap_or(p.children.len()).min(p.children.len());
            p.children.insert(at, child);
        }
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
        }
    }

    fn collect_matches(&self, node: NodeId, selector: &str, out: &mut Vec<NodeId>) {
        let Some(n) = self.node(node) else {
            return;
        };
        if node != self.root && n.matches(selector) {
            out.push(node);
        }
        for &child in &n.children {
            self.collect_matches(child, selector, out);
        }
    }
}

impl Document for MemoryDocument {
    fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.contains(node) && self.is_self_or_ancestor(self.root, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn create_element(&mut self, spec: ElementSpec) -> NodeId {
        let mut node = Node::new(spec.tag, spec.role);
        node.classes = spec.classes;
        node.text = spec.text;
        node.size = self.intrinsic.get(&spec.role).copied().unwrap_or_default();
        self.alloc(node)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.link(parent, child, None);
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.link(parent, child, Some(0));
    }

    fn insert_before(&mut self, node: NodeId, reference: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if node == reference {
            return;
        }
        self.unlink(node);
        let index = self
            .node(parent)
            .and_then(|p| p.children.iter().position(|&c| c == reference));
        self.link(parent, node, index);
    }

    fn detach(&mut self, node: NodeId) {
        self.unlink(node);
    }

    fn destroy(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.unlink(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(id.0 as usize)
                && let Some(n) = slot.take()
            {
                stack.extend(n.children);
            }
        }
    }

    fn query(&self, selector: &str) -> Vec<NodeId> {
        let selector = selector.trim();
        let mut out = Vec::new();
        if selector.is_empty() {
            return out;
        }
        self.collect_matches(self.root, selector, &mut out);
        out
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).and_then(|n| {
            n.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        self.node(node).map(|n| n.classes.clone()).unwrap_or_default()
    }

    fn is_displayed(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            match self.node(id) {
                Some(n) if n.displayed => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn offset(&self, node: NodeId) -> Point {
        let Some(n) = self.node(node) else {
            return Point::ZERO;
        };
        match (n.positioning, n.absolute) {
            (Positioning::Absolute, Some(at)) => at,
            _ => n.origin.offset(n.margin.left, n.margin.top),
        }
    }

    fn outer_size(&self, node: NodeId) -> Size {
        self.node(node).map(|n| n.size).unwrap_or_default()
    }

    fn margin(&self, node: NodeId) -> Sides {
        self.node(node).map(|n| n.margin).unwrap_or_default()
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_margin(&mut self, node: NodeId, margin: Sides) {
        if let Some(n) = self.node_mut(node) {
            n.margin = margin;
        }
    }

    fn set_offset(&mut self, node: NodeId, offset: Point) {
        if let Some(n) = self.node_mut(node) {
            n.absolute = Some(offset);
        }
    }

    fn set_positioning(&mut self, node: NodeId, positioning: Positioning) {
        if let Some(n) = self.node_mut(node) {
            n.positioning = positioning;
        }
    }

    fn positioning(&self, node: NodeId) -> Positioning {
        self.node(node).map(|n| n.positioning).unwrap_or_default()
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        if !self.is_attached(node) {
            return;
        }
        let bounds = self.bounds(node);
        self.viewport.y = bounds.y.max(0.0);
        if bounds.x < self.viewport.x || bounds.right() > self.viewport.right() {
            self.viewport.x = bounds.x.max(0.0);
        }
    }
}
