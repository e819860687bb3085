//! Finalized collection nodes.
//!
//! A [`Node`] is what the builder emits: the resolved description of one
//! item or section plus its linkage within the flattened order. Content is
//! fixed at construction. The linkage (parent, siblings, index, depth) sits
//! behind a lock so that a cached node can be placed again on a later build
//! without losing its identity.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::element::{Content, Element, InvalidateFn, WrapperFn};
use crate::key::Key;

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NodeType {
    /// A leaf (or expandable) item.
    Item,
    /// A group of items.
    Section,
}

impl NodeType {
    /// Lowercase name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Section => "section",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data values that can back collection nodes.
///
/// # Example
///
/// ```
/// use horizon_lattice_collections::{ItemValue, Key};
///
/// #[derive(Debug)]
/// struct Fruit {
///     id: i64,
///     name: String,
/// }
///
/// impl ItemValue for Fruit {
///     fn key(&self) -> Option<Key> {
///         Some(Key::from(self.id))
///     }
///
///     fn text_value(&self) -> Option<String> {
///         Some(self.name.clone())
///     }
/// }
/// ```
pub trait ItemValue: fmt::Debug + Send + Sync + 'static {
    /// The value's identifying field, used when no other key is available.
    fn key(&self) -> Option<Key> {
        None
    }

    /// Plain-text projection of the value.
    fn text_value(&self) -> Option<String> {
        None
    }
}

impl ItemValue for String {
    fn text_value(&self) -> Option<String> {
        Some(self.clone())
    }
}

/// A node's position within one collection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLinks {
    pub parent_key: Option<Key>,
    pub prev_key: Option<Key>,
    pub next_key: Option<Key>,
    /// Position among siblings sharing the same parent.
    pub index: usize,
    /// Depth, 0 at the top level.
    pub level: usize,
}

/// One finalized entry of a collection.
pub struct Node<T> {
    node_type: NodeType,
    key: Key,
    value: Option<Arc<T>>,
    rendered: Option<Content<T>>,
    text_value: String,
    aria_label: Option<String>,
    has_child_nodes: bool,
    children: Vec<Arc<Node<T>>>,
    props: Option<Element<T>>,
    wrapper: Option<WrapperFn<T>>,
    should_invalidate: Option<InvalidateFn>,
    links: RwLock<NodeLinks>,
}

/// The resolved fields a node is constructed from.
pub(crate) struct NodeParts<T> {
    pub node_type: NodeType,
    pub key: Key,
    pub value: Option<Arc<T>>,
    pub rendered: Option<Content<T>>,
    pub text_value: String,
    pub aria_label: Option<String>,
    pub has_child_nodes: bool,
    pub children: Vec<Arc<Node<T>>>,
    pub props: Option<Element<T>>,
    pub wrapper: Option<WrapperFn<T>>,
    pub should_invalidate: Option<InvalidateFn>,
    pub links: NodeLinks,
}

impl<T> Node<T> {
    pub(crate) fn new(parts: NodeParts<T>) -> Self {
        Self {
            node_type: parts.node_type,
            key: parts.key,
            value: parts.value,
            rendered: parts.rendered,
            text_value: parts.text_value,
            aria_label: parts.aria_label,
            has_child_nodes: parts.has_child_nodes,
            children: parts.children,
            props: parts.props,
            wrapper: parts.wrapper,
            should_invalidate: parts.should_invalidate,
            links: RwLock::new(parts.links),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_item(&self) -> bool {
        self.node_type == NodeType::Item
    }

    pub fn is_section(&self) -> bool {
        self.node_type == NodeType::Section
    }

    /// The node's key, unique within its collection.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The data value the node was built from.
    pub fn value(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    pub fn rendered(&self) -> Option<&Content<T>> {
        self.rendered.as_ref()
    }

    /// Plain-text projection, empty when none could be resolved.
    pub fn text_value(&self) -> &str {
        &self.text_value
    }

    pub fn aria_label(&self) -> Option<&str> {
        self.aria_label.as_deref()
    }

    pub fn has_child_nodes(&self) -> bool {
        self.has_child_nodes
    }

    /// The node's direct children, in order.
    pub fn child_nodes(&self) -> std::slice::Iter<'_, Arc<Node<T>>> {
        self.children.iter()
    }

    /// The descriptor the node was described by.
    pub fn props(&self) -> Option<&Element<T>> {
        self.props.as_ref()
    }

    /// Applies the node's wrapper to `element`, or returns it unchanged.
    pub fn wrap(&self, element: Element<T>) -> Element<T> {
        match &self.wrapper {
            Some(wrapper) => wrapper(element),
            None => element,
        }
    }

    pub fn wrapper(&self) -> Option<&WrapperFn<T>> {
        self.wrapper.as_ref()
    }

    pub(crate) fn should_invalidate(&self) -> Option<&InvalidateFn> {
        self.should_invalidate.as_ref()
    }

    pub fn parent_key(&self) -> Option<Key> {
        self.links.read().parent_key.clone()
    }

    pub fn prev_key(&self) -> Option<Key> {
        self.links.read().prev_key.clone()
    }

    pub fn next_key(&self) -> Option<Key> {
        self.links.read().next_key.clone()
    }

    pub fn index(&self) -> usize {
        self.links.read().index
    }

    pub fn level(&self) -> usize {
        self.links.read().level
    }

    /// A snapshot of the node's linkage.
    pub fn links(&self) -> NodeLinks {
        self.links.read().clone()
    }

    /// Places the node under `parent_key` at `index`, clearing its sibling
    /// links.
    pub(crate) fn place(&self, parent_key: Option<Key>, index: usize, level: usize) {
        let mut links = self.links.write();
        links.parent_key = parent_key;
        links.index = index;
        links.level = level;
        links.prev_key = None;
        links.next_key = None;
    }

    pub(crate) fn set_prev_key(&self, key: Option<Key>) {
        self.links.write().prev_key = key;
    }

    pub(crate) fn set_next_key(&self, key: Option<Key>) {
        self.links.write().next_key = key;
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links = self.links.read();
        f.debug_struct("Node")
            .field("type", &self.node_type)
            .field("key", &self.key)
            .field("text_value", &self.text_value)
            .field("has_value", &self.value.is_some())
            .field("has_child_nodes", &self.has_child_nodes)
            .field("children", &self.children.len())
            .field("parent_key", &links.parent_key)
            .field("prev_key", &links.prev_key)
            .field("next_key", &links.next_key)
            .field("index", &links.index)
            .field("level", &links.level)
            .finish_non_exhaustive()
    }
}
