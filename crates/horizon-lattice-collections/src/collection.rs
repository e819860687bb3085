//! Collections: ordered, keyed containers of built nodes.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::key::Key;
use crate::logging::targets;
use crate::node::Node;

/// Iterator over shared nodes.
pub type NodeIter<'a, T> = Box<dyn Iterator<Item = &'a Arc<Node<T>>> + 'a>;

/// An ordered, keyed, iterable container of nodes.
///
/// Iteration order follows the depth-first order of the source tree: a
/// section's children come right after the section, in authoring order.
/// Widgets query collections through this trait regardless of how the content
/// was authored.
pub trait Collection<T>: Send + Sync {
    /// Number of nodes in the collection.
    fn size(&self) -> usize;

    /// Iterates the keys in collection order.
    fn keys(&self) -> Box<dyn Iterator<Item = &Key> + '_>;

    /// Iterates the nodes in collection order.
    fn iter(&self) -> NodeIter<'_, T>;

    /// Looks up a node by key.
    fn item(&self, key: &Key) -> Option<&Arc<Node<T>>>;

    /// Looks up a node by position in collection order.
    fn at(&self, index: usize) -> Option<&Arc<Node<T>>>;

    /// The key preceding `key`, if any.
    fn key_before(&self, key: &Key) -> Option<&Key>;

    /// The key following `key`, if any.
    fn key_after(&self, key: &Key) -> Option<&Key>;

    fn first_key(&self) -> Option<&Key>;

    fn last_key(&self) -> Option<&Key>;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Direct children of the node with `key`.
    ///
    /// Returns `None` when the collection has no child lookup, in which case
    /// callers fall back to the node's own children.
    fn children(&self, _key: &Key) -> Option<NodeIter<'_, T>> {
        None
    }

    /// Plain-text value of the node with `key`.
    fn text_value(&self, _key: &Key) -> Option<&str> {
        None
    }

    /// Per-instance cell used to memoize the item count.
    fn item_count_memo(&self) -> Option<&OnceLock<usize>> {
        None
    }
}

/// A flat, keyed collection over the builder's output.
///
/// Nodes keep the order they were given in. A node whose key repeats an
/// earlier one replaces it at the earlier position.
///
/// # Example
///
/// ```
/// use horizon_lattice_collections::{
///     get_item_count, BuildContext, Collection, CollectionBuilder, CollectionProps, Content,
///     Item, ListCollection, Section,
/// };
///
/// let props = CollectionProps::<String>::new().with_children(Section::new()
///     .with_key("fruits")
///     .with_title("Fruits")
///     .with_children(Content::list([
///         Item::new("Apple").with_key("apple"),
///         Item::new("Banana").with_key("banana"),
///     ])));
///
/// let mut builder = CollectionBuilder::new();
/// let collection = ListCollection::try_from_build(builder.build(&props, &BuildContext::new()))?;
///
/// assert_eq!(collection.size(), 3);
/// assert_eq!(collection.key_after(&"fruits".into()), Some(&"apple".into()));
/// assert_eq!(get_item_count(&collection), 2);
/// # Ok::<(), horizon_lattice_collections::CollectionError>(())
/// ```
pub struct ListCollection<T> {
    nodes: Vec<Arc<Node<T>>>,
    positions: HashMap<Key, usize>,
    item_count: OnceLock<usize>,
}

impl<T> ListCollection<T> {
    /// Creates a collection from nodes in collection order.
    pub fn new(nodes: impl IntoIterator<Item = Arc<Node<T>>>) -> Self {
        let mut ordered: Vec<Arc<Node<T>>> = Vec::new();
        let mut positions = HashMap::new();

        for node in nodes {
            match positions.get(node.key()) {
                Some(&position) => {
                    tracing::warn!(target: targets::COLLECTION, key = %node.key(), "duplicate key in collection, replacing earlier node");
                    ordered[position] = node;
                }
                None => {
                    positions.insert(node.key().clone(), ordered.len());
                    ordered.push(node);
                }
            }
        }

        tracing::trace!(target: targets::COLLECTION, size = ordered.len(), "created list collection");
        Self {
            nodes: ordered,
            positions,
            item_count: OnceLock::new(),
        }
    }

    /// Collects a build, failing on the first build error.
    pub fn try_from_build<I>(build: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = crate::Result<Arc<Node<T>>>>,
    {
        let nodes = build.into_iter().collect::<crate::Result<Vec<_>>>()?;
        Ok(Self::new(nodes))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.positions.get(key).copied()
    }
}

impl<T> FromIterator<Arc<Node<T>>> for ListCollection<T> {
    fn from_iter<I: IntoIterator<Item = Arc<Node<T>>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T: Send + Sync> Collection<T> for ListCollection<T> {
    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &Key> + '_> {
        Box::new(self.nodes.iter().map(|node| node.key()))
    }

    fn iter(&self) -> NodeIter<'_, T> {
        Box::new(self.nodes.iter())
    }

    fn item(&self, key: &Key) -> Option<&Arc<Node<T>>> {
        self.nodes.get(self.position(key)?)
    }

    fn at(&self, index: usize) -> Option<&Arc<Node<T>>> {
        self.nodes.get(index)
    }

    fn key_before(&self, key: &Key) -> Option<&Key> {
        let position = self.position(key)?.checked_sub(1)?;
        self.nodes.get(position).map(|node| node.key())
    }

    fn key_after(&self, key: &Key) -> Option<&Key> {
        let position = self.position(key)? + 1;
        self.nodes.get(position).map(|node| node.key())
    }

    fn first_key(&self) -> Option<&Key> {
        self.nodes.first().map(|node| node.key())
    }

    fn last_key(&self) -> Option<&Key> {
        self.nodes.last().map(|node| node.key())
    }

    fn children(&self, key: &Key) -> Option<NodeIter<'_, T>> {
        let node = self.item(key)?;
        Some(Box::new(node.child_nodes()))
    }

    fn text_value(&self, key: &Key) -> Option<&str> {
        self.item(key).map(|node| node.text_value())
    }

    fn item_count_memo(&self) -> Option<&OnceLock<usize>> {
        Some(&self.item_count)
    }
}

impl<T> fmt::Debug for ListCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListCollection")
            .field("size", &self.nodes.len())
            .field("keys", &self.nodes.iter().map(|n| n.key()).collect::<Vec<_>>())
            .finish()
    }
}
