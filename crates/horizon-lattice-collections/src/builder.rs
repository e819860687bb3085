//! The collection builder.
//!
//! [`CollectionBuilder::build`] walks the declarative input (static elements,
//! or a data collection paired with a render function) and produces the
//! flattened, keyed and linked node sequence a [`Collection`] is made from.
//!
//! Nodes backed by a data value are cached under that value's identity, so a
//! rebuild over the same `Arc`s hands back the same node objects unless an
//! invalidation predicate asks for a fresh one.
//!
//! [`Collection`]: crate::Collection

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::cache::NodeCache;
use crate::context::BuildContext;
use crate::element::{compose_wrappers, Children, Element, Item, Renderer};
use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::logging::targets;
use crate::node::{ItemValue, Node, NodeLinks, NodeParts, NodeType};
use crate::partial::PartialNode;

/// Function extracting a key from a data value.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> Key + Send + Sync>;

/// Input to a build.
///
/// Either static `children`, or `items` rendered by a render function given as
/// the children. When both items and static children are present the items
/// win and each value is described through [`ItemValue`].
pub struct CollectionProps<T> {
    children: Option<Children<T>>,
    items: Option<Arc<[Arc<T>]>>,
    get_key: Option<KeyFn<T>>,
    disabled_keys: HashSet<Key>,
}

impl<T> CollectionProps<T> {
    pub fn new() -> Self {
        Self {
            children: None,
            items: None,
            get_key: None,
            disabled_keys: HashSet::new(),
        }
    }

    /// Sets the children: static content or a render function.
    pub fn with_children(mut self, children: impl Into<Children<T>>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Sets a render function applied to every item.
    pub fn with_renderer<F, E>(self, render: F) -> Self
    where
        F: Fn(&T) -> E + Send + Sync + 'static,
        E: Into<Option<Element<T>>>,
    {
        self.with_children(Children::render(render))
    }

    /// Sets the data collection.
    pub fn with_items(mut self, items: impl Into<Arc<[Arc<T>]>>) -> Self {
        self.items = Some(items.into());
        self
    }

    /// Sets the key extractor applied to data values.
    pub fn with_get_key<F>(mut self, get_key: F) -> Self
    where
        F: Fn(&T) -> Key + Send + Sync + 'static,
    {
        self.get_key = Some(Arc::new(get_key));
        self
    }

    /// Sets the disabled keys. The builder passes them through untouched.
    pub fn with_disabled_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.disabled_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn children(&self) -> Option<&Children<T>> {
        self.children.as_ref()
    }

    pub fn items(&self) -> Option<&Arc<[Arc<T>]>> {
        self.items.as_ref()
    }

    pub fn get_key(&self) -> Option<&KeyFn<T>> {
        self.get_key.as_ref()
    }

    pub fn disabled_keys(&self) -> &HashSet<Key> {
        &self.disabled_keys
    }
}

impl<T> Default for CollectionProps<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CollectionProps<T> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            items: self.items.clone(),
            get_key: self.get_key.clone(),
            disabled_keys: self.disabled_keys.clone(),
        }
    }
}

impl<T> fmt::Debug for CollectionProps<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionProps")
            .field("children", &self.children)
            .field("items", &self.items.as_ref().map(|items| items.len()))
            .field("has_get_key", &self.get_key.is_some())
            .field("disabled_keys", &self.disabled_keys)
            .finish()
    }
}

/// Builds collections, caching nodes across builds.
///
/// Each builder owns its cache; builders never share nodes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_lattice_collections::{BuildContext, CollectionBuilder, CollectionProps, Item};
///
/// let items: Vec<Arc<String>> = vec![Arc::new("Apple".into()), Arc::new("Banana".into())];
/// let props = CollectionProps::new()
///     .with_items(items)
///     .with_renderer(|name: &String| Item::new(name.as_str()).with_key(name.as_str()));
///
/// let mut builder = CollectionBuilder::new();
/// let first: Vec<_> = builder.build(&props, &BuildContext::new()).collect::<Result<_, _>>()?;
/// let second: Vec<_> = builder.build(&props, &BuildContext::new()).collect::<Result<_, _>>()?;
///
/// assert_eq!(first.len(), 2);
/// assert!(Arc::ptr_eq(&first[0], &second[0]));
/// # Ok::<(), horizon_lattice_collections::CollectionError>(())
/// ```
pub struct CollectionBuilder<T> {
    cache: NodeCache<T>,
    passes: u64,
}

impl<T: ItemValue> CollectionBuilder<T> {
    pub fn new() -> Self {
        Self {
            cache: NodeCache::new(),
            passes: 0,
        }
    }

    /// Starts a build over `props`.
    ///
    /// The returned iterator is lazy: each top-level entry is described,
    /// keyed and linked (with its whole subtree) when it is pulled. It yields
    /// the nodes in flattened depth-first order and stops after the first
    /// error.
    ///
    /// Starting a build drops the cache entries the previous build did not
    /// use, provided that build ran to the end. Abandoning a build, or one
    /// that stopped on an error, leaves the cache as it was.
    pub fn build<'a>(
        &'a mut self,
        props: &'a CollectionProps<T>,
        context: &'a BuildContext,
    ) -> Build<'a, T> {
        self.passes += 1;
        self.cache.begin_pass();
        tracing::debug!(target: targets::BUILDER, pass = self.passes, cached = self.cache.len(), "starting collection build");

        let source = match (&props.items, &props.children) {
            (Some(values), children) => TopLevel::Values {
                values: &values[..],
                renderer: children.as_ref().and_then(Children::as_renderer).cloned(),
                pos: 0,
            },
            (None, Some(Children::Render(_))) => TopLevel::Failed,
            (None, Some(Children::Content(content))) => TopLevel::Elements {
                elements: content.structural(),
                pos: 0,
            },
            (None, None) => TopLevel::Done,
        };

        Build {
            resolver: Resolver {
                cache: &mut self.cache,
                get_key: props.get_key.as_ref(),
                context,
            },
            source,
            index: 0,
            pending: VecDeque::new(),
            last: None,
            error: None,
            exhausted: false,
        }
    }

    /// Number of cached nodes.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached node.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl<T: ItemValue> Default for CollectionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CollectionBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBuilder")
            .field("passes", &self.passes)
            .field("cached", &self.cache.len())
            .finish()
    }
}

enum TopLevel<'a, T> {
    Done,
    Failed,
    Values {
        values: &'a [Arc<T>],
        renderer: Option<Renderer<T>>,
        pos: usize,
    },
    Elements {
        elements: Vec<&'a Element<T>>,
        pos: usize,
    },
}

/// Where a node is being placed.
#[derive(Clone, Copy)]
struct Parent<'p> {
    key: Option<&'p Key>,
    level: usize,
}

impl Parent<'_> {
    fn root() -> Self {
        Self {
            key: None,
            level: 0,
        }
    }
}

/// Turns partial nodes into finished nodes.
struct Resolver<'a, T> {
    cache: &'a mut NodeCache<T>,
    get_key: Option<&'a KeyFn<T>>,
    context: &'a BuildContext,
}

impl<T: ItemValue> Resolver<'_, T> {
    /// Expands one partial node into zero or more sibling nodes appended to
    /// `out`. `counter` is the next free sibling position.
    fn expand(
        &mut self,
        partial: PartialNode<T>,
        parent: Parent<'_>,
        inherited: Option<&Renderer<T>>,
        counter: &mut usize,
        out: &mut Vec<Arc<Node<T>>>,
    ) -> Result<()> {
        let renderer = partial.renderer.clone().or_else(|| inherited.cloned());

        let element = match (&partial.element, &partial.value) {
            (Some(element), _) => element.clone(),
            (None, Some(value)) => match &renderer {
                Some(render) => match render(value.as_ref()) {
                    Some(element) => element,
                    None => {
                        tracing::trace!(target: targets::BUILDER, "render function produced no element");
                        return Ok(());
                    }
                },
                None => Item::for_value(value.as_ref()).into(),
            },
            (None, None) => return Ok(()),
        };

        if let Element::Fragment(members) = &element {
            for member in members.structural() {
                let spliced = PartialNode {
                    node_type: partial.node_type,
                    element: Some(member.clone()),
                    wrapper: partial.wrapper.clone(),
                    renderer: partial.renderer.clone(),
                    ..PartialNode::default()
                };
                self.expand(spliced, parent, inherited, counter, out)?;
            }
            return Ok(());
        }

        if let Some(value) = &partial.value {
            if self.cache.is_live(value) {
                tracing::warn!(target: targets::BUILDER, ?value, "value appears more than once in one build, skipping repeat");
                return Ok(());
            }
            if let Some(cached) = self.cache.get(value) {
                let predicate = element
                    .should_invalidate()
                    .or_else(|| cached.should_invalidate());
                if predicate.is_some_and(|stale| stale(self.context)) {
                    tracing::debug!(target: targets::CACHE, key = %cached.key(), "cached node invalidated");
                } else {
                    tracing::trace!(target: targets::CACHE, key = %cached.key(), "reusing cached node");
                    cached.place(parent.key.cloned(), partial.index.unwrap_or(*counter), parent.level);
                    self.cache.touch_subtree(&cached);
                    *counter += 1;
                    out.push(cached);
                    return Ok(());
                }
            }
        }

        let Some(described) = element.collection_node(self.context) else {
            tracing::trace!(target: targets::BUILDER, element = ?element, "skipping element that does not describe a node");
            return Ok(());
        };

        let key = self.resolve_key(&partial, &element, parent, *counter)?;
        let node = self.make_node(partial, described, key, parent, renderer.as_ref(), *counter)?;
        if let Some(value) = node.value() {
            self.cache.insert(value, Arc::clone(&node));
        }
        *counter += 1;
        out.push(node);
        Ok(())
    }

    fn resolve_key(
        &self,
        partial: &PartialNode<T>,
        element: &Element<T>,
        parent: Parent<'_>,
        counter: usize,
    ) -> Result<Key> {
        let value = partial.value.as_deref();
        let key = partial
            .key
            .clone()
            .or_else(|| value.zip(self.get_key).map(|(value, get_key)| get_key(value)))
            .or_else(|| element.key().cloned())
            .or_else(|| value.and_then(ItemValue::key));

        match (key, value) {
            (Some(key), _) => Ok(key),
            (None, Some(value)) => Err(CollectionError::missing_key(format!("{value:?}"))),
            (None, None) => Ok(Key::positional(
                parent.key,
                partial.index.unwrap_or(counter),
            )),
        }
    }

    fn make_node(
        &mut self,
        partial: PartialNode<T>,
        described: PartialNode<T>,
        key: Key,
        parent: Parent<'_>,
        renderer: Option<&Renderer<T>>,
        counter: usize,
    ) -> Result<Arc<Node<T>>> {
        let mut children = Vec::new();
        if described.has_child_nodes {
            let scope = Parent {
                key: Some(&key),
                level: parent.level + 1,
            };
            let mut child_counter = 0;
            for child in described.child_nodes() {
                self.expand(child?, scope, renderer, &mut child_counter, &mut children)?;
            }
        }

        let node = Node::new(NodeParts {
            node_type: described.node_type.unwrap_or(NodeType::Item),
            key,
            value: partial.value.or(described.value),
            rendered: described.rendered,
            text_value: described.text_value.unwrap_or_default(),
            aria_label: described.aria_label,
            has_child_nodes: described.has_child_nodes,
            children,
            props: described.props,
            wrapper: compose_wrappers(partial.wrapper.as_ref(), described.wrapper.as_ref()),
            should_invalidate: described.should_invalidate,
            links: NodeLinks {
                parent_key: parent.key.cloned(),
                index: partial.index.unwrap_or(counter),
                level: parent.level,
                ..NodeLinks::default()
            },
        });
        tracing::trace!(target: targets::BUILDER, node = ?node, "built node");
        Ok(Arc::new(node))
    }
}

/// A lazy build, yielding nodes in flattened depth-first order.
///
/// Created by [`CollectionBuilder::build`]. Each node's `prev_key` and
/// `next_key` link it to its neighbours in this order; a node is yielded only
/// once its successor is known.
pub struct Build<'a, T> {
    resolver: Resolver<'a, T>,
    source: TopLevel<'a, T>,
    index: usize,
    pending: VecDeque<Arc<Node<T>>>,
    last: Option<Arc<Node<T>>>,
    error: Option<CollectionError>,
    exhausted: bool,
}

impl<T: ItemValue> Build<'_, T> {
    /// Produces the nodes of the next top-level entry, skipping entries that
    /// produce none.
    fn pull(&mut self) -> Result<Option<Vec<Arc<Node<T>>>>> {
        loop {
            let (partial, renderer) = match &mut self.source {
                TopLevel::Done => return Ok(None),
                TopLevel::Failed => {
                    self.source = TopLevel::Done;
                    return Err(CollectionError::missing_items("props"));
                }
                TopLevel::Values {
                    values,
                    renderer,
                    pos,
                } => {
                    let Some(value) = values.get(*pos) else {
                        return Ok(None);
                    };
                    *pos += 1;
                    let partial = PartialNode::from_value(Arc::clone(value), self.index);
                    (partial, renderer.clone())
                }
                TopLevel::Elements { elements, pos } => {
                    let Some(element) = elements.get(*pos) else {
                        return Ok(None);
                    };
                    *pos += 1;
                    let partial = PartialNode {
                        element: Some((*element).clone()),
                        ..PartialNode::default()
                    };
                    (partial, None)
                }
            };

            let mut out = Vec::new();
            self.resolver.expand(
                partial,
                Parent::root(),
                renderer.as_ref(),
                &mut self.index,
                &mut out,
            )?;
            if !out.is_empty() {
                return Ok(Some(out));
            }
        }
    }

    /// Appends `node` and its subtree to the pending queue, linking each one
    /// to its predecessor in flattened order.
    fn enqueue(&mut self, node: Arc<Node<T>>) {
        let prev_key = self.last.as_ref().map(|last| last.key().clone());
        if let Some(last) = &self.last {
            last.set_next_key(Some(node.key().clone()));
        }
        node.set_prev_key(prev_key);
        node.set_next_key(None);
        self.last = Some(Arc::clone(&node));
        self.pending.push_back(Arc::clone(&node));

        for child in node.child_nodes() {
            child.place(Some(node.key().clone()), child.index(), node.level() + 1);
            self.enqueue(Arc::clone(child));
        }
    }
}

impl<T: ItemValue> Iterator for Build<'_, T> {
    type Item = Result<Arc<Node<T>>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending.len() > 1 {
                return self.pending.pop_front().map(Ok);
            }
            if self.exhausted {
                if let Some(node) = self.pending.pop_front() {
                    return Some(Ok(node));
                }
                return self.error.take().map(Err);
            }
            match self.pull() {
                Ok(Some(nodes)) => {
                    for node in nodes {
                        self.enqueue(node);
                    }
                }
                Ok(None) => {
                    self.resolver.cache.complete_pass();
                    self.exhausted = true;
                }
                Err(err) => {
                    tracing::debug!(target: targets::BUILDER, error = %err, "collection build failed");
                    self.exhausted = true;
                    self.error = Some(err);
                }
            }
        }
    }
}

impl<T: ItemValue> std::iter::FusedIterator for Build<'_, T> {}
