//! Leaf items.

use std::fmt;
use std::sync::Arc;

use super::{Children, Content, Element, InvalidateFn, View, WrapperFn};
use crate::context::BuildContext;
use crate::key::Key;
use crate::logging::targets;
use crate::node::{ItemValue, NodeType};
use crate::partial::{ChildSource, PartialNode};

/// Diagnostic emitted when an item has no plain-text projection.
pub const TEXT_VALUE_WARNING: &str = "Item with non-plain text contents is unsupported by type to select for accessibility. Please set a text value with `Item::with_text_value`.";

/// A leaf element of a collection.
///
/// An item with a title and structural children, or with child items, becomes
/// an expandable node in tree-like collections.
pub struct Item<T> {
    key: Option<Key>,
    title: Option<Content<T>>,
    children: Option<Children<T>>,
    text_value: Option<String>,
    aria_label: Option<String>,
    child_items: Option<Arc<[Arc<T>]>>,
    has_child_items: Option<bool>,
    should_invalidate: Option<InvalidateFn>,
    wrapper: Option<WrapperFn<T>>,
}

impl<T> Item<T> {
    /// Creates an item displaying `children`.
    pub fn new(children: impl Into<Children<T>>) -> Self {
        Self {
            children: Some(children.into()),
            ..Self::empty()
        }
    }

    /// Creates an item with no content.
    pub fn empty() -> Self {
        Self {
            key: None,
            title: None,
            children: None,
            text_value: None,
            aria_label: None,
            child_items: None,
            has_child_items: None,
            should_invalidate: None,
            wrapper: None,
        }
    }

    /// Sets the item's key.
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets a title. Titled items treat their structural children as child
    /// items.
    pub fn with_title(mut self, title: impl Into<Content<T>>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the item's children.
    pub fn with_children(mut self, children: impl Into<Children<T>>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Sets the plain-text projection used for type-to-select.
    pub fn with_text_value(mut self, text_value: impl Into<String>) -> Self {
        self.text_value = Some(text_value.into());
        self
    }

    /// Sets the accessibility label.
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    /// Sets child data values, rendered with the collection's renderer.
    pub fn with_child_items(mut self, items: impl Into<Arc<[Arc<T>]>>) -> Self {
        self.child_items = Some(items.into());
        self
    }

    /// Declares whether the item has children, overriding detection.
    pub fn with_has_child_items(mut self, has_child_items: bool) -> Self {
        self.has_child_items = Some(has_child_items);
        self
    }

    /// Attaches a predicate that marks cached nodes for this item as stale.
    pub fn with_should_invalidate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&BuildContext) -> bool + Send + Sync + 'static,
    {
        self.should_invalidate = Some(Arc::new(predicate));
        self
    }

    /// Sets a transform applied to the element when the node is placed.
    pub fn with_wrapper<F>(mut self, wrapper: F) -> Self
    where
        F: Fn(Element<T>) -> Element<T> + Send + Sync + 'static,
    {
        self.wrapper = Some(Arc::new(wrapper));
        self
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn title(&self) -> Option<&Content<T>> {
        self.title.as_ref()
    }

    pub fn children(&self) -> Option<&Children<T>> {
        self.children.as_ref()
    }

    pub fn aria_label(&self) -> Option<&str> {
        self.aria_label.as_deref()
    }

    pub fn should_invalidate(&self) -> Option<&InvalidateFn> {
        self.should_invalidate.as_ref()
    }

    pub fn wrapper(&self) -> Option<&WrapperFn<T>> {
        self.wrapper.as_ref()
    }

    /// Items never produce markup of their own; views render the node.
    pub fn render(&self) -> Option<View> {
        None
    }

    /// Whether the item has children.
    ///
    /// An explicit declaration wins, then child items, then a title combined
    /// with at least one structural child.
    pub fn has_child_items(&self) -> bool {
        if let Some(declared) = self.has_child_items {
            return declared;
        }
        if self.child_items.is_some() {
            return true;
        }
        self.title.is_some() && self.static_children().is_some_and(Content::has_structural)
    }

    fn static_children(&self) -> Option<&Content<T>> {
        self.children.as_ref().and_then(Children::as_content)
    }

    /// The primary display content: the title if present, else the children.
    fn rendered(&self) -> Option<Content<T>> {
        self.title
            .clone()
            .or_else(|| self.static_children().cloned())
    }

    fn resolve_text_value(&self, rendered: Option<&Content<T>>) -> String {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        self.text_value
            .as_deref()
            .and_then(non_empty)
            .or_else(|| rendered.and_then(Content::as_text).and_then(non_empty))
            .or_else(|| self.aria_label.as_deref().and_then(non_empty))
            .unwrap_or_default()
    }

    fn child_source(&self) -> ChildSource<T> {
        if let Some(items) = &self.child_items {
            return ChildSource::Values {
                values: Arc::clone(items),
                renderer: None,
            };
        }
        match (&self.title, self.static_children()) {
            (Some(_), Some(children)) => ChildSource::Elements(children.clone()),
            _ => ChildSource::Empty,
        }
    }
}

impl<T: ItemValue> Item<T> {
    /// Describes a data value that has no render function.
    pub fn for_value(value: &T) -> Self {
        match value.text_value() {
            Some(text) => Self::new(text.clone()).with_text_value(text),
            None => Self::empty(),
        }
    }
}

impl<T> fmt::Debug for Item<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("children", &self.children)
            .field("text_value", &self.text_value)
            .field("aria_label", &self.aria_label)
            .field("child_items", &self.child_items.as_ref().map(|items| items.len()))
            .field("has_child_items", &self.has_child_items)
            .field("has_wrapper", &self.wrapper.is_some())
            .finish_non_exhaustive()
    }
}

/// Describes an item as a partial node.
pub(super) fn describe<T>(item: &Arc<Item<T>>, context: &BuildContext) -> PartialNode<T> {
    let rendered = item.rendered();
    let text_value = item.resolve_text_value(rendered.as_ref());

    if text_value.is_empty() && context.diagnostics_enabled() {
        tracing::warn!(target: targets::ELEMENT, key = ?item.key, "{}", TEXT_VALUE_WARNING);
    }

    PartialNode {
        node_type: Some(NodeType::Item),
        rendered,
        text_value: Some(text_value),
        aria_label: item.aria_label.clone(),
        has_child_nodes: item.has_child_items(),
        children: item.child_source(),
        props: Some(Element::Item(Arc::clone(item))),
        should_invalidate: item.should_invalidate.clone(),
        wrapper: item.wrapper.clone(),
        ..PartialNode::default()
    }
}
