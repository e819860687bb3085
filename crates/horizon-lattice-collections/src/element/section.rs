//! Titled groups of items.

use std::fmt;
use std::sync::Arc;

use super::{Children, Content, Element, InvalidateFn, View, WrapperFn};
use crate::context::BuildContext;
use crate::key::Key;
use crate::node::NodeType;
use crate::partial::{ChildSource, PartialNode};

/// A container element grouping items under an optional title.
///
/// Children are either authored statically or produced by a render function
/// over [`Section::with_items`].
pub struct Section<T> {
    key: Option<Key>,
    title: Option<Content<T>>,
    aria_label: Option<String>,
    children: Option<Children<T>>,
    items: Option<Arc<[Arc<T>]>>,
    should_invalidate: Option<InvalidateFn>,
    wrapper: Option<WrapperFn<T>>,
}

impl<T> Section<T> {
    /// Creates an empty, untitled section.
    pub fn new() -> Self {
        Self {
            key: None,
            title: None,
            aria_label: None,
            children: None,
            items: None,
            should_invalidate: None,
            wrapper: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<Content<T>>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    /// Sets the section's children.
    pub fn with_children(mut self, children: impl Into<Children<T>>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Sets the data values rendered by the section's render function.
    pub fn with_items(mut self, items: impl Into<Arc<[Arc<T>]>>) -> Self {
        self.items = Some(items.into());
        self
    }

    /// Sets a render function as the section's children.
    pub fn with_render<F, E>(self, render: F) -> Self
    where
        F: Fn(&T) -> E + Send + Sync + 'static,
        E: Into<Option<Element<T>>>,
    {
        self.with_children(Children::render(render))
    }

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

    pub fn aria_label(&self) -> Option<&str> {
        self.aria_label.as_deref()
    }

    pub fn items(&self) -> Option<&Arc<[Arc<T>]>> {
        self.items.as_ref()
    }

    pub fn should_invalidate(&self) -> Option<&InvalidateFn> {
        self.should_invalidate.as_ref()
    }

    pub fn wrapper(&self) -> Option<&WrapperFn<T>> {
        self.wrapper.as_ref()
    }

    /// Sections never produce markup of their own.
    pub fn render(&self) -> Option<View> {
        None
    }

    fn child_source(&self) -> ChildSource<T> {
        match &self.children {
            Some(Children::Render(render)) => match &self.items {
                Some(items) => ChildSource::Values {
                    values: Arc::clone(items),
                    renderer: Some(Arc::clone(render)),
                },
                None => ChildSource::MissingItems("section"),
            },
            Some(Children::Content(content)) => ChildSource::Elements(content.clone()),
            None => ChildSource::Empty,
        }
    }
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Section<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("aria_label", &self.aria_label)
            .field("children", &self.children)
            .field("items", &self.items.as_ref().map(|items| items.len()))
            .field("has_wrapper", &self.wrapper.is_some())
            .finish_non_exhaustive()
    }
}

/// Describes a section as a partial node.
///
/// A render function without items is only reported when the children are
/// walked, so the failure surfaces where the section is consumed.
pub(super) fn describe<T>(section: &Arc<Section<T>>) -> PartialNode<T> {
    PartialNode {
        rendered: section.title.clone(),
        aria_label: section.aria_label.clone(),
        has_child_nodes: true,
        children: section.child_source(),
        props: Some(Element::Section(Arc::clone(section))),
        should_invalidate: section.should_invalidate.clone(),
        wrapper: section.wrapper.clone(),
        ..PartialNode::of_type(NodeType::Section)
    }
}
