//! Partial node descriptions produced by elements.
//!
//! A [`PartialNode`] is what an element says about itself before the builder
//! assigns a key and links it into the collection. Its children are described
//! by a [`ChildSource`] that can be walked any number of times with
//! [`PartialNode::child_nodes`]; each walk is an independent cursor.

use std::fmt;
use std::sync::Arc;

use crate::element::{Content, Element, InvalidateFn, Renderer, WrapperFn};
use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::node::NodeType;

/// An incomplete node description.
pub struct PartialNode<T> {
    /// The node type. Source partials (an element or value still to be
    /// described) leave this unset.
    pub node_type: Option<NodeType>,
    /// Explicit key override.
    pub key: Option<Key>,
    /// The data value the node represents.
    pub value: Option<Arc<T>>,
    /// The statically authored element the node comes from.
    pub element: Option<Element<T>>,
    /// Transform applied to the element before placement.
    pub wrapper: Option<WrapperFn<T>>,
    /// Primary display content.
    pub rendered: Option<Content<T>>,
    /// Plain-text projection of the content.
    pub text_value: Option<String>,
    /// Accessibility label.
    pub aria_label: Option<String>,
    /// Position override among siblings.
    pub index: Option<usize>,
    /// Render function for child values, carried down from the parent.
    pub renderer: Option<Renderer<T>>,
    /// Whether the node has descendants, even if not materialized yet.
    pub has_child_nodes: bool,
    /// Where the node's children come from.
    pub children: ChildSource<T>,
    /// The descriptor that produced this node.
    pub props: Option<Element<T>>,
    /// Predicate deciding whether a cached node for the same value is stale.
    pub should_invalidate: Option<InvalidateFn>,
}

impl<T> PartialNode<T> {
    /// Creates an empty partial node of the given type.
    pub fn of_type(node_type: NodeType) -> Self {
        Self {
            node_type: Some(node_type),
            ..Self::default()
        }
    }

    /// Creates a source partial for a data value.
    pub fn from_value(value: Arc<T>, index: usize) -> Self {
        Self {
            value: Some(value),
            index: Some(index),
            ..Self::default()
        }
    }

    /// Starts a fresh walk over the node's children.
    pub fn child_nodes(&self) -> ChildNodes<'_, T> {
        self.children.iter()
    }
}

impl<T> Default for PartialNode<T> {
    fn default() -> Self {
        Self {
            node_type: None,
            key: None,
            value: None,
            element: None,
            wrapper: None,
            rendered: None,
            text_value: None,
            aria_label: None,
            index: None,
            renderer: None,
            has_child_nodes: false,
            children: ChildSource::Empty,
            props: None,
            should_invalidate: None,
        }
    }
}

impl<T> fmt::Debug for PartialNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialNode")
            .field("node_type", &self.node_type)
            .field("key", &self.key)
            .field("has_value", &self.value.is_some())
            .field("element", &self.element)
            .field("rendered", &self.rendered)
            .field("text_value", &self.text_value)
            .field("aria_label", &self.aria_label)
            .field("index", &self.index)
            .field("has_child_nodes", &self.has_child_nodes)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Where a partial node's children come from.
pub enum ChildSource<T> {
    /// No children.
    Empty,
    /// One leaf per data value. A missing renderer means the parent's
    /// renderer applies.
    Values {
        /// The data values.
        values: Arc<[Arc<T>]>,
        /// Render function carried by every child.
        renderer: Option<Renderer<T>>,
    },
    /// One child per structurally valid element of the content.
    Elements(Content<T>),
    /// Children were a render function with no data collection. Walking the
    /// children fails.
    MissingItems(&'static str),
}

impl<T> ChildSource<T> {
    /// Starts a walk over the children.
    pub fn iter(&self) -> ChildNodes<'_, T> {
        let cursor = match self {
            Self::Empty => Cursor::Done,
            Self::Values { values, renderer } => Cursor::Values {
                values,
                renderer: renderer.as_ref(),
                pos: 0,
            },
            Self::Elements(content) => Cursor::Elements {
                elements: content.structural(),
                pos: 0,
            },
            Self::MissingItems(location) => Cursor::Failed(*location),
        };
        ChildNodes { cursor }
    }
}

impl<T> fmt::Debug for ChildSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Values { values, renderer } => f
                .debug_struct("Values")
                .field("len", &values.len())
                .field("has_renderer", &renderer.is_some())
                .finish(),
            Self::Elements(content) => f.debug_tuple("Elements").field(content).finish(),
            Self::MissingItems(location) => f.debug_tuple("MissingItems").field(location).finish(),
        }
    }
}

enum Cursor<'a, T> {
    Done,
    Failed(&'static str),
    Values {
        values: &'a [Arc<T>],
        renderer: Option<&'a Renderer<T>>,
        pos: usize,
    },
    Elements {
        elements: Vec<&'a Element<T>>,
        pos: usize,
    },
}

/// A cursor over a partial node's children.
///
/// Yields an error (once) when the children cannot be produced.
pub struct ChildNodes<'a, T> {
    cursor: Cursor<'a, T>,
}

impl<T> Iterator for ChildNodes<'_, T> {
    type Item = Result<PartialNode<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.cursor {
            Cursor::Done => None,
            Cursor::Failed(location) => {
                let err = CollectionError::missing_items(*location);
                self.cursor = Cursor::Done;
                Some(Err(err))
            }
            Cursor::Values {
                values,
                renderer,
                pos,
            } => {
                let value = values.get(*pos)?;
                *pos += 1;
                Some(Ok(PartialNode {
                    node_type: Some(NodeType::Item),
                    value: Some(Arc::clone(value)),
                    renderer: renderer.cloned(),
                    ..PartialNode::default()
                }))
            }
            Cursor::Elements { elements, pos } => {
                let element = elements.get(*pos)?;
                *pos += 1;
                Some(Ok(PartialNode {
                    node_type: Some(NodeType::Item),
                    element: Some((*element).clone()),
                    ..PartialNode::default()
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{renderer, Item, View};

    #[test]
    fn test_values_cursor_is_restartable() {
        let values: Arc<[Arc<String>]> =
            vec![Arc::new("a".to_string()), Arc::new("b".to_string())].into();
        let partial = PartialNode {
            has_child_nodes: true,
            children: ChildSource::Values {
                values: Arc::clone(&values),
                renderer: Some(renderer(|v: &String| Item::new(v.as_str()))),
            },
            ..PartialNode::of_type(NodeType::Section)
        };

        for _ in 0..2 {
            let children: Vec<_> = partial.child_nodes().map(|c| c.unwrap()).collect();
            assert_eq!(children.len(), 2);
            assert!(Arc::ptr_eq(children[0].value.as_ref().unwrap(), &values[0]));
            assert!(Arc::ptr_eq(children[1].value.as_ref().unwrap(), &values[1]));
            assert!(children.iter().all(|c| c.renderer.is_some()));
            assert!(children.iter().all(|c| c.node_type == Some(NodeType::Item)));
        }
    }

    #[test]
    fn test_elements_cursor_filters_non_structural() {
        let source: ChildSource<String> = ChildSource::Elements(Content::list([
            Content::from(Item::new("one")),
            Content::from("loose text"),
            Content::Empty,
            Content::from(View::new("div")),
        ]));

        let children: Vec<_> = source.iter().map(|c| c.unwrap()).collect();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.element.is_some() && c.value.is_none()));
    }

    #[test]
    fn test_missing_items_fails_on_consumption() {
        let source: ChildSource<String> = ChildSource::MissingItems("section");
        let mut walk = source.iter();

        assert_eq!(
            walk.next().unwrap().unwrap_err(),
            CollectionError::missing_items("section")
        );
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_empty_source() {
        let source: ChildSource<String> = ChildSource::Empty;
        assert_eq!(source.iter().count(), 0);
    }
}
