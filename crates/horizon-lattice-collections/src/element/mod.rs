//! Declarative elements that describe collection content.
//!
//! An [`Element`] is never rendered by the collection system. Items and
//! sections are asked to *describe* themselves as a [`PartialNode`], which the
//! [`CollectionBuilder`](crate::CollectionBuilder) resolves into keyed,
//! linked nodes. The element set is closed: dispatch happens on the variant
//! tag rather than through trait objects.
//!
//! # Authoring styles
//!
//! ```
//! use std::sync::Arc;
//! use horizon_lattice_collections::{Content, Element, Item, Section};
//!
//! // Static markup: a section with two items.
//! let fruits: Element<String> = Section::new()
//!     .with_key("fruits")
//!     .with_title("Fruits")
//!     .with_children(Content::list([
//!         Item::new("Apple").with_key("apple"),
//!         Item::new("Banana").with_key("banana"),
//!     ]))
//!     .into();
//!
//! // Data-driven: one item per value, rendered on demand.
//! let vegetables: Element<String> = Section::new()
//!     .with_key("vegetables")
//!     .with_items(vec![Arc::new("Carrot".to_string())])
//!     .with_render(|name: &String| Item::new(name.as_str()).with_key(name.as_str()))
//!     .into();
//! # let _ = (fruits, vegetables);
//! ```

mod item;
mod section;

use std::fmt;
use std::sync::Arc;

pub use item::{Item, TEXT_VALUE_WARNING};
pub use section::Section;

use crate::context::BuildContext;
use crate::key::Key;
use crate::partial::PartialNode;

/// Function producing an element for one data value.
///
/// Returning `None` skips the value.
pub type Renderer<T> = Arc<dyn Fn(&T) -> Option<Element<T>> + Send + Sync>;

/// Transform applied to a node's element before it is placed by a view.
pub type WrapperFn<T> = Arc<dyn Fn(Element<T>) -> Element<T> + Send + Sync>;

/// Predicate deciding whether a cached node must be rebuilt.
pub type InvalidateFn = Arc<dyn Fn(&BuildContext) -> bool + Send + Sync>;

/// Wraps a closure as a [`Renderer`].
///
/// The closure may return an [`Element`], an `Option<Element>`, or an
/// [`Item`]/[`Section`] directly.
pub fn renderer<T, F, E>(render: F) -> Renderer<T>
where
    F: Fn(&T) -> E + Send + Sync + 'static,
    E: Into<Option<Element<T>>>,
{
    Arc::new(move |value| render(value).into())
}

/// Composes two wrappers so that `inner` runs first.
pub fn compose_wrappers<T: 'static>(
    outer: Option<&WrapperFn<T>>,
    inner: Option<&WrapperFn<T>>,
) -> Option<WrapperFn<T>> {
    match (outer, inner) {
        (Some(outer), Some(inner)) => {
            let (outer, inner) = (Arc::clone(outer), Arc::clone(inner));
            Some(Arc::new(move |element| outer(inner(element))))
        }
        (Some(only), None) | (None, Some(only)) => Some(Arc::clone(only)),
        (None, None) => None,
    }
}

/// A declarative element.
pub enum Element<T> {
    /// A leaf item, optionally carrying child items.
    Item(Arc<Item<T>>),
    /// A titled group of items.
    Section(Arc<Section<T>>),
    /// A transparent grouping whose members splice into the enclosing
    /// sequence.
    Fragment(Arc<Content<T>>),
    /// Opaque display markup. Structurally valid, but not a collection
    /// descriptor.
    View(Arc<View>),
}

impl<T> Element<T> {
    /// Creates a fragment from its members.
    pub fn fragment<I, C>(members: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Content<T>>,
    {
        Self::Fragment(Arc::new(Content::list(members)))
    }

    /// Returns the element's own key, if it has one.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Item(item) => item.key(),
            Self::Section(section) => section.key(),
            Self::View(view) => view.key(),
            Self::Fragment(_) => None,
        }
    }

    /// Whether this element can describe itself as a collection node.
    pub fn is_descriptor(&self) -> bool {
        matches!(self, Self::Item(_) | Self::Section(_))
    }

    /// Returns the invalidation predicate attached to the element.
    pub fn should_invalidate(&self) -> Option<&InvalidateFn> {
        match self {
            Self::Item(item) => item.should_invalidate(),
            Self::Section(section) => section.should_invalidate(),
            Self::Fragment(_) | Self::View(_) => None,
        }
    }

    /// Returns `true` if both handles point at the same element.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Item(a), Self::Item(b)) => Arc::ptr_eq(a, b),
            (Self::Section(a), Self::Section(b)) => Arc::ptr_eq(a, b),
            (Self::Fragment(a), Self::Fragment(b)) => Arc::ptr_eq(a, b),
            (Self::View(a), Self::View(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: 'static> Element<T> {
    /// Describes the element as a partial node.
    ///
    /// Returns `None` for elements that are not descriptors (fragments and
    /// views).
    pub fn collection_node(&self, context: &BuildContext) -> Option<PartialNode<T>> {
        match self {
            Self::Item(item) => Some(item::describe(item, context)),
            Self::Section(section) => Some(section::describe(section)),
            Self::Fragment(_) | Self::View(_) => None,
        }
    }
}

impl<T> Clone for Element<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Item(item) => Self::Item(Arc::clone(item)),
            Self::Section(section) => Self::Section(Arc::clone(section)),
            Self::Fragment(members) => Self::Fragment(Arc::clone(members)),
            Self::View(view) => Self::View(Arc::clone(view)),
        }
    }
}

impl<T> fmt::Debug for Element<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(item) => fmt::Debug::fmt(item, f),
            Self::Section(section) => fmt::Debug::fmt(section, f),
            Self::Fragment(members) => f.debug_tuple("Fragment").field(members).finish(),
            Self::View(view) => fmt::Debug::fmt(view, f),
        }
    }
}

impl<T> From<Item<T>> for Element<T> {
    fn from(item: Item<T>) -> Self {
        Self::Item(Arc::new(item))
    }
}

impl<T> From<Section<T>> for Element<T> {
    fn from(section: Section<T>) -> Self {
        Self::Section(Arc::new(section))
    }
}

impl<T> From<View> for Element<T> {
    fn from(view: View) -> Self {
        Self::View(Arc::new(view))
    }
}

impl<T> From<Item<T>> for Option<Element<T>> {
    fn from(item: Item<T>) -> Self {
        Some(item.into())
    }
}

impl<T> From<Section<T>> for Option<Element<T>> {
    fn from(section: Section<T>) -> Self {
        Some(section.into())
    }
}

/// Opaque display markup, such as a styled label inside an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    tag: String,
    key: Option<Key>,
    text: Option<String>,
}

impl View {
    /// Creates markup with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            text: None,
        }
    }

    /// Sets the markup's key.
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the markup's text contents.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// The tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The markup's key.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The markup's text contents.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Displayable content: text, numbers, elements, or lists of them.
pub enum Content<T> {
    /// Nothing (a null child).
    Empty,
    /// Plain text.
    Text(String),
    /// A number.
    Number(f64),
    /// An element.
    Element(Element<T>),
    /// Several children.
    List(Vec<Content<T>>),
}

impl<T> Content<T> {
    /// Creates list content.
    pub fn list<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Content<T>>,
    {
        Self::List(children.into_iter().map(Into::into).collect())
    }

    /// Returns the text if this is plain text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the structurally valid children (elements), flattening lists.
    ///
    /// Text, numbers and empty entries are skipped.
    pub fn structural(&self) -> Vec<&Element<T>> {
        let mut out = Vec::new();
        self.collect_structural(&mut out);
        out
    }

    /// Whether any structural child exists.
    pub fn has_structural(&self) -> bool {
        match self {
            Self::Element(_) => true,
            Self::List(children) => children.iter().any(Content::has_structural),
            Self::Empty | Self::Text(_) | Self::Number(_) => false,
        }
    }

    fn collect_structural<'a>(&'a self, out: &mut Vec<&'a Element<T>>) {
        match self {
            Self::Element(element) => out.push(element),
            Self::List(children) => {
                for child in children {
                    child.collect_structural(out);
                }
            }
            Self::Empty | Self::Text(_) | Self::Number(_) => {}
        }
    }
}

impl<T> Clone for Content<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Text(text) => Self::Text(text.clone()),
            Self::Number(n) => Self::Number(*n),
            Self::Element(element) => Self::Element(element.clone()),
            Self::List(children) => Self::List(children.clone()),
        }
    }
}

impl<T> fmt::Debug for Content<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Element(element) => fmt::Debug::fmt(element, f),
            Self::List(children) => f.debug_list().entries(children).finish(),
        }
    }
}

impl<T> From<&str> for Content<T> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl<T> From<String> for Content<T> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T> From<f64> for Content<T> {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl<T> From<Element<T>> for Content<T> {
    fn from(element: Element<T>) -> Self {
        Self::Element(element)
    }
}

impl<T> From<Item<T>> for Content<T> {
    fn from(item: Item<T>) -> Self {
        Self::Element(item.into())
    }
}

impl<T> From<Section<T>> for Content<T> {
    fn from(section: Section<T>) -> Self {
        Self::Element(section.into())
    }
}

impl<T> From<View> for Content<T> {
    fn from(view: View) -> Self {
        Self::Element(view.into())
    }
}

impl<T> From<Vec<Content<T>>> for Content<T> {
    fn from(children: Vec<Content<T>>) -> Self {
        Self::List(children)
    }
}

impl<T> From<Option<Content<T>>> for Content<T> {
    fn from(content: Option<Content<T>>) -> Self {
        content.unwrap_or(Self::Empty)
    }
}

/// How a container's children are given.
pub enum Children<T> {
    /// Statically authored content.
    Content(Content<T>),
    /// A render function applied to each value of an accompanying data
    /// collection.
    Render(Renderer<T>),
}

impl<T> Children<T> {
    /// Wraps a closure as render-function children.
    pub fn render<F, E>(render: F) -> Self
    where
        F: Fn(&T) -> E + Send + Sync + 'static,
        E: Into<Option<Element<T>>>,
    {
        Self::Render(renderer(render))
    }

    /// Returns the static content, if the children are not a render function.
    pub fn as_content(&self) -> Option<&Content<T>> {
        match self {
            Self::Content(content) => Some(content),
            Self::Render(_) => None,
        }
    }

    /// Returns the render function, if the children are one.
    pub fn as_renderer(&self) -> Option<&Renderer<T>> {
        match self {
            Self::Render(render) => Some(render),
            Self::Content(_) => None,
        }
    }
}

impl<T> Clone for Children<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Content(content) => Self::Content(content.clone()),
            Self::Render(render) => Self::Render(Arc::clone(render)),
        }
    }
}

impl<T> fmt::Debug for Children<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(content) => fmt::Debug::fmt(content, f),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl<T> From<Content<T>> for Children<T> {
    fn from(content: Content<T>) -> Self {
        Self::Content(content)
    }
}

impl<T> From<&str> for Children<T> {
    fn from(text: &str) -> Self {
        Self::Content(text.into())
    }
}

impl<T> From<String> for Children<T> {
    fn from(text: String) -> Self {
        Self::Content(text.into())
    }
}

impl<T> From<Element<T>> for Children<T> {
    fn from(element: Element<T>) -> Self {
        Self::Content(element.into())
    }
}

impl<T> From<Item<T>> for Children<T> {
    fn from(item: Item<T>) -> Self {
        Self::Content(item.into())
    }
}

impl<T> From<Section<T>> for Children<T> {
    fn from(section: Section<T>) -> Self {
        Self::Content(section.into())
    }
}

impl<T> From<View> for Children<T> {
    fn from(view: View) -> Self {
        Self::Content(view.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_filters_non_elements() {
        let content: Content<String> = Content::list([
            Content::from(Item::new("Valid")),
            Content::from("string child"),
            Content::Empty,
            Content::from(Item::new("Another")),
        ]);

        assert_eq!(content.structural().len(), 2);
        assert!(content.has_structural());
        assert!(!Content::<String>::from("text").has_structural());
    }

    #[test]
    fn test_structural_flattens_nested_lists() {
        let content: Content<String> = Content::list([
            Content::list([Item::new("A"), Item::new("B")]),
            Content::from(View::new("div")),
        ]);

        assert_eq!(content.structural().len(), 3);
    }

    #[test]
    fn test_element_keys() {
        let item: Element<String> = Item::new("A").with_key("a").into();
        let view: Element<String> = View::new("div").with_key(3).into();
        let fragment: Element<String> = Element::fragment([Item::new("B")]);

        assert_eq!(item.key(), Some(&Key::from("a")));
        assert_eq!(view.key(), Some(&Key::from(3)));
        assert_eq!(fragment.key(), None);
        assert!(item.is_descriptor());
        assert!(!view.is_descriptor());
        assert!(!fragment.is_descriptor());
    }

    #[test]
    fn test_non_descriptors_do_not_describe() {
        let context = BuildContext::new();
        let view: Element<String> = View::new("div").into();
        assert!(view.collection_node(&context).is_none());
    }

    #[test]
    fn test_renderer_accepts_items_and_options() {
        let direct: Renderer<String> = renderer(|name: &String| Item::new(name.as_str()));
        let optional: Renderer<String> = renderer(|name: &String| {
            if name.is_empty() {
                None
            } else {
                Some(Element::from(Item::new(name.as_str())))
            }
        });

        assert!(direct(&"Apple".to_string()).is_some());
        assert!(optional(&String::new()).is_none());
    }

    #[test]
    fn test_compose_wrappers_order() {
        let outer: WrapperFn<String> =
            Arc::new(|_element: Element<String>| Element::from(View::new("outer")));
        let inner: WrapperFn<String> =
            Arc::new(|_element: Element<String>| Element::from(View::new("inner")));

        let composed = compose_wrappers(Some(&outer), Some(&inner)).unwrap();
        match composed(View::new("leaf").into()) {
            Element::View(view) => assert_eq!(view.tag(), "outer"),
            other => panic!("unexpected element {other:?}"),
        }

        assert!(compose_wrappers::<String>(None, None).is_none());
        let single = compose_wrappers(None, Some(&inner)).unwrap();
        assert!(Arc::ptr_eq(&single, &inner));
    }
}
