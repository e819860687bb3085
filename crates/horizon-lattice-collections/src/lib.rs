//! Collection building for Horizon Lattice.
//!
//! List boxes, menus, tree views and tables all present an ordered, keyed set
//! of nodes. This crate turns declarative content into that set:
//!
//! - **Elements**: [`Item`] and [`Section`] descriptors, authored statically or
//!   produced by a render function over a data collection
//! - **Builder**: [`CollectionBuilder`] expands elements into a flattened,
//!   keyed, linked sequence of [`Node`]s, reusing nodes across builds
//! - **Collections**: the [`Collection`] trait widgets query, with
//!   [`ListCollection`] as the standard implementation
//! - **Traversal**: child lookup, first/last/nth helpers, document-order
//!   comparison and item counting
//! - **State**: [`CollectionState`] memoizes a collection until its inputs
//!   change
//!
//! # Static Content
//!
//! ```
//! use horizon_lattice_collections::{
//!     BuildContext, Collection, CollectionBuilder, CollectionProps, Content, Item,
//!     ListCollection, Section,
//! };
//!
//! let props = CollectionProps::<String>::new().with_children(Content::list([
//!     Content::from(Section::new().with_key("fruits").with_title("Fruits").with_children(
//!         Content::list([Item::new("Apple").with_key("apple"), Item::new("Banana").with_key("banana")]),
//!     )),
//!     Content::from(Item::new("Bread").with_key("bread")),
//! ]));
//!
//! let mut builder = CollectionBuilder::new();
//! let collection = ListCollection::try_from_build(builder.build(&props, &BuildContext::new()))?;
//!
//! let keys: Vec<String> = collection.keys().map(ToString::to_string).collect();
//! assert_eq!(keys, ["fruits", "apple", "banana", "bread"]);
//! # Ok::<(), horizon_lattice_collections::CollectionError>(())
//! ```
//!
//! # Dynamic Content
//!
//! ```
//! use std::sync::Arc;
//! use horizon_lattice_collections::{
//!     BuildContext, Collection, CollectionBuilder, CollectionProps, Item, ListCollection,
//! };
//!
//! let items: Vec<Arc<String>> = vec![Arc::new("Cat".into()), Arc::new("Dog".into())];
//! let props = CollectionProps::new()
//!     .with_items(items)
//!     .with_renderer(|animal: &String| Item::new(animal.as_str()).with_key(animal.as_str()));
//!
//! let mut builder = CollectionBuilder::new();
//! let first: Vec<_> = builder.build(&props, &BuildContext::new()).collect::<Result<_, _>>()?;
//! let second: Vec<_> = builder.build(&props, &BuildContext::new()).collect::<Result<_, _>>()?;
//!
//! // Same values, same nodes.
//! assert!(Arc::ptr_eq(&first[0], &second[0]));
//! assert_eq!(ListCollection::new(second).text_value(&"Dog".into()), Some("Dog"));
//! # Ok::<(), horizon_lattice_collections::CollectionError>(())
//! ```

pub mod builder;
mod cache;
pub mod collection;
mod context;
pub mod element;
mod error;
mod key;
pub mod logging;
pub mod node;
mod partial;
mod state;
pub mod traversal;

pub use builder::{Build, CollectionBuilder, CollectionProps, KeyFn};
pub use collection::{Collection, ListCollection, NodeIter};
pub use context::{BuildContext, ENV_VAR};
pub use element::{
    compose_wrappers, renderer, Children, Content, Element, InvalidateFn, Item, Renderer, Section,
    View, WrapperFn, TEXT_VALUE_WARNING,
};
pub use error::{CollectionError, Result};
pub use key::Key;
pub use logging::{CollectionTreeDebug, TreeFormatOptions, TreeStyle};
pub use node::{ItemValue, Node, NodeLinks, NodeType};
pub use partial::{ChildNodes, ChildSource, PartialNode};
pub use state::{CollectionFactory, CollectionState};
pub use traversal::{
    compare_node_order, get_child_nodes, get_first_item, get_item_count, get_last_item,
    get_nth_item, top_level_nodes,
};

// Built collections are shared across threads.
static_assertions::assert_impl_all!(Node<String>: Send, Sync);
static_assertions::assert_impl_all!(ListCollection<String>: Send, Sync);
static_assertions::assert_impl_all!(CollectionBuilder<String>: Send, Sync);
static_assertions::assert_impl_all!(CollectionState<String, ListCollection<String>>: Send, Sync);
