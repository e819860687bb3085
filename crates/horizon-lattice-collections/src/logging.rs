//! Logging and debugging facilities for collections.
//!
//! The crate logs through `tracing`. Builds, cache hits, invalidations and
//! sweeps are reported at `trace`/`debug` level; the missing text value
//! diagnostic is a `warn` event on [`targets::ELEMENT`].
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_collections::cache=trace")
//!     .init();
//! ```
//!
//! [`CollectionTreeDebug`] renders a built collection as an indented tree:
//!
//! ```
//! use horizon_lattice_collections::logging::{CollectionTreeDebug, TreeFormatOptions};
//! use horizon_lattice_collections::{
//!     BuildContext, CollectionBuilder, CollectionProps, Content, Item, ListCollection, Section,
//! };
//!
//! let props = CollectionProps::<String>::new().with_children(Section::new()
//!     .with_key("fruits")
//!     .with_title("Fruits")
//!     .with_children(Content::list([Item::new("Apple").with_key("apple")])));
//! let mut builder = CollectionBuilder::new();
//! let collection = ListCollection::try_from_build(builder.build(&props, &BuildContext::new()))?;
//!
//! let tree = CollectionTreeDebug::with_options(TreeFormatOptions::minimal())
//!     .format_collection(&collection);
//! assert!(tree.contains("Apple"));
//! # Ok::<(), horizon_lattice_collections::CollectionError>(())
//! ```

use std::fmt::{self, Write as FmtWrite};

use crate::collection::Collection;
use crate::node::Node;
use crate::traversal::{get_child_nodes, top_level_nodes};

/// Target names for log filtering.
pub mod targets {
    /// Crate-wide target.
    pub const COLLECTIONS: &str = "horizon_lattice_collections";
    /// Build passes and node construction.
    pub const BUILDER: &str = "horizon_lattice_collections::builder";
    /// Node cache hits, invalidations and sweeps.
    pub const CACHE: &str = "horizon_lattice_collections::cache";
    /// Element descriptor diagnostics.
    pub const ELEMENT: &str = "horizon_lattice_collections::element";
    /// Collection construction and recomputation.
    pub const COLLECTION: &str = "horizon_lattice_collections::collection";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for collection tree output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Whether to show node keys.
    pub show_keys: bool,
    /// Whether to show node types.
    pub show_types: bool,
    /// Whether to show index, level and sibling links.
    pub show_links: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_keys: true,
            show_types: true,
            show_links: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_links: true,
            ..Default::default()
        }
    }

    /// Options for minimal output: text values only.
    pub fn minimal() -> Self {
        Self {
            show_keys: false,
            show_types: false,
            show_links: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing collections as trees.
#[derive(Debug, Clone, Default)]
pub struct CollectionTreeDebug {
    options: TreeFormatOptions,
}

impl CollectionTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Formats every top-level node of `collection` and its descendants.
    pub fn format_collection<T, C>(&self, collection: &C) -> String
    where
        C: Collection<T> + ?Sized,
    {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_collection(collection, &mut output);
        output
    }

    /// Writes the tree for `collection` into `out`.
    pub fn write_collection<T, C, W>(&self, collection: &C, out: &mut W) -> fmt::Result
    where
        C: Collection<T> + ?Sized,
        W: FmtWrite,
    {
        writeln!(out, "Collection ({} nodes):", collection.size())?;
        let roots: Vec<_> = top_level_nodes(collection).collect();
        if roots.is_empty() {
            return writeln!(out, "  (empty)");
        }
        let count = roots.len();
        for (i, root) in roots.into_iter().enumerate() {
            self.write_subtree(collection, root, 0, i + 1 == count, out)?;
        }
        Ok(())
    }

    fn write_subtree<T, C, W>(
        &self,
        collection: &C,
        node: &Node<T>,
        depth: usize,
        is_last: bool,
        out: &mut W,
    ) -> fmt::Result
    where
        C: Collection<T> + ?Sized,
        W: FmtWrite,
    {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        out.write_str(&self.build_prefix(depth, is_last))?;
        let text = node.text_value();
        out.write_str(if text.is_empty() { "(no text)" } else { text })?;

        if self.options.show_keys {
            write!(out, " [{}]", node.key())?;
        }
        if self.options.show_types {
            write!(out, " ({})", node.node_type())?;
        }
        if self.options.show_links {
            let links = node.links();
            write!(out, " index={} level={}", links.index, links.level)?;
            if let Some(prev) = &links.prev_key {
                write!(out, " prev={prev}")?;
            }
            if let Some(next) = &links.next_key {
                write!(out, " next={next}")?;
            }
        }
        out.write_char('\n')?;

        let children: Vec<_> = get_child_nodes(node, collection).collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.write_subtree(collection, child, depth + 1, i + 1 == count, out)?;
        }
        Ok(())
    }

    /// Builds the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}
