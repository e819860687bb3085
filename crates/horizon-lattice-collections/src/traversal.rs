//! Traversal helpers shared by every widget built on collections.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::collection::{Collection, NodeIter};
use crate::key::Key;
use crate::node::{Node, NodeType};

/// Direct children of `node`.
///
/// Uses the collection's child lookup when it has one, else the node's own
/// children.
pub fn get_child_nodes<'a, T, C>(node: &'a Node<T>, collection: &'a C) -> NodeIter<'a, T>
where
    C: Collection<T> + ?Sized,
{
    match collection.children(node.key()) {
        Some(children) => children,
        None => Box::new(node.child_nodes()),
    }
}

/// First element of a sequence.
pub fn get_first_item<I: IntoIterator>(iterable: I) -> Option<I::Item> {
    iterable.into_iter().next()
}

/// Last element of a sequence. Consumes the whole sequence.
pub fn get_last_item<I: IntoIterator>(iterable: I) -> Option<I::Item> {
    iterable.into_iter().last()
}

/// Element at `index`, or `None` for negative or out-of-range indices.
pub fn get_nth_item<I: IntoIterator>(iterable: I, index: isize) -> Option<I::Item> {
    let index = usize::try_from(index).ok()?;
    iterable.into_iter().nth(index)
}

/// Compares two nodes of `collection` in document order.
///
/// Siblings compare by index. Otherwise both ancestor chains are walked from
/// the root and the first diverging ancestors are compared. An ancestor sorts
/// before its descendants.
pub fn compare_node_order<T, C>(collection: &C, a: &Node<T>, b: &Node<T>) -> Ordering
where
    C: Collection<T> + ?Sized,
{
    if a.parent_key() == b.parent_key() {
        return a.index().cmp(&b.index());
    }

    let a_chain = lineage(collection, a);
    let b_chain = lineage(collection, b);

    let diverging = a_chain
        .iter()
        .zip(&b_chain)
        .find(|(x, y)| x.key != y.key);
    if let Some((x, y)) = diverging {
        return x.index.cmp(&y.index);
    }

    // One chain is a prefix of the other.
    if a_chain.iter().any(|step| &step.key == b.key()) {
        Ordering::Greater
    } else if b_chain.iter().any(|step| &step.key == a.key()) {
        Ordering::Less
    } else {
        a_chain.len().cmp(&b_chain.len())
    }
}

struct Step {
    key: Key,
    index: usize,
}

/// The node's ancestors from the top level down, followed by the node itself.
fn lineage<T, C>(collection: &C, node: &Node<T>) -> Vec<Step>
where
    C: Collection<T> + ?Sized,
{
    let mut chain = vec![Step {
        key: node.key().clone(),
        index: node.index(),
    }];
    let mut parent_key = node.parent_key();
    while let Some(key) = parent_key {
        let Some(parent) = collection.item(&key) else {
            break;
        };
        chain.push(Step {
            key: parent.key().clone(),
            index: parent.index(),
        });
        parent_key = parent.parent_key();
    }
    chain.reverse();
    chain
}

/// Number of item nodes in `collection`, excluding sections.
///
/// The count is memoized in the collection's memo cell when it provides one.
pub fn get_item_count<T, C>(collection: &C) -> usize
where
    C: Collection<T> + ?Sized,
{
    let count = || {
        collection
            .iter()
            .filter(|node| node.node_type() == NodeType::Item)
            .count()
    };
    match collection.item_count_memo() {
        Some(memo) => *memo.get_or_init(count),
        None => count(),
    }
}

/// Iterates the top-level nodes of `collection`.
pub fn top_level_nodes<'a, T: 'a, C>(collection: &'a C) -> impl Iterator<Item = &'a Arc<Node<T>>>
where
    C: Collection<T> + ?Sized,
{
    collection
        .iter()
        .filter(|node| node.parent_key().is_none())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::OnceLock;

    use super::*;
    use crate::collection::ListCollection;
    use crate::node::{NodeLinks, NodeParts};

    fn node(key: &str, node_type: NodeType, parent: Option<&str>, index: usize) -> Arc<Node<String>> {
        Arc::new(Node::new(NodeParts {
            node_type,
            key: Key::from(key),
            value: None,
            rendered: None,
            text_value: format!("{node_type} {key}"),
            aria_label: None,
            has_child_nodes: node_type == NodeType::Section,
            children: Vec::new(),
            props: None,
            wrapper: None,
            should_invalidate: None,
            links: NodeLinks {
                parent_key: parent.map(Key::from),
                index,
                level: usize::from(parent.is_some()),
                ..NodeLinks::default()
            },
        }))
    }

    fn item(key: &str, parent: Option<&str>, index: usize) -> Arc<Node<String>> {
        node(key, NodeType::Item, parent, index)
    }

    /// A collection without a child lookup or memo cell.
    struct Plain {
        nodes: Vec<Arc<Node<String>>>,
        scans: AtomicUsize,
    }

    impl Collection<String> for Plain {
        fn size(&self) -> usize {
            self.nodes.len()
        }

        fn keys(&self) -> Box<dyn Iterator<Item = &Key> + '_> {
            Box::new(self.nodes.iter().map(|n| n.key()))
        }

        fn iter(&self) -> NodeIter<'_, String> {
            self.scans.fetch_add(1, AtomicOrdering::SeqCst);
            Box::new(self.nodes.iter())
        }

        fn item(&self, key: &Key) -> Option<&Arc<Node<String>>> {
            self.nodes.iter().find(|n| n.key() == key)
        }

        fn at(&self, index: usize) -> Option<&Arc<Node<String>>> {
            self.nodes.get(index)
        }

        fn key_before(&self, _key: &Key) -> Option<&Key> {
            None
        }

        fn key_after(&self, _key: &Key) -> Option<&Key> {
            None
        }

        fn first_key(&self) -> Option<&Key> {
            self.nodes.first().map(|n| n.key())
        }

        fn last_key(&self) -> Option<&Key> {
            self.nodes.last().map(|n| n.key())
        }
    }

    fn plain(nodes: Vec<Arc<Node<String>>>) -> Plain {
        Plain {
            nodes,
            scans: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_first_last_nth() {
        let items = ["a", "b", "c"];
        assert_eq!(get_first_item(items), Some("a"));
        assert_eq!(get_last_item(items), Some("c"));
        assert_eq!(get_nth_item(items, 0), Some("a"));
        assert_eq!(get_nth_item(items, 1), Some("b"));
        assert_eq!(get_nth_item(items, 2), Some("c"));
        assert_eq!(get_nth_item(items, 5), None);
        assert_eq!(get_nth_item(items, -1), None);
    }

    #[test]
    fn test_empty_sequences() {
        let empty: [&str; 0] = [];
        assert_eq!(get_first_item(empty), None);
        assert_eq!(get_last_item(empty), None);
        assert_eq!(get_nth_item(empty, 0), None);
    }

    #[test]
    fn test_lazy_sequences() {
        let words = || ["zero", "one", "two"].into_iter().map(str::to_uppercase);
        assert_eq!(get_first_item(words()).as_deref(), Some("ZERO"));
        assert_eq!(get_nth_item(words(), 1).as_deref(), Some("ONE"));
        assert_eq!(get_last_item(words()).as_deref(), Some("TWO"));
    }

    #[test]
    fn test_first_item_is_lazy() {
        let pulled = AtomicUsize::new(0);
        let sequence = (0..100).inspect(|_| {
            pulled.fetch_add(1, AtomicOrdering::SeqCst);
        });
        assert_eq!(get_first_item(sequence), Some(0));
        assert_eq!(pulled.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_child_nodes_from_collection_lookup() {
        let child = item("child", Some("parent"), 0);
        let parent = Arc::new(Node::new(NodeParts {
            node_type: NodeType::Section,
            key: Key::from("parent"),
            value: None,
            rendered: None,
            text_value: String::new(),
            aria_label: None,
            has_child_nodes: true,
            children: vec![Arc::clone(&child)],
            props: None,
            wrapper: None,
            should_invalidate: None,
            links: NodeLinks::default(),
        }));
        let collection = ListCollection::new([Arc::clone(&parent), Arc::clone(&child)]);

        let children: Vec<_> = get_child_nodes(&parent, &collection).collect();
        assert_eq!(children.len(), 1);
        assert!(Arc::ptr_eq(children[0], &child));
    }

    #[test]
    fn test_child_nodes_fallback() {
        let first = item("child1", Some("parent"), 0);
        let second = item("child2", Some("parent"), 1);
        let parent = Node::new(NodeParts {
            node_type: NodeType::Section,
            key: Key::from("parent"),
            value: None,
            rendered: None,
            text_value: String::new(),
            aria_label: None,
            has_child_nodes: true,
            children: vec![Arc::clone(&first), Arc::clone(&second)],
            props: None,
            wrapper: None,
            should_invalidate: None,
            links: NodeLinks::default(),
        });
        let collection = plain(Vec::new());

        let keys: Vec<_> = get_child_nodes(&parent, &collection)
            .map(|n| n.key().to_string())
            .collect();
        assert_eq!(keys, ["child1", "child2"]);
    }

    #[test]
    fn test_child_nodes_of_leaf() {
        let leaf = item("parent", None, 0);
        let collection = ListCollection::new([Arc::clone(&leaf)]);
        assert_eq!(get_child_nodes(&leaf, &collection).count(), 0);
    }

    #[test]
    fn test_compare_siblings() {
        let a = item("a", Some("parent"), 0);
        let b = item("b", Some("parent"), 1);
        let collection = plain(vec![Arc::clone(&a), Arc::clone(&b)]);

        assert_eq!(compare_node_order(&collection, &a, &b), Ordering::Less);
        assert_eq!(compare_node_order(&collection, &b, &a), Ordering::Greater);
        assert_eq!(compare_node_order(&collection, &a, &a), Ordering::Equal);
    }

    #[test]
    fn test_compare_equal_index_siblings() {
        let a = item("a", Some("parent"), 0);
        let b = item("b", Some("parent"), 0);
        let collection = plain(vec![Arc::clone(&a), Arc::clone(&b)]);
        assert_eq!(compare_node_order(&collection, &a, &b), Ordering::Equal);
    }

    #[test]
    fn test_compare_across_parents() {
        let parent1 = node("parent1", NodeType::Section, None, 0);
        let parent2 = node("parent2", NodeType::Section, None, 1);
        let a = item("a", Some("parent1"), 0);
        let b = item("b", Some("parent2"), 0);
        let collection = plain(vec![
            Arc::clone(&parent1),
            Arc::clone(&parent2),
            Arc::clone(&a),
            Arc::clone(&b),
        ]);

        assert_eq!(compare_node_order(&collection, &a, &b), Ordering::Less);
        assert_eq!(compare_node_order(&collection, &b, &a), Ordering::Greater);
        assert_eq!(compare_node_order(&collection, &b, &parent1), Ordering::Greater);
    }

    #[test]
    fn test_compare_ancestor_first() {
        let parent = node("parent", NodeType::Section, None, 3);
        let child = item("child", Some("parent"), 0);
        let collection = plain(vec![Arc::clone(&parent), Arc::clone(&child)]);

        assert_eq!(compare_node_order(&collection, &parent, &child), Ordering::Less);
        assert_eq!(compare_node_order(&collection, &child, &parent), Ordering::Greater);
    }

    #[test]
    fn test_item_count_excludes_sections() {
        let collection = plain(vec![
            item("item1", None, 0),
            item("item2", None, 1),
            node("section1", NodeType::Section, None, 2),
        ]);
        assert_eq!(get_item_count(&collection), 2);

        let sections = plain(vec![
            node("section1", NodeType::Section, None, 0),
            node("section2", NodeType::Section, None, 1),
        ]);
        assert_eq!(get_item_count(&sections), 0);
        assert_eq!(get_item_count(&plain(Vec::new())), 0);
    }

    #[test]
    fn test_item_count_memoized_per_collection() {
        let collection = ListCollection::new([item("a", None, 0), item("b", None, 1)]);
        assert_eq!(get_item_count(&collection), 2);
        assert_eq!(collection.item_count_memo().and_then(OnceLock::get), Some(&2));
        assert_eq!(get_item_count(&collection), 2);

        // Without a memo cell every call scans.
        let unmemoized = plain(vec![item("a", None, 0)]);
        get_item_count(&unmemoized);
        get_item_count(&unmemoized);
        assert_eq!(unmemoized.scans.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn test_top_level_nodes() {
        let collection = ListCollection::new([
            node("s", NodeType::Section, None, 0),
            item("a", Some("s"), 0),
            item("b", None, 1),
        ]);
        let keys: Vec<_> = top_level_nodes(&collection).map(|n| n.key().to_string()).collect();
        assert_eq!(keys, ["s", "b"]);
    }
}
