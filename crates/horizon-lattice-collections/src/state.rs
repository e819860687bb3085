//! Memoized collection state for widgets.
//!
//! [`CollectionState`] pairs one [`CollectionBuilder`] with the inputs of a
//! widget and recomputes the collection only when those inputs change.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::builder::{CollectionBuilder, CollectionProps};
use crate::context::BuildContext;
use crate::error::Result;
use crate::logging::targets;
use crate::node::{ItemValue, Node};

/// Wraps a built node sequence into a concrete collection.
pub type CollectionFactory<T, C> = Box<dyn Fn(Vec<Arc<Node<T>>>) -> C + Send + Sync>;

/// A lazily rebuilt collection.
///
/// The collection is computed on the first [`collection`](Self::collection)
/// call and cached until the props or context change, or
/// [`invalidate`](Self::invalidate) is called. A prebuilt collection set with
/// [`set_collection`](Self::set_collection) bypasses building entirely.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_lattice_collections::{
///     Collection, CollectionProps, CollectionState, Item, ListCollection,
/// };
///
/// let props = CollectionProps::new()
///     .with_items(vec![Arc::new("Apple".to_string())])
///     .with_renderer(|name: &String| Item::new(name.as_str()).with_key(name.as_str()));
/// let state = CollectionState::new(props, ListCollection::new);
///
/// let first = state.collection()?;
/// let second = state.collection()?;
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(first.size(), 1);
/// # Ok::<(), horizon_lattice_collections::CollectionError>(())
/// ```
pub struct CollectionState<T, C> {
    factory: CollectionFactory<T, C>,
    builder: Mutex<CollectionBuilder<T>>,
    props: RwLock<CollectionProps<T>>,
    context: RwLock<BuildContext>,
    prebuilt: RwLock<Option<Arc<C>>>,
    cached: RwLock<Option<Arc<C>>>,
    dirty: AtomicBool,
}

impl<T: ItemValue, C: Send + Sync + 'static> CollectionState<T, C> {
    /// Creates a state over `props`, wrapping builds with `factory`.
    pub fn new<F>(props: CollectionProps<T>, factory: F) -> Self
    where
        F: Fn(Vec<Arc<Node<T>>>) -> C + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            builder: Mutex::new(CollectionBuilder::new()),
            props: RwLock::new(props),
            context: RwLock::new(BuildContext::new()),
            prebuilt: RwLock::new(None),
            cached: RwLock::new(None),
            dirty: AtomicBool::new(true),
        }
    }

    /// Sets the initial build context.
    pub fn with_context(self, context: BuildContext) -> Self {
        *self.context.write() = context;
        self
    }

    /// Returns the current collection, rebuilding it if needed.
    ///
    /// A failed build leaves the state dirty, so the next call retries.
    pub fn collection(&self) -> Result<Arc<C>> {
        if let Some(prebuilt) = self.prebuilt.read().as_ref() {
            return Ok(Arc::clone(prebuilt));
        }

        if !self.dirty.load(Ordering::Acquire) {
            if let Some(cached) = self.cached.read().as_ref() {
                return Ok(Arc::clone(cached));
            }
        }

        let props = self.props.read();
        let context = self.context.read();
        let mut builder = self.builder.lock();
        let nodes = builder
            .build(&props, &context)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(target: targets::COLLECTION, nodes = nodes.len(), "recomputed collection");

        let collection = Arc::new((self.factory)(nodes));
        *self.cached.write() = Some(Arc::clone(&collection));
        self.dirty.store(false, Ordering::Release);
        Ok(collection)
    }

    /// Replaces the props and marks the collection for rebuild.
    pub fn set_props(&self, props: CollectionProps<T>) {
        *self.props.write() = props;
        self.invalidate();
    }

    /// Replaces the build context and marks the collection for rebuild.
    pub fn set_context(&self, context: BuildContext) {
        *self.context.write() = context;
        self.invalidate();
    }

    /// Sets or clears a prebuilt collection that overrides building.
    pub fn set_collection(&self, collection: Option<Arc<C>>) {
        *self.prebuilt.write() = collection;
    }

    /// Marks the collection for rebuild on next access.
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Number of nodes cached by this state's builder.
    pub fn cached_nodes(&self) -> usize {
        self.builder.lock().cached_len()
    }
}

impl<T, C> fmt::Debug for CollectionState<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionState")
            .field("dirty", &self.dirty.load(Ordering::Relaxed))
            .field("has_prebuilt", &self.prebuilt.read().is_some())
            .field("has_cached", &self.cached.read().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::collection::{Collection, ListCollection};
    use crate::element::Item;
    use crate::error::CollectionError;

    fn fruit_props(names: &[&str]) -> CollectionProps<String> {
        let items: Vec<Arc<String>> = names.iter().map(|n| Arc::new(n.to_string())).collect();
        CollectionProps::new()
            .with_items(items)
            .with_renderer(|name: &String| Item::new(name.as_str()).with_key(name.as_str()))
    }

    fn counting_state(
        props: CollectionProps<String>,
    ) -> (CollectionState<String, ListCollection<String>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let state = CollectionState::new(props, move |nodes| {
            counter.fetch_add(1, Ordering::SeqCst);
            ListCollection::new(nodes)
        });
        (state, calls)
    }

    #[test]
    fn test_memoizes_until_inputs_change() {
        let (state, calls) = counting_state(fruit_props(&["Apple", "Banana"]));
        assert!(state.is_dirty());

        let first = state.collection().unwrap();
        let second = state.collection().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!state.is_dirty());

        state.set_props(fruit_props(&["Cherry"]));
        let third = state.collection().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.size(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_rebuilds_with_cached_nodes() {
        let (state, calls) = counting_state(fruit_props(&["Apple"]));
        let first = state.collection().unwrap();

        state.invalidate();
        let second = state.collection().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        // Same values, so the builder hands back the same node.
        assert!(Arc::ptr_eq(first.at(0).unwrap(), second.at(0).unwrap()));
    }

    #[test]
    fn test_prebuilt_collection_bypasses_factory() {
        let (state, calls) = counting_state(fruit_props(&["Apple"]));
        let prebuilt = Arc::new(ListCollection::new(Vec::new()));
        state.set_collection(Some(Arc::clone(&prebuilt)));

        let collection = state.collection().unwrap();
        assert!(Arc::ptr_eq(&collection, &prebuilt));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        state.set_collection(None);
        assert_eq!(state.collection().unwrap().size(), 1);
    }

    #[test]
    fn test_failed_build_stays_dirty() {
        let props = CollectionProps::<String>::new().with_renderer(|v: &String| Item::new(v.as_str()));
        let (state, calls) = counting_state(props);

        assert_eq!(
            state.collection().unwrap_err(),
            CollectionError::missing_items("props")
        );
        assert!(state.is_dirty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_states_do_not_share_caches() {
        let props = fruit_props(&["Apple"]);
        let (a, _) = counting_state(props.clone());
        let (b, _) = counting_state(props);

        let from_a = a.collection().unwrap();
        let from_b = b.collection().unwrap();
        assert!(!Arc::ptr_eq(from_a.at(0).unwrap(), from_b.at(0).unwrap()));
        assert_eq!(a.cached_nodes(), 1);
    }
}
