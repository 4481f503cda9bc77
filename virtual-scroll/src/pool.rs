use indexmap::IndexMap;
use indexmap::map::{Iter, Values};

use crate::key::ViewKey;

/// A materialized view and the item it is bound to.
///
/// Owned by exactly one [`ViewPool`] at a time. Moving a view between pools moves this value;
/// the handle is released exactly once, by the strategy that destroys it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewInfo<T, K, H> {
    pub key: K,
    pub item: T,
    /// Global index of `item` at the time the view was last rendered.
    pub item_index: usize,
    pub handle: H,
    /// `true` while this is a stand-in waiting for its real view to be created.
    pub placeholder: bool,
}

impl<T, K, H> ViewInfo<T, K, H> {
    pub fn new(key: K, item: T, item_index: usize, handle: H) -> Self {
        Self {
            key,
            item,
            item_index,
            handle,
            placeholder: false,
        }
    }

    pub fn placeholder(key: K, item: T, item_index: usize, handle: H) -> Self {
        Self {
            key,
            item,
            item_index,
            handle,
            placeholder: true,
        }
    }
}

/// Selects one of the two pools of a [`ViewStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pool {
    /// Views attached to the live container.
    Rendered,
    /// Views detached from the container but kept for reuse.
    Cached,
}

impl Pool {
    pub fn other(self) -> Self {
        match self {
            Self::Rendered => Self::Cached,
            Self::Cached => Self::Rendered,
        }
    }
}

/// Key → view mapping that remembers insertion order.
#[derive(Clone, Debug)]
pub struct ViewPool<T, K, H> {
    views: IndexMap<K, ViewInfo<T, K, H>>,
}

impl<T, K, H> Default for ViewPool<T, K, H> {
    fn default() -> Self {
        Self {
            views: IndexMap::new(),
        }
    }
}

impl<T, K: ViewKey, H> ViewPool<T, K, H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.views.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&ViewInfo<T, K, H>> {
        self.views.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut ViewInfo<T, K, H>> {
        self.views.get_mut(key)
    }

    /// Entry at `position` in insertion order.
    pub fn get_index(&self, position: usize) -> Option<&ViewInfo<T, K, H>> {
        self.views.get_index(position).map(|(_, v)| v)
    }

    /// Inserts (or replaces) the entry for `view.key`, returning the displaced view.
    ///
    /// A replaced key keeps its original insertion position.
    pub fn insert(&mut self, view: ViewInfo<T, K, H>) -> Option<ViewInfo<T, K, H>> {
        self.views.insert(view.key.clone(), view)
    }

    /// Removes an entry while preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &K) -> Option<ViewInfo<T, K, H>> {
        self.views.shift_remove(key)
    }

    pub fn iter(&self) -> Iter<'_, K, ViewInfo<T, K, H>> {
        self.views.iter()
    }

    pub fn values(&self) -> Values<'_, K, ViewInfo<T, K, H>> {
        self.views.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.views.keys()
    }

    /// Reorders entries by their global item index, i.e. by container order after a pass.
    pub fn sort_by_item_index(&mut self) {
        self.views.sort_by(|_, a, _, b| a.item_index.cmp(&b.item_index));
    }
}

impl<T, K, H> ViewPool<T, K, H> {
    /// Removes every entry, yielding them in insertion order.
    pub fn drain(&mut self) -> impl Iterator<Item = ViewInfo<T, K, H>> + '_ {
        self.views.drain(..).map(|(_, v)| v)
    }
}

/// The rendered and cached pools of one engine instance.
///
/// A key lives in at most one pool. Callers must [`ViewStore::delete`] from one pool before
/// calling [`ViewStore::set`] on the other; violating this is a bug in the strategy and is
/// debug-asserted.
#[derive(Clone, Debug)]
pub struct ViewStore<T, K, H> {
    rendered: ViewPool<T, K, H>,
    cached: ViewPool<T, K, H>,
}

impl<T, K, H> Default for ViewStore<T, K, H> {
    fn default() -> Self {
        Self {
            rendered: ViewPool::default(),
            cached: ViewPool::default(),
        }
    }
}

impl<T, K: ViewKey, H> ViewStore<T, K, H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self, pool: Pool) -> &ViewPool<T, K, H> {
        match pool {
            Pool::Rendered => &self.rendered,
            Pool::Cached => &self.cached,
        }
    }

    fn pool_mut(&mut self, pool: Pool) -> &mut ViewPool<T, K, H> {
        match pool {
            Pool::Rendered => &mut self.rendered,
            Pool::Cached => &mut self.cached,
        }
    }

    pub fn rendered(&self) -> &ViewPool<T, K, H> {
        &self.rendered
    }

    pub fn cached(&self) -> &ViewPool<T, K, H> {
        &self.cached
    }

    pub fn get(&self, pool: Pool, key: &K) -> Option<&ViewInfo<T, K, H>> {
        self.pool(pool).get(key)
    }

    pub fn get_mut(&mut self, pool: Pool, key: &K) -> Option<&mut ViewInfo<T, K, H>> {
        self.pool_mut(pool).get_mut(key)
    }

    pub fn contains(&self, pool: Pool, key: &K) -> bool {
        self.pool(pool).contains(key)
    }

    /// Removes `key` from `pool`, handing ownership of the view back to the caller.
    pub fn delete(&mut self, pool: Pool, key: &K) -> Option<ViewInfo<T, K, H>> {
        self.pool_mut(pool).remove(key)
    }

    /// Stores `view` in `pool`. Returns the view previously stored under the same key in that
    /// pool, if any (last write wins).
    pub fn set(&mut self, pool: Pool, view: ViewInfo<T, K, H>) -> Option<ViewInfo<T, K, H>> {
        if self.pool(pool.other()).contains(&view.key) {
            vwarn!(
                index = view.item_index,
                "ViewStore::set: key is already held by the other pool"
            );
            debug_assert!(
                false,
                "ViewStore::set: key inserted into {pool:?} while held by {:?}",
                pool.other()
            );
        }
        self.pool_mut(pool).insert(view)
    }

    pub fn len(&self, pool: Pool) -> usize {
        self.pool(pool).len()
    }

    /// Total number of views owned by the store.
    pub fn total(&self) -> usize {
        self.rendered.len() + self.cached.len()
    }

    pub(crate) fn sort_rendered(&mut self) {
        self.rendered.sort_by_item_index();
    }
}

impl<T, K, H> ViewStore<T, K, H> {
    /// Empties both pools, rendered views first.
    pub fn drain_all(&mut self) -> Vec<ViewInfo<T, K, H>> {
        let mut out = Vec::with_capacity(self.rendered.views.len() + self.cached.views.len());
        out.extend(self.rendered.drain());
        out.extend(self.cached.drain());
        out
    }
}
