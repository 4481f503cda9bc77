use crate::eviction::eviction_candidates;
use crate::key::ViewKey;
use crate::{
    CacheLimit, Error, Placement, PlaceholderFactory, Pool, Result, ViewFactory, ViewInfo,
    ViewStore, Window,
};

/// Everything a strategy may touch during a render pass.
///
/// The pools and the container are only ever mutated through a context, so a strategy sees a
/// consistent view of both.
pub struct RenderContext<'a, T, K, F: ViewFactory<T>> {
    pub views: &'a mut ViewStore<T, K, F::Handle>,
    pub factory: &'a mut F,
    pub placeholder: Option<&'a mut (dyn PlaceholderFactory<T, F::Handle> + 'static)>,
    pub cache_limit: CacheLimit,
    /// The window being rendered by the current pass.
    pub window: Window,
    /// Length of the full item sequence.
    pub item_count: usize,
}

impl<T, K, F: ViewFactory<T>> core::fmt::Debug for RenderContext<'_, T, K, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderContext")
            .field("cache_limit", &self.cache_limit)
            .field("window", &self.window)
            .field("item_count", &self.item_count)
            .field("has_placeholder", &self.placeholder.is_some())
            .finish_non_exhaustive()
    }
}

/// Result of rendering one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedView {
    pub placement: Placement,
    /// A placeholder was attached; the real view is created by `complete_deferred`.
    pub deferred: bool,
}

/// What happened to a view that left the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unrendered {
    Cached,
    Destroyed,
    /// The key was not rendered.
    Missing,
}

/// Swappable create/move/reuse/cache/destroy policy.
///
/// [`DefaultStrategy`] is the stock implementation; an alternate one can be passed to
/// [`crate::VirtualScroll::with_strategy`].
pub trait ViewLifecycleStrategy<T, K, F: ViewFactory<T>> {
    /// Removes `key` from both pools and releases its view.
    fn destroy_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> bool;

    /// Moves a rendered view into the cache, detaching it from the container.
    fn cache_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> bool;

    /// Handles a view that is no longer part of the window.
    fn unrender_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> Unrendered;

    /// Places the view for `item` at the end of the container's render order.
    fn render_view_for_item(
        &mut self,
        cx: &mut RenderContext<'_, T, K, F>,
        key: K,
        item: &T,
        index: usize,
        defer: bool,
    ) -> Result<RenderedView>;

    /// Replaces the placeholder stored under `key` with a real view at the same position.
    ///
    /// Returns `false` when there was no placeholder to replace.
    fn complete_deferred(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> Result<bool>;

    /// Evicts cached views until the cache fits its limit. Returns the number evicted.
    fn purge_view_cache(&mut self, cx: &mut RenderContext<'_, T, K, F>) -> usize;
}

/// The stock lifecycle strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStrategy;

impl<T, K, F> ViewLifecycleStrategy<T, K, F> for DefaultStrategy
where
    T: Clone,
    K: ViewKey,
    F: ViewFactory<T>,
{
    fn destroy_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> bool {
        let cached = cx.views.delete(Pool::Cached, key);
        let rendered = cx.views.delete(Pool::Rendered, key);
        let mut destroyed = false;
        for view in cached.into_iter().chain(rendered) {
            vtrace!(index = view.item_index, "destroy_view");
            cx.factory.destroy(view.handle);
            destroyed = true;
        }
        destroyed
    }

    fn cache_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> bool {
        let Some(view) = cx.views.delete(Pool::Rendered, key) else {
            return false;
        };
        if view.placeholder {
            // Nothing worth reusing.
            cx.factory.destroy(view.handle);
            return false;
        }
        if cx.factory.index_of(&view.handle).is_some() {
            cx.factory.detach(&view.handle);
        }
        vtrace!(index = view.item_index, "cache_view");
        cx.views.set(Pool::Cached, view);
        true
    }

    fn unrender_view(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> Unrendered {
        if !cx.views.contains(Pool::Rendered, key) {
            return Unrendered::Missing;
        }
        if cx.cache_limit.is_enabled() && self.cache_view(cx, key) {
            return Unrendered::Cached;
        }
        if cx.views.contains(Pool::Rendered, key) {
            self.destroy_view(cx, key);
        }
        Unrendered::Destroyed
    }

    fn render_view_for_item(
        &mut self,
        cx: &mut RenderContext<'_, T, K, F>,
        key: K,
        item: &T,
        index: usize,
        defer: bool,
    ) -> Result<RenderedView> {
        if let Some(view) = cx.views.get_mut(Pool::Rendered, &key) {
            let last = cx.factory.len().saturating_sub(1);
            let in_place = match cx.factory.index_of(&view.handle) {
                Some(position) if position == last => true,
                Some(_) => {
                    cx.factory.move_to(&view.handle, last);
                    false
                }
                None => {
                    cx.factory.insert(&view.handle, None);
                    false
                }
            };
            view.item = item.clone();
            view.item_index = index;
            if !in_place && !view.placeholder {
                cx.factory.refresh(&view.handle, item, index);
            }
            vtrace!(index, in_place, "render_view_for_item: move");
            return Ok(RenderedView {
                placement: Placement::Move,
                deferred: false,
            });
        }

        if let Some(mut view) = cx.views.delete(Pool::Cached, &key) {
            cx.factory.insert(&view.handle, None);
            view.item = item.clone();
            view.item_index = index;
            cx.factory.refresh(&view.handle, item, index);
            vtrace!(index, "render_view_for_item: hit");
            cx.views.set(Pool::Rendered, view);
            return Ok(RenderedView {
                placement: Placement::Hit,
                deferred: false,
            });
        }

        let view = if defer {
            let placeholder = cx
                .placeholder
                .as_deref_mut()
                .ok_or(Error::MissingPlaceholderFactory)?;
            let handle = placeholder.create_placeholder(item, index);
            cx.factory.insert(&handle, None);
            ViewInfo::placeholder(key, item.clone(), index, handle)
        } else {
            let handle = cx.factory.create(item, index, None);
            cx.factory.refresh(&handle, item, index);
            ViewInfo::new(key, item.clone(), index, handle)
        };
        vtrace!(index, deferred = defer, "render_view_for_item: miss");
        if let Some(displaced) = cx.views.set(Pool::Rendered, view) {
            vwarn!(
                index = displaced.item_index,
                "render_view_for_item: duplicate key, releasing the older view"
            );
            cx.factory.destroy(displaced.handle);
        }
        Ok(RenderedView {
            placement: Placement::Miss,
            deferred: defer,
        })
    }

    fn complete_deferred(&mut self, cx: &mut RenderContext<'_, T, K, F>, key: &K) -> Result<bool> {
        if !cx.views.contains(Pool::Rendered, key) {
            // The placeholder left the window before its turn came; drop it.
            if cx.views.get(Pool::Cached, key).is_some_and(|v| v.placeholder) {
                self.destroy_view(cx, key);
            }
            return Ok(false);
        }
        let Some(view) = cx.views.get_mut(Pool::Rendered, key) else {
            return Ok(false);
        };
        if !view.placeholder {
            return Ok(false);
        }

        let position = cx.factory.index_of(&view.handle);
        let handle = cx.factory.create(&view.item, view.item_index, position);
        let placeholder = core::mem::replace(&mut view.handle, handle);
        view.placeholder = false;
        cx.factory.destroy(placeholder);
        cx.factory.refresh(&view.handle, &view.item, view.item_index);
        vtrace!(index = view.item_index, ?position, "complete_deferred");
        Ok(true)
    }

    fn purge_view_cache(&mut self, cx: &mut RenderContext<'_, T, K, F>) -> usize {
        let candidates = eviction_candidates(
            cx.views.cached(),
            cx.window,
            cx.window.len(),
            cx.item_count,
            cx.cache_limit,
        );
        let mut evicted = 0;
        for key in &candidates {
            if self.destroy_view(cx, key) {
                evicted += 1;
            }
        }
        if evicted > 0 {
            vdebug!(evicted, cached = cx.views.len(Pool::Cached), "purge_view_cache");
        }
        evicted
    }
}
