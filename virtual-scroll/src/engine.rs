use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::geometry::{compute_window, items_per_row};
use crate::key::ViewKey;
use crate::strategy::{RenderContext, Unrendered};
use crate::{
    DefaultStrategy, Error, FrameState, ItemSize, PlaceholderFactory, RenderStats, Result,
    ScrollPosition, ScrollState, ViewFactory, ViewLifecycleStrategy, ViewStore, ViewportSize,
    VirtualScrollOptions, Window, WindowGeometry, WindowState,
};

/// Result of [`VirtualScroll::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A render pass is still settling; nothing was computed.
    Busy,
    /// The item size is unknown; a reference view has to be measured first.
    NotReady,
    /// The window did not change. Spacer sizes were refreshed.
    Unchanged,
    /// A render pass ran for a new window.
    Rendered(RenderStats),
}

/// The windowing and view-recycling engine.
///
/// The engine owns the item sequence, both view pools and the host's [`ViewFactory`]. Your
/// adapter feeds it scroll position and viewport size and calls [`VirtualScroll::update`];
/// the engine works out which views to create, move, cache or destroy.
///
/// Deferred creations (with `async_rendering`) are completed by
/// [`VirtualScroll::flush_deferred`], which the adapter calls one task-queue turn later. Until
/// then [`VirtualScroll::rendering_in_progress`] stays `true` and `update` reports
/// [`UpdateOutcome::Busy`].
///
/// For throttled scroll handling and measurement scheduling, see the `virtual-scroll-adapter`
/// crate.
pub struct VirtualScroll<T, F: ViewFactory<T>, K = T, S = DefaultStrategy> {
    options: VirtualScrollOptions<T, K>,
    items: Vec<T>,
    views: ViewStore<T, K, F::Handle>,
    factory: Option<F>,
    placeholder: Option<Box<dyn PlaceholderFactory<T, F::Handle>>>,
    strategy: S,

    scroll_position: ScrollPosition,
    viewport: ViewportSize,
    measured_size: Option<ItemSize>,
    geometry: WindowGeometry,

    deferred: VecDeque<K>,
    rendering: bool,
    passes: u64,
    last_stats: RenderStats,
}

impl<T, F, K> VirtualScroll<T, F, K, DefaultStrategy>
where
    T: Clone,
    F: ViewFactory<T>,
    K: ViewKey,
{
    /// Creates an engine without a view factory. Attach one with
    /// [`VirtualScroll::attach_factory`] before the first render pass.
    pub fn new(options: VirtualScrollOptions<T, K>) -> Self {
        Self::with_strategy(options, DefaultStrategy)
    }

    pub fn with_factory(options: VirtualScrollOptions<T, K>, factory: F) -> Self {
        let mut v = Self::new(options);
        v.factory = Some(factory);
        v
    }
}

impl<T, F, K, S> VirtualScroll<T, F, K, S>
where
    T: Clone,
    F: ViewFactory<T>,
    K: ViewKey,
    S: ViewLifecycleStrategy<T, K, F>,
{
    /// Creates an engine with a custom lifecycle strategy.
    pub fn with_strategy(options: VirtualScrollOptions<T, K>, strategy: S) -> Self {
        vdebug!(
            cache = ?options.view_cache_limit,
            grid = options.grid_list,
            async_rendering = options.async_rendering,
            "VirtualScroll::new"
        );
        Self {
            options,
            items: Vec::new(),
            views: ViewStore::new(),
            factory: None,
            placeholder: None,
            strategy,
            scroll_position: ScrollPosition::default(),
            viewport: ViewportSize::default(),
            measured_size: None,
            geometry: WindowGeometry::default(),
            deferred: VecDeque::new(),
            rendering: false,
            passes: 0,
            last_stats: RenderStats::default(),
        }
    }

    pub fn options(&self) -> &VirtualScrollOptions<T, K> {
        &self.options
    }

    /// Replaces the options.
    ///
    /// A new `track_by` invalidates every existing key, so all views are destroyed. Changing
    /// item dimensions or the grid mode invalidates the measured item size.
    pub fn set_options(&mut self, options: VirtualScrollOptions<T, K>) -> Result<()> {
        let key_changed = !Arc::ptr_eq(&self.options.track_by, &options.track_by);
        let layout_changed = self.options.item_width != options.item_width
            || self.options.item_height != options.item_height
            || self.options.grid_list != options.grid_list;
        if key_changed {
            self.clear()?;
        }
        self.options = options;
        if layout_changed {
            self.invalidate_item_size();
        }
        vtrace!(key_changed, layout_changed, "VirtualScroll::set_options");
        Ok(())
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(
        &mut self,
        f: impl FnOnce(&mut VirtualScrollOptions<T, K>),
    ) -> Result<()> {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next)
    }

    pub fn set_track_by(
        &mut self,
        f: impl Fn(usize, &T) -> K + Send + Sync + 'static,
    ) -> Result<()> {
        self.update_options(|o| o.track_by = Arc::new(f))
    }

    /// Attaches the host view factory, releasing any views created by a previous one.
    pub fn attach_factory(&mut self, factory: F) -> Result<()> {
        self.clear()?;
        self.factory = Some(factory);
        Ok(())
    }

    pub fn factory(&self) -> Option<&F> {
        self.factory.as_ref()
    }

    pub fn set_placeholder_factory(
        &mut self,
        placeholder: impl PlaceholderFactory<T, F::Handle> + 'static,
    ) {
        self.placeholder = Some(Box::new(placeholder));
    }

    pub fn has_placeholder_factory(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Replaces the item sequence.
    ///
    /// Waits for the in-flight pass to settle, then destroys every view: keys computed for the
    /// previous sequence are no longer meaningful.
    pub fn set_items(&mut self, items: Vec<T>) -> Result<()> {
        self.clear()?;
        vdebug!(count = items.len(), "VirtualScroll::set_items");
        self.items = items;
        Ok(())
    }

    pub fn key_for(&self, index: usize) -> Option<K> {
        let item = self.items.get(index)?;
        Some((self.options.track_by)(index, item))
    }

    pub fn views(&self) -> &ViewStore<T, K, F::Handle> {
        &self.views
    }

    pub fn scroll_position(&self) -> ScrollPosition {
        self.scroll_position
    }

    /// Returns `true` when the position changed.
    pub fn set_scroll_position(&mut self, position: ScrollPosition) -> bool {
        if self.scroll_position == position {
            return false;
        }
        self.scroll_position = position;
        true
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Returns `true` when the size changed.
    pub fn set_viewport(&mut self, viewport: ViewportSize) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }

    pub fn window(&self) -> Window {
        self.geometry.window
    }

    pub fn min_index(&self) -> usize {
        self.geometry.window.min_index
    }

    pub fn max_index(&self) -> usize {
        self.geometry.window.max_index
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn space_before(&self) -> u64 {
        self.geometry.space_before
    }

    pub fn space_after(&self) -> u64 {
        self.geometry.space_after
    }

    /// The slice of items selected by the current window.
    pub fn rendered_items(&self) -> &[T] {
        let w = self.geometry.window;
        self.items.get(w.min_index..w.max_index).unwrap_or(&[])
    }

    /// `true` from the start of a render pass until all of its view operations, deferred
    /// creations included, have settled.
    pub fn rendering_in_progress(&self) -> bool {
        self.rendering
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Number of render passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// The effective item size: configured dimensions first, measured ones otherwise.
    ///
    /// `None` while the height (or, for grids, the width) is still unknown.
    pub fn item_size(&self) -> Option<ItemSize> {
        let width = self
            .options
            .item_width
            .or(self.measured_size.map(|s| s.width));
        let height = self
            .options
            .item_height
            .or(self.measured_size.map(|s| s.height))?;
        if height == 0 {
            return None;
        }
        if self.options.grid_list && width.unwrap_or(0) == 0 {
            return None;
        }
        Some(ItemSize::new(width.unwrap_or(0), height))
    }

    /// Size hosts can use for placeholders: the last measured size, or the configured one.
    pub fn reference_size(&self) -> Option<ItemSize> {
        self.measured_size.or(self.options.configured_item_size())
    }

    pub fn needs_measurement(&self) -> bool {
        self.item_size().is_none()
    }

    pub fn items_per_row(&self) -> usize {
        let width = self.item_size().map_or(0, |s| s.width);
        items_per_row(self.options.grid_list, self.viewport.width, width)
    }

    /// Forgets the measured item size. The next update reports [`UpdateOutcome::NotReady`] until
    /// [`VirtualScroll::measure_reference`] succeeds.
    pub fn invalidate_item_size(&mut self) {
        if self.measured_size.take().is_some() {
            vdebug!("invalidate_item_size");
        }
    }

    /// Measures the first rendered (non-placeholder) view and records its size.
    pub fn measure_reference(&mut self) -> Option<ItemSize> {
        let factory = self.factory.as_ref()?;
        let size = self
            .views
            .rendered()
            .values()
            .filter(|v| !v.placeholder)
            .find_map(|v| factory.measure(&v.handle))?;
        if size.height == 0 {
            vtrace!("measure_reference: zero-height reference view");
            return None;
        }
        vdebug!(width = size.width, height = size.height, "measure_reference");
        self.measured_size = Some(size);
        Some(size)
    }

    /// Renders the first item alone so that it can be measured.
    ///
    /// Does nothing (and returns `false`) when views are already rendered, the list is empty,
    /// or a pass is still settling.
    pub fn render_reference(&mut self) -> Result<bool> {
        if self.items.is_empty() || !self.views.rendered().is_empty() || self.rendering {
            return Ok(false);
        }
        let geometry = WindowGeometry {
            window: Window::new(0, 1),
            ..WindowGeometry::default()
        };
        self.render(geometry)?;
        Ok(true)
    }

    /// Computes the window for the current scroll position without rendering it.
    pub fn compute_geometry(&self) -> Option<WindowGeometry> {
        let item = self.item_size()?;
        compute_window(
            self.items.len(),
            self.scroll_position,
            self.viewport,
            item,
            self.options.buffer_length,
            self.items_per_row(),
        )
    }

    /// Recomputes the window and runs a render pass if it changed.
    pub fn update(&mut self) -> Result<UpdateOutcome> {
        if self.rendering {
            return Ok(UpdateOutcome::Busy);
        }
        let Some(geometry) = self.compute_geometry() else {
            return Ok(UpdateOutcome::NotReady);
        };
        let same = geometry.window == self.geometry.window;
        if same && (self.passes > 0 || geometry.window.is_empty()) {
            self.geometry = geometry;
            return Ok(UpdateOutcome::Unchanged);
        }
        self.render(geometry).map(UpdateOutcome::Rendered)
    }

    fn split(&mut self, window: Window) -> Result<(RenderContext<'_, T, K, F>, &mut S, &[T])> {
        let factory = self.factory.as_mut().ok_or(Error::MissingViewFactory)?;
        let cx = RenderContext {
            views: &mut self.views,
            factory,
            placeholder: self.placeholder.as_deref_mut(),
            cache_limit: self.options.view_cache_limit,
            window,
            item_count: self.items.len(),
        };
        Ok((cx, &mut self.strategy, &self.items))
    }

    /// Runs one render pass for `geometry`.
    ///
    /// Views leaving the window are cached or destroyed, the cache is purged, then each item of
    /// the window is placed in index order.
    pub fn render(&mut self, geometry: WindowGeometry) -> Result<RenderStats> {
        if self.factory.is_none() {
            return Err(Error::MissingViewFactory);
        }
        let defer = self.options.async_rendering && self.passes > 0;
        if defer && self.placeholder.is_none() {
            return Err(Error::MissingPlaceholderFactory);
        }

        let count = self.items.len();
        let max_index = geometry.window.max_index.min(count);
        let window = Window::new(geometry.window.min_index.min(max_index), max_index);

        let track_by = Arc::clone(&self.options.track_by);
        let keys: Vec<K> = (window.min_index..window.max_index)
            .map(|i| track_by(i, &self.items[i]))
            .collect();
        let leaving: Vec<K> = {
            let wanted: HashSet<&K> = keys.iter().collect();
            self.views
                .rendered()
                .keys()
                .filter(|k| !wanted.contains(k))
                .cloned()
                .collect()
        };

        vdebug!(
            min = window.min_index,
            max = window.max_index,
            leaving = leaving.len(),
            defer,
            "render pass"
        );
        self.rendering = true;

        let mut stats = RenderStats::default();
        let mut deferred = Vec::new();
        let result = self.place_window(window, &leaving, keys, defer, &mut stats, &mut deferred);

        self.views.sort_rendered();
        self.deferred.extend(deferred);
        self.rendering = !self.deferred.is_empty();
        let attached = result?;

        if attached != window.len() {
            vwarn!(
                attached,
                expected = window.len(),
                "view count does not match the rendered window; track_by may be unstable or colliding"
            );
        }

        self.geometry = WindowGeometry { window, ..geometry };
        self.passes += 1;
        self.last_stats = stats;
        vtrace!(?stats, "render pass done");
        Ok(stats)
    }

    fn place_window(
        &mut self,
        window: Window,
        leaving: &[K],
        keys: Vec<K>,
        defer: bool,
        stats: &mut RenderStats,
        deferred: &mut Vec<K>,
    ) -> Result<usize> {
        let (mut cx, strategy, items) = self.split(window)?;
        for key in leaving {
            match strategy.unrender_view(&mut cx, key) {
                Unrendered::Cached => stats.cached += 1,
                Unrendered::Destroyed => stats.destroyed += 1,
                Unrendered::Missing => {}
            }
        }
        stats.destroyed += strategy.purge_view_cache(&mut cx);

        for (offset, key) in keys.into_iter().enumerate() {
            let index = window.min_index + offset;
            let item = &items[index];
            let rendered = strategy.render_view_for_item(&mut cx, key.clone(), item, index, defer)?;
            stats.record(rendered.placement);
            if rendered.deferred {
                stats.deferred += 1;
                deferred.push(key);
            }
        }
        Ok(cx.factory.len())
    }

    /// Completes every deferred view creation scheduled by previous passes.
    ///
    /// Call this one task-queue turn after a pass that deferred work. Once it returns, the
    /// engine is idle again. Returns the number of placeholders replaced.
    pub fn flush_deferred(&mut self) -> Result<usize> {
        if self.deferred.is_empty() {
            self.rendering = false;
            return Ok(0);
        }
        let pending: Vec<K> = self.deferred.drain(..).collect();
        let window = self.geometry.window;
        let result = self.complete_pending(window, &pending);
        self.rendering = false;
        let completed = result?;
        vdebug!(completed, "flush_deferred");
        Ok(completed)
    }

    fn complete_pending(&mut self, window: Window, pending: &[K]) -> Result<usize> {
        let (mut cx, strategy, _) = self.split(window)?;
        let mut completed = 0;
        for key in pending {
            if strategy.complete_deferred(&mut cx, key)? {
                completed += 1;
            }
        }
        Ok(completed)
    }

    /// Destroys every view in both pools.
    ///
    /// Pending deferred creations are completed first so that no placeholder outlives the
    /// pass that created it.
    pub fn clear(&mut self) -> Result<()> {
        self.flush_deferred()?;
        let keys: Vec<K> = self
            .views
            .rendered()
            .keys()
            .chain(self.views.cached().keys())
            .cloned()
            .collect();
        if !keys.is_empty() {
            let window = self.geometry.window;
            let (mut cx, strategy, _) = self.split(window)?;
            for key in &keys {
                strategy.destroy_view(&mut cx, key);
            }
            vdebug!(destroyed = keys.len(), "clear");
        }
        self.geometry = WindowGeometry::default();
        Ok(())
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            position: self.scroll_position,
            viewport: self.viewport,
        }
    }

    pub fn window_state(&self) -> WindowState {
        WindowState {
            geometry: self.geometry,
            rendering_in_progress: self.rendering,
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            scroll: self.scroll_state(),
            window: self.window_state(),
            item_size: self.measured_size,
        }
    }

    /// Restores scroll position, viewport and measured item size from a snapshot.
    ///
    /// Nothing is rendered until the next [`VirtualScroll::update`].
    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.scroll_position = frame.scroll.position;
        self.viewport = frame.scroll.viewport;
        if let Some(size) = frame.item_size.filter(|s| s.height > 0) {
            self.measured_size = Some(size);
        }
    }
}

impl<T, F: ViewFactory<T>, K, S> Drop for VirtualScroll<T, F, K, S> {
    fn drop(&mut self) {
        let Some(factory) = self.factory.as_mut() else {
            return;
        };
        for view in self.views.drain_all() {
            factory.destroy(view.handle);
        }
    }
}

impl<T, F: ViewFactory<T>, K, S> core::fmt::Debug for VirtualScroll<T, F, K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualScroll")
            .field("options", &self.options)
            .field("item_count", &self.items.len())
            .field("scroll_position", &self.scroll_position)
            .field("viewport", &self.viewport)
            .field("measured_size", &self.measured_size)
            .field("geometry", &self.geometry)
            .field("rendering", &self.rendering)
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}
