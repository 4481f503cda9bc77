use std::sync::Arc;

use crate::ItemSize;

/// Default number of viewport heights rendered before and after the visible area.
pub const DEFAULT_BUFFER_LENGTH: f32 = 3.0;

/// Default scroll throttle interval.
pub const DEFAULT_SCROLL_DEBOUNCE_MS: u64 = 50;

/// Maps `(index, item)` to the identity used for view recycling.
pub type TrackBy<T, K> = Arc<dyn Fn(usize, &T) -> K + Send + Sync>;

/// Upper bound on the number of detached views kept for reuse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CacheLimit {
    /// Views leaving the window are destroyed immediately.
    #[default]
    Disabled,
    /// At most `n` views are retained. `Limited(0)` behaves like `Disabled`.
    Limited(usize),
    /// Views are never evicted.
    Unbounded,
}

impl CacheLimit {
    pub fn limit(self) -> usize {
        match self {
            Self::Disabled => 0,
            Self::Limited(n) => n,
            Self::Unbounded => usize::MAX,
        }
    }

    pub fn is_enabled(self) -> bool {
        self.limit() > 0
    }

    /// Whether a cache holding `len` views must be purged.
    pub fn is_exceeded(self, len: usize) -> bool {
        len > self.limit()
    }
}

impl From<bool> for CacheLimit {
    fn from(value: bool) -> Self {
        if value {
            Self::Unbounded
        } else {
            Self::Disabled
        }
    }
}

impl From<usize> for CacheLimit {
    fn from(value: usize) -> Self {
        if value == 0 {
            Self::Disabled
        } else {
            Self::Limited(value)
        }
    }
}

/// Configuration for [`crate::VirtualScroll`].
///
/// Like the engine itself this is cheap to clone: `track_by` lives in an `Arc`, so adapters
/// can tweak a field and hand the options back through `VirtualScroll::set_options`.
pub struct VirtualScrollOptions<T, K = T> {
    /// Fixed item width. Measured from a rendered reference view when `None`.
    pub item_width: Option<u32>,
    /// Fixed item height. Measured from a rendered reference view when `None`.
    pub item_height: Option<u32>,
    /// Viewport heights added before and after the visible area.
    pub buffer_length: f32,
    /// Throttle interval applied to scroll events by the coordinator.
    pub scroll_debounce_ms: u64,
    pub view_cache_limit: CacheLimit,
    /// Lay items out in rows of `floor(client_width / item_width)`.
    pub grid_list: bool,
    /// Create views for cache misses one turn later, behind a placeholder.
    pub async_rendering: bool,
    /// Listen for scroll events in the capture phase (forwarded to the host container).
    pub event_capture: bool,
    pub track_by: TrackBy<T, K>,
}

impl<T, K> Clone for VirtualScrollOptions<T, K> {
    fn clone(&self) -> Self {
        Self {
            item_width: self.item_width,
            item_height: self.item_height,
            buffer_length: self.buffer_length,
            scroll_debounce_ms: self.scroll_debounce_ms,
            view_cache_limit: self.view_cache_limit,
            grid_list: self.grid_list,
            async_rendering: self.async_rendering,
            event_capture: self.event_capture,
            track_by: Arc::clone(&self.track_by),
        }
    }
}

impl<T: Clone + 'static> VirtualScrollOptions<T, T> {
    /// Creates options where each item is its own identity key.
    pub fn new() -> Self {
        Self::new_with_key(|_, item: &T| item.clone())
    }
}

impl<T: Clone + 'static> Default for VirtualScrollOptions<T, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> VirtualScrollOptions<T, K> {
    /// Creates options with a custom identity function.
    ///
    /// `track_by(index, item)` must return the same key for the same logical item across
    /// updates, otherwise views cannot be recycled.
    pub fn new_with_key(track_by: impl Fn(usize, &T) -> K + Send + Sync + 'static) -> Self {
        Self {
            item_width: None,
            item_height: None,
            buffer_length: DEFAULT_BUFFER_LENGTH,
            scroll_debounce_ms: DEFAULT_SCROLL_DEBOUNCE_MS,
            view_cache_limit: CacheLimit::Disabled,
            grid_list: false,
            async_rendering: false,
            event_capture: false,
            track_by: Arc::new(track_by),
        }
    }

    pub fn with_track_by<K2>(
        self,
        track_by: impl Fn(usize, &T) -> K2 + Send + Sync + 'static,
    ) -> VirtualScrollOptions<T, K2> {
        VirtualScrollOptions {
            item_width: self.item_width,
            item_height: self.item_height,
            buffer_length: self.buffer_length,
            scroll_debounce_ms: self.scroll_debounce_ms,
            view_cache_limit: self.view_cache_limit,
            grid_list: self.grid_list,
            async_rendering: self.async_rendering,
            event_capture: self.event_capture,
            track_by: Arc::new(track_by),
        }
    }

    pub fn with_item_width(mut self, item_width: Option<u32>) -> Self {
        self.item_width = item_width;
        self
    }

    pub fn with_item_height(mut self, item_height: Option<u32>) -> Self {
        self.item_height = item_height;
        self
    }

    /// Sets both item dimensions, skipping measurement entirely.
    pub fn with_item_size(mut self, size: ItemSize) -> Self {
        self.item_width = Some(size.width);
        self.item_height = Some(size.height);
        self
    }

    pub fn with_buffer_length(mut self, buffer_length: f32) -> Self {
        self.buffer_length = buffer_length.max(0.0);
        self
    }

    pub fn with_scroll_debounce_ms(mut self, scroll_debounce_ms: u64) -> Self {
        self.scroll_debounce_ms = scroll_debounce_ms;
        self
    }

    /// Accepts a `CacheLimit`, a `bool` (`true` = unbounded) or a `usize` count.
    pub fn with_view_cache_limit(mut self, limit: impl Into<CacheLimit>) -> Self {
        self.view_cache_limit = limit.into();
        self
    }

    pub fn with_grid_list(mut self, grid_list: bool) -> Self {
        self.grid_list = grid_list;
        self
    }

    pub fn with_async_rendering(mut self, async_rendering: bool) -> Self {
        self.async_rendering = async_rendering;
        self
    }

    pub fn with_event_capture(mut self, event_capture: bool) -> Self {
        self.event_capture = event_capture;
        self
    }

    /// Item size given explicitly, if both dimensions are configured.
    pub fn configured_item_size(&self) -> Option<ItemSize> {
        Some(ItemSize::new(self.item_width?, self.item_height?))
    }
}

impl<T, K> core::fmt::Debug for VirtualScrollOptions<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualScrollOptions")
            .field("item_width", &self.item_width)
            .field("item_height", &self.item_height)
            .field("buffer_length", &self.buffer_length)
            .field("scroll_debounce_ms", &self.scroll_debounce_ms)
            .field("view_cache_limit", &self.view_cache_limit)
            .field("grid_list", &self.grid_list)
            .field("async_rendering", &self.async_rendering)
            .field("event_capture", &self.event_capture)
            .finish_non_exhaustive()
    }
}
