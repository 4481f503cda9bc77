/// Scroll offsets of the scroll container, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollPosition {
    pub x: u64,
    pub y: u64,
}

impl ScrollPosition {
    pub fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}

/// Pixel bounds, used both for the (buffered) viewport and for a single view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: u64,
    pub top: u64,
    pub right: u64,
    pub bottom: u64,
}

impl Rect {
    pub fn width(&self) -> u64 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u64 {
        self.bottom.saturating_sub(self.top)
    }

    /// Edge-inclusive overlap test.
    pub fn intersects(&self, other: &Rect) -> bool {
        other.left <= self.right
            && other.right >= self.left
            && other.top <= self.bottom
            && other.bottom >= self.top
    }
}

/// Client size of the scroll container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Size of a single rendered item. Every item in the list shares it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSize {
    pub width: u32,
    pub height: u32,
}

impl ItemSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The range of item indexes selected for rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub min_index: usize,
    pub max_index: usize, // exclusive
}

impl Window {
    pub fn new(min_index: usize, max_index: usize) -> Self {
        Self {
            min_index,
            max_index,
        }
    }

    pub fn len(&self) -> usize {
        self.max_index.saturating_sub(self.min_index)
    }

    pub fn is_empty(&self) -> bool {
        self.min_index >= self.max_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.min_index && index < self.max_index
    }
}

/// Output of the geometry calculation: the window plus the spacer sizes that bracket it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowGeometry {
    pub window: Window,
    /// Height of the spacer placed before the first rendered item.
    pub space_before: u64,
    /// Height of the spacer placed after the last rendered item.
    pub space_after: u64,
    /// The viewport bounds after buffer expansion.
    pub bounds: Rect,
}

/// How a view was obtained for an item during a render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placement {
    /// The view was already rendered and has been repositioned (or left in place).
    Move,
    /// The view was taken from the cache and re-attached.
    Hit,
    /// No view existed; a new one (or a placeholder for it) was created.
    Miss,
}

/// Per-pass counters, useful for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderStats {
    pub moves: usize,
    pub hits: usize,
    pub misses: usize,
    pub deferred: usize,
    pub cached: usize,
    pub destroyed: usize,
}

impl RenderStats {
    pub(crate) fn record(&mut self, placement: Placement) {
        match placement {
            Placement::Move => self.moves += 1,
            Placement::Hit => self.hits += 1,
            Placement::Miss => self.misses += 1,
        }
    }
}
