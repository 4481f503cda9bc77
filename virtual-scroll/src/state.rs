use crate::{ItemSize, ScrollPosition, ViewportSize, WindowGeometry};

/// A lightweight, serializable snapshot of the scroll container.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub position: ScrollPosition,
    pub viewport: ViewportSize,
}

/// The window last rendered by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowState {
    pub geometry: WindowGeometry,
    pub rendering_in_progress: bool,
}

/// A combined snapshot of scroll state, rendered window and item measurements.
///
/// Restoring a frame puts the scroll position and measured item size back in place, so the
/// next update renders the same window without a measurement pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub scroll: ScrollState,
    pub window: WindowState,
    pub item_size: Option<ItemSize>,
}
