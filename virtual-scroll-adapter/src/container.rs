use virtual_scroll::{ScrollPosition, ViewportSize};

/// The element whose scroll events drive the engine.
pub trait ScrollContainer {
    /// The live scroll offset.
    fn scroll_position(&self) -> ScrollPosition;

    /// The visible (client) size.
    fn client_size(&self) -> ViewportSize;

    /// Turns the container's own scrollbars and block layout on or off.
    fn set_native_scrolling(&mut self, enabled: bool);
}

/// Whether the list owns the container it scrolls in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerOwnership {
    /// The list element is its own scroll container. Native scrolling is enabled on attach and
    /// disabled again on detach.
    #[default]
    Owned,
    /// Some ancestor scrolls. The container is observed but never restyled.
    External,
}
