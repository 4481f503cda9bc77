//! A headless view-recycling engine for virtually scrolled lists and grids.
//!
//! For scroll throttling, resize handling and measurement scheduling, see the
//! `virtual-scroll-adapter` crate.
//!
//! Given a large item sequence, the engine materializes views only for the items whose rows
//! intersect the viewport (plus a buffer of extra viewport heights on either side). Views that
//! leave the window are detached and cached, or destroyed, and are reused by identity key when
//! their item comes back.
//!
//! It is UI-agnostic. A host framework is expected to provide:
//! - a [`ViewFactory`] that creates, attaches, moves and destroys views
//! - the scroll position and client size of the scroll container
//! - optionally, a [`PlaceholderFactory`] for asynchronous view creation
//!
//! The engine is driven in turns: call [`VirtualScroll::update`] after scroll/resize changes and
//! [`VirtualScroll::flush_deferred`] on the following turn when `async_rendering` is enabled.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod engine;
mod error;
mod eviction;
mod factory;
mod geometry;
mod key;
mod options;
mod pool;
mod state;
mod strategy;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{UpdateOutcome, VirtualScroll};
pub use error::{Error, Result};
pub use eviction::{ScanDirection, eviction_candidates, scan_direction};
pub use factory::{PlaceholderFactory, ViewFactory};
pub use geometry::{buffer_px, compute_window, content_height, items_per_row};
pub use key::ViewKey;
pub use options::{
    CacheLimit, DEFAULT_BUFFER_LENGTH, DEFAULT_SCROLL_DEBOUNCE_MS, TrackBy, VirtualScrollOptions,
};
pub use pool::{Pool, ViewInfo, ViewPool, ViewStore};
pub use state::{FrameState, ScrollState, WindowState};
pub use strategy::{
    DefaultStrategy, RenderContext, RenderedView, Unrendered, ViewLifecycleStrategy,
};
pub use types::{
    ItemSize, Placement, Rect, RenderStats, ScrollPosition, ViewportSize, Window, WindowGeometry,
};
