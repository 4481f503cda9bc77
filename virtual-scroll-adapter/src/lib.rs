//! Scroll and resize coordination for the `virtual-scroll` engine.
//!
//! The engine computes windows and recycles views but never decides *when* to do so. This crate
//! provides the framework-neutral glue adapters usually need:
//!
//! - a leading + trailing [`Throttle`] for scroll events
//! - a [`Coordinator`] that serializes recomputation, schedules reference measurements and
//!   re-checks the scroll position after each pass
//! - a [`ScrollContainer`] abstraction for the element that scrolls
//!
//! Time is supplied by the adapter (`now_ms`); nothing here spawns timers or tasks.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod container;
mod coordinator;
mod error;
mod throttle;


pub use container::{ContainerOwnership, ScrollContainer};
pub use coordinator::{Coordinator, Phase};
pub use error::{Error, Result};
pub use throttle::Throttle;
