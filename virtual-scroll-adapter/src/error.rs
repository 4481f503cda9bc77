use thiserror::Error;

/// Errors reported by the [`crate::Coordinator`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] virtual_scroll::Error),

    /// A scroll container is already attached; detach it first.
    #[error("a scroll container is already attached")]
    ContainerAttached,
}

pub type Result<T> = core::result::Result<T, Error>;
