use thiserror::Error;

/// Errors reported by the engine.
///
/// These are configuration errors: they are returned at the point of first use and
/// are never retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A render pass needed the view factory but none was attached.
    #[error("no view factory attached to the virtual scroll engine")]
    MissingViewFactory,

    /// Async rendering is enabled but no placeholder factory was provided.
    #[error("async rendering requires a placeholder factory")]
    MissingPlaceholderFactory,
}

/// Result type for engine operations.
pub type Result<T> = core::result::Result<T, Error>;
