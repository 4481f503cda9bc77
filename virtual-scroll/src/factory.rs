use crate::ItemSize;

/// The host's view container.
///
/// The engine never builds views itself: it sequences calls to this trait. Positions are
/// indexes into the container's render order; `None` means "at the end".
pub trait ViewFactory<T> {
    /// Opaque, owned handle to a materialized view.
    type Handle;

    /// Creates a view bound to `item` and attaches it at `position`.
    fn create(&mut self, item: &T, index: usize, position: Option<usize>) -> Self::Handle;

    /// Releases a view, detaching it first if it is attached.
    fn destroy(&mut self, handle: Self::Handle);

    /// Moves an attached view to `position`.
    fn move_to(&mut self, handle: &Self::Handle, position: usize);

    /// Detaches a view from the container without destroying it.
    fn detach(&mut self, handle: &Self::Handle);

    /// Re-attaches a detached view at `position`.
    fn insert(&mut self, handle: &Self::Handle, position: Option<usize>);

    /// Position of an attached view, `None` when detached.
    fn index_of(&self, handle: &Self::Handle) -> Option<usize>;

    /// Number of attached views.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forces the view to reflect its (possibly new) bound item and index.
    fn refresh(&mut self, handle: &Self::Handle, item: &T, index: usize);

    /// Measures an attached view. Used to discover the item size when it is not configured.
    fn measure(&self, handle: &Self::Handle) -> Option<ItemSize> {
        let _ = handle;
        None
    }
}

/// Produces lightweight stand-in views while real views are created asynchronously.
///
/// The returned handle is detached; the engine attaches it through the [`ViewFactory`] and
/// later releases it with [`ViewFactory::destroy`].
pub trait PlaceholderFactory<T, H> {
    fn create_placeholder(&mut self, item: &T, index: usize) -> H;
}

impl<T, H, F> PlaceholderFactory<T, H> for F
where
    F: FnMut(&T, usize) -> H,
{
    fn create_placeholder(&mut self, item: &T, index: usize) -> H {
        self(item, index)
    }
}
