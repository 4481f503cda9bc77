/// Bound for item identity keys produced by `track_by`.
///
/// Keys are stored in hashed, insertion-ordered pools and copied into every
/// [`crate::ViewInfo`], so they need to be cheap to clone.
pub trait ViewKey: core::hash::Hash + Eq + Clone {}
impl<K: core::hash::Hash + Eq + Clone> ViewKey for K {}
