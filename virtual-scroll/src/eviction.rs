//! Cache eviction: keeps the cached pool within its limit.
//!
//! Candidates are picked by walking the cache in insertion order, starting from the end that is
//! farthest from where the user is scrolling. Entries that are about to be rendered again are
//! never evicted.

use crate::key::ViewKey;
use crate::{CacheLimit, ViewPool, Window};

/// Which end of the cache the eviction walk starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanDirection {
    /// Oldest cache entries first.
    FromStart,
    /// Newest cache entries first.
    FromEnd,
}

/// Scan from the start once the window sits in the lower half of the list, otherwise from the end.
pub fn scan_direction(min_index: usize, item_count: usize) -> ScanDirection {
    if min_index.saturating_mul(2) >= item_count {
        ScanDirection::FromStart
    } else {
        ScanDirection::FromEnd
    }
}

/// Selects the keys to evict so that `cached.len() <= limit`, in eviction order.
///
/// Entries whose `item_index` lies in `[window.min_index, window.min_index + rendered_count)`
/// are skipped. The result can be shorter than needed when too few entries are eligible.
pub fn eviction_candidates<T, K: ViewKey, H>(
    cached: &ViewPool<T, K, H>,
    window: Window,
    rendered_count: usize,
    item_count: usize,
    limit: CacheLimit,
) -> Vec<K> {
    if !limit.is_exceeded(cached.len()) {
        return Vec::new();
    }
    let excess = cached.len() - limit.limit();
    let keep_start = window.min_index;
    let keep_end = window.min_index.saturating_add(rendered_count);
    let eligible = |index: usize| index < keep_start || index >= keep_end;

    let walk = |view: &crate::ViewInfo<T, K, H>| eligible(view.item_index).then(|| view.key.clone());
    let out: Vec<K> = match scan_direction(window.min_index, item_count) {
        ScanDirection::FromStart => cached.values().filter_map(walk).take(excess).collect(),
        ScanDirection::FromEnd => cached.values().rev().filter_map(walk).take(excess).collect(),
    };

    if out.len() < excess {
        vdebug!(
            wanted = excess,
            found = out.len(),
            "eviction_candidates: cache stays over its limit"
        );
    }
    out
}
