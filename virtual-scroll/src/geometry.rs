//! Pure window math: scroll offset + item geometry → rendered index range and spacers.
//!
//! Everything here is a function of its arguments only, so the same inputs always yield the
//! same window (scrolling away and back reconstructs the previous range).

use crate::{ItemSize, Rect, ScrollPosition, ViewportSize, Window, WindowGeometry};

/// Number of items laid out per row.
///
/// Lists always have one item per row. Grids fit as many whole items as the container's client
/// width allows, and never fewer than one.
pub fn items_per_row(grid_list: bool, client_width: u32, item_width: u32) -> usize {
    if !grid_list || item_width == 0 {
        return 1;
    }
    ((client_width / item_width) as usize).max(1)
}

/// Total virtual content height for `item_count` items.
pub fn content_height(item_count: usize, item_height: u32, items_per_row: usize) -> u64 {
    let rows = item_count.div_ceil(items_per_row.max(1)) as u64;
    rows.saturating_mul(item_height as u64)
}

/// Pixels added on each side of the viewport for a given buffer length.
pub fn buffer_px(viewport_height: u32, buffer_length: f32) -> u64 {
    let px = viewport_height as f64 * f64::from(buffer_length.max(0.0));
    px as u64
}

/// Computes the index window to render.
///
/// The viewport `[scroll.y, scroll.y + viewport.height]` is expanded by `buffer_length`
/// viewport heights on both sides (clamped to the content), then converted to whole rows.
/// `max_index` is exclusive.
///
/// Returns `None` while the item height is unknown (zero); callers keep their previous window
/// until a reference view has been measured.
pub fn compute_window(
    item_count: usize,
    scroll: ScrollPosition,
    viewport: ViewportSize,
    item: ItemSize,
    buffer_length: f32,
    items_per_row: usize,
) -> Option<WindowGeometry> {
    if item.height == 0 {
        return None;
    }

    let per_row = items_per_row.max(1);
    let height = item.height as u64;
    let buffer = buffer_px(viewport.height, buffer_length);
    let total = content_height(item_count, item.height, per_row);

    let top = scroll.y.saturating_sub(buffer);
    let bottom = scroll
        .y
        .saturating_add(viewport.height as u64)
        .saturating_add(buffer)
        .min(total);
    let bounds = Rect {
        left: scroll.x,
        top,
        right: scroll.x.saturating_add(viewport.width as u64),
        bottom,
    };

    if item_count == 0 {
        return Some(WindowGeometry {
            window: Window::default(),
            space_before: 0,
            space_after: 0,
            bounds,
        });
    }

    let min_index = ((top / height) as usize)
        .saturating_mul(per_row)
        .min(item_count - 1);
    let max_index = (bottom.div_ceil(height) as usize)
        .saturating_mul(per_row)
        .min(item_count)
        .max(min_index);

    let space_before = (min_index / per_row) as u64 * height;
    let space_after = (item_count - max_index).div_ceil(per_row) as u64 * height;

    Some(WindowGeometry {
        window: Window::new(min_index, max_index),
        space_before,
        space_after,
        bounds,
    })
}
