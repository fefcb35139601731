//! Keeping an opened popup inside the visible part of the map.

use crate::types::geo::{Point, Rect, Size};

/// The container inset by `padding`, with the top edge pushed below the
/// search overlay.
pub fn safe_rect(container: Size, overlay_height: f64, padding: f64) -> Rect {
    let top = (overlay_height + padding).max(padding);
    Rect::new(
        padding,
        top,
        (container.width - padding).max(padding),
        (container.height - padding).max(top),
    )
}

/// Smallest shift that moves `popup` inside `safe`, per axis.
///
/// When the popup is larger than the safe area on an axis, its top (or left)
/// edge is aligned with the safe area's instead.
pub fn popup_translation(popup: &Rect, safe: &Rect) -> Point {
    Point::new(
        axis_shift(popup.left, popup.right, safe.left, safe.right),
        axis_shift(popup.top, popup.bottom, safe.top, safe.bottom),
    )
}

fn axis_shift(start: f64, end: f64, safe_start: f64, safe_end: f64) -> f64 {
    if end - start > safe_end - safe_start {
        return safe_start - start;
    }
    if start < safe_start {
        safe_start - start
    } else if end > safe_end {
        safe_end - end
    } else {
        0.0
    }
}
