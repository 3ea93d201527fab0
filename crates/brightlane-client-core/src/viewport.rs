//! Scroll and layout thresholds shared by the scroll-reactive behaviors.

pub const HEADER_BLUR_SCROLL_Y: f64 = 100.0;
pub const BACK_TO_TOP_SCROLL_Y: f64 = 500.0;
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

pub fn header_blurred(scroll_y: f64) -> bool {
    scroll_y > HEADER_BLUR_SCROLL_Y
}

pub fn back_to_top_visible(scroll_y: f64) -> bool {
    scroll_y > BACK_TO_TOP_SCROLL_Y
}

pub fn is_mobile(viewport_width: f64) -> bool {
    viewport_width <= MOBILE_BREAKPOINT_PX
}

/// Scroll destination for an in-page anchor, compensating for the sticky
/// header and never above the top of the document.
pub fn anchor_scroll_top(target_top: f64, header_height: f64) -> f64 {
    (target_top - header_height).max(0.0)
}
