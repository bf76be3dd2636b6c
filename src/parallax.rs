use glam::Vec2;

pub const LIGHT_X_START: f32 = -5.0;
pub const LIGHT_X_END: f32 = 5.0;
pub const CAMERA_BASE_Y: f32 = 3.0;

/// How far the page has been scrolled, in `[0, 1]`.
///
/// A document that is no taller than the viewport has nothing to scroll, so
/// it reports 0 instead of dividing by zero.
pub fn scroll_percentage(scroll_y: f32, scroll_height: f32) -> f32 {
    if scroll_height <= 0.0 {
        return 0.0;
    }

    (scroll_y / scroll_height).clamp(0.0, 1.0)
}

/// X coordinate shared by every light in the column.
pub fn light_x(scroll_percentage: f32) -> f32 {
    LIGHT_X_START + scroll_percentage * (LIGHT_X_END - LIGHT_X_START)
}

/// Local Y of the camera inside its rig. One viewport of scrolling moves the
/// camera down by one world unit.
pub fn camera_y(scroll_y: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 {
        return CAMERA_BASE_Y;
    }

    -scroll_y / viewport_height + CAMERA_BASE_Y
}

/// Where the cursor wants the rig to be. Screen Y grows downwards, world Y
/// grows upwards.
pub fn parallax_target(cursor: Vec2) -> Vec2 {
    Vec2::new(cursor.x, -cursor.y)
}

/// One step of exponential damping toward `target`.
///
/// `delta_time` is deliberately not clamped: with `rate * delta_time > 1` the
/// step overshoots, and above 2 it diverges.
pub fn damp(current: Vec2, target: Vec2, rate: f32, delta_time: f32) -> Vec2 {
    current + (target - current) * rate * delta_time
}
