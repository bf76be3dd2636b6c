use glam::Vec2;
use winit::keyboard::{Key, NamedKey};

use crate::parallax;

/// Scroll position inside the virtual document, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub scroll_y: f32,
    pub document_height: f32,
    pub viewport_height: f32,
}

impl ScrollState {
    pub fn new(viewport_height: f32, document_height: f32) -> Self {
        Self {
            scroll_y: 0.0,
            document_height,
            viewport_height,
        }
    }

    /// Largest reachable `scroll_y`.
    pub fn scroll_height(&self) -> f32 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    pub fn percentage(&self) -> f32 {
        parallax::scroll_percentage(self.scroll_y, self.scroll_height())
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y.clamp(0.0, self.scroll_height());
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll_y + delta);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    Lines(f32),
    Pages(f32),
    Top,
    Bottom,
}

impl ScrollCommand {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::ArrowDown) => Some(ScrollCommand::Lines(1.0)),
            Key::Named(NamedKey::ArrowUp) => Some(ScrollCommand::Lines(-1.0)),
            Key::Named(NamedKey::PageDown | NamedKey::Space) => Some(ScrollCommand::Pages(1.0)),
            Key::Named(NamedKey::PageUp) => Some(ScrollCommand::Pages(-1.0)),
            Key::Named(NamedKey::Home) => Some(ScrollCommand::Top),
            Key::Named(NamedKey::End) => Some(ScrollCommand::Bottom),
            _ => None,
        }
    }
}

/// Everything the frame update reads from the window.
///
/// Written by window events, read once per frame. Both happen on the event
/// loop thread.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Cursor offset from the window center, roughly `[-0.5, 0.5]` per axis.
    pub cursor: Vec2,
    pub scroll: ScrollState,

    /// Physical window size.
    window_size: Vec2,
    scale_factor: f32,
    document_height_viewports: f32,
    line_height: f32,
}

impl InputState {
    pub fn new(
        window_size: Vec2,
        scale_factor: f32,
        document_height_viewports: f32,
        line_height: f32,
    ) -> Self {
        let viewport_height = window_size.y / scale_factor;

        Self {
            cursor: Vec2::ZERO,
            scroll: ScrollState::new(
                viewport_height,
                viewport_height * document_height_viewports,
            ),
            window_size,
            scale_factor,
            document_height_viewports,
            line_height,
        }
    }

    pub fn window_size(&self) -> Vec2 {
        self.window_size
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.window_size.y <= 0.0 {
            return 1.0;
        }

        self.window_size.x / self.window_size.y
    }

    /// Zero-sized windows (minimized) keep the previous state.
    pub fn on_resize(&mut self, window_size: Vec2, scale_factor: f32) {
        if window_size.x <= 0.0 || window_size.y <= 0.0 {
            return;
        }

        self.window_size = window_size;
        self.scale_factor = scale_factor;

        let viewport_height = window_size.y / scale_factor;
        self.scroll.viewport_height = viewport_height;
        self.scroll.document_height = viewport_height * self.document_height_viewports;
        self.scroll.scroll_to(self.scroll.scroll_y);
    }

    pub fn on_cursor_moved(&mut self, position: Vec2) {
        if self.window_size.x <= 0.0 || self.window_size.y <= 0.0 {
            return;
        }

        self.cursor = position / self.window_size - Vec2::splat(0.5);
    }

    /// Wheel input in lines. Positive values scroll up, like winit reports.
    pub fn on_wheel_lines(&mut self, lines: f32) {
        self.scroll.scroll_by(-lines * self.line_height);
    }

    /// Wheel input in physical pixels. Positive values scroll up.
    pub fn on_wheel_pixels(&mut self, pixels: f32) {
        self.scroll.scroll_by(-pixels / self.scale_factor);
    }

    pub fn apply(&mut self, command: ScrollCommand) {
        match command {
            ScrollCommand::Lines(lines) => self.scroll.scroll_by(lines * self.line_height),
            ScrollCommand::Pages(pages) => {
                self.scroll
                    .scroll_by(pages * self.scroll.viewport_height * 0.9)
            }
            ScrollCommand::Top => self.scroll.scroll_to(0.0),
            ScrollCommand::Bottom => self.scroll.scroll_to(self.scroll.scroll_height()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InputState {
        InputState::new(Vec2::new(1200.0, 800.0), 1.0, 2.0, 40.0)
    }

    #[test]
    fn scroll_height_excludes_viewport() {
        let scroll = ScrollState::new(800.0, 1600.0);
        assert_eq!(scroll.scroll_height(), 800.0);
        assert_eq!(scroll.percentage(), 0.0);
    }

    #[test]
    fn short_document_cannot_scroll() {
        let mut scroll = ScrollState::new(800.0, 600.0);
        assert_eq!(scroll.scroll_height(), 0.0);
        scroll.scroll_by(100.0);
        assert_eq!(scroll.scroll_y, 0.0);
        assert_eq!(scroll.percentage(), 0.0);
    }

    #[test]
    fn scrolling_stays_inside_document() {
        let mut scroll = ScrollState::new(800.0, 1600.0);
        scroll.scroll_by(-100.0);
        assert_eq!(scroll.scroll_y, 0.0);
        scroll.scroll_by(5000.0);
        assert_eq!(scroll.scroll_y, 800.0);
        assert_eq!(scroll.percentage(), 1.0);
    }

    #[test]
    fn centered_cursor_is_zero() {
        let mut input = input();
        input.on_cursor_moved(Vec2::new(600.0, 400.0));
        assert_eq!(input.cursor, Vec2::ZERO);
    }

    #[test]
    fn cursor_corners() {
        let mut input = input();
        input.on_cursor_moved(Vec2::ZERO);
        assert_eq!(input.cursor, Vec2::new(-0.5, -0.5));
        input.on_cursor_moved(Vec2::new(1200.0, 800.0));
        assert_eq!(input.cursor, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn wheel_down_scrolls_down() {
        let mut input = input();
        input.on_wheel_lines(-3.0);
        assert_eq!(input.scroll.scroll_y, 120.0);
        input.on_wheel_lines(1.0);
        assert_eq!(input.scroll.scroll_y, 80.0);
    }

    #[test]
    fn pixel_wheel_uses_logical_pixels() {
        let mut input = InputState::new(Vec2::new(2400.0, 1600.0), 2.0, 2.0, 40.0);
        input.on_wheel_pixels(-200.0);
        assert_eq!(input.scroll.scroll_y, 100.0);
    }

    #[test]
    fn keyboard_commands() {
        let mut input = input();
        input.apply(ScrollCommand::Bottom);
        assert_eq!(input.scroll.scroll_y, 800.0);
        input.apply(ScrollCommand::Pages(-1.0));
        assert!((input.scroll.scroll_y - 80.0).abs() < 1e-3);
        input.apply(ScrollCommand::Lines(1.0));
        assert!((input.scroll.scroll_y - 120.0).abs() < 1e-3);
        input.apply(ScrollCommand::Top);
        assert_eq!(input.scroll.scroll_y, 0.0);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(
            ScrollCommand::from_key(&Key::Named(NamedKey::End)),
            Some(ScrollCommand::Bottom)
        );
        assert_eq!(
            ScrollCommand::from_key(&Key::Named(NamedKey::Space)),
            Some(ScrollCommand::Pages(1.0))
        );
        assert_eq!(ScrollCommand::from_key(&Key::Named(NamedKey::Enter)), None);
    }

    #[test]
    fn resize_updates_aspect_and_reclamps_scroll() {
        let mut input = input();
        input.apply(ScrollCommand::Bottom);
        assert_eq!(input.aspect_ratio(), 1.5);

        input.on_resize(Vec2::new(800.0, 400.0), 1.0);
        assert_eq!(input.aspect_ratio(), 2.0);
        assert_eq!(input.scroll.viewport_height, 400.0);
        assert_eq!(input.scroll.document_height, 800.0);
        assert_eq!(input.scroll.scroll_y, 400.0);
    }

    #[test]
    fn minimize_keeps_scroll_position() {
        let mut input = InputState::new(Vec2::new(1200.0, 800.0), 1.0, 3.0, 40.0);
        input.scroll.scroll_to(1000.0);

        input.on_resize(Vec2::ZERO, 1.0);
        assert_eq!(input.scroll.scroll_y, 1000.0);
        assert_eq!(input.aspect_ratio(), 1.5);

        input.on_resize(Vec2::new(1200.0, 800.0), 1.0);
        assert_eq!(input.scroll.scroll_y, 1000.0);
        assert!((input.scroll.percentage() - 0.625).abs() < 1e-6);
    }
}
