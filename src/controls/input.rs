use glam::Vec2;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer state accumulated between two frames.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Current pointer position inside the container
    pub cursor_position: Vec2,
    /// Pointer motion since the previous frame
    pub cursor_delta: Vec2,
    /// Wheel motion since the previous frame
    pub scroll_delta: Vec2,
    /// Container size in CSS pixels
    pub screen_size: Vec2,
    pub buttons: FxHashSet<PointerButton>,
    cursor_seen: bool,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame deltas.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if self.cursor_seen {
            self.cursor_delta += position - self.cursor_position;
        }
        self.cursor_position = position;
        self.cursor_seen = true;
    }

    pub fn handle_button(&mut self, button: PointerButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Positive `lines` zoom in.
    pub fn handle_wheel(&mut self, lines: f32) {
        self.scroll_delta.y += lines;
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: PointerButton) -> bool {
        self.buttons.contains(&button)
    }
}
