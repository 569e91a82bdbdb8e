/// Keyboard and mouse state tracker.
///
/// Keys:
///   - Held state with timeout-based release on terminals that never
///     report Release events
///   - Edge-triggered presses (rotate, recolor, menu slots)
///
/// Mouse (crossterm mouse capture):
///   - Pointer cell, updated on every move / drag / click
///   - Left / right clicks as one-shot flags
///   - Wheel notches, summed per frame
///   - Middle-button drag delta in cells, for panning

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind, poll,
};
use glam::Vec2;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,

    // ── Mouse ──
    /// Last known pointer cell (col, row).
    pub pointer_cell: Option<(u16, u16)>,
    pub left_clicked: bool,
    pub right_clicked: bool,
    /// Wheel notches this frame, positive = up.
    pub scroll: i32,
    /// Middle-drag movement this frame, in cells.
    pub drag: Vec2,
    drag_from: Option<(u16, u16)>,
    /// Pointer moved this frame.
    pub pointer_moved: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            pointer_cell: None,
            left_clicked: false,
            right_clicked: false,
            scroll: 0,
            drag: Vec2::ZERO,
            drag_from: None,
            pointer_moved: false,
        }
    }

    /// Drain all pending terminal events and update key/mouse states.
    /// Call this once per frame, before simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.left_clicked = false;
        self.right_clicked = false;
        self.scroll = 0;
        self.drag = Vec2::ZERO;
        self.pointer_moved = false;

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.apply_key(key),
                Ok(Event::Mouse(mouse)) => self.apply_mouse(mouse),
                _ => {}
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn apply_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held_inner(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn apply_mouse(&mut self, mouse: MouseEvent) {
        let cell = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.left_clicked = true,
            MouseEventKind::Down(MouseButton::Right) => self.right_clicked = true,
            MouseEventKind::Down(MouseButton::Middle) => self.drag_from = Some(cell),
            MouseEventKind::Drag(MouseButton::Middle) => {
                if let Some(from) = self.drag_from {
                    self.drag += Vec2::new(
                        cell.0 as f32 - from.0 as f32,
                        cell.1 as f32 - from.1 as f32,
                    );
                }
                self.drag_from = Some(cell);
            }
            MouseEventKind::Up(MouseButton::Middle) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.scroll += 1,
            MouseEventKind::ScrollDown => self.scroll -= 1,
            _ => {}
        }
        if self.pointer_cell != Some(cell) {
            self.pointer_moved = true;
        }
        self.pointer_cell = Some(cell);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_inner(code)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// First digit key 1..=8 pressed this frame, as a 0-based slot.
    pub fn digit_pressed(&self) -> Option<usize> {
        self.fresh_presses.iter().find_map(|k| match k {
            KeyCode::Char(c @ '1'..='8') => Some(*c as usize - '1' as usize),
            _ => None,
        })
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn is_held_inner(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn clicks_update_pointer_cell() {
        let mut input = InputState::new();
        input.apply_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 10, 4));
        assert!(input.left_clicked);
        assert!(!input.right_clicked);
        assert_eq!(input.pointer_cell, Some((10, 4)));
        assert!(input.pointer_moved);
    }

    #[test]
    fn middle_drag_accumulates_delta() {
        let mut input = InputState::new();
        input.apply_mouse(mouse(MouseEventKind::Down(MouseButton::Middle), 10, 10));
        input.apply_mouse(mouse(MouseEventKind::Drag(MouseButton::Middle), 12, 10));
        input.apply_mouse(mouse(MouseEventKind::Drag(MouseButton::Middle), 13, 8));
        assert_eq!(input.drag, Vec2::new(3.0, -2.0));
        input.apply_mouse(mouse(MouseEventKind::Up(MouseButton::Middle), 13, 8));
        input.apply_mouse(mouse(MouseEventKind::Drag(MouseButton::Middle), 20, 8));
        assert_eq!(input.drag, Vec2::new(3.0, -2.0));
    }

    #[test]
    fn wheel_sums_notches() {
        let mut input = InputState::new();
        input.apply_mouse(mouse(MouseEventKind::ScrollUp, 0, 0));
        input.apply_mouse(mouse(MouseEventKind::ScrollUp, 0, 0));
        input.apply_mouse(mouse(MouseEventKind::ScrollDown, 0, 0));
        assert_eq!(input.scroll, 1);
    }

    #[test]
    fn digits_map_to_slots() {
        let mut input = InputState::new();
        input.apply_key(press('9'));
        assert_eq!(input.digit_pressed(), None);
        input.apply_key(press('3'));
        assert_eq!(input.digit_pressed(), Some(2));
    }
}
