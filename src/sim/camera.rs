/// Orthographic 2D camera over the build plane.
///
/// `zoom` is the half view height in world units, so the viewport always
/// shows `2 * zoom` units top to bottom regardless of terminal size.
/// Terminal cells are about twice as tall as they are wide, so one world
/// unit spans `CELL_ASPECT` times more columns than rows.

use glam::{Vec2, Vec3};

use crate::config::CameraConfig;

/// Columns per row for a square world unit.
pub const CELL_ASPECT: f32 = 2.0;

/// Shake offset at full trauma, in world units.
const MAX_SHAKE: f32 = 0.35;

#[derive(Clone, Debug)]
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    pan_speed: f32,
    shake_decay: f32,
    /// 0..=1, decays linearly.
    trauma: f32,
    shake_offset: Vec2,
    time: f32,
    /// Viewport size in cells (cols, rows).
    view: (u16, u16),
}

impl Camera {
    pub fn new(cfg: &CameraConfig) -> Self {
        Camera {
            center: Vec2::ZERO,
            zoom: cfg.start_zoom.clamp(cfg.min_zoom, cfg.max_zoom),
            min_zoom: cfg.min_zoom,
            max_zoom: cfg.max_zoom,
            pan_speed: cfg.pan_speed,
            shake_decay: cfg.shake_decay,
            trauma: 0.0,
            shake_offset: Vec2::ZERO,
            time: 0.0,
            view: (80, 24),
        }
    }

    /// Set during render from the terminal size.
    pub fn set_viewport(&mut self, cols: u16, rows: u16) {
        self.view = (cols.max(1), rows.max(1));
    }

    pub fn viewport(&self) -> (u16, u16) {
        self.view
    }

    /// Positive steps zoom in (smaller half height).
    pub fn zoom_by(&mut self, steps: i32) {
        self.zoom = (self.zoom - steps as f32).clamp(self.min_zoom, self.max_zoom);
    }

    /// Drag the view by `delta` screen cells. Screen Y points down.
    pub fn pan(&mut self, delta: Vec2, dt: f32) {
        let world = Vec2::new(-delta.x, delta.y);
        self.center += world * self.pan_speed * self.zoom * dt;
    }

    pub fn shake(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).min(1.0);
    }

    #[cfg(test)]
    pub fn trauma(&self) -> f32 {
        self.trauma
    }

    pub fn tick(&mut self, dt: f32) {
        self.time += dt;
        self.trauma = (self.trauma - self.shake_decay * dt).max(0.0);
        // Squared trauma keeps small shakes subtle.
        let mag = self.trauma * self.trauma * MAX_SHAKE;
        self.shake_offset = Vec2::new((self.time * 47.0).sin(), (self.time * 53.0).cos()) * mag;
    }

    /// World units per terminal row.
    pub fn units_per_row(&self) -> f32 {
        2.0 * self.zoom / self.view.1 as f32
    }

    pub fn units_per_col(&self) -> f32 {
        self.units_per_row() / CELL_ASPECT
    }

    fn eye(&self) -> Vec2 {
        self.center + self.shake_offset
    }

    /// World point at the centre of a screen cell, z = 0.
    pub fn screen_to_world(&self, col: u16, row: u16) -> Vec3 {
        let (cols, rows) = (self.view.0 as f32, self.view.1 as f32);
        let eye = self.eye();
        let x = eye.x + (col as f32 + 0.5 - cols / 2.0) * self.units_per_col();
        let y = eye.y - (row as f32 + 0.5 - rows / 2.0) * self.units_per_row();
        Vec3::new(x, y, 0.0)
    }

    /// Fractional screen position (col, row) of a world point. Flooring
    /// the result gives the cell containing it.
    pub fn world_to_screen(&self, p: Vec3) -> (f32, f32) {
        let (cols, rows) = (self.view.0 as f32, self.view.1 as f32);
        let eye = self.eye();
        let col = (p.x - eye.x) / self.units_per_col() + cols / 2.0;
        let row = -(p.y - eye.y) / self.units_per_row() + rows / 2.0;
        (col, row)
    }
}
