/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0          HUD (swatch, direction, state, zoom)
///   rows 1..h-2    build plane through the camera
///   row h-2        message bar
///   row h-1        help line
///
/// Pointer cells handed to the simulation are relative to the build
/// plane viewport, i.e. `VIEW_ROW` is subtracted from terminal rows.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::block::Block;
use crate::domain::color::Rgb;
use crate::domain::connector::Polarity;
use crate::sim::menu::{slot_offset, BUTTON_HALF_W};
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// the inter-row gap pixels on VTE terminals the same color as the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("?")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Background color currently at (x, y), for glyphs drawn on top.
    fn bg_at(&self, x: usize, y: usize) -> Color {
        self.get(x, y).bg
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// First terminal row of the build plane.
pub const VIEW_ROW: u16 = 1;

/// Rows not given to the build plane: HUD + message + help.
const RESERVED_ROWS: u16 = 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const DOT_FG: Color = Color::Rgb { r: 60, g: 60, b: 80 };
const AXIS_FG: Color = Color::Rgb { r: 90, g: 90, b: 120 };
const POS_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const NEG_FG: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const BUTTON_BG: Rgb = Rgb::new(50, 60, 110);
const BUTTON_FG: Rgb = Rgb::new(230, 230, 240);

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Terminal cell → build-plane viewport cell. `None` on HUD / footer rows.
    pub fn view_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        let view_h = (self.term_h as u16).saturating_sub(RESERVED_ROWS);
        if row < VIEW_ROW || row >= VIEW_ROW + view_h {
            return None;
        }
        Some((col, row - VIEW_ROW))
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        world.camera.set_viewport(tw, th.saturating_sub(RESERVED_ROWS));

        self.front.clear();
        self.compose_grid(world);
        self.compose_blocks(world);
        self.compose_icons(world);
        self.compose_pointer(world);
        if world.menu.is_open() {
            self.compose_menu(world);
        }
        self.compose_hud(world);
        self.compose_footer(world);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // Do NOT use ResetColor here: the terminal default may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Plane cell (view-relative) → buffer position, if on the plane.
    fn plane_pos(&self, w: &WorldState, col: i32, row: i32) -> Option<(usize, usize)> {
        let (cols, rows) = w.camera.viewport();
        if col < 0 || row < 0 || col >= cols as i32 || row >= rows as i32 {
            return None;
        }
        Some((col as usize, row as usize + VIEW_ROW as usize))
    }

    /// Lattice dots at integer coordinates, thinned out when zoomed far.
    fn compose_grid(&mut self, w: &WorldState) {
        let cam = &w.camera;
        let (cols, rows) = cam.viewport();
        let step = if 1.0 / cam.units_per_row() >= 1.5 { 1 } else { 5 };

        let top_left = cam.screen_to_world(0, 0);
        let bottom_right = cam.screen_to_world(cols.saturating_sub(1), rows.saturating_sub(1));
        let (x0, x1) = (top_left.x.floor() as i32, bottom_right.x.ceil() as i32);
        let (y0, y1) = (bottom_right.y.floor() as i32, top_left.y.ceil() as i32);

        for gy in y0..=y1 {
            if gy.rem_euclid(step) != 0 { continue; }
            for gx in x0..=x1 {
                if gx.rem_euclid(step) != 0 { continue; }
                let (c, r) = cam.world_to_screen(glam::Vec3::new(gx as f32, gy as f32, 0.0));
                if let Some((x, y)) = self.plane_pos(w, c.floor() as i32, r.floor() as i32) {
                    let (ch, fg) = if gx == 0 && gy == 0 { ('+', AXIS_FG) } else { ('·', DOT_FG) };
                    self.front.set(x, y, Cell::from_char(ch, fg, Color::Reset));
                }
            }
        }
    }

    fn compose_blocks(&mut self, w: &WorldState) {
        let ghost = w.builder.ghost();
        for (id, block) in w.registry.iter() {
            if Some(id) != ghost {
                self.compose_block(w, block, false);
            }
        }
        // Ghost last, on top of everything it hovers over.
        if let Some(block) = ghost.and_then(|id| w.registry.get(id)) {
            self.compose_block(w, block, true);
        }
    }

    fn compose_block(&mut self, w: &WorldState, block: &Block, is_ghost: bool) {
        let cam = &w.camera;
        let bounds = block.body_bounds();
        let (c0, r0) = cam.world_to_screen(glam::Vec3::new(bounds.min.x, bounds.max.y, 0.0));
        let (c1, r1) = cam.world_to_screen(glam::Vec3::new(bounds.max.x, bounds.min.y, 0.0));
        let (c0, r0) = (c0.floor() as i32, r0.floor() as i32);
        let (c1, r1) = (c1.ceil() as i32, r1.ceil() as i32);

        let blink = (w.anim_tick / 8) % 2 == 0;
        let color = if is_ghost { block.color.dimmed(0.6) } else { block.color };
        let bg = to_color(color);
        let edge_fg = to_color(block.color);

        for row in r0..=r1 {
            for col in c0..=c1 {
                let Some((x, y)) = self.plane_pos(w, col, row) else { continue };
                let p = cam.screen_to_world(col as u16, row as u16);
                if !bounds.contains_xy(p.x, p.y) {
                    continue;
                }
                let edge = !bounds.contains_xy(p.x - cam.units_per_col(), p.y)
                    || !bounds.contains_xy(p.x + cam.units_per_col(), p.y)
                    || !bounds.contains_xy(p.x, p.y - cam.units_per_row())
                    || !bounds.contains_xy(p.x, p.y + cam.units_per_row());
                let cell = if is_ghost && edge {
                    let ch = if blink { '░' } else { '▒' };
                    Cell::from_char(ch, edge_fg, bg)
                } else {
                    Cell::from_char(' ', Color::White, bg)
                };
                self.front.set(x, y, cell);
            }
        }
    }

    fn compose_icons(&mut self, w: &WorldState) {
        let cam = &w.camera;
        for (_, block) in w.registry.iter() {
            if !block.icons_visible() { continue; }
            for c in block.connectors() {
                let p = c.world_position(block.position, block.direction);
                let (col, row) = cam.world_to_screen(p);
                let Some((x, y)) = self.plane_pos(w, col.floor() as i32, row.floor() as i32) else { continue };
                let fg = match c.polarity {
                    Polarity::Positive => POS_FG,
                    Polarity::Negative => NEG_FG,
                };
                let bg = self.front.bg_at(x, y);
                self.front.set(x, y, Cell::from_char(c.polarity.glyph(), fg, bg));
            }
        }
    }

    fn compose_pointer(&mut self, w: &WorldState) {
        if w.builder.has_ghost() { return; }
        let Some((col, row)) = w.pointer_cell else { return };
        if let Some((x, y)) = self.plane_pos(w, col as i32, row as i32) {
            let bg = self.front.bg_at(x, y);
            self.front.set(x, y, Cell::from_char('┼', Color::White, bg));
        }
    }

    fn compose_menu(&mut self, w: &WorldState) {
        let Some(page) = w.menu.current().and_then(|id| w.menu_tree.page(id)) else { return };
        let fade = w.menu.fade;
        let bg = to_color(lerp_rgb(base_rgb(), BUTTON_BG, fade));
        let fg = to_color(lerp_rgb(base_rgb(), BUTTON_FG, fade));
        let (ax, ay) = (w.menu.anchor.0 as i32, w.menu.anchor.1 as i32);

        let title = format!(" {} ", page.title);
        let tx = ax - title.chars().count() as i32 / 2;
        if let Some((x, y)) = self.plane_pos(w, tx.max(0), ay) {
            self.front.put_str(x, y, &title, fg, Color::Reset);
        }

        let width = (BUTTON_HALF_W * 2 + 1) as usize;
        for (i, button) in page.buttons.iter().enumerate() {
            let (dx, dy) = slot_offset(i);
            let (cx, cy) = (ax + dx, ay + dy);
            let mut label = format!("{} {}", i + 1, button.label);
            label.truncate(width);
            let text = format!("{label:^width$}");
            let left = cx - BUTTON_HALF_W;
            for (k, ch) in text.chars().enumerate() {
                if let Some((x, y)) = self.plane_pos(w, left + k as i32, cy) {
                    self.front.set(x, y, Cell::from_char(ch, fg, bg));
                }
            }
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        self.front.fill_row(0, HUD_BG);
        self.front.put_str(0, 0, " SNAPBLOCKS ", Color::White, HUD_BG);
        self.front.put_str(12, 0, "■■", to_color(w.builder.color()), HUD_BG);
        let hud = format!(
            " {:<5}  {:<7}  zoom:{:<3}  blocks:{}  icons:{}",
            w.builder.direction().label(),
            w.state_label(),
            w.camera.zoom as i32,
            w.registry.len(),
            if w.builder.show_icons() { "on" } else { "off" },
        );
        self.front.put_str(14, 0, &hud, Color::White, HUD_BG);
    }

    fn compose_footer(&mut self, w: &WorldState) {
        let h = self.front.height;
        if h < RESERVED_ROWS as usize { return; }

        let msg_row = h - 2;
        if !w.message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }

        let help = " LMB:pick/place  RMB:menu/cancel  r/R:rotate  c/C:color  i:icons  wheel:zoom  MMB/arrows:pan  q:quit";
        self.front.put_str(0, h - 1, help, Color::DarkGrey, Color::Reset);
    }
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

fn base_rgb() -> Rgb {
    match Cell::BASE_BG {
        Color::Rgb { r, g, b } => Rgb::new(r, g, b),
        _ => Rgb::new(0, 0, 0),
    }
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}
