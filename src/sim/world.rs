/// WorldState: everything the builder session owns.
///
/// ## Ownership
///
/// - `registry` owns every block, the ghost included.
/// - `builder` holds the ghost's `BlockId` plus the remembered direction,
///   color and last template. It also owns the catalog and palette.
/// - `menu` is pure navigation state over `menu_tree`.
/// - `camera` maps screen cells to the build plane.
///
/// `step()` is the only writer during a session; the renderer only reads.

use crate::config::BuilderConfig;
use crate::domain::color::Palette;
use super::builder::BlockBuilder;
use super::camera::Camera;
use super::catalog::Catalog;
use super::menu::{MenuTree, RadialMenu};
use super::registry::Registry;

pub struct WorldState {
    // ── Scene ──
    pub registry: Registry,
    pub builder: BlockBuilder,

    // ── Menu ──
    pub menu: RadialMenu,
    pub menu_tree: MenuTree,

    // ── View ──
    pub camera: Camera,
    /// Last pointer cell seen by `step`, viewport-relative.
    pub pointer_cell: Option<(u16, u16)>,

    // ── Meta ──
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,

    // ── Animation ──
    pub anim_tick: u32,
}

// ── Construction ──

impl WorldState {
    pub fn new(cfg: &BuilderConfig) -> Self {
        WorldState::with_parts(Catalog::default(), cfg.palette.clone(), cfg)
    }

    pub fn with_parts(catalog: Catalog, palette: Palette, cfg: &BuilderConfig) -> Self {
        let menu_tree = MenuTree::from_catalog(&catalog);
        WorldState {
            registry: Registry::new(),
            builder: BlockBuilder::new(catalog, palette, cfg.builder.show_icons),
            menu: RadialMenu::new(),
            menu_tree,
            camera: Camera::new(&cfg.camera),
            pointer_cell: None,
            tick: 0,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// One-word state for the HUD.
    pub fn state_label(&self) -> &'static str {
        if self.menu.is_open() {
            "MENU"
        } else if self.builder.has_ghost() {
            "HOLDING"
        } else {
            "IDLE"
        }
    }
}
