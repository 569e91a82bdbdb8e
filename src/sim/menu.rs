/// Radial menu: a small stack of pages laid out in a ring of buttons.
///
/// The tree is plain data built once from the catalog. `RadialMenu` is
/// the navigation state on top of it: which pages are stacked, where the
/// ring is anchored on screen, and how far the fade-in has progressed.

use super::catalog::{Catalog, TemplateId};

/// Buttons per ring.
pub const RADIAL_SLOTS: usize = 8;

/// Ring radius in terminal cells (columns, rows).
const RING_COLS: f32 = 14.0;
const RING_ROWS: f32 = 6.0;

/// Fade-in speed, in full opacity per second.
const FADE_RATE: f32 = 2.0;

/// Half-width of a button's hit box, in columns.
pub const BUTTON_HALF_W: i32 = 6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MenuId(pub usize);

pub const ROOT: MenuId = MenuId(0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// Spawn the template chosen last time.
    CreateLastBlock,
    /// Step to the next palette color.
    SetColor,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    SubMenu(MenuId),
    Block(TemplateId),
    Command(Command),
}

#[derive(Clone, Debug)]
pub struct MenuButton {
    pub label: String,
    pub entry: MenuEntry,
}

#[derive(Clone, Debug)]
pub struct MenuPage {
    pub title: String,
    pub buttons: Vec<MenuButton>,
}

#[derive(Clone, Debug)]
pub struct MenuTree {
    pages: Vec<MenuPage>,
}

impl MenuTree {
    /// Root page: one sub-menu per catalog category, then the commands.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let categories = catalog.categories();
        let room = RADIAL_SLOTS - 2;
        if categories.len() > room {
            log::warn!("menu: {} categories, only {room} fit the ring", categories.len());
        }

        let mut pages = vec![MenuPage { title: "Build".into(), buttons: vec![] }];
        for category in categories.iter().take(room) {
            let id = MenuId(pages.len());
            let buttons: Vec<MenuButton> = catalog.iter()
                .filter(|(_, t)| t.category == *category)
                .take(RADIAL_SLOTS)
                .map(|(tid, t)| MenuButton { label: t.name.replace('_', " "), entry: MenuEntry::Block(tid) })
                .collect();
            pages.push(MenuPage { title: category.to_string(), buttons });
            pages[ROOT.0].buttons.push(MenuButton {
                label: category.to_string(),
                entry: MenuEntry::SubMenu(id),
            });
        }
        pages[ROOT.0].buttons.push(MenuButton {
            label: "Repeat".into(),
            entry: MenuEntry::Command(Command::CreateLastBlock),
        });
        pages[ROOT.0].buttons.push(MenuButton {
            label: "Color".into(),
            entry: MenuEntry::Command(Command::SetColor),
        });

        MenuTree { pages }
    }

    pub fn page(&self, id: MenuId) -> Option<&MenuPage> {
        self.pages.get(id.0)
    }
}

/// What a button press asks the caller to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuAction {
    /// Moved to another page; menu stays open.
    Navigate(MenuId),
    Spawn(TemplateId),
    Repeat,
    CycleColor,
    /// Empty slot, or a command that cannot run yet.
    Ignored,
}

#[derive(Clone, Debug, Default)]
pub struct RadialMenu {
    stack: Vec<MenuId>,
    /// Screen cell (col, row) the ring is centred on.
    pub anchor: (u16, u16),
    /// 0.0 (invisible) to 1.0 (fully shown).
    pub fade: f32,
}

impl RadialMenu {
    pub fn new() -> Self {
        RadialMenu::default()
    }

    pub fn is_open(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn current(&self) -> Option<MenuId> {
        self.stack.last().copied()
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Show the root page around `anchor`.
    pub fn open(&mut self, anchor: (u16, u16)) {
        self.stack.clear();
        self.stack.push(ROOT);
        self.anchor = anchor;
        self.fade = 0.0;
    }

    pub fn close(&mut self) {
        self.stack.clear();
        self.fade = 0.0;
    }

    /// Pop one page. Returns false once the menu has closed.
    pub fn back(&mut self) -> bool {
        self.stack.pop();
        if self.stack.is_empty() {
            self.fade = 0.0;
            return false;
        }
        true
    }

    /// Press button `slot` on the current page.
    ///
    /// Terminal choices close the menu. `Repeat` is only honoured when
    /// `can_repeat`; otherwise the menu stays up.
    pub fn press(&mut self, tree: &MenuTree, slot: usize, can_repeat: bool) -> MenuAction {
        let Some(page) = self.current().and_then(|id| tree.page(id)) else {
            return MenuAction::Ignored;
        };
        let Some(button) = page.buttons.get(slot) else {
            return MenuAction::Ignored;
        };

        let action = match button.entry {
            MenuEntry::SubMenu(id) => {
                self.stack.push(id);
                return MenuAction::Navigate(id);
            }
            MenuEntry::Block(tid) => MenuAction::Spawn(tid),
            MenuEntry::Command(Command::CreateLastBlock) if !can_repeat => return MenuAction::Ignored,
            MenuEntry::Command(Command::CreateLastBlock) => MenuAction::Repeat,
            MenuEntry::Command(Command::SetColor) => MenuAction::CycleColor,
        };
        self.close();
        action
    }

    pub fn tick(&mut self, dt: f32) {
        if self.is_open() {
            self.fade = (self.fade + FADE_RATE * dt).min(1.0);
        }
    }

    /// Button slot under a screen cell, if any.
    pub fn hit_test(&self, tree: &MenuTree, cell: (u16, u16)) -> Option<usize> {
        let page = tree.page(self.current()?)?;
        let (ax, ay) = (self.anchor.0 as i32, self.anchor.1 as i32);
        (0..page.buttons.len()).find(|&i| {
            let (dx, dy) = slot_offset(i);
            let (cx, cy) = (ax + dx, ay + dy);
            cell.1 as i32 == cy && (cell.0 as i32 - cx).abs() <= BUTTON_HALF_W
        })
    }
}

/// Screen offset (cols, rows) of button `i`, clockwise from the top.
pub fn slot_offset(i: usize) -> (i32, i32) {
    let angle = (i % RADIAL_SLOTS) as f32 * std::f32::consts::TAU / RADIAL_SLOTS as f32;
    let dx = (angle.sin() * RING_COLS).round() as i32;
    let dy = (-angle.cos() * RING_ROWS).round() as i32;
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Catalog, MenuTree, RadialMenu) {
        let cat = Catalog::default();
        let tree = MenuTree::from_catalog(&cat);
        (cat, tree, RadialMenu::new())
    }

    #[test]
    fn root_lists_categories_then_commands() {
        let (_, tree, _) = setup();
        let root = tree.page(ROOT).expect("root page");
        let labels: Vec<&str> = root.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Basic", "Joints", "Ends", "Repeat", "Color"]);
    }

    #[test]
    fn navigate_then_back_closes_at_root() {
        let (_, tree, mut menu) = setup();
        menu.open((40, 12));
        assert_eq!(menu.press(&tree, 0, false), MenuAction::Navigate(MenuId(1)));
        assert_eq!(menu.depth(), 2);
        assert!(menu.back());
        assert_eq!(menu.current(), Some(ROOT));
        assert!(!menu.back());
        assert!(!menu.is_open());
    }

    #[test]
    fn block_choice_closes_menu() {
        let (cat, tree, mut menu) = setup();
        menu.open((40, 12));
        menu.press(&tree, 0, false);
        let square = cat.find("Square").expect("square");
        assert_eq!(menu.press(&tree, 0, false), MenuAction::Spawn(square));
        assert!(!menu.is_open());
    }

    #[test]
    fn repeat_without_history_keeps_menu_open() {
        let (_, tree, mut menu) = setup();
        menu.open((40, 12));
        assert_eq!(menu.press(&tree, 3, false), MenuAction::Ignored);
        assert!(menu.is_open());
        assert_eq!(menu.press(&tree, 3, true), MenuAction::Repeat);
        assert!(!menu.is_open());
    }

    #[test]
    fn empty_slot_is_ignored() {
        let (_, tree, mut menu) = setup();
        menu.open((40, 12));
        assert_eq!(menu.press(&tree, 7, true), MenuAction::Ignored);
        assert!(menu.is_open());
    }

    #[test]
    fn fade_ramps_and_resets() {
        let (_, _, mut menu) = setup();
        menu.open((0, 0));
        menu.tick(0.25);
        assert!((menu.fade - 0.5).abs() < 1e-6);
        menu.tick(1.0);
        assert_eq!(menu.fade, 1.0);
        menu.close();
        assert_eq!(menu.fade, 0.0);
    }

    #[test]
    fn hit_test_matches_slot_layout() {
        let (_, tree, mut menu) = setup();
        menu.open((40, 12));
        assert_eq!(slot_offset(0), (0, -6));
        assert_eq!(menu.hit_test(&tree, (42, 6)), Some(0));
        let (dx, dy) = slot_offset(2);
        assert_eq!(menu.hit_test(&tree, ((40 + dx) as u16, (12 + dy) as u16)), Some(2));
        assert_eq!(menu.hit_test(&tree, (40, 12)), None);
    }
}
