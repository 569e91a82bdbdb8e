/// The step function: advances the session by one tick.
///
/// Processing order:
///   1. Timers (message, animation)
///   2. View: icon toggle, zoom, pan
///   3. Menu, if open (swallows world clicks)
///   4. Otherwise Idle or Holding rules for the ghost
///   5. Menu fade + camera shake decay
///
/// All input arrives through `FrameInput`; nothing here reads the terminal
/// or a clock.

use glam::{Vec2, Vec3};

use crate::domain::placement::PlacementOutcome;
use super::event::BuildEvent;
use super::menu::MenuAction;
use super::world::WorldState;

/// Trauma added by a successful snap.
const SNAP_SHAKE: f32 = 0.6;

/// How long HUD messages stay up, in ticks.
const MESSAGE_TICKS: u32 = 45;

/// One tick of already-decoded input.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    /// Pointer on the build plane (z = 0), if known.
    pub pointer: Option<Vec3>,
    /// Pointer screen cell, for menu anchoring and hit-testing.
    pub pointer_cell: Option<(u16, u16)>,
    /// Commit / pick up / choose.
    pub primary: bool,
    /// Open menu / cancel / back.
    pub secondary: bool,
    /// Some(true) = clockwise.
    pub rotate: Option<bool>,
    /// +1 next color, -1 previous, 0 none.
    pub recolor: i32,
    pub toggle_icons: bool,
    /// Wheel notches, positive = in.
    pub zoom: i32,
    /// Pan drag in screen cells.
    pub pan: Vec2,
    /// Direct slot pick (number keys).
    pub menu_choice: Option<usize>,
    pub menu_back: bool,
    /// Seconds since the previous tick.
    pub dt: f32,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: &FrameInput) -> Vec<BuildEvent> {
    let mut events: Vec<BuildEvent> = Vec::new();
    world.tick += 1;
    world.anim_tick = world.anim_tick.wrapping_add(1);

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    if input.pointer_cell.is_some() {
        world.pointer_cell = input.pointer_cell;
    }

    resolve_view(world, input, &mut events);

    if world.menu.is_open() {
        resolve_menu(world, input, &mut events);
    } else if world.builder.has_ghost() {
        resolve_holding(world, input, &mut events);
    } else {
        resolve_idle(world, input, &mut events);
    }

    world.menu.tick(input.dt);
    world.camera.tick(input.dt);

    events
}

// ══════════════════════════════════════════════════════════════
// View
// ══════════════════════════════════════════════════════════════

fn resolve_view(world: &mut WorldState, input: &FrameInput, events: &mut Vec<BuildEvent>) {
    if input.toggle_icons {
        let visible = world.builder.toggle_icons(&mut world.registry);
        events.push(BuildEvent::IconsToggled { visible });
    }
    // The color modifier owns the wheel on the same tick.
    if input.zoom != 0 && input.recolor == 0 {
        world.camera.zoom_by(input.zoom);
    }
    if input.pan != Vec2::ZERO {
        world.camera.pan(input.pan, input.dt);
    }
}

// ══════════════════════════════════════════════════════════════
// Menu
// ══════════════════════════════════════════════════════════════

fn resolve_menu(world: &mut WorldState, input: &FrameInput, events: &mut Vec<BuildEvent>) {
    if input.secondary || input.menu_back {
        if world.menu.back() {
            events.push(BuildEvent::MenuNavigated);
        } else {
            events.push(BuildEvent::MenuClosed);
        }
        return;
    }

    let clicked = if input.primary {
        input.pointer_cell.and_then(|cell| world.menu.hit_test(&world.menu_tree, cell))
    } else {
        None
    };
    let Some(slot) = input.menu_choice.or(clicked) else { return };

    let can_repeat = world.builder.last_template().is_some();
    let at = spawn_point(world, input);
    match world.menu.press(&world.menu_tree, slot, can_repeat) {
        MenuAction::Navigate(_) => events.push(BuildEvent::MenuNavigated),
        MenuAction::Spawn(template) => {
            events.push(BuildEvent::MenuClosed);
            if let Some(id) = world.builder.create_ghost(&mut world.registry, template, at) {
                events.push(BuildEvent::GhostSpawned { id });
            }
        }
        MenuAction::Repeat => {
            events.push(BuildEvent::MenuClosed);
            if let Some(id) = world.builder.repeat_last(&mut world.registry, at) {
                events.push(BuildEvent::GhostSpawned { id });
            }
        }
        MenuAction::CycleColor => {
            events.push(BuildEvent::MenuClosed);
            world.builder.cycle_color(&mut world.registry, true);
            events.push(BuildEvent::Recolored { index: world.builder.color_index() });
        }
        MenuAction::Ignored => {}
    }
}

/// Pointer if we have one, else the middle of the view.
fn spawn_point(world: &WorldState, input: &FrameInput) -> Vec3 {
    input.pointer.unwrap_or_else(|| world.camera.center.extend(0.0))
}

// ══════════════════════════════════════════════════════════════
// Idle
// ══════════════════════════════════════════════════════════════

fn resolve_idle(world: &mut WorldState, input: &FrameInput, events: &mut Vec<BuildEvent>) {
    if input.secondary {
        let anchor = input.pointer_cell.unwrap_or_else(|| {
            let (cols, rows) = world.camera.viewport();
            (cols / 2, rows / 2)
        });
        world.menu.open(anchor);
        events.push(BuildEvent::MenuOpened);
        return;
    }

    if input.primary {
        if let Some(pointer) = input.pointer {
            if let Some(id) = world.builder.pick_up(&mut world.registry, pointer) {
                events.push(BuildEvent::GhostPickedUp { id });
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Holding
// ══════════════════════════════════════════════════════════════

fn resolve_holding(world: &mut WorldState, input: &FrameInput, events: &mut Vec<BuildEvent>) {
    if let Some(pointer) = input.pointer {
        world.builder.track_pointer(&mut world.registry, pointer);
    }

    if let Some(clockwise) = input.rotate {
        if let Some(direction) = world.builder.rotate(&mut world.registry, clockwise) {
            events.push(BuildEvent::Rotated { direction });
        }
    }

    if input.recolor != 0 {
        world.builder.cycle_color(&mut world.registry, input.recolor > 0);
        events.push(BuildEvent::Recolored { index: world.builder.color_index() });
    }

    if input.secondary {
        if world.builder.cancel(&mut world.registry) {
            events.push(BuildEvent::GhostCancelled);
        }
        return;
    }

    if input.primary {
        let Some(id) = world.builder.ghost() else { return };
        match world.builder.commit(&mut world.registry) {
            Some(PlacementOutcome::Connected) => {
                world.camera.shake(SNAP_SHAKE);
                events.push(BuildEvent::Snapped { id });
            }
            Some(PlacementOutcome::PlacedFree) => {
                events.push(BuildEvent::PlacedFree { id });
            }
            Some(PlacementOutcome::Rejected) => {
                world.set_message("No room here", MESSAGE_TICKS);
                events.push(BuildEvent::PlacementRejected);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;

    fn world() -> WorldState {
        WorldState::new(&BuilderConfig::default())
    }

    fn tick() -> FrameInput {
        FrameInput { dt: 0.033, ..FrameInput::default() }
    }

    fn at(x: f32, y: f32) -> Option<Vec3> {
        Some(Vec3::new(x, y, 0.0))
    }

    /// Spawn a square through the menu at `pointer`.
    fn spawn_square(w: &mut WorldState, x: f32, y: f32) -> Vec<BuildEvent> {
        step(w, &FrameInput { secondary: true, pointer: at(x, y), ..tick() });
        step(w, &FrameInput { menu_choice: Some(0), pointer: at(x, y), ..tick() });
        step(w, &FrameInput { menu_choice: Some(0), pointer: at(x, y), ..tick() })
    }

    /// Free-place a square that lands on (0.5, -0.5).
    fn place_first(w: &mut WorldState) {
        spawn_square(w, 0.2, -0.2);
        let ev = step(w, &FrameInput { primary: true, pointer: at(0.2, -0.2), ..tick() });
        assert!(matches!(ev[..], [BuildEvent::PlacedFree { .. }]));
        let (_, first) = w.registry.iter().next().expect("placed");
        assert_eq!(first.position, Vec3::new(0.5, -0.5, 0.0));
    }

    #[test]
    fn right_click_opens_menu_at_pointer() {
        let mut w = world();
        let ev = step(&mut w, &FrameInput { secondary: true, pointer_cell: Some((30, 9)), ..tick() });
        assert_eq!(ev, vec![BuildEvent::MenuOpened]);
        assert!(w.menu.is_open());
        assert_eq!(w.menu.anchor, (30, 9));
    }

    #[test]
    fn menu_choice_spawns_ghost_at_pointer() {
        let mut w = world();
        let ev = spawn_square(&mut w, 2.0, 1.0);
        assert_eq!(ev.len(), 2);
        assert_eq!(ev[0], BuildEvent::MenuClosed);
        let BuildEvent::GhostSpawned { id } = ev[1] else { panic!("expected spawn, got {ev:?}") };
        assert!(!w.menu.is_open());
        assert_eq!(w.builder.ghost(), Some(id));
        assert_eq!(w.registry.get(id).map(|b| b.position), at(2.0, 1.0));
    }

    #[test]
    fn back_walks_up_then_closes() {
        let mut w = world();
        step(&mut w, &FrameInput { secondary: true, ..tick() });
        step(&mut w, &FrameInput { menu_choice: Some(1), ..tick() });
        assert_eq!(step(&mut w, &FrameInput { menu_back: true, ..tick() }), vec![BuildEvent::MenuNavigated]);
        assert_eq!(step(&mut w, &FrameInput { secondary: true, ..tick() }), vec![BuildEvent::MenuClosed]);
        assert!(!w.menu.is_open());
    }

    #[test]
    fn snap_shakes_camera() {
        let mut w = world();
        place_first(&mut w);
        assert_eq!(w.camera.trauma(), 0.0);

        spawn_square(&mut w, 1.8, -0.4);
        let ev = step(&mut w, &FrameInput { primary: true, pointer: at(1.8, -0.4), ..tick() });
        assert!(matches!(ev[..], [BuildEvent::Snapped { .. }]));
        assert!(w.camera.trauma() > 0.0);
        assert!(!w.builder.has_ghost());
    }

    #[test]
    fn rejected_commit_keeps_holding() {
        let mut w = world();
        place_first(&mut w);
        spawn_square(&mut w, 0.6, -0.4);
        let ev = step(&mut w, &FrameInput { primary: true, pointer: at(0.6, -0.4), ..tick() });
        assert_eq!(ev, vec![BuildEvent::PlacementRejected]);
        assert!(w.builder.has_ghost());
        assert_eq!(w.registry.len(), 2);
        assert!(!w.message.is_empty());
    }

    #[test]
    fn right_click_while_holding_cancels() {
        let mut w = world();
        spawn_square(&mut w, 0.0, 0.0);
        let ev = step(&mut w, &FrameInput { secondary: true, ..tick() });
        assert_eq!(ev, vec![BuildEvent::GhostCancelled]);
        assert!(w.registry.is_empty());
        assert!(!w.menu.is_open());
    }

    #[test]
    fn menu_swallows_world_clicks() {
        let mut w = world();
        place_first(&mut w);

        step(&mut w, &FrameInput { secondary: true, pointer_cell: Some((40, 12)), ..tick() });
        // Click on the placed block, far from any button.
        let ev = step(&mut w, &FrameInput {
            primary: true,
            pointer: at(0.5, -0.5),
            pointer_cell: Some((40, 12)),
            ..tick()
        });
        assert!(ev.is_empty());
        assert!(w.menu.is_open());
        assert!(!w.builder.has_ghost());
    }

    #[test]
    fn left_click_on_block_picks_it_up() {
        let mut w = world();
        place_first(&mut w);
        let ev = step(&mut w, &FrameInput { primary: true, pointer: at(2.5, 2.5), ..tick() });
        assert!(ev.is_empty());
        let ev = step(&mut w, &FrameInput { primary: true, pointer: at(0.5, -0.5), ..tick() });
        assert!(matches!(ev[..], [BuildEvent::GhostPickedUp { .. }]));
        assert!(w.builder.has_ghost());
    }

    #[test]
    fn color_command_recolors_without_spawning() {
        let mut w = world();
        assert_eq!(w.builder.color_index(), 0);
        step(&mut w, &FrameInput { secondary: true, ..tick() });
        // Root page: three categories, then Repeat, then Color.
        let ev = step(&mut w, &FrameInput { menu_choice: Some(4), pointer: at(2.0, 2.0), ..tick() });
        assert_eq!(ev, vec![
            BuildEvent::MenuClosed,
            BuildEvent::Recolored { index: 1 },
        ]);
        assert_eq!(w.builder.color_index(), 1);
        assert!(!w.menu.is_open());
        assert!(!w.builder.has_ghost());
        assert!(w.registry.is_empty());
    }

    #[test]
    fn rotate_and_recolor_while_holding() {
        let mut w = world();
        spawn_square(&mut w, 0.0, 0.0);
        let ev = step(&mut w, &FrameInput { rotate: Some(false), recolor: -1, ..tick() });
        assert_eq!(ev.len(), 2);
        assert!(matches!(ev[0], BuildEvent::Rotated { .. }));
        assert!(matches!(ev[1], BuildEvent::Recolored { .. }));
    }

    #[test]
    fn zoom_ignored_while_recoloring() {
        let mut w = world();
        let z = w.camera.zoom;
        step(&mut w, &FrameInput { zoom: 1, recolor: 1, ..tick() });
        assert_eq!(w.camera.zoom, z);
        step(&mut w, &FrameInput { zoom: 1, ..tick() });
        assert_eq!(w.camera.zoom, z - 1.0);
    }

    #[test]
    fn repeat_command_respawns_last_block() {
        let mut w = world();
        place_first(&mut w);

        step(&mut w, &FrameInput { secondary: true, ..tick() });
        let ev = step(&mut w, &FrameInput { menu_choice: Some(3), pointer: at(6.0, 0.0), ..tick() });
        assert!(matches!(ev[..], [BuildEvent::MenuClosed, BuildEvent::GhostSpawned { .. }]));
        assert_eq!(w.registry.len(), 2);
    }
}
