/// Entry point and build loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use glam::Vec2;
use log::LevelFilter;

use config::{BuilderConfig, LogConfig};
use sim::event::BuildEvent;
use sim::step::{self, FrameInput};
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Arrow-key pan, in cells of drag per tick.
const KEY_PAN_CELLS: f32 = 6.0;

fn main() {
    let config = BuilderConfig::load();
    init_logging(&config.log);
    log::info!("snapblocks starting, palette of {} colors", config.palette.len());

    let mut world = WorldState::new(&config);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    if let Some(sfx) = sound.as_ref() {
        sfx.play_pour();
    }

    let result = build_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("build loop failed: {e}");
        eprintln!("Error: {e}");
    }

    log::info!("snapblocks exiting with {} blocks", world.registry.len());
    println!("Built {} blocks.", world.registry.len());
}

/// Log to a file: the terminal belongs to the renderer. `RUST_LOG`
/// overrides the configured level.
fn init_logging(cfg: &LogConfig) {
    let level = cfg.level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Warning: unknown log level '{}', using info", cfg.level);
        LevelFilter::Info
    });
    let file = match File::create(&cfg.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", cfg.file.display());
            return;
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn build_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &BuilderConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad connected");
    }

    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.builder.tick_rate_ms);

    // One-shot input gathered between ticks.
    let mut pending = FrameInput::default();
    // Virtual pointer (viewport cells), driven by mouse or gamepad.
    let mut pointer: Option<Vec2> = None;
    let mut last_frame = Instant::now();

    loop {
        let frame_dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        if kb.any_pressed(&[KeyCode::Esc]) {
            if world.menu.is_open() {
                pending.menu_back = true;
            } else {
                break;
            }
        }

        // ── Pointer ──
        if kb.pointer_moved || kb.left_clicked || kb.right_clicked {
            if let Some((c, r)) = kb.pointer_cell.and_then(|(c, r)| renderer.view_cell(c, r)) {
                pointer = Some(Vec2::new(c as f32, r as f32));
            }
        }
        let pad_move = gp.pointer_delta(frame_dt);
        if pad_move != Vec2::ZERO {
            let (cols, rows) = world.camera.viewport();
            let from = pointer.unwrap_or(Vec2::new(cols as f32 / 2.0, rows as f32 / 2.0));
            let max = Vec2::new(cols.saturating_sub(1) as f32, rows.saturating_sub(1) as f32);
            pointer = Some((from + pad_move).clamp(Vec2::ZERO, max));
        }

        collect_input(&mut pending, &kb, &gp);

        if last_tick.elapsed() >= tick_rate {
            let mut input = std::mem::take(&mut pending);
            input.dt = last_tick.elapsed().as_secs_f32();
            input.pointer_cell = pointer.map(|p| (p.x as u16, p.y as u16));
            input.pointer = input.pointer_cell
                .map(|(c, r)| world.camera.screen_to_world(c, r));

            let events = step::step(world, &input);
            process_sound_events(sound, &events);
            for event in &events {
                log::trace!("{event:?}");
            }

            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Fold this frame's presses into the pending tick input.
fn collect_input(pending: &mut FrameInput, kb: &InputState, gp: &GamepadState) {
    pending.primary |= kb.left_clicked || gp.commit_pressed();
    pending.secondary |= kb.right_clicked || gp.cancel_pressed();

    if kb.was_pressed(KeyCode::Char('R')) {
        pending.rotate = Some(true);
    } else if kb.was_pressed(KeyCode::Char('r')) {
        pending.rotate = Some(false);
    } else if let Some(cw) = gp.rotate_pressed() {
        pending.rotate = Some(cw);
    }

    if kb.was_pressed(KeyCode::Char('c')) {
        pending.recolor += 1;
    }
    if kb.was_pressed(KeyCode::Char('C')) {
        pending.recolor -= 1;
    }
    pending.recolor += gp.recolor_pressed();

    pending.toggle_icons |= kb.any_pressed(KEYS_ICONS) || gp.icons_pressed();
    pending.zoom += kb.scroll;
    if let Some(slot) = kb.digit_pressed() {
        pending.menu_choice = Some(slot);
    }

    let mut pan = kb.drag + gp.pan_delta();
    if kb.any_held(&[KeyCode::Left]) { pan.x += KEY_PAN_CELLS; }
    if kb.any_held(&[KeyCode::Right]) { pan.x -= KEY_PAN_CELLS; }
    if kb.any_held(&[KeyCode::Up]) { pan.y += KEY_PAN_CELLS; }
    if kb.any_held(&[KeyCode::Down]) { pan.y -= KEY_PAN_CELLS; }
    // Held keys and sticks report every frame; keep the strongest, don't sum.
    if pan.length_squared() > pending.pan.length_squared() {
        pending.pan = pan;
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[BuildEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            e if e.is_menu() => sfx.play_click(),
            BuildEvent::Snapped { .. } => sfx.play_snap(),
            BuildEvent::PlacedFree { .. } => sfx.play_place(),
            BuildEvent::PlacementRejected => sfx.play_reject(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_ICONS: &[KeyCode] = &[KeyCode::Char('i'), KeyCode::Char('I')];
