/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move the pointer
///   Right Stick           →  Pan the view
///   A                     →  Commit / pick up / choose
///   B                     →  Open menu / cancel / back
///   L1 / R1               →  Rotate left / right
///   X / Y                 →  Next / previous color
///   Select                →  Toggle connector icons

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
use glam::Vec2;

use crate::config::GamepadConfig;

const STICK_DEADZONE: f32 = 0.25;

/// Pointer speed at full stick deflection, in cells per second.
const POINTER_SPEED: f32 = 40.0;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    commit: Vec<Btn>,
    cancel: Vec<Btn>,
    rotate_left: Vec<Btn>,
    rotate_right: Vec<Btn>,
    color_next: Vec<Btn>,
    color_prev: Vec<Btn>,
    icons: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            commit:       vec![Btn::A],
            cancel:       vec![Btn::B],
            rotate_left:  vec![Btn::L1],
            rotate_right: vec![Btn::R1],
            color_next:   vec![Btn::X],
            color_prev:   vec![Btn::Y],
            icons:        vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad
    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    // Sticks (raw axes, -1..=1, Y up)
    stick_x: f32,
    stick_y: f32,
    pan_x: f32,
    pan_y: f32,

    // Action mapping
    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let parsed = parse_list(names);
            if !parsed.is_empty() { *slot = parsed; }
        }
        let map = &mut self.action_map;
        apply(&mut map.commit, &cfg.commit);
        apply(&mut map.cancel, &cfg.cancel);
        apply(&mut map.rotate_left, &cfg.rotate_left);
        apply(&mut map.rotate_right, &cfg.rotate_right);
        apply(&mut map.color_next, &cfg.color_next);
        apply(&mut map.color_prev, &cfg.color_prev);
        apply(&mut map.icons, &cfg.icons);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool, just_pressed: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => { self.dpad_up.held = held; if just_pressed { self.dpad_up.just_pressed = true; } return; }
            Button::DPadDown  => { self.dpad_down.held = held; if just_pressed { self.dpad_down.just_pressed = true; } return; }
            Button::DPadLeft  => { self.dpad_left.held = held; if just_pressed { self.dpad_left.just_pressed = true; } return; }
            Button::DPadRight => { self.dpad_right.held = held; if just_pressed { self.dpad_right.just_pressed = true; } return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let idx = btn_index(btn);
            self.buttons[idx].held = held;
            if just_pressed {
                self.buttons[idx].just_pressed = true;
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            Axis::RightStickX => self.pan_x = value,
            Axis::RightStickY => self.pan_y = value,
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn commit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.commit)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }
    /// Some(true) = clockwise.
    pub fn rotate_pressed(&self) -> Option<bool> {
        if self.any_just_pressed(&self.action_map.rotate_right) {
            Some(true)
        } else if self.any_just_pressed(&self.action_map.rotate_left) {
            Some(false)
        } else {
            None
        }
    }
    pub fn recolor_pressed(&self) -> i32 {
        if self.any_just_pressed(&self.action_map.color_next) {
            1
        } else if self.any_just_pressed(&self.action_map.color_prev) {
            -1
        } else {
            0
        }
    }
    pub fn icons_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.icons)
    }

    /// Pointer movement for this frame, in cells (screen Y down).
    pub fn pointer_delta(&self, dt: f32) -> Vec2 {
        let mut dir = deadzone(Vec2::new(self.stick_x, -self.stick_y));
        if self.dpad_left.held { dir.x -= 1.0; }
        if self.dpad_right.held { dir.x += 1.0; }
        if self.dpad_up.held { dir.y -= 1.0; }
        if self.dpad_down.held { dir.y += 1.0; }
        // Cells are twice as tall as wide.
        let dir = dir.clamp_length_max(1.0);
        Vec2::new(dir.x * POINTER_SPEED, dir.y * POINTER_SPEED * 0.5) * dt
    }

    /// Right-stick pan as a drag in cells (same sign as a mouse drag).
    pub fn pan_delta(&self) -> Vec2 {
        -deadzone(Vec2::new(self.pan_x, -self.pan_y))
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad_up.just_pressed = false;
        self.dpad_down.just_pressed = false;
        self.dpad_left.just_pressed = false;
        self.dpad_right.just_pressed = false;
    }

    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_up = BtnState::default();
        self.dpad_down = BtnState::default();
        self.dpad_left = BtnState::default();
        self.dpad_right = BtnState::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

fn deadzone(v: Vec2) -> Vec2 {
    if v.length() < STICK_DEADZONE { Vec2::ZERO } else { v }
}
