/// Terminal front end: rendering, keyboard/mouse, gamepad and sound.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
