/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::color::{Palette, Rgb};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct BuilderConfig {
    pub builder: BuilderSettings,
    pub palette: Palette,
    pub camera: CameraConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct BuilderSettings {
    pub tick_rate_ms: u64,
    /// Connector icons visible at start-up.
    pub show_icons: bool,
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub start_zoom: f32,
    /// Pan speed factor, scaled by zoom.
    pub pan_speed: f32,
    /// Shake trauma lost per second.
    pub shake_decay: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub commit: Vec<String>,
    pub cancel: Vec<String>,
    pub rotate_left: Vec<String>,
    pub rotate_right: Vec<String>,
    pub color_next: Vec<String>,
    pub color_prev: Vec<String>,
    pub icons: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// `error` / `warn` / `info` / `debug` / `trace` / `off`
    pub level: String,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    builder: TomlBuilder,
    #[serde(default)]
    palette: TomlPalette,
    #[serde(default)]
    camera: TomlCamera,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlBuilder {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_show_icons")]
    show_icons: bool,
}

#[derive(Deserialize, Debug)]
struct TomlPalette {
    #[serde(default = "default_colors")]
    colors: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlCamera {
    #[serde(default = "default_min_zoom")]
    min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    max_zoom: f32,
    #[serde(default = "default_start_zoom")]
    start_zoom: f32,
    #[serde(default = "default_pan_speed")]
    pan_speed: f32,
    #[serde(default = "default_shake_decay")]
    shake_decay: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_commit")]
    commit: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_rotate_left")]
    rotate_left: Vec<String>,
    #[serde(default = "default_rotate_right")]
    rotate_right: Vec<String>,
    #[serde(default = "default_color_next")]
    color_next: Vec<String>,
    #[serde(default = "default_color_prev")]
    color_prev: Vec<String>,
    #[serde(default = "default_icons")]
    icons: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    /// Empty = `snapblocks.log` in the temp dir.
    #[serde(default)]
    file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 33 }
fn default_show_icons() -> bool { false }

fn default_colors() -> Vec<String> {
    Palette::default().colors().iter().map(Rgb::to_string).collect()
}

fn default_min_zoom() -> f32 { 3.0 }
fn default_max_zoom() -> f32 { 30.0 }
fn default_start_zoom() -> f32 { 8.0 }
fn default_pan_speed() -> f32 { 0.25 }
fn default_shake_decay() -> f32 { 2.5 }

fn default_commit() -> Vec<String> { vec!["A".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into()] }
fn default_rotate_left() -> Vec<String> { vec!["L1".into()] }
fn default_rotate_right() -> Vec<String> { vec!["R1".into()] }
fn default_color_next() -> Vec<String> { vec!["X".into()] }
fn default_color_prev() -> Vec<String> { vec!["Y".into()] }
fn default_icons() -> Vec<String> { vec!["Select".into()] }

fn default_log_level() -> String { "info".into() }

impl Default for TomlBuilder {
    fn default() -> Self {
        TomlBuilder {
            tick_rate_ms: default_tick_rate(),
            show_icons: default_show_icons(),
        }
    }
}

impl Default for TomlPalette {
    fn default() -> Self {
        TomlPalette { colors: default_colors() }
    }
}

impl Default for TomlCamera {
    fn default() -> Self {
        TomlCamera {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            start_zoom: default_start_zoom(),
            pan_speed: default_pan_speed(),
            shake_decay: default_shake_decay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            commit: default_commit(),
            cancel: default_cancel(),
            rotate_left: default_rotate_left(),
            rotate_right: default_rotate_right(),
            color_next: default_color_next(),
            color_prev: default_color_prev(),
            icons: default_icons(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { level: default_log_level(), file: String::new() }
    }
}

// ── Loading ──

impl BuilderConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, then the data directories.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        BuilderConfig::from_toml(load_toml(&search_dirs))
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let palette = Palette::new(parse_colors(&cfg.palette.colors));

        // Keep the zoom range sane even if the user swapped the bounds.
        let min_zoom = cfg.camera.min_zoom.max(1.0);
        let max_zoom = cfg.camera.max_zoom.max(min_zoom);

        let log_file = if cfg.log.file.is_empty() {
            std::env::temp_dir().join("snapblocks.log")
        } else {
            PathBuf::from(cfg.log.file)
        };

        BuilderConfig {
            builder: BuilderSettings {
                tick_rate_ms: cfg.builder.tick_rate_ms.max(1),
                show_icons: cfg.builder.show_icons,
            },
            palette,
            camera: CameraConfig {
                min_zoom,
                max_zoom,
                start_zoom: cfg.camera.start_zoom.clamp(min_zoom, max_zoom),
                pan_speed: cfg.camera.pan_speed,
                shake_decay: cfg.camera.shake_decay.max(0.0),
            },
            gamepad: GamepadConfig {
                commit: cfg.gamepad.commit,
                cancel: cfg.gamepad.cancel,
                rotate_left: cfg.gamepad.rotate_left,
                rotate_right: cfg.gamepad.rotate_right,
                color_next: cfg.gamepad.color_next,
                color_prev: cfg.gamepad.color_prev,
                icons: cfg.gamepad.icons,
            },
            log: LogConfig { level: cfg.log.level, file: log_file },
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig::from_toml(TomlConfig::default())
    }
}

/// Parse `#rrggbb` entries, skipping (and reporting) the bad ones.
fn parse_colors(entries: &[String]) -> Vec<Rgb> {
    entries.iter()
        .filter_map(|s| match s.parse::<Rgb>() {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("Warning: palette: {e}, skipped");
                None
            }
        })
        .collect()
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/snapblocks)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/snapblocks");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/snapblocks");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
