/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// Loading happens before the logger exists, so problems found while
/// loading are collected in `GameConfig::warnings` and logged by the caller.

use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub play: PlayConfig,
    pub view: ViewConfig,
    pub stage_path: PathBuf,
    pub log_level: LevelFilter,
    /// Problems found while loading, in the order they were found.
    pub warnings: Vec<String>,
}

/// Body size and motion tuning, in world units per frame.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PhysicsConfig {
    #[serde(default = "default_chip_size")]
    pub chip_size: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_player_speed")]
    pub player_speed: f32,
    #[serde(default = "default_jump_power")]
    pub jump_power: f32,
    #[serde(default = "default_half_width")]
    pub player_half_width: f32,
    #[serde(default = "default_half_height")]
    pub player_half_height: f32,
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f32,
}

/// Interaction timing, in frames.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PlayConfig {
    #[serde(default = "default_player_power")]
    pub player_power: u32,
    #[serde(default = "default_attack_frames")]
    pub attack_frames: u32,
    #[serde(default = "default_break_frames")]
    pub break_frames: u32,   // broken block stays visible this long
    #[serde(default = "default_goal_wait")]
    pub goal_wait_frames: u32,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ViewConfig {
    #[serde(default = "default_view_width")]
    pub view_width: f32,
    #[serde(default = "default_view_height")]
    pub view_height: f32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: PhysicsConfig,
    #[serde(default)]
    play: PlayConfig,
    #[serde(default)]
    view: ViewConfig,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_stage_path")]
    stage_path: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_chip_size() -> f32 { 32.0 }
fn default_gravity() -> f32 { 0.4 }
fn default_player_speed() -> f32 { 3.0 }
fn default_jump_power() -> f32 { 8.0 }
fn default_half_width() -> f32 { 12.0 }
fn default_half_height() -> f32 { 15.0 }
fn default_edge_margin() -> f32 { 1.0 }

fn default_player_power() -> u32 { 1 }
fn default_attack_frames() -> u32 { 12 }
fn default_break_frames() -> u32 { 20 }
fn default_goal_wait() -> u32 { 180 }   // 3s at 60fps
fn default_tick_rate() -> u64 { 16 }

fn default_view_width() -> f32 { 640.0 }
fn default_view_height() -> f32 { 480.0 }

fn default_stage_path() -> String { "stages/stage1.txt".into() }
fn default_log_level() -> String { "info".into() }

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            chip_size: default_chip_size(),
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            jump_power: default_jump_power(),
            player_half_width: default_half_width(),
            player_half_height: default_half_height(),
            edge_margin: default_edge_margin(),
        }
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig {
            player_power: default_player_power(),
            attack_frames: default_attack_frames(),
            break_frames: default_break_frames(),
            goal_wait_frames: default_goal_wait(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            view_width: default_view_width(),
            view_height: default_view_height(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            stage_path: default_stage_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[], vec![])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        GameConfig::from_toml(toml_cfg, &search_dirs, warnings)
    }

    /// Parse a config document directly. Unreadable text yields defaults
    /// plus a warning.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Self {
        let mut warnings = vec![];
        let toml_cfg = parse_toml(text, &mut warnings);
        GameConfig::from_toml(toml_cfg, &[], warnings)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let physics = validate_physics(toml_cfg.physics, &mut warnings);
        let play = validate_play(toml_cfg.play, &mut warnings);
        let view = validate_view(toml_cfg.view, &mut warnings);

        let log_level = toml_cfg.general.log_level.parse::<LevelFilter>().unwrap_or_else(|_| {
            warnings.push(format!(
                "unknown log_level '{}', using info", toml_cfg.general.log_level
            ));
            LevelFilter::Info
        });

        GameConfig {
            physics,
            play,
            view,
            stage_path: resolve_stage_path(&toml_cfg.general.stage_path, search_dirs),
            log_level,
            warnings,
        }
    }
}

fn validate_physics(physics: PhysicsConfig, warnings: &mut Vec<String>) -> PhysicsConfig {
    let chip = physics.chip_size;
    let positive = chip > 0.0 && physics.player_half_width > 0.0 && physics.player_half_height > 0.0;
    if !positive || physics.player_half_width * 2.0 >= chip || physics.player_half_height * 2.0 >= chip {
        warnings.push(format!(
            "player body {}x{} does not fit inside a {} chip, using default physics",
            physics.player_half_width * 2.0, physics.player_half_height * 2.0, chip,
        ));
        return PhysicsConfig::default();
    }
    if physics.edge_margin < 0.0 {
        warnings.push("edge_margin must not be negative, using default".into());
        return PhysicsConfig { edge_margin: default_edge_margin(), ..physics };
    }
    physics
}

fn validate_play(mut play: PlayConfig, warnings: &mut Vec<String>) -> PlayConfig {
    if play.tick_rate_ms == 0 {
        warnings.push("tick_rate_ms must be at least 1, using default".into());
        play.tick_rate_ms = default_tick_rate();
    }
    if play.break_frames < play.attack_frames {
        warnings.push(format!(
            "break_frames ({}) is shorter than attack_frames ({}); broken blocks may vanish before they are collected",
            play.break_frames, play.attack_frames,
        ));
    }
    play
}

fn validate_view(view: ViewConfig, warnings: &mut Vec<String>) -> ViewConfig {
    if view.view_width <= 0.0 || view.view_height <= 0.0 {
        warnings.push("view size must be positive, using default".into());
        return ViewConfig::default();
    }
    view
}

/// Relative stage paths resolve against the first candidate directory
/// that contains them; otherwise they stay relative to CWD.
fn resolve_stage_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text, warnings),
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("config.toml parse error, using default settings: {e}"));
            TomlConfig::default()
        }
    }
}
