/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::ai::Relocation;
use crate::domain::mapgen::CellularConfig;
use crate::error::GameError;
use crate::sim::log::{LogOrder, MAX_VISIBLE_LINES};

const CONFIG_FILE: &str = "config.toml";

/// Largest map side accepted; bigger values are clamped.
pub const MAX_MAP_SIDE: usize = 1024;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub map: MapConfig,
    pub npc: NpcConfig,
    pub log: LogConfig,
    pub link: LinkConfig,
    pub gamepad: GamepadConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct MapConfig {
    pub cellular: CellularConfig,
    pub max_regen_attempts: u32,
}

#[derive(Clone, Debug)]
pub struct NpcConfig {
    pub relocation: Relocation,
    pub show_path: bool,
    pub max_relocation_attempts: u32,
    pub spawn: (i32, i32),
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub visible_lines: usize,
    pub history_limit: usize,
    pub order: LogOrder,
}

#[derive(Clone, Debug)]
pub struct LinkConfig {
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub stop: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub seed: Option<u64>,
    /// Trace output file; `None` disables logging.
    pub log_file: Option<PathBuf>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    map: TomlMap,
    #[serde(default)]
    npc: TomlNpc,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    link: TomlLink,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlMap {
    #[serde(default = "default_fill")]
    fill_probability: f64,
    #[serde(default = "default_passes")]
    smoothing_passes: u32,
    #[serde(default = "default_true")]
    connect: bool,
    #[serde(default = "default_born")]
    born: Vec<u8>,
    #[serde(default = "default_survive")]
    survive: Vec<u8>,
    #[serde(default = "default_regen_attempts")]
    max_regen_attempts: u32,
}

#[derive(Deserialize, Debug)]
struct TomlNpc {
    #[serde(default = "default_relocation")]
    relocation: Relocation,
    #[serde(default = "default_true")]
    show_path: bool,
    #[serde(default = "default_relocation_attempts")]
    max_relocation_attempts: u32,
    #[serde(default = "default_npc_spawn")]
    spawn: [i32; 2],
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_visible_lines")]
    visible_lines: usize,
    #[serde(default = "default_history_limit")]
    history_limit: usize,
    #[serde(default = "default_log_order")]
    order: LogOrder,
}

#[derive(Deserialize, Debug)]
struct TomlLink {
    #[serde(default = "default_base_url")]
    base_url: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_stop")]
    stop: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_width() -> usize { 25 }
fn default_height() -> usize { 25 }
fn default_tick_rate() -> u64 { 50 }
fn default_fill() -> f64 { 0.5 }
fn default_passes() -> u32 { 2 }
fn default_true() -> bool { true }
fn default_born() -> Vec<u8> { vec![5, 6, 7, 8] }
fn default_survive() -> Vec<u8> { vec![4, 5, 6, 7, 8] }
fn default_regen_attempts() -> u32 { 64 }
fn default_relocation() -> Relocation { Relocation::Normal }
fn default_relocation_attempts() -> u32 { 4096 }
fn default_npc_spawn() -> [i32; 2] { [20, 20] }
fn default_visible_lines() -> usize { 10 }
fn default_history_limit() -> usize { 200 }
fn default_log_order() -> LogOrder { LogOrder::Recent }
fn default_base_url() -> String { "http://localhost:10001/".into() }
fn default_stop() -> Vec<String> { vec!["A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "cavecipher.log".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            width: default_width(),
            height: default_height(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl Default for TomlMap {
    fn default() -> Self {
        TomlMap {
            fill_probability: default_fill(),
            smoothing_passes: default_passes(),
            connect: true,
            born: default_born(),
            survive: default_survive(),
            max_regen_attempts: default_regen_attempts(),
        }
    }
}

impl Default for TomlNpc {
    fn default() -> Self {
        TomlNpc {
            relocation: default_relocation(),
            show_path: true,
            max_relocation_attempts: default_relocation_attempts(),
            spawn: default_npc_spawn(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            visible_lines: default_visible_lines(),
            history_limit: default_history_limit(),
            order: default_log_order(),
        }
    }
}

impl Default for TomlLink {
    fn default() -> Self {
        TomlLink { base_url: default_base_url() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { stop: default_stop(), quit: default_quit() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: None, log_file: default_log_file() }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    /// An unreadable or malformed file is an error; the caller decides
    /// whether to run on defaults and reports it once logging is up.
    pub fn load() -> Result<Self, GameError> {
        GameConfig::load_from(&candidate_dirs())
    }

    fn load_from(search_dirs: &[PathBuf]) -> Result<Self, GameError> {
        let Some(path) = find_config(search_dirs) else {
            return Ok(GameConfig::default());
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|source| GameError::ConfigRead { path: path.clone(), source })?;
        GameConfig::parse(&text).map_err(|source| GameError::ConfigParse { path, source })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(t: TomlConfig) -> Self {
        // A map needs at least one cell; the log at least one line and no
        // more than the panel holds.
        let width = t.display.width.clamp(1, MAX_MAP_SIDE);
        let height = t.display.height.clamp(1, MAX_MAP_SIDE);
        let log_file = if t.general.log_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(t.general.log_file))
        };

        GameConfig {
            display: DisplayConfig {
                width,
                height,
                tick_rate_ms: t.display.tick_rate_ms,
            },
            map: MapConfig {
                cellular: CellularConfig {
                    fill_probability: t.map.fill_probability.clamp(0.0, 1.0),
                    smoothing_passes: t.map.smoothing_passes,
                    connect: t.map.connect,
                    born: t.map.born,
                    survive: t.map.survive,
                },
                max_regen_attempts: t.map.max_regen_attempts.max(1),
            },
            npc: NpcConfig {
                relocation: t.npc.relocation,
                show_path: t.npc.show_path,
                max_relocation_attempts: t.npc.max_relocation_attempts.max(1),
                spawn: (t.npc.spawn[0], t.npc.spawn[1]),
            },
            log: LogConfig {
                visible_lines: t.log.visible_lines.clamp(1, MAX_VISIBLE_LINES),
                history_limit: t.log.history_limit,
                order: t.log.order,
            },
            link: LinkConfig { base_url: t.link.base_url },
            gamepad: GamepadConfig { stop: t.gamepad.stop, quit: t.gamepad.quit },
            general: GeneralConfig { seed: t.general.seed, log_file },
        }
    }
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

/// First config.toml found in the candidate directories.
fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|path| path.is_file())
}
