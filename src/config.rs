/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// data directories. Falls back to sensible defaults if the file is missing,
/// incomplete, or unparsable.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "mirror-maze";

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub input: InputConfig,
    pub timer: TimerConfig,
    /// External level pack, if one was found. `None` means the built-in set.
    pub levels_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputConfig {
    pub repeat_delay_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    pub level_seconds: u32,
    pub untimed_through: u32, // levels with id <= this have no clock
    pub three_star_above: u32,
    pub two_star_above: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    timer: TomlTimer,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_repeat_delay")]
    repeat_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlTimer {
    #[serde(default = "default_level_seconds")]
    level_seconds: u32,
    #[serde(default = "default_untimed_through")]
    untimed_through: u32,
    #[serde(default = "default_three_star")]
    three_star_above: u32,
    #[serde(default = "default_two_star")]
    two_star_above: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_file")]
    levels_file: String,
}

// ── Defaults ──

fn default_repeat_delay() -> u64 { 140 }
fn default_level_seconds() -> u32 { 120 }
fn default_untimed_through() -> u32 { 2 }
fn default_three_star() -> u32 { 90 }
fn default_two_star() -> u32 { 60 }
fn default_levels_file() -> String { "levels/levels.toml".into() }

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput { repeat_delay_ms: default_repeat_delay() }
    }
}

impl Default for TomlTimer {
    fn default() -> Self {
        TomlTimer {
            level_seconds: default_level_seconds(),
            untimed_through: default_untimed_through(),
            three_star_above: default_three_star(),
            two_star_above: default_two_star(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_file: default_levels_file() }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig { repeat_delay_ms: default_repeat_delay() }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        let t = TomlTimer::default();
        TimerConfig {
            level_seconds: t.level_seconds,
            untimed_through: t.untimed_through,
            three_star_above: t.three_star_above,
            two_star_above: t.two_star_above,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            input: InputConfig::default(),
            timer: TimerConfig::default(),
            levels_file: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, ~/.local/share/mirror-maze,
    /// /usr/share/mirror-maze. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Build a config from TOML text. A parse error logs a warning and
    /// yields the defaults.
    pub fn from_toml_str(text: &str, search_dirs: &[PathBuf]) -> Self {
        Self::resolve(parse_toml(text), search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_file = find_levels_file(&toml_cfg.general.levels_file, search_dirs);
        match &levels_file {
            Some(path) => log::info!("using level pack {}", path.display()),
            None => log::debug!("no external level pack, using built-in levels"),
        }

        GameConfig {
            input: InputConfig { repeat_delay_ms: toml_cfg.input.repeat_delay_ms },
            timer: TimerConfig {
                level_seconds: toml_cfg.timer.level_seconds,
                untimed_through: toml_cfg.timer.untimed_through,
                three_star_above: toml_cfg.timer.three_star_above,
                two_star_above: toml_cfg.timer.two_star_above,
            },
            levels_file,
        }
    }
}

/// Absolute paths are taken as-is when they exist; relative ones are looked
/// up in each search directory.
fn find_levels_file(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let path = Path::new(name);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    search_dirs.iter().map(|d| d.join(name)).find(|p| p.is_file())
}

/// Directories searched for config.toml and the level pack, in priority
/// order: exe dir, CWD, XDG data home, system data dir.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    // Symlinks resolved so data next to the real binary is still found.
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(dir) = exe_dir {
        push_unique(&mut dirs, dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        push_unique(&mut dirs, cwd);
    }

    let data_dirs = std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/share").join(APP_DIR))
        .into_iter()
        .chain(std::iter::once(PathBuf::from("/usr/share").join(APP_DIR)));
    for dir in data_dirs.filter(|d| d.is_dir()) {
        push_unique(&mut dirs, dir);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("reading {}", path.display());
                    return parse_toml(&text);
                }
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("config.toml parse error: {e}; using default settings");
            TomlConfig::default()
        }
    }
}
