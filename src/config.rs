use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::KeyCode;
use serde::Deserialize;

use crate::system::history::DEFAULT_CAPACITY;

const MIN_REFRESH_RATE_MS: u64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub history: HistoryConfig,
    pub colors: ColorsConfig,
    pub logging: LoggingConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_rate_ms: u64,
    pub default_sort: String,
    pub extended_columns: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_rate_ms: 1000,
            default_sort: "cpu".to_string(),
            extended_columns: false,
        }
    }
}

impl GeneralConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_rate_ms.max(MIN_REFRESH_RATE_MS))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: None,
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub search: String,
    pub terminate: String,
    pub sort_pid: String,
    pub sort_name: String,
    pub sort_cpu: String,
    pub sort_memory: String,
    pub cycle_sort: String,
    pub toggle_columns: String,
    pub cycle_theme: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            search: "/".to_string(),
            terminate: "k".to_string(),
            sort_pid: "p".to_string(),
            sort_name: "n".to_string(),
            sort_cpu: "c".to_string(),
            sort_memory: "m".to_string(),
            cycle_sort: "s".to_string(),
            toggle_columns: "x".to_string(),
            cycle_theme: "t".to_string(),
            help: "?".to_string(),
        }
    }
}

/// Parses a keybind string: a single character or a named key such as "Enter".
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        lower => lower
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(KeyCode::F),
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("proctab").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.refresh_rate_ms, 1000);
        assert_eq!(config.general.default_sort, "cpu");
        assert!(!config.general.extended_columns);
        assert_eq!(config.history.capacity, 20);
        assert_eq!(config.colors.theme, "dark");
        assert!(config.logging.file.is_none());
        assert_eq!(config.keybinds.quit, "q");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
refresh_rate_ms = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_rate_ms, 500);
        // Other fields should be defaults
        assert_eq!(config.general.default_sort, "cpu");
        assert_eq!(config.history.capacity, 20);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
refresh_rate_ms = 2000
default_sort = "memory"
extended_columns = true

[history]
capacity = 60

[colors]
theme = "light"

[logging]
file = "/tmp/proctab.log"
level = "debug"
json = true

[keybinds]
quit = "x"
terminate = "F9"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_rate_ms, 2000);
        assert_eq!(config.general.default_sort, "memory");
        assert!(config.general.extended_columns);
        assert_eq!(config.history.capacity, 60);
        assert_eq!(config.colors.theme, "light");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/proctab.log")));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.keybinds.quit, "x");
        assert_eq!(parse_key(&config.keybinds.terminate), Some(KeyCode::F(9)));
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        let general = GeneralConfig {
            refresh_rate_ms: 0,
            ..GeneralConfig::default()
        };
        assert_eq!(general.refresh_interval(), Duration::from_millis(100));
        assert_eq!(
            GeneralConfig::default().refresh_interval(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn parse_key_names() {
        assert_eq!(parse_key("q"), Some(KeyCode::Char('q')));
        assert_eq!(parse_key("Escape"), Some(KeyCode::Esc));
        assert_eq!(parse_key("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key("hyper"), None);
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.refresh_rate_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("proctab_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.refresh_rate_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }
}
