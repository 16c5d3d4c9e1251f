// Configuration loading and parsing (config/draftboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name shared by `defaults/` and `config/`.
pub const CONFIG_FILE: &str = "draftboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub draft: DraftConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// How draft positions are handed out when a draft starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatingPolicy {
    /// Seat participants in the order they joined the league.
    #[default]
    JoinOrder,
    /// Seat participants in a random order.
    Shuffle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    /// Picks per participant. The draft ends after `N * rounds` picks.
    pub rounds: u32,
    #[serde(default)]
    pub seating: SeatingPolicy,
    /// Fixed seed for `Shuffle`, so a seating can be reproduced.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            rounds: 15,
            seating: SeatingPolicy::JoinOrder,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Length of one schedule week in calendar days.
    pub window_days: u32,
    /// Refuse to build a schedule while any active roster is short of picks.
    #[serde(default)]
    pub require_full_rosters: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            require_full_rosters: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_advisor_base_url")]
    pub base_url: String,
    #[serde(default = "default_advisor_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_advisor_base_url() -> String {
    "http://127.0.0.1:8787".into()
}

fn default_advisor_timeout_ms() -> u64 {
    750
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_advisor_base_url(),
            timeout_ms: default_advisor_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "draftboard.db".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draftboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let config = parse_config(&text).map_err(|e| match e {
        ConfigError::ParseError { source, .. } => ConfigError::ParseError { path, source },
        other => other,
    })?;
    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: PathBuf::from("<inline>"),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Copy `defaults/draftboard.toml` into `config/` unless a config file is
/// already there. Returns the path written, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let default_path = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if !default_path.is_file() {
        if !target.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/{CONFIG_FILE} nor config/{CONFIG_FILE} found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(None);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            let content =
                std::fs::read(&default_path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", default_path.display()),
                })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Loads config relative to `base_dir`, copying defaults first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draft.rounds == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.rounds".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.schedule.window_days == 0 {
        return Err(ConfigError::ValidationError {
            field: "schedule.window_days".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.advisor.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "advisor.timeout_ms".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.advisor.enabled && config.advisor.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "advisor.base_url".into(),
            message: "must be set when the advisor is enabled".into(),
        });
    }

    if config.database.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Locate the workspace root holding `defaults/`, whether tests run from
    /// the crate directory or the repository root.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        manifest
            .ancestors()
            .find(|dir| dir.join("defaults").join(CONFIG_FILE).exists())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| panic!("cannot locate defaults/ above {manifest:?}"))
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("draftboard_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn shipped_defaults_parse_and_validate() {
        let text = fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap();
        let config = parse_config(&text).expect("defaults should be valid");

        assert_eq!(config.draft.rounds, 15);
        assert_eq!(config.draft.seating, SeatingPolicy::JoinOrder);
        assert_eq!(config.schedule.window_days, 7);
        assert!(!config.schedule.require_full_rosters);
        assert!(!config.advisor.enabled);
        assert_eq!(config.advisor.timeout(), Duration::from_millis(750));
        assert_eq!(config.database.path, "draftboard.db");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_config("[draft]\nrounds = 3\n").unwrap();
        assert_eq!(config.draft.rounds, 3);
        assert_eq!(config.schedule.window_days, 7);
        assert_eq!(config.database.path, "draftboard.db");
    }

    #[test]
    fn partial_advisor_table_keeps_defaults() {
        let config = parse_config("[advisor]\nenabled = true\n").unwrap();
        assert!(config.advisor.enabled);
        assert_eq!(config.advisor.base_url, "http://127.0.0.1:8787");
        assert_eq!(config.advisor.timeout(), Duration::from_millis(750));
    }

    #[test]
    fn shuffle_seating_with_seed() {
        let config =
            parse_config("[draft]\nrounds = 2\nseating = \"shuffle\"\nseed = 9\n").unwrap();
        assert_eq!(config.draft.seating, SeatingPolicy::Shuffle);
        assert_eq!(config.draft.seed, Some(9));
    }

    #[test]
    fn zero_rounds_rejected() {
        let err = parse_config("[draft]\nrounds = 0\n").unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "draft.rounds"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_window_rejected() {
        let err = parse_config("[schedule]\nwindow_days = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "schedule.window_days"
        ));
    }

    #[test]
    fn enabled_advisor_requires_url() {
        let err = parse_config("[advisor]\nenabled = true\nbase_url = \"\"\ntimeout_ms = 100\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "advisor.base_url"
        ));
    }

    #[test]
    fn unknown_seating_is_a_parse_error() {
        let err = parse_config("[draft]\nrounds = 2\nseating = \"auction\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn ensure_config_file_copies_once() {
        let dir = scratch_dir("ensure_copy");
        fs::create_dir_all(dir.join("defaults")).unwrap();
        fs::write(dir.join("defaults").join(CONFIG_FILE), "[draft]\nrounds = 4\n").unwrap();

        let copied = ensure_config_file(&dir).unwrap();
        assert_eq!(copied, Some(dir.join("config").join(CONFIG_FILE)));

        // An edited config must survive a second startup.
        fs::write(dir.join("config").join(CONFIG_FILE), "[draft]\nrounds = 6\n").unwrap();
        assert_eq!(ensure_config_file(&dir).unwrap(), None);
        assert_eq!(load_config(&dir).unwrap().draft.rounds, 6);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_defaults_and_config_is_an_error() {
        let dir = scratch_dir("ensure_missing");
        let err = ensure_config_file(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_config_from_reports_missing_file() {
        let dir = scratch_dir("load_missing");
        let err = load_config_from(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        let _ = fs::remove_dir_all(&dir);
    }
}
