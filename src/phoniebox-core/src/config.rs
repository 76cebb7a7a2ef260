use crate::paths::AppDirs;
use crate::settings::GpioSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    /// Minutes without playback before the box powers off; 0 disables the idle timer.
    #[serde(default)]
    pub idle_time_before_shutdown: u64,
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// `gpioN` and `gpioN.when_*` entries.
    #[serde(default)]
    pub gpio: BTreeMap<String, String>,
    /// Legacy `<action> = "gpioN,<edge>"` entries.
    #[serde(default)]
    pub buttons: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            idle_time_before_shutdown: 0,
            shutdown_command: default_shutdown_command(),
            logging: LoggingConfig::default(),
            gpio: BTreeMap::new(),
            buttons: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default = "default_stdout_enabled")]
    pub stdout: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stdout: default_stdout_enabled(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("shutdown_command must name a program")]
    EmptyShutdownCommand,
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.shutdown_command.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ValidationError::EmptyShutdownCommand);
        }
        Ok(())
    }

    pub fn idle_seconds(&self) -> u64 {
        self.idle_time_before_shutdown.saturating_mul(60)
    }

    /// Parses the button tables; malformed entries are logged and collected
    /// in [`GpioSettings::errors`].
    pub fn gpio_settings(&self) -> GpioSettings {
        GpioSettings::from_tables(&self.gpio, &self.buttons)
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_shutdown_command() -> Vec<String> {
    vec!["sudo".into(), "/sbin/poweroff".into()]
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_stdout_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeKind, PinIndex};
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.max_log_files, 7);
        assert!(config.logging.stdout);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.idle_seconds(), 0);
        assert_eq!(config.shutdown_command, vec!["sudo", "/sbin/poweroff"]);
    }

    #[test]
    fn invalid_version_rejected() {
        let mut config = Config::default();
        config.config_version = CURRENT_CONFIG_VERSION + 1;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn empty_shutdown_command_rejected() {
        let mut config = Config::default();
        config.shutdown_command.clear();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyShutdownCommand)
        ));
    }

    #[test]
    fn loads_button_tables_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
idle_time_before_shutdown = 15

[logging]
level = "debug"

[gpio]
gpio27 = "pull_up,150"
"gpio27.when_pressed" = "play_pause"
"gpio27.when_held" = "shutdown"

[buttons]
next = "gpio27,when_pressed"
"#
        )
        .expect("write config");

        let config = Config::load(file.path()).expect("config should load");
        assert_eq!(config.idle_seconds(), 900);
        assert_eq!(config.logging.level, LogLevel::Debug);

        let settings = config.gpio_settings();
        let pin = PinIndex::new(27).unwrap();
        assert!(settings.pins.contains_key(&pin));
        assert_eq!(settings.bindings.len(), 3);
        assert_eq!(settings.bindings[2].edge, EdgeKind::Pressed);
        assert_eq!(settings.bindings[2].function.fn_type, "next");
    }

    #[test]
    fn parse_errors_carry_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "idle_time_before_shutdown = \"soon\"").expect("write config");
        let err = Config::load(file.path()).expect_err("should not parse");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
