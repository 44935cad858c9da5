//! Configuration management for selclip
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file,
//! and environment variables named after the upper-case setting
//! (`CLIPBOARD_TIMEOUT=0.8`). Durations are given in seconds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::dispatch::NamedKey;
use crate::orchestrator::Timings;
use crate::selection::ClassifierSettings;

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "SELCLIP_CONFIG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading or writing the config file
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error
    #[error("Config validation failed: {0}")]
    Validation(String),

    /// No per-user config directory on this platform
    #[error("Could not find config directory")]
    NoConfigDir,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_press_duration")]
    pub copy_press_duration: f64,

    #[serde(default = "default_press_duration")]
    pub paste_press_duration: f64,

    #[serde(default = "default_wait_before_copy")]
    pub wait_before_copy: f64,

    #[serde(default = "default_clipboard_timeout")]
    pub clipboard_timeout: f64,

    #[serde(default = "default_clipboard_check_interval")]
    pub clipboard_check_interval: f64,

    #[serde(default = "default_copy_restore_delay")]
    pub copy_restore_delay: f64,

    #[serde(default = "default_paste_settle_delay")]
    pub paste_settle_delay: f64,

    #[serde(default = "default_paste_restore_delay")]
    pub paste_restore_delay: f64,

    /// Liveness check period of the main loop
    #[serde(default = "default_main_loop_sleep")]
    pub main_loop_sleep: f64,

    /// Pixels
    #[serde(default = "default_min_drag_distance")]
    pub min_drag_distance: f64,

    #[serde(default = "default_max_click_duration")]
    pub max_click_duration: f64,

    #[serde(default = "default_double_click_max_interval")]
    pub double_click_max_interval: f64,

    /// Log threshold; lower values let more messages through
    #[serde(default)]
    pub debug: i64,

    /// Key that terminates the process
    #[serde(default = "default_exit_key")]
    pub exit_key: String,
}

// Default value functions
fn default_press_duration() -> f64 {
    0.05
}

fn default_wait_before_copy() -> f64 {
    0.05
}

fn default_clipboard_timeout() -> f64 {
    0.5
}

fn default_clipboard_check_interval() -> f64 {
    0.05
}

fn default_copy_restore_delay() -> f64 {
    0.01
}

fn default_paste_settle_delay() -> f64 {
    0.02
}

fn default_paste_restore_delay() -> f64 {
    0.08
}

fn default_main_loop_sleep() -> f64 {
    0.1
}

fn default_min_drag_distance() -> f64 {
    5.0
}

fn default_max_click_duration() -> f64 {
    0.15
}

fn default_double_click_max_interval() -> f64 {
    0.35
}

fn default_exit_key() -> String {
    "End".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            copy_press_duration: default_press_duration(),
            paste_press_duration: default_press_duration(),
            wait_before_copy: default_wait_before_copy(),
            clipboard_timeout: default_clipboard_timeout(),
            clipboard_check_interval: default_clipboard_check_interval(),
            copy_restore_delay: default_copy_restore_delay(),
            paste_settle_delay: default_paste_settle_delay(),
            paste_restore_delay: default_paste_restore_delay(),
            main_loop_sleep: default_main_loop_sleep(),
            min_drag_distance: default_min_drag_distance(),
            max_click_duration: default_max_click_duration(),
            double_click_max_interval: default_double_click_max_interval(),
            debug: 0,
            exit_key: default_exit_key(),
        }
    }
}

impl Config {
    /// Load configuration from default locations, then apply the environment
    ///
    /// Checks in order:
    /// 1. Path from SELCLIP_CONFIG environment variable
    /// 2. <config dir>/selclip/config.toml
    /// 3. Built-in defaults if neither exists
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_path() {
            Some(path) => Self::parse_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate_config()?;
        Ok(config)
    }

    /// Load configuration with optional custom path
    pub fn load_config(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => {
                let mut config = Self::parse_file(&expand_path(&path))?;
                config.apply_env();
                config.validate_config()?;
                Ok(config)
            }
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path, without environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate_config()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Find configuration file path
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = expand_path(Path::new(&path));
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_path().filter(|p| p.exists())
    }

    /// `<config dir>/selclip/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("selclip").join("config.toml"))
    }

    /// Override settings from process environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override settings from `lookup`, keyed by upper-case setting name
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let floats: [(&str, &mut f64); 12] = [
            ("COPY_PRESS_DURATION", &mut self.copy_press_duration),
            ("PASTE_PRESS_DURATION", &mut self.paste_press_duration),
            ("WAIT_BEFORE_COPY", &mut self.wait_before_copy),
            ("CLIPBOARD_TIMEOUT", &mut self.clipboard_timeout),
            ("CLIPBOARD_CHECK_INTERVAL", &mut self.clipboard_check_interval),
            ("COPY_RESTORE_DELAY", &mut self.copy_restore_delay),
            ("PASTE_SETTLE_DELAY", &mut self.paste_settle_delay),
            ("PASTE_RESTORE_DELAY", &mut self.paste_restore_delay),
            ("MAIN_LOOP_SLEEP", &mut self.main_loop_sleep),
            ("MIN_DRAG_DISTANCE", &mut self.min_drag_distance),
            ("MAX_CLICK_DURATION", &mut self.max_click_duration),
            ("DOUBLE_CLICK_MAX_INTERVAL", &mut self.double_click_max_interval),
        ];
        for (name, field) in floats {
            if let Some(raw) = lookup(name) {
                match raw.trim().parse::<f64>() {
                    Ok(value) => *field = value,
                    Err(_) => warn!("Ignoring {}={:?}: not a number", name, raw),
                }
            }
        }

        if let Some(raw) = lookup("DEBUG") {
            match raw.trim().parse::<i64>() {
                Ok(value) => self.debug = value,
                Err(_) => warn!("Ignoring DEBUG={:?}: not an integer", raw),
            }
        }

        if let Some(raw) = lookup("EXIT_KEY") {
            self.exit_key = raw.trim().to_string();
        }
    }

    /// Validate configuration values
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        let durations = [
            ("copy_press_duration", self.copy_press_duration),
            ("paste_press_duration", self.paste_press_duration),
            ("wait_before_copy", self.wait_before_copy),
            ("clipboard_timeout", self.clipboard_timeout),
            ("clipboard_check_interval", self.clipboard_check_interval),
            ("copy_restore_delay", self.copy_restore_delay),
            ("paste_settle_delay", self.paste_settle_delay),
            ("paste_restore_delay", self.paste_restore_delay),
            ("main_loop_sleep", self.main_loop_sleep),
            ("max_click_duration", self.max_click_duration),
            ("double_click_max_interval", self.double_click_max_interval),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }

        // The poll loop and the main loop must make progress.
        if self.clipboard_check_interval == 0.0 {
            return Err(ConfigError::Validation(
                "clipboard_check_interval must be greater than 0".to_string(),
            ));
        }
        if self.main_loop_sleep == 0.0 {
            return Err(ConfigError::Validation(
                "main_loop_sleep must be greater than 0".to_string(),
            ));
        }

        if !self.min_drag_distance.is_finite() || self.min_drag_distance < 0.0 {
            return Err(ConfigError::Validation(format!(
                "min_drag_distance must be a non-negative number of pixels, got {}",
                self.min_drag_distance
            )));
        }

        self.exit_key()?;
        Ok(())
    }

    /// Protocol delays
    pub fn timings(&self) -> Timings {
        Timings {
            copy_press_duration: secs(self.copy_press_duration),
            paste_press_duration: secs(self.paste_press_duration),
            wait_before_copy: secs(self.wait_before_copy),
            clipboard_timeout: secs(self.clipboard_timeout),
            clipboard_check_interval: secs(self.clipboard_check_interval),
            copy_restore_delay: secs(self.copy_restore_delay),
            paste_settle_delay: secs(self.paste_settle_delay),
            paste_restore_delay: secs(self.paste_restore_delay),
        }
    }

    /// Selection classifier thresholds
    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            min_drag_distance: self.min_drag_distance,
            max_click_duration: secs(self.max_click_duration),
            double_click_max_interval: secs(self.double_click_max_interval),
        }
    }

    pub fn main_loop_sleep(&self) -> Duration {
        secs(self.main_loop_sleep)
    }

    pub fn exit_key(&self) -> Result<NamedKey, ConfigError> {
        self.exit_key
            .parse()
            .map_err(|e: String| ConfigError::Validation(e))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Write the commented example file to the default location
    pub fn generate_example_config(force: bool) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;

        if !force && path.exists() {
            return Err(ConfigError::Validation(
                "Config file already exists. Use --force to overwrite.".to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::generate_example())?;
        Ok(path)
    }

    /// Generate example configuration file
    pub fn generate_example() -> String {
        let config = Config::default();

        format!(
            r#"# selclip Configuration File
# Every value can also be set through an environment variable with the
# upper-case name, e.g. CLIPBOARD_TIMEOUT=0.8. Times are in seconds.

# How long the copy / paste keys are held down
copy_press_duration = {}
paste_press_duration = {}

# Pause before capturing, so the selection has settled
wait_before_copy = {}

# How long to wait for the application to answer the copy chord,
# and how often to look
clipboard_timeout = {}
clipboard_check_interval = {}

# Pauses around restoring the system clipboard
copy_restore_delay = {}
paste_settle_delay = {}
paste_restore_delay = {}

# Liveness check period
main_loop_sleep = {}

# Selection detection
min_drag_distance = {}          # pixels
max_click_duration = {}
double_click_max_interval = {}

# Log threshold: lower shows more (0 = everything, 4 = errors only)
debug = {}

# Key that stops selclip (End, Escape, Pause, ScrollLock, Insert, F12)
exit_key = "{}"
"#,
            config.copy_press_duration,
            config.paste_press_duration,
            config.wait_before_copy,
            config.clipboard_timeout,
            config.clipboard_check_interval,
            config.copy_restore_delay,
            config.paste_settle_delay,
            config.paste_restore_delay,
            config.main_loop_sleep,
            config.min_drag_distance,
            config.max_click_duration,
            config.double_click_max_interval,
            config.debug,
            config.exit_key,
        )
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

/// Expand tilde in path
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    PathBuf::from(expanded.into_owned())
}
