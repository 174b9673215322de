//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; an empty file yields the defaults.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{PadBridgeError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub screen: ScreenConfig,

    #[serde(default)]
    pub pointer: PointerConfig,

    #[serde(default)]
    pub right_stick: RightStickConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// WebSocket server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Host display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScreenConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Pixels the left-stick anchor sits above the screen middle
    #[serde(default = "default_center_offset_y")]
    pub center_offset_y: u32,
}

/// Pointer correction configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PointerConfig {
    /// Desktop scale factor (1.25 = 125%)
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,

    /// Pointer travel in pixels at full vertical deflection
    #[serde(default = "default_stick_radius")]
    pub stick_radius: u32,
}

/// Right stick key configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RightStickConfig {
    /// Dead-zone threshold in scaled units
    #[serde(default = "default_threshold")]
    pub threshold: i32,

    /// Multiplier from stick deflection (-1.0..1.0) to scaled units
    #[serde(default = "default_stick_scale")]
    pub scale: u32,

    #[serde(default)]
    pub seed_x: i32,

    #[serde(default)]
    pub seed_y: i32,
}

/// Virtual input device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty disables file logging
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 9001 }

fn default_width() -> u32 { 1920 }
fn default_height() -> u32 { 1080 }
fn default_center_offset_y() -> u32 { 30 }

fn default_scale_factor() -> f32 { 1.25 }
fn default_stick_radius() -> u32 { 320 }

fn default_threshold() -> i32 { 50 }
fn default_stick_scale() -> u32 { 100 }

fn default_device_name() -> String { "Pad Bridge Virtual Input".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            center_offset_y: default_center_offset_y(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            stick_radius: default_stick_radius(),
        }
    }
}

impl Default for RightStickConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            scale: default_stick_scale(),
            seed_x: 0,
            seed_y: 0,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Accepted values for `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest accepted screen dimension
const MAX_SCREEN_DIMENSION: u32 = 16384;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            info!("No configuration at {}, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Address the WebSocket server binds to, as `host:port`
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate server configuration
        if self.server.bind_address.is_empty() {
            return Err(invalid("bind_address cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(invalid("port must be between 1 and 65535"));
        }

        // Validate screen geometry
        for (name, value) in [("width", self.screen.width), ("height", self.screen.height)] {
            if value == 0 || value > MAX_SCREEN_DIMENSION {
                return Err(invalid(format!(
                    "screen {} must be between 1 and {}",
                    name, MAX_SCREEN_DIMENSION
                )));
            }
        }

        if self.screen.center_offset_y >= self.screen.height / 2 && self.screen.center_offset_y != 0 {
            return Err(invalid("center_offset_y must be less than half the screen height"));
        }

        // Validate pointer correction
        if !self.pointer.scale_factor.is_finite()
            || self.pointer.scale_factor < 1.0
            || self.pointer.scale_factor > 4.0
        {
            return Err(invalid("scale_factor must be between 1.0 and 4.0"));
        }

        if self.pointer.stick_radius == 0 || self.pointer.stick_radius > 10000 {
            return Err(invalid("stick_radius must be between 1 and 10000"));
        }

        // Validate right stick
        if self.right_stick.scale == 0 || self.right_stick.scale > 10000 {
            return Err(invalid("right_stick scale must be between 1 and 10000"));
        }

        if self.right_stick.threshold < 1 || self.right_stick.threshold as u32 > self.right_stick.scale {
            return Err(invalid("right_stick threshold must be between 1 and scale"));
        }

        // Validate input device
        if self.input.device_name.trim().is_empty() {
            return Err(invalid("device_name cannot be empty"));
        }

        // Validate logging
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

fn invalid(message: impl std::fmt::Display) -> PadBridgeError {
    PadBridgeError::Config(toml::de::Error::custom(message))
}
