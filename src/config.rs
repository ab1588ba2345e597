//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ConditionerError, Result};
use crate::sticks::calibration::CalibrationSettings;
use crate::sticks::mapper::AxisRange;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub sticks: SticksConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Stick range and sampling configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SticksConfig {
    #[serde(default = "default_input_max")]
    pub input_max: i32,

    #[serde(default = "default_output_max")]
    pub output_max: i32,

    #[serde(default = "default_outer_deadzone")]
    pub outer_deadzone: i32,

    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    #[serde(default = "default_cycle_hz")]
    pub cycle_hz: u32,
}

/// Calibration storage and routine configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CalibrationConfig {
    #[serde(default = "default_store_path")]
    pub store_path: String,

    #[serde(default = "default_inner_deadzone")]
    pub default_inner_deadzone: i32,

    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_calibration_samples")]
    pub sample_count: usize,

    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

/// Diagnostic output configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_diagnostics_enabled")]
    pub enabled: bool,

    #[serde(default = "default_diagnostics_interval_ms")]
    pub interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct LoggingConfig {
    /// Directory for a daily rolling log file; empty logs to stdout only.
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_input_max() -> i32 { 4095 }
fn default_output_max() -> i32 { 32767 }
fn default_outer_deadzone() -> i32 { 50 }
fn default_sample_count() -> usize { 50 }
fn default_cycle_hz() -> u32 { 100 }

fn default_store_path() -> String { "./calibration.json".to_string() }
fn default_inner_deadzone() -> i32 { 150 }
fn default_settle_ms() -> u64 { 1000 }
fn default_calibration_samples() -> usize { 50 }
fn default_sample_interval_ms() -> u64 { 2 }

fn default_diagnostics_enabled() -> bool { true }
fn default_diagnostics_interval_ms() -> u64 { 300 }

/// Upper bound for any per-cycle or calibration sample batch.
const MAX_SAMPLE_COUNT: usize = 10_000;

impl Default for SticksConfig {
    fn default() -> Self {
        Self {
            input_max: default_input_max(),
            output_max: default_output_max(),
            outer_deadzone: default_outer_deadzone(),
            sample_count: default_sample_count(),
            cycle_hz: default_cycle_hz(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_inner_deadzone: default_inner_deadzone(),
            settle_ms: default_settle_ms(),
            sample_count: default_calibration_samples(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_diagnostics_enabled(),
            interval_ms: default_diagnostics_interval_ms(),
        }
    }
}

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
    /// use stick_conditioner::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Axis ranges described by the `[sticks]` section
    #[must_use]
    pub fn axis_range(&self) -> AxisRange {
        AxisRange::new(self.sticks.input_max, self.sticks.output_max, self.sticks.outer_deadzone)
    }

    /// Calibration routine settings described by the `[calibration]` section
    #[must_use]
    pub fn calibration_settings(&self) -> CalibrationSettings {
        CalibrationSettings {
            settle_ms: self.calibration.settle_ms,
            sample_count: self.calibration.sample_count,
            sample_interval_ms: self.calibration.sample_interval_ms,
        }
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate ranges
        if self.sticks.input_max <= 0 {
            return Err(invalid("input_max must be greater than 0"));
        }

        if self.sticks.output_max <= 0 {
            return Err(invalid("output_max must be greater than 0"));
        }

        if self.sticks.outer_deadzone < 0 {
            return Err(invalid("outer_deadzone cannot be negative"));
        }

        if 2 * i64::from(self.sticks.outer_deadzone) >= i64::from(self.sticks.input_max) {
            return Err(invalid("outer_deadzone must leave part of the input range usable"));
        }

        // Validate sampling
        if self.sticks.sample_count == 0 || self.sticks.sample_count > MAX_SAMPLE_COUNT {
            return Err(invalid("sticks sample_count must be between 1 and 10000"));
        }

        if self.sticks.cycle_hz == 0 || self.sticks.cycle_hz > 1000 {
            return Err(invalid("cycle_hz must be between 1 and 1000"));
        }

        // Validate calibration
        if self.calibration.store_path.is_empty() {
            return Err(invalid("calibration store_path cannot be empty"));
        }

        if self.calibration.default_inner_deadzone < 0 {
            return Err(invalid("default_inner_deadzone cannot be negative"));
        }

        if self.calibration.sample_count == 0 || self.calibration.sample_count > MAX_SAMPLE_COUNT {
            return Err(invalid("calibration sample_count must be between 1 and 10000"));
        }

        if self.calibration.settle_ms > 60000 {
            return Err(invalid("settle_ms must be at most 60000"));
        }

        if self.calibration.sample_interval_ms > 1000 {
            return Err(invalid("sample_interval_ms must be at most 1000"));
        }

        // Validate diagnostics
        if self.diagnostics.interval_ms == 0 || self.diagnostics.interval_ms > 60000 {
            return Err(invalid("diagnostics interval_ms must be between 1 and 60000"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> ConditionerError {
    ConditionerError::Config(toml::de::Error::custom(msg))
}
