//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{AttendanceConfig, EngineConfig, PayrollConfig};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/ghana/
/// ├── payroll.yaml     # SSNIT rates and ceiling, PAYE brackets
/// └── attendance.yaml  # Auto-close, backfill and schedule settings
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/ghana").unwrap();
/// println!("SSNIT cap: {}", loader.payroll().ssnit.cap);
/// println!("Auto-close cutoff: {}", loader.attendance().auto_close.cutoff);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/ghana")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any value fails semantic validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let payroll = Self::load_yaml::<PayrollConfig>(&path.join("payroll.yaml"))?;
        payroll.validate()?;

        let attendance = Self::load_yaml::<AttendanceConfig>(&path.join("attendance.yaml"))?;
        attendance.validate()?;

        Ok(Self {
            config: EngineConfig {
                payroll,
                attendance,
            },
        })
    }

    /// Wraps an already-built configuration, e.g. [`EngineConfig::default`].
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the payroll configuration.
    pub fn payroll(&self) -> &PayrollConfig {
        &self.config.payroll
    }

    /// Returns the attendance configuration.
    pub fn attendance(&self) -> &AttendanceConfig {
        &self.config.attendance
    }
}
