//! Shared configuration for axis limits, tolerances and synchronization.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [tolerance]
//! absolute = 1e-7
//! relative = 1e-9
//!
//! [sync]
//! max_iterations = 32
//!
//! [[axis]]
//! name = "shoulder"
//! max_velocity = 2.0
//! max_acceleration = 4.0
//!
//! [[axis]]
//! name = "elbow"
//! max_velocity = 3.0
//! max_acceleration = 6.0
//! ```
//!
//! - Every `[[axis]]` table becomes one dimension of a `RampNd`, in order.
//! - Missing `tolerance` and `sync` tables fall back to their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trajectory::Tolerance;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RampConfig {
    #[serde(default)]
    pub tolerance: Tolerance,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default, rename = "axis")]
    pub axes: Vec<AxisLimits>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxisLimits {
    #[serde(default)]
    pub name: Option<String>,
    pub max_velocity: f64,
    pub max_acceleration: f64,
}

impl RampConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RampConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.absolute >= 0.0 && self.tolerance.relative >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be non-negative, got {:?}",
                self.tolerance
            )));
        }
        if self.sync.max_iterations == 0 {
            return Err(ConfigError::Invalid("sync.max_iterations must be at least 1".to_string()));
        }
        for (i, axis) in self.axes.iter().enumerate() {
            let label = axis.name.clone().unwrap_or_else(|| format!("#{}", i));
            for (what, value) in [("max_velocity", axis.max_velocity), ("max_acceleration", axis.max_acceleration)] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "axis {}: {} must be positive and finite, got {}",
                        label, what, value
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn dims(&self) -> usize {
        self.axes.len()
    }

    /// Per-axis `(amax, vmax)` vectors in axis order.
    pub fn limits(&self) -> (Vec<f64>, Vec<f64>) {
        self.axes
            .iter()
            .map(|a| (a.max_acceleration, a.max_velocity))
            .unzip()
    }
}

pub(crate) fn default_max_iterations() -> usize { 32 }

pub fn load_config(path: &str) -> Result<RampConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match RampConfig::from_toml_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to load config '{}': {}", path, e);
                Err(e)
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[tolerance]
absolute = 1e-6

[sync]
max_iterations = 8

[[axis]]
name = "shoulder"
max_velocity = 2.0
max_acceleration = 4.0

[[axis]]
max_velocity = 3.0
max_acceleration = 6.0
"#;

    #[test]
    fn test_parse_sample() {
        let config = RampConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.dims(), 2);
        assert_eq!(config.sync.max_iterations, 8);
        assert_eq!(config.tolerance.absolute, 1e-6);
        assert_eq!(config.tolerance.relative, 1e-9);
        assert_eq!(config.axes[0].name.as_deref(), Some("shoulder"));
        let (amax, vmax) = config.limits();
        assert_eq!(amax, vec![4.0, 6.0]);
        assert_eq!(vmax, vec![2.0, 3.0]);
    }

    #[test]
    fn test_defaults_when_tables_missing() {
        let config = RampConfig::from_toml_str("").unwrap();
        assert_eq!(config.dims(), 0);
        assert_eq!(config.sync.max_iterations, 32);
        assert_eq!(config.tolerance, Tolerance::default());
    }

    #[test]
    fn test_rejects_non_positive_limits() {
        let toml_str = "[[axis]]\nmax_velocity = 0.0\nmax_acceleration = 1.0\n";
        assert!(matches!(
            RampConfig::from_toml_str(toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_zero_iterations() {
        assert!(matches!(
            RampConfig::from_toml_str("[sync]\nmax_iterations = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/ramp.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
