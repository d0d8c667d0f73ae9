use crate::coordinate::{CoordinateOrder, DegeneracyPolicy};
use crate::error::LassoError;
use crate::penalty::validate_noise_variance;
use crate::report::ReportConfig;
use crate::simulate::{SimulationConfig, SimulationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Tuning of the per-arrival update operator.
///
/// The feature dimension is not part of this: it is fixed by the data stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Observation-noise variance `var_y` feeding the penalty schedule.
    #[serde(default = "default_noise_variance")]
    pub noise_variance: f64,
    #[serde(default)]
    pub coordinate_order: CoordinateOrder,
    #[serde(default)]
    pub degeneracy: DegeneracyPolicy,
}

fn default_noise_variance() -> f64 {
    1.0
}

impl EngineConfig {
    pub fn new(noise_variance: f64) -> Self {
        Self {
            noise_variance,
            coordinate_order: CoordinateOrder::Ascending,
            degeneracy: DegeneracyPolicy::HoldAtZero,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(default_noise_variance())
    }
}

/// A complete experiment description, usually read from a TOML file.
///
/// ```toml
/// [engine]
/// noise_variance = 0.5
///
/// [simulation]
/// total_features = 50
/// true_features = 5
/// arrivals = 300
///
/// [report]
/// first_arrival = 10
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Invalid engine configuration: {0}")]
    Engine(#[from] LassoError),
    #[error("Invalid simulation configuration: {0}")]
    Simulation(#[from] SimulationError),
}

impl RunConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading run configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks every section before anything is generated or streamed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_noise_variance(self.engine.noise_variance)?;
        self.simulation.validate()?;
        Ok(())
    }
}
