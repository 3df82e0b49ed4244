//! Configuration system for RelaxForge.
//!
//! Load Lagrangian relaxation settings from TOML or YAML files to control
//! iteration limits, step-size cadence and tolerances without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use relaxforge_config::{LrConfig, MultiplierProjection};
//!
//! let config = LrConfig::from_toml_str(r#"
//!     max_iterations = 100
//!     update_period = 10
//!     epsilon = 1e-5
//!     multiplier_projection = "sign_constrained"
//! "#).unwrap();
//!
//! assert_eq!(config.max_iterations, 100);
//! assert_eq!(config.default_multiplier, 2.0);
//! assert_eq!(config.multiplier_projection, MultiplierProjection::SignConstrained);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Use default config when the file is missing, but not when it is broken:
//!
//! ```
//! use relaxforge_config::LrConfig;
//!
//! let config = match LrConfig::load("relaxation.toml") {
//!     Ok(config) => config,
//!     Err(e) if e.is_not_found() => LrConfig::default(),
//!     Err(e) => panic!("bad relaxation.toml: {e}"),
//! };
//! ```

use std::path::Path;

use relaxforge_core::{RelaxForgeError, Result as CoreResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// True if the configuration file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<ConfigError> for RelaxForgeError {
    fn from(e: ConfigError) -> Self {
        RelaxForgeError::Config(e.to_string())
    }
}

/// Settings of one Lagrangian relaxation session.
///
/// Unknown keys are rejected when loading from a file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct LrConfig {
    /// Maximum number of subgradient iterations.
    pub max_iterations: u64,

    /// The step size is recomputed every `update_period` iterations.
    pub update_period: u64,

    /// Tolerance of the feasibility and complementary slackness tests.
    pub epsilon: f64,

    /// Starting value of every multiplier.
    pub default_multiplier: f64,

    /// Starting denominator of the harmonic step size `1 / denominator`.
    pub start_denominator: f64,

    /// Whether multipliers are kept on their sign-feasible side.
    pub multiplier_projection: MultiplierProjection,

    /// Keep a snapshot of every iteration in the session outcome.
    pub record_trace: bool,
}

impl Default for LrConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            update_period: 10,
            epsilon: 1e-5,
            default_multiplier: 2.0,
            start_denominator: 1.0,
            multiplier_projection: MultiplierProjection::default(),
            record_trace: false,
        }
    }
}

impl LrConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the step-size update period.
    pub fn with_update_period(mut self, update_period: u64) -> Self {
        self.update_period = update_period;
        self
    }

    /// Sets the termination tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the starting multiplier.
    pub fn with_default_multiplier(mut self, multiplier: f64) -> Self {
        self.default_multiplier = multiplier;
        self
    }

    /// Sets the starting step-size denominator.
    pub fn with_start_denominator(mut self, denominator: f64) -> Self {
        self.start_denominator = denominator;
        self
    }

    /// Sets the multiplier projection rule.
    pub fn with_multiplier_projection(mut self, projection: MultiplierProjection) -> Self {
        self.multiplier_projection = projection;
        self
    }

    /// Keeps every iteration snapshot in the session outcome.
    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }

    /// Checks the configuration before a session starts.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxForgeError::Config`] for a zero iteration limit or
    /// update period, a negative or non-finite tolerance, a non-positive
    /// denominator, or a non-finite starting multiplier.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be positive"));
        }
        if self.update_period == 0 {
            return Err(invalid("update_period must be positive"));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(invalid(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if !self.start_denominator.is_finite() || self.start_denominator <= 0.0 {
            return Err(invalid(format!(
                "start_denominator must be finite and positive, got {}",
                self.start_denominator
            )));
        }
        if !self.default_multiplier.is_finite() {
            return Err(invalid(format!(
                "default_multiplier must be finite, got {}",
                self.default_multiplier
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RelaxForgeError {
    RelaxForgeError::Config(message.into())
}

/// Post-update treatment of multipliers of inequality constraints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierProjection {
    /// Multipliers move freely in both directions.
    #[default]
    Unrestricted,

    /// Multipliers of `<=` and `>=` constraints are clamped at zero so the
    /// penalty term never favours the relaxed side of the bound.
    SignConstrained,
}
