//! Parameters of a call center run and their validation.
//!
//! Everything here is checked before any simulation state is built: an
//! invalid configuration never reaches the scheduler.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Why a configuration was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file or the terminal could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML or has unknown keys.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Text that should have been a number.
    #[error("'{input}' is not a valid {field}")]
    InvalidNumber {
        /// What the number was meant to be.
        field: &'static str,
        /// The offending text, trimmed.
        input: String,
    },
    /// A duration that is zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A duration that is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Name of the parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Zero agents.
    #[error("a call center needs at least one agent")]
    NoAgents,
}

/// Configuration of one call center run.
///
/// Defaults mirror a small center: two agents, a caller every five minutes
/// on average, eight minute calls, observed for thirty minutes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Horizon of the run, in minutes of virtual time.
    pub sim_time: f64,
    /// Number of agents, i.e. the capacity of the agent pool.
    pub num_agents: usize,
    /// Mean of the exponential gap between two arrivals.
    pub arrival_gap: f64,
    /// Mean of the exponential call duration.
    pub service_time: f64,
    /// Interval at which the queue monitor samples the wait list.
    pub sample_time: f64,
    /// Seed of the random source; equal seeds give identical runs.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sim_time: 30.0,
            num_agents: 2,
            arrival_gap: 5.0,
            service_time: 8.0,
            sample_time: 1.0,
            seed: 42,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Checks every field; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_agents == 0 {
            return Err(ConfigError::NoAgents);
        }
        positive_time("sim_time", self.sim_time)?;
        positive_time("arrival_gap", self.arrival_gap)?;
        positive_time("service_time", self.service_time)?;
        positive_time("sample_time", self.sample_time)?;
        Ok(())
    }

    /// Same configuration with another agent count.
    #[must_use]
    pub fn with_agents(&self, num_agents: usize) -> Self {
        Self {
            num_agents,
            ..self.clone()
        }
    }

    /// Same configuration with another seed.
    #[must_use]
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}

/// A finite, strictly positive duration.
fn positive_time(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

/// Turns an answer typed at a terminal into an agent count.
pub fn parse_agent_count(input: &str) -> Result<usize, ConfigError> {
    let agents = input
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidNumber {
            field: "number of agents",
            input: input.trim().to_owned(),
        })?;
    if agents == 0 {
        return Err(ConfigError::NoAgents);
    }
    Ok(agents)
}
