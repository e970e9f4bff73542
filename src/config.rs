//! Configuration management for taskdeck.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `DEFAULT_MODEL` - Optional. Downstream generator label assigned to tasks
//!   that do not name one. Defaults to `claude-sonnet-4-5`.
//! - `ROUTER_URL` - Optional. Base URL of the routing collaborator service.
//!   Defaults to `http://task-router:8002`.
//! - `SIM_PICKUP_DELAY_MS` - Optional. Delay before a pending task is picked
//!   up by the simulated worker. Defaults to `500`.
//! - `SIM_URGENT_DELAY_MS` / `SIM_HIGH_DELAY_MS` / `SIM_DEFAULT_DELAY_MS` -
//!   Optional. Completion delays per priority. Defaults `2000` / `5000` /
//!   `10000`.
//! - `SIM_FAILURE_RATE` - Optional. Probability in `[0, 1]` that a simulated
//!   completion fails. Defaults to `0.1`.

use std::time::Duration;
use thiserror::Error;

use crate::task::Priority;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Completion simulator timing and failure knobs.
///
/// The exact delay values are policy, not contract: the only guarantee is
/// that `urgent` is serviced no slower than `high`, which is serviced no
/// slower than the rest.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Delay before a pending task transitions to `processing`
    pub pickup_delay_ms: u64,

    /// Completion delay for `urgent` tasks
    pub urgent_delay_ms: u64,

    /// Completion delay for `high` tasks
    pub high_delay_ms: u64,

    /// Completion delay for everything else
    pub default_delay_ms: u64,

    /// Probability that a simulated completion fails
    pub failure_rate: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            pickup_delay_ms: 500,
            urgent_delay_ms: 2_000,
            high_delay_ms: 5_000,
            default_delay_ms: 10_000,
            failure_rate: 0.1,
        }
    }
}

impl SimulatorConfig {
    /// Delay before the simulated worker picks up a pending task.
    pub fn pickup_delay(&self) -> Duration {
        Duration::from_millis(self.pickup_delay_ms)
    }

    /// Completion delay for a task of the given priority.
    pub fn delay_for(&self, priority: Priority) -> Duration {
        let ms = match priority {
            Priority::Urgent => self.urgent_delay_ms,
            Priority::High => self.high_delay_ms,
            Priority::Normal | Priority::Low => self.default_delay_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Default downstream generator label for new tasks
    pub default_model: String,

    /// Base URL of the routing collaborator
    pub router_url: String,

    /// Completion simulator knobs
    pub simulator: SimulatorConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not
    /// parse or `SIM_FAILURE_RATE` falls outside `[0, 1]`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "claude-sonnet-4-5".to_string());

        let router_url =
            std::env::var("ROUTER_URL").unwrap_or_else(|_| "http://task-router:8002".to_string());

        let defaults = SimulatorConfig::default();
        let simulator = SimulatorConfig {
            pickup_delay_ms: env_u64("SIM_PICKUP_DELAY_MS", defaults.pickup_delay_ms)?,
            urgent_delay_ms: env_u64("SIM_URGENT_DELAY_MS", defaults.urgent_delay_ms)?,
            high_delay_ms: env_u64("SIM_HIGH_DELAY_MS", defaults.high_delay_ms)?,
            default_delay_ms: env_u64("SIM_DEFAULT_DELAY_MS", defaults.default_delay_ms)?,
            failure_rate: env_failure_rate("SIM_FAILURE_RATE", defaults.failure_rate)?,
        };

        Ok(Self {
            host,
            port,
            default_model,
            router_url,
            simulator,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(default_model: String, router_url: String) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            default_model,
            router_url,
            simulator: SimulatorConfig::default(),
        }
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

fn env_failure_rate(name: &str, default: f64) -> Result<f64, ConfigError> {
    let rate: f64 = match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))?,
        Err(_) => default,
    };
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("{} is not in [0, 1]", rate),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_for_maps_priorities() {
        let config = SimulatorConfig::default();
        assert_eq!(
            config.delay_for(Priority::Urgent),
            Duration::from_millis(2_000)
        );
        assert_eq!(
            config.delay_for(Priority::High),
            Duration::from_millis(5_000)
        );
        assert_eq!(
            config.delay_for(Priority::Normal),
            Duration::from_millis(10_000)
        );
        assert_eq!(
            config.delay_for(Priority::Low),
            Duration::from_millis(10_000)
        );
    }

    #[test]
    fn urgent_is_never_slower_than_high() {
        let config = SimulatorConfig::default();
        assert!(config.delay_for(Priority::Urgent) <= config.delay_for(Priority::High));
        assert!(config.delay_for(Priority::High) <= config.delay_for(Priority::Low));
    }
}
