//! Configuration loading and typed config structures for the housing market
//! simulation.
//!
//! The canonical configuration lives in `housing-config.yaml` at the project
//! root. Every section and field is optional; anything missing falls back to
//! the defaults of the underlying type.
//!
//! Two environment variables override the YAML values:
//! - `HOUSING_SEED` overrides `world.seed`
//! - `HOUSING_MAX_TICKS` overrides `simulation.max_ticks`

use std::path::Path;

use housing_agents::MarketConfig;
use housing_world::PopulationSpec;
use serde::Deserialize;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "HOUSING_SEED";

/// Environment variable overriding `simulation.max_ticks`.
pub const MAX_TICKS_ENV: &str = "HOUSING_MAX_TICKS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds values the model rejects.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `housing-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// Size and attribute ranges of the initial population.
    #[serde(default)]
    pub population: PopulationSpec,

    /// Utility weights, costs, and policies.
    #[serde(default)]
    pub market: MarketConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are applied and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override YAML values with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but is not a
    /// non-negative integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a present value does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SEED_ENV) {
            self.world.seed = parse_u64(SEED_ENV, &raw)?;
        }
        if let Some(raw) = lookup(MAX_TICKS_ENV) {
            self.simulation.max_ticks = parse_u64(MAX_TICKS_ENV, &raw)?;
        }
        Ok(())
    }

    /// Check the population and market sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.population
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;
        self.market.validate().map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }

    /// The market parameters handed to the tick cycle.
    pub fn market_config(&self) -> MarketConfig {
        self.market.clone()
    }
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::Invalid {
        reason: format!("{key} must be a non-negative integer (got {raw:?}: {e})"),
    })
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Number of ticks to run.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_world_name() -> String {
    String::from("housing-market")
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_ticks() -> u64 {
    10
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use housing_types::BalancePolicy;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.simulation.max_ticks, 10);
        assert_eq!(config.population.participants, 10);
        assert_eq!(config.market, MarketConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Market"
  seed: 123

population:
  participants: 5
  assets: 8
  energy_rating: { min: 1, max: 4 }

market:
  weight_financial: "0.5"
  weight_comfort: "0.25"
  weight_environment: "0.25"
  upgrade_cost: "6000"
  moving_cost_rate: "0.01"
  balance_policy: clamp_to_zero

simulation:
  max_ticks: 25

logging:
  level: "debug"
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Test Market");
        assert_eq!(config.population.participants, 5);
        assert_eq!(config.population.assets, 8);
        assert_eq!(config.population.energy_rating.max, 4);
        assert_eq!(config.market.weight_financial, dec!(0.5));
        assert_eq!(config.market.upgrade_cost, dec!(6000));
        assert_eq!(config.market.moving_cost_rate, dec!(0.01));
        assert_eq!(config.market.balance_policy, BalancePolicy::ClampToZero);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let mut config: SimulationConfig = serde_yml::from_str("world:\n  seed: 7\n").unwrap();
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.name, "housing-market");
        assert_eq!(config.market.upgrade_cost, dec!(5000));
    }

    #[test]
    fn parse_empty_yaml() {
        let config: SimulationConfig = serde_yml::from_str("").unwrap_or_default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let yaml = "market:\n  weight_financial: \"0.9\"\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn more_participants_than_assets_rejected() {
        let yaml = "population:\n  participants: 9\n  assets: 3\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn overrides_replace_seed_and_ticks() {
        let mut config = SimulationConfig::default();
        config
            .apply_overrides(|key| match key {
                SEED_ENV => Some(String::from("99")),
                MAX_TICKS_ENV => Some(String::from(" 3 ")),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.world.seed, 99);
        assert_eq!(config.simulation.max_ticks, 3);
    }

    #[test]
    fn malformed_override_is_invalid() {
        let mut config = SimulationConfig::default();
        let result = config.apply_overrides(|key| (key == SEED_ENV).then(|| String::from("abc")));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        assert_eq!(config.world.seed, 42);
    }

    #[test]
    fn market_config_is_the_market_section() {
        let config = SimulationConfig::default();
        assert_eq!(config.market_config(), config.market);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("housing-config.yaml");
        if path.exists() {
            let contents = std::fs::read_to_string(&path).unwrap();
            let config: Result<SimulationConfig, _> = serde_yml::from_str(&contents);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().validate().is_ok());
        }
    }
}
