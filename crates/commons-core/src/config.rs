//! Configuration loading and typed config structures for the Commons
//! simulation.
//!
//! The canonical configuration lives in `commons-config.yaml` at the project
//! root (overridable with the `COMMONS_CONFIG` environment variable). This
//! module defines strongly-typed structs that mirror the YAML structure,
//! provides a loader, and validates the values before a run starts or a
//! live tuning change is staged.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use commons_agents::{FounderConfig, LifecycleConfig};
use commons_world::{DEFAULT_INITIAL_AVERAGE_LIFESPAN, DEFAULT_INITIAL_TOTAL_FOOD, EnvironmentConfig};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "commons-config.yaml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "COMMONS_CONFIG";

/// Errors that can occur when loading or validating configuration.
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

    /// The values parsed but are not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Resolve the configuration path from `COMMONS_CONFIG`, falling back to
/// [`DEFAULT_CONFIG_PATH`].
pub fn config_path_from_env() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `commons-config.yaml`. Every section and field
/// has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial population and founder parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Live-tunable rates.
    #[serde(default)]
    pub tunables: Tunables,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.population.validate()?;
        self.tunables.validate()?;
        if self.logging.stats_interval == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("logging.stats_interval must be at least 1"),
            });
        }
        Ok(())
    }
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

    /// Real-time milliseconds between ticks (0 runs as fast as possible).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Initial population and founder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of founders created at startup.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Starting food for every founder.
    #[serde(default = "default_founder_food")]
    pub founder_food: Decimal,

    /// Starting breeding threshold for every founder.
    #[serde(default = "default_founder_food")]
    pub founder_food_to_breed: Decimal,

    /// Half-width of the random offset on a founder's lifespan.
    #[serde(default = "default_ten")]
    pub founder_lifespan_range: Decimal,

    /// Average lifespan before any agent exists; also the base for founders
    /// injected into an empty population.
    #[serde(default = "default_initial_average_lifespan")]
    pub initial_average_lifespan: Decimal,

    /// Starting size of the shared food pool.
    #[serde(default = "default_initial_total_food")]
    pub initial_total_food: Decimal,

    /// Placement jitter for a child around its parent.
    #[serde(default = "default_ten")]
    pub spawn_jitter: Decimal,

    /// Placement jitter for founders around the world origin.
    #[serde(default = "default_world_jitter")]
    pub world_jitter: Decimal,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            founder_food: default_founder_food(),
            founder_food_to_breed: default_founder_food(),
            founder_lifespan_range: default_ten(),
            initial_average_lifespan: default_initial_average_lifespan(),
            initial_total_food: default_initial_total_food(),
            spawn_jitter: default_ten(),
            world_jitter: default_world_jitter(),
        }
    }
}

impl PopulationConfig {
    /// Founder defaults and placement jitter for the agents crate.
    pub const fn founder_config(&self) -> FounderConfig {
        FounderConfig {
            founder_food: self.founder_food,
            founder_food_to_breed: self.founder_food_to_breed,
            founder_lifespan_range: self.founder_lifespan_range,
            child_spawn_jitter: self.spawn_jitter,
            founder_spawn_jitter: self.world_jitter,
        }
    }

    /// Check founder values and starting aggregates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.founder_config()
            .validate()
            .map_err(|reason| ConfigError::Invalid { reason })?;
        if self.founder_food <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                reason: String::from("population.founder_food must be positive"),
            });
        }
        if self.initial_average_lifespan < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                reason: String::from("population.initial_average_lifespan must not be negative"),
            });
        }
        if self.initial_total_food < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                reason: String::from("population.initial_total_food must not be negative"),
            });
        }
        Ok(())
    }
}

/// Live-tunable rates.
///
/// The whole block can be replaced between ticks with
/// [`Simulation::set_configuration`](crate::simulation::Simulation::set_configuration);
/// changes take effect at the start of the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunables {
    /// Food production per live agent.
    #[serde(default = "default_one")]
    pub per_capita_production: Decimal,

    /// Base food per gather.
    #[serde(default = "default_hundredth")]
    pub solar_yield: Decimal,

    /// Half-width of the random perturbation on the base yield.
    #[serde(default = "default_half_hundredth")]
    pub yield_variance: Decimal,

    /// Extra food per extractive gather.
    #[serde(default = "default_hundredth")]
    pub extractive_bonus: Decimal,

    /// Pollution per extractive gather.
    #[serde(default = "default_hundredth")]
    pub extractive_penalty: Decimal,

    /// Age added per tick.
    #[serde(default = "default_aging_rate")]
    pub aging_rate: Decimal,

    /// Food eaten per tick before the discount.
    #[serde(default = "default_hundredth")]
    pub consumption_baseline: Decimal,

    /// Upper bound of the random consumption discount.
    #[serde(default = "default_half_hundredth")]
    pub consumption_max_discount: Decimal,

    /// Lifespan lost per pollution percentage point per tick.
    #[serde(default = "default_lifespan_pollution_decay")]
    pub lifespan_pollution_decay: Decimal,

    /// Altruism gained when influenced.
    #[serde(default = "default_five")]
    pub influence_bonus: Decimal,

    /// Minimum age (exclusive) to breed.
    #[serde(default = "default_minimum_breeding_age")]
    pub minimum_breeding_age: Decimal,

    /// Food above `food_to_breed` needed to breed.
    #[serde(default = "default_ten")]
    pub breeding_surplus_margin: Decimal,

    /// Pool reserve per live agent needed for anyone to breed.
    #[serde(default = "default_ten")]
    pub breeding_reserve_per_capita: Decimal,

    /// Half-width of trait mutation on children.
    #[serde(default = "default_ten")]
    pub trait_mutation_range: Decimal,

    /// Width of the random bonus on a child's inherited lifespan.
    #[serde(default = "default_ten")]
    pub lifespan_range: Decimal,

    /// Half-width of the mutation on a child's breeding threshold.
    #[serde(default = "default_five")]
    pub food_to_breed_range: Decimal,

    /// Floor for a child's breeding threshold.
    #[serde(default = "default_ten")]
    pub minimum_breed_threshold: Decimal,
}

impl Default for Tunables {
    fn default() -> Self {
        Self::from_parts(&LifecycleConfig::default(), &EnvironmentConfig::default())
    }
}

impl Tunables {
    /// Assemble tunables from the per-crate configs.
    pub fn from_parts(lifecycle: &LifecycleConfig, environment: &EnvironmentConfig) -> Self {
        Self {
            per_capita_production: environment.per_capita_production_rate,
            solar_yield: lifecycle.solar_yield,
            yield_variance: lifecycle.yield_variance,
            extractive_bonus: lifecycle.extractive_bonus,
            extractive_penalty: lifecycle.extractive_penalty,
            aging_rate: lifecycle.aging_rate,
            consumption_baseline: lifecycle.consumption_baseline,
            consumption_max_discount: lifecycle.consumption_max_discount,
            lifespan_pollution_decay: environment.lifespan_pollution_decay,
            influence_bonus: lifecycle.influence_bonus,
            minimum_breeding_age: lifecycle.minimum_breeding_age,
            breeding_surplus_margin: lifecycle.breeding_surplus_margin,
            breeding_reserve_per_capita: lifecycle.breeding_reserve_per_capita,
            trait_mutation_range: lifecycle.trait_mutation_range,
            lifespan_range: lifecycle.lifespan_range,
            food_to_breed_range: lifecycle.food_to_breed_range,
            minimum_breed_threshold: lifecycle.minimum_breed_threshold,
        }
    }

    /// The agent-facing half of the tunables.
    pub const fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            consumption_baseline: self.consumption_baseline,
            consumption_max_discount: self.consumption_max_discount,
            solar_yield: self.solar_yield,
            yield_variance: self.yield_variance,
            extractive_bonus: self.extractive_bonus,
            extractive_penalty: self.extractive_penalty,
            aging_rate: self.aging_rate,
            minimum_breeding_age: self.minimum_breeding_age,
            breeding_surplus_margin: self.breeding_surplus_margin,
            breeding_reserve_per_capita: self.breeding_reserve_per_capita,
            trait_mutation_range: self.trait_mutation_range,
            lifespan_range: self.lifespan_range,
            food_to_breed_range: self.food_to_breed_range,
            minimum_breed_threshold: self.minimum_breed_threshold,
            influence_bonus: self.influence_bonus,
        }
    }

    /// The environment-facing half of the tunables.
    pub const fn environment(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            per_capita_production_rate: self.per_capita_production,
            lifespan_pollution_decay: self.lifespan_pollution_decay,
        }
    }

    /// Reject negative rates, zero production, and inconsistent bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.environment()
            .validate()
            .map_err(|reason| ConfigError::Invalid { reason })?;
        self.lifecycle()
            .validate()
            .map_err(|reason| ConfigError::Invalid { reason })?;
        Ok(())
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Inject founders whenever the population falls below this size
    /// (0 disables recovery, and extinction ends the run).
    #[serde(default)]
    pub min_population: u32,

    /// Random encounter pairs the headless engine reports each tick, in
    /// place of a spatial system.
    #[serde(default = "default_random_encounters_per_tick")]
    pub random_encounters_per_tick: u32,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            min_population: 0,
            random_encounters_per_tick: default_random_encounters_per_tick(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log a population summary every N ticks.
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            stats_interval: default_stats_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Commons")
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_initial_agents() -> u32 {
    100
}

fn default_founder_food() -> Decimal {
    Decimal::from(50)
}

const fn default_initial_average_lifespan() -> Decimal {
    DEFAULT_INITIAL_AVERAGE_LIFESPAN
}

const fn default_initial_total_food() -> Decimal {
    DEFAULT_INITIAL_TOTAL_FOOD
}

const fn default_world_jitter() -> Decimal {
    Decimal::ONE_HUNDRED
}

const fn default_one() -> Decimal {
    Decimal::ONE
}

const fn default_five() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_ten() -> Decimal {
    Decimal::TEN
}

const fn default_hundredth() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

const fn default_half_hundredth() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 3)
}

const fn default_aging_rate() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 1)
}

const fn default_lifespan_pollution_decay() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 3)
}

const fn default_minimum_breeding_age() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 0)
}

const fn default_random_encounters_per_tick() -> u32 {
    5
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_stats_interval() -> u64 {
    10
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.population.initial_agents, 100);
        assert_eq!(config.population.initial_total_food, dec!(1000000));
        assert_eq!(config.tunables.solar_yield, dec!(0.01));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serde_defaults_match_struct_defaults() {
        let parsed = SimulationConfig::parse("world:\n  seed: 42\n").unwrap();
        assert_eq!(parsed, SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Commons"
  seed: 123
  tick_interval_ms: 0

population:
  initial_agents: 12
  founder_food: 40
  founder_food_to_breed: 30
  founder_lifespan_range: 5
  initial_average_lifespan: 80
  initial_total_food: 5000
  spawn_jitter: 4
  world_jitter: 50

tunables:
  per_capita_production: 2
  solar_yield: 0.02
  yield_variance: 0.001
  extractive_bonus: 0.03
  extractive_penalty: 0.04
  aging_rate: 0.5
  consumption_baseline: 0.02
  consumption_max_discount: 0.01
  lifespan_pollution_decay: 0.002
  influence_bonus: 3
  minimum_breeding_age: 10

simulation:
  max_ticks: 500
  min_population: 20
  random_encounters_per_tick: 0

logging:
  log_level: "debug"
  stats_interval: 25
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Test Commons");
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.population.initial_agents, 12);
        assert_eq!(config.population.founder_food_to_breed, dec!(30));
        assert_eq!(config.tunables.per_capita_production, dec!(2));
        assert_eq!(config.tunables.extractive_penalty, dec!(0.04));
        // Unset tunables keep their defaults.
        assert_eq!(config.tunables.trait_mutation_range, dec!(10));
        assert_eq!(config.simulation.max_ticks, 500);
        assert_eq!(config.simulation.min_population, 20);
        assert_eq!(config.logging.stats_interval, 25);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn zero_production_rejected() {
        let yaml = "tunables:\n  per_capita_production: 0\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn negative_rate_rejected() {
        let yaml = "tunables:\n  solar_yield: -0.01\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn tunables_split_and_rejoin() {
        let tunables = Tunables::default();
        let rejoined = Tunables::from_parts(&tunables.lifecycle(), &tunables.environment());
        assert_eq!(rejoined, tunables);
        assert_eq!(tunables.lifecycle(), LifecycleConfig::default());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }

    #[test]
    fn project_config_keeps_builtin_rates() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        if let Ok(config) = SimulationConfig::from_file(&path) {
            assert_eq!(config.population, PopulationConfig::default());
            assert_eq!(config.tunables, Tunables::default());
        }
    }
}
