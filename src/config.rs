//! Configuration system for the foraging simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::ecology::PredationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub predation: PredationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World/environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Number of columns
    pub width: i32,
    /// Number of rows
    pub height: i32,
    /// Fraction of eligible cells seeded with food each day (0.0 - 1.0)
    pub food_percent: f64,
    /// When set, each day draws its food fraction uniformly from this range
    #[serde(default)]
    pub food_percent_range: Option<FoodRange>,
    /// Keep food off the home border
    #[serde(default = "default_true")]
    pub exclude_edges: bool,
}

/// Inclusive bounds for the daily food fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodRange {
    pub min: f64,
    pub max: f64,
}

/// Population and day-length configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents at start
    pub initial_population: usize,
    /// Movement ticks per simulated day
    pub steps_per_day: u32,
    /// Stop after this many days (None = run until extinction)
    #[serde(default)]
    pub max_days: Option<u32>,
}

/// Movement rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Direction draws per move before the move is abandoned
    pub max_move_attempts: u32,
    /// Chance per tick that a speed agent performs a second move
    pub speed_extra_step_chance: f64,
}

/// Mutation inheritance probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Probability a speed parent passes speed on (otherwise none)
    pub speed_inherit_chance: f64,
    /// Probability a priority parent passes priority on (otherwise none)
    pub priority_inherit_chance: f64,
    /// For an unmutated parent with a large surplus: probability the child
    /// gains speed (otherwise priority)
    pub novel_speed_chance: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Days between summary log lines
    pub stats_interval: u32,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            movement: MovementConfig::default(),
            evolution: EvolutionConfig::default(),
            predation: PredationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            food_percent: 0.20,
            food_percent_range: None,
            exclude_edges: true,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_population: 10,
            steps_per_day: 100,
            max_days: Some(100),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_move_attempts: 100,
            speed_extra_step_chance: 0.5,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            speed_inherit_chance: 0.75,
            priority_inherit_chance: 0.75,
            novel_speed_chance: 0.5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 1,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.width <= 0 || world.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: world.width,
                height: world.height,
            });
        }
        if !(0.0..=1.0).contains(&world.food_percent) {
            return Err(ConfigError::FoodPercentOutOfRange(world.food_percent));
        }
        if let Some(range) = world.food_percent_range {
            let in_unit = |p: f64| (0.0..=1.0).contains(&p);
            if !in_unit(range.min) || !in_unit(range.max) || range.min > range.max {
                return Err(ConfigError::InvalidFoodRange {
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if self.population.initial_population == 0 {
            return Err(ConfigError::NoInitialPopulation);
        }
        if self.population.steps_per_day == 0 {
            return Err(ConfigError::NoStepsPerDay);
        }
        if self.movement.max_move_attempts == 0 {
            return Err(ConfigError::NoMoveAttempts);
        }

        let probabilities = [
            ("movement.speed_extra_step_chance", self.movement.speed_extra_step_chance),
            ("evolution.speed_inherit_chance", self.evolution.speed_inherit_chance),
            ("evolution.priority_inherit_chance", self.evolution.priority_inherit_chance),
            ("evolution.novel_speed_chance", self.evolution.novel_speed_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if self.predation.enabled && (self.predation.frequency == 0 || self.predation.count == 0) {
            return Err(ConfigError::InvalidPredation(
                "frequency and count must be > 0 when predation is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidDimensions { width: i32, height: i32 },
    FoodPercentOutOfRange(f64),
    InvalidFoodRange { min: f64, max: f64 },
    NoInitialPopulation,
    NoStepsPerDay,
    NoMoveAttempts,
    InvalidProbability { name: &'static str, value: f64 },
    InvalidPredation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {}x{}", width, height)
            }
            Self::FoodPercentOutOfRange(p) => {
                write!(f, "food_percent must be within [0, 1], got {}", p)
            }
            Self::InvalidFoodRange { min, max } => {
                write!(f, "food_percent_range must satisfy 0 <= min <= max <= 1, got [{}, {}]", min, max)
            }
            Self::NoInitialPopulation => write!(f, "initial_population must be > 0"),
            Self::NoStepsPerDay => write!(f, "steps_per_day must be > 0"),
            Self::NoMoveAttempts => write!(f, "max_move_attempts must be > 0"),
            Self::InvalidProbability { name, value } => {
                write!(f, "{} must be within [0, 1], got {}", name, value)
            }
            Self::InvalidPredation(msg) => write!(f, "invalid predation settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.world.width, loaded.world.width);
        assert_eq!(config.population.steps_per_day, loaded.population.steps_per_day);
    }

    #[test]
    fn test_optional_sections_default() {
        let yaml = "
world:
  width: 20
  height: 15
  food_percent: 0.3
population:
  initial_population: 4
  steps_per_day: 30
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.world.exclude_edges);
        assert_eq!(config.world.food_percent_range, None);
        assert_eq!(config.population.max_days, None);
        assert_eq!(config.movement.max_move_attempts, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let mut config = Config::default();
        config.world.width = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, height: 100 })
        );

        config.world.width = 10;
        config.world.height = -3;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_rejects_food_percent_outside_unit_interval() {
        let mut config = Config::default();
        config.world.food_percent = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::FoodPercentOutOfRange(1.5)));

        config.world.food_percent = 0.2;
        config.world.food_percent_range = Some(FoodRange { min: 0.4, max: 0.1 });
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFoodRange { .. })));
    }

    #[test]
    fn test_rejects_empty_counts() {
        let mut config = Config::default();
        config.population.initial_population = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoInitialPopulation));

        let mut config = Config::default();
        config.population.steps_per_day = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoStepsPerDay));
    }

    #[test]
    fn test_predation_needs_schedule_when_enabled() {
        let mut config = Config::default();
        config.predation.frequency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPredation(_))));

        config.predation.enabled = false;
        assert!(config.validate().is_ok());
    }
}
