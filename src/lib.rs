//! # FORAGERS
//!
//! Day-cycle foraging simulator: agents leave the border of a grid, race for
//! scarce food, and must be home by nightfall to survive and reproduce.
//!
//! ## Features
//!
//! - **Contended food**: priority agents win shared cells
//! - **Mutations**: none, speed and priority, inherited stochastically
//! - **Predators**: periodic hunters that cannot enter the home ring
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foragers::{World, Config};
//!
//! // Create world with default config
//! let config = Config::default();
//! let mut world = World::new(config).unwrap();
//!
//! // Run simulation
//! world.run(50);
//!
//! // Check results
//! println!("Population: {}", world.population());
//! println!("Max generation: {}", world.generation_max);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use foragers::Config;
//!
//! let mut config = Config::default();
//! config.population.initial_population = 40;
//! config.predation.frequency = 3;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Stepping
//!
//! ```rust
//! use foragers::{World, Config};
//! use foragers::snapshot::WorldSnapshot;
//!
//! let mut world = World::new_with_seed(Config::default(), 7).unwrap();
//! while !world.is_day_complete() {
//!     world.step_once();
//!     let frame = WorldSnapshot::from_world(&world);
//!     assert_eq!(frame.tick, world.tick);
//! }
//! let stats = world.end_day();
//! assert_eq!(stats.day, 1);
//! ```

pub mod batch;
pub mod config;
pub mod ecology;
pub mod evolution;
pub mod grid;
pub mod organism;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use config::{Config, ConfigError};
pub use grid::{Environment, Position};
pub use organism::{Mutation, Organism};
pub use stats::DayStats;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(days: u32, population: usize) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.initial_population = population;

    let mut world = World::new(config)?;

    let start = Instant::now();
    let simulated = world.run(days);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        days: simulated,
        initial_population: population,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        days_per_second: simulated as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        max_generation: world.generation_max,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// Days actually simulated (fewer than requested on extinction)
    pub days: u32,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub days_per_second: f64,
    pub max_generation: u16,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Days: {}", self.days)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} days/s", self.days_per_second)?;
        writeln!(f, "Max generation: {}", self.max_generation)?;
        Ok(())
    }
}
