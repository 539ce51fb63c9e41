//! Independent replicate runs.
//!
//! Each seed gets its own `World`; worlds share nothing, so replicates run
//! in parallel and stay individually reproducible.

use crate::config::{Config, ConfigError};
use crate::stats::{MutationCounts, StatsHistory};
use crate::world::World;
use rayon::prelude::*;
use serde::Serialize;

/// Outcome of one replicate
#[derive(Clone, Debug, Serialize)]
pub struct ReplicateSummary {
    pub seed: u64,
    pub days_simulated: u32,
    pub extinct: bool,
    pub final_population: usize,
    pub peak_population: usize,
    pub final_counts: MutationCounts,
    pub total_deaths: usize,
    pub total_reproductions: usize,
    pub generation_max: u16,
    pub surviving_lineages: usize,
}

impl ReplicateSummary {
    fn from_world(world: &World, days_simulated: u32) -> Self {
        let history: &StatsHistory = &world.stats_history;
        Self {
            seed: world.seed(),
            days_simulated,
            extinct: world.is_extinct(),
            final_population: world.population(),
            peak_population: history.peak_population(),
            final_counts: MutationCounts::from_organisms(&world.organisms),
            total_deaths: history.total_deaths(),
            total_reproductions: history.total_reproductions(),
            generation_max: world.generation_max,
            surviving_lineages: world.lineage_tracker.surviving_count(),
        }
    }
}

/// Run one world per seed for up to `max_days` days each.
///
/// Summaries come back in the order of `seeds`.
pub fn run_replicates(
    config: &Config,
    seeds: &[u64],
    max_days: u32,
) -> Result<Vec<ReplicateSummary>, ConfigError> {
    config.validate()?;

    seeds
        .par_iter()
        .map(|&seed| -> Result<ReplicateSummary, ConfigError> {
            let mut world = World::new_with_seed(config.clone(), seed)?;
            let days = world.run(max_days);
            Ok(ReplicateSummary::from_world(&world, days))
        })
        .collect()
}

/// Fraction of replicates that went extinct
pub fn extinction_rate(summaries: &[ReplicateSummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    summaries.iter().filter(|s| s.extinct).count() as f64 / summaries.len() as f64
}
