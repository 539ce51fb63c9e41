//! World simulation engine - the day cycle.

use crate::config::{Config, ConfigError};
use crate::ecology::predation;
use crate::evolution::EvolutionEngine;
use crate::grid::{Environment, Position, SpatialIndex};
use crate::organism::{DeathCause, Mutation, Organism, OrganismId};
use crate::stats::{DayStats, LineageTracker, MutationCounts, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The simulation world
pub struct World {
    // Population
    pub organisms: Vec<Organism>,
    /// Hunters for the current day only
    pub predators: Vec<Organism>,

    // Environment
    pub environment: Environment,
    pub spatial_index: SpatialIndex,

    // State
    /// Current day, starting at 1
    pub day: u32,
    /// Ticks completed in the current day
    pub tick: u32,
    pub generation_max: u16,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats_history: StatsHistory,
    pub lineage_tracker: LineageTracker,

    // Evolution
    pub evolution_engine: EvolutionEngine,

    /// Everyone who took part in the last finished day, as they were when
    /// movement ended
    last_day_roster: Vec<Organism>,

    // ID generation
    next_organism_id: OrganismId,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,

    // Current day bookkeeping
    day_open: bool,
    population_start: usize,
    predators_spawned: usize,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // Food is placed before anyone is created
        let environment = Environment::new(&config.world, &mut rng);
        let spatial_index = SpatialIndex::new(config.world.width, config.world.height);

        let mut lineage_tracker = LineageTracker::new();
        let evolution_engine = EvolutionEngine::from_config(&config);

        // Create initial population
        let mut organisms = Vec::with_capacity(config.population.initial_population);
        let mut next_organism_id: OrganismId = 0;

        for _ in 0..config.population.initial_population {
            let home = environment.random_home_position(&mut rng);
            let lineage_id = lineage_tracker.register_lineage(0);
            organisms.push(Organism::new(next_organism_id, Some(lineage_id), home, Mutation::None));
            next_organism_id += 1;
        }

        log::debug!(
            "World created: {}x{}, population={}, food={}, seed={}",
            config.world.width,
            config.world.height,
            organisms.len(),
            environment.food_total(),
            seed
        );

        Ok(Self {
            organisms,
            predators: Vec::new(),
            environment,
            spatial_index,
            day: 1,
            tick: 0,
            generation_max: 0,
            config,
            stats_history: StatsHistory::new(),
            lineage_tracker,
            evolution_engine,
            last_day_roster: Vec::new(),
            next_organism_id,
            rng,
            seed,
            day_open: false,
            population_start: 0,
            predators_spawned: 0,
        })
    }

    fn allocate_id(&mut self) -> OrganismId {
        let id = self.next_organism_id;
        self.next_organism_id += 1;
        id
    }

    /// Start the current day: snapshot the roster size and release predators
    fn open_day(&mut self) {
        self.day_open = true;
        self.tick = 0;
        self.population_start = self.organisms.len();
        self.predators_spawned = 0;

        if !self.config.predation.spawns_on(self.day) {
            return;
        }
        let spawn = self.config.predation.spawn;
        for _ in 0..self.config.predation.count {
            let position = predation::spawn_position(&self.environment, spawn, &mut self.rng);
            let id = self.allocate_id();
            self.predators.push(Organism::new_predator(id, position, &self.environment));
            log::debug!("Day {}: predator {} spawned at ({}, {})", self.day, id, position.x, position.y);
        }
        self.predators_spawned = self.config.predation.count;
    }

    /// Advance the current day by one tick.
    ///
    /// Every organism moves against the predators' positions from the start of
    /// the tick, then every predator moves, then attacks resolve. Does nothing
    /// once the day is complete.
    pub fn step_once(&mut self) {
        if !self.day_open {
            self.open_day();
        }
        if self.is_day_complete() {
            return;
        }

        // Contention only lasts for one tick
        self.environment.clear_occupants();

        let threats: Vec<Position> = self
            .predators
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| p.position)
            .collect();

        for org in self.organisms.iter_mut() {
            org.step(&mut self.environment, &threats, &self.config.movement, &mut self.rng);
        }
        for predator in self.predators.iter_mut() {
            predator.step(&mut self.environment, &[], &self.config.movement, &mut self.rng);
        }

        if !self.predators.is_empty() {
            predation::index_prey(&mut self.spatial_index, &self.organisms, &self.environment);
            let report = predation::resolve_attacks(
                &self.predators,
                &mut self.organisms,
                &self.spatial_index,
                &self.environment,
            );
            if report.kills > 0 {
                log::trace!("Day {} tick {}: {} killed", self.day, self.tick, report.kills);
            }
        }

        self.tick += 1;
    }

    /// True once every tick of the current day has run
    pub fn is_day_complete(&self) -> bool {
        self.day_open && self.tick >= self.config.population.steps_per_day
    }

    /// Close the current day: judge every organism, fold survivors and their
    /// children into the next roster, discard predators and reseed food.
    pub fn end_day(&mut self) -> DayStats {
        if !self.day_open {
            self.open_day();
        }

        let food_initial = self.environment.food_total();
        let food_remaining = self.environment.food_remaining();
        let food_percent = self.environment.food_percent();
        let day_quality = self.environment.day_quality();

        let mut roster = std::mem::take(&mut self.organisms);
        let mut next = Vec::with_capacity(roster.len() * 2);

        let mut deaths_by_predator = 0;
        let mut deaths_stranded = 0;
        let mut deaths_underfed = 0;
        let mut reproductions = 0;
        let mut new_mutations = MutationCounts::default();

        for org in roster.iter_mut() {
            let outcome = org.evaluate_end_of_day(&self.evolution_engine, &mut self.rng);

            if !outcome.survives {
                let cause = outcome.cause_of_death.unwrap_or(DeathCause::Predation);
                match cause {
                    DeathCause::Predation => deaths_by_predator += 1,
                    DeathCause::Stranded => deaths_stranded += 1,
                    DeathCause::Underfed => deaths_underfed += 1,
                }
                if org.is_alive() {
                    org.die(cause);
                }
                continue;
            }

            next.push(org.clone());

            if let Some(mutation) = outcome.child_mutation {
                let child = org.create_child(self.allocate_id(), mutation);
                if mutation != Mutation::None {
                    new_mutations.add(mutation);
                }
                if let Some(lineage_id) = child.lineage_id {
                    self.lineage_tracker.record_birth(lineage_id);
                }
                self.generation_max = self.generation_max.max(child.generation);
                reproductions += 1;
                next.push(child);
            }
        }

        // Keep the finished day for renderers, predators included
        roster.append(&mut self.predators);
        self.last_day_roster = roster;

        self.environment.reset_food(&mut self.rng);
        log::debug!(
            "Day {}: food reset to {} ({:.1}%{})",
            self.day,
            self.environment.food_total(),
            self.environment.food_percent() * 100.0,
            self.environment
                .day_quality()
                .map(|q| format!(", {}", q))
                .unwrap_or_default()
        );

        for org in next.iter_mut() {
            org.prepare_next_day();
        }
        self.organisms = next;
        self.lineage_tracker.update(&self.organisms);

        let stats = DayStats {
            day: self.day,
            population_start: self.population_start,
            population_end: self.organisms.len(),
            deaths: deaths_by_predator + deaths_stranded + deaths_underfed,
            deaths_by_predator,
            deaths_stranded,
            deaths_underfed,
            reproductions,
            food_initial,
            food_consumed: food_initial - food_remaining,
            food_remaining,
            food_percent,
            day_quality,
            counts: MutationCounts::from_organisms(&self.organisms),
            new_mutations,
            predators_spawned: self.predators_spawned,
            generation_max: self.generation_max,
            lineage_count: self.lineage_tracker.surviving_count(),
        };

        let interval = self.config.logging.stats_interval.max(1);
        if self.day % interval == 0 {
            log::info!("{}", stats.summary());
        }
        if self.organisms.is_empty() {
            log::info!("Population extinct after day {}", self.day);
        }

        self.stats_history.record(stats.clone());
        self.day += 1;
        self.tick = 0;
        self.day_open = false;

        stats
    }

    /// Run one full day
    pub fn simulate_day(&mut self) -> DayStats {
        if !self.day_open {
            self.open_day();
        }
        while !self.is_day_complete() {
            self.step_once();
        }
        self.end_day()
    }

    /// Run up to `days` days, stopping early on extinction. Returns the number
    /// of days simulated.
    pub fn run(&mut self, days: u32) -> u32 {
        self.run_with_callback(days, |_, _| {})
    }

    /// Run until `population.max_days` is reached, or until extinction when
    /// no limit is configured
    pub fn run_to_completion(&mut self) -> u32 {
        match self.config.population.max_days {
            Some(max_days) => self.run(max_days.saturating_sub(self.day - 1)),
            None => {
                let mut days = 0;
                while !self.is_extinct() {
                    self.simulate_day();
                    days += 1;
                }
                days
            }
        }
    }

    /// Run with a callback after each day
    pub fn run_with_callback<F>(&mut self, days: u32, mut callback: F) -> u32
    where
        F: FnMut(&World, &DayStats),
    {
        let mut simulated = 0;
        for _ in 0..days {
            if self.is_extinct() {
                break;
            }
            let stats = self.simulate_day();
            simulated += 1;
            callback(self, &stats);
        }
        simulated
    }

    /// Get current live population
    pub fn population(&self) -> usize {
        self.organisms.iter().filter(|o| o.is_alive()).count()
    }

    /// Check if population is extinct
    pub fn is_extinct(&self) -> bool {
        self.population() == 0
    }

    /// Get seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The roster of the last finished day as it stood when movement ended,
    /// dead and predators included
    pub fn last_day_roster(&self) -> &[Organism] {
        &self.last_day_roster
    }
}
