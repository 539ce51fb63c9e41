//! Snapshot structures for external renderers.
//!
//! These are read-only copies of simulation state. A renderer can replay a
//! day from the organisms' paths without touching the `World`.

use crate::grid::Position;
use crate::organism::{Mutation, Organism, OrganismId};
use crate::stats::DayStats;
use crate::world::World;
use serde::Serialize;

/// View of one organism for rendering
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrganismView {
    pub id: OrganismId,
    pub generation: u16,
    pub home: Position,
    pub position: Position,
    /// Cells visited today, starting at home
    pub path: Vec<Position>,
    pub food_eaten: u32,
    pub mutation: Mutation,
    pub alive: bool,
    pub at_home: bool,
    pub bites_taken: u32,
    pub is_predator: bool,
}

impl From<&Organism> for OrganismView {
    fn from(o: &Organism) -> Self {
        Self {
            id: o.id,
            generation: o.generation,
            home: o.home,
            position: o.position,
            path: o.path.clone(),
            food_eaten: o.food_eaten,
            mutation: o.mutation,
            alive: o.alive,
            at_home: o.at_home,
            bites_taken: o.bites_taken,
            is_predator: o.is_predator,
        }
    }
}

/// Complete world snapshot for rendering
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    pub day: u32,
    /// Ticks completed in `day`
    pub tick: u32,
    pub width: i32,
    pub height: i32,
    /// Cells holding food, in ascending order
    pub food: Vec<Position>,
    /// Foragers, including those killed earlier in the day
    pub organisms: Vec<OrganismView>,
    pub predators: Vec<OrganismView>,
    /// Record of the most recently finished day
    pub last_stats: Option<DayStats>,
}

impl WorldSnapshot {
    /// Create a snapshot of the day in progress
    pub fn from_world(world: &World) -> Self {
        Self {
            day: world.day,
            tick: world.tick,
            width: world.environment.width(),
            height: world.environment.height(),
            food: world.environment.food_positions().copied().collect(),
            organisms: world.organisms.iter().map(OrganismView::from).collect(),
            predators: world.predators.iter().map(OrganismView::from).collect(),
            last_stats: world.stats_history.latest().cloned(),
        }
    }

    /// Create a snapshot of the last finished day as it stood when movement
    /// ended. Food reflects the next day's placement.
    pub fn from_last_day(world: &World) -> Self {
        let (predators, organisms): (Vec<&Organism>, Vec<&Organism>) =
            world.last_day_roster().iter().partition(|o| o.is_predator);

        Self {
            day: world.day.saturating_sub(1),
            tick: world.config.population.steps_per_day,
            width: world.environment.width(),
            height: world.environment.height(),
            food: world.environment.food_positions().copied().collect(),
            organisms: organisms.into_iter().map(OrganismView::from).collect(),
            predators: predators.into_iter().map(OrganismView::from).collect(),
            last_stats: world.stats_history.latest().cloned(),
        }
    }

    /// Live foragers in the snapshot
    pub fn living(&self) -> impl Iterator<Item = &OrganismView> {
        self.organisms.iter().filter(|o| o.alive)
    }
}
