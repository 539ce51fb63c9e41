//! Organism structure and behavior.

use crate::config::MovementConfig;
use crate::evolution::EvolutionEngine;
use crate::grid::{Environment, Position, DIRECTIONS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique organism identifier
pub type OrganismId = u64;

/// Lineage/family identifier
pub type LineageId = u32;

/// Heritable trait carried by a forager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mutation {
    #[default]
    None,
    /// May take two moves per tick and flees adjacent predators
    Speed,
    /// Wins contested food and survives one extra bite
    Priority,
}

impl Mutation {
    /// Food needed to survive the night at home
    #[inline]
    pub fn survival_threshold(self) -> u32 {
        match self {
            Mutation::Speed => 2,
            Mutation::None | Mutation::Priority => 1,
        }
    }

    /// Food needed to reproduce
    #[inline]
    pub fn reproduction_threshold(self) -> u32 {
        match self {
            Mutation::Speed => 3,
            Mutation::None | Mutation::Priority => 2,
        }
    }

    /// Bites that kill
    #[inline]
    pub fn fatal_bites(self) -> u32 {
        match self {
            Mutation::Priority => 2,
            Mutation::None | Mutation::Speed => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mutation::None => "none",
            Mutation::Speed => "speed",
            Mutation::Priority => "priority",
        }
    }
}

/// Result of an action attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Failed(FailReason),
}

/// Reasons why an action might fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    Dead,
    OutOfBounds,
    /// Predators may not enter home cells
    Sanctuary,
}

/// Cause of death tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Predation,
    /// Away from home when the day ended
    Stranded,
    /// Home, but ate some food below the survival threshold
    Underfed,
}

/// End-of-day verdict for one organism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOutcome {
    pub survives: bool,
    pub reproduces: bool,
    pub child_mutation: Option<Mutation>,
    pub cause_of_death: Option<DeathCause>,
}

impl DayOutcome {
    fn survive(child_mutation: Option<Mutation>) -> Self {
        Self {
            survives: true,
            reproduces: child_mutation.is_some(),
            child_mutation,
            cause_of_death: None,
        }
    }

    fn death(cause: DeathCause) -> Self {
        Self {
            survives: false,
            reproduces: false,
            child_mutation: None,
            cause_of_death: Some(cause),
        }
    }
}

/// An organism in the simulation: a forager, or a predator when
/// `is_predator` is set
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organism {
    // Identity
    pub id: OrganismId,
    pub lineage_id: Option<LineageId>,
    pub generation: u16,
    pub mutation: Mutation,
    pub is_predator: bool,

    // Position
    pub home: Position,
    pub position: Position,
    /// Cells visited since the day began, starting at home
    pub path: Vec<Position>,
    pub steps_taken: u32,
    pub at_home: bool,

    // Daily state
    pub food_eaten: u32,
    pub bites_taken: u32,

    pub alive: bool,
    pub cause_of_death: Option<DeathCause>,
}

impl Organism {
    /// Create a forager resting at `home`
    pub fn new(id: OrganismId, lineage_id: Option<LineageId>, home: Position, mutation: Mutation) -> Self {
        Self {
            id,
            lineage_id,
            generation: 0,
            mutation,
            is_predator: false,
            home,
            position: home,
            path: vec![home],
            steps_taken: 0,
            at_home: true,
            food_eaten: 0,
            bites_taken: 0,
            alive: true,
            cause_of_death: None,
        }
    }

    /// Create a predator; predators belong to no lineage and last one day
    pub fn new_predator(id: OrganismId, position: Position, env: &Environment) -> Self {
        Self {
            is_predator: true,
            at_home: env.is_home(position),
            ..Self::new(id, None, position, Mutation::None)
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Perform this tick's movement. `predators` are the hunters' positions
    /// at the start of the tick.
    ///
    /// Returns false only when nothing could move: dead, or every direction
    /// draw in the retry budget was rejected.
    pub fn step<R: Rng>(
        &mut self,
        env: &mut Environment,
        predators: &[Position],
        movement: &MovementConfig,
        rng: &mut R,
    ) -> bool {
        if !self.alive {
            return false;
        }
        if self.is_predator {
            return self.random_move(env, movement.max_move_attempts, rng);
        }
        if self.is_resting() {
            return true;
        }

        if self.mutation == Mutation::Speed {
            if let Some(threat) = predators.iter().find(|p| p.manhattan(self.position) == 1) {
                let dx = (self.position.x - threat.x).signum();
                let dy = (self.position.y - threat.y).signum();
                // Normal movement follows whether or not the escape worked
                self.try_move(dx, dy, env);
            }
        }

        let mut moved = self.random_move(env, movement.max_move_attempts, rng);
        if self.mutation == Mutation::Speed && rng.gen_bool(movement.speed_extra_step_chance) {
            moved |= self.random_move(env, movement.max_move_attempts, rng);
        }
        moved
    }

    /// Home with enough food: stays put for the rest of the day
    #[inline]
    pub fn is_resting(&self) -> bool {
        !self.is_predator && self.at_home && self.food_eaten >= self.mutation.survival_threshold()
    }

    /// Draw directions until one is enterable, up to `attempts` draws
    fn random_move<R: Rng>(&mut self, env: &mut Environment, attempts: u32, rng: &mut R) -> bool {
        for _ in 0..attempts {
            let (dx, dy) = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
            if self.try_move(dx, dy, env) == ActionResult::Success {
                return true;
            }
        }
        false
    }

    /// Try to move by `(dx, dy)`, eating any food on arrival
    pub fn try_move(&mut self, dx: i32, dy: i32, env: &mut Environment) -> ActionResult {
        if !self.alive {
            return ActionResult::Failed(FailReason::Dead);
        }
        let target = self.position.offset(dx, dy);
        if !env.is_valid_position(target) {
            return ActionResult::Failed(FailReason::OutOfBounds);
        }
        if self.is_predator && env.is_home(target) {
            return ActionResult::Failed(FailReason::Sanctuary);
        }

        self.position = target;
        self.path.push(target);
        self.steps_taken += 1;
        self.at_home = env.is_home(target);

        if !self.is_predator && env.consume_food(target, self.id, self.mutation) {
            self.food_eaten += 1;
        }
        ActionResult::Success
    }

    /// Take one bite; returns true if this bite was fatal
    pub fn receive_bite(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.bites_taken += 1;
        if self.bites_taken >= self.mutation.fatal_bites() {
            self.die(DeathCause::Predation);
            return true;
        }
        false
    }

    pub fn die(&mut self, cause: DeathCause) {
        self.alive = false;
        self.cause_of_death = Some(cause);
    }

    /// Decide survival and reproduction from the state at the end of the day.
    /// Only the child-mutation choice draws from `rng`.
    pub fn evaluate_end_of_day<R: Rng>(&self, evolution: &EvolutionEngine, rng: &mut R) -> DayOutcome {
        if !self.alive {
            return DayOutcome::death(self.cause_of_death.unwrap_or(DeathCause::Predation));
        }
        if !self.at_home {
            return DayOutcome::death(DeathCause::Stranded);
        }

        if self.food_eaten >= self.mutation.survival_threshold() {
            let child_mutation = (self.food_eaten >= self.mutation.reproduction_threshold())
                .then(|| evolution.child_mutation(self.mutation, self.food_eaten, rng));
            DayOutcome::survive(child_mutation)
        } else if self.food_eaten == 0 {
            // Made it home empty-handed: searches again tomorrow
            DayOutcome::survive(None)
        } else {
            DayOutcome::death(DeathCause::Underfed)
        }
    }

    /// Reset daily state and return home
    pub fn prepare_next_day(&mut self) {
        self.food_eaten = 0;
        self.bites_taken = 0;
        self.steps_taken = 0;
        self.position = self.home;
        self.path.clear();
        self.path.push(self.home);
        self.at_home = true;
    }

    /// A fresh child sharing this organism's home and lineage
    pub fn create_child(&self, child_id: OrganismId, mutation: Mutation) -> Organism {
        Organism {
            generation: self.generation + 1,
            ..Organism::new(child_id, self.lineage_id, self.home, mutation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Environment, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let config = WorldConfig {
            width: 10,
            height: 10,
            ..WorldConfig::default()
        };
        let mut env = Environment::new(&config, &mut rng);
        env.clear_food();
        (env, rng)
    }

    fn forager(mutation: Mutation) -> Organism {
        Organism::new(1, Some(0), Position::new(0, 5), mutation)
    }

    fn ended_with(mutation: Mutation, food_eaten: u32, at_home: bool) -> DayOutcome {
        let mut org = forager(mutation);
        org.food_eaten = food_eaten;
        org.at_home = at_home;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        org.evaluate_end_of_day(&EvolutionEngine::default(), &mut rng)
    }

    #[test]
    fn test_organism_creation() {
        let org = forager(Mutation::None);
        assert_eq!(org.id, 1);
        assert_eq!(org.position, org.home);
        assert_eq!(org.path, vec![org.home]);
        assert!(org.at_home);
        assert!(org.is_alive());
    }

    #[test]
    fn test_organism_movement() {
        let (mut env, _) = setup();
        let mut org = forager(Mutation::None);

        assert_eq!(org.try_move(1, 0, &mut env), ActionResult::Success);
        assert_eq!(org.position, Position::new(1, 5));
        assert!(!org.at_home);
        assert_eq!(org.steps_taken, 1);
        assert_eq!(org.path.last(), Some(&org.position));

        assert_eq!(
            forager(Mutation::None).try_move(-1, 0, &mut env),
            ActionResult::Failed(FailReason::OutOfBounds)
        );
    }

    #[test]
    fn test_organism_eating() {
        let (mut env, _) = setup();
        env.place_food(Position::new(1, 5));
        let mut org = forager(Mutation::None);

        org.try_move(1, 0, &mut env);
        assert_eq!(org.food_eaten, 1);
        assert!(!env.has_food(Position::new(1, 5)));
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let (mut env, mut rng) = setup();
        let movement = MovementConfig::default();
        let mut org = forager(Mutation::Speed);

        for _ in 0..200 {
            assert!(org.step(&mut env, &[], &movement, &mut rng));
            assert!(env.is_valid_position(org.position));
            assert_eq!(*org.path.last().unwrap(), org.position);
        }
    }

    #[test]
    fn test_speed_agent_can_double_step() {
        let (mut env, mut rng) = setup();
        let movement = MovementConfig {
            speed_extra_step_chance: 1.0,
            ..MovementConfig::default()
        };
        let mut org = forager(Mutation::Speed);

        org.step(&mut env, &[], &movement, &mut rng);
        assert_eq!(org.steps_taken, 2);
        assert_eq!(org.path.len(), 3);
    }

    #[test]
    fn test_resting_at_home() {
        let (mut env, mut rng) = setup();
        let movement = MovementConfig::default();
        let mut org = forager(Mutation::None);
        org.food_eaten = 1;

        assert!(org.step(&mut env, &[], &movement, &mut rng));
        assert_eq!(org.steps_taken, 0);
        assert_eq!(org.position, org.home);

        // Speed needs two
        let mut fast = forager(Mutation::Speed);
        fast.food_eaten = 1;
        assert!(!fast.is_resting());
    }

    #[test]
    fn test_dead_cannot_step() {
        let (mut env, mut rng) = setup();
        let mut org = forager(Mutation::None);
        org.die(DeathCause::Predation);
        assert!(!org.step(&mut env, &[], &MovementConfig::default(), &mut rng));
        assert_eq!(org.steps_taken, 0);
    }

    #[test]
    fn test_speed_flees_adjacent_predator() {
        let (mut env, mut rng) = setup();
        let movement = MovementConfig {
            speed_extra_step_chance: 0.0,
            ..MovementConfig::default()
        };
        let mut org = forager(Mutation::Speed);
        org.position = Position::new(4, 4);
        org.at_home = false;

        org.step(&mut env, &[Position::new(5, 4)], &movement, &mut rng);
        assert_eq!(org.path[1], Position::new(3, 4));
        assert_eq!(org.steps_taken, 2);
    }

    #[test]
    fn test_predator_never_enters_home() {
        let (mut env, mut rng) = setup();
        let movement = MovementConfig::default();
        let mut predator = Organism::new_predator(50, Position::new(1, 1), &env);

        for _ in 0..300 {
            predator.step(&mut env, &[], &movement, &mut rng);
            assert!(!env.is_home(predator.position));
        }

        predator.position = Position::new(1, 4);
        assert_eq!(
            predator.try_move(-1, 0, &mut env),
            ActionResult::Failed(FailReason::Sanctuary)
        );
    }

    #[test]
    fn test_predator_does_not_eat() {
        let (mut env, _) = setup();
        env.place_food(Position::new(2, 1));
        let mut predator = Organism::new_predator(50, Position::new(1, 1), &env);

        predator.try_move(1, 0, &mut env);
        assert!(env.has_food(Position::new(2, 1)));
        assert_eq!(predator.food_eaten, 0);
    }

    #[test]
    fn test_cornered_predator_fails_silently() {
        let (mut env, mut rng) = setup();
        let mut predator = Organism::new_predator(50, Position::new(0, 0), &env);
        assert!(!predator.step(&mut env, &[], &MovementConfig::default(), &mut rng));
        assert_eq!(predator.position, Position::new(0, 0));
    }

    #[test]
    fn test_bite_thresholds() {
        let mut plain = forager(Mutation::None);
        assert!(plain.receive_bite());
        assert!(!plain.is_alive());
        assert!(!plain.receive_bite());
        assert_eq!(plain.bites_taken, 1);

        let mut fast = forager(Mutation::Speed);
        assert!(fast.receive_bite());

        let mut tough = forager(Mutation::Priority);
        assert!(!tough.receive_bite());
        assert!(tough.is_alive());
        assert!(tough.receive_bite());
        assert_eq!(tough.cause_of_death, Some(DeathCause::Predation));
    }

    #[test]
    fn test_home_empty_handed_survives() {
        for mutation in [Mutation::None, Mutation::Speed, Mutation::Priority] {
            let outcome = ended_with(mutation, 0, true);
            assert!(outcome.survives);
            assert!(!outcome.reproduces);
        }
    }

    #[test]
    fn test_away_from_home_dies() {
        let outcome = ended_with(Mutation::None, 3, false);
        assert!(!outcome.survives);
        assert_eq!(outcome.cause_of_death, Some(DeathCause::Stranded));
    }

    #[test]
    fn test_speed_thresholds() {
        let outcome = ended_with(Mutation::Speed, 1, true);
        assert!(!outcome.survives);
        assert_eq!(outcome.cause_of_death, Some(DeathCause::Underfed));

        let outcome = ended_with(Mutation::Speed, 2, true);
        assert!(outcome.survives);
        assert!(!outcome.reproduces);

        let outcome = ended_with(Mutation::Speed, 3, true);
        assert!(outcome.reproduces);
        assert!(matches!(outcome.child_mutation, Some(Mutation::Speed | Mutation::None)));
    }

    #[test]
    fn test_unmutated_thresholds() {
        let outcome = ended_with(Mutation::None, 1, true);
        assert!(outcome.survives);
        assert!(!outcome.reproduces);

        let outcome = ended_with(Mutation::None, 2, true);
        assert!(outcome.reproduces);
        assert_eq!(outcome.child_mutation, Some(Mutation::None));

        let outcome = ended_with(Mutation::None, 4, true);
        assert!(matches!(outcome.child_mutation, Some(Mutation::Speed | Mutation::Priority)));
    }

    #[test]
    fn test_prepare_next_day() {
        let (mut env, _) = setup();
        let mut org = forager(Mutation::Priority);
        org.try_move(1, 0, &mut env);
        org.food_eaten = 2;
        org.bites_taken = 1;

        org.prepare_next_day();
        assert_eq!(org.position, org.home);
        assert_eq!(org.path, vec![org.home]);
        assert_eq!(org.food_eaten, 0);
        assert_eq!(org.bites_taken, 0);
        assert_eq!(org.steps_taken, 0);
        assert!(org.at_home);
    }

    #[test]
    fn test_create_child() {
        let mut parent = forager(Mutation::None);
        parent.generation = 3;
        parent.food_eaten = 2;

        let child = parent.create_child(7, Mutation::Speed);
        assert_eq!(child.id, 7);
        assert_eq!(child.generation, 4);
        assert_eq!(child.home, parent.home);
        assert_eq!(child.lineage_id, parent.lineage_id);
        assert_eq!(child.mutation, Mutation::Speed);
        assert_eq!(child.food_eaten, 0);
        assert_eq!(child.path, vec![parent.home]);
    }
}
