//! Predation system - spawning and bite resolution.

use crate::grid::{Environment, Position, SpatialIndex};
use crate::organism::Organism;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where predators appear when they spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PredatorSpawn {
    /// A random home (border) cell
    Border,
    /// A random cell on the ring just inside the border
    #[default]
    Inset,
}

/// Predation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredationConfig {
    /// Is predation enabled
    pub enabled: bool,
    /// Predators appear on days divisible by this
    pub frequency: u32,
    /// Predators spawned per predator day
    pub count: usize,
    /// Spawn placement rule
    #[serde(default)]
    pub spawn: PredatorSpawn,
}

impl Default for PredationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 2,
            count: 1,
            spawn: PredatorSpawn::Inset,
        }
    }
}

impl PredationConfig {
    /// Whether predators hunt on `day`
    pub fn spawns_on(&self, day: u32) -> bool {
        self.enabled && self.frequency > 0 && day % self.frequency == 0
    }
}

/// Pick a starting cell for a new predator
pub fn spawn_position<R: Rng>(env: &Environment, spawn: PredatorSpawn, rng: &mut R) -> Position {
    match spawn {
        PredatorSpawn::Border => env.random_home_position(rng),
        PredatorSpawn::Inset => env
            .random_inset_position(rng)
            .unwrap_or_else(|| env.random_home_position(rng)),
    }
}

/// Outcome of one tick's attack resolution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackReport {
    pub bites: usize,
    pub kills: usize,
}

/// Rebuild `index` with every live organism standing outside the home ring
pub fn index_prey(index: &mut SpatialIndex, organisms: &[Organism], env: &Environment) {
    index.clear();
    for (idx, org) in organisms.iter().enumerate() {
        if org.is_alive() && !env.is_home(org.position) {
            index.insert(org.position, idx);
        }
    }
}

/// Every predator outside the home ring bites every live organism sharing
/// its cell. Home cells are a sanctuary on both sides.
pub fn resolve_attacks(
    predators: &[Organism],
    organisms: &mut [Organism],
    index: &SpatialIndex,
    env: &Environment,
) -> AttackReport {
    let mut report = AttackReport::default();

    for predator in predators.iter().filter(|p| p.is_alive()) {
        if env.is_home(predator.position) {
            continue;
        }
        for &idx in index.get(predator.position) {
            let prey = &mut organisms[idx];
            if !prey.is_alive() {
                continue;
            }
            report.bites += 1;
            let fatal = prey.receive_bite();
            log::trace!(
                "predator {} bit organism {} at ({}, {}){}",
                predator.id,
                prey.id,
                predator.position.x,
                predator.position.y,
                if fatal { " - fatal" } else { "" }
            );
            if fatal {
                report.kills += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::organism::Mutation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Environment, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let config = WorldConfig {
            width: 10,
            height: 10,
            ..WorldConfig::default()
        };
        let mut env = Environment::new(&config, &mut rng);
        env.clear_food();
        (env, rng)
    }

    fn prey_at(id: u64, pos: Position, mutation: Mutation) -> Organism {
        let mut org = Organism::new(id, Some(0), Position::new(0, pos.y), mutation);
        org.position = pos;
        org.at_home = pos.x == 0;
        org
    }

    fn attack(predators: &[Organism], organisms: &mut [Organism], env: &Environment) -> AttackReport {
        let mut index = SpatialIndex::new(env.width(), env.height());
        index_prey(&mut index, organisms, env);
        resolve_attacks(predators, organisms, &index, env)
    }

    #[test]
    fn test_spawn_schedule() {
        let config = PredationConfig::default();
        assert!(!config.spawns_on(1));
        assert!(config.spawns_on(2));
        assert!(config.spawns_on(4));

        let disabled = PredationConfig {
            enabled: false,
            ..PredationConfig::default()
        };
        assert!(!disabled.spawns_on(2));
    }

    #[test]
    fn test_spawn_positions() {
        let (env, mut rng) = setup();
        for _ in 0..50 {
            assert!(env.is_home(spawn_position(&env, PredatorSpawn::Border, &mut rng)));
            assert!(!env.is_home(spawn_position(&env, PredatorSpawn::Inset, &mut rng)));
        }
    }

    #[test]
    fn test_bite_kills_unmutated() {
        let (env, _) = setup();
        let predator = Organism::new_predator(100, Position::new(5, 5), &env);
        let mut organisms = vec![prey_at(1, Position::new(5, 5), Mutation::None)];

        let report = attack(&[predator], &mut organisms, &env);

        assert_eq!(report, AttackReport { bites: 1, kills: 1 });
        assert_eq!(organisms[0].bites_taken, 1);
        assert!(!organisms[0].is_alive());
    }

    #[test]
    fn test_priority_survives_one_bite() {
        let (env, _) = setup();
        let predator = Organism::new_predator(100, Position::new(5, 5), &env);
        let mut organisms = vec![prey_at(1, Position::new(5, 5), Mutation::Priority)];

        let report = attack(&[predator.clone()], &mut organisms, &env);
        assert_eq!(report.kills, 0);
        assert!(organisms[0].is_alive());

        let report = attack(&[predator], &mut organisms, &env);
        assert_eq!(report.kills, 1);
        assert!(!organisms[0].is_alive());
    }

    #[test]
    fn test_home_is_sanctuary() {
        let (env, _) = setup();
        let inside = Organism::new_predator(100, Position::new(1, 4), &env);
        let mut organisms = vec![
            prey_at(1, Position::new(0, 4), Mutation::None),
            prey_at(2, Position::new(2, 2), Mutation::None),
        ];
        let report = attack(&[inside], &mut organisms, &env);
        assert_eq!(report.bites, 0);

        // A predator on the border cannot attack either
        let mut on_border = Organism::new_predator(101, Position::new(1, 4), &env);
        on_border.position = Position::new(0, 4);
        let report = attack(&[on_border], &mut organisms, &env);
        assert_eq!(report.bites, 0);
        assert!(organisms.iter().all(|o| o.is_alive()));
    }

    #[test]
    fn test_dead_prey_not_bitten_again() {
        let (env, _) = setup();
        let cell = Position::new(4, 4);
        let predators = vec![
            Organism::new_predator(100, cell, &env),
            Organism::new_predator(101, cell, &env),
        ];
        let mut organisms = vec![prey_at(1, cell, Mutation::Speed)];

        let report = attack(&predators, &mut organisms, &env);
        assert_eq!(report, AttackReport { bites: 1, kills: 1 });
        assert_eq!(organisms[0].bites_taken, 1);
    }
}
