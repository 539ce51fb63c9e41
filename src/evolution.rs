//! Mutation inheritance on reproduction.

use crate::config::{Config, EvolutionConfig};
use crate::organism::Mutation;
use rand::Rng;

/// Food an unmutated parent must bring home before its child can gain a
/// new mutation
pub const NOVEL_MUTATION_FOOD: u32 = 3;

/// Decides what mutation each child carries
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    pub speed_inherit_chance: f64,
    pub priority_inherit_chance: f64,
    pub novel_speed_chance: f64,
}

impl EvolutionEngine {
    /// Create evolution engine from config
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.evolution)
    }

    pub fn new(config: &EvolutionConfig) -> Self {
        Self {
            speed_inherit_chance: config.speed_inherit_chance,
            priority_inherit_chance: config.priority_inherit_chance,
            novel_speed_chance: config.novel_speed_chance,
        }
    }

    /// Pick the child's mutation for a parent that reproduced after eating
    /// `food_eaten`.
    ///
    /// | parent   | food | child                                   |
    /// |----------|------|-----------------------------------------|
    /// | speed    | >= 3 | speed (75%) or none                     |
    /// | priority | >= 2 | priority (75%) or none                  |
    /// | none     | 2    | none, no draw                           |
    /// | none     | >= 3 | speed (50%) or priority                 |
    pub fn child_mutation<R: Rng>(&self, parent: Mutation, food_eaten: u32, rng: &mut R) -> Mutation {
        match parent {
            Mutation::Speed => {
                if rng.gen_bool(self.speed_inherit_chance) {
                    Mutation::Speed
                } else {
                    Mutation::None
                }
            }
            Mutation::Priority => {
                if rng.gen_bool(self.priority_inherit_chance) {
                    Mutation::Priority
                } else {
                    Mutation::None
                }
            }
            Mutation::None if food_eaten >= NOVEL_MUTATION_FOOD => {
                if rng.gen_bool(self.novel_speed_chance) {
                    Mutation::Speed
                } else {
                    Mutation::Priority
                }
            }
            Mutation::None => Mutation::None,
        }
    }
}

impl Default for EvolutionEngine {
    fn default() -> Self {
        Self::new(&EvolutionConfig::default())
    }
}
