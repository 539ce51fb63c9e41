//! Statistics tracking for the simulation.

use crate::ecology::DayQuality;
use crate::organism::{Mutation, Organism};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Head count per mutation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCounts {
    pub none: usize,
    pub speed: usize,
    pub priority: usize,
}

impl MutationCounts {
    /// Count the live organisms in `organisms`
    pub fn from_organisms(organisms: &[Organism]) -> Self {
        let mut counts = Self::default();
        for org in organisms.iter().filter(|o| o.is_alive()) {
            counts.add(org.mutation);
        }
        counts
    }

    #[inline]
    pub fn add(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::None => self.none += 1,
            Mutation::Speed => self.speed += 1,
            Mutation::Priority => self.priority += 1,
        }
    }

    #[inline]
    pub fn get(&self, mutation: Mutation) -> usize {
        match mutation {
            Mutation::None => self.none,
            Mutation::Speed => self.speed,
            Mutation::Priority => self.priority,
        }
    }

    pub fn total(&self) -> usize {
        self.none + self.speed + self.priority
    }
}

/// Statistics record for one simulated day
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    /// Day number, starting at 1
    pub day: u32,
    /// Roster size when the day began
    pub population_start: usize,
    /// Survivors plus children
    pub population_end: usize,
    /// All deaths this day
    pub deaths: usize,
    pub deaths_by_predator: usize,
    /// Not home when the day ended
    pub deaths_stranded: usize,
    /// Home but below the survival threshold
    pub deaths_underfed: usize,
    pub reproductions: usize,
    /// Food placed at the start of the day
    pub food_initial: usize,
    pub food_consumed: usize,
    pub food_remaining: usize,
    /// Food fraction drawn for the day
    pub food_percent: f64,
    pub day_quality: Option<DayQuality>,
    /// Population by mutation after reproduction
    pub counts: MutationCounts,
    /// Children born with speed or priority
    pub new_mutations: MutationCounts,
    pub predators_spawned: usize,
    pub generation_max: u16,
    pub lineage_count: usize,
}

impl DayStats {
    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Day:{:4} | Pop:{:4} -> {:4} | Deaths:{:3} (pred {:2}) | Births:{:3} | Food:{:4}/{:4} | N/S/P:{}/{}/{}",
            self.day,
            self.population_start,
            self.population_end,
            self.deaths,
            self.deaths_by_predator,
            self.reproductions,
            self.food_consumed,
            self.food_initial,
            self.counts.none,
            self.counts.speed,
            self.counts.priority,
        );
        if let Some(quality) = self.day_quality {
            line.push_str(&format!(" | {} ({:.0}%)", quality, self.food_percent * 100.0));
        }
        if self.predators_spawned > 0 {
            line.push_str(&format!(" | Predators:{}", self.predators_spawned));
        }
        line
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// One record per finished day
    pub days: Vec<DayStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished day
    pub fn record(&mut self, stats: DayStats) {
        self.days.push(stats);
    }

    pub fn latest(&self) -> Option<&DayStats> {
        self.days.last()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Get end-of-day population over time
    pub fn population_series(&self) -> Vec<(u32, usize)> {
        self.days
            .iter()
            .map(|s| (s.day, s.population_end))
            .collect()
    }

    /// Get the mutation mix over time
    pub fn mutation_series(&self) -> Vec<(u32, MutationCounts)> {
        self.days.iter().map(|s| (s.day, s.counts)).collect()
    }

    pub fn total_deaths(&self) -> usize {
        self.days.iter().map(|s| s.deaths).sum()
    }

    pub fn total_reproductions(&self) -> usize {
        self.days.iter().map(|s| s.reproductions).sum()
    }

    pub fn peak_population(&self) -> usize {
        self.days
            .iter()
            .map(|s| s.population_start.max(s.population_end))
            .max()
            .unwrap_or(0)
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Lineage tracker: each founder opens a lineage, children inherit it
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LineageTracker {
    pub lineages: HashMap<u32, LineageStats>,
    /// Next lineage ID
    pub next_lineage_id: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LineageStats {
    pub founder_day: u32,
    pub current_population: usize,
    pub max_generation: u16,
    pub total_offspring: u64,
    pub extinct: bool,
}

impl LineageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new lineage
    pub fn register_lineage(&mut self, day: u32) -> u32 {
        let id = self.next_lineage_id;
        self.next_lineage_id += 1;

        self.lineages.insert(
            id,
            LineageStats {
                founder_day: day,
                current_population: 1,
                max_generation: 0,
                total_offspring: 0,
                extinct: false,
            },
        );

        id
    }

    pub fn record_birth(&mut self, lineage_id: u32) {
        if let Some(stats) = self.lineages.get_mut(&lineage_id) {
            stats.total_offspring += 1;
        }
    }

    /// Update lineage statistics
    pub fn update(&mut self, organisms: &[Organism]) {
        for stats in self.lineages.values_mut() {
            stats.current_population = 0;
        }

        for org in organisms.iter().filter(|o| o.is_alive()) {
            if let Some(stats) = org.lineage_id.and_then(|id| self.lineages.get_mut(&id)) {
                stats.current_population += 1;
                stats.max_generation = stats.max_generation.max(org.generation);
            }
        }

        // Extinction is permanent
        for stats in self.lineages.values_mut() {
            if stats.current_population == 0 {
                stats.extinct = true;
            }
        }
    }

    /// Get surviving lineages count
    pub fn surviving_count(&self) -> usize {
        self.lineages.values().filter(|s| !s.extinct).count()
    }

    /// Get dominant lineage (highest population, lowest id on ties)
    pub fn dominant_lineage(&self) -> Option<(u32, &LineageStats)> {
        self.lineages
            .iter()
            .filter(|(_, s)| !s.extinct)
            .max_by(|(a_id, a), (b_id, b)| {
                a.current_population
                    .cmp(&b.current_population)
                    .then_with(|| b_id.cmp(a_id))
            })
            .map(|(&id, stats)| (id, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    fn organism(id: u64, lineage: u32, mutation: Mutation) -> Organism {
        Organism::new(id, Some(lineage), Position::new(0, 0), mutation)
    }

    #[test]
    fn test_mutation_counts() {
        let mut organisms = vec![
            organism(1, 0, Mutation::None),
            organism(2, 0, Mutation::Speed),
            organism(3, 1, Mutation::Speed),
            organism(4, 1, Mutation::Priority),
        ];
        organisms[3].alive = false;

        let counts = MutationCounts::from_organisms(&organisms);
        assert_eq!(counts, MutationCounts { none: 1, speed: 2, priority: 0 });
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(Mutation::Speed), 2);
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new();

        for i in 1..=5u32 {
            history.record(DayStats {
                day: i,
                population_start: i as usize * 10,
                population_end: i as usize * 10 + 5,
                deaths: 1,
                reproductions: 2,
                ..DayStats::default()
            });
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (1, 15));
        assert_eq!(series[4], (5, 55));
        assert_eq!(history.total_deaths(), 5);
        assert_eq!(history.total_reproductions(), 10);
        assert_eq!(history.peak_population(), 55);
        assert_eq!(history.latest().map(|s| s.day), Some(5));
        assert_eq!(history.mutation_series().len(), 5);
    }

    #[test]
    fn test_history_save_load() {
        let mut history = StatsHistory::new();
        history.record(DayStats {
            day: 1,
            population_end: 4,
            day_quality: Some(DayQuality::Abundant),
            ..DayStats::default()
        });

        let path = std::env::temp_dir().join(format!("foragers_history_{}.json", std::process::id()));
        history.save(&path).unwrap();
        let loaded = StatsHistory::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.days, history.days);
    }

    #[test]
    fn test_summary_mentions_quality() {
        let stats = DayStats {
            day: 3,
            day_quality: Some(DayQuality::Scarce),
            food_percent: 0.12,
            ..DayStats::default()
        };
        let line = stats.summary();
        assert!(line.starts_with("Day:   3"));
        assert!(line.contains("Scarce (12%)"));
    }

    #[test]
    fn test_lineage_tracker() {
        let mut tracker = LineageTracker::new();

        let id1 = tracker.register_lineage(1);
        let id2 = tracker.register_lineage(1);
        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
        assert_eq!(tracker.surviving_count(), 2);

        let mut child = organism(5, id1, Mutation::None);
        child.generation = 2;
        tracker.record_birth(id1);
        tracker.update(&[organism(1, id1, Mutation::None), child]);

        assert_eq!(tracker.surviving_count(), 1);
        let (dominant, stats) = tracker.dominant_lineage().unwrap();
        assert_eq!(dominant, id1);
        assert_eq!(stats.current_population, 2);
        assert_eq!(stats.max_generation, 2);
        assert_eq!(stats.total_offspring, 1);
    }
}
