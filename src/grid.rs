//! Grid geometry, food placement and contested consumption.

use crate::config::{FoodRange, WorldConfig};
use crate::ecology::food_quality::DayQuality;
use crate::organism::{Mutation, OrganismId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Cardinal moves: up, down, left, right
pub const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// A cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// An agent waiting on a food cell during the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
struct Claim {
    id: OrganismId,
    mutation: Mutation,
}

/// The bounded world: dimensions, home border and the day's food.
///
/// Food lives in a `BTreeSet` so that iteration order never depends on
/// hashing state; placement draws come from the caller's RNG only.
#[derive(Debug, Clone)]
pub struct Environment {
    width: i32,
    height: i32,
    food_percent: f64,
    food_range: Option<FoodRange>,
    exclude_edges: bool,

    current_percent: f64,
    quality: Option<DayQuality>,
    food: BTreeSet<Position>,
    food_total: usize,
    food_remaining: usize,

    /// Contention side table, valid for one tick only
    occupants: HashMap<Position, Vec<Claim>>,
}

impl Environment {
    /// Create the environment and seed the first day's food
    pub fn new<R: Rng>(config: &WorldConfig, rng: &mut R) -> Self {
        let mut env = Self {
            width: config.width,
            height: config.height,
            food_percent: config.food_percent,
            food_range: config.food_percent_range,
            exclude_edges: config.exclude_edges,
            current_percent: config.food_percent,
            quality: None,
            food: BTreeSet::new(),
            food_total: 0,
            food_remaining: 0,
            occupants: HashMap::new(),
        };
        env.initialize_food(rng);
        env
    }

    /// Replace all food with a fresh random placement.
    ///
    /// The quantity is `round(cells * percent)`, at least one when any cell is
    /// eligible, and positions are drawn without replacement.
    pub fn initialize_food<R: Rng>(&mut self, rng: &mut R) {
        let percent = match self.food_range {
            Some(range) => rng.gen_range(range.min..=range.max),
            None => self.food_percent,
        };
        self.current_percent = percent;
        self.quality = self.food_range.map(|range| DayQuality::classify(percent, range));

        let cells = self.food_cells();
        let quantity = food_quantity(cells.len(), percent);
        self.food = cells.choose_multiple(rng, quantity).copied().collect();
        self.food_total = self.food.len();
        self.food_remaining = self.food_total;
        self.occupants.clear();
    }

    /// Discard every remaining food cell and seed a new day
    pub fn reset_food<R: Rng>(&mut self, rng: &mut R) {
        self.initialize_food(rng);
    }

    /// Cells eligible for food, in column-major order
    fn food_cells(&self) -> Vec<Position> {
        let (x_range, y_range) = if self.exclude_edges {
            (1..self.width - 1, 1..self.height - 1)
        } else {
            (0..self.width, 0..self.height)
        };
        let mut cells = Vec::with_capacity(x_range.len() * y_range.len());
        for x in x_range {
            for y in y_range.clone() {
                cells.push(Position::new(x, y));
            }
        }
        cells
    }

    /// Number of cells food may be placed on
    pub fn food_cell_count(&self) -> usize {
        eligible_cell_count(self.width, self.height, self.exclude_edges)
    }

    #[inline]
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Border cells are home
    #[inline]
    pub fn is_home(&self, pos: Position) -> bool {
        pos.x == 0 || pos.x == self.width - 1 || pos.y == 0 || pos.y == self.height - 1
    }

    #[inline]
    pub fn has_food(&self, pos: Position) -> bool {
        self.food.contains(&pos)
    }

    /// Put food on a cell outside the daily placement. Returns false if the
    /// cell is off the grid or already holds food.
    pub fn place_food(&mut self, pos: Position) -> bool {
        if !self.is_valid_position(pos) || !self.food.insert(pos) {
            return false;
        }
        self.food_total += 1;
        self.food_remaining += 1;
        true
    }

    /// Remove all food without drawing a new placement
    pub fn clear_food(&mut self) {
        self.food.clear();
        self.food_total = 0;
        self.food_remaining = 0;
        self.occupants.clear();
    }

    /// Record that an agent is contending for the food on `pos` this tick.
    /// An agent is registered at most once per cell.
    pub fn register_occupant(&mut self, pos: Position, id: OrganismId, mutation: Mutation) {
        let claims = self.occupants.entry(pos).or_default();
        if !claims.iter().any(|c| c.id == id) {
            claims.push(Claim { id, mutation });
        }
    }

    /// Try to eat the food on `pos`.
    ///
    /// Priority agents always eat. Anyone else loses while a priority agent
    /// is registered on the cell. First successful consumption wins; nothing
    /// is reclaimed afterwards.
    pub fn consume_food(&mut self, pos: Position, id: OrganismId, mutation: Mutation) -> bool {
        if !self.food.contains(&pos) {
            return false;
        }
        self.register_occupant(pos, id, mutation);

        if mutation != Mutation::Priority {
            let reserved = self
                .occupants
                .get(&pos)
                .is_some_and(|claims| claims.iter().any(|c| c.mutation == Mutation::Priority));
            if reserved {
                return false;
            }
        }

        self.food.remove(&pos);
        self.food_remaining -= 1;
        self.occupants.remove(&pos);
        true
    }

    /// Drop every pending claim; called between ticks
    pub fn clear_occupants(&mut self) {
        self.occupants.clear();
    }

    /// Agents currently registered on `pos`
    pub fn occupants_at(&self, pos: Position) -> Vec<OrganismId> {
        self.occupants
            .get(&pos)
            .map(|claims| claims.iter().map(|c| c.id).collect())
            .unwrap_or_default()
    }

    /// A uniformly random cell on one of the four border edges
    pub fn random_home_position<R: Rng>(&self, rng: &mut R) -> Position {
        random_ring_position(0, 0, self.width, self.height, rng)
    }

    /// A random cell on the ring just inside the border, if the grid has one
    pub fn random_inset_position<R: Rng>(&self, rng: &mut R) -> Option<Position> {
        if self.width < 3 || self.height < 3 {
            return None;
        }
        Some(random_ring_position(1, 1, self.width - 2, self.height - 2, rng))
    }

    #[inline]
    pub fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Food still on the grid, in sorted order
    pub fn food_positions(&self) -> impl Iterator<Item = &Position> {
        self.food.iter()
    }

    /// Food placed at the last reset
    #[inline]
    pub fn food_total(&self) -> usize {
        self.food_total
    }

    #[inline]
    pub fn food_remaining(&self) -> usize {
        self.food_remaining
    }

    /// The food fraction used for the current day
    #[inline]
    pub fn food_percent(&self) -> f64 {
        self.current_percent
    }

    /// Quality of the current day, when daily food varies
    #[inline]
    pub fn day_quality(&self) -> Option<DayQuality> {
        self.quality
    }
}

fn food_quantity(cells: usize, percent: f64) -> usize {
    if cells == 0 {
        return 0;
    }
    let quantity = (cells as f64 * percent).round() as usize;
    quantity.clamp(1, cells)
}

/// Cells eligible for food on a `width` x `height` grid, counted in `usize`
fn eligible_cell_count(width: i32, height: i32, exclude_edges: bool) -> usize {
    let inset = if exclude_edges { 2 } else { 0 };
    let span = |extent: i32| usize::try_from(extent.saturating_sub(inset)).unwrap_or(0);
    span(width) * span(height)
}

fn random_ring_position<R: Rng>(x0: i32, y0: i32, width: i32, height: i32, rng: &mut R) -> Position {
    match rng.gen_range(0..4) {
        0 => Position::new(x0 + rng.gen_range(0..width), y0),
        1 => Position::new(x0 + rng.gen_range(0..width), y0 + height - 1),
        2 => Position::new(x0, y0 + rng.gen_range(0..height)),
        _ => Position::new(x0 + width - 1, y0 + rng.gen_range(0..height)),
    }
}

/// Cell -> organism indices, rebuilt every tick for attack lookups
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    width: usize,
    height: usize,
    /// cells[y * width + x] holds indices of organisms on that cell
    cells: Vec<Vec<usize>>,
}

impl SpatialIndex {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0) as usize;
        let height = height.max(0) as usize;
        Self {
            width,
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    #[inline]
    fn slot(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    #[inline]
    pub fn insert(&mut self, pos: Position, idx: usize) {
        if let Some(slot) = self.slot(pos) {
            self.cells[slot].push(idx);
        }
    }

    /// Indices on `pos`, in insertion order
    #[inline]
    pub fn get(&self, pos: Position) -> &[usize] {
        match self.slot(pos) {
            Some(slot) => &self.cells[slot],
            None => &[],
        }
    }

    #[inline]
    pub fn is_occupied(&self, pos: Position) -> bool {
        !self.get(pos).is_empty()
    }
}
