//! Ecological systems layered on the core day cycle.
//!
//! This module contains:
//! - Predation (spawn schedule, placement, bite resolution)
//! - Variable daily food quality

pub mod food_quality;
pub mod predation;

pub use food_quality::DayQuality;
pub use predation::{AttackReport, PredationConfig, PredatorSpawn};
