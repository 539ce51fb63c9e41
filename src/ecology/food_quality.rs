//! Variable daily food quality.

use crate::config::FoodRange;
use serde::{Deserialize, Serialize};

/// How generous a day's food draw was relative to the configured range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayQuality {
    Scarce,
    Normal,
    Abundant,
}

impl DayQuality {
    /// Classify a drawn food fraction by which third of `range` it falls in
    pub fn classify(percent: f64, range: FoodRange) -> DayQuality {
        let span = range.max - range.min;
        if span <= f64::EPSILON {
            return DayQuality::Normal;
        }
        let t = (percent - range.min) / span;
        if t < 1.0 / 3.0 {
            DayQuality::Scarce
        } else if t > 2.0 / 3.0 {
            DayQuality::Abundant
        } else {
            DayQuality::Normal
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            DayQuality::Scarce => "Scarce",
            DayQuality::Normal => "Normal",
            DayQuality::Abundant => "Abundant",
        }
    }
}

impl std::fmt::Display for DayQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
