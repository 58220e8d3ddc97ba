use serde::{Deserialize, Serialize};

/// Weights and thresholds of the guillotine placement heuristic.
/// All penalties and bonuses are expressed in millimetres of short-side leftover.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PackingConfig {
    /// Leftovers narrower than this are considered unusable slivers
    pub min_usable_dimension: f64,
    /// Leftovers narrower than this are usable, but not desirable
    pub preferred_min_dimension: f64,
    /// Offcuts smaller than this (mm²) are not counted as reusable
    pub min_usable_area: f64,
    pub sliver_penalty: f64,
    pub sub_optimal_penalty: f64,
    /// Bonus per sheet edge touched by the free rectangle
    pub touching_bonus: f64,
    /// Bonus when the part exactly fills one dimension of the free rectangle
    pub perfect_fit_bonus: f64,
    pub concentration_weight: f64,
    /// Penalty per offcut fragment created by the placement
    pub fragmentation_penalty: f64,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            min_usable_dimension: 100.0,
            preferred_min_dimension: 300.0,
            min_usable_area: 90_000.0,
            sliver_penalty: 500.0,
            sub_optimal_penalty: 100.0,
            touching_bonus: 25.0,
            perfect_fit_bonus: 200.0,
            concentration_weight: 150.0,
            fragmentation_penalty: 50.0,
        }
    }
}
