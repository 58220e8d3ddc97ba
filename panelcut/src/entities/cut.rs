use serde::{Deserialize, Serialize};

/// Direction in which a saw cut runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutDirection {
    /// Runs parallel to the x-axis, at a fixed y
    Horizontal,
    /// Runs parallel to the y-axis, at a fixed x
    Vertical,
}

/// A straight guillotine cut on a sheet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutLine {
    pub direction: CutDirection,
    /// y of a horizontal cut, x of a vertical one
    pub position: f64,
    /// Start and end of the cut along its direction
    pub start: f64,
    pub end: f64,
}

impl CutLine {
    pub fn horizontal(y: f64, x_start: f64, x_end: f64) -> Self {
        CutLine {
            direction: CutDirection::Horizontal,
            position: y,
            start: x_start,
            end: x_end,
        }
    }

    pub fn vertical(x: f64, y_start: f64, y_end: f64) -> Self {
        CutLine {
            direction: CutDirection::Vertical,
            position: x,
            start: y_start,
            end: y_end,
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}
