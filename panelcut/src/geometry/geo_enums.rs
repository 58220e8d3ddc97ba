use serde::{Deserialize, Serialize};

/// Geometric relation between two rectangles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeoRelation {
    /// No interior overlap, (the rectangles may still share an edge)
    Disjoint,
    /// `self` contains the other
    Surrounding,
    /// `self` is contained in the other
    Enclosed,
    /// Partial overlap
    Intersecting,
}

/// Rotation applied to a part when it was placed on a sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    Deg0,
    #[serde(rename = "90")]
    Deg90,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
        }
    }

    pub fn is_rotated(&self) -> bool {
        *self == Rotation::Deg90
    }
}

/// Axis along which the first guillotine cut of a split runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// The first cut spans the full width of the free rectangle, just above the part
    Horizontal,
    /// The first cut spans the full height of the free rectangle, just right of the part
    Vertical,
}
