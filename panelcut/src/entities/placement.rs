use crate::geometry::Rect;
use crate::geometry::geo_enums::Rotation;
use std::sync::Arc;

/// A part instance placed on a sheet.
/// (`x`, `y`) is the corner closest to the sheet origin; `width`/`height` are the placed dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub instance_id: usize,
    pub part_index: usize,
    pub part_id: Arc<str>,
    pub label: Arc<str>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect {
            x_min: self.x,
            y_min: self.y,
            x_max: self.x + self.width,
            y_max: self.y + self.height,
        }
    }

    /// Footprint including the saw kerf on the far sides
    pub fn kerf_rect(&self, kerf: f64) -> Rect {
        self.rect().inflate(kerf, kerf)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}
