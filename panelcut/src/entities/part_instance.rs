use crate::entities::{Grain, PartSpec};
use std::sync::Arc;

/// A single physical unit of a [`PartSpec`]: the unit the packers order and place.
#[derive(Clone, Debug, PartialEq)]
pub struct PartInstance {
    /// Unique within a packing run, equal to the instance's index in the expanded list
    pub id: usize,
    /// Index of the originating part in the submitted part list
    pub part_index: usize,
    pub part_id: Arc<str>,
    pub label: Arc<str>,
    pub length: f64,
    pub width: f64,
    pub grain: Grain,
}

impl PartInstance {
    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    pub fn longest_side(&self) -> f64 {
        f64::max(self.length, self.width)
    }

    pub fn shortest_side(&self) -> f64 {
        f64::min(self.length, self.width)
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.length + self.width)
    }

    pub fn is_constrained(&self) -> bool {
        self.grain.is_constrained()
    }

    pub fn is_square(&self) -> bool {
        (self.length - self.width).abs() < crate::geometry::EPSILON
    }
}

/// Expands every part into `quantity` individual instances, with consecutive ids starting at 0.
pub fn expand_instances(parts: &[PartSpec]) -> Vec<PartInstance> {
    let mut instances = Vec::with_capacity(parts.iter().map(|p| p.quantity).sum());
    for (part_index, part) in parts.iter().enumerate() {
        let part_id: Arc<str> = Arc::from(part.id.as_str());
        let label: Arc<str> = Arc::from(part.display_label());
        for _ in 0..part.quantity {
            instances.push(PartInstance {
                id: instances.len(),
                part_index,
                part_id: part_id.clone(),
                label: label.clone(),
                length: part.length,
                width: part.width,
                grain: part.grain,
            });
        }
    }
    instances
}
