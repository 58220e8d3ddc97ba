use crate::entities::{Grain, LayoutResult, PartSpec, Placement};
use crate::geometry::geo_enums::Rotation;
use crate::geometry::{EPSILON, Rect};
use itertools::Itertools;
use log::error;

//Various checks to verify correctness of layouts
//Used in debug_assert!() blocks and tests

/// Every placement lies within `sheet`
pub fn placements_within(placements: &[Placement], sheet: &Rect) -> bool {
    placements.iter().all(|p| {
        let inside = p.x >= sheet.x_min - EPSILON
            && p.y >= sheet.y_min - EPSILON
            && p.x + p.width <= sheet.x_max + EPSILON
            && p.y + p.height <= sheet.y_max + EPSILON;
        if !inside {
            error!("placement of instance {} exceeds the sheet: {:?}", p.instance_id, p.rect());
        }
        inside
    })
}

/// No two kerf-inflated placements intersect
pub fn no_overlapping_placements(placements: &[Placement], kerf: f64) -> bool {
    placements.iter().tuple_combinations().all(|(a, b)| {
        let overlap = a.kerf_rect(kerf).overlaps(&b.rect()) || b.kerf_rect(kerf).overlaps(&a.rect());
        if overlap {
            error!(
                "instances {} and {} overlap: {:?}, {:?}",
                a.instance_id,
                b.instance_id,
                a.rect(),
                b.rect()
            );
        }
        !overlap
    })
}

/// For every part, placed + unplaced instances equals the requested quantity
pub fn quantities_conserved(parts: &[PartSpec], result: &LayoutResult) -> bool {
    parts.iter().enumerate().all(|(idx, part)| {
        let accounted = result.placed_qty_of(idx) + result.unplaced_qty_of(idx);
        if accounted != part.quantity {
            error!(
                "part {} requested {} times, {} accounted for",
                part.id, part.quantity, accounted
            );
        }
        accounted == part.quantity
    })
}

/// Grain locked parts were placed in their only allowed rotation
pub fn grain_respected(parts: &[PartSpec], result: &LayoutResult) -> bool {
    result
        .sheets
        .iter()
        .flat_map(|s| s.placements.iter())
        .all(|p| match parts[p.part_index].grain {
            Grain::Any => true,
            Grain::LengthLocked => p.rotation == Rotation::Deg0,
            Grain::WidthLocked => p.rotation == Rotation::Deg90,
        })
}

/// All layout invariants of a result at once
pub fn result_is_valid(parts: &[PartSpec], result: &LayoutResult) -> bool {
    result.sheets.iter().all(|s| {
        placements_within(&s.placements, &s.bounds())
            && no_overlapping_placements(&s.placements, s.kerf)
    }) && quantities_conserved(parts, result)
        && grain_respected(parts, result)
}
