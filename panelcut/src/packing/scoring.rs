use crate::geometry::orientation::Orientation;
use crate::geometry::split::best_split;
use crate::geometry::{EPSILON, Rect};
use crate::packing::PackingConfig;

/// Score of putting a part in `orientation` into `free`, lower is better.
///
/// Starts from the Best-Short-Side-Fit leftover and adjusts for perfect fits, slivers,
/// sheet edges touched by `free`, and the quality of the split the placement would cause.
pub fn placement_score(
    orientation: &Orientation,
    free: &Rect,
    sheet: &Rect,
    kerf: f64,
    config: &PackingConfig,
) -> f64 {
    let leftover_w = free.width() - orientation.footprint_width;
    let leftover_h = free.height() - orientation.footprint_height;

    let positive = [leftover_w, leftover_h]
        .into_iter()
        .filter(|l| *l > EPSILON);
    let mut score = positive.clone().fold(f64::INFINITY, f64::min);
    if score.is_infinite() {
        //the part fills the free rectangle completely
        score = 0.0;
    }

    if leftover_w <= EPSILON || leftover_h <= EPSILON {
        score -= config.perfect_fit_bonus;
    }

    for leftover in positive {
        if leftover < config.min_usable_dimension {
            score += config.sliver_penalty;
        } else if leftover < config.preferred_min_dimension {
            score += config.sub_optimal_penalty;
        }
    }

    score -= config.touching_bonus * free.n_touching_edges(sheet) as f64;

    let split = best_split(
        free,
        orientation.width,
        orientation.height,
        kerf,
        config.min_usable_dimension,
    );
    let area_share = split.largest_area / sheet.area();
    score -= config.concentration_weight * (split.concentration + area_share);
    score += config.fragmentation_penalty * split.fragment_count as f64;

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Grain, PartSpec, expand_instances};
    use crate::geometry::orientation::valid_orientations;

    fn score_in(free: Rect) -> f64 {
        let sheet = Rect::from_dims(0.0, 0.0, 1830.0, 2750.0).unwrap();
        let part = expand_instances(&[PartSpec::new("p", 600.0, 400.0, 1).with_grain(Grain::LengthLocked)]);
        let o = valid_orientations(&part[0], &free, 3.0).next().unwrap();
        placement_score(&o, &free, &sheet, 3.0, &PackingConfig::default())
    }

    #[test]
    fn perfect_fit_beats_sliver() {
        let exact = score_in(Rect::from_dims(0.0, 0.0, 400.0, 900.0).unwrap());
        let sliver = score_in(Rect::from_dims(0.0, 0.0, 450.0, 900.0).unwrap());
        assert!(exact < sliver);
    }

    #[test]
    fn sliver_is_worse_than_usable_leftover() {
        let sliver = score_in(Rect::from_dims(0.0, 0.0, 450.0, 1200.0).unwrap());
        let usable = score_in(Rect::from_dims(0.0, 0.0, 800.0, 1200.0).unwrap());
        assert!(usable < sliver);
    }
}
