use panelcut::entities::LayoutResult;

/// Score per consumed sheet, dominates all quality terms
pub const SHEET_PENALTY: f64 = 1.0e7;
/// Score per unplaced (but placeable) instance, dominates the sheet count
pub const UNPLACED_PENALTY: f64 = 1.0e9;

const UTILIZATION_WEIGHT: f64 = 10_000.0;
const LARGEST_OFFCUT_WEIGHT: f64 = 2_000.0;
const CONCENTRATION_WEIGHT: f64 = 1_000.0;
const FRAGMENT_PENALTY: f64 = 50.0;
const COMPACTNESS_WEIGHT: f64 = 1_500.0;

/// Compares layout results, higher scores are better.
pub trait LayoutScorer {
    fn score(&self, result: &LayoutResult) -> f64;
}

/// Score of the multi strategy heuristic search, see [`result_score`]
#[derive(Clone, Copy, Debug)]
pub struct HeuristicScorer {
    pub sheet_area: f64,
}

impl LayoutScorer for HeuristicScorer {
    fn score(&self, result: &LayoutResult) -> f64 {
        result_score(result, self.sheet_area)
    }
}

/// Score of the annealing search, see [`result_score_v2`]
#[derive(Clone, Copy, Debug)]
pub struct CompactnessScorer {
    pub sheet_area: f64,
}

impl LayoutScorer for CompactnessScorer {
    fn score(&self, result: &LayoutResult) -> f64 {
        result_score_v2(result, self.sheet_area)
    }
}

/// Lexicographic strip packer objective: fewest sheets, then fewest unplaced instances, then fewest cuts
#[derive(Clone, Copy, Debug, Default)]
pub struct StripScorer;

impl LayoutScorer for StripScorer {
    fn score(&self, result: &LayoutResult) -> f64 {
        -(result.sheet_count() as f64 * 1.0e12
            + result.unplaced_count() as f64 * 1.0e6
            + result.stats.cut_count as f64)
    }
}

/// Multi-level score of a result, higher is better:
/// 1. unplaced instances and consumed sheets, as large fixed penalties
/// 2. utilization of the consumed sheets
/// 3. size of the largest offcut relative to a sheet and the concentration of the offcut area
/// 4. penalty per offcut fragment
pub fn result_score(result: &LayoutResult, sheet_area: f64) -> f64 {
    let diag = &result.diagnostics;
    let penalties = result.unplaced_count() as f64 * UNPLACED_PENALTY
        + result.sheet_count() as f64 * SHEET_PENALTY;
    let utilization = result.stats.utilization * UTILIZATION_WEIGHT;
    let offcut_quality = (diag.largest_offcut_area / sheet_area) * LARGEST_OFFCUT_WEIGHT
        + diag.offcut_concentration * CONCENTRATION_WEIGHT;
    let fragments = diag.fragment_count as f64 * FRAGMENT_PENALTY;

    utilization + offcut_quality - fragments - penalties
}

/// [`result_score`] extended with a compactness term:
/// the mean ratio of the placements' bounding box to the sheet area, smaller is rewarded.
pub fn result_score_v2(result: &LayoutResult, sheet_area: f64) -> f64 {
    result_score(result, sheet_area) - compactness(result, sheet_area) * COMPACTNESS_WEIGHT
}

/// Mean over all sheets of (bounding box of the placements / sheet area), 0.0 without sheets
pub fn compactness(result: &LayoutResult, sheet_area: f64) -> f64 {
    match result.sheets.is_empty() {
        true => 0.0,
        false => {
            result
                .sheets
                .iter()
                .map(|s| s.bounding_box().map_or(0.0, |bb| bb.area()) / sheet_area)
                .sum::<f64>()
                / result.sheets.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcut::entities::{Placement, SheetLayout, UnplacedPart, UnplacedReason};
    use panelcut::geometry::Rect;
    use panelcut::geometry::geo_enums::Rotation;
    use std::sync::Arc;

    fn sheet(placements: &[(f64, f64, f64, f64)]) -> SheetLayout {
        let bounds = Rect::from_dims(0.0, 0.0, 1000.0, 1000.0).unwrap();
        let placements = placements
            .iter()
            .enumerate()
            .map(|(i, &(x, y, width, height))| Placement {
                instance_id: i,
                part_index: 0,
                part_id: Arc::from("p"),
                label: Arc::from("p"),
                x,
                y,
                width,
                height,
                rotation: Rotation::Deg0,
            })
            .collect();
        SheetLayout::new("s", 0, bounds, 0.0, placements, vec![], vec![])
    }

    #[test]
    fn fewer_sheets_always_win() {
        let one = LayoutResult::new(vec![sheet(&[(0.0, 0.0, 100.0, 100.0)])], vec![]);
        let two = LayoutResult::new(
            vec![
                sheet(&[(0.0, 0.0, 1000.0, 1000.0)]),
                sheet(&[(0.0, 0.0, 1000.0, 1000.0)]),
            ],
            vec![],
        );
        assert!(result_score(&one, 1.0e6) > result_score(&two, 1.0e6));
    }

    #[test]
    fn unplaced_instances_outweigh_sheets() {
        let placed = LayoutResult::new(
            vec![sheet(&[(0.0, 0.0, 10.0, 10.0)]), sheet(&[(0.0, 0.0, 10.0, 10.0)])],
            vec![],
        );
        let unplaced = LayoutResult::new(
            vec![sheet(&[(0.0, 0.0, 10.0, 10.0)])],
            vec![UnplacedPart {
                part_index: 0,
                part_id: Arc::from("p"),
                label: Arc::from("p"),
                count: 1,
                reason: UnplacedReason::InsufficientSheetCapacity,
            }],
        );
        assert!(result_score(&placed, 1.0e6) > result_score(&unplaced, 1.0e6));
    }

    #[test]
    fn compact_layouts_are_rewarded() {
        let spread = LayoutResult::new(
            vec![sheet(&[(0.0, 0.0, 100.0, 100.0), (900.0, 900.0, 100.0, 100.0)])],
            vec![],
        );
        let packed = LayoutResult::new(
            vec![sheet(&[(0.0, 0.0, 100.0, 100.0), (100.0, 0.0, 100.0, 100.0)])],
            vec![],
        );
        assert!(compactness(&packed, 1.0e6) < compactness(&spread, 1.0e6));
        assert!(result_score_v2(&packed, 1.0e6) > result_score_v2(&spread, 1.0e6));
    }
}
