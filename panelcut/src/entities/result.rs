use crate::entities::{PartInstance, SheetLayout};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Output of every packing engine.
#[derive(Clone, Debug)]
pub struct LayoutResult {
    pub sheets: Vec<SheetLayout>,
    pub stats: LayoutStats,
    pub unplaced: Vec<UnplacedPart>,
    pub diagnostics: Diagnostics,
}

impl LayoutResult {
    pub fn new(sheets: Vec<SheetLayout>, unplaced: Vec<UnplacedPart>) -> Self {
        let stats = LayoutStats::from_sheets(&sheets);
        let diagnostics = Diagnostics::from_sheets(&sheets);
        LayoutResult {
            sheets,
            stats,
            unplaced,
            diagnostics,
        }
    }

    pub fn empty() -> Self {
        LayoutResult::new(vec![], vec![])
    }

    pub fn with_engine(mut self, engine: &str, strategy: Option<String>, seed: Option<u64>) -> Self {
        self.diagnostics.engine = engine.to_string();
        self.diagnostics.strategy = strategy;
        self.diagnostics.seed = seed;
        self
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(|s| s.placements.len()).sum()
    }

    pub fn unplaced_count(&self) -> usize {
        self.unplaced.iter().map(|u| u.count).sum()
    }

    pub fn placed_qty_of(&self, part_index: usize) -> usize {
        self.sheets
            .iter()
            .flat_map(|s| s.placements.iter())
            .filter(|p| p.part_index == part_index)
            .count()
    }

    pub fn unplaced_qty_of(&self, part_index: usize) -> usize {
        self.unplaced
            .iter()
            .filter(|u| u.part_index == part_index)
            .map(|u| u.count)
            .sum()
    }
}

/// Aggregate statistics over all sheets of a [`LayoutResult`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutStats {
    pub sheet_count: usize,
    pub placed_count: usize,
    pub used_area: f64,
    pub waste_area: f64,
    /// Fraction of the consumed sheet area covered by parts
    pub utilization: f64,
    pub cut_count: usize,
    pub cut_length: f64,
    /// Total edge banding length (mm) per edging thickness (mm)
    pub edging_by_thickness: BTreeMap<u32, f64>,
}

impl LayoutStats {
    pub fn from_sheets(sheets: &[SheetLayout]) -> Self {
        let used_area: f64 = sheets.iter().map(|s| s.used_area).sum();
        let total_area: f64 = sheets.iter().map(|s| s.area()).sum();
        LayoutStats {
            sheet_count: sheets.len(),
            placed_count: sheets.iter().map(|s| s.placements.len()).sum(),
            used_area,
            waste_area: total_area - used_area,
            utilization: match total_area > 0.0 {
                true => used_area / total_area,
                false => 0.0,
            },
            cut_count: sheets.iter().map(|s| s.cut_count()).sum(),
            cut_length: sheets.iter().map(|s| s.cut_length()).sum(),
            edging_by_thickness: BTreeMap::new(),
        }
    }
}

/// Information about how a [`LayoutResult`] was obtained and the quality of its offcuts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub engine: String,
    pub strategy: Option<String>,
    pub seed: Option<u64>,
    /// Mean over sheets of (largest offcut area / total offcut area)
    pub offcut_concentration: f64,
    pub largest_offcut_area: f64,
    /// Total number of offcut pieces over all sheets
    pub fragment_count: usize,
    pub iterations: u64,
    pub improvements: u64,
    /// Number of times the annealing temperature was raised again
    #[serde(default)]
    pub reheats: u64,
    pub score: Option<f64>,
    pub baseline_score: Option<f64>,
    /// Number of distinct vertical cut positions over all sheets
    pub distinct_cut_positions: Option<usize>,
}

impl Diagnostics {
    pub fn from_sheets(sheets: &[SheetLayout]) -> Self {
        let offcut_concentration = match sheets.is_empty() {
            true => 1.0,
            false => {
                sheets.iter().map(|s| s.offcut_concentration()).sum::<f64>() / sheets.len() as f64
            }
        };
        let largest_offcut_area = sheets
            .iter()
            .filter_map(|s| s.largest_offcut())
            .map(|o| OrderedFloat(o.area()))
            .max()
            .map_or(0.0, |a| a.0);

        Diagnostics {
            offcut_concentration,
            largest_offcut_area,
            fragment_count: sheets.iter().map(|s| s.offcuts.len()).sum(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    /// Does not fit on an empty sheet in any allowed orientation
    TooLargeForSheet,
    /// Would fit, but the sheet quantity ran out
    InsufficientSheetCapacity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnplacedPart {
    pub part_index: usize,
    pub part_id: Arc<str>,
    pub label: Arc<str>,
    pub count: usize,
    pub reason: UnplacedReason,
}

impl UnplacedPart {
    /// Groups unplaced instances by part and reason, in order of first appearance.
    pub fn summarize<'a>(
        instances: impl IntoIterator<Item = (&'a PartInstance, UnplacedReason)>,
    ) -> Vec<UnplacedPart> {
        instances
            .into_iter()
            .into_group_map_by(|(inst, reason)| (inst.part_index, *reason))
            .into_iter()
            .map(|((part_index, reason), group)| {
                let (first, _) = group[0];
                UnplacedPart {
                    part_index,
                    part_id: first.part_id.clone(),
                    label: first.label.clone(),
                    count: group.len(),
                    reason,
                }
            })
            .sorted_by_key(|u| (u.part_index, u.reason == UnplacedReason::InsufficientSheetCapacity))
            .collect()
    }
}
