use crate::opt::score::{LayoutScorer, StripScorer};
use itertools::Itertools;
use log::{debug, info};
use ordered_float::OrderedFloat;
use panelcut::entities::{
    CutDirection, CutLine, LayoutResult, PartInstance, PartSpec, Placement, SheetLayout,
    StockSheetSpec, UnplacedPart, UnplacedReason, expand_instances,
};
use panelcut::geometry::geo_enums::Rotation;
use panelcut::geometry::orientation::{allowed_rotations, placed_dims};
use panelcut::geometry::{EPSILON, Rect};
use panelcut::util::assertions;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Configuration of the strip packer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct StripConfig {
    /// Relative height difference tolerated within a height band
    pub height_tolerance: f64,
    /// Maximum unused width of a nested pair, as a fraction of the sheet width
    pub nesting_tolerance: f64,
    /// In-strip cuts within this distance (mm) of a cut in another strip are moved onto it
    pub alignment_tolerance: f64,
    pub align_cuts: bool,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            height_tolerance: 0.15,
            nesting_tolerance: 0.05,
            alignment_tolerance: 2.0,
            align_cuts: true,
        }
    }
}

/// Ways of arranging strips on a sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripApproach {
    /// Horizontal strips built from height bands
    Banded,
    /// Pairs of parts filling the sheet width share a strip, the rest is banded
    Nested,
    /// Vertical sections built from width bands
    VerticalFirst,
}

impl StripApproach {
    pub const ALL: [StripApproach; 3] = [
        StripApproach::Banded,
        StripApproach::Nested,
        StripApproach::VerticalFirst,
    ];
}

impl Display for StripApproach {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StripApproach::Banded => write!(f, "banded"),
            StripApproach::Nested => write!(f, "nested"),
            StripApproach::VerticalFirst => write!(f, "vertical_first"),
        }
    }
}

/// A part placed in a strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripItem {
    /// Index into the expanded instances
    pub instance: usize,
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
    /// Position of the cut separating this item from the next, `x + width` unless aligned
    pub cut_x: f64,
}

/// A horizontal band of a sheet, spanning its full width, holding parts side by side.
#[derive(Clone, Debug, PartialEq)]
pub struct Strip {
    pub y: f64,
    /// Height of the tallest item, never less than the height the strip was opened with
    pub height: f64,
    pub items: Vec<StripItem>,
    /// Right edge of the last cut section
    pub used_width: f64,
}

impl Strip {
    pub fn new(height: f64) -> Self {
        Strip {
            y: 0.0,
            height,
            items: vec![],
            used_width: 0.0,
        }
    }

    fn next_x(&self, kerf: f64) -> f64 {
        match self.items.is_empty() {
            true => 0.0,
            false => self.used_width + kerf,
        }
    }

    pub fn fits(&self, width: f64, sheet_width: f64, kerf: f64) -> bool {
        self.next_x(kerf) + width <= sheet_width + EPSILON
    }

    fn push(&mut self, item: &Oriented, kerf: f64) {
        let x = self.next_x(kerf);
        self.items.push(StripItem {
            instance: item.instance,
            x,
            width: item.width,
            height: item.height,
            rotation: item.rotation,
            cut_x: x + item.width,
        });
        self.used_width = x + item.width;
        self.height = self.height.max(item.height);
    }
}

/// An instance in its strip orientation
#[derive(Clone, Copy, Debug)]
struct Oriented {
    instance: usize,
    width: f64,
    height: f64,
    rotation: Rotation,
}

/// Orients a part for strip packing: wider than tall when `prefer_wide` (taller than wide otherwise),
/// as far as its grain and the sheet allow.
fn orient(
    part: &PartInstance,
    sheet_width: f64,
    sheet_length: f64,
    prefer_wide: bool,
) -> Option<(f64, f64, Rotation)> {
    allowed_rotations(part)
        .iter()
        .map(|&r| {
            let (w, h) = placed_dims(part, r);
            (w, h, r)
        })
        .filter(|(w, h, _)| *w <= sheet_width + EPSILON && *h <= sheet_length + EPSILON)
        .max_by_key(|(w, h, _)| (w >= h) == prefer_wide)
}

/// Groups the items into height bands and fills strips per band by first-fit-decreasing width.
fn build_strips(items: &[Oriented], sheet_width: f64, kerf: f64, tolerance: f64) -> Vec<Strip> {
    let mut bands: Vec<(f64, Vec<Oriented>)> = vec![];
    for item in items
        .iter()
        .sorted_by_key(|o| (Reverse(OrderedFloat(o.height)), Reverse(OrderedFloat(o.width))))
    {
        match bands.last_mut() {
            Some((leader, members)) if item.height >= *leader * (1.0 - tolerance) - EPSILON => {
                members.push(*item)
            }
            _ => bands.push((item.height, vec![*item])),
        }
    }

    let mut strips = vec![];
    for (_, members) in bands {
        let mut band_strips: Vec<Strip> = vec![];
        for item in members
            .iter()
            .sorted_by_key(|o| Reverse(OrderedFloat(o.width)))
        {
            match band_strips
                .iter_mut()
                .find(|s| s.fits(item.width, sheet_width, kerf))
            {
                Some(strip) => strip.push(item, kerf),
                None => {
                    let mut strip = Strip::new(0.0);
                    strip.push(item, kerf);
                    band_strips.push(strip);
                }
            }
        }
        strips.extend(band_strips);
    }
    strips
}

/// Pairs items whose widths (plus kerf) fill the sheet width up to `tolerance`.
/// Every pair becomes a strip with two sections, the unpaired items are returned.
fn nested_strips(
    items: &[Oriented],
    sheet_width: f64,
    kerf: f64,
    tolerance: f64,
) -> (Vec<Strip>, Vec<Oriented>) {
    let sorted = items
        .iter()
        .copied()
        .sorted_by_key(|o| Reverse(OrderedFloat(o.width)))
        .collect_vec();
    let mut paired = vec![false; sorted.len()];
    let mut strips = vec![];

    for i in 0..sorted.len() {
        if paired[i] {
            continue;
        }
        let partner = (i + 1..sorted.len())
            .filter(|&j| !paired[j])
            .map(|j| (j, sheet_width - (sorted[i].width + kerf + sorted[j].width)))
            .filter(|&(_, waste)| waste >= -EPSILON && waste <= tolerance * sheet_width)
            .min_by_key(|&(_, waste)| OrderedFloat(waste));

        if let Some((j, _)) = partner {
            paired[i] = true;
            paired[j] = true;
            let mut strip = Strip::new(0.0);
            strip.push(&sorted[i], kerf);
            strip.push(&sorted[j], kerf);
            strips.push(strip);
        }
    }

    let rest = sorted
        .into_iter()
        .zip(paired)
        .filter_map(|(o, p)| (!p).then_some(o))
        .collect_vec();
    (strips, rest)
}

/// Stacks strips onto sheets by first-fit-decreasing height.
/// Returns the strips per sheet and the strips that did not fit within `max_sheets`.
fn stack_strips(
    strips: Vec<Strip>,
    sheet_length: f64,
    kerf: f64,
    max_sheets: usize,
) -> (Vec<Vec<Strip>>, Vec<Strip>) {
    let mut sheets: Vec<Vec<Strip>> = vec![];
    let mut next_y: Vec<f64> = vec![];
    let mut leftover = vec![];

    for mut strip in strips
        .into_iter()
        .sorted_by_key(|s| Reverse(OrderedFloat(s.height)))
    {
        let slot = (0..sheets.len()).find(|&s| next_y[s] + strip.height <= sheet_length + EPSILON);
        match slot {
            Some(s) => {
                strip.y = next_y[s];
                next_y[s] = strip.y + strip.height + kerf;
                sheets[s].push(strip);
            }
            None if sheets.len() < max_sheets => {
                strip.y = 0.0;
                next_y.push(strip.height + kerf);
                sheets.push(vec![strip]);
            }
            None => leftover.push(strip),
        }
    }
    (sheets, leftover)
}

/// Moves in-strip cuts onto cut positions already used by earlier strips of the sheet,
/// when they lie within `tolerance` to the right and the strip has enough slack.
/// The parts following a moved cut shift along with it. The sliver left between a part
/// and its moved cut is trimmed off by an extra cut when the sheet geometry is built.
pub fn align_cuts(strips: &mut [Strip], sheet_width: f64, tolerance: f64) {
    let mut known: Vec<f64> = vec![];
    for strip in strips.iter_mut() {
        let slack = sheet_width - strip.used_width;
        let mut offset = 0.0;
        for item in strip.items.iter_mut() {
            item.x += offset;
            let natural = item.x + item.width;
            let snap = known
                .iter()
                .copied()
                .filter(|&q| q > natural + EPSILON && q - natural <= tolerance)
                .filter(|&q| offset + (q - natural) <= slack + EPSILON)
                .min_by_key(|&q| OrderedFloat(q));
            item.cut_x = match snap {
                Some(q) => {
                    offset += q - natural;
                    q
                }
                None => natural,
            };
        }
        strip.used_width += offset;
        known.extend(strip.items.iter().map(|i| i.cut_x));
    }
}

/// Placements, cuts and offcuts of a sheet holding the given strips
fn sheet_geometry(
    strips: &[Strip],
    instances: &[PartInstance],
    sheet_width: f64,
    sheet_length: f64,
    kerf: f64,
) -> (Vec<Placement>, Vec<CutLine>, Vec<Rect>) {
    let mut placements = vec![];
    let mut cuts = vec![];
    let mut offcuts = vec![];

    for strip in strips {
        let strip_top = strip.y + strip.height;
        if strip_top < sheet_length - EPSILON {
            cuts.push(CutLine::horizontal(strip_top, 0.0, sheet_width));
        }
        for item in &strip.items {
            let inst = &instances[item.instance];
            placements.push(Placement {
                instance_id: inst.id,
                part_index: inst.part_index,
                part_id: inst.part_id.clone(),
                label: inst.label.clone(),
                x: item.x,
                y: strip.y,
                width: item.width,
                height: item.height,
                rotation: item.rotation,
            });
            if item.cut_x < sheet_width - EPSILON {
                cuts.push(CutLine::vertical(item.cut_x, strip.y, strip_top));
            }
            let part_right = item.x + item.width;
            if item.cut_x > part_right + EPSILON {
                //sliver left by an aligned cut
                cuts.push(CutLine::vertical(part_right, strip.y, strip.y + item.height));
            }
            if item.height < strip.height - EPSILON {
                //trim the section down to the part
                let trim_y = strip.y + item.height;
                cuts.push(CutLine::horizontal(trim_y, item.x, item.cut_x));
                offcuts.extend(Rect::from_dims(
                    item.x,
                    trim_y + kerf,
                    item.cut_x - item.x,
                    strip.height - item.height - kerf,
                ));
            }
        }
        let free_x = strip.used_width + kerf;
        offcuts.extend(Rect::from_dims(free_x, strip.y, sheet_width - free_x, strip.height));
    }

    let free_y = strips
        .iter()
        .map(|s| s.y + s.height + kerf)
        .fold(0.0, f64::max);
    offcuts.extend(Rect::from_dims(0.0, free_y, sheet_width, sheet_length - free_y));

    (placements, cuts, offcuts)
}

fn transpose_placement(p: Placement) -> Placement {
    Placement {
        x: p.y,
        y: p.x,
        width: p.height,
        height: p.width,
        ..p
    }
}

fn transpose_cut(c: CutLine) -> CutLine {
    let direction = match c.direction {
        CutDirection::Horizontal => CutDirection::Vertical,
        CutDirection::Vertical => CutDirection::Horizontal,
    };
    CutLine { direction, ..c }
}

fn transpose_rect(r: Rect) -> Rect {
    Rect {
        x_min: r.y_min,
        y_min: r.x_min,
        x_max: r.y_max,
        y_max: r.x_max,
    }
}

/// Number of distinct in-strip cut positions, summed over all sheets
fn distinct_positions(sheets: &[Vec<Strip>]) -> usize {
    sheets
        .iter()
        .map(|strips| {
            strips
                .iter()
                .flat_map(|s| s.items.iter())
                .map(|i| (i.cut_x * 100.0).round() as i64)
                .unique()
                .count()
        })
        .sum()
}

/// Packs the instances following a single strip approach.
pub fn pack_strips_with(
    instances: &[PartInstance],
    stock: &StockSheetSpec,
    config: &StripConfig,
    approach: StripApproach,
) -> LayoutResult {
    let kerf = stock.kerf;
    //vertical sections are built as horizontal strips on the transposed sheet
    let transposed = approach == StripApproach::VerticalFirst;
    let (ws_width, ws_length) = match transposed {
        true => (stock.length, stock.width),
        false => (stock.width, stock.length),
    };

    let mut too_large = vec![];
    let mut oriented = vec![];
    for (i, inst) in instances.iter().enumerate() {
        match orient(inst, stock.width, stock.length, !transposed) {
            Some((w, h, rotation)) => {
                let (width, height) = match transposed {
                    true => (h, w),
                    false => (w, h),
                };
                oriented.push(Oriented {
                    instance: i,
                    width,
                    height,
                    rotation,
                });
            }
            None => too_large.push(inst),
        }
    }

    let strips = match approach {
        StripApproach::Banded | StripApproach::VerticalFirst => {
            build_strips(&oriented, ws_width, kerf, config.height_tolerance)
        }
        StripApproach::Nested => {
            let (mut strips, rest) =
                nested_strips(&oriented, ws_width, kerf, config.nesting_tolerance);
            strips.extend(build_strips(&rest, ws_width, kerf, config.height_tolerance));
            strips
        }
    };

    let (mut sheets, leftover) = stack_strips(strips, ws_length, kerf, stock.quantity);
    if config.align_cuts && !transposed {
        for strips in sheets.iter_mut() {
            align_cuts(strips, ws_width, config.alignment_tolerance);
        }
    }

    let layouts = sheets
        .iter()
        .enumerate()
        .map(|(idx, strips)| {
            let (mut placements, mut cuts, mut offcuts) =
                sheet_geometry(strips, instances, ws_width, ws_length, kerf);
            if transposed {
                placements = placements.into_iter().map(transpose_placement).collect();
                cuts = cuts.into_iter().map(transpose_cut).collect();
                offcuts = offcuts.into_iter().map(transpose_rect).collect();
            }
            SheetLayout::new(&stock.id, idx, stock.bounds(), kerf, placements, offcuts, cuts)
        })
        .collect_vec();
    debug_assert!(layouts.iter().all(|l| {
        assertions::placements_within(&l.placements, &l.bounds())
            && assertions::no_overlapping_placements(&l.placements, kerf)
    }));

    let unplaced = UnplacedPart::summarize(
        too_large
            .into_iter()
            .map(|inst| (inst, UnplacedReason::TooLargeForSheet))
            .chain(
                leftover
                    .iter()
                    .flat_map(|s| s.items.iter())
                    .map(|i| (&instances[i.instance], UnplacedReason::InsufficientSheetCapacity)),
            ),
    );

    let mut result = LayoutResult::new(layouts, unplaced);
    result.diagnostics.distinct_cut_positions = Some(distinct_positions(&sheets));
    result
}

/// Runs every [`StripApproach`] and keeps the one with the fewest sheets,
/// then the fewest unplaced instances, then the fewest cuts. Ties go to the approach tried first.
pub fn pack_strips(parts: &[PartSpec], stock: &StockSheetSpec, config: &StripConfig) -> LayoutResult {
    let start = Instant::now();
    let instances = expand_instances(parts);
    let scorer = StripScorer;

    let (approach, score, result) = StripApproach::ALL
        .into_iter()
        .map(|approach| {
            let result = pack_strips_with(&instances, stock, config, approach);
            let score = scorer.score(&result);
            debug!(
                "[STRIP] {approach}: {} sheets, {} unplaced, {} cuts",
                result.sheet_count(),
                result.unplaced_count(),
                result.stats.cut_count
            );
            (approach, score, result)
        })
        .reduce(|best, next| match next.1 > best.1 {
            true => next,
            false => best,
        })
        .expect("there is at least one strip approach");

    info!(
        "[STRIP] best approach: {approach}, {} sheets, {} cuts ({:.1}mm) in {:.3}ms",
        result.sheet_count(),
        result.stats.cut_count,
        result.stats.cut_length,
        start.elapsed().as_secs_f64() * 1000.0
    );

    let mut result = result.with_engine("strip", Some(approach.to_string()), None);
    result.diagnostics.score = Some(score);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcut::entities::Grain;

    fn stock() -> StockSheetSpec {
        StockSheetSpec::new("board", 2750.0, 1830.0, 10)
    }

    fn oriented(instance: usize, width: f64, height: f64) -> Oriented {
        Oriented {
            instance,
            width,
            height,
            rotation: Rotation::Deg0,
        }
    }

    #[test]
    fn free_parts_are_laid_flat() {
        let parts = expand_instances(&[PartSpec::new("a", 900.0, 400.0, 1)]);
        let (w, h, rotation) = orient(&parts[0], 1830.0, 2750.0, true).unwrap();
        assert_eq!((w, h, rotation), (900.0, 400.0, Rotation::Deg90));

        let locked = expand_instances(&[
            PartSpec::new("b", 900.0, 400.0, 1).with_grain(Grain::LengthLocked)
        ]);
        let (w, h, _) = orient(&locked[0], 1830.0, 2750.0, true).unwrap();
        assert_eq!((w, h), (400.0, 900.0));
    }

    #[test]
    fn similar_heights_share_a_band() {
        let items = [
            oriented(0, 500.0, 400.0),
            oriented(1, 500.0, 360.0),
            oriented(2, 500.0, 200.0),
        ];
        let strips = build_strips(&items, 1830.0, 3.0, 0.15);
        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].height, 400.0);
        assert_eq!(strips[0].items.len(), 2);
        assert_eq!(strips[1].height, 200.0);
    }

    #[test]
    fn strips_are_stacked_with_kerf() {
        let strips = vec![Strip::new(1000.0), Strip::new(1000.0), Strip::new(1000.0)];
        let (sheets, leftover) = stack_strips(strips, 2750.0, 3.0, 1);
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].iter().map(|s| s.y).collect_vec(), vec![0.0, 1003.0]);
        assert_eq!(leftover.len(), 1);
    }

    #[test]
    fn nested_pairs_fill_the_sheet_width() {
        let items = [
            oriented(0, 1200.0, 500.0),
            oriented(1, 900.0, 300.0),
            oriented(2, 600.0, 450.0),
        ];
        let (strips, rest) = nested_strips(&items, 1830.0, 3.0, 0.05);
        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].height, 500.0);
        assert_eq!(
            strips[0].items.iter().map(|i| i.instance).collect_vec(),
            vec![0, 2]
        );
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn cuts_snap_to_earlier_strips() {
        let mut first = Strip::new(400.0);
        first.push(&oriented(0, 600.0, 400.0), 3.0);
        let mut second = Strip::new(400.0);
        second.push(&oriented(1, 599.0, 400.0), 3.0);
        second.push(&oriented(2, 300.0, 400.0), 3.0);
        second.y = 403.0;

        let mut strips = [first, second];
        align_cuts(&mut strips, 1830.0, 2.0);
        assert_eq!(strips[1].items[0].cut_x, 600.0);
        assert_eq!(strips[1].items[1].x, 603.0);
        assert_eq!(strips[1].used_width, 903.0);
    }

    #[test]
    fn aligned_cuts_trim_the_sliver() {
        let mut first = Strip::new(0.0);
        first.push(&oriented(0, 600.0, 400.0), 3.0);
        let mut second = Strip::new(0.0);
        second.push(&oriented(1, 599.0, 400.0), 3.0);
        second.y = 403.0;
        let mut strips = [first, second];
        align_cuts(&mut strips, 1830.0, 2.0);

        let instances = expand_instances(&[PartSpec::new("a", 600.0, 400.0, 2)]);
        let (placements, cuts, _) = sheet_geometry(&strips, &instances, 1830.0, 2750.0, 3.0);
        assert_eq!(placements[1].width, 599.0);
        let vertical_cuts = cuts
            .iter()
            .filter(|c| c.direction == CutDirection::Vertical)
            .map(|c| c.position)
            .collect_vec();
        assert_eq!(vertical_cuts, vec![600.0, 600.0, 599.0]);
    }

    #[test]
    fn strips_are_as_tall_as_their_own_items() {
        let parts = [
            PartSpec::new("leader", 1000.0, 400.0, 1),
            PartSpec::new("shelf", 1000.0, 345.0, 6),
        ];
        let instances = expand_instances(&parts);
        let stock = stock().with_kerf(3.0);
        let result = pack_strips_with(&instances, &stock, &StripConfig::default(), StripApproach::Banded);
        assert_eq!(result.sheet_count(), 1);
        assert_eq!(result.placed_count(), 7);
        let mut ys = result.sheets[0].placements.iter().map(|p| p.y).collect_vec();
        ys.sort_by(f64::total_cmp);
        assert_eq!(ys, vec![0.0, 403.0, 751.0, 1099.0, 1447.0, 1795.0, 2143.0]);
        assert!(assertions::result_is_valid(&parts, &result));
    }

    #[test]
    fn vertical_first_layouts_are_valid() {
        let parts = [
            PartSpec::new("tall", 2000.0, 300.0, 4).with_grain(Grain::LengthLocked),
            PartSpec::new("free", 800.0, 350.0, 3),
        ];
        let instances = expand_instances(&parts);
        let result =
            pack_strips_with(&instances, &stock(), &StripConfig::default(), StripApproach::VerticalFirst);
        assert_eq!(result.placed_count(), 7);
        assert!(assertions::result_is_valid(&parts, &result));
    }

    #[test]
    fn every_approach_produces_valid_layouts() {
        let parts = [
            PartSpec::new("a", 400.0, 900.0, 3),
            PartSpec::new("b", 420.0, 870.0, 2),
            PartSpec::new("c", 250.0, 600.0, 5).with_grain(Grain::WidthLocked),
            PartSpec::new("d", 1200.0, 580.0, 2).with_grain(Grain::LengthLocked),
        ];
        let instances = expand_instances(&parts);
        for approach in StripApproach::ALL {
            let result = pack_strips_with(&instances, &stock(), &StripConfig::default(), approach);
            assert!(assertions::result_is_valid(&parts, &result), "{approach}");
            assert_eq!(result.unplaced_count(), 0, "{approach}");
        }
    }
}
