use crate::opt::control::{Progress, ProgressTimer, SearchObserver, out_of_time};
use crate::opt::score::{HeuristicScorer, LayoutScorer};
use crate::opt::strategy::{
    OrderingVariant, SortStrategy, reversed, sort_by_strategy, window_shuffled,
};
use itertools::Itertools;
use log::{debug, info};
use panelcut::entities::{
    LayoutResult, PartInstance, PartSpec, StockSheetSpec, UnplacedPart, UnplacedReason,
    expand_instances,
};
use panelcut::geometry::orientation::fits_empty_sheet;
use panelcut::packing::{GuillotinePacker, PackingConfig};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thousands::Separable;

/// Configuration of the multi strategy heuristic search
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Number of seeded random orderings tried on top of the deterministic ones
    pub n_shuffles: usize,
    /// Occupied heights are rounded to a multiple of this (mm) to form the height bands
    pub height_band_bucket: f64,
    /// Probability of reversing a randomized ordering in the deep search
    pub reverse_probability: f64,
    /// Upper bound on the window size of the partial shuffles in the deep search
    pub max_shuffle_window: usize,
    /// Stops the deep search after this many iterations, regardless of the time budget
    pub deep_max_iterations: Option<u64>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            n_shuffles: 8,
            height_band_bucket: 50.0,
            reverse_probability: 0.3,
            max_shuffle_window: 6,
            deep_max_iterations: None,
        }
    }
}

/// Packs the instances in the given `order`, opening a fresh sheet whenever the previous one is full.
/// Stops when all instances are placed, the sheet quantity runs out, or a fresh sheet receives nothing.
pub fn pack_with_strategy(
    instances: &[PartInstance],
    order: &[usize],
    stock: &StockSheetSpec,
    config: &PackingConfig,
) -> LayoutResult {
    let bounds = stock.bounds();
    let (mut queue, too_large): (Vec<&PartInstance>, Vec<&PartInstance>) = order
        .iter()
        .map(|&i| &instances[i])
        .partition(|inst| fits_empty_sheet(inst, &bounds));

    let mut sheets = vec![];
    while !queue.is_empty() && sheets.len() < stock.quantity {
        let mut packer = GuillotinePacker::new(bounds, stock.kerf, *config);
        let rest = packer.pack_all(queue.iter().copied());
        if packer.is_empty() {
            //a fresh sheet does not accept anything, no point in opening more
            break;
        }
        sheets.push(packer.into_layout(&stock.id, sheets.len()));
        queue = rest;
    }

    let unplaced = UnplacedPart::summarize(
        too_large
            .into_iter()
            .map(|inst| (inst, UnplacedReason::TooLargeForSheet))
            .chain(
                queue
                    .into_iter()
                    .map(|inst| (inst, UnplacedReason::InsufficientSheetCapacity)),
            ),
    );

    LayoutResult::new(sheets, unplaced)
}

/// All deterministic and seeded orderings tried by [`pack_parts_guillotine`]
pub fn candidate_orderings(config: &HeuristicConfig, seed: u64) -> Vec<OrderingVariant> {
    let base = SortStrategy::ALL.into_iter().map(OrderingVariant::Base);
    let rev = SortStrategy::ALL.into_iter().map(OrderingVariant::Reversed);
    let shuffles = (0..config.n_shuffles as u64).map(|i| OrderingVariant::Shuffled {
        seed: seed.wrapping_add(i),
    });
    base.chain(rev)
        .chain(shuffles)
        .chain([
            OrderingVariant::CornerPriority,
            OrderingVariant::HeightBands {
                bucket: config.height_band_bucket,
            },
        ])
        .collect()
}

/// Tries every ordering of [`candidate_orderings`] and returns the best scoring result.
/// Ties are won by the ordering tried first.
pub fn pack_parts_guillotine(
    parts: &[PartSpec],
    stock: &StockSheetSpec,
    packing: &PackingConfig,
    config: &HeuristicConfig,
    seed: u64,
) -> LayoutResult {
    let start = Instant::now();
    let instances = expand_instances(parts);
    let scorer = HeuristicScorer {
        sheet_area: stock.area(),
    };

    let mut best: Option<(f64, OrderingVariant, LayoutResult)> = None;
    for variant in candidate_orderings(config, seed) {
        let order = variant.ordering(&instances);
        let result = pack_with_strategy(&instances, &order, stock, packing);
        let score = scorer.score(&result);
        debug!(
            "[HEUR] {variant}: {} sheets, {:.3}% utilization, score {score:.1}",
            result.sheet_count(),
            result.stats.utilization * 100.0
        );
        if best.as_ref().is_none_or(|(best_score, _, _)| score > *best_score) {
            best = Some((score, variant, result));
        }
    }

    let (score, variant, result) = best.expect("at least one ordering is always tried");
    info!(
        "[HEUR] best ordering: {variant}, {} sheets, {} unplaced, {:.3}% utilization ({:.3}ms)",
        result.sheet_count(),
        result.unplaced_count(),
        result.stats.utilization * 100.0,
        start.elapsed().as_secs_f64() * 1000.0
    );

    let mut result = result.with_engine("fast", Some(variant.to_string()), Some(seed));
    result.diagnostics.score = Some(score);
    result
}

/// Time boxed randomized extension of [`pack_parts_guillotine`].
/// Every iteration packs a random strategy, partially shuffled and optionally reversed.
/// Improvements are kept, cancellation is polled once per iteration.
#[allow(clippy::too_many_arguments)]
pub fn pack_parts_guillotine_deep(
    parts: &[PartSpec],
    stock: &StockSheetSpec,
    packing: &PackingConfig,
    config: &HeuristicConfig,
    seed: u64,
    time_budget: Duration,
    progress_interval: Duration,
    observer: &mut impl SearchObserver,
) -> LayoutResult {
    let start = Instant::now();
    let instances = expand_instances(parts);
    let scorer = HeuristicScorer {
        sheet_area: stock.area(),
    };
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut timer = ProgressTimer::new(progress_interval);

    let mut best = pack_parts_guillotine(parts, stock, packing, config, seed);
    let baseline_score = scorer.score(&best);
    let mut best_score = baseline_score;
    let mut best_strategy = best.diagnostics.strategy.clone();

    let mut iteration: u64 = 0;
    let mut improvements: u64 = 0;
    loop {
        if observer.cancelled() {
            info!("[HEUR] deep search cancelled after {} iterations", iteration.separate_with_commas());
            break;
        }
        let exhausted = match config.deep_max_iterations {
            Some(max) => iteration >= max,
            None => out_of_time(start, time_budget),
        };
        if exhausted || instances.len() < 2 {
            break;
        }
        iteration += 1;

        let strategy = SortStrategy::ALL[rng.random_range(0..SortStrategy::ALL.len())];
        let window = rng.random_range(2..=config.max_shuffle_window.max(2));
        let sorted = sort_by_strategy(&instances, strategy);
        let mut order = window_shuffled(&instances, &sorted, window, &mut rng);
        let reverse = rng.random_bool(config.reverse_probability.clamp(0.0, 1.0));
        if reverse {
            order = reversed(&instances, &order);
        }

        let result = pack_with_strategy(&instances, &order, stock, packing);
        let score = scorer.score(&result);
        if score > best_score {
            improvements += 1;
            debug!(
                "[HEUR] deep improvement #{improvements} at iteration {iteration}: {best_score:.1} -> {score:.1}"
            );
            best = result;
            best_score = score;
            best_strategy = Some(format!(
                "deep_{strategy}_w{window}{}",
                if reverse { "_reversed" } else { "" }
            ));
        }

        if timer.due() {
            observer.progress(Progress {
                iteration,
                best_score,
                best_result: best.clone(),
                elapsed: start.elapsed(),
                temperature: None,
                improvement_count: improvements,
                baseline_score,
            });
        }
    }

    info!(
        "[HEUR] deep search finished: {} iterations, {} improvements, {} sheets ({:.3}s)",
        iteration.separate_with_commas(),
        improvements,
        best.sheet_count(),
        start.elapsed().as_secs_f64()
    );

    let mut result = best.with_engine("deep", best_strategy, Some(seed));
    result.diagnostics.iterations = iteration;
    result.diagnostics.improvements = improvements;
    result.diagnostics.score = Some(best_score);
    result.diagnostics.baseline_score = Some(baseline_score);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::control::NoObserver;
    use panelcut::entities::Grain;
    use panelcut::util::assertions;

    fn stock(quantity: usize) -> StockSheetSpec {
        StockSheetSpec::new("board", 2750.0, 1830.0, quantity)
    }

    #[test]
    fn too_large_parts_are_never_packed() {
        let instances = expand_instances(&[
            PartSpec::new("huge", 3000.0, 2000.0, 1),
            PartSpec::new("ok", 500.0, 500.0, 2),
        ]);
        let order = (0..instances.len()).collect_vec();
        let result = pack_with_strategy(&instances, &order, &stock(5), &PackingConfig::default());
        assert_eq!(result.sheet_count(), 1);
        assert_eq!(result.unplaced.len(), 1);
        assert_eq!(result.unplaced[0].reason, UnplacedReason::TooLargeForSheet);
    }

    #[test]
    fn sheet_quantity_caps_the_layout() {
        // every sheet holds a single part
        let parts = [PartSpec::new("full", 2000.0, 1500.0, 3)];
        let instances = expand_instances(&parts);
        let order = (0..instances.len()).collect_vec();
        let result = pack_with_strategy(&instances, &order, &stock(2), &PackingConfig::default());
        assert_eq!(result.sheet_count(), 2);
        assert_eq!(result.unplaced_count(), 1);
        assert_eq!(
            result.unplaced[0].reason,
            UnplacedReason::InsufficientSheetCapacity
        );
        assert!(assertions::quantities_conserved(&parts, &result));
    }

    #[test]
    fn heuristic_search_is_reproducible() {
        let parts = [
            PartSpec::new("side", 720.0, 560.0, 6).with_grain(Grain::LengthLocked),
            PartSpec::new("shelf", 764.0, 520.0, 5),
            PartSpec::new("back", 1200.0, 764.0, 2),
            PartSpec::new("drawer", 450.0, 140.0, 9),
        ];
        let run = || {
            pack_parts_guillotine(
                &parts,
                &stock(10),
                &PackingConfig::default(),
                &HeuristicConfig::default(),
                7,
            )
        };
        let (a, b) = (run(), run());
        assert_eq!(a.diagnostics.strategy, b.diagnostics.strategy);
        assert_eq!(a.sheets.len(), b.sheets.len());
        for (sa, sb) in a.sheets.iter().zip(b.sheets.iter()) {
            assert_eq!(sa.placements, sb.placements);
        }
        assert!(assertions::result_is_valid(&parts, &a));
    }

    #[test]
    fn deep_search_never_loses_to_the_fast_search() {
        let parts = [
            PartSpec::new("a", 900.0, 600.0, 4),
            PartSpec::new("b", 610.0, 480.0, 7),
            PartSpec::new("c", 333.0, 250.0, 11),
        ];
        let config = HeuristicConfig {
            deep_max_iterations: Some(40),
            ..HeuristicConfig::default()
        };
        let fast = pack_parts_guillotine(&parts, &stock(10), &PackingConfig::default(), &config, 3);
        let deep = pack_parts_guillotine_deep(
            &parts,
            &stock(10),
            &PackingConfig::default(),
            &config,
            3,
            Duration::from_secs(60),
            Duration::from_secs(60),
            &mut NoObserver,
        );
        assert_eq!(deep.diagnostics.iterations, 40);
        assert!(deep.diagnostics.score.unwrap() >= fast.diagnostics.score.unwrap());
        assert!(assertions::result_is_valid(&parts, &deep));
    }
}
