use crate::opt::control::{Progress, ProgressTimer, SearchObserver, out_of_time};
use crate::opt::heuristic::{HeuristicConfig, pack_parts_guillotine, pack_with_strategy};
use crate::opt::moves::{Move, MoveKind};
use crate::opt::score::{CompactnessScorer, LayoutScorer};
use crate::opt::strategy::{SortStrategy, sort_by_strategy};
use anyhow::{Result, ensure};
use log::{debug, info};
use panelcut::entities::{LayoutResult, PartInstance, PartSpec, StockSheetSpec, expand_instances};
use panelcut::packing::PackingConfig;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thousands::Separable;

/// Configuration of the simulated annealing optimizer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SAConfig {
    pub start_temperature: f64,
    /// Below this temperature the search reheats (if time remains) or terminates
    pub floor_temperature: f64,
    /// Geometric cooling factor applied every iteration, until recalibrated
    pub cooling_rate: f64,
    /// Temperature after a reheat, as a fraction of the start temperature
    pub reheat_fraction: f64,
    /// Iterations without improvement (as a fraction of the estimated total) before reheating
    pub stagnation_fraction: f64,
    /// Iteration after which the cooling rate is recalibrated to the measured speed
    pub calibration_iteration: u64,
    /// Time budget in milliseconds
    pub time_budget_ms: u64,
    /// Terminates after this many iterations instead of on the time budget
    pub max_iterations: Option<u64>,
}

impl Default for SAConfig {
    fn default() -> Self {
        Self {
            start_temperature: 500.0,
            floor_temperature: 0.5,
            cooling_rate: 0.995,
            reheat_fraction: 0.3,
            stagnation_fraction: 0.15,
            calibration_iteration: 100,
            time_budget_ms: 10_000,
            max_iterations: None,
        }
    }
}

impl SAConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.floor_temperature > 0.0,
            "floor temperature should be positive: {}",
            self.floor_temperature
        );
        ensure!(
            self.start_temperature > self.floor_temperature,
            "start temperature ({}) should exceed the floor temperature ({})",
            self.start_temperature,
            self.floor_temperature
        );
        ensure!(
            self.cooling_rate > 0.0 && self.cooling_rate < 1.0,
            "cooling rate should lie in (0, 1): {}",
            self.cooling_rate
        );
        ensure!(
            self.reheat_fraction > 0.0 && self.reheat_fraction <= 1.0,
            "reheat fraction should lie in (0, 1]: {}",
            self.reheat_fraction
        );
        ensure!(
            self.stagnation_fraction >= 0.0,
            "stagnation fraction should not be negative: {}",
            self.stagnation_fraction
        );
        Ok(())
    }
}

/// Simulated annealing over the order in which parts are fed to the guillotine packer.
pub struct SAOptimizer {
    pub parts: Vec<PartSpec>,
    pub instances: Vec<PartInstance>,
    pub stock: StockSheetSpec,
    pub packing: PackingConfig,
    pub heuristic: HeuristicConfig,
    pub config: SAConfig,
    pub seed: u64,
    /// SmallRng is a fast, non-cryptographic PRNG <https://rust-random.github.io/book/guide-rngs.html>
    pub rng: SmallRng,
    pub progress_interval: Duration,
    /// Current ordering, indices into `instances`
    order: Vec<usize>,
    temperature: f64,
}

impl SAOptimizer {
    pub fn new(
        parts: Vec<PartSpec>,
        stock: StockSheetSpec,
        packing: PackingConfig,
        heuristic: HeuristicConfig,
        config: SAConfig,
        seed: u64,
    ) -> Self {
        debug_assert!(config.validate().is_ok(), "{config:?}");
        let instances = expand_instances(&parts);
        let order = sort_by_strategy(&instances, SortStrategy::Area);
        Self {
            parts,
            instances,
            stock,
            packing,
            heuristic,
            config,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            progress_interval: Duration::from_millis(500),
            order,
            temperature: config.start_temperature,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    fn evaluate(&self, scorer: &impl LayoutScorer) -> (LayoutResult, f64) {
        let result = pack_with_strategy(&self.instances, &self.order, &self.stock, &self.packing);
        let score = scorer.score(&result);
        (result, score)
    }

    fn stop(&self, start: Instant, budget: Duration, iteration: u64) -> bool {
        match self.config.max_iterations {
            Some(max) => iteration >= max,
            None => out_of_time(start, budget),
        }
    }

    /// Runs the annealing search and returns the best result ever encountered,
    /// which is never worse than the heuristic baseline.
    pub fn solve(&mut self, observer: &mut impl SearchObserver) -> LayoutResult {
        let start = Instant::now();
        let budget = Duration::from_millis(self.config.time_budget_ms);
        let scorer = CompactnessScorer {
            sheet_area: self.stock.area(),
        };
        let mut timer = ProgressTimer::new(self.progress_interval);

        let baseline = pack_parts_guillotine(
            &self.parts,
            &self.stock,
            &self.packing,
            &self.heuristic,
            self.seed,
        );
        let baseline_score = scorer.score(&baseline);
        let mut best = baseline;
        let mut best_score = baseline_score;
        let mut current_score = baseline_score;

        info!(
            "[SA] baseline: {} sheets, score {:.1}, {} instances",
            best.sheet_count(),
            baseline_score,
            self.instances.len()
        );

        self.temperature = self.config.start_temperature;
        let mut cooling_rate = self.config.cooling_rate;
        let mut estimated_total = self.config.max_iterations.unwrap_or(10_000);
        let mut iteration: u64 = 0;
        let mut improvements: u64 = 0;
        let mut accepted: u64 = 0;
        let mut last_improvement: u64 = 0;
        let mut reheats: u64 = 0;

        while self.instances.len() >= 2 {
            if observer.cancelled() {
                info!("[SA] cancelled at iteration {}", iteration.separate_with_commas());
                break;
            }
            if self.stop(start, budget, iteration) {
                break;
            }
            iteration += 1;

            let kind = MoveKind::sample(&mut self.rng);
            let mv = Move::sample(kind, &self.order, &self.instances, &mut self.rng)
                .or_else(|| Move::sample(MoveKind::Swap, &self.order, &self.instances, &mut self.rng));
            let Some(mv) = mv else { break };
            let undo = mv.inverse();
            mv.apply(&mut self.order);

            let (result, score) = self.evaluate(&scorer);
            let delta = score - current_score;
            let accept = delta > 0.0 || self.rng.random::<f64>() < (delta / self.temperature).exp();

            match accept {
                true => {
                    accepted += 1;
                    current_score = score;
                    if score > best_score {
                        improvements += 1;
                        last_improvement = iteration;
                        debug!(
                            "[SA] improvement #{improvements} at iteration {iteration} (T: {:.3}): {best_score:.1} -> {score:.1}",
                            self.temperature
                        );
                        best = result;
                        best_score = score;
                    }
                }
                false => undo.apply(&mut self.order),
            }

            self.temperature *= cooling_rate;

            if iteration == self.config.calibration_iteration {
                //estimate the total number of iterations and cool down to the floor right at the end
                estimated_total = match self.config.max_iterations {
                    Some(max) => max,
                    None => {
                        let per_iter = start.elapsed().as_secs_f64() / iteration as f64;
                        (budget.as_secs_f64() / per_iter.max(1e-9)) as u64
                    }
                };
                let remaining = estimated_total.saturating_sub(iteration).max(1);
                cooling_rate = (self.config.floor_temperature / self.temperature)
                    .powf(1.0 / remaining as f64)
                    .min(1.0);
                debug!(
                    "[SA] recalibrated: ~{} iterations estimated, cooling rate {cooling_rate:.6}",
                    estimated_total.separate_with_commas()
                );
            }

            let time_left = !self.stop(start, budget, iteration);
            let stagnating = (iteration - last_improvement) as f64
                > self.config.stagnation_fraction * estimated_total as f64;
            if self.temperature < self.config.floor_temperature || stagnating {
                match time_left {
                    true => {
                        self.temperature = self.config.start_temperature * self.config.reheat_fraction;
                        last_improvement = iteration;
                        reheats += 1;
                        debug!("[SA] reheat #{reheats} at iteration {iteration}");
                    }
                    false if self.temperature < self.config.floor_temperature => break,
                    false => {}
                }
            }

            if timer.due() {
                observer.progress(Progress {
                    iteration,
                    best_score,
                    best_result: best.clone(),
                    elapsed: start.elapsed(),
                    temperature: Some(self.temperature),
                    improvement_count: improvements,
                    baseline_score,
                });
            }
        }

        info!(
            "[SA] finished: {} iterations ({} accepted, {} improvements, {} reheats), {} sheets, score {:.1} (baseline {:.1}) in {:.3}s",
            iteration.separate_with_commas(),
            accepted.separate_with_commas(),
            improvements,
            reheats,
            best.sheet_count(),
            best_score,
            baseline_score,
            start.elapsed().as_secs_f64()
        );

        let strategy = match improvements {
            0 => best.diagnostics.strategy.clone(),
            _ => Some("annealed".to_string()),
        };
        let mut result = best.with_engine("anneal", strategy, Some(self.seed));
        result.diagnostics.iterations = iteration;
        result.diagnostics.improvements = improvements;
        result.diagnostics.reheats = reheats;
        result.diagnostics.score = Some(best_score);
        result.diagnostics.baseline_score = Some(baseline_score);
        result
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}
