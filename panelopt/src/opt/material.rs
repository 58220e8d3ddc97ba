use crate::config::OptConfig;
use crate::opt::control::{NoObserver, SearchObserver};
use crate::opt::heuristic::{pack_parts_guillotine, pack_parts_guillotine_deep};
use crate::opt::sa::{SAConfig, SAOptimizer};
use crate::opt::strip::pack_strips;
use log::info;
use panelcut::entities::{Instance, LayoutResult, PartSpec, StockSheetSpec};
use panelcut::lamination::{EdgingTotals, MaterialGroup, MaterialKey, expand_lamination};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// The optimization engines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Multi strategy guillotine heuristic
    #[default]
    Fast,
    /// Time boxed randomized extension of the heuristic
    Deep,
    /// Simulated annealing over the part ordering
    Anneal,
    /// Cut minimizing strip packer
    Strip,
}

impl Engine {
    /// Engines that run until their time budget is spent
    pub fn is_time_boxed(&self) -> bool {
        matches!(self, Engine::Deep | Engine::Anneal)
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Fast => write!(f, "fast"),
            Engine::Deep => write!(f, "deep"),
            Engine::Anneal => write!(f, "anneal"),
            Engine::Strip => write!(f, "strip"),
        }
    }
}

/// Boards to cut, grouped per material, with the edging required for the finished parts.
#[derive(Clone, Debug)]
pub struct MaterialPlan {
    pub groups: Vec<MaterialGroup>,
    pub edging: EdgingTotals,
}

/// The layout of a single material group
#[derive(Clone, Debug)]
pub struct MaterialSolution {
    pub key: MaterialKey,
    pub stock: StockSheetSpec,
    pub result: LayoutResult,
}

pub fn plan_materials(instance: &Instance) -> MaterialPlan {
    let lamination = expand_lamination(&instance.parts);
    let groups = lamination.material_groups();
    info!(
        "[MAIN] {} parts expanded into {} boards over {} material groups",
        instance.total_part_qty(),
        lamination.total_board_qty(),
        groups.len()
    );
    MaterialPlan {
        groups,
        edging: lamination.edging,
    }
}

/// Runs `engine` on a set of parts. Only the time boxed engines report to the `observer`.
pub fn run_engine(
    engine: Engine,
    parts: &[PartSpec],
    stock: &StockSheetSpec,
    config: &OptConfig,
    seed: u64,
    observer: &mut impl SearchObserver,
) -> LayoutResult {
    let time_budget = Duration::from_millis(config.time_budget_ms);
    let progress_interval = Duration::from_millis(config.progress_interval_ms);
    match engine {
        Engine::Fast => {
            pack_parts_guillotine(parts, stock, &config.packing, &config.heuristic, seed)
        }
        Engine::Deep => pack_parts_guillotine_deep(
            parts,
            stock,
            &config.packing,
            &config.heuristic,
            seed,
            time_budget,
            progress_interval,
            observer,
        ),
        Engine::Anneal => {
            let sa_config = SAConfig {
                time_budget_ms: config.time_budget_ms,
                ..config.sa
            };
            SAOptimizer::new(
                parts.to_vec(),
                stock.clone(),
                config.packing,
                config.heuristic,
                sa_config,
                seed,
            )
            .with_progress_interval(progress_interval)
            .solve(observer)
        }
        Engine::Strip => pack_strips(parts, stock, &config.strip),
    }
}

/// Solves a single material group and attributes its edging to the result.
pub fn solve_group(
    group: &MaterialGroup,
    stock: &StockSheetSpec,
    engine: Engine,
    config: &OptConfig,
    seed: u64,
    observer: &mut impl SearchObserver,
) -> LayoutResult {
    let mut result = run_engine(engine, &group.parts, stock, config, seed, observer);
    result.stats.edging_by_thickness = group.edging.clone();
    info!(
        "[MAIN] {}: {} sheets of {}, {} unplaced, {:.3}% utilization",
        group.key,
        result.sheet_count(),
        stock.id,
        result.unplaced_count(),
        result.stats.utilization * 100.0
    );
    result
}

/// Solves every material group of the plan against its stock sheet.
/// The synchronous engines solve the groups in parallel, the time boxed ones one after the other
/// (each with the full time budget) so they can share the `observer`.
pub fn solve_materials(
    plan: &MaterialPlan,
    instance: &Instance,
    engine: Engine,
    config: &OptConfig,
    seed: u64,
    observer: &mut impl SearchObserver,
) -> Vec<MaterialSolution> {
    let stock_of = |group: &MaterialGroup| {
        instance
            .stock_for_material(group.key.material_id.as_deref())
            .clone()
    };

    match engine.is_time_boxed() {
        false => plan
            .groups
            .par_iter()
            .map(|group| {
                let stock = stock_of(group);
                let result = solve_group(group, &stock, engine, config, seed, &mut NoObserver);
                MaterialSolution {
                    key: group.key.clone(),
                    stock,
                    result,
                }
            })
            .collect(),
        true => plan
            .groups
            .iter()
            .map(|group| {
                let stock = stock_of(group);
                let result = solve_group(group, &stock, engine, config, seed, observer);
                MaterialSolution {
                    key: group.key.clone(),
                    stock,
                    result,
                }
            })
            .collect(),
    }
}
