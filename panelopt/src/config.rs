use crate::io::svg::SvgDrawOptions;
use crate::opt::heuristic::HeuristicConfig;
use crate::opt::material::Engine;
use crate::opt::sa::SAConfig;
use crate::opt::strip::StripConfig;
use panelcut::packing::PackingConfig;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Configuration of a panelopt run
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct OptConfig {
    /// Weights of the guillotine placement heuristic
    pub packing: PackingConfig,
    pub heuristic: HeuristicConfig,
    pub sa: SAConfig,
    pub strip: StripConfig,
    /// Seed for the PRNG. If undefined, a seed is derived from the clock (and logged)
    pub prng_seed: Option<u64>,
    pub engine: Engine,
    /// Time budget of the deep and anneal engines, per material group
    pub time_budget_ms: u64,
    /// Interval between progress reports of the deep and anneal engines
    pub progress_interval_ms: u64,
    pub svg_draw_options: SvgDrawOptions,
}

impl Default for OptConfig {
    fn default() -> Self {
        Self {
            packing: PackingConfig::default(),
            heuristic: HeuristicConfig::default(),
            sa: SAConfig::default(),
            strip: StripConfig::default(),
            prng_seed: Some(0),
            engine: Engine::Fast,
            time_budget_ms: 10_000,
            progress_interval_ms: 500,
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}

impl OptConfig {
    /// Rejects values no engine can run with
    pub fn validate(&self) -> Result<()> {
        self.sa.validate().context("invalid sa config")?;
        ensure!(
            self.strip.height_tolerance >= 0.0 && self.strip.height_tolerance < 1.0,
            "strip height tolerance should lie in [0, 1): {}",
            self.strip.height_tolerance
        );
        ensure!(
            self.strip.nesting_tolerance >= 0.0 && self.strip.alignment_tolerance >= 0.0,
            "strip tolerances should not be negative"
        );
        ensure!(
            self.heuristic.height_band_bucket >= 0.0,
            "height band bucket should not be negative: {}",
            self.heuristic.height_band_bucket
        );
        Ok(())
    }
}
