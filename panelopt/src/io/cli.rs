use std::path::PathBuf;

use crate::opt::material::Engine;
use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub input_file: PathBuf,
    #[arg(short, long, value_name = "FOLDER")]
    pub solution_folder: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Overrides the engine of the config
    #[arg(short, long, value_enum)]
    pub engine: Option<Engine>,
    /// Overrides the time budget (ms) of the deep and anneal engines
    #[arg(short, long, value_name = "MS")]
    pub time_budget_ms: Option<u64>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
