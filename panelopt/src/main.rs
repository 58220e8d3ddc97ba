use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};
use panelcut::entities::Instance;
use panelcut::io::export::export;
use panelcut::io::import::import;
use panelopt::config::OptConfig;
use panelopt::io;
use panelopt::io::cli::Cli;
use panelopt::io::output::JobOutput;
use panelopt::io::svg::layout_to_svg;
use panelopt::opt::control::NoObserver;
use panelopt::opt::material::{MaterialPlan, MaterialSolution, plan_materials, solve_materials};
use panelopt::task::{OptimizerTask, StartRequest};
use thousands::Separable;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let mut config = match args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            OptConfig::default()
        }
        Some(config_file) => {
            let file = File::open(&config_file)
                .with_context(|| format!("could not open config file: {}", config_file.display()))?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).context("incorrect config file format")?
        }
    };
    if let Some(engine) = args.engine {
        config.engine = engine;
    }
    if let Some(time_budget_ms) = args.time_budget_ms {
        config.time_budget_ms = time_budget_ms;
    }

    config.validate()?;
    info!("[MAIN] Successfully parsed OptConfig: {config:?}");

    let input_stem = args
        .input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .context("input file has no valid name")?;

    fs::create_dir_all(&args.solution_folder).with_context(|| {
        format!(
            "could not create solution folder: {}",
            args.solution_folder.display()
        )
    })?;

    let ext_instance = io::read_instance(args.input_file.as_path())?;
    let instance = import(&ext_instance)?;

    let seed = match config.prng_seed {
        Some(seed) => seed,
        None => {
            let seed = jiff::Timestamp::now().as_nanosecond() as u64;
            info!("[MAIN] no seed configured, using {seed}");
            seed
        }
    };

    let plan = plan_materials(&instance);
    let solutions = match config.engine.is_time_boxed() {
        false => solve_materials(&plan, &instance, config.engine, &config, seed, &mut NoObserver),
        true => solve_in_background(&plan, &instance, &config, seed)?,
    };

    {
        let output = JobOutput {
            instance: ext_instance,
            solutions: solutions
                .iter()
                .map(|s| export(&s.result, &s.key.to_string()))
                .collect(),
            edging_by_thickness: plan.edging.clone(),
            config,
        };

        let solution_path = args.solution_folder.join(format!("sol_{input_stem}.json"));
        io::write_json(&output, Path::new(&solution_path))?;
    }

    {
        for solution in &solutions {
            let material = solution.key.to_string();
            for (i, sheet) in solution.result.sheets.iter().enumerate() {
                let svg_path = args
                    .solution_folder
                    .join(format!("sol_{input_stem}_{material}_{i}.svg"));
                let svg = layout_to_svg(sheet, config.svg_draw_options, &material);

                io::write_svg(&svg, Path::new(&svg_path))?;
            }
        }
    }

    Ok(())
}

/// Solves the material groups one by one on a background optimizer task, logging its progress.
fn solve_in_background(
    plan: &MaterialPlan,
    instance: &Instance,
    config: &OptConfig,
    seed: u64,
) -> Result<Vec<MaterialSolution>> {
    let task = OptimizerTask::spawn()?;
    let mut solutions = vec![];
    for group in &plan.groups {
        let stock = instance.stock_for_material(group.key.material_id.as_deref());
        task.start(StartRequest {
            parts: group.parts.clone(),
            stock: stock.clone(),
            engine: config.engine,
            config: *config,
            seed,
            time_budget_ms: None,
        })?;
        let mut result = task.wait(|p| {
            info!(
                "[MAIN] {}: iteration {}, {} sheets, score {:.1} ({} improvements)",
                group.key,
                p.iteration.separate_with_commas(),
                p.best_result.sheet_count(),
                p.best_score,
                p.improvement_count
            )
        })?;
        result.stats.edging_by_thickness = group.edging.clone();
        info!(
            "[MAIN] {}: {} sheets of {}, {} unplaced",
            group.key,
            result.sheet_count(),
            stock.id,
            result.unplaced_count()
        );
        solutions.push(MaterialSolution {
            key: group.key.clone(),
            stock: stock.clone(),
            result,
        });
    }
    Ok(solutions)
}
