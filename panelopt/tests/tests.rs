#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use test_case::test_case;

    use panelcut::entities::{
        EdgeBanding, Grain, Instance, PartSpec, StockSheetSpec, UnplacedReason,
    };
    use panelcut::io::ext_repr::ExtInstance;
    use panelcut::io::{export, import};
    use panelcut::lamination::SINGLE_BOARD_EDGING;
    use panelcut::packing::PackingConfig;
    use panelcut::util::assertions;
    use panelopt::config::OptConfig;
    use panelopt::io::output::JobOutput;
    use panelopt::io::svg::{SvgDrawOptions, layout_to_svg};
    use panelopt::opt::control::{FnObserver, NoObserver};
    use panelopt::opt::heuristic::HeuristicConfig;
    use panelopt::opt::material::{Engine, plan_materials, solve_materials};
    use panelopt::opt::sa::{SAConfig, SAOptimizer};
    use panelopt::opt::strip::{StripConfig, pack_strips};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn quick_config() -> OptConfig {
        OptConfig {
            time_budget_ms: 50,
            progress_interval_ms: 10,
            ..OptConfig::default()
        }
    }

    #[test_case(Engine::Fast; "fast")]
    #[test_case(Engine::Deep; "deep")]
    #[test_case(Engine::Anneal; "anneal")]
    #[test_case(Engine::Strip; "strip")]
    fn four_banded_parts_fit_one_sheet(engine: Engine) {
        init_logger();
        let instance = Instance::new(
            vec![PartSpec::new("panel", 600.0, 400.0, 4).with_banding(EdgeBanding::ALL)],
            vec![StockSheetSpec::new("board", 2750.0, 1830.0, 10).with_kerf(3.0)],
        );
        let plan = plan_materials(&instance);
        let solutions =
            solve_materials(&plan, &instance, engine, &quick_config(), 0, &mut NoObserver);

        assert_eq!(solutions.len(), 1);
        let result = &solutions[0].result;
        assert_eq!(result.sheet_count(), 1);
        assert_eq!(result.placed_count(), 4);
        assert!(result.unplaced.is_empty());
        assert!(approx_eq!(
            f64,
            result.stats.edging_by_thickness[&SINGLE_BOARD_EDGING],
            8000.0
        ));
        assert!(assertions::result_is_valid(&instance.parts, result));
    }

    #[test_case(Engine::Fast; "fast")]
    #[test_case(Engine::Deep; "deep")]
    #[test_case(Engine::Anneal; "anneal")]
    #[test_case(Engine::Strip; "strip")]
    fn oversized_parts_are_reported(engine: Engine) {
        init_logger();
        let instance = Instance::new(
            vec![PartSpec::new("slab", 3000.0, 2000.0, 1)],
            vec![StockSheetSpec::new("board", 2750.0, 1830.0, 10)],
        );
        let plan = plan_materials(&instance);
        let solutions =
            solve_materials(&plan, &instance, engine, &quick_config(), 0, &mut NoObserver);

        let result = &solutions[0].result;
        assert_eq!(result.sheet_count(), 0);
        assert_eq!(result.unplaced.len(), 1);
        assert_eq!(result.unplaced[0].count, 1);
        assert_eq!(result.unplaced[0].reason, UnplacedReason::TooLargeForSheet);
    }

    #[test_case(0.0; "no kerf")]
    #[test_case(3.0; "default kerf")]
    fn uniform_heights_are_packed_in_bands(kerf: f64) {
        init_logger();
        let parts = [900.0, 800.0, 700.0, 600.0, 500.0]
            .into_iter()
            .enumerate()
            .map(|(i, w)| PartSpec::new(format!("p{i}"), w, 400.0, 1))
            .collect::<Vec<_>>();
        let stock = StockSheetSpec::new("board", 2750.0, 1830.0, 5).with_kerf(kerf);
        let result = pack_strips(&parts, &stock, &StripConfig::default());

        assert_eq!(result.diagnostics.strategy.as_deref(), Some("banded"));
        assert_eq!(result.sheet_count(), 1);
        assert_eq!(result.placed_count(), parts.len());
        for p in &result.sheets[0].placements {
            assert!(approx_eq!(f64, p.height, 400.0));
            assert!(approx_eq!(f64, p.y, 0.0) || approx_eq!(f64, p.y, 400.0 + kerf));
        }
        assert!(result.stats.cut_count <= 2 * parts.len());
        assert!(assertions::result_is_valid(&parts, &result));
    }

    #[test_case(1; "seed 1")]
    #[test_case(42; "seed 42")]
    fn annealing_keeps_every_constraint(seed: u64) {
        init_logger();
        let parts = vec![
            PartSpec::new("side", 2100.0, 580.0, 4).with_grain(Grain::LengthLocked),
            PartSpec::new("shelf", 882.0, 560.0, 6),
            PartSpec::new("plinth", 1800.0, 100.0, 2).with_grain(Grain::WidthLocked),
            PartSpec::new("drawer", 500.0, 150.0, 8),
        ];
        let config = SAConfig {
            max_iterations: Some(120),
            ..SAConfig::default()
        };
        let mut n_reports = 0;
        let result = {
            let mut observer = FnObserver::default().with_progress(|_| n_reports += 1);
            SAOptimizer::new(
                parts.clone(),
                StockSheetSpec::new("board", 2750.0, 1830.0, 10),
                PackingConfig::default(),
                HeuristicConfig::default(),
                config,
                seed,
            )
            .with_progress_interval(std::time::Duration::ZERO)
            .solve(&mut observer)
        };

        assert_eq!(result.diagnostics.engine, "anneal");
        assert_eq!(result.diagnostics.iterations, 120);
        assert!((1..=120).contains(&n_reports));
        assert!(result.diagnostics.score >= result.diagnostics.baseline_score);
        assert!(assertions::result_is_valid(&parts, &result));
    }

    #[test]
    fn job_output_round_trip() -> anyhow::Result<()> {
        init_logger();
        let json = r#"{
            "name": "wardrobe",
            "parts": [
                {"id": "side", "length": 2000, "width": 580, "quantity": 2, "grain": "length_locked",
                 "banding": {"top": true, "bottom": true}, "material_id": "oak"},
                {"id": "door", "length": 1990, "width": 495, "quantity": 2, "material_id": "oak",
                 "lamination": {"type": "with_backer"}},
                {"id": "shelf", "length": 960, "width": 560, "quantity": 4}
            ],
            "stock": [
                {"id": "white", "length": 2750, "width": 1830, "quantity": 4},
                {"id": "oak_sheet", "length": 2800, "width": 2070, "quantity": 4, "material_id": "oak"}
            ]
        }"#;
        let ext_instance: ExtInstance = serde_json::from_str(json)?;
        let instance = import::import(&ext_instance)?;
        let plan = plan_materials(&instance);
        let config = OptConfig::default();
        let solutions = solve_materials(&plan, &instance, Engine::Fast, &config, 0, &mut NoObserver);
        assert_eq!(solutions.len(), 3);

        let output = JobOutput {
            instance: ext_instance,
            solutions: solutions
                .iter()
                .map(|s| export::export(&s.result, &s.key.to_string()))
                .collect(),
            edging_by_thickness: plan.edging.clone(),
            config,
        };
        let serialized = serde_json::to_string(&output)?;
        let parsed: JobOutput = serde_json::from_str(&serialized)?;
        assert_eq!(parsed.instance.name.as_deref(), Some("wardrobe"));
        assert_eq!(
            parsed.solutions.iter().map(|s| s.material.as_str()).collect::<Vec<_>>(),
            vec!["oak", "oak_backer", "default"]
        );
        assert_eq!(parsed.edging_by_thickness, plan.edging);
        assert_eq!(parsed.config, config);

        for solution in &solutions {
            for sheet in &solution.result.sheets {
                let svg = layout_to_svg(sheet, SvgDrawOptions::default(), "test").to_string();
                assert!(svg.contains("<svg"));
                assert!(svg.matches("<rect").count() > sheet.placements.len());
            }
        }
        Ok(())
    }
}
