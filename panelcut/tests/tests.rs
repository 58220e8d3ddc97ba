#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use test_case::test_case;

    use panelcut::entities::{
        BoardRole, EdgeBanding, Grain, LaminationType, LayoutResult, PartSpec, StockSheetSpec,
        expand_instances,
    };
    use panelcut::io::ext_repr::ExtInstance;
    use panelcut::io::{export, import};
    use panelcut::lamination::{DOUBLE_BOARD_EDGING, expand_lamination};
    use panelcut::packing::{GuillotinePacker, PackingConfig};
    use panelcut::util::assertions;

    fn kitchen_parts() -> Vec<PartSpec> {
        vec![
            PartSpec::new("side", 720.0, 560.0, 4).with_grain(Grain::LengthLocked),
            PartSpec::new("shelf", 764.0, 540.0, 3),
            PartSpec::new("door", 716.0, 396.0, 4).with_grain(Grain::LengthLocked),
            PartSpec::new("kick", 2000.0, 100.0, 1).with_grain(Grain::WidthLocked),
            PartSpec::new("filler", 300.0, 300.0, 6),
        ]
    }

    #[test_case(0.0; "no kerf")]
    #[test_case(3.0; "default kerf")]
    #[test_case(4.8; "wide blade")]
    fn single_sheet_layout_is_valid(kerf: f64) {
        let parts = kitchen_parts();
        let stock = StockSheetSpec::new("board", 2750.0, 1830.0, 1).with_kerf(kerf);
        let instances = expand_instances(&parts);

        let mut packer = GuillotinePacker::new(stock.bounds(), kerf, PackingConfig::default());
        let rest = packer.pack_all(instances.iter());
        assert!(!packer.is_empty());

        let placements = packer.placements().to_vec();
        assert!(assertions::placements_within(&placements, &stock.bounds()));
        assert!(assertions::no_overlapping_placements(&placements, kerf));
        assert_eq!(placements.len() + rest.len(), instances.len());

        let sheet = packer.into_layout(&stock.id, 0);
        let result = LayoutResult::new(vec![sheet], vec![]);
        assert!(assertions::grain_respected(&parts, &result));
        // every offcut lies on the sheet and is not covered by a part
        for offcut in &result.sheets[0].offcuts {
            assert!(stock.bounds().contains(offcut));
            assert!(placements.iter().all(|p| !p.rect().overlaps(offcut)));
        }
    }

    #[test]
    fn with_backer_expansion() {
        let parts = [PartSpec::new("panel", 500.0, 300.0, 2)
            .with_lamination(LaminationType::WithBacker)
            .with_banding(EdgeBanding::ALL)];
        let plan = expand_lamination(&parts);
        let groups = plan.material_groups();

        assert_eq!(plan.parts.len(), 2);
        assert_eq!(groups.len(), 2);
        let roles = groups.iter().map(|g| g.key.role).collect::<Vec<_>>();
        assert_eq!(roles, vec![BoardRole::Primary, BoardRole::Backer]);
        assert!(groups.iter().all(|g| g.parts.len() == 1 && g.parts[0].quantity == 2));
        assert_eq!(plan.edging.keys().copied().collect::<Vec<_>>(), vec![DOUBLE_BOARD_EDGING]);
        assert!(approx_eq!(f64, plan.edging[&DOUBLE_BOARD_EDGING], 2.0 * 1600.0));
    }

    #[test]
    fn import_pack_export() -> anyhow::Result<()> {
        let json = r#"{
            "name": "cabinet",
            "parts": [
                {"id": "side", "length": 720, "width": 560, "quantity": 2, "grain": "length_locked",
                 "banding": {"top": true}},
                {"id": "top", "length": 900, "width": 560, "quantity": 1, "lamination": {"type": "same_board"}}
            ],
            "stock": [{"id": "mel18", "length": 2750, "width": 1830, "quantity": 5, "kerf": 3.2}]
        }"#;
        let ext: ExtInstance = serde_json::from_str(json)?;
        let instance = import::import(&ext)?;
        assert_eq!(instance.total_part_qty(), 3);

        let plan = expand_lamination(&instance.parts);
        assert_eq!(plan.total_board_qty(), 4);

        let group = &plan.material_groups()[0];
        let stock = instance.stock_for_material(group.key.material_id.as_deref());
        let boards = expand_instances(&group.parts);
        let mut packer = GuillotinePacker::new(stock.bounds(), stock.kerf, PackingConfig::default());
        assert!(packer.pack_all(boards.iter()).is_empty());

        let result = LayoutResult::new(vec![packer.into_layout(&stock.id, 0)], vec![]);
        assert!(assertions::result_is_valid(&group.parts, &result));

        let ext_solution = export::export(&result, &group.key.to_string());
        assert_eq!(ext_solution.material, "default");
        assert_eq!(ext_solution.sheets[0].placements.len(), 4);
        let serialized = serde_json::to_string(&ext_solution)?;
        assert!(serialized.contains("\"rotation\":\"0\""));
        Ok(())
    }
}
