use crate::entities::{
    CustomLamination, Instance, LaminationLayer, LaminationType, PartSpec, StockSheetSpec,
};
use crate::io::ext_repr::{ExtInstance, ExtLamination, ExtPart, ExtStockSheet};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::warn;

/// Imports an instance into the library, rejecting invalid geometry.
pub fn import(ext_instance: &ExtInstance) -> Result<Instance> {
    ensure!(
        !ext_instance.stock.is_empty(),
        "an instance needs at least one stock sheet"
    );

    let duplicates = ext_instance.parts.iter().map(|p| &p.id).duplicates().collect_vec();
    ensure!(duplicates.is_empty(), "duplicate part ids: {:?}", duplicates);

    let parts = ext_instance
        .parts
        .iter()
        .map(|ext_part| import_part(ext_part).with_context(|| format!("invalid part: {}", ext_part.id)))
        .collect::<Result<Vec<PartSpec>>>()?;

    let stock = ext_instance
        .stock
        .iter()
        .map(|ext_sheet| {
            import_stock_sheet(ext_sheet)
                .with_context(|| format!("invalid stock sheet: {}", ext_sheet.id))
        })
        .collect::<Result<Vec<StockSheetSpec>>>()?;

    if stock
        .iter()
        .map(|s| s.material_id.as_deref())
        .duplicates()
        .next()
        .is_some()
    {
        warn!("multiple stock sheets share a material, only the first of each is used");
    }

    Ok(Instance::new(parts, stock))
}

pub fn import_part(ext_part: &ExtPart) -> Result<PartSpec> {
    ensure!(
        ext_part.length > 0.0 && ext_part.width > 0.0,
        "dimensions should be positive, length: {}, width: {}",
        ext_part.length,
        ext_part.width
    );
    ensure!(ext_part.quantity > 0, "quantity should be at least 1");

    let lamination = match &ext_part.lamination {
        ExtLamination::None => LaminationType::None,
        ExtLamination::WithBacker => LaminationType::WithBacker,
        ExtLamination::SameBoard => LaminationType::SameBoard,
        ExtLamination::Custom {
            layers,
            final_thickness,
        } => {
            ensure!(
                layers.iter().all(|l| l.quantity >= 1),
                "every lamination layer needs a quantity of at least 1"
            );
            ensure!(
                layers.is_empty() || *final_thickness > 0,
                "laminated part needs a positive final thickness"
            );
            let layers = layers
                .iter()
                .flat_map(|l| {
                    (0..l.quantity).map(|_| LaminationLayer {
                        material_id: l.material_id.clone(),
                        role: l.role,
                    })
                })
                .collect_vec();
            LaminationType::Custom(CustomLamination {
                layers,
                final_thickness: *final_thickness,
            })
        }
    };

    Ok(PartSpec {
        id: ext_part.id.clone(),
        length: ext_part.length,
        width: ext_part.width,
        quantity: ext_part.quantity as usize,
        grain: ext_part.grain,
        banding: ext_part.banding,
        lamination,
        material_id: ext_part.material_id.clone(),
        label: ext_part.label.clone(),
    })
}

pub fn import_stock_sheet(ext_sheet: &ExtStockSheet) -> Result<StockSheetSpec> {
    ensure!(
        ext_sheet.length > 0.0 && ext_sheet.width > 0.0,
        "dimensions should be positive, length: {}, width: {}",
        ext_sheet.length,
        ext_sheet.width
    );
    ensure!(ext_sheet.quantity > 0, "quantity should be at least 1");
    ensure!(
        ext_sheet.kerf >= 0.0,
        "kerf should not be negative: {}",
        ext_sheet.kerf
    );

    Ok(StockSheetSpec {
        id: ext_sheet.id.clone(),
        length: ext_sheet.length,
        width: ext_sheet.width,
        quantity: ext_sheet.quantity as usize,
        kerf: ext_sheet.kerf,
        cost: ext_sheet.cost,
        material_id: ext_sheet.material_id.clone(),
    })
}
