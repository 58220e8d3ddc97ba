use crate::entities::{LayoutResult, SheetLayout};
use crate::geometry::Rect;
use crate::io::ext_repr::{ExtPlacement, ExtRect, ExtSheet, ExtSolution, ExtUnplaced};

/// Exports the layouts of a single material out of the library
pub fn export(result: &LayoutResult, material: &str) -> ExtSolution {
    ExtSolution {
        material: material.to_string(),
        sheets: result.sheets.iter().map(export_sheet).collect(),
        stats: result.stats.clone(),
        unplaced: result
            .unplaced
            .iter()
            .map(|u| ExtUnplaced {
                part_id: u.part_id.to_string(),
                label: u.label.to_string(),
                count: u.count,
                reason: u.reason,
            })
            .collect(),
        diagnostics: result.diagnostics.clone(),
    }
}

pub fn export_sheet(sheet: &SheetLayout) -> ExtSheet {
    ExtSheet {
        stock_id: sheet.stock_id.clone(),
        index: sheet.index,
        width: sheet.width,
        length: sheet.length,
        utilization: sheet.utilization(),
        placements: sheet
            .placements
            .iter()
            .map(|p| ExtPlacement {
                part_id: p.part_id.to_string(),
                label: p.label.to_string(),
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
                rotation: p.rotation,
            })
            .collect(),
        offcuts: sheet.offcuts.iter().map(|o| ExtRect::from(*o)).collect(),
        cuts: sheet.cuts.clone(),
    }
}

impl From<Rect> for ExtRect {
    fn from(r: Rect) -> Self {
        ExtRect {
            x: r.x_min,
            y: r.y_min,
            width: r.width(),
            height: r.height(),
        }
    }
}
