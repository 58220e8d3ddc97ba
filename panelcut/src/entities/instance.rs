use crate::entities::{PartSpec, StockSheetSpec};

/// A validated cutlist: the parts to cut and the stock they can be cut from.
#[derive(Clone, Debug)]
pub struct Instance {
    pub parts: Vec<PartSpec>,
    /// Guaranteed to be non-empty by the importer
    pub stock: Vec<StockSheetSpec>,
}

impl Instance {
    pub fn new(parts: Vec<PartSpec>, stock: Vec<StockSheetSpec>) -> Self {
        assert!(!stock.is_empty(), "an instance needs at least one stock sheet");
        Instance { parts, stock }
    }

    /// The stock sheet optimized against. Only a single sheet size is used per run.
    pub fn primary_stock(&self) -> &StockSheetSpec {
        &self.stock[0]
    }

    /// The first stock sheet tagged with `material_id`, or the primary stock otherwise.
    pub fn stock_for_material(&self, material_id: Option<&str>) -> &StockSheetSpec {
        material_id
            .and_then(|m| {
                self.stock
                    .iter()
                    .find(|s| s.material_id.as_deref() == Some(m))
            })
            .unwrap_or_else(|| self.primary_stock())
    }

    pub fn total_part_qty(&self) -> usize {
        self.parts.iter().map(|p| p.quantity).sum()
    }
}
