use crate::geometry::Rect;

/// Blade width used when none is specified
pub const DEFAULT_KERF: f64 = 3.0;

/// A stock sheet size that parts are cut from.
/// The sheet's width runs along the x-axis, its length along the y-axis.
#[derive(Clone, Debug, PartialEq)]
pub struct StockSheetSpec {
    pub id: String,
    pub length: f64,
    pub width: f64,
    /// Maximum number of sheets that can be consumed
    pub quantity: usize,
    /// Width of material removed by every cut
    pub kerf: f64,
    pub cost: Option<f64>,
    pub material_id: Option<String>,
}

impl StockSheetSpec {
    pub fn new(id: impl Into<String>, length: f64, width: f64, quantity: usize) -> Self {
        StockSheetSpec {
            id: id.into(),
            length,
            width,
            quantity,
            kerf: DEFAULT_KERF,
            cost: None,
            material_id: None,
        }
    }

    pub fn with_kerf(mut self, kerf: f64) -> Self {
        self.kerf = kerf;
        self
    }

    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    /// The usable area of a single sheet, as a rectangle anchored at the origin
    pub fn bounds(&self) -> Rect {
        Rect {
            x_min: 0.0,
            y_min: 0.0,
            x_max: self.width,
            y_max: self.length,
        }
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}
