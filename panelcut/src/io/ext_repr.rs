use crate::entities::{
    BoardRole, CutLine, Diagnostics, EdgeBanding, Grain, LayoutStats, UnplacedReason,
};
use crate::geometry::geo_enums::Rotation;
use serde::{Deserialize, Serialize};

/// External representation of an [`Instance`](crate::entities::Instance).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtInstance {
    /// Name of the cutlist
    #[serde(default)]
    pub name: Option<String>,
    pub parts: Vec<ExtPart>,
    /// Available stock sheets. Only the first one per material is used to optimize against.
    pub stock: Vec<ExtStockSheet>,
}

/// External representation of a [`PartSpec`](crate::entities::PartSpec).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPart {
    /// Unique identifier of the part
    pub id: String,
    pub length: f64,
    pub width: f64,
    pub quantity: u64,
    #[serde(default)]
    pub grain: Grain,
    #[serde(default)]
    pub banding: EdgeBanding,
    #[serde(default)]
    pub lamination: ExtLamination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The ways a part can be laminated
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ExtLamination {
    #[default]
    None,
    WithBacker,
    SameBoard,
    Custom {
        layers: Vec<ExtLaminationLayer>,
        /// Thickness of the finished part in mm
        final_thickness: u32,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtLaminationLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    pub role: BoardRole,
    /// Number of identical boards in this layer
    #[serde(default = "default_layer_quantity")]
    pub quantity: u64,
}

/// External representation of a [`StockSheetSpec`](crate::entities::StockSheetSpec).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtStockSheet {
    pub id: String,
    pub length: f64,
    pub width: f64,
    /// Number of sheets available
    pub quantity: u64,
    #[serde(default = "default_kerf")]
    pub kerf: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
}

/// External representation of a [`LayoutResult`](crate::entities::LayoutResult)
/// of a single material.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSolution {
    /// Material key the layouts were computed for
    pub material: String,
    pub sheets: Vec<ExtSheet>,
    pub stats: LayoutStats,
    pub unplaced: Vec<ExtUnplaced>,
    pub diagnostics: Diagnostics,
}

/// External representation of a [`SheetLayout`](crate::entities::SheetLayout).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSheet {
    pub stock_id: String,
    pub index: usize,
    pub width: f64,
    pub length: f64,
    pub utilization: f64,
    pub placements: Vec<ExtPlacement>,
    pub offcuts: Vec<ExtRect>,
    pub cuts: Vec<CutLine>,
}

/// External representation of a [`Placement`](crate::entities::Placement).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPlacement {
    pub part_id: String,
    pub label: String,
    /// Corner closest to the sheet origin
    pub x: f64,
    pub y: f64,
    /// Placed dimensions
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
}

/// Axis-aligned rectangle with its bottom left corner at (x, y)
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ExtRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtUnplaced {
    pub part_id: String,
    pub label: String,
    pub count: usize,
    pub reason: UnplacedReason,
}

fn default_kerf() -> f64 {
    crate::entities::DEFAULT_KERF
}

fn default_layer_quantity() -> u64 {
    1
}
