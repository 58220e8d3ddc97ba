use serde::{Deserialize, Serialize};

/// A required rectangular part of a cutlist, as submitted by the caller.
/// Dimensions are in millimetres and assumed validated (see [`crate::io::import`]).
#[derive(Clone, Debug, PartialEq)]
pub struct PartSpec {
    pub id: String,
    /// Dimension along the grain
    pub length: f64,
    pub width: f64,
    pub quantity: usize,
    pub grain: Grain,
    pub banding: EdgeBanding,
    pub lamination: LaminationType,
    pub material_id: Option<String>,
    pub label: Option<String>,
}

impl PartSpec {
    /// Part with no grain, banding or lamination requirements
    pub fn new(id: impl Into<String>, length: f64, width: f64, quantity: usize) -> Self {
        PartSpec {
            id: id.into(),
            length,
            width,
            quantity,
            grain: Grain::Any,
            banding: EdgeBanding::default(),
            lamination: LaminationType::None,
            material_id: None,
            label: None,
        }
    }

    pub fn with_grain(mut self, grain: Grain) -> Self {
        self.grain = grain;
        self
    }

    pub fn with_banding(mut self, banding: EdgeBanding) -> Self {
        self.banding = banding;
        self
    }

    pub fn with_lamination(mut self, lamination: LaminationType) -> Self {
        self.lamination = lamination;
        self
    }

    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label shown on layouts, falls back to the id
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

/// Constraint on how a part's length may be aligned with the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Grain {
    /// Free to rotate
    #[default]
    Any,
    /// Part length must run along the sheet length (no rotation)
    #[serde(alias = "length")]
    LengthLocked,
    /// Part length must run along the sheet width (always rotated)
    #[serde(alias = "width")]
    WidthLocked,
}

impl Grain {
    pub fn is_constrained(&self) -> bool {
        *self != Grain::Any
    }
}

/// Which edges of a part receive edge banding.
/// Top and bottom run along the part's length, left and right along its width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeBanding {
    #[serde(default)]
    pub top: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub bottom: bool,
    #[serde(default)]
    pub left: bool,
}

impl EdgeBanding {
    pub const ALL: EdgeBanding = EdgeBanding {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub const NONE: EdgeBanding = EdgeBanding {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };

    /// Banded length of a single part with the given dimensions
    pub fn banded_length(&self, length: f64, width: f64) -> f64 {
        let long_sides = [self.top, self.bottom].iter().filter(|b| **b).count() as f64;
        let short_sides = [self.left, self.right].iter().filter(|b| **b).count() as f64;
        long_sides * length + short_sides * width
    }

    pub fn is_empty(&self) -> bool {
        *self == EdgeBanding::NONE
    }
}

/// How a part is built up from one or more boards.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum LaminationType {
    /// A single board
    #[default]
    None,
    /// A primary board glued to a backer board of a separate material
    WithBacker,
    /// Two boards of the same material glued together
    SameBoard,
    /// An explicit stack of layers
    Custom(CustomLamination),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomLamination {
    pub layers: Vec<LaminationLayer>,
    /// Thickness of the finished, laminated part in mm. Determines the edging thickness.
    pub final_thickness: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaminationLayer {
    /// Material of this layer, the part's own material if not specified
    #[serde(default)]
    pub material_id: Option<String>,
    pub role: BoardRole,
}

/// Role of a board within a (laminated) part
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardRole {
    Primary,
    Backer,
}
