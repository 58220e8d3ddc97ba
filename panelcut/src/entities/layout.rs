use crate::entities::{CutLine, Placement};
use crate::geometry::Rect;
use ordered_float::OrderedFloat;

/// The final state of a single consumed stock sheet.
#[derive(Clone, Debug)]
pub struct SheetLayout {
    /// Id of the stock sheet spec this sheet was taken from
    pub stock_id: String,
    /// Position of this sheet within its layout result
    pub index: usize,
    pub width: f64,
    pub length: f64,
    pub kerf: f64,
    pub placements: Vec<Placement>,
    pub used_area: f64,
    /// Unoccupied regions left on the sheet
    pub offcuts: Vec<Rect>,
    /// Cuts required to free all placements, in the order they were introduced
    pub cuts: Vec<CutLine>,
}

impl SheetLayout {
    pub fn new(
        stock_id: &str,
        index: usize,
        bounds: Rect,
        kerf: f64,
        placements: Vec<Placement>,
        offcuts: Vec<Rect>,
        cuts: Vec<CutLine>,
    ) -> Self {
        let used_area = placements.iter().map(|p| p.area()).sum();
        SheetLayout {
            stock_id: stock_id.to_string(),
            index,
            width: bounds.width(),
            length: bounds.height(),
            kerf,
            placements,
            used_area,
            offcuts,
            cuts,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x_min: 0.0,
            y_min: 0.0,
            x_max: self.width,
            y_max: self.length,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    pub fn waste_area(&self) -> f64 {
        self.area() - self.used_area
    }

    pub fn utilization(&self) -> f64 {
        self.used_area / self.area()
    }

    /// Smallest rectangle enclosing all placements
    pub fn bounding_box(&self) -> Option<Rect> {
        self.placements
            .iter()
            .map(|p| p.rect())
            .reduce(Rect::bounding_rect)
    }

    pub fn cut_count(&self) -> usize {
        self.cuts.len()
    }

    pub fn cut_length(&self) -> f64 {
        self.cuts.iter().map(|c| c.length()).sum()
    }

    /// Offcuts with both sides at least `min_dim` and an area of at least `min_area`
    pub fn usable_offcuts(&self, min_dim: f64, min_area: f64) -> impl Iterator<Item = &Rect> {
        self.offcuts
            .iter()
            .filter(move |o| o.short_side() >= min_dim && o.area() >= min_area)
    }

    pub fn largest_offcut(&self) -> Option<Rect> {
        self.offcuts
            .iter()
            .max_by_key(|o| OrderedFloat(o.area()))
            .copied()
    }

    /// Share of the offcut area that is concentrated in the largest offcut.
    /// 1.0 if there are no offcuts at all.
    pub fn offcut_concentration(&self) -> f64 {
        let total: f64 = self.offcuts.iter().map(|o| o.area()).sum();
        match self.largest_offcut() {
            Some(largest) if total > 0.0 => largest.area() / total,
            _ => 1.0,
        }
    }
}
