use crate::geometry::EPSILON;
use crate::geometry::geo_enums::GeoRelation;
use anyhow::Result;
use anyhow::ensure;

///Axis-aligned rectangle, coordinates in millimetres
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        ensure!(
            x_min < x_max && y_min < y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Rectangle with its bottom left corner at (`x`, `y`).
    /// Returns `None` if either dimension is not strictly positive.
    pub fn from_dims(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        match width > EPSILON && height > EPSILON {
            true => Some(Rect {
                x_min: x,
                y_min: y,
                x_max: x + width,
                y_max: y + height,
            }),
            false => None,
        }
    }

    /// Returns the geometric relation between `self` and another [`Rect`].
    /// Rectangles that only share (part of) an edge are considered [`GeoRelation::Disjoint`].
    pub fn relation_to(&self, other: &Rect) -> GeoRelation {
        if !self.overlaps(other) {
            return GeoRelation::Disjoint;
        }
        if self.contains(other) {
            return GeoRelation::Surrounding;
        }
        if other.contains(self) {
            return GeoRelation::Enclosed;
        }
        GeoRelation::Intersecting
    }

    /// True if the interiors of both rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        f64::min(self.x_max, other.x_max) - f64::max(self.x_min, other.x_min) > EPSILON
            && f64::min(self.y_max, other.y_max) - f64::max(self.y_min, other.y_min) > EPSILON
    }

    /// True if `other` lies entirely within `self` (shared edges allowed).
    pub fn contains(&self, other: &Rect) -> bool {
        self.x_min <= other.x_min + EPSILON
            && self.y_min <= other.y_min + EPSILON
            && self.x_max >= other.x_max - EPSILON
            && self.y_max >= other.y_max - EPSILON
    }

    /// Merges two rectangles into one if they share a complete edge.
    pub fn try_merge(&self, other: &Rect) -> Option<Rect> {
        let same_columns = approx(self.x_min, other.x_min) && approx(self.x_max, other.x_max);
        let same_rows = approx(self.y_min, other.y_min) && approx(self.y_max, other.y_max);

        if same_columns && (approx(self.y_max, other.y_min) || approx(other.y_max, self.y_min)) {
            Some(Rect::bounding_rect(*self, *other))
        } else if same_rows
            && (approx(self.x_max, other.x_min) || approx(other.x_max, self.x_min))
        {
            Some(Rect::bounding_rect(*self, *other))
        } else {
            None
        }
    }

    /// Returns a copy grown by `dx` towards x_max and `dy` towards y_max.
    pub fn inflate(self, dx: f64, dy: f64) -> Rect {
        Rect {
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
            ..self
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn short_side(&self) -> f64 {
        f64::min(self.width(), self.height())
    }

    pub fn long_side(&self) -> f64 {
        f64::max(self.width(), self.height())
    }

    /// Returns the largest rectangle that is contained in both `a` and `b`.
    pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
        let x_min = f64::max(a.x_min, b.x_min);
        let y_min = f64::max(a.y_min, b.y_min);
        let x_max = f64::min(a.x_max, b.x_max);
        let y_max = f64::min(a.y_max, b.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    /// Returns the smallest rectangle that contains both `a` and `b`.
    pub fn bounding_rect(a: Rect, b: Rect) -> Rect {
        Rect {
            x_min: f64::min(a.x_min, b.x_min),
            y_min: f64::min(a.y_min, b.y_min),
            x_max: f64::max(a.x_max, b.x_max),
            y_max: f64::max(a.y_max, b.y_max),
        }
    }

    /// Number of sides of `self` lying on the border of `outer`.
    pub fn n_touching_edges(&self, outer: &Rect) -> usize {
        [
            approx(self.x_min, outer.x_min),
            approx(self.y_min, outer.y_min),
            approx(self.x_max, outer.x_max),
            approx(self.y_max, outer.y_max),
        ]
        .into_iter()
        .filter(|t| *t)
        .count()
    }

    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_requires_full_shared_edge() {
        let a = Rect::from_dims(0.0, 0.0, 100.0, 50.0).unwrap();
        let above = Rect::from_dims(0.0, 50.0, 100.0, 20.0).unwrap();
        let offset = Rect::from_dims(10.0, 50.0, 100.0, 20.0).unwrap();

        let merged = a.try_merge(&above).unwrap();
        assert_eq!(merged, Rect::from_dims(0.0, 0.0, 100.0, 70.0).unwrap());
        assert!(a.try_merge(&offset).is_none());
    }

    #[test]
    fn touching_rectangles_are_disjoint() {
        let a = Rect::from_dims(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = Rect::from_dims(10.0, 0.0, 10.0, 10.0).unwrap();
        let c = Rect::from_dims(2.0, 2.0, 3.0, 3.0).unwrap();
        assert_eq!(a.relation_to(&b), GeoRelation::Disjoint);
        assert_eq!(a.relation_to(&c), GeoRelation::Surrounding);
        assert_eq!(c.relation_to(&a), GeoRelation::Enclosed);
    }

    #[test]
    fn degenerate_dims_are_rejected() {
        assert!(Rect::from_dims(0.0, 0.0, 0.0, 5.0).is_none());
        assert!(Rect::try_new(5.0, 0.0, 1.0, 5.0).is_err());
    }
}
