use crate::entities::{Grain, PartInstance};
use crate::geometry::geo_enums::Rotation;
use crate::geometry::{EPSILON, Rect};

/// A way of putting a part into a free rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    /// Placed dimensions of the part
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
    /// Placed dimensions plus kerf, clipped to the free rectangle.
    /// This is the space the part consumes from the free rectangle.
    pub footprint_width: f64,
    pub footprint_height: f64,
}

/// Placed (width, height) of a part for both rotations.
/// At 0° the part's width runs along the x-axis and its length along the y-axis.
pub fn placed_dims(part: &PartInstance, rotation: Rotation) -> (f64, f64) {
    match rotation {
        Rotation::Deg0 => (part.width, part.length),
        Rotation::Deg90 => (part.length, part.width),
    }
}

/// Rotations the part's grain constraint allows, in evaluation order.
/// Square parts only report 0°, as both rotations are indistinguishable.
pub fn allowed_rotations(part: &PartInstance) -> &'static [Rotation] {
    match part.grain {
        Grain::LengthLocked => &[Rotation::Deg0],
        Grain::WidthLocked => &[Rotation::Deg90],
        Grain::Any if part.is_square() => &[Rotation::Deg0],
        Grain::Any => &[Rotation::Deg0, Rotation::Deg90],
    }
}

/// All orientations of `part` that respect its grain and fit inside `free`.
/// Space for the `kerf` is only reserved where the part does not reach the rectangle's far edge.
pub fn valid_orientations(
    part: &PartInstance,
    free: &Rect,
    kerf: f64,
) -> impl Iterator<Item = Orientation> {
    let (free_w, free_h) = (free.width(), free.height());
    allowed_rotations(part).iter().filter_map(move |&rotation| {
        let (width, height) = placed_dims(part, rotation);
        match width <= free_w + EPSILON && height <= free_h + EPSILON {
            true => Some(Orientation {
                width,
                height,
                rotation,
                footprint_width: f64::min(width + kerf, free_w),
                footprint_height: f64::min(height + kerf, free_h),
            }),
            false => None,
        }
    })
}

/// Whether the part fits on an empty sheet in at least one allowed orientation.
pub fn fits_empty_sheet(part: &PartInstance, sheet: &Rect) -> bool {
    valid_orientations(part, sheet, 0.0).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PartSpec, expand_instances};

    fn instance(length: f64, width: f64, grain: Grain) -> PartInstance {
        let spec = PartSpec::new("p", length, width, 1).with_grain(grain);
        expand_instances(&[spec]).remove(0)
    }

    #[test]
    fn grain_limits_rotations() {
        let free = Rect::from_dims(0.0, 0.0, 1000.0, 1000.0).unwrap();
        let locked = instance(600.0, 400.0, Grain::LengthLocked);
        let rotations: Vec<_> = valid_orientations(&locked, &free, 3.0)
            .map(|o| o.rotation)
            .collect();
        assert_eq!(rotations, vec![Rotation::Deg0]);

        let width_locked = instance(600.0, 400.0, Grain::WidthLocked);
        let o = valid_orientations(&width_locked, &free, 3.0).next().unwrap();
        assert_eq!((o.rotation, o.width, o.height), (Rotation::Deg90, 600.0, 400.0));

        let free_part = instance(600.0, 400.0, Grain::Any);
        assert_eq!(valid_orientations(&free_part, &free, 3.0).count(), 2);
    }

    #[test]
    fn only_fitting_orientations_are_returned() {
        let free = Rect::from_dims(0.0, 0.0, 700.0, 450.0).unwrap();
        let part = instance(600.0, 400.0, Grain::Any);
        let orientations: Vec<_> = valid_orientations(&part, &free, 3.0).collect();
        assert_eq!(orientations.len(), 1);
        assert_eq!(orientations[0].rotation, Rotation::Deg90);
        assert_eq!(orientations[0].footprint_width, 603.0);
    }

    #[test]
    fn footprint_is_clipped_at_far_edge() {
        let free = Rect::from_dims(0.0, 0.0, 400.0, 601.0).unwrap();
        let part = instance(600.0, 400.0, Grain::LengthLocked);
        let o = valid_orientations(&part, &free, 3.0).next().unwrap();
        assert_eq!(o.footprint_width, 400.0);
        assert_eq!(o.footprint_height, 601.0);
    }
}
