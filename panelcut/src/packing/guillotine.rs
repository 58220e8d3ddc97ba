use crate::entities::{CutLine, PartInstance, Placement, SheetLayout};
use crate::geometry::Rect;
use crate::geometry::geo_enums::GeoRelation;
use crate::geometry::orientation::{Orientation, valid_orientations};
use crate::geometry::split::{best_split, simulate_split};
use crate::packing::PackingConfig;
use crate::packing::scoring::placement_score;
use crate::util::assertions;
use log::trace;

/// Greedy guillotine packer for a single sheet.
///
/// Maintains the list of free rectangles of the sheet. Every placement is cut out of the
/// bottom left corner of the free rectangle it was assigned to, after which the
/// remainder is split along the axis that leaves the most consolidated offcuts.
#[derive(Clone, Debug)]
pub struct GuillotinePacker {
    sheet: Rect,
    kerf: f64,
    config: PackingConfig,
    free_rects: Vec<Rect>,
    placements: Vec<Placement>,
    cuts: Vec<CutLine>,
}

impl GuillotinePacker {
    pub fn new(sheet: Rect, kerf: f64, config: PackingConfig) -> Self {
        Self {
            sheet,
            kerf,
            config,
            free_rects: vec![sheet],
            placements: vec![],
            cuts: vec![],
        }
    }

    /// Places `part` at the position with the lowest [`placement_score`].
    /// Returns `None` if no free rectangle can hold it in any allowed orientation.
    pub fn try_place(&mut self, part: &PartInstance) -> Option<&Placement> {
        let (free_idx, orientation) = self.best_candidate(part)?;
        let free = self.free_rects.remove(free_idx);

        let placement = Placement {
            instance_id: part.id,
            part_index: part.part_index,
            part_id: part.part_id.clone(),
            label: part.label.clone(),
            x: free.x_min,
            y: free.y_min,
            width: orientation.width,
            height: orientation.height,
            rotation: orientation.rotation,
        };
        trace!(
            "[GUIL] placing instance {} ({}) at ({:.1}, {:.1}), rotation: {}",
            part.id,
            part.label,
            placement.x,
            placement.y,
            placement.rotation.degrees()
        );

        //the split axis is chosen on usable offcuts, but every remaining piece is kept in the free list
        let axis = best_split(
            &free,
            orientation.width,
            orientation.height,
            self.kerf,
            self.config.min_usable_dimension,
        )
        .axis;
        let split = simulate_split(
            &free,
            orientation.width,
            orientation.height,
            self.kerf,
            0.0,
            axis,
        );
        self.free_rects.extend(split.children());
        self.cuts.extend(split.cuts());
        self.placements.push(placement);

        self.merge_free_rects();
        self.prune_free_rects();

        debug_assert!(assertions::placements_within(&self.placements, &self.sheet));
        debug_assert!(assertions::no_overlapping_placements(
            &self.placements,
            self.kerf
        ));

        self.placements.last()
    }

    /// Applies [`GuillotinePacker::try_place`] to all parts in the given order.
    /// Returns the parts that could not be placed, in their original order.
    pub fn pack_all<'a>(
        &mut self,
        parts: impl IntoIterator<Item = &'a PartInstance>,
    ) -> Vec<&'a PartInstance> {
        parts
            .into_iter()
            .filter(|part| self.try_place(part).is_none())
            .collect()
    }

    /// Lowest scoring (free rectangle, orientation) pair.
    /// Ties are resolved in favor of the first free rectangle, then the first orientation.
    fn best_candidate(&self, part: &PartInstance) -> Option<(usize, Orientation)> {
        let mut best: Option<(usize, Orientation, f64)> = None;
        for (idx, free) in self.free_rects.iter().enumerate() {
            for orientation in valid_orientations(part, free, self.kerf) {
                let score = placement_score(&orientation, free, &self.sheet, self.kerf, &self.config);
                let improves = match &best {
                    Some((_, _, best_score)) => score < *best_score,
                    None => true,
                };
                if improves {
                    best = Some((idx, orientation, score));
                }
            }
        }
        best.map(|(idx, orientation, _)| (idx, orientation))
    }

    /// Merges free rectangles sharing a complete edge until no more merges are possible.
    fn merge_free_rects(&mut self) {
        let mut merged_any = true;
        while merged_any {
            merged_any = false;
            'search: for i in 0..self.free_rects.len() {
                for j in (i + 1)..self.free_rects.len() {
                    if let Some(merged) = self.free_rects[i].try_merge(&self.free_rects[j]) {
                        self.free_rects[i] = merged;
                        self.free_rects.remove(j);
                        merged_any = true;
                        break 'search;
                    }
                }
            }
        }
    }

    /// Removes free rectangles that are fully contained in another one.
    fn prune_free_rects(&mut self) {
        let mut i = 0;
        while i < self.free_rects.len() {
            let redundant = self.free_rects.iter().enumerate().any(|(j, other)| {
                j != i
                    && match other.relation_to(&self.free_rects[i]) {
                        GeoRelation::Surrounding => other != &self.free_rects[i] || j < i,
                        _ => false,
                    }
            });
            match redundant {
                true => {
                    self.free_rects.remove(i);
                }
                false => i += 1,
            }
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn free_rects(&self) -> &[Rect] {
        &self.free_rects
    }

    pub fn cuts(&self) -> &[CutLine] {
        &self.cuts
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn used_area(&self) -> f64 {
        self.placements.iter().map(|p| p.area()).sum()
    }

    /// Finalizes the sheet
    pub fn into_layout(self, stock_id: &str, index: usize) -> SheetLayout {
        SheetLayout::new(
            stock_id,
            index,
            self.sheet,
            self.kerf,
            self.placements,
            self.free_rects,
            self.cuts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Grain, PartSpec, expand_instances};
    use crate::geometry::geo_enums::Rotation;

    fn sheet() -> Rect {
        Rect::from_dims(0.0, 0.0, 1830.0, 2750.0).unwrap()
    }

    #[test]
    fn first_part_goes_to_origin() {
        let parts = expand_instances(&[PartSpec::new("a", 600.0, 400.0, 1)]);
        let mut packer = GuillotinePacker::new(sheet(), 3.0, PackingConfig::default());
        let p = packer.try_place(&parts[0]).unwrap();
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert_eq!(packer.free_rects().len(), 2);
        assert_eq!(packer.cuts().len(), 2);
    }

    #[test]
    fn oversized_part_is_rejected() {
        let parts = expand_instances(&[PartSpec::new("big", 3000.0, 2000.0, 1)]);
        let mut packer = GuillotinePacker::new(sheet(), 3.0, PackingConfig::default());
        assert!(packer.try_place(&parts[0]).is_none());
        assert!(packer.is_empty());
    }

    #[test]
    fn pack_all_returns_leftovers_in_order() {
        let parts = expand_instances(&[
            PartSpec::new("half", 2750.0, 900.0, 2),
            PartSpec::new("extra", 500.0, 500.0, 2),
        ]);
        let mut packer = GuillotinePacker::new(sheet(), 3.0, PackingConfig::default());
        let rest = packer.pack_all(parts.iter());
        // two 900mm wide full length halves fit next to each other, leaving 24mm: no room for the others
        assert_eq!(packer.placements().len(), 2);
        assert_eq!(rest.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn grain_locked_parts_keep_orientation() {
        let parts = expand_instances(&[
            PartSpec::new("l", 700.0, 300.0, 4).with_grain(Grain::LengthLocked),
            PartSpec::new("w", 700.0, 300.0, 4).with_grain(Grain::WidthLocked),
        ]);
        let mut packer = GuillotinePacker::new(sheet(), 3.0, PackingConfig::default());
        let rest = packer.pack_all(parts.iter());
        assert!(rest.is_empty());
        for p in packer.placements() {
            let expected = match &*p.part_id {
                "l" => Rotation::Deg0,
                _ => Rotation::Deg90,
            };
            assert_eq!(p.rotation, expected);
        }
    }

    #[test]
    fn placement_is_deterministic() {
        let parts = expand_instances(&[
            PartSpec::new("a", 800.0, 450.0, 3),
            PartSpec::new("b", 620.0, 510.0, 4),
            PartSpec::new("c", 300.0, 300.0, 5),
        ]);
        let run = || {
            let mut packer = GuillotinePacker::new(sheet(), 3.0, PackingConfig::default());
            packer.pack_all(parts.iter());
            packer.placements().to_vec()
        };
        assert_eq!(run(), run());
    }
}
