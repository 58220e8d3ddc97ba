use itertools::Itertools;
use ordered_float::OrderedFloat;
use panelcut::entities::{Grain, PartInstance};
use rand::SeedableRng;
use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

/// Base orderings in which parts are fed to the guillotine packer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Longest side descending, area as tie breaker
    ConstrainedLongestSide,
    /// Area descending
    Area,
    /// Width descending
    Width,
    /// Perimeter descending
    Perimeter,
    /// Width ascending
    WidthAscending,
    /// Height the part occupies on the sheet given its grain, descending
    HeightByGrain,
}

impl SortStrategy {
    pub const ALL: [SortStrategy; 6] = [
        SortStrategy::ConstrainedLongestSide,
        SortStrategy::Area,
        SortStrategy::Width,
        SortStrategy::Perimeter,
        SortStrategy::WidthAscending,
        SortStrategy::HeightByGrain,
    ];

    fn key(&self, part: &PartInstance) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        let of = OrderedFloat;
        match self {
            SortStrategy::ConstrainedLongestSide => (of(-part.longest_side()), of(-part.area())),
            SortStrategy::Area => (of(-part.area()), of(-part.longest_side())),
            SortStrategy::Width => (of(-part.width), of(-part.length)),
            SortStrategy::Perimeter => (of(-part.perimeter()), of(-part.area())),
            SortStrategy::WidthAscending => (of(part.width), of(-part.length)),
            SortStrategy::HeightByGrain => (of(-grain_height(part)), of(-grain_width(part))),
        }
    }
}

impl Display for SortStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortStrategy::ConstrainedLongestSide => "constrained_longest_side",
            SortStrategy::Area => "area",
            SortStrategy::Width => "width",
            SortStrategy::Perimeter => "perimeter",
            SortStrategy::WidthAscending => "width_ascending",
            SortStrategy::HeightByGrain => "height_by_grain",
        };
        write!(f, "{name}")
    }
}

/// An ordering of the parts, as tried by the heuristic search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrderingVariant {
    Base(SortStrategy),
    Reversed(SortStrategy),
    Shuffled { seed: u64 },
    CornerPriority,
    HeightBands { bucket: f64 },
}

impl OrderingVariant {
    /// Indices into `parts`, grain-constrained instances always first.
    pub fn ordering(&self, parts: &[PartInstance]) -> Vec<usize> {
        match *self {
            OrderingVariant::Base(s) => sort_by_strategy(parts, s),
            OrderingVariant::Reversed(s) => reversed(parts, &sort_by_strategy(parts, s)),
            OrderingVariant::Shuffled { seed } => {
                let mut rng = SmallRng::seed_from_u64(seed);
                let base = (0..parts.len()).collect_vec();
                shuffled(parts, &base, &mut rng)
            }
            OrderingVariant::CornerPriority => corner_priority(parts),
            OrderingVariant::HeightBands { bucket } => height_bands(parts, bucket),
        }
    }
}

impl Display for OrderingVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderingVariant::Base(s) => write!(f, "{s}"),
            OrderingVariant::Reversed(s) => write!(f, "{s}_reversed"),
            OrderingVariant::Shuffled { seed } => write!(f, "shuffle_{seed}"),
            OrderingVariant::CornerPriority => write!(f, "corner_priority"),
            OrderingVariant::HeightBands { .. } => write!(f, "height_bands"),
        }
    }
}

/// Sorts the parts according to `strategy`, with all grain-constrained instances first.
/// The sort is stable, equal parts keep their submission order.
pub fn sort_by_strategy(parts: &[PartInstance], strategy: SortStrategy) -> Vec<usize> {
    (0..parts.len())
        .sorted_by_cached_key(|&i| (!parts[i].is_constrained(), strategy.key(&parts[i])))
        .collect()
}

/// Reverses `order` within the constrained and the unconstrained group
pub fn reversed(parts: &[PartInstance], order: &[usize]) -> Vec<usize> {
    let (constrained, free) = split_constrained(parts, order);
    constrained.into_iter().rev().chain(free.into_iter().rev()).collect()
}

/// Shuffles `order` within the constrained and the unconstrained group
pub fn shuffled(parts: &[PartInstance], order: &[usize], rng: &mut SmallRng) -> Vec<usize> {
    let (mut constrained, mut free) = split_constrained(parts, order);
    constrained.shuffle(rng);
    free.shuffle(rng);
    constrained.into_iter().chain(free).collect()
}

/// Shuffles `order` only within consecutive windows of `window` positions,
/// preserving the overall character of the ordering.
pub fn window_shuffled(
    parts: &[PartInstance],
    order: &[usize],
    window: usize,
    rng: &mut SmallRng,
) -> Vec<usize> {
    let (mut constrained, mut free) = split_constrained(parts, order);
    for group in [&mut constrained, &mut free] {
        for chunk in group.chunks_mut(window.max(1)) {
            chunk.shuffle(rng);
        }
    }
    constrained.into_iter().chain(free).collect()
}

/// Largest area first, squarest first among equal areas.
/// The big parts end up anchored in the sheet corners, the smaller parts fill in around them.
pub fn corner_priority(parts: &[PartInstance]) -> Vec<usize> {
    (0..parts.len())
        .sorted_by_cached_key(|&i| {
            let p = &parts[i];
            (
                !p.is_constrained(),
                Reverse(OrderedFloat(p.area())),
                OrderedFloat(p.longest_side() / p.shortest_side()),
            )
        })
        .collect()
}

/// Groups parts by their occupied height rounded to a multiple of `bucket`,
/// tallest band first, widest part first within a band.
pub fn height_bands(parts: &[PartInstance], bucket: f64) -> Vec<usize> {
    let band_of = |p: &PartInstance| match bucket > 0.0 {
        true => (grain_height(p) / bucket).round() as i64,
        false => grain_height(p).round() as i64,
    };
    (0..parts.len())
        .sorted_by_cached_key(|&i| {
            let p = &parts[i];
            (
                !p.is_constrained(),
                Reverse(band_of(p)),
                Reverse(OrderedFloat(grain_width(p))),
            )
        })
        .collect()
}

/// Height a part occupies on the sheet. Free parts are assumed to stand upright.
pub fn grain_height(part: &PartInstance) -> f64 {
    match part.grain {
        Grain::LengthLocked => part.length,
        Grain::WidthLocked => part.width,
        Grain::Any => part.longest_side(),
    }
}

pub fn grain_width(part: &PartInstance) -> f64 {
    match part.grain {
        Grain::LengthLocked => part.width,
        Grain::WidthLocked => part.length,
        Grain::Any => part.shortest_side(),
    }
}

fn split_constrained(parts: &[PartInstance], order: &[usize]) -> (Vec<usize>, Vec<usize>) {
    order.iter().partition(|&&i| parts[i].is_constrained())
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcut::entities::{PartSpec, expand_instances};

    fn parts() -> Vec<PartInstance> {
        expand_instances(&[
            PartSpec::new("small", 300.0, 200.0, 1),
            PartSpec::new("door", 700.0, 400.0, 1).with_grain(Grain::LengthLocked),
            PartSpec::new("long", 1200.0, 100.0, 1),
            PartSpec::new("big", 800.0, 600.0, 1),
        ])
    }

    #[test]
    fn constrained_parts_come_first() {
        let parts = parts();
        for strategy in SortStrategy::ALL {
            let order = sort_by_strategy(&parts, strategy);
            assert_eq!(order[0], 1, "{strategy}");
            assert_eq!(order.iter().sorted().collect_vec(), vec![&0, &1, &2, &3]);
        }
    }

    #[test]
    fn strategies_order_by_their_key() {
        let parts = parts();
        assert_eq!(sort_by_strategy(&parts, SortStrategy::Area), vec![1, 3, 2, 0]);
        assert_eq!(
            sort_by_strategy(&parts, SortStrategy::ConstrainedLongestSide),
            vec![1, 2, 3, 0]
        );
        assert_eq!(
            sort_by_strategy(&parts, SortStrategy::WidthAscending),
            vec![1, 2, 0, 3]
        );
    }

    #[test]
    fn reversal_keeps_constrained_first() {
        let parts = parts();
        let order = sort_by_strategy(&parts, SortStrategy::Area);
        assert_eq!(reversed(&parts, &order), vec![1, 0, 2, 3]);
    }

    #[test]
    fn shuffles_reproduce_from_seed() {
        let parts = expand_instances(&[PartSpec::new("a", 300.0, 200.0, 20)]);
        let a = OrderingVariant::Shuffled { seed: 42 }.ordering(&parts);
        let b = OrderingVariant::Shuffled { seed: 42 }.ordering(&parts);
        let c = OrderingVariant::Shuffled { seed: 43 }.ordering(&parts);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn height_bands_group_rounded_heights() {
        let parts = expand_instances(&[
            PartSpec::new("a", 410.0, 300.0, 1),
            PartSpec::new("b", 800.0, 100.0, 1),
            PartSpec::new("c", 390.0, 350.0, 1),
            PartSpec::new("d", 600.0, 200.0, 1),
        ]);
        // free parts stand upright: heights 410, 800, 390 and 600
        // with 50mm buckets a and c share the 400 band, widest first
        assert_eq!(height_bands(&parts, 50.0), vec![1, 3, 2, 0]);
        // with 10mm buckets they are split, tallest band first
        assert_eq!(height_bands(&parts, 10.0), vec![1, 3, 0, 2]);
    }

    #[test]
    fn corner_priority_prefers_square_parts_of_equal_area() {
        let parts = expand_instances(&[
            PartSpec::new("oblong", 900.0, 400.0, 1),
            PartSpec::new("square", 600.0, 600.0, 1),
            PartSpec::new("small", 300.0, 300.0, 1),
            PartSpec::new("large", 1000.0, 500.0, 1),
        ]);
        assert_eq!(corner_priority(&parts), vec![3, 1, 0, 2]);
    }

    #[test]
    fn corner_priority_keeps_constrained_first() {
        let parts = expand_instances(&[
            PartSpec::new("big", 1000.0, 800.0, 1),
            PartSpec::new("door", 500.0, 400.0, 1).with_grain(Grain::WidthLocked),
        ]);
        assert_eq!(corner_priority(&parts), vec![1, 0]);
    }
}
