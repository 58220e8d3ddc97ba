use crate::entities::CutLine;
use crate::geometry::geo_enums::SplitAxis;
use crate::geometry::{EPSILON, Rect};

/// Penalty per resulting fragment when choosing between split axes,
/// large enough for a fragment to outweigh most area differences.
pub const FRAGMENT_SPLIT_PENALTY: f64 = 1.0e5;

/// Outcome of cutting a part out of the bottom left corner of a free rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitOutcome {
    pub axis: SplitAxis,
    /// The remaining free rectangles: `[right, top]`
    pub children: [Option<Rect>; 2],
    /// The guillotine cuts needed to free the part
    pub cuts: [Option<CutLine>; 2],
    pub largest_area: f64,
    pub total_area: f64,
    /// largest_area / total_area, 1.0 if nothing remains
    pub concentration: f64,
    pub fragment_count: usize,
}

impl SplitOutcome {
    pub fn children(&self) -> impl Iterator<Item = Rect> + '_ {
        self.children.iter().flatten().copied()
    }

    pub fn cuts(&self) -> impl Iterator<Item = CutLine> + '_ {
        self.cuts.iter().flatten().copied()
    }

    /// The quantity maximized by [`best_split`]
    pub fn quality(&self) -> f64 {
        self.concentration * self.largest_area
            - self.fragment_count as f64 * FRAGMENT_SPLIT_PENALTY
    }
}

/// Computes the children of cutting a `part_w` x `part_h` part out of `free` along `axis`,
/// without modifying anything. Children with a side smaller than `min_usable_dim` are dropped.
///
/// * [`SplitAxis::Horizontal`]: the top child spans the full width, the right child only the part's height
/// * [`SplitAxis::Vertical`]: the right child spans the full height, the top child only the part's width
pub fn simulate_split(
    free: &Rect,
    part_w: f64,
    part_h: f64,
    kerf: f64,
    min_usable_dim: f64,
    axis: SplitAxis,
) -> SplitOutcome {
    let (x, y) = (free.x_min, free.y_min);
    let rem_w = free.width() - part_w;
    let rem_h = free.height() - part_h;

    // the kerf is only lost where there is material left to cut off
    let right_w = rem_w - kerf;
    let top_h = rem_h - kerf;

    let (right, top, cuts) = match axis {
        SplitAxis::Horizontal => (
            Rect::from_dims(x + part_w + kerf, y, right_w, part_h),
            Rect::from_dims(x, y + part_h + kerf, free.width(), top_h),
            [
                (rem_h > EPSILON).then(|| CutLine::horizontal(y + part_h, x, free.x_max)),
                (rem_w > EPSILON).then(|| CutLine::vertical(x + part_w, y, y + part_h)),
            ],
        ),
        SplitAxis::Vertical => (
            Rect::from_dims(x + part_w + kerf, y, right_w, free.height()),
            Rect::from_dims(x, y + part_h + kerf, part_w, top_h),
            [
                (rem_w > EPSILON).then(|| CutLine::vertical(x + part_w, y, free.y_max)),
                (rem_h > EPSILON).then(|| CutLine::horizontal(y + part_h, x, x + part_w)),
            ],
        ),
    };

    let keep = |r: Option<Rect>| r.filter(|r| r.short_side() >= min_usable_dim);
    let children = [keep(right), keep(top)];

    let areas = children.iter().flatten().map(|c| c.area());
    let largest_area = areas.clone().fold(0.0, f64::max);
    let total_area: f64 = areas.sum();
    let fragment_count = children.iter().flatten().count();

    SplitOutcome {
        axis,
        children,
        cuts,
        largest_area,
        total_area,
        concentration: match total_area > 0.0 {
            true => largest_area / total_area,
            false => 1.0,
        },
        fragment_count,
    }
}

/// Evaluates both split axes and returns the one producing fewer, larger and more consolidated offcuts.
/// Ties go to [`SplitAxis::Horizontal`].
pub fn best_split(
    free: &Rect,
    part_w: f64,
    part_h: f64,
    kerf: f64,
    min_usable_dim: f64,
) -> SplitOutcome {
    let horizontal = simulate_split(free, part_w, part_h, kerf, min_usable_dim, SplitAxis::Horizontal);
    let vertical = simulate_split(free, part_w, part_h, kerf, min_usable_dim, SplitAxis::Vertical);
    match vertical.quality() > horizontal.quality() {
        true => vertical,
        false => horizontal,
    }
}
