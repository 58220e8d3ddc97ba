use panelcut::entities::PartInstance;
use rand::Rng;
use rand::rngs::SmallRng;

/// Kinds of local moves on a part ordering, with their selection weights
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Swap,
    Reinsert,
    ReverseRun,
    BlockSwap,
    PromoteConstrained,
}

impl MoveKind {
    pub const WEIGHTED: [(MoveKind, u32); 5] = [
        (MoveKind::Swap, 35),
        (MoveKind::Reinsert, 25),
        (MoveKind::ReverseRun, 15),
        (MoveKind::BlockSwap, 15),
        (MoveKind::PromoteConstrained, 10),
    ];

    pub fn sample(rng: &mut SmallRng) -> MoveKind {
        let total: u32 = Self::WEIGHTED.iter().map(|(_, w)| w).sum();
        let mut pick = rng.random_range(0..total);
        for (kind, weight) in Self::WEIGHTED {
            if pick < weight {
                return kind;
            }
            pick -= weight;
        }
        unreachable!("pick is always smaller than the total weight")
    }
}

/// A reversible modification of a part ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// Swaps the elements at both positions
    Swap { i: usize, j: usize },
    /// Removes the element at `from` and inserts it at `to`
    Reinsert { from: usize, to: usize },
    /// Reverses the run `start..end`
    ReverseRun { start: usize, end: usize },
    /// Swaps the adjacent blocks `start..start+len` and `start+len..start+2*len`
    BlockSwap { start: usize, len: usize },
}

impl Move {
    pub fn apply(&self, order: &mut Vec<usize>) {
        match *self {
            Move::Swap { i, j } => order.swap(i, j),
            Move::Reinsert { from, to } => {
                let elem = order.remove(from);
                order.insert(to, elem);
            }
            Move::ReverseRun { start, end } => order[start..end].reverse(),
            Move::BlockSwap { start, len } => order[start..start + 2 * len].rotate_left(len),
        }
    }

    /// The move that undoes `self`
    pub fn inverse(&self) -> Move {
        match *self {
            Move::Reinsert { from, to } => Move::Reinsert { from: to, to: from },
            other => other,
        }
    }

    /// Samples a move of the given kind that is applicable to `order`.
    /// Returns `None` if the ordering is too short (or has no constrained part to promote).
    pub fn sample(
        kind: MoveKind,
        order: &[usize],
        parts: &[PartInstance],
        rng: &mut SmallRng,
    ) -> Option<Move> {
        let n = order.len();
        if n < 2 {
            return None;
        }
        match kind {
            MoveKind::Swap => {
                let i = rng.random_range(0..n);
                let j = (i + rng.random_range(1..n)) % n;
                Some(Move::Swap { i, j })
            }
            MoveKind::Reinsert => {
                let from = rng.random_range(0..n);
                let to = (from + rng.random_range(1..n)) % n;
                Some(Move::Reinsert { from, to })
            }
            MoveKind::ReverseRun => {
                let len = rng.random_range(2..=usize::min(8, n));
                let start = rng.random_range(0..=n - len);
                Some(Move::ReverseRun {
                    start,
                    end: start + len,
                })
            }
            MoveKind::BlockSwap => {
                if n < 4 {
                    return None;
                }
                let len = rng.random_range(2..=usize::min(4, n / 2));
                let start = rng.random_range(0..=n - 2 * len);
                Some(Move::BlockSwap { start, len })
            }
            MoveKind::PromoteConstrained => {
                //constrained instances that are not already at the front
                let candidates: Vec<usize> = (1..n).filter(|&p| parts[order[p]].is_constrained()).collect();
                if candidates.is_empty() {
                    return None;
                }
                let from = candidates[rng.random_range(0..candidates.len())];
                let to = rng.random_range(0..from);
                Some(Move::Reinsert { from, to })
            }
        }
    }
}
