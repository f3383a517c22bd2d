// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Paired road recycling for bounds in the hard region.
//!
//! A draw at or above `bound` is rejected, but its complement is still
//! uniform in `[0, diff)` with `diff = 2**W - bound`. Two such complements
//! span a `diff` by `diff` lattice. Cutting it at `half_bound = ceil(bound / 2)`
//! gives rows (first value below `half_bound`) and columns (second value below
//! `half_bound`, first not). Joining two neighbouring cells of a row or column
//! into one road turns the pair into a value uniform in `[0, 2 * half_bound)`,
//! which is `bound` or `bound + 1`.
//!
//! In the hard region `half_bound <= diff`, so roads cover a large share of the
//! lattice and the average cost drops from up to two draws per output to
//! about 1.6 just above half the range and 4/3 near two thirds.

use super::{
    classify, half_bound,
    lemire::{self, FirstDraw},
    Region,
};
use crate::{rngs::RNG, uint::UnsignedInt};

/// Road layout of the lattice for one bound.
#[derive(Debug, Copy, Clone)]
struct Lattice<T> {
    diff: T,
    half_bound: T,
}

impl<T: UnsignedInt> Lattice<T> {
    fn new(bound: T) -> Self {
        Lattice {
            diff: bound.wrapping_neg(),
            half_bound: half_bound(bound),
        }
    }

    /// Join a cell with its road neighbour. Returns `None` for the cells of a
    /// row or column that has an odd length and so leaves one cell unpaired.
    fn pair(&self, bits: T, new_bits: T) -> Option<T> {
        if bits < self.half_bound {
            // Rows run along new_bits, which has diff cells. An odd row drops cell 0.
            if self.diff.is_even() || new_bits != T::ZERO {
                return Some(bits.wrapping_shl(1) | new_bits.low_bit());
            }
        } else if new_bits < self.half_bound {
            // Columns run along bits in [half_bound, diff). An odd column drops its last cell.
            let column_length = self.diff.wrapping_sub(self.half_bound);
            if column_length.is_even() || bits != self.diff.wrapping_sub(T::ONE) {
                return Some(new_bits.wrapping_shl(1) | bits.low_bit());
            }
        }
        None
    }
}

/// Generate an integer in `[0, bound)` for a bound in the hard region.
///
/// # Panics
/// If `bound` is not in [`Region::Hard`].
#[track_caller]
pub fn draw_below<T: UnsignedInt, R: RNG + ?Sized>(bound: T, rng: &mut R) -> T {
    assert!(
        classify(bound) == Region::Hard,
        "paired roads need a bound between half and two thirds of the range, got {bound}"
    );
    let lattice = Lattice::new(bound);
    // In the hard region the threshold is diff, so leftovers are already in [0, diff).
    let mut bits = match lemire::first_draw(bound, rng) {
        FirstDraw::Accepted(value) => return value,
        FirstDraw::Rejected { leftover } => leftover,
    };
    loop {
        let draw = T::draw(rng);
        if draw < bound {
            return draw;
        }
        if let Some(value) = lattice.pair(bits, !draw) {
            if value < bound {
                return value;
            }
        }
        let draw = T::draw(rng);
        if draw < bound {
            return draw;
        }
        bits = !draw;
    }
}
