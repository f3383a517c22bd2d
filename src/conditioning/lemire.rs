// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Lemire's nearly divisionless method.
//! Multiplying a draw by the bound spreads `[0, 2**W)` over `bound` equally
//! sized intervals, the high half of the product names the interval and the
//! low half tells whether the draw fell into one of the `2**W mod bound`
//! surplus positions that would bias the result.
//! See: https://arxiv.org/abs/1805.10941

use super::assert_valid_bound;
use crate::{rngs::RNG, uint::UnsignedInt};

/// Outcome of a single multiply and compare step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FirstDraw<T> {
    /// Uniform in `[0, bound)`.
    Accepted(T),
    /// The draw was rejected. `leftover` is uniform in `[0, threshold(bound))`.
    Rejected { leftover: T },
}

/// Rejection threshold for the low half of the product, `2**W mod bound`.
#[inline]
pub fn threshold<T: UnsignedInt>(bound: T) -> T {
    bound.wrapping_neg() % bound
}

/// Draw until the low half of the product reaches the threshold.
/// The threshold needs a division, it is only computed once the cheap
/// `low >= bound` check fails.
#[track_caller]
pub fn draw_below<T: UnsignedInt, R: RNG + ?Sized>(bound: T, rng: &mut R) -> T {
    assert_valid_bound(bound);
    let (mut high, mut low) = T::draw(rng).wide_mul(bound);
    if low < bound {
        let threshold = threshold(bound);
        while low < threshold {
            (high, low) = T::draw(rng).wide_mul(bound);
        }
    }
    high
}

/// One step of [`draw_below`] that keeps the entropy of a rejected draw.
///
/// A rejected low half is uniform over the multiples of `2**k` below the
/// threshold, `k` being the number of trailing zeros of `bound`. Draws that
/// only differ in their top `k` bits share the same low half, so those bits
/// are still unused and fill the zeros back in.
#[track_caller]
pub fn first_draw<T: UnsignedInt, R: RNG + ?Sized>(bound: T, rng: &mut R) -> FirstDraw<T> {
    assert_valid_bound(bound);
    let draw = T::draw(rng);
    let (high, low) = draw.wide_mul(bound);
    if low >= bound || low >= threshold(bound) {
        return FirstDraw::Accepted(high);
    }
    let unused_high_bits = draw.shr_or_zero(T::BITS - bound.trailing_zeros());
    FirstDraw::Rejected {
        leftover: low | unused_high_bits,
    }
}
