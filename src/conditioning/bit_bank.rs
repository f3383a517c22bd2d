// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Bit bank recycling, works for any bound.
//!
//! The bank holds `bits`, uniform in `[0, bit_bound)` with `bit_bound < bound`.
//! Appending fresh random bits widens the range until one more bit could
//! reach `bound`. That last bit decides: a result below `bound` is returned,
//! anything else is again uniform in a smaller range and stays in the bank.
//! Fresh bits are taken from the newest draw a few at a time, so a single
//! draw can settle several rounds.

use super::{
    assert_valid_bound, half_bound,
    lemire::{self, FirstDraw},
};
use crate::{rngs::RNG, uint::UnsignedInt};

/// Per call state.
#[derive(Debug, Clone)]
struct BitBank<T> {
    /// Uniform in `[0, bit_bound)`.
    bits: T,
    bit_bound: T,
    /// Fresh bits the current round needs, decision bit included.
    bits_needed: u32,
    /// Unused bits of the newest draw, in the lowest `bits_available` bits.
    pool: T,
    bits_available: u32,
}

impl<T: UnsignedInt> BitBank<T> {
    fn new(bits: T, bit_bound: T) -> Self {
        debug_assert!(bits < bit_bound);
        BitBank {
            bits,
            bit_bound,
            bits_needed: 0,
            pool: T::ZERO,
            bits_available: 0,
        }
    }

    /// Take `count <= W` fresh uniform bits, drawing when the pool runs dry.
    fn take_fresh<R: RNG + ?Sized>(&mut self, count: u32, rng: &mut R) -> T {
        if count <= self.bits_available {
            let fresh = self.pool & T::low_mask(count);
            self.pool = self.pool.shr_or_zero(count);
            self.bits_available -= count;
            return fresh;
        }
        let head = self.pool;
        let head_len = self.bits_available;
        let rest = count - head_len;
        let draw = T::draw(rng);
        self.pool = draw.shr_or_zero(rest);
        self.bits_available = T::BITS - rest;
        head | (draw & T::low_mask(rest)).wrapping_shl(head_len)
    }

    /// Smallest `s` with `bit_bound << s >= half_bound`, plus the decision bit.
    fn calculate_bits_needed(&mut self, half_bound: T) {
        let mut shift = self
            .bit_bound
            .leading_zeros()
            .saturating_sub(half_bound.leading_zeros());
        if self.bit_bound.wrapping_shl(shift) < half_bound {
            shift += 1;
        }
        self.bits_needed = shift + 1;
    }

    /// Append `count < W` fresh bits below the banked ones.
    fn consume_bits<R: RNG + ?Sized>(&mut self, count: u32, rng: &mut R) {
        if count == 0 {
            return;
        }
        let fresh = self.take_fresh(count, rng);
        self.bits = self.bits.wrapping_shl(count) | fresh;
        self.bit_bound = self.bit_bound.wrapping_shl(count);
    }

    /// Spend the decision bit. `bit_bound` must be at least `half_bound`.
    fn decide<R: RNG + ?Sized>(&mut self, bound: T, half_bound: T, rng: &mut R) -> Option<T> {
        let bit = self.take_fresh(1, rng);
        if self.bits < half_bound {
            let candidate = self.bits.wrapping_shl(1) | bit;
            if candidate < bound {
                return Some(candidate);
            }
        }
        self.decrease_bounds(bound, bit);
        None
    }

    /// Keep the part of `[0, 2 * bit_bound)` at or above `bound`, shifted down to zero.
    /// The doubled values may exceed W bits, the differences never do.
    fn decrease_bounds(&mut self, bound: T, bit: T) {
        self.bits = self
            .bits
            .wrapping_shl(1)
            .wrapping_add(bit)
            .wrapping_sub(bound);
        self.bit_bound = self.bit_bound.wrapping_shl(1).wrapping_sub(bound);
    }
}

/// Generate an integer in `[0, bound)`, recycling every rejected draw
/// through the bank.
///
/// # Panics
/// If `bound` is zero.
#[track_caller]
pub fn draw_below<T: UnsignedInt, R: RNG + ?Sized>(bound: T, rng: &mut R) -> T {
    assert_valid_bound(bound);
    let leftover = match lemire::first_draw(bound, rng) {
        FirstDraw::Accepted(value) => return value,
        FirstDraw::Rejected { leftover } => leftover,
    };
    let half_bound = half_bound(bound);
    let mut bank = BitBank::new(leftover, lemire::threshold(bound));
    loop {
        bank.calculate_bits_needed(half_bound);
        bank.consume_bits(bank.bits_needed - 1, rng);
        if let Some(value) = bank.decide(bound, half_bound, rng) {
            return value;
        }
    }
}
