// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Methods to turn random bits into uniform integers below a bound.
//!
//! [`draw_below`] sorts the bound into one of three regions of the sources
//! range. The bottom half always uses Lemire's multiply and reject method,
//! the top third plain rejection. In between, where Lemire rejects up to half
//! of all draws, the chosen [`Strategy`] decides whether and how the entropy
//! of rejected draws is recycled.

pub mod bit_bank;
pub mod lemire;
pub mod roads;

use crate::{rngs::RNG, strings, uint::UnsignedInt};

/// Position of a bound inside the sources full range `[0, 2**W)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    /// `bound <= 2**(W-1)`
    BottomHalf,
    /// Between one half and two thirds of the range.
    Hard,
    /// `2 * (2**W - bound) < bound`
    TopThird,
}

impl Region {
    pub fn name(self) -> &'static str {
        match self {
            Region::BottomHalf => strings::REGION_NAMES[0],
            Region::Hard => strings::REGION_NAMES[1],
            Region::TopThird => strings::REGION_NAMES[2],
        }
    }
}

/// How bounds in the hard region are handled.
/// Every strategy shares the classifier and the paths for the other regions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// No recycling, Lemire's method everywhere below the top third.
    Lemire,
    /// Pairs the complements of two rejected draws, see [`roads`].
    #[default]
    PairedRoads,
    /// Banks leftover bits across any number of draws, see [`bit_bank`].
    BitBank,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Lemire, Strategy::PairedRoads, Strategy::BitBank];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Lemire => strings::STRATEGY_NAMES[0],
            Strategy::PairedRoads => strings::STRATEGY_NAMES[1],
            Strategy::BitBank => strings::STRATEGY_NAMES[2],
        }
    }
}

#[inline]
#[track_caller]
pub(crate) fn assert_valid_bound<T: UnsignedInt>(bound: T) {
    assert!(bound != T::ZERO, "invalid bound: cannot draw below zero");
}

/// `ceil(bound / 2)`
#[inline]
pub(crate) fn half_bound<T: UnsignedInt>(bound: T) -> T {
    bound.wrapping_shr(1).wrapping_add(bound.low_bit())
}

/// Sort `bound` into its region. Only depends on the bound and its width.
///
/// # Panics
/// If `bound` is zero.
#[track_caller]
pub fn classify<T: UnsignedInt>(bound: T) -> Region {
    assert_valid_bound(bound);
    let half = T::ONE.wrapping_shl(T::BITS - 1);
    if bound <= half {
        return Region::BottomHalf;
    }
    // diff < 2**(W-1) here, doubling it cannot wrap.
    let diff = bound.wrapping_neg();
    if diff.wrapping_shl(1) < bound {
        Region::TopThird
    } else {
        Region::Hard
    }
}

/// Generate an integer in `[0, bound)`, every value with probability exactly `1 / bound`.
/// The number of rng calls is unbounded in theory, every call has a
/// nonzero chance of producing the result.
///
/// # Panics
/// If `bound` is zero, before drawing anything.
#[track_caller]
pub fn draw_below<T: UnsignedInt, R: RNG + ?Sized>(bound: T, strategy: Strategy, rng: &mut R) -> T {
    match classify(bound) {
        Region::BottomHalf => lemire::draw_below(bound, rng),
        Region::TopThird => plain_rejection(bound, rng),
        Region::Hard => match strategy {
            Strategy::Lemire => lemire::draw_below(bound, rng),
            Strategy::PairedRoads => roads::draw_below(bound, rng),
            Strategy::BitBank => bit_bank::draw_below(bound, rng),
        },
    }
}

/// [`draw_below`] with the default strategy.
#[track_caller]
pub fn draw_below_default<T: UnsignedInt, R: RNG + ?Sized>(bound: T, rng: &mut R) -> T {
    draw_below(bound, Strategy::default(), rng)
}

/// Redraw until the draw itself is below `bound`.
/// Only used for the top third, where fewer than one in three draws is rejected.
fn plain_rejection<T: UnsignedInt, R: RNG + ?Sized>(bound: T, rng: &mut R) -> T {
    loop {
        let draw = T::draw(rng);
        if draw < bound {
            return draw;
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::{
        rngs::{
            testgens::{OnlyOne, OnlyZero, Replay},
            Counting, ReferenceRand, Seeded,
        },
        stats,
    };

    #[test]
    fn classify_u8_boundaries() {
        assert_eq!(classify(1u8), Region::BottomHalf);
        assert_eq!(classify(100u8), Region::BottomHalf);
        assert_eq!(classify(128u8), Region::BottomHalf);
        assert_eq!(classify(129u8), Region::Hard);
        assert_eq!(classify(170u8), Region::Hard);
        assert_eq!(classify(171u8), Region::TopThird);
        assert_eq!(classify(255u8), Region::TopThird);
    }

    #[test]
    fn classify_wide_boundaries() {
        assert_eq!(classify(1u64 << 63), Region::BottomHalf);
        assert_eq!(classify((1u64 << 63) + 1), Region::Hard);
        assert_eq!(classify(0xaaaa_aaaa_aaaa_aaaau64), Region::Hard);
        assert_eq!(classify(0xaaaa_aaaa_aaaa_aaabu64), Region::TopThird);
        assert_eq!(classify(u128::MAX), Region::TopThird);
        assert_eq!(classify((1u128 << 127) + 5), Region::Hard);
    }

    #[test]
    fn hard_region_is_between_half_and_two_thirds() {
        for bound in 1..=u16::MAX {
            let region = classify(bound);
            let expected = if bound <= 1 << 15 {
                Region::BottomHalf
            } else if 3 * (bound as u32) > 2 << 16 {
                Region::TopThird
            } else {
                Region::Hard
            };
            assert_eq!(region, expected, "bound {bound}");
        }
    }

    #[quickcheck]
    fn u64_regions_match_wide_arithmetic(bound: u64) -> bool {
        if bound == 0 {
            return true;
        }
        let range = 1u128 << 64;
        let expected = if 2 * bound as u128 <= range {
            Region::BottomHalf
        } else if 3 * bound as u128 > 2 * range {
            Region::TopThird
        } else {
            Region::Hard
        };
        classify(bound) == expected
    }

    #[test]
    fn half_bound_rounds_up() {
        assert_eq!(half_bound(170u8), 85);
        assert_eq!(half_bound(171u8), 86);
        assert_eq!(half_bound(255u8), 128);
        assert_eq!(half_bound(1u8), 1);
        assert_eq!(half_bound(u128::MAX), 1 << 127);
    }

    #[test]
    fn strategy_names_are_distinct() {
        assert_eq!(Strategy::default(), Strategy::PairedRoads);
        assert_ne!(Strategy::Lemire.name(), Strategy::PairedRoads.name());
        assert_ne!(Strategy::PairedRoads.name(), Strategy::BitBank.name());
        assert_ne!(Region::Hard.name(), Region::TopThird.name());
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_u8() {
        draw_below_default(0u8, &mut Replay::new(&[]));
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_u16() {
        draw_below(0u16, Strategy::BitBank, &mut Replay::new(&[]));
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_u32() {
        draw_below(0u32, Strategy::Lemire, &mut Replay::new(&[]));
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_u64() {
        draw_below_default(0u64, &mut Replay::new(&[]));
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_u128() {
        draw_below_default(0u128, &mut Replay::new(&[]));
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_usize() {
        draw_below_default(0usize, &mut Replay::new(&[]));
    }

    #[test]
    #[should_panic(expected = "invalid bound")]
    fn zero_bound_classify() {
        classify(0u32);
    }

    #[test]
    fn bound_one_is_always_zero() {
        let mut rng = ReferenceRand::new(3);
        for strategy in Strategy::ALL {
            for _ in 0..100 {
                assert_eq!(draw_below(1u8, strategy, &mut rng), 0);
                assert_eq!(draw_below(1u128, strategy, &mut rng), 0);
            }
        }
    }

    #[test]
    fn power_of_two_takes_exactly_one_call() {
        let mut rng = Counting::new(ReferenceRand::new(11));
        for shift in 0..64 {
            for strategy in Strategy::ALL {
                let value = draw_below(1u64 << shift, strategy, &mut rng);
                assert!(value < 1u64 << shift);
                assert_eq!(rng.take_calls(), 1, "bound 2**{shift}");
            }
        }
        // A u128 draw is made of two u64 calls.
        for shift in [0, 64, 100, 127] {
            for strategy in Strategy::ALL {
                let value = draw_below(1u128 << shift, strategy, &mut rng);
                assert!(value < 1u128 << shift);
                assert_eq!(rng.take_calls(), 2, "bound 2**{shift}");
            }
        }
    }

    #[test]
    fn power_of_two_is_the_top_bits() {
        assert_eq!(draw_below_default(16u8, &mut OnlyOne {}), 15);
        assert_eq!(draw_below_default(1u32 << 31, &mut OnlyOne {}), (1 << 31) - 1);
        assert_eq!(draw_below_default(64u64, &mut OnlyZero {}), 0);
        let mut rng = Replay::new(&[0xa0]);
        assert_eq!(draw_below_default(4u8, &mut rng), 2);
    }

    #[test]
    fn top_third_returns_first_draw_below_bound() {
        let mut rng = Replay::new(&[254, 253, 200]);
        assert_eq!(draw_below_default(251u8, &mut rng), 200);
        assert_eq!(rng.consumed(), 3);
    }

    #[quickcheck]
    fn u64_outputs_stay_below_bound(bound: u64, seed: u64) -> bool {
        if bound == 0 {
            return true;
        }
        let mut rng = ReferenceRand::new(seed);
        Strategy::ALL
            .iter()
            .all(|&strategy| (0..32).all(|_| draw_below(bound, strategy, &mut rng) < bound))
    }

    #[quickcheck]
    fn u128_outputs_stay_below_bound(bound: u128, seed: u64) -> bool {
        if bound == 0 {
            return true;
        }
        let mut rng = ReferenceRand::new(seed);
        Strategy::ALL
            .iter()
            .all(|&strategy| (0..8).all(|_| draw_below(bound, strategy, &mut rng) < bound))
    }

    #[test]
    fn every_u8_bound_is_uniform() {
        let mut rng = ReferenceRand::new(0x5eed);
        for bound in 1..=u8::MAX {
            for strategy in Strategy::ALL {
                let (chi_squared, p) = stats::bounded_distribution_test(
                    &mut rng,
                    bound,
                    strategy,
                    bound as usize * 64,
                    stats::MAX_BUCKETS,
                );
                assert!(
                    p > 1e-6,
                    "bound {bound}, {}: chi2 {chi_squared}, p {p}",
                    strategy.name()
                );
            }
        }
    }

    #[test]
    fn wide_bounds_are_uniform() {
        let mut rng = ReferenceRand::new(0xb0b);
        let bounds: [u64; 6] = [
            1_000_003,
            (1 << 63) + 1,
            (1 << 63) + (1 << 61) + 12345,
            0xaaaa_aaaa_aaaa_aaaa,
            0xaaaa_aaaa_aaaa_aaab,
            u64::MAX - 58,
        ];
        for bound in bounds {
            for strategy in Strategy::ALL {
                let (chi_squared, p) =
                    stats::bounded_distribution_test(&mut rng, bound, strategy, 1 << 16, 256);
                assert!(
                    p > 1e-6,
                    "bound {bound}, {}: chi2 {chi_squared}, p {p}",
                    strategy.name()
                );
            }
        }
    }
}
