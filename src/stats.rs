// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Collection of methods for statistical analysis of bounded draws.

use crate::{
    conditioning::{self, lemire, Strategy},
    rngs::{Counting, RNG},
    uint::UnsignedInt,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Default upper limit for the number of histogram buckets.
pub const MAX_BUCKETS: usize = 1 << 12;

/// Get p value for given degrees of freedom and chi squared value.
fn chi_squared_p_value(df: u32, chi_squared: f64) -> f64 {
    let chi_squared_dist = ChiSquared::new(df as f64).unwrap();
    chi_squared_dist.cdf(chi_squared)
}

/// Histogram layout for values in `[0, bound)`.
/// Values are grouped by their bits above `shift`, giving `count` buckets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub shift: u32,
    pub count: usize,
    /// Number of values that fall into the last bucket.
    last_size: u128,
}

impl Buckets {
    pub fn new<T: UnsignedInt>(bound: T, max_buckets: usize) -> Self {
        assert!(max_buckets > 0);
        let last = bound.wrapping_sub(T::ONE).to_u128();
        let mut shift = 0;
        while (last >> shift) >= max_buckets as u128 {
            shift += 1;
        }
        let top = last >> shift;
        Buckets {
            shift,
            count: top as usize + 1,
            last_size: last - (top << shift) + 1,
        }
    }

    pub fn index<T: UnsignedInt>(&self, value: T) -> usize {
        (value.to_u128() >> self.shift) as usize
    }

    /// Number of values in `[0, bound)` that land in bucket `index`.
    pub fn size(&self, index: usize) -> f64 {
        if index + 1 == self.count {
            self.last_size as f64
        } else {
            (1u128 << self.shift) as f64
        }
    }
}

/// Chi squared statistic and p value of `counts` against the uniform
/// distribution over `[0, bound)`.
/// p is the probability of a deviation at least this large, small values are suspicious.
pub fn uniformity_chi_squared<T: UnsignedInt>(counts: &[usize], bound: T, buckets: &Buckets) -> (f64, f64) {
    assert_eq!(counts.len(), buckets.count);
    if buckets.count < 2 {
        return (0.0, 1.0);
    }
    let total: usize = counts.iter().sum();
    let bound = bound.to_f64();
    let mut chi_squared: f64 = 0.0;
    for (index, &value) in counts.iter().enumerate() {
        let expected = total as f64 * buckets.size(index) / bound;
        chi_squared += (value as f64 - expected).powi(2) / expected;
    }
    let p = 1.0 - chi_squared_p_value(buckets.count as u32 - 1, chi_squared);
    (chi_squared, p)
}

/// Take 'sample_size' values from `sample` and measure how evenly they
/// spread over `[0, bound)`, using at most `max_buckets` buckets.
/// Returns chi2 statistic, p value
pub fn histogram_test<T: UnsignedInt>(
    bound: T,
    sample_size: usize,
    max_buckets: usize,
    mut sample: impl FnMut() -> T,
) -> (f64, f64) {
    assert!(sample_size > 0);
    let buckets = Buckets::new(bound, max_buckets);
    let mut counts = vec![0usize; buckets.count];
    for _ in 0..sample_size {
        let value = sample();
        assert!(value < bound, "sampled {value} for bound {bound}");
        counts[buckets.index(value)] += 1;
    }
    uniformity_chi_squared(&counts, bound, &buckets)
}

/// Generate 'sample size' draws below `bound` with the supplied rng and strategy.
/// Returns chi2 statistic, p value
pub fn bounded_distribution_test<T: UnsignedInt, R: RNG + ?Sized>(
    test_rng: &mut R,
    bound: T,
    strategy: Strategy,
    sample_size: usize,
    max_buckets: usize,
) -> (f64, f64) {
    histogram_test(bound, sample_size, max_buckets, || {
        conditioning::draw_below(bound, strategy, &mut *test_rng)
    })
}

/// Rng calls that make up one draw of width `T`.
/// Widths up to 64 bits take a single call, wider ones one `next` per 64 bits.
pub fn calls_per_full_draw<T: UnsignedInt>() -> u32 {
    T::BITS.div_ceil(64)
}

/// Average number of full width draws per output below `bound`.
/// Measured in the same unit as [`lemire_expected_calls`].
pub fn mean_calls_per_draw<T: UnsignedInt, R: RNG + ?Sized>(
    test_rng: &mut R,
    bound: T,
    strategy: Strategy,
    sample_size: usize,
) -> f64 {
    assert!(sample_size > 0);
    let mut counting = Counting::new(test_rng);
    for _ in 0..sample_size {
        let _ = conditioning::draw_below(bound, strategy, &mut counting);
    }
    let full_draws = counting.calls() as f64 / calls_per_full_draw::<T>() as f64;
    full_draws / sample_size as f64
}

/// Expected rng calls per output for Lemire's method without recycling.
/// Each draw is kept with probability `1 - threshold / 2**W`.
/// Plain rejection in the top third has the same cost, `2**W / bound`.
pub fn lemire_expected_calls<T: UnsignedInt>(bound: T) -> f64 {
    let range = 2f64.powi(T::BITS as i32);
    range / (range - lemire::threshold(bound).to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rngs::{testgens::Replay, ReferenceRand, Seeded};

    #[test]
    fn buckets_for_small_bounds_are_single_values() {
        let buckets = Buckets::new(200u8, MAX_BUCKETS);
        assert_eq!(buckets.shift, 0);
        assert_eq!(buckets.count, 200);
        assert_eq!(buckets.size(0), 1.0);
        assert_eq!(buckets.size(199), 1.0);
        assert_eq!(buckets.index(199u8), 199);
    }

    #[test]
    fn buckets_group_high_bits() {
        // 1000 values in buckets of 16: 62 full ones and 8 values in the last.
        let buckets = Buckets::new(1000u32, 64);
        assert_eq!(buckets.shift, 4);
        assert_eq!(buckets.count, 63);
        assert_eq!(buckets.size(0), 16.0);
        assert_eq!(buckets.size(62), 8.0);
        assert_eq!(buckets.index(999u32), 62);
    }

    #[test]
    fn buckets_cover_full_u128() {
        let buckets = Buckets::new(u128::MAX, 256);
        assert_eq!(buckets.shift, 120);
        assert_eq!(buckets.count, 256);
        assert_eq!(buckets.index(u128::MAX - 1), 255);
        assert_eq!(buckets.size(255), ((1u128 << 120) - 1) as f64);
    }

    #[test]
    fn perfect_histogram_has_zero_statistic() {
        let buckets = Buckets::new(4u8, MAX_BUCKETS);
        let (chi_squared, p) = uniformity_chi_squared(&[10, 10, 10, 10], 4u8, &buckets);
        assert_eq!(chi_squared, 0.0);
        assert!((p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn biased_histogram_is_rejected() {
        let mut counter = 0u8;
        let (_, p) = histogram_test(3u8, 30_000, MAX_BUCKETS, || {
            // Modulo reduction of a value in [0, 4): 0 shows up twice as often.
            counter = (counter + 1) % 4;
            counter % 3
        });
        assert!(p < 1e-6);
    }

    #[test]
    fn single_bucket_is_trivially_uniform() {
        let (chi_squared, p) = histogram_test(1u64, 100, MAX_BUCKETS, || 0);
        assert_eq!((chi_squared, p), (0.0, 1.0));
    }

    #[test]
    fn mean_calls_of_a_power_of_two_is_one() {
        let mut rng = ReferenceRand::new(0);
        assert_eq!(
            mean_calls_per_draw(&mut rng, 1u32 << 20, Strategy::default(), 1000),
            1.0
        );
    }

    #[test]
    fn mean_calls_of_a_u128_power_of_two_is_one() {
        let mut rng = ReferenceRand::new(0);
        for strategy in Strategy::ALL {
            assert_eq!(
                mean_calls_per_draw(&mut rng, 1u128 << 100, strategy, 1000),
                1.0
            );
        }
        assert_eq!(calls_per_full_draw::<u128>(), 2);
        assert_eq!(calls_per_full_draw::<u64>(), 1);
        assert_eq!(calls_per_full_draw::<u8>(), 1);
    }

    #[test]
    fn mean_calls_counts_rejections() {
        // Top third of u8: 255 and 254 are rejected for 251, 7 is kept.
        let mut rng = Replay::new(&[255, 254, 7, 3]);
        assert_eq!(mean_calls_per_draw(&mut rng, 251u8, Strategy::Lemire, 2), 2.0);
    }

    #[test]
    fn lemire_expectations() {
        assert_eq!(lemire_expected_calls(64u8), 1.0);
        assert!((lemire_expected_calls(170u8) - 256.0 / 170.0).abs() < 1e-12);
        assert!((lemire_expected_calls((1u64 << 63) + 1) - 2.0).abs() < 1e-9);
        assert!((lemire_expected_calls(100u8) - 256.0 / 200.0).abs() < 1e-12);
    }
}
