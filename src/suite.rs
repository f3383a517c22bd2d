// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Comparison of the draw strategies: uniformity and entropy cost of bounded draws.

use std::{ops::Mul, time::Duration, time::Instant};

use crate::{
    conditioning::{self, Region, Strategy},
    rngs::Seeded,
    stats, strings,
    uint::UnsignedInt,
    utils,
};

const P_LOG_STAT_LIMIT: f64 = 3.0;
const P_LOG_STAT_MARGINAL: f64 = 2.0;

pub const STATIC_TEST_SEEDS: [u64; 8] = [
    0x0000000000000000,
    0x0123456789abcdef,
    0xdeadbeefcafebabe,
    0xffffffffffffffff,
    0x5555555555555555,
    0x9e3779b97f4a7c15,
    0x0000000100000001,
    0x8000000000000000,
];

/// Settings for one run of the suite.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Draws per bound, strategy and seed.
    pub sample_size: usize,
    pub seeds: Vec<u64>,
    /// Upper limit for histogram buckets, wide bounds are grouped by their high bits.
    pub max_buckets: usize,
    pub strategies: Vec<Strategy>,
    /// File the result logger appends to.
    pub result_file: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            sample_size: 1 << 18,
            seeds: STATIC_TEST_SEEDS[0..4].to_vec(),
            max_buckets: stats::MAX_BUCKETS,
            strategies: Strategy::ALL.to_vec(),
            result_file: "rslt.txt".to_owned(),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestResult {
    pub bound: u128,
    pub width: u32,
    pub region: Region,
    pub strategy: Strategy,
    pub seed: u64,
    pub p: f64,
    pub mean_calls: f64,
    pub lemire_calls: f64,
    pub time_used: Duration,
}

impl TestResult {
    pub fn logstat(&self) -> f64 {
        p_log_stat(self.p)
    }
    pub fn passed(&self) -> bool {
        self.logstat() < P_LOG_STAT_LIMIT
    }
    fn verdict(&self) -> &'static str {
        if !self.passed() {
            strings::FAIL_STR
        } else if self.logstat() >= P_LOG_STAT_MARGINAL {
            strings::MARGINAL_STR
        } else {
            strings::PASS_STR
        }
    }
    /// Calls per output relative to Lemire's method, in percent.
    pub fn relative_cost(&self) -> f64 {
        self.mean_calls / self.lemire_calls * 100.0
    }
    pub fn format(&self) -> String {
        format!(
            "{:<11}: Time: {:>11}     p: {:.6}     pls: {:.4}     calls: {:.4} ({:6.2}%)   - {}",
            self.strategy.name(),
            utils::format_elapsed_time(self.time_used),
            self.p,
            self.logstat(),
            self.mean_calls,
            self.relative_cost(),
            self.verdict()
        )
    }
}

/// Logarithmic quantity to specify how close to 1.0 or 0.0 a p-value is.
/// Has a range of 0-9.9999.
/// -0.2 * (log2(min(p, 1-p)) - 1) clamped to 9.9999
pub fn p_log_stat(p: f64) -> f64 {
    (p.min(1.0 - p).log2() - 1.0).mul(-0.2).clamp(0.0, 9.9999)
}

/// Measure uniformity and cost of one strategy for one bound and seed.
fn run_single_test<T: UnsignedInt, R: Seeded>(
    test_rng: &mut R,
    bound: T,
    strategy: Strategy,
    seed: u64,
    config: &SuiteConfig,
) -> TestResult {
    let start: Instant = Instant::now();
    test_rng.reseed(seed);
    let (_, p) = stats::bounded_distribution_test(
        test_rng,
        bound,
        strategy,
        config.sample_size,
        config.max_buckets,
    );
    let mean_calls = stats::mean_calls_per_draw(test_rng, bound, strategy, config.sample_size);
    TestResult {
        bound: bound.to_u128(),
        width: T::BITS,
        region: conditioning::classify(bound),
        strategy,
        seed,
        p,
        mean_calls,
        lemire_calls: stats::lemire_expected_calls(bound),
        time_used: start.elapsed(),
    }
}

/// Run every configured strategy and seed for `bound` and add the results to `test_results`.
fn test_single_bound<T: UnsignedInt, R: Seeded>(
    test_rng: &mut R,
    bound: T,
    config: &SuiteConfig,
    test_results: &mut Vec<TestResult>,
) {
    log::info!(
        "Bound {} ({:#x}, u{}, {}), Lemire expects {:.4} calls",
        bound,
        bound,
        T::BITS,
        conditioning::classify(bound).name(),
        stats::lemire_expected_calls(bound)
    );
    for &seed in config.seeds.iter() {
        log::debug!("Testing for seed: {:#018x}", seed);
        for &strategy in config.strategies.iter() {
            let rslt = run_single_test(test_rng, bound, strategy, seed, config);
            log::info!("{}", rslt.format());
            test_results.push(rslt);
        }
    }
}

/// Format a slice of `TestResults` and summarize pass rate and cost per strategy.
pub fn format_test_results_summary(test_results: &[TestResult]) -> String {
    const P_LOG_STAT_BINS: usize = 10;
    let mut p_logstat_bins = [0u32; P_LOG_STAT_BINS];
    let mut passed_tests = 0usize;
    for rslt in test_results {
        p_logstat_bins[rslt.logstat().floor() as usize] += 1;
        if rslt.passed() {
            passed_tests += 1;
        }
    }
    let logstat_summary: String = p_logstat_bins
        .iter()
        .enumerate()
        .map(|(bin, &value)| {
            if bin == P_LOG_STAT_BINS - 1 {
                format!("{:>2}+ : {:04}", bin, value) // Handle last bin with '+'
            } else {
                format!("{:>2} : {:04}|", bin, value)
            }
        })
        .collect::<Vec<String>>()
        .join("");
    let cost_summary: String = Strategy::ALL
        .iter()
        .filter_map(|&strategy| {
            let costs: Vec<f64> = test_results
                .iter()
                .filter(|rslt| rslt.strategy == strategy)
                .map(|rslt| rslt.relative_cost())
                .collect();
            if costs.is_empty() {
                return None;
            }
            Some(format!(
                "{:<11}: {:.2}% of Lemire's calls on average",
                strategy.name(),
                costs.iter().sum::<f64>() / costs.len() as f64
            ))
        })
        .collect::<Vec<String>>()
        .join("\n");
    format!(
        "P log stats: \n{}\n{}\nOverall result: {}          ( {} / {} passed)",
        logstat_summary,
        cost_summary,
        if passed_tests == test_results.len() {
            strings::PASS_STR
        } else {
            strings::FAIL_STR
        },
        passed_tests,
        test_results.len()
    )
}

/// Compare all configured strategies over `bounds`, drawing from `test_rng`.
/// Results are logged as they come in and returned for further inspection.
pub fn test_suite<T: UnsignedInt, R: Seeded>(
    test_rng: &mut R,
    bounds: &[T],
    config: &SuiteConfig,
    rng_name: &str,
) -> Vec<TestResult> {
    let full_start = Instant::now();
    log::info!(
        "Testing: u{} draws from {} ({} per test)",
        T::BITS,
        rng_name,
        utils::format_count(config.sample_size)
    );
    let mut test_results: Vec<TestResult> = vec![];
    for &bound in bounds {
        test_single_bound(test_rng, bound, config, &mut test_results);
    }
    log::info!("Summary for: u{} draws from {}", T::BITS, rng_name);
    log::info!("{}", format_test_results_summary(&test_results));
    log::info!(
        "Total runtime: {}",
        utils::format_elapsed_time(full_start.elapsed())
    );
    test_results
}
