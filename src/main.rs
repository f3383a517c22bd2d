// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Compares the bounded draw strategies over a fixed set of bounds.

use bitrecycle::{
    rngs::{
        lcg::{Lehmer64, Mmix},
        xorshift::XORShift128,
        ReferenceRand, Seeded,
    },
    suite::{test_suite, SuiteConfig},
    utils::{self, ResultLogger},
};

/// Powers of two, primes and both edges of the hard region (129..=170).
const BOUNDS_U8: [u8; 10] = [2, 3, 64, 128, 129, 150, 170, 171, 251, 255];
const BOUNDS_U32: [u32; 7] = [
    1 << 20,
    1_000_003,
    (1 << 31) + 1,
    0x9999_9999,
    0xaaaa_aaaa,
    0xaaaa_aaab,
    4_294_967_291,
];
const BOUNDS_U64: [u64; 5] = [
    (1 << 63) + 1,
    0xa000_0000_0000_0000,
    0xaaaa_aaaa_aaaa_aaaa,
    0xaaaa_aaaa_aaaa_aaab,
    18_446_744_073_709_551_557,
];

fn main() {
    let start = std::time::Instant::now();
    const TEST_SIZE_EXPONENT: usize = 18;
    let config = SuiteConfig {
        sample_size: 1 << TEST_SIZE_EXPONENT,
        ..SuiteConfig::default()
    };
    match ResultLogger::new(&config.result_file, log::LevelFilter::Info) {
        Ok(logger) => {
            if logger.install().is_err() {
                eprintln!("Could not set logger.");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Could not open {}: {}", config.result_file, e);
            std::process::exit(1);
        }
    }

    let mut r = ReferenceRand::new(0);
    test_suite(&mut r, &BOUNDS_U8, &config, "Reference");
    test_suite(&mut r, &BOUNDS_U32, &config, "Reference");
    test_suite(&mut r, &BOUNDS_U64, &config, "Reference");
    let mut r = Lehmer64::new(0);
    test_suite(&mut r, &BOUNDS_U64, &config, "Lehmer64");
    let mut r = Mmix::new(0);
    test_suite(&mut r, &BOUNDS_U8, &config, "MMIX");
    let mut r = XORShift128::new(0);
    test_suite(&mut r, &BOUNDS_U32, &config, "XORShift128");
    log::info!(
        "Full program runtime: {}",
        utils::format_elapsed_time(start.elapsed())
    );
}
