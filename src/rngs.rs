// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Entropy sources consumed by the bounded draws.
//! All implement the RNG interface, the seedable generators also implement
//! Seeded so the comparison suite can replay a run.

use rand::{RngCore, SeedableRng};

/// Source of uniformly distributed bits.
/// Only ever asked for the next value, how it is seeded or shared is up to
/// the implementation.
pub trait RNG {
    /// Generate u32 and advance the state one step.
    fn next_u32(&mut self) -> u32;
    /// Generate u64 and advance the state one step.
    /// For generators that dont support full u64 might advance
    /// state more than one step.
    fn next(&mut self) -> u64;
}

/// Generators that can be built from a seed and reset to it.
pub trait Seeded: RNG + Sized {
    /// Initialize with specified seed.
    fn new(seed: u64) -> Self;
    /// Reset to inital state, equivalent to replacing with ::new(seed).
    fn reseed(&mut self, seed: u64);
}

impl<R: RNG + ?Sized> RNG for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next(&mut self) -> u64 {
        (**self).next()
    }
}

/// The rand crates standard RNG, used as the trusted source in tests.
pub struct ReferenceRand {
    rng: rand::rngs::StdRng,
}

impl RNG for ReferenceRand {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl Seeded for ReferenceRand {
    fn new(seed: u64) -> Self {
        ReferenceRand {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = rand::rngs::StdRng::seed_from_u64(seed);
    }
}

/// Wraps a source and counts how often it is called.
/// A u128 draw calls `next` twice and is counted twice.
#[derive(Debug, Clone)]
pub struct Counting<R> {
    inner: R,
    calls: u64,
}

impl<R: RNG> Counting<R> {
    pub fn new(inner: R) -> Self {
        Counting { inner, calls: 0 }
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Return the number of calls so far and start counting from zero.
    pub fn take_calls(&mut self) -> u64 {
        std::mem::take(&mut self.calls)
    }
}

impl<R: RNG> RNG for Counting<R> {
    fn next_u32(&mut self) -> u32 {
        self.calls += 1;
        self.inner.next_u32()
    }

    fn next(&mut self) -> u64 {
        self.calls += 1;
        self.inner.next()
    }
}

// Linear congruential generators
pub mod lcg {
    use super::{Seeded, RNG};

    /// Originaly designed by Donald Knuth
    #[derive(Debug, Copy, Clone)]
    pub struct Mmix {
        state: u64,
    }

    impl RNG for Mmix {
        fn next_u32(&mut self) -> u32 {
            (self.next() >> 32) as u32
        }

        fn next(&mut self) -> u64 {
            self.state = self.state.wrapping_mul(0x5851f42d4c957f2d);
            self.state = self.state.wrapping_add(0x14057b7ef767814f);
            self.state
        }
    }

    impl Seeded for Mmix {
        fn new(seed: u64) -> Self {
            Mmix { state: seed }
        }

        fn reseed(&mut self, seed: u64) {
            self.state = seed;
        }
    }

    #[derive(Debug, Copy, Clone)]
    pub struct Lehmer64 {
        state: u128,
    }

    impl Lehmer64 {
        /// The multiplier only cycles through odd states.
        fn initial_state(seed: u64) -> u128 {
            (seed as u128) << 64 | seed as u128 | 1
        }
    }

    impl RNG for Lehmer64 {
        fn next_u32(&mut self) -> u32 {
            (self.next() >> 32) as u32
        }

        fn next(&mut self) -> u64 {
            self.state = self.state.wrapping_mul(0xda942042e4dd58b5);
            (self.state >> 64) as u64
        }
    }

    impl Seeded for Lehmer64 {
        fn new(seed: u64) -> Self {
            Lehmer64 {
                state: Self::initial_state(seed),
            }
        }

        fn reseed(&mut self, seed: u64) {
            self.state = Self::initial_state(seed);
        }
    }
}

// Xorshift PRNGs
pub mod xorshift {
    use super::{Seeded, RNG};

    #[derive(Debug, Copy, Clone)]
    pub struct XORShift128 {
        state: [u32; 4],
    }

    impl XORShift128 {
        /// An all zero state is a fixed point, so the last word is never zero.
        fn initial_state(seed: u64) -> [u32; 4] {
            [
                seed as u32,
                (seed >> 32) as u32,
                !(seed as u32),
                ((seed >> 32) as u32) | 1,
            ]
        }
    }

    impl RNG for XORShift128 {
        fn next_u32(&mut self) -> u32 {
            let mut t: u32 = self.state[3];
            let s: u32 = self.state[0];
            self.state[3] = self.state[2];
            self.state[2] = self.state[1];
            self.state[1] = s;
            t ^= t << 11;
            t ^= t >> 8;
            self.state[0] = t ^ s ^ (s >> 19);
            self.state[0]
        }

        fn next(&mut self) -> u64 {
            let a: u64 = self.next_u32() as u64;
            let b: u64 = self.next_u32() as u64;
            (a << 32) | b
        }
    }

    impl Seeded for XORShift128 {
        fn new(seed: u64) -> Self {
            XORShift128 {
                state: Self::initial_state(seed),
            }
        }

        fn reseed(&mut self, seed: u64) {
            self.state = Self::initial_state(seed);
        }
    }
}

/// Degenerate and scripted sources for pinning down exact code paths.
pub mod testgens {
    use super::RNG;

    pub struct OnlyOne {}
    impl RNG for OnlyOne {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next(&mut self) -> u64 {
            u64::MAX
        }
    }

    pub struct OnlyZero {}
    impl RNG for OnlyZero {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next(&mut self) -> u64 {
            0
        }
    }

    /// Hands out a fixed list of values, in order.
    /// `next_u32` truncates the value. Panics once the list is used up.
    #[derive(Debug, Clone)]
    pub struct Replay {
        values: Vec<u64>,
        position: usize,
    }

    impl Replay {
        pub fn new(values: &[u64]) -> Self {
            Replay {
                values: values.to_vec(),
                position: 0,
            }
        }

        /// Number of values handed out so far.
        pub fn consumed(&self) -> usize {
            self.position
        }

        pub fn remaining(&self) -> usize {
            self.values.len() - self.position
        }
    }

    impl RNG for Replay {
        fn next_u32(&mut self) -> u32 {
            self.next() as u32
        }

        fn next(&mut self) -> u64 {
            let Some(&value) = self.values.get(self.position) else {
                panic!("replay source exhausted after {} values", self.position);
            };
            self.position += 1;
            value
        }
    }
}
