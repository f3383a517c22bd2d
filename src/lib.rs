// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Uniform random integers below a bound, recycling the entropy of rejected
//! draws. Includes a few PRNGs and methods for statistical analysis of the
//! results.

pub mod conditioning;
pub mod rngs;
pub mod stats;
mod strings;
pub mod suite;
pub mod uint;
pub mod utils;

pub use conditioning::{classify, draw_below, draw_below_default, Region, Strategy};
pub use rngs::RNG;
pub use uint::UnsignedInt;
