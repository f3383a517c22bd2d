// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Fixed width unsigned integers that bounded draws are generic over.
//! Every width up to 64 bits gets its full width product from the next
//! larger primitive, u128 splits into 64 bit halves.

use std::{
    fmt::{Debug, Display, LowerHex},
    hash::Hash,
    ops::{BitAnd, BitOr, Not, Rem},
};

use crate::rngs::RNG;

/// Unsigned integer of a fixed bit width `BITS`, covering `[0, 2**BITS)`.
pub trait UnsignedInt:
    Copy
    + Ord
    + Hash
    + Debug
    + Display
    + LowerHex
    + Default
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Rem<Output = Self>
{
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    /// Full width product of `self * rhs`, returned as (high half, low half).
    fn wide_mul(self, rhs: Self) -> (Self, Self);
    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
    /// Shift left by `n`, dropping the bits shifted out. `n` must be below `BITS`.
    fn wrapping_shl(self, n: u32) -> Self;
    /// Shift right by `n`. `n` must be below `BITS`.
    fn wrapping_shr(self, n: u32) -> Self;
    fn leading_zeros(self) -> u32;
    fn trailing_zeros(self) -> u32;
    /// Pull one uniformly distributed value of this width out of `rng`.
    fn draw<R: RNG + ?Sized>(rng: &mut R) -> Self;
    fn to_u128(self) -> u128;

    fn low_bit(self) -> Self {
        self & Self::ONE
    }

    fn is_even(self) -> bool {
        self.low_bit() == Self::ZERO
    }

    /// Right shift that yields zero once every bit is shifted out.
    fn shr_or_zero(self, n: u32) -> Self {
        if n >= Self::BITS {
            Self::ZERO
        } else {
            self.wrapping_shr(n)
        }
    }

    /// Value with the lowest `n` bits set.
    fn low_mask(n: u32) -> Self {
        if n >= Self::BITS {
            Self::MAX
        } else {
            !Self::MAX.wrapping_shl(n)
        }
    }

    fn to_f64(self) -> f64 {
        self.to_u128() as f64
    }
}

macro_rules! impl_unsigned_int {
    ($t:ty, $wide:ty, |$rng:ident| $draw:expr) => {
        impl UnsignedInt for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn wide_mul(self, rhs: Self) -> (Self, Self) {
                let product = (self as $wide) * (rhs as $wide);
                ((product >> <$t>::BITS) as $t, product as $t)
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$t>::wrapping_sub(self, rhs)
            }

            #[inline]
            fn wrapping_neg(self) -> Self {
                <$t>::wrapping_neg(self)
            }

            #[inline]
            fn wrapping_shl(self, n: u32) -> Self {
                <$t>::wrapping_shl(self, n)
            }

            #[inline]
            fn wrapping_shr(self, n: u32) -> Self {
                <$t>::wrapping_shr(self, n)
            }

            #[inline]
            fn leading_zeros(self) -> u32 {
                <$t>::leading_zeros(self)
            }

            #[inline]
            fn trailing_zeros(self) -> u32 {
                <$t>::trailing_zeros(self)
            }

            #[inline]
            fn draw<R: RNG + ?Sized>($rng: &mut R) -> Self {
                $draw
            }

            #[inline]
            fn to_u128(self) -> u128 {
                self as u128
            }
        }
    };
}

impl_unsigned_int!(u8, u16, |rng| rng.next_u32() as u8);
impl_unsigned_int!(u16, u32, |rng| rng.next_u32() as u16);
impl_unsigned_int!(u32, u64, |rng| rng.next_u32());
impl_unsigned_int!(u64, u128, |rng| rng.next());
impl_unsigned_int!(usize, u128, |rng| rng.next() as usize);

impl UnsignedInt for u128 {
    const BITS: u32 = u128::BITS;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MAX: Self = u128::MAX;

    fn wide_mul(self, rhs: Self) -> (Self, Self) {
        const LOW: u128 = u64::MAX as u128;
        let (a_high, a_low) = (self >> 64, self & LOW);
        let (b_high, b_low) = (rhs >> 64, rhs & LOW);
        let low_low = a_low * b_low;
        let high_low = a_high * b_low;
        let low_high = a_low * b_high;
        let high_high = a_high * b_high;
        // At most 3 * (2**64 - 1), no overflow.
        let middle = (low_low >> 64) + (high_low & LOW) + (low_high & LOW);
        let low = (middle << 64) | (low_low & LOW);
        let high = high_high + (high_low >> 64) + (low_high >> 64) + (middle >> 64);
        (high, low)
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        u128::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u128::wrapping_sub(self, rhs)
    }

    #[inline]
    fn wrapping_neg(self) -> Self {
        u128::wrapping_neg(self)
    }

    #[inline]
    fn wrapping_shl(self, n: u32) -> Self {
        u128::wrapping_shl(self, n)
    }

    #[inline]
    fn wrapping_shr(self, n: u32) -> Self {
        u128::wrapping_shr(self, n)
    }

    #[inline]
    fn leading_zeros(self) -> u32 {
        u128::leading_zeros(self)
    }

    #[inline]
    fn trailing_zeros(self) -> u32 {
        u128::trailing_zeros(self)
    }

    /// Takes two u64 from `rng`, high half first.
    #[inline]
    fn draw<R: RNG + ?Sized>(rng: &mut R) -> Self {
        let high = rng.next() as u128;
        let low = rng.next() as u128;
        (high << 64) | low
    }

    #[inline]
    fn to_u128(self) -> u128 {
        self
    }
}
