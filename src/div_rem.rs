use std::cmp::min;

use num_traits::{CheckedAdd, CheckedMul, CheckedSub, PrimInt};

use crate::error::{DateTimeError, Result};

pub(crate) trait RemFloor: Sized {
    fn rem_floor(&self, other: Self) -> Self;
}

impl<T: PrimInt> RemFloor for T {
    fn rem_floor(&self, other: Self) -> Self {
        let zero = Self::zero();
        let one = Self::one();
        if *self > zero && other < zero {
            (*self - one) % other + other + one
        } else if *self < zero && other > zero {
            (*self + one) % other + other - one
        } else {
            *self % other
        }
    }
}

pub(crate) trait ClampedDivRem<Q: Ord>: Sized {
    type Quotient;
    fn clamped_div_rem(self, divisor: Self, max_quotient: Q) -> (Q, Self);
}

impl<T, Q> ClampedDivRem<Q> for T
where
    T: PrimInt + TryInto<Q>,
    Q: Ord + Into<T> + Copy,
{
    type Quotient = Q;
    fn clamped_div_rem(self, divisor: T, max_quotient: Self::Quotient) -> (Self::Quotient, Self) {
        let quotient = min(self / divisor, max_quotient.into());
        let remainder = self - quotient * divisor;
        let quotient: Self::Quotient = match quotient.try_into() {
            Ok(x) => x,
            Err(_) => panic!("quotient is too large"),
        };
        (quotient, remainder)
    }
}

/// Checked arithmetic that reports overflow as a [`DateTimeError`].
pub(crate) trait ExactArith: Sized {
    fn add_exact(self, other: Self) -> Result<Self>;
    fn sub_exact(self, other: Self) -> Result<Self>;
    fn mul_exact(self, other: Self) -> Result<Self>;
}

impl<T: PrimInt> ExactArith for T {
    fn add_exact(self, other: Self) -> Result<Self> {
        CheckedAdd::checked_add(&self, &other).ok_or(DateTimeError::Overflow)
    }

    fn sub_exact(self, other: Self) -> Result<Self> {
        CheckedSub::checked_sub(&self, &other).ok_or(DateTimeError::Overflow)
    }

    fn mul_exact(self, other: Self) -> Result<Self> {
        CheckedMul::checked_mul(&self, &other).ok_or(DateTimeError::Overflow)
    }
}

/// Narrow an `i64` to `i32`, failing with an overflow error.
pub(crate) fn to_int_exact(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| DateTimeError::Overflow)
}
