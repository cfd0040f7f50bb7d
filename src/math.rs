//! Integer arithmetic helpers for invariant and pro-rata calculations.
//!
//! Reserves are bounded to 2^112, so every intermediate product the
//! engine needs — `balance × balance × 1000²` for the fee-adjusted
//! invariant check, `amount × shares / reserve` for pro-rata formulas —
//! fits comfortably in 256 bits. This module provides the [`U256`]
//! intermediate type, an integer square root, and a widening
//! multiply-divide that only fails when the final quotient does not fit
//! back into a `u128`.

use uint::construct_uint;

use crate::domain::{Amount, Rounding};
use crate::error::AmmError;

construct_uint! {
    /// 256-bit unsigned integer for overflow-free intermediates.
    pub struct U256(4);
}

/// Integer square root of a 256-bit value via Newton's method.
///
/// Returns `floor(sqrt(n))`. Converges in at most ~128 iterations; each
/// step strictly decreases the estimate until the fixed point.
#[must_use]
pub fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let one = U256::one();
    let mut x = n;
    let mut y = (x + one) >> 1;
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    x
}

/// Computes `a × b / denominator` with a 256-bit intermediate product.
///
/// # Errors
///
/// - [`AmmError::Overflow`] if `denominator` is zero or the quotient
///   exceeds `u128::MAX`.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
    if denominator.is_zero() {
        return Err(AmmError::Overflow("mul_div division by zero"));
    }
    let num = U256::from(a.get()) * U256::from(b.get());
    let den = U256::from(denominator.get());
    let mut q = num / den;
    if rounding == Rounding::Up && !(num % den).is_zero() {
        q += U256::one();
    }
    u256_to_amount(q)
}

/// Narrows a 256-bit value back to an [`Amount`].
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the value exceeds `u128::MAX`.
pub fn u256_to_amount(value: U256) -> crate::error::Result<Amount> {
    if value.bits() > 128 {
        return Err(AmmError::Overflow("value does not fit in u128"));
    }
    Ok(Amount::new(value.as_u128()))
}
