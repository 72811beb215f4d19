use fixed::types::I32F32;

use crate::time::MILLIS_PER_HOUR;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Units produced per hour.
pub type Rate = Fixed64;

/// A whole quantity of some material.
pub type Amount = u64;

/// Convert an f64 to Fixed64. Use only for initialization from user input.
/// NaN maps to zero and out-of-range values saturate.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        Fixed64::ZERO
    } else {
        Fixed64::saturating_from_num(v)
    }
}

/// `floor(rate * millis / 1h)`, computed exactly on the raw bits.
///
/// A non-positive rate or duration produces nothing.
pub fn produced_over(rate: Rate, millis: i64) -> Amount {
    if rate <= Fixed64::ZERO || millis <= 0 {
        return 0;
    }
    let scaled = rate.to_bits() as i128 * millis as i128 / MILLIS_PER_HOUR as i128;
    let whole = scaled >> Fixed64::FRAC_NBITS;
    whole.min(Amount::MAX as i128) as Amount
}

/// `ceil(amount / rate * 60)`: whole minutes needed to accumulate `amount`
/// at `rate` per hour. `None` when the rate is not positive.
pub fn minutes_to_accumulate(amount: Amount, rate: Rate) -> Option<u64> {
    if rate <= Fixed64::ZERO {
        return None;
    }
    let bits = rate.to_bits() as u128;
    let numerator = (amount as u128 * 60) << Fixed64::FRAC_NBITS;
    let minutes = numerator.div_ceil(bits);
    Some(minutes.min(u64::MAX as u128) as u64)
}

/// `floor(a * b)` for non-negative fixed-point factors, saturating.
pub fn floor_product(a: Fixed64, b: Fixed64) -> Amount {
    floor_product_times(a, b, 1)
}

/// `floor(a * b * n)` for non-negative fixed-point factors, saturating.
pub fn floor_product_times(a: Fixed64, b: Fixed64, n: u64) -> Amount {
    if a <= Fixed64::ZERO || b <= Fixed64::ZERO || n == 0 {
        return 0;
    }
    let product = a.to_bits() as u128 * b.to_bits() as u128;
    match product.checked_mul(n as u128) {
        Some(scaled) => {
            let whole = scaled >> (2 * Fixed64::FRAC_NBITS);
            whole.min(Amount::MAX as u128) as Amount
        }
        None => Amount::MAX,
    }
}

/// `floor(a * n)` for a non-negative factor, saturating.
pub fn floor_times(a: Fixed64, n: u64) -> Amount {
    if a <= Fixed64::ZERO || n == 0 {
        return 0;
    }
    let scaled = a.to_bits() as u128 * n as u128;
    let whole = scaled >> Fixed64::FRAC_NBITS;
    whole.min(Amount::MAX as u128) as Amount
}
