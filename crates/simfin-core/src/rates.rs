//! Rate conversion and monetary correction.
//!
//! Annual rates are converted to their monthly-compounded equivalent with a
//! Newton iteration on `x^12 = 1 + r`, using only decimal multiplication and
//! division so the full 28-digit working precision of `Decimal` is kept over
//! terms of several hundred months.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::SimfinError;
use crate::types::{Money, Rate};
use crate::SimfinResult;

pub const MONTHS_PER_YEAR: u32 = 12;

const ROOT_TOLERANCE: Decimal = dec!(0.0000000000000000000000001);
const MAX_ROOT_ITERATIONS: u32 = 128;

/// Monthly rate `m` such that `(1 + m)^12 = 1 + annual`.
///
/// A zero annual rate returns exactly zero. Rates at or below -100% have no
/// real monthly equivalent; callers validate them away and this returns -1.
/// Any rate that fits in a `Decimal` converts without overflow.
pub fn monthly_equivalent(annual: Rate) -> Rate {
    if annual.is_zero() {
        return Decimal::ZERO;
    }
    let base = Decimal::ONE + annual;
    if base <= Decimal::ZERO {
        return Decimal::NEGATIVE_ONE;
    }
    twelfth_root(base) - Decimal::ONE
}

/// Annual rate obtained by compounding a monthly rate twelve times.
pub fn annual_equivalent(monthly: Rate) -> SimfinResult<Rate> {
    if monthly.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let compounded = checked_pow("monthly_rate", Decimal::ONE + monthly, MONTHS_PER_YEAR)?;
    Ok(compounded - Decimal::ONE)
}

/// Apply annual correction indices to a balance for one month.
///
/// Each index is converted to its monthly equivalent and applied in order,
/// one multiplication per index. Zero indices leave the balance untouched.
pub fn apply_corrections(balance: Money, annual_rates: &[Rate]) -> SimfinResult<Money> {
    let monthly: Vec<Rate> = annual_rates.iter().map(|r| monthly_equivalent(*r)).collect();
    apply_monthly_corrections(balance, &monthly)
}

/// Same as [`apply_corrections`] with rates already converted to monthly.
///
/// Fails with `InvalidInput` when the corrected balance leaves the decimal
/// range.
pub fn apply_monthly_corrections(balance: Money, monthly_rates: &[Rate]) -> SimfinResult<Money> {
    monthly_rates.iter().try_fold(balance, |acc, monthly| {
        if monthly.is_zero() {
            Ok(acc)
        } else {
            checked_product("balance", acc, Decimal::ONE + monthly)
        }
    })
}

/// Reject rates at or below -100%.
pub(crate) fn validate_rate(field: &str, rate: Rate) -> SimfinResult<()> {
    if rate <= Decimal::NEGATIVE_ONE {
        return Err(SimfinError::InvalidInput {
            field: field.into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

/// Multiply two decimals, reporting overflow against the input that drove it.
pub(crate) fn checked_product(field: &str, a: Decimal, b: Decimal) -> SimfinResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| SimfinError::InvalidInput {
        field: field.into(),
        reason: "Value grew beyond the decimal range".into(),
    })
}

/// Newton iteration for `a^(1/12)`, a > 0.
///
/// Both starting points, `1 + (a - 1) / 12` (Bernoulli) and `a^(1/8)` for
/// a >= 1, lie on or above the root, so the iteration descends monotonically.
/// `a / x^11` is formed by repeated division, which stays within range for
/// every x at or above the root.
fn twelfth_root(a: Decimal) -> Decimal {
    let n = Decimal::from(MONTHS_PER_YEAR);
    let n_minus_one = n - Decimal::ONE;

    let mut x = Decimal::ONE + (a - Decimal::ONE) / n;
    if a > Decimal::ONE {
        if let Some(eighth) = a.sqrt().and_then(|r| r.sqrt()).and_then(|r| r.sqrt()) {
            x = x.min(eighth);
        }
    }

    for _ in 0..MAX_ROOT_ITERATIONS {
        let mut quotient = a;
        for _ in 1..MONTHS_PER_YEAR {
            quotient /= x;
        }
        let next = (n_minus_one * x + quotient) / n;
        let delta = (next - x).abs();
        x = next;
        if delta <= ROOT_TOLERANCE {
            break;
        }
    }
    x
}

fn checked_pow(field: &str, base: Decimal, exp: u32) -> SimfinResult<Decimal> {
    let mut acc = Decimal::ONE;
    for _ in 0..exp {
        acc = checked_product(field, acc, base)?;
    }
    Ok(acc)
}
