use rust_decimal::Decimal;

use crate::rates::{checked_product, monthly_equivalent, validate_rate};
use crate::types::{Money, Rate};
use crate::SimfinResult;

/// Present value of monthly cash flows discounted at an annual rate.
///
/// The first flow is one month out: `sum(flow_i / (1 + m)^i)` for i = 1..n,
/// where `m` is the monthly equivalent of `annual_discount_rate`. A zero rate
/// returns the undiscounted sum.
///
/// The factor `1 / (1 + m)^i` is accumulated by repeated multiplication. For
/// positive rates it shrinks toward zero and cannot overflow; a negative rate
/// that drives it out of the decimal range is an `InvalidInput`.
pub fn present_value(flows: &[Money], annual_discount_rate: Rate) -> SimfinResult<Money> {
    validate_rate("annual_discount_rate", annual_discount_rate)?;

    if annual_discount_rate.is_zero() {
        return Ok(flows.iter().copied().sum());
    }

    let step = Decimal::ONE / (Decimal::ONE + monthly_equivalent(annual_discount_rate));
    let mut factor = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for flow in flows {
        factor = checked_product("annual_discount_rate", factor, step)?;
        result += checked_product("annual_discount_rate", *flow, factor)?;
    }

    Ok(result)
}
