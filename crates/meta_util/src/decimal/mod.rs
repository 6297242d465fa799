//! Fixed-point quantities used for every number the monitor derives.
//!
//! A [`Quantity`] is either a [`FixedPoint`] value (signed 256-bit mantissa tagged with its
//! number of decimal places) or [`Quantity::Failed`]. Every operator is total: a failed operand,
//! an overflow or a zero divisor yields `Failed` instead of an error or a panic, so a failed swap
//! leg poisons exactly the values derived from it.

use std::{
    cmp::{max, min},
    fmt,
    ops::{Div, Mul, Sub},
    str::FromStr,
};

use ethers::{
    types::{I256, U256},
    utils::{format_units, parse_units, ConversionError, ParseUnits},
};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use thiserror::Error;

/// Rendering of a failed quantity or diagnostic in reports.
pub const ERROR_MARKER: &str = "Error";

/// `U256::exp10` overflows past this exponent.
pub const MAX_DECIMALS: u32 = 76;

#[derive(Debug, Error)]
pub enum DecimalError {
    #[error("unable to convert `{0}`: {1}")]
    Conversion(String, ConversionError),

    #[error("`{0}` does not fit a signed 256-bit mantissa")]
    Overflow(String),

    #[error("unsupported precision {0}")]
    Precision(u32),
}

fn pow10(exp: u32) -> Option<I256> {
    if exp > MAX_DECIMALS {
        return None;
    }
    I256::try_from(U256::exp10(exp as usize)).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    mantissa: I256,
    decimals: u32,
}

impl FixedPoint {
    pub fn new(mantissa: I256, decimals: u32) -> Self {
        Self { mantissa, decimals }
    }

    /// Raw token amount (e.g. a balance delta) with the token's decimals.
    pub fn from_raw(amount: U256, decimals: u32) -> Option<Self> {
        I256::try_from(amount).ok().map(|mantissa| Self { mantissa, decimals })
    }

    /// Native asset amount in wei.
    pub fn from_wei(amount: U256) -> Option<Self> {
        Self::from_raw(amount, 18)
    }

    pub fn mantissa(&self) -> I256 {
        self.mantissa
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Inverse of the `Display` rendering: `"0.010000"` at 6 decimals is a mantissa of 10000.
    pub fn parse(text: &str, decimals: u32) -> Result<Self, DecimalError> {
        if decimals > MAX_DECIMALS {
            return Err(DecimalError::Precision(decimals));
        }
        let parsed = parse_units(text, decimals)
            .map_err(|e| DecimalError::Conversion(text.to_string(), e))?;
        let mantissa = match parsed {
            ParseUnits::U256(value) => {
                I256::try_from(value).map_err(|_| DecimalError::Overflow(text.to_string()))?
            }
            ParseUnits::I256(value) => value,
        };
        Ok(Self { mantissa, decimals })
    }

    /// Mantissa expressed at a higher precision.
    fn rescaled(&self, decimals: u32) -> Option<I256> {
        let scale = pow10(decimals.checked_sub(self.decimals)?)?;
        self.mantissa.checked_mul(scale)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.mantissa);
        }
        match format_units(self.mantissa, self.decimals) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}e-{}", self.mantissa, self.decimals),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Value(FixedPoint),
    Failed,
}

impl Quantity {
    pub fn is_failed(&self) -> bool {
        matches!(self, Quantity::Failed)
    }

    pub fn value(&self) -> Option<FixedPoint> {
        match self {
            Quantity::Value(v) => Some(*v),
            Quantity::Failed => None,
        }
    }

    /// Ratio rendered as a percentage number (`0.01` -> `1.0`); `None` for a failed quantity.
    pub fn percent(&self) -> Option<f64> {
        let text = self.value()?.to_string();
        match Decimal::from_str(&text) {
            Ok(ratio) => ratio.checked_mul(Decimal::ONE_HUNDRED)?.to_f64(),
            Err(_) => text.parse::<f64>().ok().map(|ratio| ratio * 100.0),
        }
    }
}

impl From<FixedPoint> for Quantity {
    fn from(value: FixedPoint) -> Self {
        Quantity::Value(value)
    }
}

impl From<Option<FixedPoint>> for Quantity {
    fn from(value: Option<FixedPoint>) -> Self {
        value.map_or(Quantity::Failed, Quantity::Value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Value(v) => v.fmt(f),
            Quantity::Failed => f.write_str(ERROR_MARKER),
        }
    }
}

/// `a - b` at `max(a.decimals, b.decimals)`.
pub fn subtract(a: Quantity, b: Quantity) -> Quantity {
    let (Quantity::Value(a), Quantity::Value(b)) = (a, b) else {
        return Quantity::Failed;
    };
    let decimals = max(a.decimals, b.decimals);
    let mantissa = a
        .rescaled(decimals)
        .zip(b.rescaled(decimals))
        .and_then(|(a, b)| a.checked_sub(b));
    mantissa.map(|mantissa| FixedPoint { mantissa, decimals }).into()
}

/// `(a * 10^b.decimals) / b` at `a.decimals`, truncated toward zero.
pub fn divide(a: Quantity, b: Quantity) -> Quantity {
    let (Quantity::Value(a), Quantity::Value(b)) = (a, b) else {
        return Quantity::Failed;
    };
    if b.mantissa.is_zero() {
        return Quantity::Failed;
    }
    let mantissa = pow10(b.decimals)
        .and_then(|scale| a.mantissa.checked_mul(scale))
        .and_then(|scaled| scaled.checked_div(b.mantissa));
    mantissa.map(|mantissa| FixedPoint { mantissa, decimals: a.decimals }).into()
}

/// `(a * b) / 10^min(decimals)`, labelled with `max(decimals)`.
///
/// The product is scaled down by the smaller precision but reported at the larger one.
pub fn multiply(a: Quantity, b: Quantity) -> Quantity {
    let (Quantity::Value(a), Quantity::Value(b)) = (a, b) else {
        return Quantity::Failed;
    };
    let mantissa = pow10(min(a.decimals, b.decimals))
        .zip(a.mantissa.checked_mul(b.mantissa))
        .and_then(|(scale, product)| product.checked_div(scale));
    let decimals = max(a.decimals, b.decimals);
    mantissa.map(|mantissa| FixedPoint { mantissa, decimals }).into()
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        subtract(self, rhs)
    }
}

impl Div for Quantity {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        divide(self, rhs)
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        multiply(self, rhs)
    }
}

#[cfg(test)]
mod test_decimal {
    use super::*;

    fn q(mantissa: i64, decimals: u32) -> Quantity {
        Quantity::Value(FixedPoint::new(I256::from(mantissa), decimals))
    }

    fn mantissa(q: Quantity) -> I256 {
        q.value().expect("valid quantity").mantissa()
    }

    #[test]
    fn should_subtract_equal_precision() {
        let ret = q(1_500, 3) - q(250, 3);
        assert_eq!(ret, q(1_250, 3));

        let ret = q(250, 3) - q(1_500, 3);
        assert_eq!(mantissa(ret), I256::from(-1_250));
        assert_eq!(ret.value().unwrap().decimals(), 3);
    }

    #[test]
    fn should_subtract_after_rescaling() {
        // 1.5 (1 dp) - 0.25 (2 dp) = 1.25 (2 dp)
        assert_eq!(q(15, 1) - q(25, 2), q(125, 2));
        assert_eq!(q(25, 2) - q(15, 1), q(-125, 2));
    }

    #[test]
    fn should_divide_truncating_toward_zero() {
        // 1.0 / 3.0 at 6 dp
        assert_eq!(q(1_000_000, 6) / q(3_000_000, 6), q(333_333, 6));
        assert_eq!(q(-1_000_000, 6) / q(3_000_000, 6), q(-333_333, 6));
        // result keeps the dividend's precision
        let ret = q(100_000_000, 6) / q(1_000_000_000_000_000_000, 18);
        assert_eq!(ret, q(100_000_000, 6));
    }

    #[test]
    fn should_fail_on_zero_divisor() {
        assert_eq!(q(1, 0) / q(0, 6), Quantity::Failed);
    }

    #[test]
    fn should_multiply_with_asymmetric_precision() {
        // 2.0 (18 dp) * 3.0 (6 dp): scaled by 10^6, labelled 18 dp
        let a = Quantity::Value(FixedPoint::new(I256::from(2_000_000_000_000_000_000i64), 18));
        let b = q(3_000_000, 6);
        let ret = a * b;
        assert_eq!(ret.value().unwrap().decimals(), 18);
        assert_eq!(mantissa(ret), I256::from(6_000_000_000_000_000_000i128));
        assert_eq!(b * a, ret);
    }

    #[test]
    fn should_absorb_failed_operands() {
        let a = q(42, 2);
        for (left, right) in [(a, Quantity::Failed), (Quantity::Failed, a)] {
            assert_eq!(subtract(left, right), Quantity::Failed);
            assert_eq!(divide(left, right), Quantity::Failed);
            assert_eq!(multiply(left, right), Quantity::Failed);
        }
        assert_eq!(Quantity::Failed - Quantity::Failed, Quantity::Failed);
    }

    #[test]
    fn should_fail_on_overflow() {
        let huge = Quantity::Value(FixedPoint::new(I256::MAX, 0));
        assert_eq!(huge * huge, Quantity::Failed);
        assert_eq!(huge - q(1, 18), Quantity::Failed);
        assert_eq!(q(1, 0) - q(1, 80), Quantity::Failed);
    }

    #[test]
    fn should_format_declared_precision() {
        assert_eq!(q(100_000_000, 6).to_string(), "100.000000");
        assert_eq!(q(10_000_000_000_000_000, 18).to_string(), "0.010000000000000000");
        assert_eq!(q(-10_000, 6).to_string(), "-0.010000");
        assert_eq!(Quantity::Failed.to_string(), ERROR_MARKER);
    }

    #[test]
    fn should_format_whole_numbers_without_fraction() {
        assert_eq!(q(5, 0).to_string(), "5");
        assert_eq!(q(-12, 0).to_string(), "-12");
        assert_eq!(FixedPoint::parse("5", 0).unwrap(), FixedPoint::new(I256::from(5), 0));
    }

    #[test]
    fn should_round_trip_through_text() {
        for value in [q(100_000_000, 6), q(1, 18), q(-10_000, 6), q(123_456_789, 8)] {
            let fixed = value.value().unwrap();
            let parsed = FixedPoint::parse(&fixed.to_string(), fixed.decimals()).unwrap();
            assert_eq!(parsed, fixed);
        }
    }

    #[test]
    fn should_render_percent() {
        assert_eq!(q(10_000_000_000_000_000, 18).percent(), Some(1.0));
        assert_eq!(q(0, 6).percent(), Some(0.0));
        assert_eq!(Quantity::Failed.percent(), None);
    }

    #[test]
    fn should_build_from_raw_amounts() {
        let wei = FixedPoint::from_wei(U256::exp10(18)).unwrap();
        assert_eq!(wei.to_string(), "1.000000000000000000");
        assert!(FixedPoint::from_raw(U256::MAX, 18).is_none());
        assert_eq!(Quantity::from(None::<FixedPoint>), Quantity::Failed);
    }
}
