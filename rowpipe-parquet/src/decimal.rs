//! Fixed-point decimal values.
//!
//! Decimal columns are persisted with Arrow's `Decimal128` semantics: a
//! scaled `i128` mantissa plus a scale. This module provides a lightweight
//! value type for carrying decimals between the record source and the column
//! buffers without pulling in a heavier dependency.

use std::fmt;
use std::str::FromStr;

use rowpipe_result::{Error, Result};

/// Precision used for persisted decimal columns (Arrow Decimal128 maximum).
pub const DECIMAL_PRECISION: u8 = 38;

/// Scale used for persisted decimal columns. Values with a different scale
/// are rescaled on append; a value that cannot be represented at this scale
/// without overflow fails the append.
pub const DECIMAL_SCALE: i8 = 18;

/// A decimal value as a scaled integer mantissa.
///
/// `mantissa * 10^(-scale)` is the numeric value. Scale must lie within
/// `0..=38`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    mantissa: i128,
    scale: i8,
}

impl DecimalValue {
    /// Create a decimal from its raw parts, validating the scale.
    pub fn new(mantissa: i128, scale: i8) -> Result<DecimalValue> {
        if !(0..=DECIMAL_PRECISION as i8).contains(&scale) {
            return Err(Error::InvalidArgumentError(format!(
                "decimal scale {scale} outside supported range 0..={DECIMAL_PRECISION}"
            )));
        }
        Ok(DecimalValue { mantissa, scale })
    }

    /// Construct a whole-number decimal with zero scale.
    pub fn from_i64(value: i64) -> DecimalValue {
        DecimalValue {
            mantissa: i128::from(value),
            scale: 0,
        }
    }

    /// The scaled integer backing this decimal.
    #[inline]
    pub fn mantissa(self) -> i128 {
        self.mantissa
    }

    /// The number of fractional digits.
    #[inline]
    pub fn scale(self) -> i8 {
        self.scale
    }

    /// Re-express this decimal at `target` scale.
    ///
    /// Scaling up multiplies the mantissa and fails on overflow; scaling
    /// down requires exact divisibility so no precision is silently lost.
    pub fn rescale(self, target: i8) -> Result<DecimalValue> {
        if !(0..=DECIMAL_PRECISION as i8).contains(&target) {
            return Err(Error::InvalidArgumentError(format!(
                "decimal scale {target} outside supported range 0..={DECIMAL_PRECISION}"
            )));
        }
        if target == self.scale {
            return Ok(self);
        }
        if target > self.scale {
            let factor = pow10((target - self.scale) as u32)?;
            let mantissa = self.mantissa.checked_mul(factor).ok_or_else(|| {
                Error::InvalidArgumentError(format!(
                    "decimal value {self} overflows at scale {target}"
                ))
            })?;
            return Ok(DecimalValue {
                mantissa,
                scale: target,
            });
        }
        let factor = pow10((self.scale - target) as u32)?;
        if self.mantissa % factor != 0 {
            return Err(Error::InvalidArgumentError(format!(
                "cannot rescale decimal {self} from scale {} to {target} without losing precision",
                self.scale
            )));
        }
        Ok(DecimalValue {
            mantissa: self.mantissa / factor,
            scale: target,
        })
    }

    /// Convert into an `f64` (lossy for high-precision inputs). Used for
    /// kind-aware filter comparison, where decimals compare as doubles.
    pub fn to_f64(self) -> f64 {
        if self.mantissa == 0 {
            return 0.0;
        }
        (self.mantissa as f64) / 10_f64.powi(i32::from(self.scale))
    }
}

fn pow10(exp: u32) -> Result<i128> {
    10_i128.checked_pow(exp).ok_or_else(|| {
        Error::InvalidArgumentError(format!("decimal scale shift 10^{exp} overflows"))
    })
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let negative = self.mantissa < 0;
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if negative {
            f.write_str("-")?;
        }
        if digits.len() <= scale {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        } else {
            let split = digits.len() - scale;
            write!(f, "{}.{}", &digits[..split], &digits[split..])
        }
    }
}

impl FromStr for DecimalValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<DecimalValue> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let scale = frac_part.len();
        if scale > DECIMAL_PRECISION as usize {
            return Err(Error::InvalidArgumentError(format!(
                "decimal literal '{s}' has more than {DECIMAL_PRECISION} fractional digits"
            )));
        }
        let combined = format!("{int_part}{frac_part}");
        let mantissa = combined.parse::<i128>().map_err(|_| {
            Error::InvalidArgumentError(format!("decimal literal '{s}' out of range"))
        })?;
        DecimalValue::new(mantissa, scale as i8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_from_str() {
        let value = DecimalValue::new(-1_2345, 3).unwrap();
        assert_eq!(value.to_string(), "-12.345");
        assert_eq!("-12.345".parse::<DecimalValue>().unwrap(), value);

        let small = DecimalValue::new(7, 4).unwrap();
        assert_eq!(small.to_string(), "0.0007");
    }

    #[test]
    fn test_rescale_up_and_down() {
        let value = DecimalValue::new(125, 2).unwrap();
        let scaled = value.rescale(5).unwrap();
        assert_eq!(scaled.mantissa(), 125_000);
        assert_eq!(scaled.rescale(2).unwrap(), value);
    }

    #[test]
    fn test_rescale_down_requires_exact_divisibility() {
        let value = DecimalValue::new(125, 2).unwrap();
        assert!(value.rescale(1).is_err());
    }

    #[test]
    fn test_to_f64() {
        let value = DecimalValue::new(314_159, 5).unwrap();
        assert!((value.to_f64() - 3.14159).abs() < 1e-12);
        assert_eq!(DecimalValue::from_i64(0).to_f64(), 0.0);
    }
}
