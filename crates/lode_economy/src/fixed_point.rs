//! # Fixed-Point Arithmetic
//!
//! **CRITICAL: NO FLOATING POINT IN COST CALCULATIONS**
//!
//! Stamina balances and vein-mining costs are fixed-point decimals with six
//! places, stored as a u64.
//!
//! ## Why Fixed-Point?
//!
//! - Deterministic: Same calculation = same result on all hardware
//! - No rounding drift: 0.1 + 0.2 == 0.3 (unlike IEEE 754 floats)
//! - Auditable: a declined debit can be reproduced exactly from the logs
//!
//! Configuration files may still write costs as TOML floats (`0.5`); they
//! are converted once, at load time.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EconomyError;

/// Number of decimal places.
const DECIMAL_PLACES: u32 = 6;

/// The multiplier for 6 decimal places.
const MULTIPLIER: u64 = 10u64.pow(DECIMAL_PLACES);

/// Fixed-point decimal number with 6 decimal places.
///
/// Internally stores value * 1,000,000 as a u64.
///
/// # Range
///
/// - Minimum: 0.000000
/// - Maximum: 18,446,744,073,709.551615
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FixedPoint(u64);

impl FixedPoint {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One unit (1.000000).
    pub const ONE: Self = Self(MULTIPLIER);

    /// Maximum representable value.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a fixed-point number from a whole number.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let ten = FixedPoint::from_whole(10); // 10.000000
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * MULTIPLIER)
    }

    /// Creates a fixed-point number from parts.
    ///
    /// # Arguments
    ///
    /// * `whole` - The whole number part
    /// * `decimal` - The decimal part (0-999999)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let half = FixedPoint::from_parts(0, 500000); // 0.500000
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_parts(whole: u64, decimal: u32) -> Self {
        Self(whole * MULTIPLIER + (decimal as u64 % MULTIPLIER))
    }

    /// Returns the whole number part.
    #[inline]
    #[must_use]
    pub const fn whole(self) -> u64 {
        self.0 / MULTIPLIER
    }

    /// Returns the decimal part (0-999999).
    #[inline]
    #[must_use]
    pub const fn decimal(self) -> u32 {
        (self.0 % MULTIPLIER) as u32
    }

    /// Returns true if this value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by an integer.
    #[inline]
    #[must_use]
    pub const fn checked_mul_int(self, rhs: u64) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication of two fixed-point values.
    ///
    /// The product is truncated to six decimals. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_mul(self, rhs: Self) -> Option<Self> {
        let product = (self.0 as u128 * rhs.0 as u128) / MULTIPLIER as u128;
        if product > u64::MAX as u128 {
            None
        } else {
            Some(Self(product as u64))
        }
    }

    /// Checked division by another fixed-point value.
    ///
    /// Returns `None` when `rhs` is zero or the quotient overflows.
    #[inline]
    #[must_use]
    pub const fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        let quotient = (self.0 as u128 * MULTIPLIER as u128) / rhs.0 as u128;
        if quotient > u64::MAX as u128 {
            None
        } else {
            Some(Self(quotient as u64))
        }
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({}.{:06})", self.whole(), self.decimal())
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.whole(), self.decimal())
    }
}

impl FromStr for FixedPoint {
    type Err = EconomyError;

    /// Parses `"12"`, `"12.5"` or `"0.000001"`. At most six decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EconomyError::InvalidConfig(format!("not a fixed-point number: {s:?}"));
        let s = s.trim();
        let (whole, decimal) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || decimal.len() > DECIMAL_PLACES as usize {
            return Err(invalid());
        }
        if !whole.bytes().chain(decimal.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let mut fraction = 0u64;
        if !decimal.is_empty() {
            let parsed: u64 = decimal.parse().map_err(|_| invalid())?;
            fraction = parsed * 10u64.pow(DECIMAL_PLACES - decimal.len() as u32);
        }

        whole
            .checked_mul(MULTIPLIER)
            .and_then(|raw| raw.checked_add(fraction))
            .map(Self)
            .ok_or(EconomyError::ArithmeticOverflow)
    }
}

impl Serialize for FixedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FixedPointVisitor)
    }
}

/// Accepts integers, non-negative floats and decimal strings.
struct FixedPointVisitor;

impl<'de> Visitor<'de> for FixedPointVisitor {
    type Value = FixedPoint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal number")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        v.checked_mul(MULTIPLIER)
            .map(FixedPoint)
            .ok_or_else(|| E::custom("fixed-point overflow"))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        let v = u64::try_from(v).map_err(|_| E::custom("negative fixed-point value"))?;
        self.visit_u64(v)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let raw = (v * MULTIPLIER as f64).round();
        if !raw.is_finite() || raw < 0.0 || raw > u64::MAX as f64 {
            return Err(E::custom("fixed-point value out of range"));
        }
        Ok(FixedPoint(raw as u64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}
