//! Fixed-point value domain for sensor controls.
//!
//! Gain (dB), frame rate (fps) and exposure arrive as integers scaled by
//! [`FIXED_POINT_SCALING_FACTOR`], so fractional values pass through the
//! control layer without floating point.
//!
//! # Example
//! ```rust
//! use imx185_core::utils::math::fixed_point::{FixedPoint, FIXED_POINT_SCALING_FACTOR};
//! let fps: FixedPoint = "29.5".parse().unwrap();
//! assert_eq!(fps.raw(), 29 * FIXED_POINT_SCALING_FACTOR + FIXED_POINT_SCALING_FACTOR / 2);
//! assert_eq!(fps.trunc(), 29);
//! ```
//!
use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Scale applied to every fixed-point control value (16 fractional bits).
pub const FIXED_POINT_SCALING_FACTOR: i64 = 1 << 16;

/// Most fractional digits honoured when parsing a decimal string.
const MAX_FRACTION_DIGITS: u32 = 6;

/// A control value scaled by [`FIXED_POINT_SCALING_FACTOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedPoint(i64);

impl FixedPoint {
    pub const ZERO: Self = Self(0);

    /// Wrap an already-scaled value.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Scale a whole number into the fixed-point domain, saturating at the
    /// `i64` bounds.
    pub const fn from_int(value: i64) -> Self {
        Self(value.saturating_mul(FIXED_POINT_SCALING_FACTOR))
    }

    /// The scaled integer as seen by the control framework.
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole part, truncated toward zero.
    pub const fn trunc(self) -> i64 {
        self.0 / FIXED_POINT_SCALING_FACTOR
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<FixedPoint> for i64 {
    fn from(value: FixedPoint) -> Self {
        value.0
    }
}

/// Reasons a decimal string could not be turned into a [`FixedPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFixedError {
    Empty,
    InvalidDigit,
    Overflow,
}

impl fmt::Display for ParseFixedError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ParseFixedError::Empty => f.write_str("empty fixed-point literal"),
            ParseFixedError::InvalidDigit => f.write_str("invalid digit in fixed-point literal"),
            ParseFixedError::Overflow => f.write_str("fixed-point literal out of range"),
        }
    }
}

impl core::error::Error for ParseFixedError {}

impl FromStr for FixedPoint {
    type Err = ParseFixedError;

    /// Parse `"-12.75"` style decimals. Digits past the sixth fractional
    /// place are ignored; the fraction is truncated onto the 1/65536 grid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseFixedError::Empty);
        }

        let mut whole: i64 = 0;
        for c in int_part.chars() {
            let d = c.to_digit(10).ok_or(ParseFixedError::InvalidDigit)? as i64;
            whole = whole
                .checked_mul(10)
                .and_then(|w| w.checked_add(d))
                .ok_or(ParseFixedError::Overflow)?;
        }

        let mut numerator: i64 = 0;
        let mut denominator: i64 = 1;
        for (i, c) in frac_part.chars().enumerate() {
            let d = c.to_digit(10).ok_or(ParseFixedError::InvalidDigit)? as i64;
            if (i as u32) < MAX_FRACTION_DIGITS {
                numerator = numerator * 10 + d;
                denominator *= 10;
            }
        }

        let raw = whole
            .checked_mul(FIXED_POINT_SCALING_FACTOR)
            .and_then(|w| w.checked_add(numerator * FIXED_POINT_SCALING_FACTOR / denominator))
            .ok_or(ParseFixedError::Overflow)?;

        Ok(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for FixedPoint {
    /// Renders the value with four decimal places, e.g. `30.0000`.
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = FIXED_POINT_SCALING_FACTOR as u64;
        let frac = (magnitude % scale) * 10_000 / scale;
        write!(f, "{}{}.{:04}", sign, magnitude / scale, frac)
    }
}
