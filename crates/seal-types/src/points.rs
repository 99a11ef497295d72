//! Fixed-point PDF coordinates
//!
//! Positions are persisted in audit records and compared across calls, so they
//! are kept at exactly two fractional digits instead of raw floats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Sub};

/// A point-space length with two fractional digits, stored as hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Points(i64);

impl Points {
    pub const ZERO: Points = Points(0);

    /// Largest page dimension a PDF viewer is required to handle (200 inches)
    pub const MAX_USER_SPACE: Points = Points(1_440_000);

    /// Round half away from zero to the nearest hundredth.
    ///
    /// Out-of-range input saturates; NaN and infinities land outside
    /// [`Points::MAX_USER_SPACE`] so validation rejects them.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self(i64::MAX);
        }
        Self((value * 100.0).round() as i64)
    }

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude fits inside a PDF page's user space
    pub fn is_within_user_space(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX_USER_SPACE.0.unsigned_abs()
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Points> for f64 {
    fn from(value: Points) -> Self {
        value.to_f64()
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Points {
    type Output = Points;

    fn sub(self, rhs: Points) -> Points {
        Points(self.0.saturating_sub(rhs.0))
    }
}

impl Div<u32> for Points {
    type Output = Points;

    /// Divide and re-round to hundredths
    fn div(self, rhs: u32) -> Points {
        Points::from_f64(self.to_f64() / f64::from(rhs))
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}
