// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};

use serde::ser::Serializer;
use serde::Serialize;

const F64_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53
const EXPONENT_ABOVE: f64 = 1e21;
const EXPONENT_BELOW: f64 = 1e-6;

/// A traced numeric value.
///
/// The traced language has a single IEEE-754 number type, so this is a thin
/// wrapper around `f64` that adds the total order and equality needed to
/// keep numbers in ordered literal sets.
#[derive(Clone, Copy)]
pub struct Number(f64);

impl Number {
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Integral values within the safe integer range.
    pub fn as_i64(&self) -> Option<i64> {
        let f = self.0;
        if f.is_finite() && f.fract() == 0.0 && f.abs() <= F64_SAFE_INTEGER {
            Some(f as i64)
        } else {
            None
        }
    }

    /// Rendering used for literal type definitions, matching the traced
    /// language's number-to-string conversion. Integral values never carry a
    /// fractional part; magnitudes outside `[1e-6, 1e21)` use exponent
    /// notation.
    pub fn format_decimal(&self) -> String {
        let f = self.0;
        if let Some(i) = self.as_i64() {
            // Normalizes -0 to 0.
            return i.to_string();
        }
        if f.is_infinite() {
            let name = if f > 0.0 { "Infinity" } else { "-Infinity" };
            return name.to_string();
        }

        let magnitude = f.abs();
        if magnitude >= EXPONENT_ABOVE || (magnitude != 0.0 && magnitude < EXPONENT_BELOW) {
            let formatted = format!("{f:e}");
            match formatted.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    format!("{mantissa}e+{exponent}")
                }
                _ => formatted,
            }
        } else {
            format!("{f}")
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_i64() {
            Some(i) => serializer.serialize_i64(i),
            None if self.0.is_finite() => serializer.serialize_f64(self.0),
            // JSON has no representation for NaN or the infinities.
            None => serializer.serialize_none(),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(value as f64)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number(value as f64)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number(f64::from(value))
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number(value as f64)
    }
}

// Numbers live in ordered sets, so NaN must equal itself and -0 must equal
// 0. `total_cmp` alone would separate the zeros.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0 == 0.0, other.0 == 0.0) {
            (true, true) => Ordering::Equal,
            _ => self.0.total_cmp(&other.0),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
