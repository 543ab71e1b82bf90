use std::fmt;

use crate::foundation::error::{StorypathError, StorypathResult};

/// Fraction in `[0, 1]` along an avatar's path.
///
/// Built from a percentage string such as `"42%"` via [`parse_percentage`]. Values outside
/// `0%..=100%` are rejected rather than clamped, so a `PathPosition` is always in range.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPosition(f64);

impl PathPosition {
    /// Start of the path.
    pub const START: Self = Self(0.0);
    /// End of the path.
    pub const END: Self = Self(1.0);

    /// Parse a percentage string into a position.
    pub fn parse(s: &str) -> StorypathResult<Self> {
        let fraction = parse_percentage(s)?;
        Self::from_fraction(fraction)
    }

    /// Wrap a raw fraction, rejecting values outside `[0, 1]`.
    pub fn from_fraction(fraction: f64) -> StorypathResult<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(StorypathError::validation(format!(
                "path position {fraction} is outside 0%..=100%"
            )));
        }
        Ok(Self(fraction))
    }

    /// Raw fraction in `[0, 1]`.
    pub fn fraction(self) -> f64 {
        self.0
    }
}

impl fmt::Display for PathPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rounded so that `parse(to_string())` reproduces the same fraction.
        let pct = (self.0 * 100.0 * 1e6).round() / 1e6;
        write!(f, "{pct}%")
    }
}

impl TryFrom<String> for PathPosition {
    type Error = StorypathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathPosition> for String {
    fn from(value: PathPosition) -> Self {
        value.to_string()
    }
}

/// Extract the first `<number>%` in `s` and return it as a fraction.
///
/// The number is a run of digits with an optional decimal part, optionally followed by
/// whitespace before the `%`. A `-` directly in front of the number is rejected; this parser
/// never yields a negative fraction.
pub fn parse_percentage(s: &str) -> StorypathResult<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let end = i;

        let mut j = end;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'%' {
            continue;
        }

        if start > 0 && bytes[start - 1] == b'-' {
            return Err(StorypathError::validation(format!(
                "percentage '{s}' must not be negative"
            )));
        }

        // Only ASCII digits and '.' are in range, so slicing on byte offsets is safe.
        let value: f64 = s[start..end].parse().map_err(|_| {
            StorypathError::validation(format!("percentage '{s}' is not a number"))
        })?;
        return Ok(value / 100.0);
    }

    Err(StorypathError::validation(format!(
        "'{s}' does not contain a percentage (expected e.g. \"42%\")"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/position.rs"]
mod tests;
