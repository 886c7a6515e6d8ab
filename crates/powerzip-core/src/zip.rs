//! ZIP code parsing and the Texas range check.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ResolveError, ResolveResult};

/// Lowest and highest 5-digit ZIP assigned to Texas.
pub const TEXAS_ZIP_MIN: u32 = 75000;
pub const TEXAS_ZIP_MAX: u32 = 79999;

static ZIP_FORMAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").unwrap());

/// A validated Texas 5-digit ZIP code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct ZipCode(u32);

impl ZipCode {
    /// Parse and validate a ZIP.
    ///
    /// Format is checked before range, so `"7520"` is `InvalidZipFormat` and
    /// `"80000"` is `NonTexasZip`. Whitespace anywhere is a format error.
    pub fn parse(input: &str) -> ResolveResult<Self> {
        if !ZIP_FORMAT.is_match(input) {
            return Err(ResolveError::InvalidZipFormat(input.to_string()));
        }
        let value: u32 = input
            .parse()
            .map_err(|_| ResolveError::InvalidZipFormat(input.to_string()))?;
        if !(TEXAS_ZIP_MIN..=TEXAS_ZIP_MAX).contains(&value) {
            return Err(ResolveError::NonTexasZip(input.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// First three digits, used for coarse service-area checks.
    pub fn prefix(self) -> u32 {
        self.0 / 100
    }

    pub fn as_string(self) -> String {
        format!("{:05}", self.0)
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ZipCode::parse(&value)
    }
}

impl Serialize for ZipCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_edges() {
        assert_eq!(ZipCode::parse("75000").unwrap().value(), 75000);
        assert_eq!(ZipCode::parse("79999").unwrap().value(), 79999);
    }

    #[test]
    fn rejects_just_outside_range() {
        assert_eq!(
            ZipCode::parse("74999"),
            Err(ResolveError::NonTexasZip("74999".into()))
        );
        assert_eq!(
            ZipCode::parse("80000"),
            Err(ResolveError::NonTexasZip("80000".into()))
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["abcde", "7520", "752055", "", "75 05", "7520a"] {
            assert!(
                matches!(ZipCode::parse(bad), Err(ResolveError::InvalidZipFormat(_))),
                "{bad:?} should be a format error"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_a_format_error() {
        for padded in [" 75205", "75205\n", "\t75205 ", "75205 "] {
            assert_eq!(
                ZipCode::parse(padded),
                Err(ResolveError::InvalidZipFormat(padded.into())),
                "{padded:?}"
            );
        }
    }

    #[test]
    fn prefix_is_first_three_digits() {
        assert_eq!(ZipCode::parse("77573").unwrap().prefix(), 775);
    }
}
