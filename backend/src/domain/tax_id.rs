//! National tax identifier with a two-check-digit checksum.
//!
//! Identifiers are eleven digits long. Punctuation such as `529.982.247-25`
//! is accepted on input and stripped; the stored form is digits only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits in a well-formed identifier.
pub const TAX_ID_LENGTH: usize = 11;

/// Reasons a raw string is not a valid tax identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaxIdError {
    /// The input did not contain exactly eleven digits.
    #[error("tax id must contain {TAX_ID_LENGTH} digits, found {length}")]
    WrongLength { length: usize },
    /// All eleven digits are the same.
    #[error("tax id must not repeat a single digit")]
    RepeatedDigits,
    /// The check digits do not match the body.
    #[error("tax id check digits do not match")]
    ChecksumMismatch,
}

/// Validate a raw identifier, ignoring any non-digit characters.
///
/// # Examples
/// ```
/// use orgchart::domain::tax_id::validate;
///
/// assert!(validate("529.982.247-25"));
/// assert!(!validate("111.111.111-11"));
/// ```
#[must_use]
pub fn validate(raw: &str) -> bool {
    TaxId::parse(raw).is_ok()
}

/// Compute one check digit over `digits` with weights descending from
/// `first_weight`.
fn check_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    match sum % 11 {
        remainder if remainder < 2 => 0,
        remainder => 11 - remainder,
    }
}

/// Checksum-valid identifier in normalised (digits only) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxId(String);

impl TaxId {
    /// Normalise and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self, TaxIdError> {
        let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != TAX_ID_LENGTH {
            return Err(TaxIdError::WrongLength {
                length: digits.len(),
            });
        }
        if digits.iter().all(|digit| *digit == digits[0]) {
            return Err(TaxIdError::RepeatedDigits);
        }

        let first = check_digit(&digits[..9], 10);
        let second = check_digit(&digits[..10], 11);
        if first != digits[9] || second != digits[10] {
            return Err(TaxIdError::ChecksumMismatch);
        }

        Ok(Self(digits.iter().map(u32::to_string).collect()))
    }

    /// Digits-only representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Strip everything except ASCII digits, for matching stored values.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

impl AsRef<str> for TaxId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TaxId> for String {
    fn from(value: TaxId) -> Self {
        value.0
    }
}

impl TryFrom<String> for TaxId {
    type Error = TaxIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
