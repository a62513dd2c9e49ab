//! Exact conversion between human-readable amounts and smallest-unit integers
//!
//! Amounts are parsed digit by digit into a `BigUint`; no floating point is
//! involved, so 18-decimal tokens keep every unit.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Serialize, Serializer};

use crate::AmountError;

/// A human amount together with its smallest-unit ("wei") representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAmount {
    human: String,
    decimals: u8,
    wei: BigUint,
}

impl NormalizedAmount {
    /// The amount as the user typed it (trimmed)
    pub fn human(&self) -> &str {
        &self.human
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn wei(&self) -> &BigUint {
        &self.wei
    }

    /// Base-10 string of the smallest-unit amount, as sent to the wallet API
    pub fn wei_string(&self) -> String {
        self.wei.to_str_radix(10)
    }

    pub fn is_zero(&self) -> bool {
        self.wei.is_zero()
    }
}

impl fmt::Display for NormalizedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wei)
    }
}

impl Serialize for NormalizedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wei_string())
    }
}

/// Convert a non-negative decimal string into `round(amount * 10^decimals)`.
///
/// Accepts an optional leading `+`, an integer part, and an optional
/// fractional part (`"5"`, `"0.001"`, `".5"`, `"5."`). Exponents, signs
/// other than `+`, separators and whitespace inside the number are rejected.
/// Fractional digits beyond `decimals` are rounded half-up.
pub fn normalize(human: &str, decimals: u8) -> Result<NormalizedAmount, AmountError> {
    let trimmed = human.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return Err(AmountError::Malformed(trimmed.to_string()));
    }

    let scale = decimals as usize;
    let mut digits = String::with_capacity(int_part.len() + scale);
    digits.push_str(int_part);

    let round_up = if frac_part.len() <= scale {
        digits.push_str(frac_part);
        digits.extend(std::iter::repeat('0').take(scale - frac_part.len()));
        false
    } else {
        digits.push_str(&frac_part[..scale]);
        frac_part.as_bytes()[scale] >= b'5'
    };

    let mut wei = if digits.is_empty() {
        BigUint::zero()
    } else {
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| AmountError::Malformed(trimmed.to_string()))?
    };
    if round_up {
        wei += BigUint::one();
    }

    Ok(NormalizedAmount {
        human: trimmed.to_string(),
        decimals,
        wei,
    })
}

/// Render a smallest-unit amount back as a decimal string.
///
/// Trailing fractional zeros are dropped; whole amounts have no decimal point.
pub fn format_units(wei: &BigUint, decimals: u8) -> String {
    let raw = wei.to_str_radix(10);
    let scale = decimals as usize;
    if scale == 0 {
        return raw;
    }

    let padded = if raw.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
