//! Decimal string ⇄ fixed-point base-unit codec.
//!
//! User input arrives as a decimal string ("1.5"); the chain speaks
//! integers scaled by 10^decimals. Conversion is exact: wide-integer
//! arithmetic only, and digits beyond the configured precision
//! truncate — never round up. Round-trip law:
//! `to_base_units(from_base_units(x, d), d) == x` for all x.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("malformed amount: {0:?}")]
    Malformed(String),

    #[error("amount exceeds the representable range")]
    Overflow,
}

/// Parse a plain decimal string into base units at the given precision.
///
/// Accepts an optional single `.`; a leading or trailing dot is
/// tolerated (".5", "5."). Signs, exponents, and grouping are rejected.
pub fn to_base_units(raw: &str, decimals: u8) -> Result<U256, AmountError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "." {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => {
            if f.contains('.') {
                return Err(AmountError::Malformed(raw.to_string()));
            }
            (i, f)
        }
        None => (raw, ""),
    };

    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::Malformed(raw.to_string()));
    }

    // Truncate fractional digits past the configured precision.
    let frac_kept = &frac_part[..frac_part.len().min(decimals as usize)];

    let scale = U256::from(10).pow(U256::from(decimals));
    let int_units = parse_digits(int_part)?
        .checked_mul(scale)
        .ok_or(AmountError::Overflow)?;

    // Scale the kept fraction up to full precision: "5" at decimals=6
    // contributes 500000, not 5.
    let frac_scale = U256::from(10).pow(U256::from(decimals as usize - frac_kept.len()));
    let frac_units = parse_digits(frac_kept)?
        .checked_mul(frac_scale)
        .ok_or(AmountError::Overflow)?;

    int_units.checked_add(frac_units).ok_or(AmountError::Overflow)
}

/// Render base units back into a decimal string, trimming trailing
/// fractional zeros ("1.500000" → "1.5", "2.000000" → "2").
pub fn from_base_units(value: U256, decimals: u8) -> String {
    let scale = U256::from(10).pow(U256::from(decimals));
    let int_part = value / scale;
    let frac_part = value % scale;

    if frac_part.is_zero() {
        return int_part.to_string();
    }

    let frac = format!("{frac_part:0>width$}", width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    format!("{int_part}.{frac}")
}

fn parse_digits(digits: &str) -> Result<U256, AmountError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scales_whole_and_fractional_parts() {
        assert_eq!(to_base_units("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(to_base_units("0.000001", 6).unwrap(), U256::from(1u64));
        assert_eq!(to_base_units("2", 6).unwrap(), U256::from(2_000_000u64));
        assert_eq!(to_base_units(".5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(to_base_units("5.", 6).unwrap(), U256::from(5_000_000u64));
    }

    #[test]
    fn digits_below_precision_truncate_to_zero() {
        // Truncation, never rounding: 1e-7 at precision 6 is 0.
        assert_eq!(to_base_units("0.0000001", 6).unwrap(), U256::ZERO);
        assert_eq!(to_base_units("0.0000019", 6).unwrap(), U256::from(1u64));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(to_base_units("", 6), Err(AmountError::Empty));
        assert_eq!(to_base_units(".", 6), Err(AmountError::Empty));
        assert!(matches!(to_base_units("-1", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units("1.2.3", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units("1e6", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units("1 000", 6), Err(AmountError::Malformed(_))));
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        // U256::MAX has 78 digits; 79 nines cannot fit.
        let too_big = "9".repeat(79);
        assert_eq!(to_base_units(&too_big, 18), Err(AmountError::Overflow));
    }

    #[test]
    fn renders_without_trailing_zeros() {
        assert_eq!(from_base_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(from_base_units(U256::from(2_000_000u64), 6), "2");
        assert_eq!(from_base_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(from_base_units(U256::ZERO, 6), "0");
    }

    proptest! {
        // Round-trip law over representable values.
        #[test]
        fn round_trips_through_decimal_string(units in any::<u128>(), decimals in 0u8..=18) {
            let units = U256::from(units);
            let rendered = from_base_units(units, decimals);
            prop_assert_eq!(to_base_units(&rendered, decimals).unwrap(), units);
        }

        #[test]
        fn parsing_never_panics(s in "\\PC*", decimals in 0u8..=18) {
            let _ = to_base_units(&s, decimals);
        }
    }
}
