//! Fixed-point token amounts
//!
//! Human-entered amounts ("10.5") are validated and scaled to integer base
//! units before anything is sent to a wallet.

use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use serde::Serialize;
use std::fmt;

/// Largest precision alloy's unit conversions accept
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a plain decimal number")]
    Malformed(String),

    #[error("'{amount}' has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("{0} decimals is above the maximum of 77")]
    DecimalsOutOfRange(u8),

    #[error("'{0}' does not fit in 256 bits")]
    Overflow(String),
}

/// An amount of a token in its smallest unit, tagged with the token precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenAmount {
    base_units: U256,
    decimals: u8,
}

impl TokenAmount {
    /// Parse a decimal string such as `"10.5"` into base units.
    ///
    /// Only `digits[.digits]` is accepted: no sign, exponent or whitespace,
    /// and never more fractional digits than `decimals`.
    pub fn parse(amount: &str, decimals: u8) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::DecimalsOutOfRange(decimals));
        }
        let (whole, fraction) = split_decimal(amount)?;
        if fraction.is_some_and(|f| f.len() > decimals as usize) {
            return Err(AmountError::TooPrecise {
                amount: amount.to_string(),
                decimals,
            });
        }

        // parse_units rejects a bare leading or trailing dot
        let normalized = match fraction {
            Some(fraction) => format!(
                "{}.{}",
                if whole.is_empty() { "0" } else { whole },
                if fraction.is_empty() { "0" } else { fraction }
            ),
            None => whole.to_string(),
        };

        let base_units = parse_units(&normalized, decimals)
            .map_err(|_| AmountError::Overflow(amount.to_string()))?
            .get_absolute();

        Ok(Self {
            base_units,
            decimals,
        })
    }

    /// Check that `amount` is a plain `digits[.digits]` number
    ///
    /// Precision is not checked, so this works before the token's decimals
    /// are known.
    pub fn check_syntax(amount: &str) -> Result<(), AmountError> {
        split_decimal(amount).map(|_| ())
    }

    /// Wrap an amount that is already in base units
    pub fn from_base_units(base_units: U256, decimals: u8) -> Self {
        Self {
            base_units,
            decimals,
        }
    }

    pub fn base_units(&self) -> U256 {
        self.base_units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.base_units.is_zero()
    }
}

/// Split `digits[.digits]` into its whole and fractional parts
fn split_decimal(amount: &str) -> Result<(&str, Option<&str>), AmountError> {
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let well_formed = match fraction {
        Some(fraction) => {
            (!whole.is_empty() || !fraction.is_empty())
                && all_digits(whole)
                && all_digits(fraction)
        }
        None => all_digits(whole),
    };
    if !well_formed {
        return Err(AmountError::Malformed(amount.to_string()));
    }
    Ok((whole, fraction))
}

impl fmt::Display for TokenAmount {
    /// Decimal representation without trailing fractional zeros
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = format_units(self.base_units, self.decimals).map_err(|_| fmt::Error)?;
        let trimmed = if formatted.contains('.') {
            formatted.trim_end_matches('0').trim_end_matches('.')
        } else {
            formatted.as_str()
        };
        f.write_str(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_fractional_amount() {
        let amount = TokenAmount::parse("10.5", 18).unwrap();
        assert_eq!(
            amount.base_units(),
            U256::from(10_500_000_000_000_000_000u128)
        );
        assert_eq!(amount.decimals(), 18);
    }

    #[test]
    fn scales_whole_amount_with_six_decimals() {
        let amount = TokenAmount::parse("250", 6).unwrap();
        assert_eq!(amount.base_units(), U256::from(250_000_000u64));
    }

    #[test]
    fn accepts_leading_and_trailing_dot() {
        assert_eq!(
            TokenAmount::parse(".5", 2).unwrap().base_units(),
            U256::from(50u64)
        );
        assert_eq!(
            TokenAmount::parse("7.", 2).unwrap().base_units(),
            U256::from(700u64)
        );
    }

    #[test]
    fn zero_decimals_means_integer_units() {
        assert_eq!(
            TokenAmount::parse("42", 0).unwrap().base_units(),
            U256::from(42u64)
        );
        assert!(matches!(
            TokenAmount::parse("42.1", 0),
            Err(AmountError::TooPrecise { .. })
        ));
    }

    #[test]
    fn rejects_malformed_strings() {
        for input in ["abc", "1.2.3", "-1", "+1", "1e18", " 1", "1,5", "."] {
            assert!(
                matches!(TokenAmount::parse(input, 18), Err(AmountError::Malformed(_))),
                "{input} should be rejected"
            );
        }
        assert_eq!(TokenAmount::parse("", 18), Err(AmountError::Empty));
    }

    #[test]
    fn syntax_check_ignores_precision() {
        assert_eq!(TokenAmount::check_syntax("0.1234567890123456789012"), Ok(()));
        assert_eq!(
            TokenAmount::check_syntax("abc"),
            Err(AmountError::Malformed("abc".to_string()))
        );
        assert_eq!(TokenAmount::check_syntax(""), Err(AmountError::Empty));
    }

    #[test]
    fn rejects_excess_precision() {
        let err = TokenAmount::parse("0.1234567", 6).unwrap_err();
        assert_eq!(
            err,
            AmountError::TooPrecise {
                amount: "0.1234567".to_string(),
                decimals: 6
            }
        );
    }

    #[test]
    fn rejects_out_of_range_decimals() {
        assert_eq!(
            TokenAmount::parse("1", 78),
            Err(AmountError::DecimalsOutOfRange(78))
        );
    }

    #[test]
    fn display_trims_trailing_zeros() {
        let amount = TokenAmount::parse("10.5", 18).unwrap();
        assert_eq!(amount.to_string(), "10.5");

        let whole = TokenAmount::from_base_units(U256::from(3_000_000u64), 6);
        assert_eq!(whole.to_string(), "3");
    }
}
