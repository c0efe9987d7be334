//! Token amounts.
//!
//! All balances and order legs carry an [`Amount`]: an unsigned integer in the
//! asset's smallest unit. Arithmetic is checked and fails with
//! [`Error::ArithmeticOverflow`] instead of wrapping or saturating.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::utils::math::{pow10, safe_add, safe_mul, safe_sub};

/// Strongly-typed token amount in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Largest representable amount
    pub const MAX: Self = Self(u128::MAX);

    /// Create from base units
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Create from whole tokens with the given number of decimals
    pub fn from_whole(whole: u128, decimals: u32) -> Result<Self> {
        Ok(Self(safe_mul(whole, pow10(decimals)?)?))
    }

    /// Get raw base units
    pub fn units(&self) -> u128 {
        self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition, failing with `ArithmeticOverflow`
    pub fn checked_add(self, other: Self) -> Result<Self> {
        safe_add(self.0, other.0).map(Self)
    }

    /// Checked subtraction, failing with `ArithmeticOverflow`
    pub fn checked_sub(self, other: Self) -> Result<Self> {
        safe_sub(self.0, other.0).map(Self)
    }

    /// Big-endian bytes left-padded to a 32-byte word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[16..].copy_from_slice(&self.0.to_be_bytes());
        word
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_from_whole() {
        let hundred = Amount::from_whole(100, 18).unwrap();
        assert_eq!(hundred.units(), 100 * 10u128.pow(18));
        assert!(Amount::from_whole(u128::MAX, 18).is_err());
    }

    #[test]
    fn test_checked_arithmetic_fails_closed() {
        let one = Amount::from_units(1);
        assert!(matches!(
            Amount::MAX.checked_add(one),
            Err(Error::ArithmeticOverflow { .. })
        ));
        assert!(matches!(
            Amount::ZERO.checked_sub(one),
            Err(Error::ArithmeticOverflow { .. })
        ));
        assert_eq!(one.checked_add(one).unwrap().units(), 2);
    }

    #[test]
    fn test_to_word_is_big_endian() {
        let word = Amount::from_units(0x0102).to_word();
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert!(word[..30].iter().all(|b| *b == 0));
    }
}
