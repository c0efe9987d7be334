//! Checked integer arithmetic.
//!
//! Balances never wrap or saturate: every addition and subtraction on an
//! amount goes through these helpers and fails closed with
//! [`Error::ArithmeticOverflow`].

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(Error::ArithmeticOverflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u128, b: u128) -> Result<u128> {
    a.checked_sub(b).ok_or(Error::ArithmeticOverflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe multiplication with overflow check
pub fn safe_mul(a: u128, b: u128) -> Result<u128> {
    a.checked_mul(b).ok_or(Error::ArithmeticOverflow {
        operation: format!("{} * {}", a, b),
    })
}

/// `10^exp` with overflow check
pub fn pow10(exp: u32) -> Result<u128> {
    10u128.checked_pow(exp).ok_or(Error::ArithmeticOverflow {
        operation: format!("10^{}", exp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_arithmetic() {
        assert_eq!(safe_add(100, 200).unwrap(), 300);
        assert_eq!(safe_sub(300, 100).unwrap(), 200);
        assert_eq!(safe_mul(10, 20).unwrap(), 200);

        assert!(safe_add(u128::MAX, 1).is_err());
        assert!(safe_sub(100, 200).is_err());
        assert!(safe_mul(u128::MAX, 2).is_err());
    }

    #[test]
    fn test_overflow_is_named() {
        let err = safe_sub(1, 2).unwrap_err();
        assert!(matches!(err, Error::ArithmeticOverflow { .. }));
        assert!(err.to_string().contains("1 - 2"));
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0).unwrap(), 1);
        assert_eq!(pow10(18).unwrap(), 1_000_000_000_000_000_000);
        assert!(pow10(39).is_err());
    }
}
