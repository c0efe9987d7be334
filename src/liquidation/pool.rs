//! Collateral pool accounting.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::error::{Error, Result};

/// Staked collateral held by the liquidator
///
/// The balance never goes negative: a withdrawal larger than the balance
/// fails with `InsufficientCollateral` and leaves it unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralPool {
    balance: Amount,
}

impl CollateralPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool holding `balance`
    pub fn with_balance(balance: Amount) -> Self {
        Self { balance }
    }

    /// Current staked balance
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Whether the pool can pay out `amount`
    pub fn can_cover(&self, amount: Amount) -> bool {
        amount <= self.balance
    }

    /// Require the pool to hold at least `amount`
    pub fn ensure_covers(&self, amount: Amount) -> Result<()> {
        if !self.can_cover(amount) {
            return Err(Error::InsufficientCollateral {
                required: amount.units(),
                available: self.balance.units(),
            });
        }
        Ok(())
    }

    /// Credit staked collateral
    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Debit staked collateral
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        self.ensure_covers(amount)?;
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }
}
