//! Fungible token ledger.
//!
//! This module provides the token collaborator the engine moves value through:
//! - Balance tracking per (token, holder)
//! - Transfers, approvals and delegated transfers
//! - Minting for test and bootstrap funding
//!
//! Every mutation computes all new values before writing any of them, so a
//! failed call leaves the ledger unchanged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::amount::Amount;
use crate::core::journal::Journaled;
use crate::error::{Error, Result};
use crate::utils::crypto::{Address, Hash};

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN LEDGER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Operations the engine needs from a fungible token collaborator
pub trait TokenLedger {
    /// Balance of `owner` in `token`
    fn balance_of(&self, token: Address, owner: Address) -> Amount;

    /// Amount `spender` may move out of `owner`'s balance
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount;

    /// Move `amount` from `from` to `to`
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: Amount)
        -> Result<()>;

    /// Set the allowance of `spender` over `owner`'s balance
    fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: Amount)
        -> Result<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()>;

    /// Create `amount` new units of `token` for `to`
    fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory token ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    /// Balances keyed by (token, holder)
    balances: HashMap<(Address, Address), Amount>,
    /// Allowances keyed by (token, owner, spender)
    allowances: HashMap<(Address, Address, Address), Amount>,
    /// Total supply per token
    supplies: HashMap<Address, Amount>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Total supply of a token
    pub fn total_supply(&self, token: Address) -> Amount {
        self.supplies.get(&token).copied().unwrap_or(Amount::ZERO)
    }

    /// Number of non-zero balances across all tokens
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Verify supply invariant (each token's supply == sum of its balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let mut sums: HashMap<Address, u128> = HashMap::new();
        for ((token, _), balance) in &self.balances {
            let entry = sums.entry(*token).or_insert(0);
            match entry.checked_add(balance.units()) {
                Some(sum) => *entry = sum,
                None => return false,
            }
        }
        self.supplies
            .iter()
            .all(|(token, supply)| sums.get(token).copied().unwrap_or(0) == supply.units())
            && sums.keys().all(|token| self.supplies.contains_key(token))
    }

    /// Hash of all balances, independent of map iteration order
    pub fn state_hash(&self) -> Hash {
        let mut sorted: Vec<_> = self.balances.iter().collect();
        sorted.sort_by_key(|((token, owner), _)| (*token, *owner));

        let mut data = Vec::with_capacity(sorted.len() * 56);
        for ((token, owner), balance) in sorted {
            data.extend_from_slice(token.as_bytes());
            data.extend_from_slice(owner.as_bytes());
            data.extend_from_slice(&balance.units().to_be_bytes());
        }
        Hash::sha256(&data)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }

    fn set_balance(&mut self, token: Address, owner: Address, amount: Amount) {
        if amount.is_zero() {
            self.balances.remove(&(token, owner));
        } else {
            self.balances.insert((token, owner), amount);
        }
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: Address, owner: Address) -> Amount {
        self.balances.get(&(token, owner)).copied().unwrap_or(Amount::ZERO)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.units(),
                available: from_balance.units(),
            });
        }

        if from == to {
            return Ok(()); // No-op for self-transfer
        }

        let new_from_balance = from_balance.checked_sub(amount)?;
        let new_to_balance = self.balance_of(token, to).checked_add(amount)?;

        self.set_balance(token, from, new_from_balance);
        self.set_balance(token, to, new_to_balance);

        Ok(())
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<()> {
        if amount.is_zero() {
            self.allowances.remove(&(token, owner, spender));
        } else {
            self.allowances.insert((token, owner, spender), amount);
        }
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let approved = self.allowance(token, from, spender);
        if approved < amount {
            return Err(Error::InsufficientAllowance {
                required: amount.units(),
                approved: approved.units(),
            });
        }
        let remaining = approved.checked_sub(amount)?;

        self.transfer(token, from, to, amount)?;
        self.approve(token, from, spender, remaining)
    }

    fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let new_supply = self.total_supply(token).checked_add(amount)?;
        let new_balance = self.balance_of(token, to).checked_add(amount)?;

        self.supplies.insert(token, new_supply);
        self.set_balance(token, to, new_balance);

        Ok(())
    }
}

impl Journaled for InMemoryLedger {
    type Snapshot = InMemoryLedger;

    fn snapshot(&self) -> Self::Snapshot {
        self.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        *self = snapshot;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
