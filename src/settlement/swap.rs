//! In-memory swap engine.
//!
//! Tracks per-signer nonce state and delegated signatories, and settles an
//! order by pulling both legs through allowances granted to the engine.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::amount::Amount;
use crate::core::journal::Journaled;
use crate::error::{Error, Result};
use crate::order::signature::verify_order;
use crate::order::types::Order;
use crate::settlement::{SettlementEngine, SwapReceipt};
use crate::token::ledger::TokenLedger;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// NONCE BOOK
// ═══════════════════════════════════════════════════════════════════════════════

/// Nonce and delegation state of the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceBook {
    /// Nonces consumed by a settled swap
    used: HashMap<Address, HashSet<u64>>,
    /// Nonces cancelled by their signer
    cancelled: HashMap<Address, HashSet<u64>>,
    /// Lowest nonce still accepted per signer
    minimums: HashMap<Address, u64>,
    /// Delegate signatory per signer wallet
    delegates: HashMap<Address, Address>,
}

impl NonceBook {
    fn is_used(&self, signer: &Address, nonce: u64) -> bool {
        self.used.get(signer).map_or(false, |set| set.contains(&nonce))
    }

    fn is_cancelled(&self, signer: &Address, nonce: u64) -> bool {
        self.cancelled
            .get(signer)
            .map_or(false, |set| set.contains(&nonce))
    }

    fn minimum(&self, signer: &Address) -> u64 {
        self.minimums.get(signer).copied().unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SWAP ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Counterparty swap engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEngine {
    address: Address,
    book: NonceBook,
}

impl SwapEngine {
    /// Create an engine acting as `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            book: NonceBook::default(),
        }
    }

    /// Cancel specific nonces of `signer`
    pub fn cancel(&mut self, signer: Address, nonces: &[u64]) {
        let set = self.book.cancelled.entry(signer).or_default();
        set.extend(nonces.iter().copied());
        tracing::info!("Cancelled {} nonce(s) for {}", nonces.len(), signer.short());
    }

    /// Invalidate every nonce of `signer` below `minimum`
    pub fn cancel_up_to(&mut self, signer: Address, minimum: u64) {
        let current = self.book.minimums.entry(signer).or_insert(0);
        *current = (*current).max(minimum);
    }

    /// Let `delegate` sign orders on behalf of `signer`
    pub fn authorize_signer(&mut self, signer: Address, delegate: Address) {
        self.book.delegates.insert(signer, delegate);
    }

    /// Remove the delegate of `signer`
    pub fn revoke_signer(&mut self, signer: Address) {
        self.book.delegates.remove(&signer);
    }

    /// Whether `nonce` can still be settled for `signer`
    pub fn is_nonce_available(&self, signer: &Address, nonce: u64) -> bool {
        nonce >= self.book.minimum(signer)
            && !self.book.is_used(signer, nonce)
            && !self.book.is_cancelled(signer, nonce)
    }

    fn check_nonce(&self, signer: &Address, nonce: u64) -> Result<()> {
        if self.book.is_used(signer, nonce) {
            return Err(Error::SettlementFailed(format!("nonce {} already used", nonce)));
        }
        if self.book.is_cancelled(signer, nonce) {
            return Err(Error::SettlementFailed(format!("nonce {} cancelled", nonce)));
        }
        let minimum = self.book.minimum(signer);
        if nonce < minimum {
            return Err(Error::SettlementFailed(format!(
                "nonce {} below minimum {}",
                nonce, minimum
            )));
        }
        Ok(())
    }

    fn check_signatory(&self, order: &Order) -> Result<()> {
        let signer = order.terms.signer.wallet;
        if order.signatory == signer {
            return Ok(());
        }
        match self.book.delegates.get(&signer) {
            Some(delegate) if *delegate == order.signatory => Ok(()),
            _ => Err(Error::SettlementFailed(format!(
                "{} may not sign for {}",
                order.signatory.short(),
                signer.short()
            ))),
        }
    }
}

impl SettlementEngine for SwapEngine {
    fn address(&self) -> Address {
        self.address
    }

    fn execute_swap<L: TokenLedger + ?Sized>(
        &mut self,
        order: &Order,
        ledger: &mut L,
        now: u64,
    ) -> Result<SwapReceipt> {
        let terms = &order.terms;

        if terms.validator != self.address {
            return Err(Error::SettlementFailed(format!(
                "order names validator {}, engine is {}",
                terms.validator, self.address
            )));
        }
        if order.is_expired(now) {
            return Err(Error::SettlementFailed(format!(
                "order expired at {}",
                terms.expiry
            )));
        }
        self.check_nonce(&terms.signer.wallet, terms.nonce)?;
        self.check_signatory(order)?;
        verify_order(order).map_err(|e| Error::SettlementFailed(e.to_string()))?;

        let (signer, sender, affiliate) = (&terms.signer, &terms.sender, &terms.affiliate);

        ledger.transfer_from(sender.token, self.address, sender.wallet, signer.wallet, sender.amount)?;
        ledger.transfer_from(signer.token, self.address, signer.wallet, sender.wallet, signer.amount)?;

        let affiliate_amount = if affiliate.is_empty() || affiliate.amount.is_zero() {
            Amount::ZERO
        } else {
            ledger.transfer_from(
                affiliate.token,
                self.address,
                signer.wallet,
                affiliate.wallet,
                affiliate.amount,
            )?;
            affiliate.amount
        };

        self.book
            .used
            .entry(signer.wallet)
            .or_default()
            .insert(terms.nonce);

        Ok(SwapReceipt {
            trade_id: order.trade_id(),
            nonce: terms.nonce,
            signer_wallet: signer.wallet,
            signer_token: signer.token,
            signer_amount: signer.amount,
            sender_wallet: sender.wallet,
            sender_token: sender.token,
            sender_amount: sender.amount,
            affiliate_amount,
        })
    }
}

impl Journaled for SwapEngine {
    type Snapshot = NonceBook;

    fn snapshot(&self) -> Self::Snapshot {
        self.book.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        self.book = snapshot;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
