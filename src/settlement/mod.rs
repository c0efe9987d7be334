//! Settlement engine collaborator.
//!
//! A settlement engine executes a signed order as an atomic two-sided
//! transfer and refuses to execute the same order twice.

pub mod swap;

pub use swap::*;

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::core::journal::Journaled;
use crate::error::Result;
use crate::order::types::{Order, TradeId};
use crate::token::ledger::TokenLedger;
use crate::utils::crypto::Address;

/// What a settled swap moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Trade id of the settled order
    pub trade_id: TradeId,
    /// Order nonce, now consumed
    pub nonce: u64,
    /// Signer wallet
    pub signer_wallet: Address,
    /// Token paid by the signer
    pub signer_token: Address,
    /// Amount paid by the signer
    pub signer_amount: Amount,
    /// Sender wallet
    pub sender_wallet: Address,
    /// Token paid by the sender
    pub sender_token: Address,
    /// Amount paid by the sender
    pub sender_amount: Amount,
    /// Fee paid to the affiliate, zero when unused
    pub affiliate_amount: Amount,
}

/// Executes matched swaps against a token ledger
///
/// On error the engine's own state is unchanged, but transfers already made
/// on `ledger` are not undone; callers that need all-or-nothing behavior
/// checkpoint the ledger through [`Journaled`] first.
pub trait SettlementEngine: Journaled {
    /// Address the engine acts as; orders must name it as validator
    fn address(&self) -> Address;

    /// Execute `order` at time `now`
    fn execute_swap<L: TokenLedger + ?Sized>(
        &mut self,
        order: &Order,
        ledger: &mut L,
        now: u64,
    ) -> Result<SwapReceipt>;
}
