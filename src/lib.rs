//! # Collateral Liquidator
//!
//! A liquidation engine that converts a pool's staked collateral into a reward
//! asset by settling signed, off-chain negotiated swap orders, then forwards
//! the proceeds to a registry-approved beneficiary.
//!
//! ## Architecture
//!
//! The engine consists of several modules, leaves first:
//!
//! - **Order**: Signed order types, canonical hashing and the wire codec
//! - **Registry**: Trust attributes and the authorization gate
//! - **Token**: Fungible token ledger collaborator
//! - **Settlement**: Swap engine collaborator
//! - **Liquidation**: Pending order queue, collateral pool and controller
//!
//! ## Guarantees
//!
//! - Orders are only queued with a canonical signature from their signatory
//! - A failed transition leaves queue, pool and collaborators unchanged
//! - Amount arithmetic never wraps
//!
//! ## Example
//!
//! ```rust,ignore
//! use liquidator::prelude::*;
//!
//! let mut liquidator = Liquidator::new(config, registry, ledger, engine, SystemClock)?;
//!
//! // Queue a signed order received from a counterparty
//! let trade_id = liquidator.register_encoded(&bytes)?;
//!
//! // Convert stake into reward for an approved beneficiary
//! let receipt = liquidator.reclaim(amount, beneficiary)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod error;
pub mod liquidation;
pub mod order;
pub mod registry;
pub mod settlement;
pub mod telemetry;
pub mod token;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        amount::Amount,
        clock::{Clock, ManualClock, SystemClock},
        config::{ConfigError, LiquidatorConfig},
        journal::Journaled,
    };
    pub use crate::error::{Error, Result};
    pub use crate::liquidation::{
        controller::{Liquidator, LiquidatorState, ReclaimReceipt},
        events::LiquidatorEvent,
        queue::PendingOrderQueue,
    };
    pub use crate::order::{
        signature::{recover_signer, sign_order, verify, verify_order},
        types::{Kind, Order, OrderTerms, Party, SignatureVersion, TradeId},
    };
    pub use crate::registry::{AttributeRegistry, AuthorizationGate, InMemoryRegistry};
    pub use crate::settlement::{SettlementEngine, SwapEngine, SwapReceipt};
    pub use crate::token::ledger::{InMemoryLedger, TokenLedger};
    pub use crate::utils::crypto::{Address, Hash, KeyPair};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
