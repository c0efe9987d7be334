//! Signed swap orders.
//!
//! This module contains everything needed to accept an order from the wire:
//! - Types: legs, signatures, orders and trade ids
//! - Codec: canonical hashing and the fixed-position wire record
//! - Signature: recovery and verification against the claimed signatory

pub mod codec;
pub mod signature;
pub mod types;

pub use codec::*;
pub use signature::*;
pub use types::*;
