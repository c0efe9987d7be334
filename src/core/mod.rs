//! Core types for the liquidation engine.
//!
//! This module contains the fundamental building blocks:
//! - Amount: checked token amounts
//! - Clock: time sources for expiry checks
//! - Config: liquidator identities and policy
//! - Journal: snapshot/restore for unwinding failed transitions

pub mod amount;
pub mod clock;
pub mod config;
pub mod journal;

pub use amount::*;
pub use clock::*;
pub use config::*;
pub use journal::*;
