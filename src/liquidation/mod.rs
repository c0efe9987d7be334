//! Liquidation of staked collateral through signed swap orders.
//!
//! This module handles the order lifecycle from registration to settlement:
//! - Pending order queue, most recent first
//! - Collateral pool accounting
//! - Liquidation controller driving registration and reclaim
//! - Events emitted by each successful transition

pub mod controller;
pub mod events;
pub mod pool;
pub mod queue;

pub use controller::*;
pub use events::*;
pub use pool::*;
pub use queue::*;
