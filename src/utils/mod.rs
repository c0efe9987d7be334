//! Utility modules for the liquidation engine.
//!
//! This module contains shared utilities used across the engine:
//! - Cryptographic primitives
//! - Checked arithmetic
//! - Constants

pub mod constants;
pub mod crypto;
pub mod math;

pub use constants::*;
pub use crypto::*;
pub use math::*;
