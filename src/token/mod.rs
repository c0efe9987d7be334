//! Token collaborator.
//!
//! The engine never keeps token balances itself; it moves value through a
//! [`TokenLedger`] and unwinds it through [`crate::core::Journaled`].

pub mod ledger;

pub use ledger::*;
