//! Liquidator events for state change notifications.
//!
//! Every successful transition emits one event; failed transitions emit none.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::amount::Amount;
use crate::order::types::TradeId;
use crate::utils::crypto::{Address, Hash};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Summary of a registered order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Order nonce
    pub nonce: u64,
    /// Order expiry
    pub expiry: u64,
    /// Signer wallet
    pub signer: Address,
    /// Reward the signer offers
    pub signer_amount: Amount,
    /// Stake the pool pays
    pub sender_amount: Amount,
    /// Settlement venue
    pub validator: Address,
}

/// All liquidator event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidatorEvent {
    /// An order entered the queue
    OrderRegistered {
        /// Queue key
        trade_id: TradeId,
        /// Order terms
        order: OrderSummary,
        /// Registration time
        timestamp: u64,
    },
    /// Collateral was converted and forwarded
    Reclaimed {
        /// Consumed order
        trade_id: TradeId,
        /// Requested amount
        amount: Amount,
        /// Reward forwarded to the beneficiary
        proceeds: Amount,
        /// Stake paid out of the pool
        collateral: Amount,
        /// Recipient of the proceeds
        beneficiary: Address,
        /// Settlement time
        timestamp: u64,
    },
    /// Stake was added to the pool
    PoolFunded {
        /// Funder
        from: Address,
        /// Amount staked
        amount: Amount,
        /// Pool balance after funding
        balance: Amount,
        /// Funding time
        timestamp: u64,
    },
    /// An expired order was dropped
    OrderPruned {
        /// Dropped order
        trade_id: TradeId,
        /// Its expiry
        expiry: u64,
        /// Pruning time
        timestamp: u64,
    },
}

impl LiquidatorEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OrderRegistered { .. } => "OrderRegistered",
            Self::Reclaimed { .. } => "Reclaimed",
            Self::PoolFunded { .. } => "PoolFunded",
            Self::OrderPruned { .. } => "OrderPruned",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::OrderRegistered { timestamp, .. }
            | Self::Reclaimed { timestamp, .. }
            | Self::PoolFunded { timestamp, .. }
            | Self::OrderPruned { timestamp, .. } => *timestamp,
        }
    }

    /// Trade id the event refers to, if any
    pub fn trade_id(&self) -> Option<TradeId> {
        match self {
            Self::OrderRegistered { trade_id, .. }
            | Self::Reclaimed { trade_id, .. }
            | Self::OrderPruned { trade_id, .. } => Some(*trade_id),
            Self::PoolFunded { .. } => None,
        }
    }

    /// Compute event hash
    pub fn hash(&self) -> Hash {
        let data = bincode::serialize(self).unwrap_or_default();
        Hash::sha256(&data)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounded in-memory event history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<LiquidatorEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a log keeping at most `max_events`
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events: max_events.max(1),
        }
    }

    /// Record an event, dropping the oldest when full
    pub fn push(&mut self, event: LiquidatorEvent) {
        self.events.push_back(event);
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    /// Events currently held, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LiquidatorEvent> {
        self.events.iter()
    }

    /// Remove and return all held events
    pub fn drain(&mut self) -> Vec<LiquidatorEvent> {
        self.events.drain(..).collect()
    }

    /// Number of held events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(amount: u128) -> LiquidatorEvent {
        LiquidatorEvent::PoolFunded {
            from: Address::new([1; 20]),
            amount: Amount::from_units(amount),
            balance: Amount::from_units(amount),
            timestamp: 7,
        }
    }

    #[test]
    fn test_event_type_and_timestamp() {
        let event = funded(5);
        assert_eq!(event.event_type(), "PoolFunded");
        assert_eq!(event.timestamp(), 7);
        assert_eq!(event.trade_id(), None);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = EventLog::new(2);
        log.push(funded(1));
        log.push(funded(2));
        log.push(funded(3));

        let events = log.drain();
        assert_eq!(events, vec![funded(2), funded(3)]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_hash_differs() {
        assert_ne!(funded(1).hash(), funded(2).hash());
    }
}
