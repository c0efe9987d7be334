//! Pending order queue.
//!
//! Registered orders are kept in insertion order as a linked list keyed by
//! trade id: `head` is the most recently registered order and `next` walks
//! toward older entries. Entries live in a map and link to each other by
//! trade id, so insertion and removal are O(1) and there are no pointer
//! cycles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::order::types::{Order, TradeId};

/// One queued order and its neighbours
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    order: Order,
    /// Older neighbour
    next: Option<TradeId>,
    /// Newer neighbour
    prev: Option<TradeId>,
}

/// Insertion-ordered set of pending orders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingOrderQueue {
    entries: HashMap<TradeId, Entry>,
    head: Option<TradeId>,
}

impl PendingOrderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `order` at the head
    pub fn append(&mut self, order: Order) -> Result<TradeId> {
        let trade_id = order.trade_id();
        if self.entries.contains_key(&trade_id) {
            return Err(Error::DuplicateOrder(trade_id.to_hex()));
        }

        if let Some(old_head) = self.head {
            if let Some(entry) = self.entries.get_mut(&old_head) {
                entry.prev = Some(trade_id);
            }
        }

        self.entries.insert(
            trade_id,
            Entry {
                order,
                next: self.head,
                prev: None,
            },
        );
        self.head = Some(trade_id);

        Ok(trade_id)
    }

    /// Unlink an entry; absent ids are ignored
    pub fn remove(&mut self, trade_id: &TradeId) -> Option<Order> {
        let entry = self.entries.remove(trade_id)?;

        match entry.prev {
            Some(prev) => {
                if let Some(newer) = self.entries.get_mut(&prev) {
                    newer.next = entry.next;
                }
            }
            None => self.head = entry.next,
        }

        if let Some(next) = entry.next {
            if let Some(older) = self.entries.get_mut(&next) {
                older.prev = entry.prev;
            }
        }

        Some(entry.order)
    }

    /// Look up a pending order
    pub fn lookup(&self, trade_id: &TradeId) -> Result<&Order> {
        self.get(trade_id)
            .ok_or_else(|| Error::OrderNotFound(trade_id.to_hex()))
    }

    /// Get a pending order if present
    pub fn get(&self, trade_id: &TradeId) -> Option<&Order> {
        self.entries.get(trade_id).map(|entry| &entry.order)
    }

    /// Check whether a trade id is pending
    pub fn contains(&self, trade_id: &TradeId) -> bool {
        self.entries.contains_key(trade_id)
    }

    /// Most recently registered trade id
    pub fn head(&self) -> Option<TradeId> {
        self.head
    }

    /// Next older trade id after `trade_id`
    pub fn next(&self, trade_id: &TradeId) -> Option<TradeId> {
        self.entries.get(trade_id).and_then(|entry| entry.next)
    }

    /// Walk from head, most recent first
    pub fn iter(&self) -> QueueIter<'_> {
        QueueIter {
            queue: self,
            cursor: self.head,
        }
    }

    /// Number of pending orders
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trade ids of orders expired at `now`, most recent first
    pub fn expired(&self, now: u64) -> Vec<TradeId> {
        self.iter()
            .filter(|(_, order)| order.is_expired(now))
            .map(|(trade_id, _)| trade_id)
            .collect()
    }

    /// Orders oldest first, so that appending them in sequence rebuilds this queue
    pub fn to_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.iter().map(|(_, order)| *order).collect();
        orders.reverse();
        orders
    }

    /// Rebuild a queue from orders listed oldest first
    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Result<Self> {
        let mut queue = Self::new();
        for order in orders {
            queue.append(order)?;
        }
        Ok(queue)
    }
}

/// Iterator over a [`PendingOrderQueue`], most recent first
pub struct QueueIter<'a> {
    queue: &'a PendingOrderQueue,
    cursor: Option<TradeId>,
}

impl<'a> Iterator for QueueIter<'a> {
    type Item = (TradeId, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        let trade_id = self.cursor?;
        let entry = self.queue.entries.get(&trade_id)?;
        self.cursor = entry.next;
        Some((trade_id, &entry.order))
    }
}

impl Serialize for PendingOrderQueue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_orders().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PendingOrderQueue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let orders = Vec::<Order>::deserialize(deserializer)?;
        Self::from_orders(orders).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::Amount;
    use crate::order::types::{OrderTerms, Party, Signature};
    use crate::utils::crypto::Address;

    fn order(nonce: u64, expiry: u64) -> Order {
        Order {
            terms: OrderTerms::new(
                nonce,
                expiry,
                Address::new([0xaa; 20]),
                Party::erc20(Address::new([1; 20]), Address::new([2; 20]), Amount::from_units(100)),
                Party::erc20(Address::new([3; 20]), Address::new([4; 20]), Amount::from_units(200)),
            ),
            signatory: Address::new([1; 20]),
            signature: Signature {
                version: 0x01,
                v: 27,
                r: [1; 32],
                s: [1; 32],
            },
        }
    }

    fn ids(queue: &PendingOrderQueue) -> Vec<TradeId> {
        queue.iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn test_append_links_newest_first() {
        let mut queue = PendingOrderQueue::new();
        let a = queue.append(order(1, 100)).unwrap();
        let b = queue.append(order(2, 100)).unwrap();

        assert_eq!(queue.head(), Some(b));
        assert_eq!(queue.next(&b), Some(a));
        assert_eq!(queue.next(&a), None);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected_without_change() {
        let mut queue = PendingOrderQueue::new();
        queue.append(order(1, 100)).unwrap();
        let before = queue.clone();

        let err = queue.append(order(1, 100)).unwrap_err();
        assert!(matches!(err, Error::DuplicateOrder(_)));
        assert_eq!(queue, before);
    }

    #[test]
    fn test_remove_relinks_neighbours() {
        let mut queue = PendingOrderQueue::new();
        let a = queue.append(order(1, 100)).unwrap();
        let b = queue.append(order(2, 100)).unwrap();
        let c = queue.append(order(3, 100)).unwrap();

        assert!(queue.remove(&b).is_some());
        assert_eq!(ids(&queue), vec![c, a]);

        assert!(queue.remove(&c).is_some());
        assert_eq!(queue.head(), Some(a));

        assert!(queue.remove(&a).is_some());
        assert_eq!(queue.head(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut queue = PendingOrderQueue::new();
        let a = queue.append(order(1, 100)).unwrap();
        queue.remove(&a);

        let before = queue.clone();
        assert!(queue.remove(&a).is_none());
        assert_eq!(queue, before);
    }

    #[test]
    fn test_lookup() {
        let mut queue = PendingOrderQueue::new();
        let a = queue.append(order(1, 100)).unwrap();

        assert_eq!(queue.lookup(&a).unwrap().nonce(), 1);
        queue.remove(&a);
        assert!(matches!(queue.lookup(&a), Err(Error::OrderNotFound(_))));
    }

    #[test]
    fn test_expired_listing() {
        let mut queue = PendingOrderQueue::new();
        let stale = queue.append(order(1, 50)).unwrap();
        queue.append(order(2, 500)).unwrap();

        assert_eq!(queue.expired(100), vec![stale]);
        assert!(queue.expired(10).is_empty());
    }

    #[test]
    fn test_rebuild_preserves_traversal() {
        let mut queue = PendingOrderQueue::new();
        for nonce in 0..5 {
            queue.append(order(nonce, 100)).unwrap();
        }
        let middle = queue.next(&queue.head().unwrap()).unwrap();
        queue.remove(&middle);

        let rebuilt = PendingOrderQueue::from_orders(queue.to_orders()).unwrap();
        assert_eq!(ids(&rebuilt), ids(&queue));

        let bytes = bincode::serialize(&queue).unwrap();
        let decoded: PendingOrderQueue = bincode::deserialize(&bytes).unwrap();
        assert_eq!(ids(&decoded), ids(&queue));
    }
}
