//! Liquidation controller.
//!
//! The controller owns the pending order queue and the collateral pool and is
//! the only writer of either. It has two externally triggered transitions:
//!
//! - `register_order`: validate an order and queue it
//! - `reclaim`: settle a queued order against the pool's stake and forward
//!   the reward to an approved beneficiary
//!
//! Each transition runs to completion. A failing transition leaves the queue,
//! the pool, the ledger and the settlement engine exactly as they were.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::core::clock::Clock;
use crate::core::config::LiquidatorConfig;
use crate::core::journal::Journaled;
use crate::error::{Error, Result};
use crate::liquidation::events::{EventLog, LiquidatorEvent, OrderSummary};
use crate::liquidation::pool::CollateralPool;
use crate::liquidation::queue::PendingOrderQueue;
use crate::order::signature::verify_order;
use crate::order::types::{Order, TradeId};
use crate::registry::{AttributeRegistry, AuthorizationGate};
use crate::settlement::{SettlementEngine, SwapReceipt};
use crate::token::ledger::TokenLedger;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTED STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// The controller's persisted state: the pending queue and the pool balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidatorState {
    /// Pending orders
    pub queue: PendingOrderQueue,
    /// Staked collateral
    pub pool: CollateralPool,
}

impl LiquidatorState {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECLAIM RECEIPT
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of a successful reclaim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclaimReceipt {
    /// Consumed order
    pub trade_id: TradeId,
    /// Amount the caller asked for
    pub requested: Amount,
    /// Reward forwarded to the beneficiary
    pub proceeds: Amount,
    /// Stake paid out of the pool
    pub collateral: Amount,
    /// Recipient of the proceeds
    pub beneficiary: Address,
    /// What the settlement engine moved
    pub swap: SwapReceipt,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Liquidation controller
pub struct Liquidator<R, L, E, C> {
    config: LiquidatorConfig,
    gate: AuthorizationGate<R>,
    ledger: L,
    engine: E,
    clock: C,
    queue: PendingOrderQueue,
    pool: CollateralPool,
    events: EventLog,
}

impl<R, L, E, C> Liquidator<R, L, E, C>
where
    R: AttributeRegistry,
    L: TokenLedger + Journaled,
    E: SettlementEngine,
    C: Clock,
{
    /// Create a liquidator with an empty queue and pool
    pub fn new(config: LiquidatorConfig, registry: R, ledger: L, engine: E, clock: C) -> Result<Self> {
        config.validate().map_err(|e| Error::InvalidParameter {
            name: "config".into(),
            reason: e.to_string(),
        })?;

        let gate = AuthorizationGate::new(
            registry,
            &config.validator_attribute,
            &config.beneficiary_attribute,
        );
        let events = EventLog::new(config.max_events);

        Ok(Self {
            config,
            gate,
            ledger,
            engine,
            clock,
            queue: PendingOrderQueue::new(),
            pool: CollateralPool::new(),
            events,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Validate `order` and append it to the queue
    pub fn register_order(&mut self, order: Order) -> Result<TradeId> {
        let now = self.clock.now();

        let trade_id = match self.check_registration(&order, now) {
            Ok(()) => self.queue.append(order),
            Err(e) => Err(e),
        }
        .map_err(|e| {
            tracing::warn!("Order registration rejected: {}", e);
            e
        })?;

        let terms = &order.terms;
        tracing::info!(
            trade_id = %trade_id.short(),
            nonce = terms.nonce,
            signer_amount = %terms.signer.amount,
            sender_amount = %terms.sender.amount,
            "Order registered"
        );

        self.events.push(LiquidatorEvent::OrderRegistered {
            trade_id,
            order: OrderSummary {
                nonce: terms.nonce,
                expiry: terms.expiry,
                signer: terms.signer.wallet,
                signer_amount: terms.signer.amount,
                sender_amount: terms.sender.amount,
                validator: terms.validator,
            },
            timestamp: now,
        });

        Ok(trade_id)
    }

    /// Decode a wire record and register it
    pub fn register_encoded(&mut self, bytes: &[u8]) -> Result<TradeId> {
        let order = Order::decode(bytes)?;
        self.register_order(order)
    }

    fn check_registration(&self, order: &Order, now: u64) -> Result<()> {
        order.validate_structure()?;
        verify_order(order)?;

        let terms = &order.terms;
        if !self.gate.is_approved_validator(&terms.validator) {
            return Err(Error::UnauthorizedValidator(terms.validator.to_string()));
        }
        if order.is_expired(now) {
            return Err(Error::OrderExpired {
                expiry: terms.expiry,
                now,
            });
        }

        require_match("sender.wallet", &self.config.custody, &terms.sender.wallet)?;
        require_match("sender.token", &self.config.stake_token, &terms.sender.token)?;
        require_match("signer.token", &self.config.reward_token, &terms.signer.token)?;

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POOL FUNDING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Move `amount` of stake from `from` into custody and credit the pool
    pub fn fund_pool(&mut self, from: Address, amount: Amount) -> Result<Amount> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let mut pool = self.pool;
        pool.deposit(amount)?;
        self.ledger
            .transfer(self.config.stake_token, from, self.config.custody, amount)?;
        self.pool = pool;

        let balance = self.pool.balance();
        tracing::info!("Pool funded with {} by {}, balance {}", amount, from.short(), balance);

        self.events.push(LiquidatorEvent::PoolFunded {
            from,
            amount,
            balance,
            timestamp: self.clock.now(),
        });

        Ok(balance)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RECLAIM
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settle the most recent order covering `amount` and forward the proceeds
    ///
    /// Candidates are tried newest first. A candidate whose settlement fails
    /// is rolled back and the walk moves on to the next one; the last such
    /// failure is returned when no candidate settles.
    pub fn reclaim(&mut self, amount: Amount, beneficiary: Address) -> Result<ReclaimReceipt> {
        self.check_reclaim(amount, &beneficiary)?;
        let now = self.clock.now();

        let candidates: Vec<(TradeId, Order)> = self
            .queue
            .iter()
            .filter(|(trade_id, order)| match self.check_candidate(order, amount, now) {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", trade_id.short(), e);
                    false
                }
            })
            .map(|(trade_id, order)| (trade_id, *order))
            .collect();

        let mut last_failure = None;
        for (trade_id, order) in candidates {
            match self.settle(trade_id, order, amount, beneficiary, now) {
                Ok(receipt) => return Ok(receipt),
                Err(e @ Error::SettlementFailed(_)) => last_failure = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_failure.unwrap_or(Error::NoMatchingOrder {
            amount: amount.units(),
        }))
    }

    /// Settle a designated order covering `amount` and forward the proceeds
    pub fn reclaim_order(
        &mut self,
        trade_id: TradeId,
        amount: Amount,
        beneficiary: Address,
    ) -> Result<ReclaimReceipt> {
        self.check_reclaim(amount, &beneficiary)?;
        let now = self.clock.now();

        let order = *self.queue.lookup(&trade_id)?;
        self.check_candidate(&order, amount, now)?;
        self.settle(trade_id, order, amount, beneficiary, now)
    }

    fn check_reclaim(&self, amount: Amount, beneficiary: &Address) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        if !self.gate.is_approved_beneficiary(beneficiary) {
            return Err(Error::UnauthorizedBeneficiary(beneficiary.to_string()));
        }
        self.pool.ensure_covers(amount)
    }

    fn check_candidate(&self, order: &Order, amount: Amount, now: u64) -> Result<()> {
        let terms = &order.terms;
        if terms.signer.amount < amount {
            return Err(Error::NoMatchingOrder {
                amount: amount.units(),
            });
        }
        self.pool.ensure_covers(terms.sender.amount)?;
        if !self.gate.is_approved_validator(&terms.validator) {
            return Err(Error::UnauthorizedValidator(terms.validator.to_string()));
        }
        if self.config.recheck_expiry_on_reclaim && order.is_expired(now) {
            return Err(Error::OrderExpired {
                expiry: terms.expiry,
                now,
            });
        }
        Ok(())
    }

    fn settle(
        &mut self,
        trade_id: TradeId,
        order: Order,
        amount: Amount,
        beneficiary: Address,
        now: u64,
    ) -> Result<ReclaimReceipt> {
        let collateral = order.terms.sender.amount;
        let proceeds = order.terms.signer.amount;

        let mut pool = self.pool;
        pool.withdraw(collateral)?;

        let ledger_checkpoint = self.ledger.snapshot();
        let engine_checkpoint = self.engine.snapshot();

        let swap = match self.execute_settlement(&order, beneficiary, now) {
            Ok(swap) => swap,
            Err(e) => {
                self.ledger.restore(ledger_checkpoint);
                self.engine.restore(engine_checkpoint);
                tracing::warn!("Settlement of {} rolled back: {}", trade_id.short(), e);
                return Err(e);
            }
        };

        self.pool = pool;
        self.queue.remove(&trade_id);

        tracing::info!(
            "Reclaimed {} for {} via {}, pool balance {}",
            proceeds,
            beneficiary.short(),
            trade_id.short(),
            self.pool.balance()
        );

        self.events.push(LiquidatorEvent::Reclaimed {
            trade_id,
            amount,
            proceeds,
            collateral,
            beneficiary,
            timestamp: now,
        });

        Ok(ReclaimReceipt {
            trade_id,
            requested: amount,
            proceeds,
            collateral,
            beneficiary,
            swap,
        })
    }

    /// External calls of a reclaim; the caller unwinds them on error
    fn execute_settlement(
        &mut self,
        order: &Order,
        beneficiary: Address,
        now: u64,
    ) -> Result<SwapReceipt> {
        let custody = self.config.custody;
        let stake = self.config.stake_token;
        let reward = self.config.reward_token;
        let spender = self.engine.address();
        let terms = &order.terms;

        let reward_before = self.ledger.balance_of(reward, custody);

        self.ledger
            .approve(stake, custody, spender, terms.sender.amount)?;
        let swap = self
            .engine
            .execute_swap(order, &mut self.ledger, now)
            .map_err(|e| match e {
                Error::SettlementFailed(_) => e,
                other => Error::SettlementFailed(other.to_string()),
            })?;
        self.ledger.approve(stake, custody, spender, Amount::ZERO)?;

        let reward_after = self.ledger.balance_of(reward, custody);
        let received = reward_after.checked_sub(reward_before).ok();
        if received != Some(terms.signer.amount) {
            return Err(Error::SettlementFailed(format!(
                "custody received {:?} of {} reward",
                received.map(|a| a.units()),
                terms.signer.amount
            )));
        }

        self.ledger
            .transfer(reward, custody, beneficiary, terms.signer.amount)?;

        Ok(swap)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MAINTENANCE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Drop every order whose expiry has elapsed
    pub fn prune_expired(&mut self) -> Vec<TradeId> {
        let now = self.clock.now();
        let expired = self.queue.expired(now);

        for trade_id in &expired {
            if let Some(order) = self.queue.remove(trade_id) {
                tracing::info!("Pruned expired order {}", trade_id.short());
                self.events.push(LiquidatorEvent::OrderPruned {
                    trade_id: *trade_id,
                    expiry: order.expiry(),
                    timestamp: now,
                });
            }
        }

        expired
    }

    /// Check that custody holds at least the pool's staked balance
    pub fn verify_custody(&self) -> Result<()> {
        let held = self
            .ledger
            .balance_of(self.config.stake_token, self.config.custody);
        if held < self.pool.balance() {
            return Err(Error::InvariantViolation(format!(
                "pool balance {} exceeds custody balance {}",
                self.pool.balance(),
                held
            )));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PERSISTENCE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Capture the persisted state
    pub fn state(&self) -> LiquidatorState {
        LiquidatorState {
            queue: self.queue.clone(),
            pool: self.pool,
        }
    }

    /// Replace the queue and pool with a previously captured state
    pub fn restore(&mut self, state: LiquidatorState) {
        tracing::info!(
            "Restored {} pending order(s), pool balance {}",
            state.queue.len(),
            state.pool.balance()
        );
        self.queue = state.queue;
        self.pool = state.pool;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration
    pub fn config(&self) -> &LiquidatorConfig {
        &self.config
    }

    /// Pending order queue
    pub fn queue(&self) -> &PendingOrderQueue {
        &self.queue
    }

    /// Staked collateral held by the pool
    pub fn pool_balance(&self) -> Amount {
        self.pool.balance()
    }

    /// Authorization gate
    pub fn gate(&self) -> &AuthorizationGate<R> {
        &self.gate
    }

    /// Token ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable token ledger, for funding counterparties
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Settlement engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable settlement engine, for signer-side cancellations
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Time source
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Events emitted since the last drain, oldest first
    pub fn events(&self) -> impl Iterator<Item = &LiquidatorEvent> {
        self.events.iter()
    }

    /// Remove and return emitted events
    pub fn take_events(&mut self) -> Vec<LiquidatorEvent> {
        self.events.drain()
    }
}

fn require_match(field: &str, expected: &Address, got: &Address) -> Result<()> {
    if expected != got {
        return Err(Error::OrderMismatch {
            field: field.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::order::signature::sign_order;
    use crate::order::types::{OrderTerms, Party, SignatureVersion};
    use crate::registry::InMemoryRegistry;
    use crate::settlement::SwapEngine;
    use crate::token::ledger::InMemoryLedger;
    use crate::utils::constants::{APPROVED_BENEFICIARY_ATTRIBUTE, IS_VALIDATOR_ATTRIBUTE};
    use crate::utils::crypto::KeyPair;
    use std::sync::Arc;

    const CUSTODY: Address = Address::new([0xc0; 20]);
    const STAKE: Address = Address::new([0x51; 20]);
    const REWARD: Address = Address::new([0x52; 20]);
    const VALIDATOR: Address = Address::new([0x56; 20]);
    const FUNDER: Address = Address::new([0xf0; 20]);
    const BENEFICIARY: Address = Address::new([0xbe; 20]);

    type TestLiquidator =
        Liquidator<Arc<InMemoryRegistry>, InMemoryLedger, SwapEngine, Arc<ManualClock>>;

    struct Fixture {
        liquidator: TestLiquidator,
        registry: Arc<InMemoryRegistry>,
        clock: Arc<ManualClock>,
        maker: KeyPair,
    }

    fn units(n: u128) -> Amount {
        Amount::from_units(n)
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRegistry::new());
        registry.grant(VALIDATOR, IS_VALIDATOR_ATTRIBUTE);
        registry.grant(BENEFICIARY, APPROVED_BENEFICIARY_ATTRIBUTE);

        let clock = Arc::new(ManualClock::new(1_000));
        let maker = KeyPair::generate();

        let mut ledger = InMemoryLedger::new();
        ledger.mint(STAKE, FUNDER, units(10_000)).unwrap();
        ledger.mint(REWARD, maker.address(), units(10_000)).unwrap();
        ledger
            .approve(REWARD, maker.address(), VALIDATOR, units(10_000))
            .unwrap();

        let liquidator = Liquidator::new(
            LiquidatorConfig::new(CUSTODY, STAKE, REWARD),
            registry.clone(),
            ledger,
            SwapEngine::new(VALIDATOR),
            clock.clone(),
        )
        .unwrap();

        Fixture {
            liquidator,
            registry,
            clock,
            maker,
        }
    }

    fn order(maker: &KeyPair, nonce: u64, signer_amount: u128, sender_amount: u128) -> Order {
        let terms = OrderTerms::new(
            nonce,
            2_000,
            VALIDATOR,
            Party::erc20(maker.address(), REWARD, units(signer_amount)),
            Party::erc20(CUSTODY, STAKE, units(sender_amount)),
        );
        sign_order(terms, maker, SignatureVersion::Structured)
    }

    #[test]
    fn test_register_order() {
        let mut f = fixture();
        let order = order(&f.maker, 0, 100, 100);

        let trade_id = f.liquidator.register_order(order).unwrap();

        assert_eq!(f.liquidator.queue().head(), Some(trade_id));
        assert_eq!(f.liquidator.queue().lookup(&trade_id).unwrap(), &order);

        let events = f.liquidator.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "OrderRegistered");
        assert_eq!(events[0].trade_id(), Some(trade_id));
    }

    #[test]
    fn test_register_rejects_unapproved_validator() {
        let mut f = fixture();
        f.registry.revoke(VALIDATOR, IS_VALIDATOR_ATTRIBUTE);

        let err = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap_err();
        assert!(matches!(err, Error::UnauthorizedValidator(_)));
        assert!(f.liquidator.queue().is_empty());
        assert!(f.liquidator.take_events().is_empty());
    }

    #[test]
    fn test_register_rejects_expired() {
        let mut f = fixture();
        f.clock.set(2_000);

        let err = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap_err();
        assert_eq!(err, Error::OrderExpired { expiry: 2_000, now: 2_000 });
    }

    #[test]
    fn test_register_rejects_wrong_custody_and_assets() {
        let mut f = fixture();
        let base = order(&f.maker, 0, 100, 100).terms;

        let mut wrong_wallet = base;
        wrong_wallet.sender.wallet = FUNDER;
        let mut wrong_stake = base;
        wrong_stake.sender.token = REWARD;
        let mut wrong_reward = base;
        wrong_reward.signer.token = STAKE;

        for (terms, field) in [
            (wrong_wallet, "sender.wallet"),
            (wrong_stake, "sender.token"),
            (wrong_reward, "signer.token"),
        ] {
            let signed = sign_order(terms, &f.maker, SignatureVersion::Structured);
            match f.liquidator.register_order(signed) {
                Err(Error::OrderMismatch { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected mismatch on {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_register_rejects_forged_signature() {
        let mut f = fixture();
        let mut forged = order(&f.maker, 0, 100, 100);
        forged.signatory = KeyPair::generate().address();

        let err = f.liquidator.register_order(forged).unwrap_err();
        assert!(matches!(err, Error::SignerMismatch { .. }));
    }

    #[test]
    fn test_fund_pool() {
        let mut f = fixture();
        let balance = f.liquidator.fund_pool(FUNDER, units(300)).unwrap();

        assert_eq!(balance, units(300));
        assert_eq!(f.liquidator.ledger().balance_of(STAKE, CUSTODY), units(300));
        assert!(f.liquidator.verify_custody().is_ok());

        let err = f.liquidator.fund_pool(FUNDER, units(1_000_000)).unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));
        assert_eq!(f.liquidator.pool_balance(), units(300));
    }

    #[test]
    fn test_reclaim_settles_head() {
        let mut f = fixture();
        let trade_id = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();

        let receipt = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap();

        assert_eq!(receipt.trade_id, trade_id);
        assert_eq!(f.liquidator.pool_balance(), Amount::ZERO);
        assert!(!f.liquidator.queue().contains(&trade_id));
        assert_eq!(f.liquidator.ledger().balance_of(REWARD, BENEFICIARY), units(100));
        assert_eq!(f.liquidator.ledger().balance_of(STAKE, f.maker.address()), units(100));
        assert!(f.liquidator.verify_custody().is_ok());
    }

    #[test]
    fn test_reclaim_skips_orders_that_cannot_cover() {
        let mut f = fixture();
        let large = f.liquidator.register_order(order(&f.maker, 0, 500, 100)).unwrap();
        let small = f.liquidator.register_order(order(&f.maker, 1, 50, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(500)).unwrap();

        let receipt = f.liquidator.reclaim(units(200), BENEFICIARY).unwrap();

        assert_eq!(receipt.trade_id, large);
        assert_eq!(receipt.proceeds, units(500));
        assert_eq!(f.liquidator.queue().head(), Some(small));
    }

    #[test]
    fn test_reclaim_moves_past_order_that_fails_to_settle() {
        let mut f = fixture();
        let funded = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        // validly signed, but the wallet holds no reward and approved nothing
        let unfunded_key = KeyPair::generate();
        let unfunded = f
            .liquidator
            .register_order(order(&unfunded_key, 0, 100, 100))
            .unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();
        assert_eq!(f.liquidator.queue().head(), Some(unfunded));

        let receipt = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap();

        assert_eq!(receipt.trade_id, funded);
        assert_eq!(f.liquidator.queue().head(), Some(unfunded));
        assert_eq!(f.liquidator.queue().len(), 1);
        assert_eq!(f.liquidator.pool_balance(), Amount::ZERO);
        assert_eq!(f.liquidator.ledger().balance_of(REWARD, BENEFICIARY), units(100));
        assert_eq!(
            f.liquidator.ledger().balance_of(STAKE, unfunded_key.address()),
            Amount::ZERO
        );
        assert!(f
            .liquidator
            .engine()
            .is_nonce_available(&unfunded_key.address(), 0));
    }

    #[test]
    fn test_reclaim_order_settles_designated_non_head() {
        let mut f = fixture();
        let first = f.liquidator.register_order(order(&f.maker, 0, 100, 60)).unwrap();
        let second = f.liquidator.register_order(order(&f.maker, 1, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(200)).unwrap();
        assert_eq!(f.liquidator.queue().head(), Some(second));

        let receipt = f
            .liquidator
            .reclaim_order(first, units(100), BENEFICIARY)
            .unwrap();

        assert_eq!(receipt.trade_id, first);
        assert_eq!(receipt.collateral, units(60));
        assert!(!f.liquidator.queue().contains(&first));
        assert_eq!(f.liquidator.queue().head(), Some(second));
        assert_eq!(f.liquidator.queue().len(), 1);
        assert_eq!(f.liquidator.pool_balance(), units(140));
        assert_eq!(f.liquidator.ledger().balance_of(STAKE, CUSTODY), units(140));
        assert!(f.liquidator.verify_custody().is_ok());
    }

    #[test]
    fn test_reclaim_unauthorized_beneficiary() {
        let mut f = fixture();
        f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();

        let err = f.liquidator.reclaim(units(100), FUNDER).unwrap_err();
        assert!(matches!(err, Error::UnauthorizedBeneficiary(_)));
        assert_eq!(f.liquidator.pool_balance(), units(100));
        assert_eq!(f.liquidator.queue().len(), 1);
    }

    #[test]
    fn test_reclaim_insufficient_collateral() {
        let mut f = fixture();
        f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(50)).unwrap();

        let err = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap_err();
        assert_eq!(err, Error::InsufficientCollateral { required: 100, available: 50 });
    }

    #[test]
    fn test_reclaim_no_matching_order() {
        let mut f = fixture();
        f.liquidator.register_order(order(&f.maker, 0, 10, 10)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();

        let err = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap_err();
        assert_eq!(err, Error::NoMatchingOrder { amount: 100 });
    }

    #[test]
    fn test_reclaim_rolls_back_on_settlement_failure() {
        let mut f = fixture();
        let trade_id = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();
        f.liquidator.engine_mut().cancel(f.maker.address(), &[0]);

        let ledger_before = f.liquidator.ledger().clone();
        let state_before = f.liquidator.state();
        f.liquidator.take_events();

        let err = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap_err();

        assert!(matches!(err, Error::SettlementFailed(_)));
        assert!(err.is_retryable());
        assert_eq!(f.liquidator.state(), state_before);
        assert_eq!(f.liquidator.ledger(), &ledger_before);
        assert!(f.liquidator.queue().contains(&trade_id));
        assert!(f.liquidator.take_events().is_empty());
    }

    #[test]
    fn test_reclaim_rolls_back_when_maker_allowance_missing() {
        let mut f = fixture();
        let maker = f.maker.address();
        f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();
        f.liquidator
            .ledger_mut()
            .approve(REWARD, maker, VALIDATOR, Amount::ZERO)
            .unwrap();

        let ledger_before = f.liquidator.ledger().clone();
        let err = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap_err();

        assert!(matches!(err, Error::SettlementFailed(_)));
        // the stake leg moved before the reward leg failed and must be unwound
        assert_eq!(f.liquidator.ledger(), &ledger_before);
        assert_eq!(f.liquidator.pool_balance(), units(100));
        assert!(f.liquidator.engine().is_nonce_available(&maker, 0));
    }

    #[test]
    fn test_reclaim_rechecks_expiry() {
        let mut f = fixture();
        let trade_id = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();
        f.clock.set(2_000);

        let err = f.liquidator.reclaim(units(100), BENEFICIARY).unwrap_err();
        assert_eq!(err, Error::NoMatchingOrder { amount: 100 });

        let err = f
            .liquidator
            .reclaim_order(trade_id, units(100), BENEFICIARY)
            .unwrap_err();
        assert_eq!(err, Error::OrderExpired { expiry: 2_000, now: 2_000 });
        assert!(f.liquidator.queue().contains(&trade_id));
    }

    #[test]
    fn test_reclaim_rechecks_validator_approval() {
        let mut f = fixture();
        let trade_id = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();
        f.registry.revoke(VALIDATOR, IS_VALIDATOR_ATTRIBUTE);

        let err = f
            .liquidator
            .reclaim_order(trade_id, units(100), BENEFICIARY)
            .unwrap_err();
        assert!(matches!(err, Error::UnauthorizedValidator(_)));
    }

    #[test]
    fn test_reclaim_order_unknown_trade_id() {
        let mut f = fixture();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();
        let missing = order(&f.maker, 9, 100, 100).trade_id();

        let err = f
            .liquidator
            .reclaim_order(missing, units(100), BENEFICIARY)
            .unwrap_err();
        assert!(matches!(err, Error::OrderNotFound(_)));
    }

    #[test]
    fn test_prune_expired() {
        let mut f = fixture();
        let trade_id = f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.take_events();
        f.clock.advance(5_000);

        assert_eq!(f.liquidator.prune_expired(), vec![trade_id]);
        assert!(f.liquidator.queue().is_empty());

        let events = f.liquidator.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "OrderPruned");
    }

    #[test]
    fn test_state_roundtrip() {
        let mut f = fixture();
        f.liquidator.register_order(order(&f.maker, 0, 100, 100)).unwrap();
        f.liquidator.register_order(order(&f.maker, 1, 100, 100)).unwrap();
        f.liquidator.fund_pool(FUNDER, units(100)).unwrap();

        let bytes = f.liquidator.state().to_bytes().unwrap();
        let state = LiquidatorState::from_bytes(&bytes).unwrap();
        assert_eq!(state, f.liquidator.state());

        let mut other = fixture();
        other.liquidator.restore(state);
        let ids: Vec<_> = other.liquidator.queue().iter().map(|(id, _)| id).collect();
        let expected: Vec<_> = f.liquidator.queue().iter().map(|(id, _)| id).collect();
        assert_eq!(ids, expected);
        assert_eq!(other.liquidator.pool_balance(), units(100));
    }
}
