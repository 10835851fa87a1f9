//! The order book itself (component C4): a pair of side ladders for one
//! asset, a global external-id → order index, and a single exclusion mutex
//! covering every public operation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::matching;
use crate::price_level::{NodeKey, PriceLevel};
use crate::types::{ExternalId, Order, Side, TradeRequest};
use crate::units::{AssetUnit, Money};

/// Where a resting order lives, so `decrement`/`remove` find it in O(1).
#[derive(Debug, Clone, Copy)]
struct OrderLocation {
    side: Side,
    price: Money,
    key: NodeKey,
}

/// The book's interior state, guarded by [`OrderBook`]'s mutex. `pub(crate)`
/// fields because [`crate::matching::try_match`] operates on them directly
/// while already holding the lock.
pub(crate) struct BookInner {
    pub(crate) buy_side: BTreeMap<Money, PriceLevel>,
    pub(crate) sell_side: BTreeMap<Money, PriceLevel>,
    id_index: HashMap<ExternalId, OrderLocation>,
}

impl BookInner {
    fn new() -> Self {
        BookInner {
            buy_side: BTreeMap::new(),
            sell_side: BTreeMap::new(),
            id_index: HashMap::new(),
        }
    }

    fn ladder(&mut self, side: Side) -> &mut BTreeMap<Money, PriceLevel> {
        match side {
            Side::Buy => &mut self.buy_side,
            Side::Sell => &mut self.sell_side,
        }
    }

    fn ladder_ref(&self, side: Side) -> &BTreeMap<Money, PriceLevel> {
        match side {
            Side::Buy => &self.buy_side,
            Side::Sell => &self.sell_side,
        }
    }

    /// Inserts `order`, creating its price level if this is the first order
    /// resting at that price on that side.
    fn insert_order(&mut self, order: Order) {
        let side = order.side;
        let price = order.price;
        let external_id = order.external_id.clone();
        let level = self.ladder(side).entry(price).or_insert_with(PriceLevel::new);
        let key = level.insert(order);
        self.id_index.insert(external_id, OrderLocation { side, price, key });
    }

    /// Removes the order identified by `external_id`, dropping its price
    /// level if that was the last order resting there. No-op if unknown.
    fn remove_order(&mut self, external_id: &str) -> Option<Order> {
        let location = self.id_index.remove(external_id)?;
        let ladder = self.ladder(location.side);
        let level = ladder.get_mut(&location.price).expect("id_index location must match a live level");
        let order = level.remove(location.key);
        if level.is_empty() {
            ladder.remove(&location.price);
        }
        Some(order)
    }

    /// Applies a `traded` decrement: clears `in_trade`, subtracts `delta`
    /// from the order's amount, and removes the order (and its level, if
    /// emptied) once the remaining amount drops to zero or below. No-op if
    /// unknown.
    fn decrement_order(&mut self, external_id: &str, delta: AssetUnit) {
        let Some(location) = self.id_index.get(external_id).copied() else {
            tracing::debug!(external_id, "traded event for unknown order id, ignored");
            return;
        };

        let remaining = {
            let ladder = self.ladder(location.side);
            let level = ladder.get_mut(&location.price).expect("id_index location must match a live level");
            let order = level.get_mut(location.key);
            order.in_trade = false;
            order.amount - delta
        };

        if remaining.raw() <= 0 {
            self.remove_order(external_id);
        } else {
            let ladder = self.ladder(location.side);
            let level = ladder.get_mut(&location.price).expect("id_index location must match a live level");
            level.set_amount(location.key, remaining);
        }
    }

    fn counts(&self) -> (i64, i64) {
        let buy = self.buy_side.values().map(|l| l.orders_count()).sum();
        let sell = self.sell_side.values().map(|l| l.orders_count()).sum();
        (buy, sell)
    }

    /// Best-first snapshot of the resting orders on `side`.
    fn snapshot(&self, side: Side) -> Vec<Order> {
        let ladder = self.ladder_ref(side);
        let levels: Box<dyn Iterator<Item = &PriceLevel>> = match side {
            Side::Buy => Box::new(ladder.values().rev()),
            Side::Sell => Box::new(ladder.values()),
        };
        levels.flat_map(|level| level.iter().cloned()).collect()
    }

    fn best(&self, side: Side) -> Option<(Money, AssetUnit)> {
        let ladder = self.ladder_ref(side);
        let (price, level) = match side {
            Side::Buy => ladder.iter().next_back(),
            Side::Sell => ladder.iter().next(),
        }?;
        Some((*price, level.amount_sum()))
    }

    fn depth(&self, side: Side, levels: usize) -> Vec<(Money, AssetUnit)> {
        let ladder = self.ladder_ref(side);
        let iter: Box<dyn Iterator<Item = (&Money, &PriceLevel)>> = match side {
            Side::Buy => Box::new(ladder.iter().rev()),
            Side::Sell => Box::new(ladder.iter()),
        };
        iter.take(levels).map(|(price, level)| (*price, level.amount_sum())).collect()
    }
}

/// A limit order book for a single asset.
///
/// Every public operation acquires the book's mutex for its entire body
/// (§5: single-threaded logical execution per book, enforced by an
/// exclusive mutex). A poisoned lock is not recovered from — it propagates
/// as a panic, matching the "fatal; abort the process" policy for internal
/// invariant violations.
pub struct OrderBook {
    asset_id: String,
    inner: Mutex<BookInner>,
}

impl OrderBook {
    pub fn new(asset_id: impl Into<String>) -> Self {
        OrderBook {
            asset_id: asset_id.into(),
            inner: Mutex::new(BookInner::new()),
        }
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Inserts `order` and runs the matching policy.
    ///
    /// A duplicate `external_id` is a silent no-op (idempotence under event
    /// replay, §5) and never returns a match.
    pub fn add_order(&self, order: Order) -> Option<TradeRequest> {
        let mut inner = self.inner.lock().expect("order book mutex poisoned");
        if inner.id_index.contains_key(&order.external_id) {
            tracing::debug!(external_id = %order.external_id, "duplicate add_order id, no-op");
            return None;
        }
        inner.insert_order(order);
        matching::try_match(&mut inner)
    }

    /// Applies a `traded` partial/full fill. No-op if `external_id` is
    /// unknown.
    pub fn decrement(&self, external_id: &str, delta: AssetUnit) {
        let mut inner = self.inner.lock().expect("order book mutex poisoned");
        inner.decrement_order(external_id, delta);
    }

    /// Cancels/removes an order. No-op if `external_id` is unknown.
    pub fn remove(&self, external_id: &str) {
        let mut inner = self.inner.lock().expect("order book mutex poisoned");
        inner.remove_order(external_id);
    }

    /// Best-first snapshot of resting buy orders. A by-value copy — callers
    /// may hold it indefinitely without affecting the live book.
    pub fn buy_snapshot(&self) -> Vec<Order> {
        let inner = self.inner.lock().expect("order book mutex poisoned");
        inner.snapshot(Side::Buy)
    }

    /// Best-first snapshot of resting sell orders.
    pub fn sell_snapshot(&self) -> Vec<Order> {
        let inner = self.inner.lock().expect("order book mutex poisoned");
        inner.snapshot(Side::Sell)
    }

    /// `(buy_count, sell_count)` of currently resting orders.
    pub fn counts(&self) -> (i64, i64) {
        let inner = self.inner.lock().expect("order book mutex poisoned");
        inner.counts()
    }

    /// Best price and aggregate quantity resting at it, for `side`.
    pub fn best(&self, side: Side) -> Option<(Money, AssetUnit)> {
        let inner = self.inner.lock().expect("order book mutex poisoned");
        inner.best(side)
    }

    /// Up to `levels` price levels on `side`, best first, as
    /// `(price, aggregate_quantity)` pairs.
    pub fn depth(&self, side: Side, levels: usize) -> Vec<(Money, AssetUnit)> {
        let inner = self.inner.lock().expect("order book mutex poisoned");
        inner.depth(side, levels)
    }

    /// Manually clears the `in_trade` flag on a resting order.
    ///
    /// This crate does not run a recovery timer for orders stuck `in_trade`
    /// after a lost settlement (crash between match and the corresponding
    /// `traded` event) — see the Open Questions resolution in `DESIGN.md`.
    /// An operator calls this only after confirming out of band that the
    /// matched trade was lost. Returns `false` if `external_id` is unknown.
    pub fn reset_in_trade(&self, external_id: &str) -> bool {
        let mut inner = self.inner.lock().expect("order book mutex poisoned");
        let Some(&location) = inner.id_index.get(external_id) else {
            return false;
        };
        let ladder = inner.ladder(location.side);
        let level = ladder.get_mut(&location.price).expect("id_index location must match a live level");
        level.get_mut(location.key).in_trade = false;
        true
    }
}
