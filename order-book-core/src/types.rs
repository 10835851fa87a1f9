//! Value types crossing the order book's public boundary: [`Order`], the
//! [`Side`] it rests on, the [`ExternalUpdate`] events the dispatcher
//! accepts, and the [`Trade`]/[`TradeRequest`] results matching produces.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::units::{AssetUnit, Money};

/// The external order id assigned by the upstream exchange; unique within
/// one book.
pub type ExternalId = String;

/// Which side of the book an order rests on.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", value(rename_all = "lower"))]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// A buy order (bid) — willing to buy at the specified price or lower.
    Buy,
    /// A sell order (ask) — willing to sell at the specified price or higher.
    Sell,
}

impl Side {
    /// The opposite side, i.e. the side a crossing order matches against.
    pub const fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// A resting buy or sell intent.
///
/// Immutable once inserted except for `amount` (decremented by fills) and
/// `in_trade` (set while the order is part of an open, unsettled
/// [`TradeRequest`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub external_id: ExternalId,
    pub side: Side,
    pub price: Money,
    pub amount: AssetUnit,
    pub timestamp: DateTime<Utc>,
    /// True iff this order originated from the local broker's own users.
    pub mine: bool,
    /// True while this order is part of an open trade request not yet
    /// settled by a corresponding `traded` event.
    pub in_trade: bool,
}

impl Order {
    pub fn new(
        external_id: ExternalId,
        side: Side,
        price: Money,
        amount: AssetUnit,
        timestamp: DateTime<Utc>,
        mine: bool,
    ) -> Self {
        Order {
            external_id,
            side,
            price,
            amount,
            timestamp,
            mine,
            in_trade: false,
        }
    }

    /// True iff `self` has strict time priority over `other`. Ties fall
    /// through to insertion order, resolved by [`crate::price_level::PriceLevel`].
    pub fn earlier(&self, other: &Order) -> bool {
        self.timestamp < other.timestamp
    }
}

/// A produced intent to settle a specified quantity between a matched bid
/// and ask. No price is assigned here — the settlement layer decides,
/// typically using the resting order's price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    /// The `mine` order in the matched pair (buy, if both are `mine`).
    pub interested: Order,
    /// The other order in the matched pair.
    pub interest: Order,
    pub amount: AssetUnit,
}

/// A settled fill between two orders, as reported over the (out-of-scope)
/// settlement boundary. Kept separate from [`TradeRequest`] because a trade
/// request precedes settlement while a `Trade` records it.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
#[display("Trade: {amount} @ {price} (interested: {}, interest: {})", interested_id, interest_id)]
pub struct Trade {
    pub price: Money,
    pub amount: AssetUnit,
    pub interested_id: ExternalId,
    pub interest_id: ExternalId,
}

/// The action carried by an [`ExternalUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Added,
    Deleted,
    Traded,
}

/// The event record crossing the boundary from the exchange-orchestration
/// layer into the book (see the external interfaces section of the spec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUpdate {
    pub id: ExternalId,
    pub asset_id: String,
    pub price: Money,
    pub amount: AssetUnit,
    #[serde(rename = "type")]
    pub side: Side,
    pub timestamp: DateTime<Utc>,
    pub mine: bool,
    pub action: Action,
}

/// The response returned from the dispatcher, as it crosses the documented
/// external boundary (no `TradeRequest` here — that is handed to the caller
/// as a separate, in-process value for settlement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub buy_orders_count: i64,
    pub sell_orders_count: i64,
}
