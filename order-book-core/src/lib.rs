//! # Order Book Core
//!
//! The matching-engine core of a single-asset limit order book: an
//! in-memory book that keeps buy/sell intents ordered by price-time
//! priority, matches crossing orders, and emits trade requests for an
//! external settlement layer. No durable storage, no multi-asset
//! multiplexing, no wallet accounting, no network transport — those are
//! external collaborators.
//!
//! ## Example
//!
//! ```rust
//! use order_book_core::{ExternalUpdate, Action, Side, UpdateDispatcher};
//! use order_book_core::units::{Money, AssetUnit};
//! use chrono::Utc;
//! use std::str::FromStr;
//!
//! let dispatcher = UpdateDispatcher::new("BTC");
//!
//! let update = ExternalUpdate {
//!     id: "order-1".to_string(),
//!     asset_id: "BTC".to_string(),
//!     price: Money::from_str("10000").unwrap(),
//!     amount: AssetUnit::from_str("1").unwrap(),
//!     side: Side::Buy,
//!     timestamp: Utc::now(),
//!     mine: true,
//!     action: Action::Added,
//! };
//!
//! let outcome = dispatcher.dispatch(update).unwrap();
//! assert_eq!(outcome.response.buy_orders_count, 1);
//! assert!(outcome.trade_request.is_none());
//! ```

#[cfg(test)]
mod acceptance;
mod dispatcher;
pub mod error;
#[cfg(test)]
mod invariants;
mod matching;
pub mod order_book;
mod price_level;
pub mod types;
pub mod units;

pub use dispatcher::{DispatchOutcome, UpdateDispatcher};
pub use error::ValidationError;
pub use order_book::OrderBook;
pub use types::{Action, ExternalId, ExternalUpdate, Order, Side, Trade, TradeRequest, WebhookResponse};
