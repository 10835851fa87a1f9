//! The update dispatcher (component C6): validates an [`ExternalUpdate`],
//! then routes it to the book under the book's lock.

use crate::error::ValidationError;
use crate::order_book::OrderBook;
use crate::types::{Action, ExternalUpdate, TradeRequest, WebhookResponse};

/// Bundles the documented wire-level [`WebhookResponse`] with the internal
/// [`TradeRequest`] a caller needs for settlement. Only `response` is meant
/// to cross the external boundary; `trade_request` stays in-process.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub response: WebhookResponse,
    pub trade_request: Option<TradeRequest>,
}

/// Validates and routes [`ExternalUpdate`]s into one [`OrderBook`].
pub struct UpdateDispatcher {
    book: OrderBook,
}

impl UpdateDispatcher {
    pub fn new(asset_id: impl Into<String>) -> Self {
        UpdateDispatcher { book: OrderBook::new(asset_id) }
    }

    pub fn from_book(book: OrderBook) -> Self {
        UpdateDispatcher { book }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Validates `update` against this book's asset id and the event's
    /// shape, then — for `added` events only — its price and amount. Never
    /// touches the book on failure.
    fn validate(&self, update: &ExternalUpdate) -> Result<(), ValidationError> {
        if update.asset_id.is_empty() {
            return Err(ValidationError::EmptyAssetId);
        }
        if update.asset_id != self.book.asset_id() {
            return Err(ValidationError::AssetIdMismatch {
                given: update.asset_id.clone(),
                expected: self.book.asset_id().to_string(),
            });
        }
        if update.id.is_empty() {
            return Err(ValidationError::EmptyExternalId);
        }
        if update.timestamp.timestamp_nanos_opt() == Some(0) {
            return Err(ValidationError::ZeroTimestamp);
        }
        if update.action == Action::Added {
            if !update.price.is_positive() {
                return Err(ValidationError::NonPositivePrice(update.price));
            }
            if !update.amount.is_positive() {
                return Err(ValidationError::NonPositiveAmount(update.amount));
            }
        }
        Ok(())
    }

    /// Validates `update`, then locks the book and routes it:
    /// `added` → `add_order`, `deleted` → `remove`, `traded` → `decrement`.
    pub fn dispatch(&self, update: ExternalUpdate) -> Result<DispatchOutcome, ValidationError> {
        self.validate(&update)?;

        let trade_request = match update.action {
            Action::Added => {
                let order = crate::types::Order::new(
                    update.id,
                    update.side,
                    update.price,
                    update.amount,
                    update.timestamp,
                    update.mine,
                );
                self.book.add_order(order)
            }
            Action::Deleted => {
                self.book.remove(&update.id);
                None
            }
            Action::Traded => {
                self.book.decrement(&update.id, update.amount);
                None
            }
        };

        let (buy_orders_count, sell_orders_count) = self.book.counts();
        Ok(DispatchOutcome {
            response: WebhookResponse { buy_orders_count, sell_orders_count },
            trade_request,
        })
    }
}
