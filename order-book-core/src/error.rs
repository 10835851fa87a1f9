//! Error taxonomy for the order book boundary.
//!
//! [`ValidationError`] is the only error type that crosses the public API:
//! it covers malformed or inconsistent [`crate::types::ExternalUpdate`]s and
//! is caller-recoverable (surfaced by an embedding HTTP layer as a 400).
//! Invariant violations inside the book (an order whose `Side` cannot exist,
//! a matched pair whose heads vanish mid-match) are programming errors and
//! are not represented as a `Result` variant at all — they `panic!`, because
//! continuing with a corrupted book is worse than aborting. Unknown-id
//! operations (`deleted`/`traded` for an id the book does not know) are not
//! errors; they are silent no-ops logged at `debug` by the dispatcher.

use thiserror::Error;

/// A malformed or inconsistent [`crate::types::ExternalUpdate`]. Never
/// touches the book — validation happens before the lock is acquired.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asset_id is empty")]
    EmptyAssetId,
    #[error("asset_id \"{given}\" does not match this book's asset \"{expected}\"")]
    AssetIdMismatch { given: String, expected: String },
    #[error("external_id is empty")]
    EmptyExternalId,
    #[error("timestamp is zero")]
    ZeroTimestamp,
    #[error("price must be positive for an \"added\" order, got {0}")]
    NonPositivePrice(crate::units::Money),
    #[error("amount must be positive for an \"added\" order, got {0}")]
    NonPositiveAmount(crate::units::AssetUnit),
}
