//! Fixed-point money and asset-unit types.
//!
//! Both `Money` and `AssetUnit` carry six implicit decimal places, encoded as
//! a signed 64-bit integer (`$10.55` serializes as `10_550_000`). All
//! arithmetic stays in integers; floating point never enters the matching
//! path. Conversion from decimal strings truncates excess fractional digits
//! at the ingestion boundary.

use std::str::FromStr;

use derive_more::{Add, AddAssign, Display, From, Sub, SubAssign};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of implicit decimal places carried by [`Money`] and [`AssetUnit`].
pub const DECIMALS: u32 = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFixedPointError {
    #[error("\"{0}\" is not a decimal number")]
    NotADecimal(String),
    #[error("value does not fit in a 64-bit fixed-point integer")]
    Overflow,
}

macro_rules! fixed_point_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Default,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Add,
            Sub,
            AddAssign,
            SubAssign,
            From,
            Display,
            Serialize,
            Deserialize,
        )]
        #[display("{}", self.to_decimal())]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const ZERO: Self = Self(0);

            /// The raw fixed-point integer (six implicit decimals).
            pub const fn raw(self) -> i64 {
                self.0
            }

            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            pub fn is_positive(self) -> bool {
                self.0 > 0
            }

            pub fn checked_sub(self, rhs: Self) -> Option<Self> {
                self.0.checked_sub(rhs.0).map(Self)
            }

            pub fn min(self, other: Self) -> Self {
                if self.0 <= other.0 { self } else { other }
            }

            /// Decimal rendering with six fractional digits, e.g. `10.550000`.
            pub fn to_decimal(self) -> Decimal {
                Decimal::new(self.0, DECIMALS)
            }
        }

        impl FromStr for $name {
            type Err = ParseFixedPointError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let decimal = Decimal::from_str(s)
                    .map_err(|_| ParseFixedPointError::NotADecimal(s.to_string()))?;
                decimal_to_raw(decimal).map(Self)
            }
        }
    };
}

fixed_point_type!(Money, "A monetary amount, six implicit decimal places.");
fixed_point_type!(AssetUnit, "A quantity of the traded asset, six implicit decimal places.");

/// Truncates `decimal` to [`DECIMALS`] fractional digits and packs it into an
/// `i64`. Excess fractional digits are dropped, never rounded.
fn decimal_to_raw(decimal: Decimal) -> Result<i64, ParseFixedPointError> {
    let truncated = decimal.trunc_with_scale(DECIMALS);
    let scaled = truncated * Decimal::new(10i64.pow(DECIMALS), 0);
    scaled.trunc().to_i64().ok_or(ParseFixedPointError::Overflow)
}
