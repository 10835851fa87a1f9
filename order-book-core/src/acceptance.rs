//! Acceptance tests for the nine concrete scenarios: literal values, exact
//! six-decimal fixed point, checked end to end through [`OrderBook`].
#![cfg(test)]

use crate::units::{AssetUnit, Money};
use crate::{Order, OrderBook, Side};
use chrono::{DateTime, Utc};
use std::str::FromStr;

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn order(id: &str, side: Side, price: &str, amount: &str, secs: i64, mine: bool) -> Order {
    Order::new(
        id.to_string(),
        side,
        Money::from_str(price).unwrap(),
        AssetUnit::from_str(amount).unwrap(),
        ts(secs),
        mine,
    )
}

#[test]
fn scenario_1_empty_book() {
    let book = OrderBook::new("BTC");
    assert_eq!(book.counts(), (0, 0));
    assert!(book.buy_snapshot().is_empty());
}

#[test]
fn scenario_2_single_buy_add() {
    let book = OrderBook::new("BTC");
    let trade = book.add_order(order("b1", Side::Buy, "99", "10", 0, true));
    assert!(trade.is_none());
    assert_eq!(book.counts(), (1, 0));
    assert_eq!(book.buy_snapshot()[0].price.raw(), 99_000_000);
}

#[test]
fn scenario_3_price_priority() {
    let book = OrderBook::new("BTC");
    book.add_order(order("a", Side::Buy, "99", "1", 0, true));
    book.add_order(order("b", Side::Buy, "101", "1", 1, true));
    book.add_order(order("c", Side::Buy, "100", "1", 2, true));

    let prices: Vec<i64> = book.buy_snapshot().iter().map(|o| o.price.raw()).collect();
    assert_eq!(prices, vec![101_000_000, 100_000_000, 99_000_000]);
}

#[test]
fn scenario_4_time_priority_within_level() {
    let book = OrderBook::new("BTC");
    book.add_order(order("t2", Side::Sell, "50", "1", 2, true));
    book.add_order(order("t0", Side::Sell, "50", "1", 0, true));
    book.add_order(order("t1", Side::Sell, "50", "1", 1, true));

    let ids: Vec<&str> = book.sell_snapshot().iter().map(|o| o.external_id.as_str()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2"]);
}

#[test]
fn scenario_5_match_flips_in_trade_and_blocks_further_matches() {
    let book = OrderBook::new("BTC");
    book.add_order(order("b1", Side::Buy, "99", "10", 0, true));

    let trade = book
        .add_order(order("s1", Side::Sell, "99", "4", 1, false))
        .expect("scenario 2's resting buy crosses this sell");
    assert_eq!(trade.interested.external_id, "b1");
    assert_eq!(trade.interest.external_id, "s1");
    assert_eq!(trade.amount.raw(), 4_000_000);
    assert!(book.buy_snapshot()[0].in_trade);
    assert!(book.sell_snapshot()[0].in_trade);

    // An unrelated add (still crossed) must not produce a second match while
    // the heads are in_trade.
    let second = book.add_order(order("s2", Side::Sell, "99", "1", 2, false));
    assert!(second.is_none());
}

#[test]
fn scenario_6_traded_decrement_removes_exhausted_order() {
    let book = OrderBook::new("BTC");
    book.add_order(order("b1", Side::Buy, "99", "10", 0, true));
    book.add_order(order("s1", Side::Sell, "99", "4", 1, false));

    book.decrement("s1", AssetUnit::from_raw(4_000_000));
    assert_eq!(book.counts(), (1, 0));

    book.decrement("b1", AssetUnit::from_raw(4_000_000));
    let resting = &book.buy_snapshot()[0];
    assert!(!resting.in_trade);
    assert_eq!(resting.amount.raw(), 6_000_000);
}

#[test]
fn scenario_7_neither_mine_no_match_despite_crossed_book() {
    let book = OrderBook::new("BTC");
    book.add_order(order("b1", Side::Buy, "99", "10", 0, false));
    let trade = book.add_order(order("s1", Side::Sell, "99", "4", 1, false));
    assert!(trade.is_none());
    // still crossed (both heads resting at the same price, unmatched)
    assert_eq!(book.best(Side::Buy).unwrap().0, book.best(Side::Sell).unwrap().0);
}

#[test]
fn scenario_8_duplicate_add_is_a_no_op() {
    let book = OrderBook::new("BTC");
    book.add_order(order("b1", Side::Buy, "99", "10", 0, true));
    book.add_order(order("b1", Side::Buy, "50", "1", 5, true));
    assert_eq!(book.counts(), (1, 0));
    assert_eq!(book.buy_snapshot()[0].price.raw(), 99_000_000);
}

#[test]
fn scenario_9_unknown_delete_is_silent() {
    let book = OrderBook::new("BTC");
    book.remove("ghost");
    assert_eq!(book.counts(), (0, 0));
}
