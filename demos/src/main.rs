//! # Order Book Demo
//!
//! Runnable walkthroughs of the order book's matching behavior:
//! - Basic matching between a `mine` and a counterparty order
//! - Partial fills via `traded` decrements
//! - Price-time priority within a level
//! - A complex multi-level scenario

use chrono::{DateTime, Utc};
use order_book_core::units::{AssetUnit, Money};
use order_book_core::{Order, OrderBook, Side, TradeRequest};
use std::str::FromStr;

fn main() {
    println!("=== Limit Order Book Demo ===\n");

    demo_basic_matching(&OrderBook::new("BTC"));
    demo_partial_fills(&OrderBook::new("BTC"));
    demo_price_time_priority(&OrderBook::new("BTC"));
    demo_complex_scenario(&OrderBook::new("BTC"));
}

/// Demonstrates basic order matching: a resting `mine` buy order matches a
/// crossing external sell order at the same price.
fn demo_basic_matching(book: &OrderBook) {
    println!("-----------------------");
    println!("1. Basic Matching Demo:");
    println!("-----------------------");

    let trade = place(book, "b1", Side::Buy, "100.00", "0.010", 1, true);
    print_trade(&trade);
    print_book_state(book);

    let trade = place(book, "s1", Side::Sell, "100.00", "0.010", 2, false);
    print_trade(&trade);
    print_book_state(book);
}

/// Demonstrates partial fills: a larger buy order only partially crosses
/// against the first sell, leaving remainder to match the next one.
fn demo_partial_fills(book: &OrderBook) {
    println!("---------------------");
    println!("2. Partial Fill Demo:");
    println!("---------------------");

    place(book, "b1", Side::Buy, "100.00", "0.015", 1, true);

    let trade = place(book, "s1", Side::Sell, "100.00", "0.010", 2, false);
    print_trade(&trade);
    if let Some(tr) = &trade {
        println!("--Settling {} and removing both sides from the book", tr.amount);
        book.decrement("b1", tr.amount);
        book.decrement("s1", tr.amount);
    }
    print_book_state(book);

    let trade = place(book, "s2", Side::Sell, "100.00", "0.010", 3, false);
    print_trade(&trade);
    if let Some(tr) = &trade {
        book.decrement("b1", tr.amount);
        book.decrement("s2", tr.amount);
    }
    print_book_state(book);
}

/// Demonstrates price-time priority: among buy orders at the same best
/// price, the earliest arrival is the one that matches first.
fn demo_price_time_priority(book: &OrderBook) {
    println!("----------------------------");
    println!("3. Price-Time Priority Demo:");
    println!("----------------------------");

    place(book, "b1", Side::Buy, "99.00", "0.010", 1, true);
    place(book, "b2", Side::Buy, "100.00", "0.010", 2, true);
    place(book, "b3", Side::Buy, "100.00", "0.010", 3, true);

    print_book_state(book);

    println!("--Incoming sell at 99.00, crossing the best (100.00) level:");
    let trade = place(book, "s1", Side::Sell, "99.00", "0.010", 4, false);
    print_trade(&trade);
    if let Some(tr) = &trade {
        println!("----Matched against {} (arrived first at 100.00)", tr.interested.external_id);
    }
    print_book_state(book);
}

/// Demonstrates a book with several price levels per side and an aggressive
/// order that crosses into the opposite book.
fn demo_complex_scenario(book: &OrderBook) {
    println!("---------------------------");
    println!("4. Complex Market Scenario:");
    println!("---------------------------");

    println!("Building initial order book:");
    place(book, "b1", Side::Buy, "98.00", "0.020", 1, true);
    place(book, "b2", Side::Buy, "99.00", "0.015", 2, true);
    place(book, "b3", Side::Buy, "100.00", "0.010", 3, true);
    place(book, "s1", Side::Sell, "101.00", "0.010", 4, true);
    place(book, "s2", Side::Sell, "102.00", "0.015", 5, true);
    place(book, "s3", Side::Sell, "103.00", "0.020", 6, true);

    print_book_state(book);

    println!("\nAggressive BUY crossing the spread:");
    let trade = place(book, "b4", Side::Buy, "102.00", "0.030", 7, false);
    print_trade(&trade);
    print_book_state(book);

    println!("\nAggressive SELL crossing the spread:");
    let trade = place(book, "s4", Side::Sell, "98.00", "0.040", 8, false);
    print_trade(&trade);
    print_book_state(book);
}

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn place(
    book: &OrderBook,
    id: &str,
    side: Side,
    price: &str,
    amount: &str,
    secs: i64,
    mine: bool,
) -> Option<TradeRequest> {
    println!("--Placing {} order: id={}, price={}, amount={}", side, id, price, amount);
    let order = Order::new(
        id.to_string(),
        side,
        Money::from_str(price).unwrap(),
        AssetUnit::from_str(amount).unwrap(),
        ts(secs),
        mine,
    );
    book.add_order(order)
}

fn print_trade(trade: &Option<TradeRequest>) {
    match trade {
        None => println!("--No trade executed"),
        Some(tr) => println!(
            "--Trade request: {} (interested: {}, interest: {})",
            tr.amount, tr.interested.external_id, tr.interest.external_id
        ),
    }
}

fn print_book_state(book: &OrderBook) {
    println!("--Book state:");
    match book.best(Side::Buy) {
        Some((price, amount)) => println!("----Best BUY:  {amount} @ {price}"),
        None => println!("----Best BUY:  None"),
    }
    match book.best(Side::Sell) {
        Some((price, amount)) => println!("----Best SELL: {amount} @ {price}"),
        None => println!("----Best SELL: None"),
    }
    println!();
}
