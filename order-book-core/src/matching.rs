//! The matching policy (component C5): a pure predicate over the two best
//! price levels, invoked once after every successful `add_order`.
//!
//! A match fires iff both books have a resting head order, neither head is
//! already `in_trade`, the book is crossed (`best_bid.price >=
//! best_ask.price`), and at least one head order is `mine` — a book where
//! both crossing heads are external is only a mirror; settlement is not
//! ours to drive.

use crate::order_book::BookInner;
use crate::types::TradeRequest;

pub(crate) fn try_match(inner: &mut BookInner) -> Option<TradeRequest> {
    let buy_price = *inner.buy_side.iter().next_back()?.0;
    let sell_price = *inner.sell_side.iter().next()?.0;

    let buy_key = inner.buy_side.get(&buy_price)?.head_key()?;
    let sell_key = inner.sell_side.get(&sell_price)?.head_key()?;

    let buy_order = inner.buy_side.get(&buy_price).unwrap().get(buy_key).clone();
    let sell_order = inner.sell_side.get(&sell_price).unwrap().get(sell_key).clone();

    if buy_order.in_trade || sell_order.in_trade {
        return None;
    }
    if buy_order.price < sell_order.price {
        return None; // not crossed
    }
    if !(buy_order.mine || sell_order.mine) {
        return None; // mirror only, no settlement of ours involved
    }

    let trade_amount = buy_order.amount.min(sell_order.amount);

    inner.buy_side.get_mut(&buy_price).unwrap().get_mut(buy_key).in_trade = true;
    inner.sell_side.get_mut(&sell_price).unwrap().get_mut(sell_key).in_trade = true;

    let buy_order = inner.buy_side.get(&buy_price).unwrap().get(buy_key).clone();
    let sell_order = inner.sell_side.get(&sell_price).unwrap().get(sell_key).clone();

    let (interested, interest) = if buy_order.mine {
        (buy_order, sell_order)
    } else {
        (sell_order, buy_order)
    };

    Some(TradeRequest {
        interested,
        interest,
        amount: trade_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_book::OrderBook;
    use crate::types::Side;
    use crate::units::{AssetUnit, Money};
    use chrono::{DateTime, Utc};
    use std::str::FromStr;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn order(id: &str, side: Side, price: &str, amount: &str, secs: i64, mine: bool) -> crate::types::Order {
        crate::types::Order::new(
            id.to_string(),
            side,
            Money::from_str(price).unwrap(),
            AssetUnit::from_str(amount).unwrap(),
            ts(secs),
            mine,
        )
    }

    #[test]
    fn no_match_when_neither_side_is_mine() {
        let book = OrderBook::new("BTC");
        book.add_order(order("b1", Side::Buy, "100", "1", 0, false));
        let trade = book.add_order(order("s1", Side::Sell, "100", "1", 1, false));
        assert!(trade.is_none());
    }

    #[test]
    fn matches_when_one_side_is_mine() {
        let book = OrderBook::new("BTC");
        book.add_order(order("b1", Side::Buy, "99", "10", 0, true));
        let trade = book
            .add_order(order("s1", Side::Sell, "99", "4", 1, false))
            .expect("should match");
        assert_eq!(trade.amount, AssetUnit::from_str("4").unwrap());
        assert_eq!(trade.interested.external_id, "b1");
        assert_eq!(trade.interest.external_id, "s1");
    }

    #[test]
    fn no_second_match_while_heads_are_in_trade() {
        let book = OrderBook::new("BTC");
        book.add_order(order("b1", Side::Buy, "99", "10", 0, true));
        book.add_order(order("s1", Side::Sell, "99", "4", 1, false))
            .expect("first match");

        // Another crossing sell arrives behind s1 in the same level: the
        // head pair is still `in_trade`, so no second match fires even
        // though the book remains crossed.
        let trade = book.add_order(order("s2", Side::Sell, "99", "1", 2, false));
        assert!(trade.is_none());
    }
}
