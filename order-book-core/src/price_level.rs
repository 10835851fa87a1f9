//! A single price level: all orders resting at one price on one side, kept
//! in time priority.
//!
//! Orders are stored in a [`slab::Slab`]-backed intrusive doubly linked
//! list, giving O(1) removal given the slab key the book's id-index already
//! holds (Design Notes, option (a): "an arena/slab with stable indices plus
//! an `id → index` map"). Insertion walks the list from the head to find the
//! right time-priority slot — expected cheap for realistic book depth.

use slab::Slab;

use crate::types::Order;
use crate::units::AssetUnit;

/// A slab key identifying one order's node within its [`PriceLevel`].
pub(crate) type NodeKey = usize;

struct OrderNode {
    order: Order,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

/// All orders resting at one price, on one side.
///
/// Invariant held across every operation: `amount_sum == sum(order.amount)`
/// and `orders_count == number of live nodes`.
pub(crate) struct PriceLevel {
    nodes: Slab<OrderNode>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    amount_sum: AssetUnit,
    orders_count: i64,
}

impl PriceLevel {
    pub(crate) fn new() -> Self {
        PriceLevel {
            nodes: Slab::new(),
            head: None,
            tail: None,
            amount_sum: AssetUnit::ZERO,
            orders_count: 0,
        }
    }

    /// Inserts `order` in time-priority position and returns the key needed
    /// to remove or mutate it later.
    ///
    /// Walks from the head; `order` is placed immediately before the first
    /// existing order that is not earlier than it (i.e. the first strictly
    /// later order), else appended at the tail. Equal timestamps are "not
    /// earlier", so the new order is walked past them — ties resolve FIFO.
    pub(crate) fn insert(&mut self, order: Order) -> NodeKey {
        let amount = order.amount;

        let mut insert_before = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let existing = &self.nodes[idx].order;
            if order.earlier(existing) {
                insert_before = Some(idx);
                break;
            }
            cursor = self.nodes[idx].next;
        }

        let key = match insert_before {
            Some(before) => {
                let prev = self.nodes[before].prev;
                let new_key = self.nodes.insert(OrderNode { order, prev, next: Some(before) });
                self.nodes[before].prev = Some(new_key);
                match prev {
                    Some(p) => self.nodes[p].next = Some(new_key),
                    None => self.head = Some(new_key),
                }
                new_key
            }
            None => {
                let prev = self.tail;
                let new_key = self.nodes.insert(OrderNode { order, prev, next: None });
                match prev {
                    Some(p) => self.nodes[p].next = Some(new_key),
                    None => self.head = Some(new_key),
                }
                self.tail = Some(new_key);
                new_key
            }
        };

        self.amount_sum += amount;
        self.orders_count += 1;
        key
    }

    /// Unlinks the node at `key` in O(1) and returns its order.
    pub(crate) fn remove(&mut self, key: NodeKey) -> Order {
        let node = self.nodes.remove(key);
        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        self.amount_sum = self
            .amount_sum
            .checked_sub(node.order.amount)
            .expect("amount_sum tracks live orders and cannot underflow");
        self.orders_count -= 1;
        node.order
    }

    pub(crate) fn get(&self, key: NodeKey) -> &Order {
        &self.nodes[key].order
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> &mut Order {
        &mut self.nodes[key].order
    }

    /// Sets the order at `key` to `new_amount`, keeping `amount_sum` in sync.
    pub(crate) fn set_amount(&mut self, key: NodeKey, new_amount: AssetUnit) {
        let node = &mut self.nodes[key];
        let old = node.order.amount;
        node.order.amount = new_amount;
        self.amount_sum = AssetUnit::from_raw(self.amount_sum.raw() - old.raw() + new_amount.raw());
    }

    pub(crate) fn head_key(&self) -> Option<NodeKey> {
        self.head
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.orders_count == 0
    }

    pub(crate) fn amount_sum(&self) -> AssetUnit {
        self.amount_sum
    }

    pub(crate) fn orders_count(&self) -> i64 {
        self.orders_count
    }

    /// Orders in time priority (head first).
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Order> {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let node = &self.nodes[idx];
            cursor = node.next;
            Some(&node.order)
        })
    }
}
