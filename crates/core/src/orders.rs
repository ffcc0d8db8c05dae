//! Orders and their lifecycle classification.
//!
//! An [`Order`] is a read-only projection of server state: the client never
//! computes totals or lifecycle flags itself, it only observes them and asks
//! the remote service for transitions. Classification into lifecycle buckets
//! is a pure function over the two status flags, which makes it the most
//! directly testable piece of the engine.

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::OrderId;

/// A placed order, as reported by the remote order service.
///
/// Lifecycle: created at checkout, then `is_paid` flips false -> true, then
/// `is_delivered` flips false -> true. Flags never regress and orders are
/// never deleted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned order ID.
    pub id: OrderId,
    /// The cart lines captured at checkout.
    pub items: Vec<CartItem>,
    /// Order total in minor currency units (e.g., cents).
    pub total_price: i64,
    /// Whether the order has been paid.
    pub is_paid: bool,
    /// Whether the order has been delivered.
    pub is_delivered: bool,
}

impl Order {
    /// Format the minor-unit total for display (e.g., `1999` -> `"19.99"`).
    #[must_use]
    pub fn total_display(&self) -> String {
        let units = self.total_price / 100;
        let cents = (self.total_price % 100).abs();
        format!("{units}.{cents:02}")
    }
}

/// Orders partitioned into lifecycle buckets.
///
/// The three buckets partition the input: every order lands in exactly one.
/// A delivered order is completed regardless of its paid flag, since payment
/// is a server-enforced prerequisite for delivery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBuckets {
    /// Orders neither paid nor delivered.
    pub pending: Vec<Order>,
    /// Orders paid but not yet delivered.
    pub awaiting_delivery: Vec<Order>,
    /// Delivered orders.
    pub completed: Vec<Order>,
}

impl OrderBuckets {
    /// Partition a flat list of orders into lifecycle buckets.
    #[must_use]
    pub fn classify(orders: Vec<Order>) -> Self {
        let mut buckets = Self::default();
        for order in orders {
            if order.is_delivered {
                buckets.completed.push(order);
            } else if order.is_paid {
                buckets.awaiting_delivery.push(order);
            } else {
                buckets.pending.push(order);
            }
        }
        buckets
    }

    /// Number of pending (new) orders - the orders tab badge count.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total number of orders across all buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending.len() + self.awaiting_delivery.len() + self.completed.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: i64, is_paid: bool, is_delivered: bool) -> Order {
        Order {
            id: OrderId::new(id),
            items: Vec::new(),
            total_price: 1999,
            is_paid,
            is_delivered,
        }
    }

    #[test]
    fn test_classify_one_per_bucket() {
        let buckets = OrderBuckets::classify(vec![
            order(1, false, false),
            order(2, true, false),
            order(3, true, true),
        ]);

        assert_eq!(buckets.pending.len(), 1);
        assert_eq!(buckets.awaiting_delivery.len(), 1);
        assert_eq!(buckets.completed.len(), 1);
        assert_eq!(buckets.pending[0].id, OrderId::new(1));
        assert_eq!(buckets.awaiting_delivery[0].id, OrderId::new(2));
        assert_eq!(buckets.completed[0].id, OrderId::new(3));
        assert_eq!(buckets.pending_count(), 1);
    }

    #[test]
    fn test_classify_partitions_input() {
        let orders: Vec<Order> = (0..16)
            .map(|i| order(i, i % 2 == 0, i % 3 == 0))
            .collect();
        let total = orders.len();

        let buckets = OrderBuckets::classify(orders);

        // No omission, and buckets are disjoint by construction of the ids
        assert_eq!(buckets.total(), total);
        let mut ids: Vec<i64> = buckets
            .pending
            .iter()
            .chain(&buckets.awaiting_delivery)
            .chain(&buckets.completed)
            .map(|o| o.id.as_i64())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_delivered_but_unpaid_is_completed() {
        // Paid is enforced server-side; the client treats delivered as final
        let buckets = OrderBuckets::classify(vec![order(9, false, true)]);
        assert!(buckets.pending.is_empty());
        assert!(buckets.awaiting_delivery.is_empty());
        assert_eq!(buckets.completed.len(), 1);
    }

    #[test]
    fn test_classify_empty() {
        let buckets = OrderBuckets::classify(Vec::new());
        assert_eq!(buckets, OrderBuckets::default());
        assert_eq!(buckets.pending_count(), 0);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let orders = vec![order(1, false, false), order(2, true, false)];
        assert_eq!(
            OrderBuckets::classify(orders.clone()),
            OrderBuckets::classify(orders)
        );
    }

    #[test]
    fn test_total_display() {
        assert_eq!(order(1, false, false).total_display(), "19.99");

        let mut cheap = order(2, false, false);
        cheap.total_price = 205;
        assert_eq!(cheap.total_display(), "2.05");
    }
}
