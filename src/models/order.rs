use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Address, Cart};

/// Internal order states. Status advances monotonically except for the
/// cancellation/refund branches, which are reachable from any non-terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Refunded)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        use OrderStatus::*;
        match (*self, next) {
            (Pending, Confirmed) => true,
            (Confirmed, Processing) => true,
            (Processing, Shipped) => true,
            (Shipped, Delivered) => true,
            (from, Cancelled | Refunded) => !from.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub status: String,
    pub transaction_id: String,
}

/// Created from a completed checkout session. Cart and addresses are
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub merchant_id: String,
    pub tenant_id: String,
    pub merchant_order_ref: String,
    pub status: OrderStatus,
    pub cart: Cart,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub payment: PaymentSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn monotonic_fulfillment_path() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Shipped.can_transition_to(Confirmed));
    }

    #[test]
    fn cancel_and_refund_reachable_from_non_terminal_states() {
        for from in [Pending, Confirmed, Processing, Shipped] {
            assert!(from.can_transition_to(Cancelled));
            assert!(from.can_transition_to(Refunded));
        }
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Refunded.can_transition_to(Cancelled));
    }
}
