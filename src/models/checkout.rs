use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Address, Cart};

/// Internal checkout-session states.
///
/// `Pending -> AwaitingPayment -> Processing -> Completed`, with time-based
/// expiry out of `AwaitingPayment`/`Processing` and explicit cancellation out
/// of any non-terminal state. The external contract collapses these six
/// states to four; see the schema adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutSessionStatus {
    Pending,
    AwaitingPayment,
    Processing,
    Completed,
    Expired,
    Cancelled,
}

impl CheckoutSessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        use CheckoutSessionStatus::*;
        match (*self, next) {
            (Pending, AwaitingPayment) => true,
            (AwaitingPayment, Processing) => true,
            (Processing, Completed) => true,
            // Expiry is time-based and only leaves the payment-side states.
            (AwaitingPayment | Processing, Expired) => true,
            // Cancellation is an explicit action out of any non-terminal state.
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// A short-lived negotiation of cart, addresses, and payment method prior to
/// order creation. One merchant and one tenant per session; the tenant is
/// derived transitively from the merchant at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub merchant_id: String,
    pub tenant_id: String,
    pub status: CheckoutSessionStatus,
    pub cart: Cart,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub payment_handlers: Vec<String>,
    pub selected_payment_method: Option<String>,
    pub selected_delivery_option: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Apply the time-based expiry branch if the session is past its expiry
    /// timestamp. Returns true when a transition happened and the session
    /// should be persisted.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if now >= self.expires_at
            && self
                .status
                .can_transition_to(CheckoutSessionStatus::Expired)
        {
            self.status = CheckoutSessionStatus::Expired;
            self.updated_at = now;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::CheckoutSessionStatus::*;
    use super::*;

    #[test]
    fn happy_path_transitions() {
        assert!(Pending.can_transition_to(AwaitingPayment));
        assert!(AwaitingPayment.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
    }

    #[test]
    fn expiry_only_leaves_payment_states() {
        assert!(AwaitingPayment.can_transition_to(Expired));
        assert!(Processing.can_transition_to(Expired));
        assert!(!Pending.can_transition_to(Expired));
        assert!(!Completed.can_transition_to(Expired));
    }

    #[test]
    fn cancellation_from_any_non_terminal_state() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(AwaitingPayment.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Expired.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states() {
        for status in [Completed, Expired, Cancelled] {
            assert!(status.is_terminal());
        }
        for status in [Pending, AwaitingPayment, Processing] {
            assert!(!status.is_terminal());
        }
    }
}
