use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub offer_id: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Ordered line items plus derived totals.
///
/// Totals are produced by the pricing collaborator, never inside the gateway;
/// `total = subtotal + shipping_fee + tax` holds at the time a response is
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub tax: Money,
    pub total: Money,
}

impl Cart {
    pub fn empty(currency: &str) -> Self {
        Self {
            items: Vec::new(),
            subtotal: Money::zero(currency),
            shipping_fee: Money::zero(currency),
            tax: Money::zero(currency),
            total: Money::zero(currency),
        }
    }
}
