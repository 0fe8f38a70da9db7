//! Narrow interfaces to the gateway's external collaborators.
//!
//! The gateway does not persist anything itself: merchants, sessions, orders,
//! stock, shipping options, pricing, and payment capture all live behind
//! these traits. Every lookup is scoped by the identifiers resolved during
//! credential verification, so cross-tenant access has no code path.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::ServiceError;
use crate::models::{Address, Cart, CheckoutSession, LineItem, Merchant, Order, PaymentSummary};
use crate::money::Money;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Per-entity serialization was violated (compare-and-swap lost).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(msg) => ServiceError::Conflict(msg),
            StorageError::Unavailable(msg) => ServiceError::Internal(msg),
        }
    }
}

/// Read-only merchant configuration access.
#[async_trait]
pub trait MerchantStore: Send + Sync {
    async fn get(&self, merchant_id: &str) -> Result<Option<Merchant>, StorageError>;
    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Merchant>, StorageError>;
    /// Consistent snapshot of every UCP-enabled merchant, read fresh per call.
    async fn list_ucp_enabled(&self) -> Result<Vec<Merchant>, StorageError>;
}

/// Checkout-session lifecycle storage. Lookups require the owning merchant
/// id; the store must provide per-entity serialization for updates.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: CheckoutSession) -> Result<(), StorageError>;
    async fn get(
        &self,
        merchant_id: &str,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, StorageError>;
    /// Compare-and-swap update keyed on the session's previous `updated_at`.
    async fn update(
        &self,
        expected_updated_at: chrono::DateTime<chrono::Utc>,
        session: CheckoutSession,
    ) -> Result<CheckoutSession, StorageError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<(), StorageError>;
    async fn get(&self, merchant_id: &str, order_id: &str)
        -> Result<Option<Order>, StorageError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferStock {
    pub price: Money,
    pub available: i64,
}

/// Current stock and price projection; never persisted by the gateway.
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn availability(
        &self,
        merchant_id: &str,
        offer_ids: &[String],
    ) -> Result<HashMap<String, OfferStock>, StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub id: String,
    pub label: String,
    pub fee: Money,
}

/// Shipping-rate collaborator; the gateway never computes rates itself.
#[async_trait]
pub trait ShippingProvider: Send + Sync {
    async fn options(
        &self,
        merchant_id: &str,
        address: &Address,
    ) -> Result<Vec<ShippingOption>, StorageError>;
}

/// Computes cart totals (subtotal, tax, total). The gateway only carries the
/// result; the invariant `total = subtotal + shipping_fee + tax` is the
/// collaborator's to uphold.
#[async_trait]
pub trait PricingProvider: Send + Sync {
    async fn price_cart(
        &self,
        merchant_id: &str,
        items: Vec<LineItem>,
        shipping_fee: Money,
    ) -> Result<Cart, StorageError>;
}

/// Forwards an opaque payment token for settlement; capture itself is out of
/// scope.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn authorize(
        &self,
        merchant_id: &str,
        payment_method: &str,
        token: &str,
        amount: &Money,
    ) -> Result<PaymentSummary, StorageError>;
}
