//! In-memory collaborator implementations backed by `DashMap`.
//!
//! Used by the binary in standalone mode and by the test suite. Persistent
//! backends implement the same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    MerchantStore, OfferStock, OrderStore, PaymentProcessor, PricingProvider, SessionStore,
    ShippingOption, ShippingProvider, StockStore, StorageError,
};
use crate::models::{Address, Cart, CheckoutSession, LineItem, Merchant, Order, PaymentSummary};
use crate::money::Money;

#[derive(Default)]
pub struct MemoryMerchantStore {
    merchants: DashMap<String, Merchant>,
}

impl MemoryMerchantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a merchant, enforcing key-hash uniqueness across enabled
    /// merchants at write time. The runtime collision check in the verifier
    /// remains as defense-in-depth.
    pub fn insert(&self, merchant: Merchant) -> Result<(), StorageError> {
        if let Some(settings) = merchant.ucp_settings() {
            if settings.enabled {
                let duplicate = self.merchants.iter().any(|entry| {
                    entry.id != merchant.id
                        && entry
                            .ucp_settings()
                            .map(|s| s.enabled && s.api_key_hash == settings.api_key_hash)
                            .unwrap_or(false)
                });
                if duplicate {
                    return Err(StorageError::Conflict(format!(
                        "api key hash already configured for another enabled merchant (inserting {})",
                        merchant.id
                    )));
                }
            }
        }
        self.merchants.insert(merchant.id.clone(), merchant);
        Ok(())
    }

    /// Bypasses the uniqueness constraint. Only exists so tests can stage the
    /// corrupted-data scenario the verifier must fail closed on.
    pub fn insert_unchecked(&self, merchant: Merchant) {
        self.merchants.insert(merchant.id.clone(), merchant);
    }
}

#[async_trait]
impl MerchantStore for MemoryMerchantStore {
    async fn get(&self, merchant_id: &str) -> Result<Option<Merchant>, StorageError> {
        Ok(self.merchants.get(merchant_id).map(|m| m.clone()))
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Merchant>, StorageError> {
        Ok(self
            .merchants
            .iter()
            .find(|m| m.hostname.as_deref() == Some(hostname))
            .map(|m| m.clone()))
    }

    async fn list_ucp_enabled(&self) -> Result<Vec<Merchant>, StorageError> {
        Ok(self
            .merchants
            .iter()
            .filter(|m| m.ucp_enabled())
            .map(|m| m.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<(String, String), CheckoutSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: CheckoutSession) -> Result<(), StorageError> {
        let key = (session.merchant_id.clone(), session.id.clone());
        self.sessions.insert(key, session);
        Ok(())
    }

    async fn get(
        &self,
        merchant_id: &str,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, StorageError> {
        Ok(self
            .sessions
            .get(&(merchant_id.to_string(), session_id.to_string()))
            .map(|s| s.clone()))
    }

    async fn update(
        &self,
        expected_updated_at: DateTime<Utc>,
        session: CheckoutSession,
    ) -> Result<CheckoutSession, StorageError> {
        let key = (session.merchant_id.clone(), session.id.clone());
        let mut entry = self
            .sessions
            .get_mut(&key)
            .ok_or_else(|| StorageError::Conflict(format!("session {} vanished", session.id)))?;
        if entry.updated_at != expected_updated_at {
            return Err(StorageError::Conflict(format!(
                "session {} was modified concurrently",
                session.id
            )));
        }
        *entry = session.clone();
        Ok(session)
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: DashMap<(String, String), Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), StorageError> {
        let key = (order.merchant_id.clone(), order.id.clone());
        self.orders.insert(key, order);
        Ok(())
    }

    async fn get(
        &self,
        merchant_id: &str,
        order_id: &str,
    ) -> Result<Option<Order>, StorageError> {
        Ok(self
            .orders
            .get(&(merchant_id.to_string(), order_id.to_string()))
            .map(|o| o.clone()))
    }
}

#[derive(Default)]
pub struct MemoryStockStore {
    // (merchant_id, offer_id) -> stock
    stock: DashMap<(String, String), OfferStock>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stock(&self, merchant_id: &str, offer_id: &str, stock: OfferStock) {
        self.stock
            .insert((merchant_id.to_string(), offer_id.to_string()), stock);
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn availability(
        &self,
        merchant_id: &str,
        offer_ids: &[String],
    ) -> Result<HashMap<String, OfferStock>, StorageError> {
        let mut result = HashMap::new();
        for offer_id in offer_ids {
            if let Some(stock) = self
                .stock
                .get(&(merchant_id.to_string(), offer_id.clone()))
            {
                result.insert(offer_id.clone(), stock.clone());
            }
        }
        Ok(result)
    }
}

/// Flat-rate shipping options, one standard and one express lane.
pub struct MemoryShippingProvider {
    currency: String,
}

impl MemoryShippingProvider {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl ShippingProvider for MemoryShippingProvider {
    async fn options(
        &self,
        _merchant_id: &str,
        _address: &Address,
    ) -> Result<Vec<ShippingOption>, StorageError> {
        Ok(vec![
            ShippingOption {
                id: "standard".into(),
                label: "Standard (3-5 days)".into(),
                fee: Money {
                    amount_minor: 6000,
                    currency: self.currency.clone(),
                },
            },
            ShippingOption {
                id: "express".into(),
                label: "Express (1-2 days)".into(),
                fee: Money {
                    amount_minor: 12000,
                    currency: self.currency.clone(),
                },
            },
        ])
    }
}

/// Sums line items and applies a flat 5% tax, each amount rounded
/// independently.
pub struct MemoryPricingProvider {
    currency: String,
}

impl MemoryPricingProvider {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl PricingProvider for MemoryPricingProvider {
    async fn price_cart(
        &self,
        _merchant_id: &str,
        items: Vec<LineItem>,
        shipping_fee: Money,
    ) -> Result<Cart, StorageError> {
        let currency = items
            .first()
            .map(|i| i.unit_price.currency.clone())
            .unwrap_or_else(|| self.currency.clone());

        let subtotal_minor: i64 = items
            .iter()
            .map(|i| i.unit_price.amount_minor * i64::from(i.quantity))
            .sum();
        let tax_minor = (subtotal_minor * 5 + 50) / 100;
        let total_minor = subtotal_minor + shipping_fee.amount_minor + tax_minor;

        Ok(Cart {
            items,
            subtotal: Money {
                amount_minor: subtotal_minor,
                currency: currency.clone(),
            },
            shipping_fee,
            tax: Money {
                amount_minor: tax_minor,
                currency: currency.clone(),
            },
            total: Money {
                amount_minor: total_minor,
                currency,
            },
        })
    }
}

/// Accepts any opaque token and reports it settled. The real settlement
/// integration lives behind the same trait.
pub struct MemoryPaymentProcessor;

#[async_trait]
impl PaymentProcessor for MemoryPaymentProcessor {
    async fn authorize(
        &self,
        _merchant_id: &str,
        _payment_method: &str,
        token: &str,
        _amount: &Money,
    ) -> Result<PaymentSummary, StorageError> {
        if token.trim().is_empty() {
            return Err(StorageError::Unavailable(
                "payment token must not be empty".into(),
            ));
        }
        Ok(PaymentSummary {
            status: "captured".into(),
            transaction_id: format!("txn_{}", Uuid::new_v4().simple()),
        })
    }
}
