//! External UCP request/response shapes. Field names follow the protocol's
//! camelCase convention; these types never leak into the domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol money: integer minor units plus ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMoney {
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub address_lines: Vec<String>,
    pub locality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,
    pub postal_code: String,
    /// Defaults to `TW` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// The external cart nests an offer reference inside each line; the inbound
/// mapping flattens this into the internal line-item list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCart {
    pub line_items: Vec<ExternalCartLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCartLine {
    pub offer: ExternalOfferRef,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalOfferRef {
    pub offer_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalBuyer {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionCreateRequest {
    pub cart: ExternalCart,
    pub shipping_address: Option<ExternalAddress>,
    pub buyer: Option<ExternalBuyer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionUpdateRequest {
    pub shipping_address: Option<ExternalAddress>,
    pub billing_address: Option<ExternalAddress>,
    pub payment_method: Option<String>,
    pub delivery_option_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionCompleteRequest {
    /// Opaque payment token forwarded to the payment collaborator.
    pub payment_token: String,
    pub merchant_order_ref: Option<String>,
}

/// External checkout states: a deliberate many-to-one collapse of the six
/// internal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalCheckoutState {
    Created,
    Open,
    Closed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalOrderState {
    Created,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalAvailability {
    InStock,
    OutOfStock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLineItem {
    pub offer_id: String,
    pub quantity: u32,
    pub unit_price: ExternalMoney,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCartView {
    pub line_items: Vec<ExternalLineItem>,
    pub subtotal: ExternalMoney,
    pub shipping_fee: ExternalMoney,
    pub tax: ExternalMoney,
    pub total: ExternalMoney,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDeliveryOption {
    pub id: String,
    pub label: String,
    pub fee: ExternalMoney,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub id: String,
    pub merchant_id: String,
    pub status: ExternalCheckoutState,
    pub cart: ExternalCartView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ExternalAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<ExternalAddress>,
    pub payment_handlers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_payment_method: Option<String>,
    pub delivery_options: Vec<ExternalDeliveryOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_delivery_option: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPaymentSummary {
    pub status: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub merchant_order_ref: String,
    pub status: ExternalOrderState,
    pub cart: ExternalCartView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ExternalAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<ExternalAddress>,
    pub payment: ExternalPaymentSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCompleteResponse {
    pub session: CheckoutSessionResponse,
    pub order: OrderResponse,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    /// Legacy callers identify the merchant in the body; credentialed callers
    /// are resolved through the verifier instead.
    pub merchant_id: Option<String>,
    pub products: Vec<AvailabilityQueryItem>,
    pub shipping_address: Option<ExternalAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQueryItem {
    pub offer_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub products: Vec<OfferAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAvailability {
    pub offer_id: String,
    pub availability: ExternalAvailability,
    pub price: ExternalMoney,
    pub quantity: u32,
    pub max_quantity: i64,
}

/// Merchant capability declaration consumed by the platform before any
/// session begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantProfile {
    pub ucp_version: String,
    pub merchant_id: String,
    pub name: String,
    pub payment_handlers: Vec<String>,
    pub shipping_countries: Vec<String>,
    pub supported_actions: Vec<String>,
    pub checkout_sessions_endpoint: String,
    pub availability_endpoint: String,
}
