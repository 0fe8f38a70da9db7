//! Internal entity -> external response mapping, including the status
//! remapping tables. The matches are exhaustive on purpose: adding an
//! internal state without an external mapping must not compile.

use crate::adapter::wire::{
    CheckoutSessionResponse, ExternalAddress, ExternalCartView, ExternalCheckoutState,
    ExternalDeliveryOption, ExternalLineItem, ExternalMoney, ExternalOrderState,
    ExternalPaymentSummary, MerchantProfile, OrderResponse,
};
use crate::models::{
    Address, Cart, CheckoutSession, CheckoutSessionStatus, Merchant, Order, OrderStatus,
};
use crate::money::Money;
use crate::storage::ShippingOption;

pub const UCP_VERSION: &str = "2025-06";

/// Collapse the six internal checkout states onto the four-state external
/// contract. The many-to-one shape is intentional; the external protocol
/// genuinely has fewer states.
pub fn to_external_checkout_state(status: CheckoutSessionStatus) -> ExternalCheckoutState {
    match status {
        CheckoutSessionStatus::Pending => ExternalCheckoutState::Created,
        CheckoutSessionStatus::AwaitingPayment | CheckoutSessionStatus::Processing => {
            ExternalCheckoutState::Open
        }
        CheckoutSessionStatus::Completed | CheckoutSessionStatus::Cancelled => {
            ExternalCheckoutState::Closed
        }
        CheckoutSessionStatus::Expired => ExternalCheckoutState::Expired,
    }
}

pub fn to_external_order_state(status: OrderStatus) -> ExternalOrderState {
    match status {
        OrderStatus::Pending => ExternalOrderState::Created,
        OrderStatus::Confirmed | OrderStatus::Processing | OrderStatus::Shipped => {
            ExternalOrderState::InProgress
        }
        OrderStatus::Delivered => ExternalOrderState::Completed,
        OrderStatus::Cancelled | OrderStatus::Refunded => ExternalOrderState::Cancelled,
    }
}

pub fn to_external_money(money: &Money) -> ExternalMoney {
    ExternalMoney {
        amount: money.amount_minor,
        currency: money.currency.clone(),
    }
}

pub fn to_external_address(address: &Address) -> ExternalAddress {
    ExternalAddress {
        recipient: address.recipient.clone(),
        address_lines: address.lines.clone(),
        locality: address.locality.clone(),
        administrative_area: address.administrative_area.clone(),
        postal_code: address.postal_code.clone(),
        region_code: Some(address.region.clone()),
        phone: address.phone.clone(),
    }
}

pub fn to_external_cart(cart: &Cart) -> ExternalCartView {
    ExternalCartView {
        line_items: cart
            .items
            .iter()
            .map(|item| ExternalLineItem {
                offer_id: item.offer_id.clone(),
                quantity: item.quantity,
                unit_price: to_external_money(&item.unit_price),
            })
            .collect(),
        subtotal: to_external_money(&cart.subtotal),
        shipping_fee: to_external_money(&cart.shipping_fee),
        tax: to_external_money(&cart.tax),
        total: to_external_money(&cart.total),
    }
}

pub fn to_external_session(
    session: &CheckoutSession,
    delivery_options: &[ShippingOption],
) -> CheckoutSessionResponse {
    CheckoutSessionResponse {
        id: session.id.clone(),
        merchant_id: session.merchant_id.clone(),
        status: to_external_checkout_state(session.status),
        cart: to_external_cart(&session.cart),
        shipping_address: session.shipping_address.as_ref().map(to_external_address),
        billing_address: session.billing_address.as_ref().map(to_external_address),
        payment_handlers: session.payment_handlers.clone(),
        selected_payment_method: session.selected_payment_method.clone(),
        delivery_options: delivery_options
            .iter()
            .map(|option| ExternalDeliveryOption {
                id: option.id.clone(),
                label: option.label.clone(),
                fee: to_external_money(&option.fee),
            })
            .collect(),
        selected_delivery_option: session.selected_delivery_option.clone(),
        expires_at: session.expires_at,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }
}

pub fn to_external_order(order: &Order) -> OrderResponse {
    OrderResponse {
        id: order.id.clone(),
        merchant_order_ref: order.merchant_order_ref.clone(),
        status: to_external_order_state(order.status),
        cart: to_external_cart(&order.cart),
        shipping_address: order.shipping_address.as_ref().map(to_external_address),
        billing_address: order.billing_address.as_ref().map(to_external_address),
        payment: ExternalPaymentSummary {
            status: order.payment.status.clone(),
            transaction_id: order.payment.transaction_id.clone(),
        },
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

/// Capability declaration for the discovery document. Set-valued fields are
/// sorted so the document serializes identically on every call.
pub fn to_merchant_profile(merchant: &Merchant) -> Option<MerchantProfile> {
    let settings = merchant.ucp_settings()?;
    let mut supported_actions: Vec<String> = settings.supported_actions.iter().cloned().collect();
    supported_actions.sort();
    Some(MerchantProfile {
        ucp_version: UCP_VERSION.to_string(),
        merchant_id: merchant.id.clone(),
        name: merchant.name.clone(),
        payment_handlers: settings.payment_handlers.clone(),
        shipping_countries: settings.shipping_countries.clone(),
        supported_actions,
        checkout_sessions_endpoint: "/ucp/v1/checkout-sessions".to_string(),
        availability_endpoint: "/ucp/v1/products/availability".to_string(),
    })
}
