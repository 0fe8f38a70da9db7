//! Checkout-session entry points.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::adapter::{
    inbound::{from_external_address, from_external_cart},
    outbound::{to_external_order, to_external_session},
    wire::{
        CheckoutCompleteResponse, CheckoutSessionCompleteRequest, CheckoutSessionCreateRequest,
        CheckoutSessionUpdateRequest,
    },
};
use crate::auth::AuthContext;
use crate::errors::ServiceError;
use crate::models::{CheckoutSession, CheckoutSessionStatus, LineItem, Order, OrderStatus};
use crate::money::Money;
use crate::storage::ShippingOption;
use crate::AppState;

pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutSessionCreateRequest>,
) -> Result<Response, ServiceError> {
    let auth = state.verifier.verify(&headers, None).await?;

    let merchant = state
        .merchants
        .get(&auth.merchant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("merchant not found".into()))?;
    let settings = merchant.ucp_settings().ok_or(ServiceError::UcpDisabled)?;

    let items = build_line_items(&state, &auth, from_external_cart(&request.cart)?).await?;

    let shipping_address = match request.shipping_address {
        Some(address) => {
            let address = from_external_address(address);
            address.validate()?;
            Some(address)
        }
        None => None,
    };

    let delivery_options = match &shipping_address {
        Some(address) => state.shipping.options(&auth.merchant_id, address).await?,
        None => Vec::new(),
    };

    let currency = state.config.gateway.currency.clone();
    let cart = state
        .pricing
        .price_cart(&auth.merchant_id, items, Money::zero(&currency))
        .await?;

    let now = Utc::now();
    let session = CheckoutSession {
        id: Uuid::new_v4().to_string(),
        merchant_id: auth.merchant_id.clone(),
        tenant_id: auth.tenant_id.clone(),
        status: CheckoutSessionStatus::Pending,
        cart,
        shipping_address,
        billing_address: None,
        payment_handlers: settings.payment_handlers.clone(),
        selected_payment_method: None,
        selected_delivery_option: None,
        buyer_email: request.buyer.as_ref().and_then(|b| b.email.clone()),
        buyer_phone: request.buyer.as_ref().and_then(|b| b.phone.clone()),
        expires_at: now + Duration::seconds(state.config.gateway.session_ttl_secs as i64),
        created_at: now,
        updated_at: now,
    };

    state.sessions.insert(session.clone()).await?;
    info!(session_id = %session.id, merchant_id = %auth.merchant_id, "created checkout session");

    Ok((
        StatusCode::CREATED,
        Json(to_external_session(&session, &delivery_options)),
    )
        .into_response())
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let auth = state.verifier.verify(&headers, None).await?;
    let session = load_session(&state, &auth, &session_id).await?;
    let delivery_options = options_for(&state, &session).await?;
    Ok(Json(to_external_session(&session, &delivery_options)).into_response())
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CheckoutSessionUpdateRequest>,
) -> Result<Response, ServiceError> {
    let auth = state.verifier.verify(&headers, None).await?;
    let mut session = load_session(&state, &auth, &session_id).await?;
    ensure_open(&session)?;
    let expected_updated_at = session.updated_at;

    if let Some(address) = request.shipping_address {
        let address = from_external_address(address);
        address.validate()?;
        let changed = session.shipping_address.as_ref() != Some(&address);
        session.shipping_address = Some(address);
        if changed {
            // A new destination invalidates any previously chosen option.
            session.selected_delivery_option = None;
        }
    }

    if let Some(address) = request.billing_address {
        let address = from_external_address(address);
        address.validate()?;
        session.billing_address = Some(address);
    }

    if let Some(method) = request.payment_method {
        if !session.payment_handlers.iter().any(|h| h == &method) {
            return Err(ServiceError::InvalidRequest(format!(
                "payment method {method} is not offered by this merchant"
            )));
        }
        session.selected_payment_method = Some(method);
    }

    let delivery_options = options_for(&state, &session).await?;
    if let Some(option_id) = request.delivery_option_id {
        if !delivery_options.iter().any(|o| o.id == option_id) {
            return Err(ServiceError::InvalidRequest(format!(
                "delivery option {option_id} is not valid for this session"
            )));
        }
        session.selected_delivery_option = Some(option_id);
    }

    let shipping_fee = session
        .selected_delivery_option
        .as_ref()
        .and_then(|id| delivery_options.iter().find(|o| &o.id == id))
        .map(|o| o.fee.clone())
        .unwrap_or_else(|| Money::zero(&state.config.gateway.currency));
    session.cart = state
        .pricing
        .price_cart(&auth.merchant_id, session.cart.items.clone(), shipping_fee)
        .await?;

    if session.status == CheckoutSessionStatus::Pending
        && session.shipping_address.is_some()
        && session.selected_payment_method.is_some()
        && session
            .status
            .can_transition_to(CheckoutSessionStatus::AwaitingPayment)
    {
        session.status = CheckoutSessionStatus::AwaitingPayment;
    }

    let now = Utc::now();
    session.updated_at = now;
    session.expires_at = now + Duration::seconds(state.config.gateway.session_ttl_secs as i64);

    let session = state.sessions.update(expected_updated_at, session).await?;
    info!(session_id = %session.id, "updated checkout session");
    Ok(Json(to_external_session(&session, &delivery_options)).into_response())
}

pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CheckoutSessionCompleteRequest>,
) -> Result<Response, ServiceError> {
    let auth = state.verifier.verify(&headers, None).await?;
    let mut session = load_session(&state, &auth, &session_id).await?;
    ensure_open(&session)?;
    let expected_updated_at = session.updated_at;

    if session.status == CheckoutSessionStatus::Pending {
        return Err(ServiceError::InvalidRequest(
            "session requires a shipping address and payment method before completion".into(),
        ));
    }
    let payment_method = session
        .selected_payment_method
        .clone()
        .ok_or_else(|| ServiceError::InvalidRequest("no payment method selected".into()))?;
    if session.shipping_address.is_none() {
        return Err(ServiceError::InvalidRequest(
            "no shipping address provided".into(),
        ));
    }
    let delivery_options = options_for(&state, &session).await?;
    match &session.selected_delivery_option {
        Some(option_id) if delivery_options.iter().any(|o| &o.id == option_id) => {}
        Some(option_id) => {
            return Err(ServiceError::InvalidRequest(format!(
                "delivery option {option_id} is no longer valid for this session"
            )));
        }
        None => {
            return Err(ServiceError::InvalidRequest(
                "no delivery option selected".into(),
            ));
        }
    }

    if session.status == CheckoutSessionStatus::AwaitingPayment {
        session.status = CheckoutSessionStatus::Processing;
    }
    session.updated_at = Utc::now();
    // Claim the session by persisting Processing first. Of two racing
    // completes, the loser's compare-and-swap fails here, before any payment
    // is captured or an order exists.
    let mut session = state.sessions.update(expected_updated_at, session).await?;
    let processing_updated_at = session.updated_at;

    let payment = state
        .payments
        .authorize(
            &auth.merchant_id,
            &payment_method,
            &request.payment_token,
            &session.cart.total,
        )
        .await?;

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        merchant_id: auth.merchant_id.clone(),
        tenant_id: auth.tenant_id.clone(),
        merchant_order_ref: request
            .merchant_order_ref
            .unwrap_or_else(|| format!("UCP-{}", Uuid::new_v4().simple())),
        status: OrderStatus::Pending,
        cart: session.cart.clone(),
        shipping_address: session.shipping_address.clone(),
        billing_address: session.billing_address.clone(),
        payment,
        created_at: now,
        updated_at: now,
    };
    state.orders.insert(order.clone()).await?;

    session.status = CheckoutSessionStatus::Completed;
    session.updated_at = now;
    let session = state
        .sessions
        .update(processing_updated_at, session)
        .await?;
    info!(session_id = %session.id, order_id = %order.id, "completed checkout session");

    Ok(Json(CheckoutCompleteResponse {
        session: to_external_session(&session, &delivery_options),
        order: to_external_order(&order),
    })
    .into_response())
}

pub async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let auth = state.verifier.verify(&headers, None).await?;
    let mut session = load_session(&state, &auth, &session_id).await?;
    ensure_open(&session)?;
    let expected_updated_at = session.updated_at;

    session.status = CheckoutSessionStatus::Cancelled;
    session.updated_at = Utc::now();
    let session = state.sessions.update(expected_updated_at, session).await?;
    info!(session_id = %session.id, "cancelled checkout session");

    let delivery_options = options_for(&state, &session).await?;
    Ok(Json(to_external_session(&session, &delivery_options)).into_response())
}

/// Load a session owned by the authenticated merchant, applying the
/// time-based expiry branch before anyone observes a stale status.
async fn load_session(
    state: &AppState,
    auth: &AuthContext,
    session_id: &str,
) -> Result<CheckoutSession, ServiceError> {
    let mut session = state
        .sessions
        .get(&auth.merchant_id, session_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("checkout session {session_id} not found")))?;

    let expected_updated_at = session.updated_at;
    if session.expire_if_due(Utc::now()) {
        session = state.sessions.update(expected_updated_at, session).await?;
        info!(session_id = %session.id, "checkout session expired");
    }
    Ok(session)
}

fn ensure_open(session: &CheckoutSession) -> Result<(), ServiceError> {
    if session.status.is_terminal() {
        return Err(ServiceError::InvalidRequest(format!(
            "checkout session {} is no longer open",
            session.id
        )));
    }
    Ok(())
}

async fn options_for(
    state: &AppState,
    session: &CheckoutSession,
) -> Result<Vec<ShippingOption>, ServiceError> {
    match &session.shipping_address {
        Some(address) => Ok(state.shipping.options(&session.merchant_id, address).await?),
        None => Ok(Vec::new()),
    }
}

async fn build_line_items(
    state: &AppState,
    auth: &AuthContext,
    requested: Vec<(String, u32)>,
) -> Result<Vec<LineItem>, ServiceError> {
    let offer_ids: Vec<String> = requested.iter().map(|(id, _)| id.clone()).collect();
    let stock = state.stock.availability(&auth.merchant_id, &offer_ids).await?;

    requested
        .into_iter()
        .map(|(offer_id, quantity)| {
            let entry = stock.get(&offer_id).ok_or_else(|| {
                ServiceError::InvalidRequest(format!("unknown offer {offer_id}"))
            })?;
            Ok(LineItem {
                offer_id,
                quantity,
                unit_price: entry.price.clone(),
            })
        })
        .collect()
}
