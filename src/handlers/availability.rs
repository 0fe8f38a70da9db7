//! Batch stock/price queries: a computed projection over current stock,
//! never persisted.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::outbound::to_external_money;
use crate::adapter::wire::{
    AvailabilityRequest, AvailabilityResponse, ExternalAvailability, OfferAvailability,
};
use crate::auth::API_KEY_HEADER;
use crate::errors::ServiceError;
use crate::handlers::MerchantIdQuery;
use crate::money::Money;
use crate::AppState;

pub async fn post_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MerchantIdQuery>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Response, ServiceError> {
    availability_response(&state, &headers, query.merchant_id.as_deref(), request).await
}

pub(crate) async fn availability_response(
    state: &AppState,
    headers: &HeaderMap,
    query_merchant_id: Option<&str>,
    request: AvailabilityRequest,
) -> Result<Response, ServiceError> {
    let explicit_merchant_id = query_merchant_id.or(request.merchant_id.as_deref());

    // Platform callers authenticate with a credential; storefront-triggered
    // queries are public and only need an existing, UCP-enabled merchant.
    let auth = if headers.contains_key(API_KEY_HEADER) {
        state.verifier.verify(headers, explicit_merchant_id).await?
    } else {
        let merchant_id = explicit_merchant_id.ok_or_else(|| {
            ServiceError::InvalidRequest(
                "merchantId is required for uncredentialed availability queries".into(),
            )
        })?;
        state.verifier.verify_public(merchant_id).await?
    };

    if request.products.is_empty() {
        return Err(ServiceError::InvalidRequest(
            "availability query requires at least one product".into(),
        ));
    }
    let max_items = state.config.gateway.max_availability_items;
    if request.products.len() > max_items {
        return Err(ServiceError::InvalidRequest(format!(
            "availability query is limited to {max_items} products per call"
        )));
    }

    let offer_ids: Vec<String> = request
        .products
        .iter()
        .map(|p| p.offer_id.clone())
        .collect();
    let stock = state
        .stock
        .availability(&auth.merchant_id, &offer_ids)
        .await?;

    let currency = state.config.gateway.currency.clone();
    let products = request
        .products
        .iter()
        .map(|item| match stock.get(&item.offer_id) {
            Some(entry) if i64::from(item.quantity) <= entry.available => OfferAvailability {
                offer_id: item.offer_id.clone(),
                availability: ExternalAvailability::InStock,
                price: to_external_money(&entry.price),
                quantity: item.quantity,
                max_quantity: entry.available,
            },
            Some(entry) => OfferAvailability {
                offer_id: item.offer_id.clone(),
                availability: ExternalAvailability::OutOfStock,
                price: to_external_money(&entry.price),
                quantity: 0,
                max_quantity: entry.available,
            },
            None => OfferAvailability {
                offer_id: item.offer_id.clone(),
                availability: ExternalAvailability::OutOfStock,
                price: to_external_money(&Money::zero(&currency)),
                quantity: 0,
                max_quantity: 0,
            },
        })
        .collect();

    Ok(Json(AvailabilityResponse { products }).into_response())
}
