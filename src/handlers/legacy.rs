//! Legacy entry points.
//!
//! These routes delegate to the same handlers as their v1 counterparts and
//! differ only by the deprecation headers; behavior never diverges.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::wire::AvailabilityRequest;
use crate::deprecation::decorate;
use crate::handlers::{availability, profile, MerchantIdQuery};
use crate::AppState;

pub async fn legacy_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MerchantIdQuery>,
) -> Response {
    let response = profile::profile_response(&state, &headers, query.merchant_id.as_deref())
        .await
        .unwrap_or_else(|e| e.into_response());
    decorate(response, "/ucp/v1/profile")
}

pub async fn legacy_discovery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MerchantIdQuery>,
) -> Response {
    let response = profile::profile_response(&state, &headers, query.merchant_id.as_deref())
        .await
        .unwrap_or_else(|e| e.into_response());
    decorate(response, "/.well-known/ucp")
}

pub async fn legacy_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MerchantIdQuery>,
    Json(request): Json<AvailabilityRequest>,
) -> Response {
    let response = availability::availability_response(
        &state,
        &headers,
        query.merchant_id.as_deref(),
        request,
    )
    .await
    .unwrap_or_else(|e| e.into_response());
    decorate(response, "/ucp/v1/products/availability")
}
