//! Merchant capability discovery.
//!
//! Resolves the merchant preferentially from the request hostname (discovery
//! document use case) and falls back to an explicit identifier (legacy use
//! case). "Merchant not found" stays distinct from "UCP disabled" so
//! operators can diagnose misconfiguration.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::outbound::to_merchant_profile;
use crate::errors::ServiceError;
use crate::handlers::MerchantIdQuery;
use crate::models::Merchant;
use crate::AppState;

const PROFILE_CACHE_CONTROL: &str = "public, max-age=300";

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MerchantIdQuery>,
) -> Result<Response, ServiceError> {
    profile_response(&state, &headers, query.merchant_id.as_deref()).await
}

pub(crate) async fn profile_response(
    state: &AppState,
    headers: &HeaderMap,
    explicit_merchant_id: Option<&str>,
) -> Result<Response, ServiceError> {
    let merchant = resolve_merchant(state, headers, explicit_merchant_id).await?;

    let settings = merchant
        .ucp_settings()
        .ok_or(ServiceError::UcpDisabled)?;
    if !settings.enabled {
        return Err(ServiceError::UcpDisabled);
    }

    let profile = to_merchant_profile(&merchant)
        .ok_or_else(|| ServiceError::Internal("configured merchant lost its settings".into()))?;

    let mut response = Json(profile).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(PROFILE_CACHE_CONTROL),
    );
    Ok(response)
}

async fn resolve_merchant(
    state: &AppState,
    headers: &HeaderMap,
    explicit_merchant_id: Option<&str>,
) -> Result<Merchant, ServiceError> {
    if let Some(host) = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|h| h.split(':').next().unwrap_or(h))
    {
        if let Some(merchant) = state.merchants.find_by_hostname(host).await? {
            return Ok(merchant);
        }
    }

    if let Some(merchant_id) = explicit_merchant_id {
        if let Some(merchant) = state.merchants.get(merchant_id).await? {
            return Ok(merchant);
        }
    }

    Err(ServiceError::NotFound("merchant not found".into()))
}
