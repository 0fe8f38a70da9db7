//! Order lookup, scoped to the authenticated merchant.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::outbound::to_external_order;
use crate::errors::ServiceError;
use crate::AppState;

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let auth = state.verifier.verify(&headers, None).await?;

    let order = state
        .orders
        .get(&auth.merchant_id, &order_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("order {order_id} not found")))?;

    Ok(Json(to_external_order(&order)).into_response())
}
