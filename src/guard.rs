//! Process-wide kill switch.
//!
//! A single configuration flag disables the entire gateway without a
//! deployment. The flag is read per request and never cached; it is
//! read-only at request time so no synchronization is needed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::GatewayConfig;
use crate::errors::ServiceError;
use crate::AppState;

const DISABLED_SENTINEL: &str = "disabled";

/// The gateway serves traffic unless the config carries the explicit
/// `disabled` sentinel. Absence or any other value means enabled.
pub fn is_enabled(config: &GatewayConfig) -> bool {
    config.status != DISABLED_SENTINEL
}

/// Returns the unavailability response when the switch is engaged, else
/// `None` and the caller proceeds.
pub fn guard(config: &GatewayConfig) -> Option<Response> {
    if is_enabled(config) {
        return None;
    }
    Some(
        ServiceError::ServiceUnavailable {
            retry_after_secs: config.retry_after_secs,
        }
        .into_response(),
    )
}

/// Axum middleware mounted ahead of every gateway route, before any
/// credential or storage access.
pub async fn kill_switch(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(response) = guard(&state.config.gateway) {
        return response;
    }
    next.run(request).await
}
