//! UCP Gateway
//!
//! Exposes a merchant's checkout, order, and availability capabilities to an
//! external commerce platform through a versioned, authenticated API, with
//! every partner interaction scoped to one tenant/merchant.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod adapter;
pub mod auth;
pub mod config;
pub mod deprecation;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod money;
pub mod storage;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::CredentialVerifier;
use crate::config::AppConfig;
use crate::metrics::GatewayMetrics;
use crate::storage::memory::{
    MemoryMerchantStore, MemoryOrderStore, MemoryPaymentProcessor, MemoryPricingProvider,
    MemorySessionStore, MemoryShippingProvider, MemoryStockStore,
};
use crate::storage::{
    MerchantStore, OrderStore, PaymentProcessor, PricingProvider, SessionStore, ShippingProvider,
    StockStore,
};

/// Shared per-process state. Handlers are stateless per invocation; all
/// mutation happens behind the collaborator traits or the metrics registry.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub verifier: CredentialVerifier,
    pub merchants: Arc<dyn MerchantStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub orders: Arc<dyn OrderStore>,
    pub stock: Arc<dyn StockStore>,
    pub shipping: Arc<dyn ShippingProvider>,
    pub pricing: Arc<dyn PricingProvider>,
    pub payments: Arc<dyn PaymentProcessor>,
    pub metrics: Arc<GatewayMetrics>,
}

/// Concrete handles to the in-memory collaborators, kept so callers (the
/// standalone binary, tests) can seed data after constructing the state.
pub struct MemoryHandles {
    pub merchants: Arc<MemoryMerchantStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub orders: Arc<MemoryOrderStore>,
    pub stock: Arc<MemoryStockStore>,
}

impl AppState {
    /// State wired to the in-memory collaborator implementations.
    pub fn in_memory(config: AppConfig) -> (Self, MemoryHandles) {
        let merchants = Arc::new(MemoryMerchantStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let orders = Arc::new(MemoryOrderStore::new());
        let stock = Arc::new(MemoryStockStore::new());
        let currency = config.gateway.currency.clone();

        let state = Self {
            verifier: CredentialVerifier::new(merchants.clone()),
            merchants: merchants.clone(),
            sessions: sessions.clone(),
            orders: orders.clone(),
            stock: stock.clone(),
            shipping: Arc::new(MemoryShippingProvider::new(currency.clone())),
            pricing: Arc::new(MemoryPricingProvider::new(currency)),
            payments: Arc::new(MemoryPaymentProcessor),
            metrics: Arc::new(GatewayMetrics::new()),
            config,
        };
        let handles = MemoryHandles {
            merchants,
            sessions,
            orders,
            stock,
        };
        (state, handles)
    }
}

/// Canonical v1 routes.
fn ucp_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile::get_profile))
        .route(
            "/checkout-sessions",
            post(handlers::checkout::create_session),
        )
        .route(
            "/checkout-sessions/:session_id",
            get(handlers::checkout::get_session).put(handlers::checkout::update_session),
        )
        .route(
            "/checkout-sessions/:session_id/complete",
            post(handlers::checkout::complete_session),
        )
        .route(
            "/checkout-sessions/:session_id/cancel",
            post(handlers::checkout::cancel_session),
        )
        .route("/orders/:order_id", get(handlers::orders::get_order))
        .route(
            "/products/availability",
            post(handlers::availability::post_availability),
        )
}

/// Previous URL generation, served by the same handlers behind the
/// deprecation decorator.
fn legacy_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::legacy::legacy_profile))
        .route("/discovery", get(handlers::legacy::legacy_discovery))
        .route(
            "/availability",
            post(handlers::legacy::legacy_availability),
        )
}

/// Assemble the full application router. The kill switch runs outermost,
/// before metrics, credentials, or storage; the operator endpoints
/// (`/healthz`, `/metrics`) stay reachable while the switch is engaged.
pub fn app(state: AppState) -> Router {
    let gateway = Router::new()
        .nest("/ucp/v1", ucp_v1_routes())
        .route(
            "/.well-known/ucp",
            get(handlers::profile::get_profile),
        )
        .nest("/api/ucp", legacy_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::kill_switch,
        ));

    Router::new()
        .merge(gateway)
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ucp-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
