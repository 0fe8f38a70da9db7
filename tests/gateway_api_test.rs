mod common;

use async_trait::async_trait;
use axum::http::{header, Method, StatusCode};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{body_bytes, body_json, merchant, TestGateway};
use ucp_gateway::auth::CredentialVerifier;
use ucp_gateway::config::{AppConfig, GatewayConfig};
use ucp_gateway::metrics::GatewayMetrics;
use ucp_gateway::models::Merchant;
use ucp_gateway::storage::memory::{
    MemoryMerchantStore, MemoryOrderStore, MemoryPaymentProcessor, MemoryPricingProvider,
    MemorySessionStore, MemoryShippingProvider, MemoryStockStore,
};
use ucp_gateway::storage::{MerchantStore, StorageError};
use ucp_gateway::{app, AppState};

/// Merchant store that counts every lookup, so tests can assert the kill
/// switch short-circuits before any storage or credential access.
struct CountingMerchantStore {
    inner: MemoryMerchantStore,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MerchantStore for CountingMerchantStore {
    async fn get(&self, merchant_id: &str) -> Result<Option<Merchant>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(merchant_id).await
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Merchant>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_hostname(hostname).await
    }

    async fn list_ucp_enabled(&self) -> Result<Vec<Merchant>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_ucp_enabled().await
    }
}

fn disabled_gateway_with_counter() -> (axum::Router, Arc<AtomicUsize>) {
    let config = AppConfig {
        gateway: GatewayConfig {
            status: "disabled".into(),
            ..GatewayConfig::default()
        },
        ..AppConfig::default()
    };
    let calls = Arc::new(AtomicUsize::new(0));
    let inner = MemoryMerchantStore::new();
    inner.insert(merchant("m1", "sk_live_m1", true)).unwrap();
    let merchants = Arc::new(CountingMerchantStore {
        inner,
        calls: calls.clone(),
    });

    let state = AppState {
        verifier: CredentialVerifier::new(merchants.clone()),
        merchants,
        sessions: Arc::new(MemorySessionStore::new()),
        orders: Arc::new(MemoryOrderStore::new()),
        stock: Arc::new(MemoryStockStore::new()),
        shipping: Arc::new(MemoryShippingProvider::new("TWD")),
        pricing: Arc::new(MemoryPricingProvider::new("TWD")),
        payments: Arc::new(MemoryPaymentProcessor),
        metrics: Arc::new(GatewayMetrics::new()),
        config,
    };
    (app(state), calls)
}

#[tokio::test]
async fn kill_switch_short_circuits_every_entry_point() {
    use tower::ServiceExt;

    let (router, calls) = disabled_gateway_with_counter();
    let entry_points = [
        (Method::GET, "/ucp/v1/profile?merchant_id=m1"),
        (Method::GET, "/.well-known/ucp"),
        (Method::POST, "/ucp/v1/checkout-sessions"),
        (Method::GET, "/ucp/v1/checkout-sessions/s1"),
        (Method::GET, "/ucp/v1/orders/o1"),
        (Method::POST, "/ucp/v1/products/availability"),
        (Method::GET, "/api/ucp/profile?merchant_id=m1"),
        (Method::GET, "/api/ucp/discovery"),
        (Method::POST, "/api/ucp/availability"),
    ];

    for (method, uri) in entry_points {
        let request = axum::http::Request::builder()
            .method(method.clone())
            .uri(uri)
            .header("x-ucp-api-key", "sk_live_m1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{}"))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::SERVICE_UNAVAILABLE,
            "{method} {uri} should be short-circuited"
        );
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        let payload = body_json(response).await;
        assert_eq!(payload["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    // No credential or storage access happened for any of the calls above.
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Operator endpoints stay reachable while the switch is engaged.
    let health = router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/healthz")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn availability_batch_matches_stock_projection() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");
    gateway.seed_stock("m1", "offer-a", 19900, 5);
    gateway.seed_stock("m1", "offer-b", 9900, 3);

    let response = gateway
        .send(
            Method::POST,
            "/ucp/v1/products/availability",
            Some("sk_live_m1"),
            Some(json!({
                "products": [
                    { "offerId": "offer-a", "quantity": 2 },
                    { "offerId": "offer-b", "quantity": 100 }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    let products = payload["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);

    assert_eq!(products[0]["offerId"], "offer-a");
    assert_eq!(products[0]["availability"], "IN_STOCK");
    assert_eq!(products[0]["quantity"], 2);
    assert_eq!(products[0]["maxQuantity"], 5);
    assert_eq!(products[0]["price"]["amount"], 19900);

    assert_eq!(products[1]["offerId"], "offer-b");
    assert_eq!(products[1]["availability"], "OUT_OF_STOCK");
    assert_eq!(products[1]["quantity"], 0);
    assert_eq!(products[1]["maxQuantity"], 3);
}

#[tokio::test]
async fn availability_is_public_with_explicit_merchant() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");
    gateway.seed_stock("m1", "offer-a", 19900, 5);

    let response = gateway
        .send(
            Method::POST,
            "/ucp/v1/products/availability",
            None,
            Some(json!({
                "merchantId": "m1",
                "products": [{ "offerId": "offer-a", "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Without a credential and without a merchant id there is nothing to
    // resolve.
    let response = gateway
        .send(
            Method::POST,
            "/ucp/v1/products/availability",
            None,
            Some(json!({ "products": [{ "offerId": "offer-a", "quantity": 1 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn availability_enforces_batch_limit() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");

    let products: Vec<_> = (0..51)
        .map(|i| json!({ "offerId": format!("offer-{i}"), "quantity": 1 }))
        .collect();
    let response = gateway
        .send(
            Method::POST,
            "/ucp/v1/products/availability",
            Some("sk_live_m1"),
            Some(json!({ "products": products })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = body_json(response).await;
    assert_eq!(payload["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn legacy_profile_is_byte_identical_apart_from_deprecation_headers() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");

    let canonical = gateway
        .send(Method::GET, "/ucp/v1/profile?merchant_id=m1", None, None)
        .await;
    assert_eq!(canonical.status(), StatusCode::OK);
    assert!(!canonical.headers().contains_key("deprecation"));

    let legacy = gateway
        .send(Method::GET, "/api/ucp/profile?merchant_id=m1", None, None)
        .await;
    assert_eq!(legacy.status(), StatusCode::OK);
    assert_eq!(legacy.headers().get("deprecation").unwrap(), "true");
    assert!(legacy.headers().contains_key("sunset"));
    assert_eq!(
        legacy.headers().get("link").unwrap(),
        "</ucp/v1/profile>; rel=\"successor-version\""
    );

    assert_eq!(body_bytes(canonical).await, body_bytes(legacy).await);
}

#[tokio::test]
async fn profile_distinguishes_missing_merchant_from_disabled_ucp() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");
    gateway
        .handles
        .merchants
        .insert(merchant("m2", "sk_live_m2", false))
        .unwrap();

    let missing = gateway
        .send(Method::GET, "/ucp/v1/profile?merchant_id=ghost", None, None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["error"]["code"], "NOT_FOUND");

    let disabled = gateway
        .send(Method::GET, "/ucp/v1/profile?merchant_id=m2", None, None)
        .await;
    assert_eq!(disabled.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(disabled).await["error"]["code"], "UCP_DISABLED");
}

#[tokio::test]
async fn discovery_document_resolves_merchant_from_hostname() {
    use tower::ServiceExt;

    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");

    let request = axum::http::Request::builder()
        .uri("/.well-known/ucp")
        .header(header::HOST, "m1.example.com")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = gateway.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=300"
    );

    let payload = body_json(response).await;
    assert_eq!(payload["merchantId"], "m1");
    assert_eq!(payload["paymentHandlers"][0], "credit_card");
    assert_eq!(
        payload["checkoutSessionsEndpoint"],
        "/ucp/v1/checkout-sessions"
    );
}

#[tokio::test]
async fn credential_errors_use_the_documented_codes() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");

    let missing = gateway
        .send(
            Method::POST,
            "/ucp/v1/checkout-sessions",
            None,
            Some(json!({ "cart": { "lineItems": [] } })),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(missing).await["error"]["code"],
        "MISSING_CREDENTIAL"
    );

    let wrong = gateway
        .send(
            Method::POST,
            "/ucp/v1/checkout-sessions",
            Some("sk_live_wrong"),
            Some(json!({ "cart": { "lineItems": [] } })),
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await["error"]["code"], "INVALID_KEY");
}

#[tokio::test]
async fn key_collision_refuses_the_request() {
    let gateway = TestGateway::new();
    // Stage the corrupted state directly; the write-time constraint would
    // reject it.
    gateway
        .handles
        .merchants
        .insert_unchecked(merchant("m1", "sk_shared", true));
    gateway
        .handles
        .merchants
        .insert_unchecked(merchant("m2", "sk_shared", true));

    let response = gateway
        .send(
            Method::GET,
            "/ucp/v1/orders/any-order",
            Some("sk_shared"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "KEY_CONFLICT");
}

#[tokio::test]
async fn metrics_report_tracks_routes() {
    let gateway = TestGateway::new();
    gateway.seed_merchant("m1", "sk_live_m1");

    for _ in 0..3 {
        gateway
            .send(Method::GET, "/ucp/v1/profile?merchant_id=m1", None, None)
            .await;
    }
    gateway
        .send(Method::GET, "/ucp/v1/profile?merchant_id=ghost", None, None)
        .await;

    let report = gateway.send(Method::GET, "/metrics", None, None).await;
    assert_eq!(report.status(), StatusCode::OK);
    let payload = body_json(report).await;
    let routes = payload["routes"].as_array().unwrap();
    let profile = routes
        .iter()
        .find(|r| r["route"] == "GET /ucp/v1/profile")
        .expect("profile route should be tracked");
    assert_eq!(profile["metrics"]["total"], 4);
    assert_eq!(profile["metrics"]["errors"], 1);
}
