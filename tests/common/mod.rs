#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use std::collections::HashSet;
use tower::ServiceExt;

use ucp_gateway::auth::{CredentialVerifier, API_KEY_HEADER};
use ucp_gateway::config::AppConfig;
use ucp_gateway::models::{Merchant, UcpConfig, UcpSettings};
use ucp_gateway::money::Money;
use ucp_gateway::storage::OfferStock;
use ucp_gateway::{app, AppState, MemoryHandles};

pub struct TestGateway {
    pub router: Router,
    pub handles: MemoryHandles,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let (state, handles) = AppState::in_memory(config);
        Self {
            router: app(state),
            handles,
        }
    }

    /// Seed a UCP-enabled merchant whose API key is `key`.
    pub fn seed_merchant(&self, id: &str, key: &str) {
        self.handles
            .merchants
            .insert(merchant(id, key, true))
            .expect("merchant seed should not collide");
    }

    pub fn seed_stock(&self, merchant_id: &str, offer_id: &str, price_minor: i64, available: i64) {
        self.handles.stock.set_stock(
            merchant_id,
            offer_id,
            OfferStock {
                price: Money {
                    amount_minor: price_minor,
                    currency: "TWD".into(),
                },
                available,
            },
        );
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level")
    }
}

pub fn merchant(id: &str, key: &str, enabled: bool) -> Merchant {
    Merchant {
        id: id.into(),
        tenant_id: format!("tenant-{id}"),
        name: format!("Shop {id}"),
        hostname: Some(format!("{id}.example.com")),
        ucp: UcpConfig::Configured(UcpSettings {
            enabled,
            api_key_hash: CredentialVerifier::hash_api_key(key),
            allowed_platforms: HashSet::new(),
            payment_handlers: vec!["credit_card".into(), "e_wallet".into()],
            shipping_countries: vec!["TW".into()],
            supported_actions: ["checkout", "availability"]
                .iter()
                .map(|a| a.to_string())
                .collect(),
        }),
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
