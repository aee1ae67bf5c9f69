//! # Handler Tests
//!
//! Requests go through the full router (auth middleware, response mapping,
//! request stamping) against an in-memory database.

mod admin;
mod inventory;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_auth::{encode_jwt, hash_password};
use lib_chain::mock::MockTransport;
use lib_chain::RpcTransport;
use lib_core::config::{ChainConfig, ChainMode};
use lib_core::model::store::UserRepository;
use lib_core::model::{Role, User, UserForCreate};
use lib_core::{memory_pool, Config};
use serde_json::Value;
use tower::ServiceExt;

use crate::server::{create_router, AppState};

pub const CONTRACT: &str = "0x9999999999999999999999999999999999999999";

/// Create test config
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        jwt_expiration_hours: 24,
        chain: ChainConfig::demo(),
        data_cache_ttl_secs: 300,
        session_sync_debounce_ms: 60_000,
    }
}

/// Config pointing the chain client at a scripted transport.
pub fn chain_config(mode: ChainMode) -> Config {
    let mut config = test_config();
    config.chain.rpc_url = Some("mock://node".to_string());
    config.chain.contract_address = Some(CONTRACT.to_string());
    config.chain.mode = mode;
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(test_config(), None).await
    }

    pub async fn with_chain(mode: ChainMode, mock: MockTransport) -> Self {
        let transport = Arc::new(mock) as Arc<dyn RpcTransport>;
        Self::build(chain_config(mode), Some(transport)).await
    }

    async fn build(config: Config, transport: Option<Arc<dyn RpcTransport>>) -> Self {
        let pool = memory_pool().await.expect("Failed to create test database");
        let state = AppState::with_transport(pool, config, transport);
        let router = create_router(state.clone(), &[]);
        Self { router, state }
    }

    /// Insert a user directly and return it with a valid token.
    pub async fn user(&self, name: &str, role: Role) -> (User, String) {
        let email = format!("{}@example.com", name.to_lowercase());
        let hash = hash_password("Password123!").expect("hash");
        let user = UserRepository::create(
            &self.state.db,
            UserForCreate::new(name.to_string(), email, hash, role).admin(role == Role::Admin),
        )
        .await
        .expect("Failed to create user");

        let token = encode_jwt(
            user.id,
            user.name.clone(),
            user.role.as_str(),
            user.is_admin,
            &self.state.config.jwt_secret,
            1,
        )
        .expect("token");
        (user, token)
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, token, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chain_mode"], "demo");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/api/parts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "Unauthorized");

    let (status, _) = app.send("GET", "/api/parts", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/api/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = TestApp::new().await;

    let response = app.raw("GET", "/health", None, None).await;

    assert!(response.headers().contains_key(crate::middleware::mw_req_stamp::REQUEST_ID_HEADER));
}
