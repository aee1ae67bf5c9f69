//! # Server Setup
//!
//! Application state, route registration and HTTP server startup.

// region: --- Imports
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lib_chain::{ChainOrderClient, HttpTransport, RpcTransport, WalletClient};
use lib_core::config::init_config;
use lib_core::{create_pool, run_migrations, AppError, Config, DbPool};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{log_requests, map_res, require_admin, require_auth, stamp_req, RequestStamp};
use crate::services::{DataService, InventoryService, OrderService, SessionStore};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub data: Arc<DataService>,
    pub sessions: Arc<SessionStore>,
    pub inventory: Arc<InventoryService>,
    pub orders: Arc<OrderService>,
    /// Present when a JSON-RPC endpoint is configured.
    pub wallet: Option<Arc<WalletClient>>,
}

impl AppState {
    /// Build the state, connecting the chain clients over HTTP when
    /// `CHAIN_RPC_URL` is set.
    pub fn new(db: DbPool, config: Config) -> Result<Self, AppError> {
        let transport = match config.chain.rpc_url {
            Some(ref url) => Some(Arc::new(HttpTransport::new(url.clone())?) as Arc<dyn RpcTransport>),
            None => None,
        };
        Ok(Self::with_transport(db, config, transport))
    }

    /// Build the state around an explicit transport (tests use a mock).
    pub fn with_transport(db: DbPool, config: Config, transport: Option<Arc<dyn RpcTransport>>) -> Self {
        let data = Arc::new(DataService::new(
            db.clone(),
            Duration::from_secs(config.data_cache_ttl_secs),
        ));
        let sessions = Arc::new(SessionStore::new(
            db.clone(),
            data.clone(),
            Duration::from_millis(config.session_sync_debounce_ms),
        ));
        let inventory = Arc::new(InventoryService::new(db.clone(), data.clone()));
        let chain = Arc::new(ChainOrderClient::new(&config.chain, transport.clone()));
        let orders = Arc::new(OrderService::new(db.clone(), chain, sessions.clone(), data.clone()));
        let wallet = transport.map(|t| Arc::new(WalletClient::new(t)));

        Self {
            db,
            config,
            data,
            sessions,
            inventory,
            orders,
            wallet,
        }
    }

    /// Clear cached datasets and schedule a session sync after a write.
    pub async fn touched(&self, user_id: i64) {
        self.data.invalidate_all().await;
        self.sessions.mark_dirty(user_id).await;
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Defaults, with `BIND_ADDRESS` and a comma separated `ALLOWED_ORIGINS`
    /// taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(bind) = std::env::var("BIND_ADDRESS") {
            config.bind_address = bind;
        }
        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
fn init_tracing() -> String {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(&log_level),
        other => tracing_subscriber::EnvFilter::try_new(other)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    // A subscriber may already be installed (tests, embedding binaries).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();

    log_level
}

/// Initialize and start the HTTP server.
///
/// # Errors
///
/// Fails when configuration is invalid, the database cannot be opened or
/// migrated, the chain transport cannot be built, or the address cannot be bound.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let log_level = init_tracing();

    info!(" AUTOTRACE BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = init_config().map_err(|e| anyhow::anyhow!(e))?.clone();

    info!("Database URL: {}", app_config.database_url);
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations...");
    run_migrations(&pool).await?;
    info!(" Migrations complete");

    info!(
        " Chain mode: {} (chain id {}, contract {})",
        app_config.chain.mode,
        app_config.chain.chain_id,
        app_config.chain.contract_address.as_deref().unwrap_or("not set")
    );

    let state = AppState::new(pool, app_config).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let app = create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    let public = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/health", get(handlers::health));

    let protected = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Inventory
        .route("/api/parts", get(handlers::parts::list).post(handlers::parts::create))
        .route(
            "/api/parts/{id}",
            get(handlers::parts::get_one).put(handlers::parts::update).delete(handlers::parts::delete),
        )
        .route(
            "/api/transactions",
            get(handlers::transactions::list).post(handlers::transactions::create),
        )
        .route(
            "/api/transactions/{id}",
            get(handlers::transactions::get_one)
                .put(handlers::transactions::update)
                .delete(handlers::transactions::delete),
        )
        .route("/api/transactions/{id}/complete", post(handlers::transactions::complete))
        .route("/api/vendors", get(handlers::vendors::list).post(handlers::vendors::create))
        .route("/api/vendors/for-role", get(handlers::vendors::for_role))
        .route(
            "/api/vendors/{id}",
            get(handlers::vendors::get_one).put(handlers::vendors::update).delete(handlers::vendors::delete),
        )
        .route("/api/shipments", get(handlers::shipments::list).post(handlers::shipments::create))
        .route(
            "/api/shipments/{id}",
            get(handlers::shipments::get_one)
                .put(handlers::shipments::update)
                .delete(handlers::shipments::delete),
        )
        .route("/api/shipments/{id}/status", post(handlers::shipments::set_status))
        // Chain orders and entities
        .route("/api/orders", post(handlers::orders::create))
        .route("/api/orders/count", get(handlers::orders::count))
        .route("/api/orders/shipments", get(handlers::orders::shipments))
        .route("/api/orders/{order_id}", get(handlers::orders::get_one))
        .route("/api/orders/{order_id}/approve", post(handlers::orders::approve))
        .route("/api/orders/{order_id}/complete", post(handlers::orders::complete))
        .route("/api/entities/register", post(handlers::orders::register_entity))
        .route("/api/entities/{address}", get(handlers::orders::get_entity))
        // Wallet
        .route("/api/wallet/connect", post(handlers::wallet::connect))
        .route("/api/wallet/reconnect", post(handlers::wallet::reconnect))
        .route("/api/wallet/disconnect", post(handlers::wallet::disconnect))
        .route("/api/wallet/provider", get(handlers::wallet::provider))
        .route("/api/wallet/info", get(handlers::wallet::info))
        .route("/api/wallet/sign", post(handlers::wallet::sign))
        // Session and reporting
        .route("/api/session", get(handlers::session::get_session))
        .route("/api/session/sync", post(handlers::session::sync))
        .route("/api/dashboard", get(handlers::reports::dashboard))
        .route("/api/reports/discrepancies", get(handlers::reports::discrepancies))
        .route("/api/reports/{file}", get(handlers::reports::export_csv))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/users", get(handlers::users::list).post(handlers::users::create))
        .route(
            "/api/users/{id}",
            get(handlers::users::get_one).put(handlers::users::update).delete(handlers::users::delete),
        )
        .route("/api/admin/transactions/{id}/approve", post(handlers::admin::approve))
        .route("/api/admin/transactions/{id}/reject", post(handlers::admin::reject))
        .route("/api/admin/summary", get(handlers::admin::summary))
        .route("/api/admin/dataset", get(handlers::admin::dataset))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(from_fn(map_res))
        .layer(from_fn(log_requests))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                },
            ),
        )
        // Request stamping runs first so every later layer sees the id.
        .layer(from_fn(stamp_req))
        .layer(cors)
}

fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST /api/auth/signup | /api/auth/login | /api/auth/logout");
    info!(" INVENTORY:");
    info!("   • /api/parts /api/transactions /api/vendors /api/shipments");
    info!(" CHAIN:");
    info!("   • /api/orders /api/entities /api/wallet");
    info!(" REPORTS:");
    info!("   • GET  /api/dashboard | /api/reports/{{kind}}.csv | /api/reports/discrepancies");
    info!(" ADMIN:");
    info!("   • /api/users /api/admin/transactions/{{id}}/approve|reject /api/admin/summary");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
