//! # AutoTrace Server
//!
//! Thin entry point that delegates to lib-web for server setup.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // BIND_ADDRESS and ALLOWED_ORIGINS override the defaults.
    start_server(ServerConfig::from_env()).await
}
