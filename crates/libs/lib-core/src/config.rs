//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! ## Global Config Access
//!
//! Use [`core_config()`] to access the global configuration instance:
//!
//! ```rust,no_run
//! use lib_core::config::core_config;
//!
//! let config = core_config();
//! let db_url = &config.database_url;
//! ```
//!
//! The config must be initialized once at application startup using [`init_config()`].

use lib_utils::envs::{get_env, get_env_or, get_env_parse_or};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default chain id (Sepolia testnet).
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Default block explorer used to build transaction links.
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";

/// How the chain-order client behaves when it cannot (or must not) reach the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainMode {
    /// Errors propagate to the caller.
    Live,
    /// Never touches the chain, every result is simulated.
    Demo,
    /// Tries the chain first and substitutes labelled simulated data on failure.
    Fallback,
}

impl fmt::Display for ChainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainMode::Live => write!(f, "live"),
            ChainMode::Demo => write!(f, "demo"),
            ChainMode::Fallback => write!(f, "fallback"),
        }
    }
}

impl FromStr for ChainMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(ChainMode::Live),
            "demo" => Ok(ChainMode::Demo),
            "fallback" => Ok(ChainMode::Fallback),
            _ => Err(format!("Invalid chain mode: {} (expected live, demo or fallback)", s)),
        }
    }
}

/// Connection details for the order contract.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the wallet provider / node.
    pub rpc_url: Option<String>,

    /// Address of the deployed order contract.
    pub contract_address: Option<String>,

    /// Chain id writes must be sent to.
    pub chain_id: u64,

    /// Base URL of the block explorer, without trailing slash.
    pub explorer_url: String,

    pub mode: ChainMode,
}

impl ChainConfig {
    /// Whether both an RPC endpoint and a contract address are set.
    pub fn is_configured(&self) -> bool {
        self.rpc_url.is_some() && self.contract_address.is_some()
    }

    /// Demo-mode settings with no endpoint, used by tests and the admin tooling.
    pub fn demo() -> Self {
        Self {
            rpc_url: None,
            contract_address: None,
            chain_id: DEFAULT_CHAIN_ID,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            mode: ChainMode::Demo,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long**.
    pub jwt_secret: String,

    /// JWT token validity period in hours
    ///
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub jwt_expiration_hours: i64,

    pub chain: ChainConfig,

    /// Lifetime of a cached dataset in seconds.
    pub data_cache_ttl_secs: u64,

    /// Delay before a dirty session is written back.
    pub session_sync_debounce_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let database_url = get_env_or("DATABASE_URL", "sqlite:data/autotrace.db");

        let jwt_secret =
            get_env("JWT_SECRET").map_err(|_| "JWT_SECRET must be set in environment".to_string())?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 24i64)
            .map_err(|e| format!("JWT_EXPIRATION_HOURS must be a valid number: {}", e))?;

        let rpc_url = get_env("CHAIN_RPC_URL").ok().filter(|v| !v.trim().is_empty());
        let contract_address = get_env("CHAIN_CONTRACT_ADDRESS")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let chain_id = get_env_parse_or("CHAIN_ID", DEFAULT_CHAIN_ID)
            .map_err(|e| format!("CHAIN_ID must be a valid number: {}", e))?;

        let explorer_url = get_env_or("CHAIN_EXPLORER_URL", DEFAULT_EXPLORER_URL)
            .trim_end_matches('/')
            .to_string();

        let mode = match get_env("CHAIN_MODE") {
            Ok(raw) => raw.parse::<ChainMode>()?,
            Err(_) if rpc_url.is_some() && contract_address.is_some() => ChainMode::Live,
            Err(_) => ChainMode::Demo,
        };

        let data_cache_ttl_secs = get_env_parse_or("DATA_CACHE_TTL_SECS", 300u64)
            .map_err(|e| format!("DATA_CACHE_TTL_SECS must be a valid number: {}", e))?;

        let session_sync_debounce_ms = get_env_parse_or("SESSION_SYNC_DEBOUNCE_MS", 2000u64)
            .map_err(|e| format!("SESSION_SYNC_DEBOUNCE_MS must be a valid number: {}", e))?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            chain: ChainConfig {
                rpc_url,
                contract_address,
                chain_id,
                explorer_url,
                mode,
            },
            data_cache_ttl_secs,
            session_sync_debounce_ms,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if self.chain.mode != ChainMode::Demo && !self.chain.is_configured() {
            return Err(format!(
                "CHAIN_MODE={} requires CHAIN_RPC_URL and CHAIN_CONTRACT_ADDRESS",
                self.chain.mode
            ));
        }

        if let Some(ref address) = self.chain.contract_address {
            lib_utils::validation::validate_eth_address(address)
                .map_err(|e| format!("CHAIN_CONTRACT_ADDRESS: {}", e))?;
        }

        Ok(())
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are missing or invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<&'static Config, String> {
    let config = Config::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| "Config has already been initialized".to_string())?;

    Ok(core_config())
}

/// Get a reference to the global configuration.
///
/// # Panics
///
/// Panics if [`init_config()`] has not been called yet.
pub fn core_config() -> &'static Config {
    CONFIG.get().expect("Config must be initialized with init_config() before use")
}
