//! Wallet client: provider detection, account connection, balance lookup
//! and message signing over the same [`RpcTransport`] the order client uses.
//!
//! The connection state lives in [`WalletState`], which the caller keeps per
//! session. A manual disconnect is sticky: silent reconnection is skipped
//! until the user connects again explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::abi;
use crate::error::ChainError;
use crate::rpc::{parse_quantity, RpcTransport};

const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletState {
    pub address: Option<String>,
    #[serde(default)]
    pub manually_disconnected: bool,
    pub connected_at: Option<DateTime<Utc>>,
}

impl WalletState {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Record an explicitly connected account and clear the sticky disconnect.
    pub fn attach(&mut self, address: &str) {
        self.address = Some(address.to_lowercase());
        self.manually_disconnected = false;
        self.connected_at = Some(Utc::now());
    }

    /// Forget the account and block silent reconnection.
    pub fn detach(&mut self) {
        self.address = None;
        self.connected_at = None;
        self.manually_disconnected = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub available: bool,
    pub client_version: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    /// Balance in wei, as a decimal string.
    pub balance_wei: String,
    /// Balance in ETH with four decimals.
    pub balance_eth: String,
    pub chain_id: u64,
    pub network: String,
}

pub fn network_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "mainnet",
        11_155_111 => "sepolia",
        17_000 => "holesky",
        31_337 | 1_337 => "local",
        _ => "unknown",
    }
}

/// Format wei as ETH, truncated to four decimals.
pub fn format_eth(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let fraction = (wei % WEI_PER_ETH) / 100_000_000_000_000;
    format!("{}.{:04}", whole, fraction)
}

pub struct WalletClient {
    transport: Arc<dyn RpcTransport>,
}

impl WalletClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    /// Probe the provider. An unreachable provider is reported, not raised.
    pub async fn detect(&self) -> ProviderInfo {
        let client_version = self
            .transport
            .request("web3_clientVersion", json!([]))
            .await
            .ok()
            .and_then(|v| v.as_str().map(str::to_string));

        ProviderInfo {
            available: client_version.is_some(),
            client_version,
            endpoint: self.transport.endpoint().to_string(),
        }
    }

    /// Ask the provider for accounts. `preferred` selects among several
    /// accounts when present, otherwise the first one is used.
    pub async fn connect(
        &self,
        state: &mut WalletState,
        preferred: Option<&str>,
    ) -> Result<String, ChainError> {
        let accounts = self.accounts("eth_requestAccounts").await?;
        let address = pick_account(&accounts, preferred).ok_or(ChainError::NoAccount)?;

        state.attach(&address);

        info!("[WALLET] connected {}", address);
        Ok(address.to_lowercase())
    }

    /// Restore a previously authorized account without prompting.
    /// Returns `None` after a manual disconnect or when nothing is authorized.
    pub async fn reconnect_if_authorized(
        &self,
        state: &mut WalletState,
    ) -> Result<Option<String>, ChainError> {
        if state.manually_disconnected {
            return Ok(None);
        }

        let accounts = self.accounts("eth_accounts").await?;
        let Some(address) = pick_account(&accounts, state.address.as_deref()) else {
            state.address = None;
            return Ok(None);
        };

        if state.address.as_deref() != Some(address.as_str()) {
            state.connected_at = Some(Utc::now());
        }
        state.address = Some(address.clone());
        Ok(Some(address))
    }

    pub fn disconnect(&self, state: &mut WalletState) {
        if let Some(ref address) = state.address {
            info!("[WALLET] disconnected {}", address);
        }
        state.detach();
    }

    pub async fn get_wallet_info(&self, address: &str) -> Result<WalletInfo, ChainError> {
        abi::parse_address(address)?;

        let balance = parse_quantity(
            &self
                .transport
                .request("eth_getBalance", json!([address, "latest"]))
                .await?,
        )?;
        let chain_id = u64::try_from(parse_quantity(
            &self.transport.request("eth_chainId", json!([])).await?,
        )?)
        .map_err(|_| ChainError::Decode("chain id exceeds u64".to_string()))?;

        Ok(WalletInfo {
            address: address.to_lowercase(),
            balance_wei: balance.to_string(),
            balance_eth: format_eth(balance),
            chain_id,
            network: network_name(chain_id).to_string(),
        })
    }

    /// `personal_sign` over the UTF-8 bytes of `message`.
    pub async fn sign_message(&self, address: &str, message: &str) -> Result<String, ChainError> {
        abi::parse_address(address)?;
        let payload = format!("0x{}", hex::encode(message.as_bytes()));

        let signature = self
            .transport
            .request("personal_sign", json!([payload, address]))
            .await?;

        signature
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::Decode(format!("personal_sign returned {}", signature)))
    }

    async fn accounts(&self, method: &str) -> Result<Vec<String>, ChainError> {
        let result = self.transport.request(method, json!([])).await?;
        let list = result
            .as_array()
            .ok_or_else(|| ChainError::Decode(format!("{} returned {}", method, result)))?;
        Ok(list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect())
    }
}

fn pick_account(accounts: &[String], preferred: Option<&str>) -> Option<String> {
    preferred
        .and_then(|p| accounts.iter().find(|a| a.eq_ignore_ascii_case(p)))
        .or_else(|| accounts.first())
        .cloned()
}
