//! # Chain-Order Client
//!
//! Reads and writes orders on the external order contract.
//!
//! The client runs in one of three [`ChainMode`]s:
//!
//! - **live**: every error reaches the caller.
//! - **demo**: the chain is never contacted; results are simulated.
//! - **fallback**: the chain is tried first; a failure other than a user
//!   rejection is replaced by simulated data carrying the error in `note`.
//!
//! Simulated results are always flagged with [`Source::Simulated`], and a
//! user rejection propagates in every mode.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lib_core::config::{ChainConfig, ChainMode};
use lib_core::model::Role;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::abi::{self, AbiReader, Token};
use crate::demo;
use crate::error::ChainError;
use crate::rpc::{parse_quantity, RpcTransport};
use crate::types::{
    ChainOrder, CountRead, Entity, EntityRead, OrderRead, OrderReceipt, OrdersRead, RegisteredRead,
    Source,
};

const DEFAULT_RECEIPT_ATTEMPTS: u32 = 30;
const DEFAULT_RECEIPT_INTERVAL: Duration = Duration::from_secs(2);
const MAX_LISTED_ORDERS: u64 = 50;

pub struct ChainOrderClient {
    transport: Option<Arc<dyn RpcTransport>>,
    contract: Option<String>,
    chain_id: u64,
    explorer_url: String,
    mode: ChainMode,
    receipt_attempts: u32,
    receipt_interval: Duration,
}

impl ChainOrderClient {
    pub fn new(config: &ChainConfig, transport: Option<Arc<dyn RpcTransport>>) -> Self {
        Self {
            transport,
            contract: config.contract_address.clone(),
            chain_id: config.chain_id,
            explorer_url: config.explorer_url.trim_end_matches('/').to_string(),
            mode: config.mode,
            receipt_attempts: DEFAULT_RECEIPT_ATTEMPTS,
            receipt_interval: DEFAULT_RECEIPT_INTERVAL,
        }
    }

    pub fn with_receipt_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.receipt_attempts = attempts.max(1);
        self.receipt_interval = interval;
        self
    }

    pub fn mode(&self) -> ChainMode {
        self.mode
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }

    // region: --- Writes

    /// Create an order from `from` to `seller`. The new order id is read back
    /// from `getOrderCount()` once the transaction is mined.
    pub async fn create_order(
        &self,
        from: &str,
        seller: &str,
        part_name: &str,
        quantity: u64,
    ) -> Result<OrderReceipt, ChainError> {
        self.run(
            "createOrder",
            || async move {
                let seller = abi::parse_address(seller)?;
                let data = abi::encode_call_hex(
                    abi::CREATE_ORDER,
                    &[
                        Token::Address(seller),
                        Token::String(part_name.to_string()),
                        Token::Uint(quantity as u128),
                    ],
                );
                let tx_hash = self.send_transaction(from, data).await?;
                let mined = self.wait_for_receipt(&tx_hash).await?;

                let order_id = if mined {
                    Some(self.read_order_count().await?)
                } else {
                    None
                };
                info!("[CHAIN] createOrder {} -> order {:?}", tx_hash, order_id);
                Ok(self.receipt(order_id, tx_hash, mined))
            },
            |note| self.simulated_receipt(Some(demo::random_order_id()), note),
        )
        .await
    }

    pub async fn approve_order(&self, from: &str, order_id: u64) -> Result<OrderReceipt, ChainError> {
        self.write_order_status("approveOrder", abi::APPROVE_ORDER, from, order_id).await
    }

    pub async fn complete_order(&self, from: &str, order_id: u64) -> Result<OrderReceipt, ChainError> {
        self.write_order_status("completeOrder", abi::COMPLETE_ORDER, from, order_id).await
    }

    async fn write_order_status(
        &self,
        label: &str,
        signature: &str,
        from: &str,
        order_id: u64,
    ) -> Result<OrderReceipt, ChainError> {
        self.run(
            label,
            || async move {
                let data = abi::encode_call_hex(signature, &[Token::Uint(order_id as u128)]);
                let tx_hash = self.send_transaction(from, data).await?;
                let mined = self.wait_for_receipt(&tx_hash).await?;
                info!("[CHAIN] {} order {} in {}", label, order_id, tx_hash);
                Ok(self.receipt(Some(order_id), tx_hash, mined))
            },
            |note| self.simulated_receipt(Some(order_id), note),
        )
        .await
    }

    pub async fn register_wallet(
        &self,
        from: &str,
        name: &str,
        role: Role,
    ) -> Result<OrderReceipt, ChainError> {
        self.run(
            "registerWallet",
            || async move {
                let data = abi::encode_call_hex(
                    abi::REGISTER_WALLET,
                    &[Token::String(name.to_string()), Token::Uint(role.chain_code() as u128)],
                );
                let tx_hash = self.send_transaction(from, data).await?;
                let mined = self.wait_for_receipt(&tx_hash).await?;
                info!("[CHAIN] registerWallet {} as {} in {}", from, role, tx_hash);
                Ok(self.receipt(None, tx_hash, mined))
            },
            |note| self.simulated_receipt(None, note),
        )
        .await
    }

    // endregion: --- Writes

    // region: --- Reads

    pub async fn get_order(&self, order_id: u64, viewer: Option<&str>) -> Result<OrderRead, ChainError> {
        self.run(
            "getOrder",
            || async move {
                let order = self.read_order(order_id).await?;
                Ok(OrderRead { order, source: Source::Chain, note: None })
            },
            |note| OrderRead {
                order: demo::demo_order(order_id, viewer),
                source: Source::Simulated,
                note,
            },
        )
        .await
    }

    pub async fn get_order_count(&self) -> Result<CountRead, ChainError> {
        self.run(
            "getOrderCount",
            || async move {
                let count = self.read_order_count().await?;
                Ok(CountRead { count, source: Source::Chain, note: None })
            },
            |note| CountRead {
                count: demo::demo_orders(None).len() as u64,
                source: Source::Simulated,
                note,
            },
        )
        .await
    }

    /// The most recent orders, newest first, optionally only those involving `viewer`.
    pub async fn list_orders(&self, viewer: Option<&str>) -> Result<OrdersRead, ChainError> {
        self.run(
            "listOrders",
            || async move {
                let count = self.read_order_count().await?;
                let first = count.saturating_sub(MAX_LISTED_ORDERS) + 1;
                let mut orders = Vec::new();
                for order_id in (first..=count).rev() {
                    let order = self.read_order(order_id).await?;
                    if viewer.map_or(true, |v| order.involves(v)) {
                        orders.push(order);
                    }
                }
                Ok(OrdersRead { orders, source: Source::Chain, note: None })
            },
            |note| OrdersRead {
                orders: demo::demo_orders(viewer),
                source: Source::Simulated,
                note,
            },
        )
        .await
    }

    pub async fn get_entity(&self, address: &str) -> Result<EntityRead, ChainError> {
        self.run(
            "getEntity",
            || async move {
                let target = abi::parse_address(address)?;
                let reader = self.call(abi::GET_ENTITY, &[Token::Address(target)]).await?;
                let entity = Entity {
                    address: address.to_lowercase(),
                    name: reader.string(0)?,
                    role: Role::from_chain_code(reader.u8(1)?),
                    registered: reader.bool(2)?,
                };
                Ok(EntityRead { entity, source: Source::Chain, note: None })
            },
            |note| EntityRead {
                entity: demo::demo_entity(address),
                source: Source::Simulated,
                note,
            },
        )
        .await
    }

    pub async fn is_entity_registered(&self, address: &str) -> Result<RegisteredRead, ChainError> {
        self.run(
            "isEntityRegistered",
            || async move {
                let target = abi::parse_address(address)?;
                let reader = self.call(abi::IS_ENTITY_REGISTERED, &[Token::Address(target)]).await?;
                Ok(RegisteredRead {
                    address: address.to_lowercase(),
                    registered: reader.bool(0)?,
                    source: Source::Chain,
                    note: None,
                })
            },
            |note| RegisteredRead {
                address: address.to_lowercase(),
                registered: true,
                source: Source::Simulated,
                note,
            },
        )
        .await
    }

    // endregion: --- Reads

    // region: --- Mode handling

    async fn run<T, F, Fut>(
        &self,
        op: &str,
        live: F,
        simulate: impl FnOnce(Option<String>) -> T,
    ) -> Result<T, ChainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        match self.mode {
            ChainMode::Demo => Ok(simulate(None)),
            ChainMode::Live => live().await,
            ChainMode::Fallback => match live().await {
                Ok(value) => Ok(value),
                Err(err) if err.is_user_rejection() => Err(err),
                Err(err) => {
                    warn!("[CHAIN] {} failed, returning simulated data: {}", op, err);
                    Ok(simulate(Some(err.to_string())))
                }
            },
        }
    }

    fn receipt(&self, order_id: Option<u64>, tx_hash: String, mined: bool) -> OrderReceipt {
        OrderReceipt {
            order_id,
            etherscan_url: self.explorer_tx_url(&tx_hash),
            tx_hash,
            source: Source::Chain,
            note: (!mined).then(|| "Transaction submitted but not yet mined".to_string()),
        }
    }

    fn simulated_receipt(&self, order_id: Option<u64>, note: Option<String>) -> OrderReceipt {
        let tx_hash = demo::random_tx_hash();
        OrderReceipt {
            order_id,
            etherscan_url: self.explorer_tx_url(&tx_hash),
            tx_hash,
            source: Source::Simulated,
            note,
        }
    }

    // endregion: --- Mode handling

    // region: --- RPC plumbing

    fn endpoint(&self) -> Result<(&Arc<dyn RpcTransport>, &str), ChainError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| ChainError::NotConfigured("CHAIN_RPC_URL is not set".to_string()))?;
        let contract = self
            .contract
            .as_deref()
            .ok_or_else(|| ChainError::NotConfigured("CHAIN_CONTRACT_ADDRESS is not set".to_string()))?;
        Ok((transport, contract))
    }

    async fn call(&self, signature: &str, args: &[Token]) -> Result<AbiReader, ChainError> {
        let (transport, contract) = self.endpoint()?;
        let data = abi::encode_call_hex(signature, args);
        let result = transport
            .request("eth_call", json!([{ "to": contract, "data": data }, "latest"]))
            .await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ChainError::Decode(format!("{} returned {}", signature, result)))?;
        let reader = AbiReader::from_hex(raw)?;
        if reader.is_empty() {
            return Err(ChainError::Decode(format!(
                "{} returned no data; is the contract deployed at {}?",
                signature, contract
            )));
        }
        Ok(reader)
    }

    async fn read_order_count(&self) -> Result<u64, ChainError> {
        self.call(abi::GET_ORDER_COUNT, &[]).await?.u64(0)
    }

    async fn read_order(&self, order_id: u64) -> Result<ChainOrder, ChainError> {
        let reader = self.call(abi::GET_ORDER, &[Token::Uint(order_id as u128)]).await?;
        Ok(ChainOrder {
            order_id: reader.u64(0)?,
            buyer: reader.address(1)?,
            seller: reader.address(2)?,
            part_name: reader.string(3)?,
            quantity: reader.u64(4)?,
            status: reader.u8(5)?,
            created_at: reader.u64(6)?,
        })
    }

    async fn ensure_network(&self, transport: &Arc<dyn RpcTransport>) -> Result<(), ChainError> {
        let raw = transport.request("eth_chainId", json!([])).await?;
        let actual = u64::try_from(parse_quantity(&raw)?)
            .map_err(|_| ChainError::Decode("chain id exceeds u64".to_string()))?;
        if actual != self.chain_id {
            return Err(ChainError::WrongNetwork { expected: self.chain_id, actual });
        }
        Ok(())
    }

    async fn send_transaction(&self, from: &str, data: String) -> Result<String, ChainError> {
        let (transport, contract) = self.endpoint()?;
        abi::parse_address(from)?;
        self.ensure_network(transport).await?;

        let result = transport
            .request(
                "eth_sendTransaction",
                json!([{ "from": from, "to": contract, "data": data }]),
            )
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::Decode(format!("eth_sendTransaction returned {}", result)))
    }

    /// Poll for the receipt. `Ok(false)` when it did not show up in time.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<bool, ChainError> {
        let (transport, _) = self.endpoint()?;

        for attempt in 1..=self.receipt_attempts {
            let receipt = transport
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if !receipt.is_null() {
                return match receipt.get("status").and_then(Value::as_str) {
                    Some("0x0") => Err(ChainError::Reverted(tx_hash.to_string())),
                    _ => Ok(true),
                };
            }

            if attempt < self.receipt_attempts {
                tokio::time::sleep(self.receipt_interval).await;
            }
        }

        warn!("[CHAIN] no receipt for {} after {} attempts", tx_hash, self.receipt_attempts);
        Ok(false)
    }

    // endregion: --- RPC plumbing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    const CONTRACT: &str = "0xc0ffee0000000000000000000000000000c0ffee";
    const BUYER: &str = "0x1111111111111111111111111111111111111111";
    const SELLER: &str = "0x2222222222222222222222222222222222222222";
    const TX: &str = "0xabababababababababababababababababababababababababababababababab";

    fn config(mode: ChainMode) -> ChainConfig {
        ChainConfig {
            rpc_url: Some("http://localhost:8545".into()),
            contract_address: Some(CONTRACT.into()),
            chain_id: 11_155_111,
            explorer_url: "https://sepolia.etherscan.io".into(),
            mode,
        }
    }

    fn client(mode: ChainMode, mock: MockTransport) -> (ChainOrderClient, Arc<MockTransport>) {
        let mock = Arc::new(mock);
        let client = ChainOrderClient::new(&config(mode), Some(mock.clone() as Arc<dyn RpcTransport>))
            .with_receipt_polling(3, Duration::ZERO);
        (client, mock)
    }

    fn word(value: u128) -> String {
        format!("{:064x}", value)
    }

    fn address_word(address: &str) -> String {
        format!("{:0>64}", address.trim_start_matches("0x"))
    }

    fn string_tail(text: &str) -> String {
        let mut padded = hex::encode(text);
        while padded.len() % 64 != 0 {
            padded.push('0');
        }
        format!("{}{}", word(text.len() as u128), padded)
    }

    fn order_return(order_id: u128, part: &str, quantity: u128, status: u128) -> String {
        format!(
            "0x{}{}{}{}{}{}{}{}",
            word(order_id),
            address_word(BUYER),
            address_word(SELLER),
            word(7 * 32),
            word(quantity),
            word(status),
            word(1_700_000_000),
            string_tail(part)
        )
    }

    fn happy_write() -> MockTransport {
        MockTransport::new()
            .on("eth_chainId", Ok(json!("0xaa36a7")))
            .on("eth_sendTransaction", Ok(json!(TX)))
            .on("eth_getTransactionReceipt", Ok(Value::Null))
            .on("eth_getTransactionReceipt", Ok(json!({ "status": "0x1" })))
            .on_call(abi::GET_ORDER_COUNT, Ok(json!(format!("0x{}", word(42)))))
    }

    #[tokio::test]
    async fn test_live_create_order() {
        let (client, mock) = client(ChainMode::Live, happy_write());

        let receipt = client.create_order(BUYER, SELLER, "Brake Pad", 25).await.unwrap();

        assert_eq!(receipt.order_id, Some(42));
        assert_eq!(receipt.tx_hash, TX);
        assert_eq!(receipt.etherscan_url, format!("https://sepolia.etherscan.io/tx/{}", TX));
        assert_eq!(receipt.source, Source::Chain);
        assert!(receipt.note.is_none());
        assert_eq!(mock.count("eth_getTransactionReceipt"), 2);

        let sent = mock
            .calls()
            .into_iter()
            .find(|(m, _)| m == "eth_sendTransaction")
            .unwrap();
        let data = sent.1[0]["data"].as_str().unwrap().to_string();
        assert!(data.starts_with(&format!("0x{}", hex::encode(abi::selector(abi::CREATE_ORDER)))));
        assert_eq!(sent.1[0]["to"], CONTRACT);
    }

    #[tokio::test]
    async fn test_live_error_propagates() {
        let mock = MockTransport::new()
            .on("eth_chainId", Ok(json!("0xaa36a7")))
            .on("eth_sendTransaction", Err(ChainError::Transport("connection refused".into())));
        let (client, _) = client(ChainMode::Live, mock);

        let err = client.create_order(BUYER, SELLER, "Brake Pad", 25).await.unwrap_err();
        assert_eq!(err, ChainError::Transport("connection refused".into()));
    }

    #[tokio::test]
    async fn test_fallback_masks_failure_but_labels_it() {
        let mock = MockTransport::new()
            .on("eth_chainId", Ok(json!("0xaa36a7")))
            .on("eth_sendTransaction", Err(ChainError::Rpc { code: -32000, message: "execution reverted".into() }));
        let (client, _) = client(ChainMode::Fallback, mock);

        let receipt = client.create_order(BUYER, SELLER, "Brake Pad", 25).await.unwrap();

        assert!(receipt.order_id.is_some());
        assert_eq!(receipt.tx_hash.len(), 66);
        assert!(receipt.etherscan_url.ends_with(&receipt.tx_hash));
        assert_eq!(receipt.source, Source::Simulated);
        assert!(receipt.note.unwrap().contains("execution reverted"));
    }

    #[tokio::test]
    async fn test_user_rejection_propagates_in_fallback() {
        let mock = MockTransport::new()
            .on("eth_chainId", Ok(json!("0xaa36a7")))
            .on("eth_sendTransaction", Err(ChainError::from_rpc(4001, "User rejected the request.")));
        let (client, _) = client(ChainMode::Fallback, mock);

        let err = client.create_order(BUYER, SELLER, "Brake Pad", 25).await.unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[tokio::test]
    async fn test_wrong_network() {
        let mock = MockTransport::new().on("eth_chainId", Ok(json!("0x1")));
        let (client, mock) = client(ChainMode::Live, mock);

        let err = client.approve_order(BUYER, 3).await.unwrap_err();
        assert_eq!(err, ChainError::WrongNetwork { expected: 11_155_111, actual: 1 });
        assert_eq!(mock.count("eth_sendTransaction"), 0);
    }

    #[tokio::test]
    async fn test_demo_mode_never_touches_transport() {
        let (client, mock) = client(ChainMode::Demo, MockTransport::new());

        let receipt = client.create_order(BUYER, SELLER, "Brake Pad", 25).await.unwrap();
        assert_eq!(receipt.source, Source::Simulated);
        assert!(receipt.note.is_none());

        let read = client.get_order(9, Some(BUYER)).await.unwrap();
        assert_eq!(read.source, Source::Simulated);
        assert!(read.order.involves(BUYER));

        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let mock = MockTransport::new()
            .on("eth_chainId", Ok(json!("0xaa36a7")))
            .on("eth_sendTransaction", Ok(json!(TX)))
            .on("eth_getTransactionReceipt", Ok(json!({ "status": "0x0" })));
        let (client, _) = client(ChainMode::Live, mock);

        let err = client.complete_order(BUYER, 3).await.unwrap_err();
        assert_eq!(err, ChainError::Reverted(TX.to_string()));
    }

    #[tokio::test]
    async fn test_receipt_timeout_is_reported_not_faked() {
        let mock = MockTransport::new()
            .on("eth_chainId", Ok(json!("0xaa36a7")))
            .on("eth_sendTransaction", Ok(json!(TX)))
            .on("eth_getTransactionReceipt", Ok(Value::Null));
        let (client, mock) = client(ChainMode::Live, mock);

        let receipt = client.create_order(BUYER, SELLER, "Brake Pad", 25).await.unwrap();
        assert_eq!(receipt.order_id, None);
        assert_eq!(receipt.source, Source::Chain);
        assert!(receipt.note.is_some());
        assert_eq!(mock.count("eth_getTransactionReceipt"), 3);
    }

    #[tokio::test]
    async fn test_get_order_decodes() {
        let mock = MockTransport::new()
            .on_call(abi::GET_ORDER, Ok(json!(order_return(5, "Front Axle", 12, 1))));
        let (client, _) = client(ChainMode::Live, mock);

        let read = client.get_order(5, None).await.unwrap();
        assert_eq!(read.source, Source::Chain);
        assert_eq!(read.order.order_id, 5);
        assert_eq!(read.order.buyer, BUYER);
        assert_eq!(read.order.seller, SELLER);
        assert_eq!(read.order.part_name, "Front Axle");
        assert_eq!(read.order.quantity, 12);
        assert_eq!(read.order.status, 1);
        assert_eq!(read.order.created_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_viewer() {
        let mock = MockTransport::new()
            .on_call(abi::GET_ORDER_COUNT, Ok(json!(format!("0x{}", word(2)))))
            .on_call(abi::GET_ORDER, Ok(json!(order_return(2, "Gear", 3, 0))))
            .on_call(abi::GET_ORDER, Ok(json!(order_return(1, "Gear", 3, 2))));
        let (client, _) = client(ChainMode::Live, mock);

        let read = client.list_orders(Some(SELLER)).await.unwrap();
        let ids: Vec<_> = read.orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![2, 1]);

        let none = client
            .list_orders(Some("0x9999999999999999999999999999999999999999"))
            .await
            .unwrap();
        assert!(none.orders.is_empty());
    }

    #[tokio::test]
    async fn test_get_entity_decodes() {
        let raw = format!("0x{}{}{}{}", word(96), word(1), word(1), string_tail("Acme Metals"));
        let mock = MockTransport::new().on_call(abi::GET_ENTITY, Ok(json!(raw)));
        let (client, _) = client(ChainMode::Live, mock);

        let read = client.get_entity(SELLER).await.unwrap();
        assert_eq!(read.entity.name, "Acme Metals");
        assert_eq!(read.entity.role, Some(Role::Supplier));
        assert!(read.entity.registered);
    }

    #[tokio::test]
    async fn test_live_without_endpoint_is_not_configured() {
        let mut cfg = config(ChainMode::Live);
        cfg.contract_address = None;
        let client = ChainOrderClient::new(&cfg, None);

        let err = client.get_order_count().await.unwrap_err();
        assert!(matches!(err, ChainError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_empty_call_result_falls_back() {
        let mock = MockTransport::new().on_call(abi::IS_ENTITY_REGISTERED, Ok(json!("0x")));
        let (client, _) = client(ChainMode::Fallback, mock);

        let read = client.is_entity_registered(BUYER).await.unwrap();
        assert_eq!(read.source, Source::Simulated);
        assert!(read.note.unwrap().contains("returned no data"));
    }
}
