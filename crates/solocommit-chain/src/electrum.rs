//! Electrum chain provider.
//!
//! Newline-delimited JSON-RPC over plain TCP. Each call opens its own
//! connection, sends one request, and reads one response line of at most
//! [`MAX_RESPONSE_BYTES`], all under a single timeout. Nothing is retried;
//! a failed call surfaces as `ProviderError` naming the RPC method.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bitcoin::block::Header;
use chrono::DateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use solocommit_contract::{ChainProvider, SettlementRequest};
use solocommit_types::{Address, ChainTip, CommitError, Result, Utxo};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::transaction::build_settlement;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response line accepted from a server.
pub const MAX_RESPONSE_BYTES: u64 = 4 * 1024 * 1024;

const LIST_UNSPENT: &str = "blockchain.scripthash.listunspent";
const HEADERS_SUBSCRIBE: &str = "blockchain.headers.subscribe";
const BROADCAST: &str = "blockchain.transaction.broadcast";

/// Electrum script hash: `sha256(locking_script)`, byte-reversed, hex.
#[must_use]
pub fn electrum_scripthash(locking_script: &[u8]) -> String {
    let mut hash: [u8; 32] = Sha256::digest(locking_script).into();
    hash.reverse();
    hex::encode(hash)
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UnspentEntry {
    tx_hash: String,
    tx_pos: u32,
    height: i64,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct HeaderNotification {
    height: u64,
    hex: String,
}

/// Minimal Electrum JSON-RPC client.
#[derive(Debug)]
pub struct ElectrumClient {
    server: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl ElectrumClient {
    /// `server` is `host:port` of a plain-TCP Electrum endpoint.
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            timeout: DEFAULT_TIMEOUT,
            next_id: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Send one request and decode its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_vec(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))?;
        line.push(b'\n');

        let exchange = async {
            let mut stream = TcpStream::connect(&self.server).await?;
            stream.write_all(&line).await?;
            let mut reader = BufReader::new(stream.take(MAX_RESPONSE_BYTES));
            let mut response = String::new();
            reader.read_line(&mut response).await?;
            Ok::<_, std::io::Error>(response)
        };
        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                CommitError::provider(method, format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|e| CommitError::provider(method, e))?;

        if response.trim().is_empty() {
            return Err(CommitError::provider(method, "connection closed without a response"));
        }
        let read = u64::try_from(response.len()).unwrap_or(u64::MAX);
        if !response.ends_with('\n') && read >= MAX_RESPONSE_BYTES {
            return Err(CommitError::provider(
                method,
                format!("response exceeds {MAX_RESPONSE_BYTES} bytes"),
            ));
        }
        let response: RpcResponse =
            serde_json::from_str(&response).map_err(|e| CommitError::provider(method, e))?;
        if let Some(error) = response.error {
            return Err(CommitError::provider(method, error));
        }
        let result = response
            .result
            .ok_or_else(|| CommitError::provider(method, "response has no result"))?;
        debug!(method, server = %self.server, "Electrum call succeeded");
        serde_json::from_value(result).map_err(|e| CommitError::provider(method, e))
    }

    /// Unspent outputs paying to `locking_script`. Unconfirmed outputs
    /// (height 0 or negative) are reported with height 0.
    pub async fn list_unspent(&self, locking_script: &[u8]) -> Result<Vec<Utxo>> {
        let entries: Vec<UnspentEntry> = self
            .call(LIST_UNSPENT, json!([electrum_scripthash(locking_script)]))
            .await?;
        Ok(entries
            .into_iter()
            .map(|e| Utxo {
                txid: e.tx_hash,
                vout: e.tx_pos,
                satoshis: e.value,
                height: u64::try_from(e.height).unwrap_or(0),
            })
            .collect())
    }

    /// Best block height and time.
    pub async fn tip(&self) -> Result<ChainTip> {
        let header: HeaderNotification = self.call(HEADERS_SUBSCRIBE, json!([])).await?;
        parse_header(&header)
    }

    /// Broadcast a raw transaction; returns its txid.
    pub async fn broadcast(&self, raw_hex: &str) -> Result<String> {
        self.call(BROADCAST, json!([raw_hex])).await
    }
}

fn parse_header(notification: &HeaderNotification) -> Result<ChainTip> {
    let bytes = hex::decode(&notification.hex)
        .map_err(|e| CommitError::provider(HEADERS_SUBSCRIBE, format!("header hex: {e}")))?;
    let header: Header = bitcoin::consensus::deserialize(&bytes)
        .map_err(|e| CommitError::provider(HEADERS_SUBSCRIBE, format!("header: {e}")))?;
    let time = DateTime::from_timestamp(i64::from(header.time), 0).ok_or_else(|| {
        CommitError::provider(HEADERS_SUBSCRIBE, "header time out of range")
    })?;
    Ok(ChainTip {
        height: notification.height,
        time,
    })
}

/// [`ChainProvider`] backed by an Electrum server.
#[derive(Debug)]
pub struct ElectrumProvider {
    client: ElectrumClient,
}

impl ElectrumProvider {
    #[must_use]
    pub fn new(client: ElectrumClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ElectrumClient {
        &self.client
    }
}

impl ChainProvider for ElectrumProvider {
    async fn utxos(&self, address: &Address) -> Result<Vec<Utxo>> {
        self.client.list_unspent(&address.locking_script()).await
    }

    async fn submit(&self, request: &SettlementRequest<'_>) -> Result<String> {
        let tip = self.client.tip().await?;
        let signed = build_settlement(request, tip.height)?;
        debug!(
            action = %request.action,
            txid = %signed.txid,
            size = signed.hex.len() / 2,
            lock_height = tip.height,
            "Signed settlement transaction"
        );
        let txid = self.client.broadcast(&signed.hex).await?;
        info!(action = %request.action, txid = %txid, "Broadcast accepted");
        Ok(txid)
    }
}
