// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use ethabi::{ParamType, Token};
use nouns_reasons_model::{keccak256, namehash, Address, EnsName};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{normalize_avatar_uri, ChainClient, ChainError, RetryPolicy};

/// Mainnet ENS registry.
pub const ENS_REGISTRY: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

/// Ethereum JSON-RPC client with ENS resolution.
pub struct RpcChainClient {
    url: String,
    retry: RetryPolicy,
    ipfs_gateway: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn call_data(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(ethabi::encode(args));
    data
}

fn parse_quantity(raw: &str) -> Result<u64, ChainError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ChainError(format!("quantity without 0x prefix: {raw}")))?;
    u64::from_str_radix(digits, 16).map_err(|e| ChainError(format!("bad quantity {raw}: {e}")))
}

fn decode_bytes(raw: &Value) -> Result<Vec<u8>, ChainError> {
    let text = raw
        .as_str()
        .ok_or_else(|| ChainError("eth_call result is not a string".to_string()))?;
    hex::decode(text.trim_start_matches("0x"))
        .map_err(|e| ChainError(format!("eth_call result is not hex: {e}")))
}

/// `None` for empty return data or the zero address.
fn decode_address(data: &[u8]) -> Result<Option<Address>, ChainError> {
    if data.is_empty() {
        return Ok(None);
    }
    let tokens = ethabi::decode(&[ParamType::Address], data)
        .map_err(|e| ChainError(format!("abi decode address: {e}")))?;
    match tokens.first() {
        Some(Token::Address(addr)) if !addr.is_zero() => Ok(Some(Address::from_bytes(addr.0))),
        _ => Ok(None),
    }
}

fn decode_string(data: &[u8]) -> Result<Option<String>, ChainError> {
    if data.is_empty() {
        return Ok(None);
    }
    let tokens = ethabi::decode(&[ParamType::String], data)
        .map_err(|e| ChainError(format!("abi decode string: {e}")))?;
    match tokens.into_iter().next() {
        Some(Token::String(s)) if !s.is_empty() => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn reverse_node(address: &Address) -> [u8; 32] {
    let hex_addr = address.to_lowercase();
    namehash(&format!("{}.addr.reverse", hex_addr.trim_start_matches("0x")))
}

impl RpcChainClient {
    #[must_use]
    pub fn new(url: String, timeout: Duration, retry: RetryPolicy, ipfs_gateway: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            url,
            retry,
            ipfs_gateway,
            client,
            next_id: AtomicU64::new(1),
        }
    }

    #[instrument(name = "rpc_call_with_retry", skip(self, params))]
    async fn rpc(&self, method: &'static str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.post(&self.url).json(&body).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let parsed: RpcResponse = resp
                        .json()
                        .await
                        .map_err(|e| ChainError(format!("{method} response: {e}")))?;
                    if let Some(err) = parsed.error {
                        return Err(ChainError(format!(
                            "{method} rpc error {}: {}",
                            err.code, err.message
                        )));
                    }
                    return Ok(parsed.result.unwrap_or(Value::Null));
                }
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(ChainError(format!(
                            "{method} failed status={}",
                            resp.status()
                        )));
                    }
                    warn!(method, attempt, status = resp.status().as_u16(), "rpc retry");
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(ChainError(format!("{method} failed: {e}")));
                    }
                    warn!(method, attempt, "rpc request failed: {e}");
                }
            }
            tokio::time::sleep(self.retry.backoff(attempt)).await;
        }
    }

    async fn eth_call(&self, to: &str, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let result = self
            .rpc(
                "eth_call",
                json!([{"to": to, "data": format!("0x{}", hex::encode(data))}, "latest"]),
            )
            .await?;
        decode_bytes(&result)
    }

    async fn resolver(&self, node: [u8; 32]) -> Result<Option<Address>, ChainError> {
        let data = call_data("resolver(bytes32)", &[Token::FixedBytes(node.to_vec())]);
        let out = self.eth_call(ENS_REGISTRY, data).await?;
        decode_address(&out)
    }

    async fn text_record(&self, name: &EnsName, key: &str) -> Result<Option<String>, ChainError> {
        let node = name.namehash();
        let Some(resolver) = self.resolver(node).await? else {
            return Ok(None);
        };
        let data = call_data(
            "text(bytes32,string)",
            &[Token::FixedBytes(node.to_vec()), Token::String(key.to_string())],
        );
        let out = self.eth_call(resolver.as_str(), data).await?;
        decode_string(&out)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn block_number(&self) -> Result<u64, ChainError> {
        let result = self.rpc("eth_blockNumber", json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ChainError("eth_blockNumber result is not a string".to_string()))?;
        parse_quantity(raw)
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError> {
        let result = self
            .rpc("eth_getBlockByNumber", json!([format!("0x{block:x}"), false]))
            .await?;
        let raw = result
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError(format!("block {block} not found")))?;
        parse_quantity(raw)
    }

    #[instrument(name = "ens_reverse_lookup", skip(self), fields(address = %address.as_str()))]
    async fn ens_name(&self, address: &Address) -> Result<Option<EnsName>, ChainError> {
        let node = reverse_node(address);
        let Some(resolver) = self.resolver(node).await? else {
            return Ok(None);
        };
        let data = call_data("name(bytes32)", &[Token::FixedBytes(node.to_vec())]);
        let out = self.eth_call(resolver.as_str(), data).await?;
        let Some(raw) = decode_string(&out)? else {
            return Ok(None);
        };
        let Ok(name) = EnsName::new(raw.as_str()) else {
            debug!(name = %raw, "reverse record is not a usable ens name");
            return Ok(None);
        };
        // Reverse records are self-asserted.
        match self.resolve_ens(&name).await? {
            Some(forward) if &forward == address => Ok(Some(name)),
            _ => Ok(None),
        }
    }

    async fn ens_avatar(&self, address: &Address) -> Result<Option<String>, ChainError> {
        let Some(name) = self.ens_name(address).await? else {
            return Ok(None);
        };
        let record = self.text_record(&name, "avatar").await?;
        Ok(record.and_then(|raw| normalize_avatar_uri(&raw, &self.ipfs_gateway)))
    }

    #[instrument(name = "ens_forward_lookup", skip(self), fields(name = %name.as_str()))]
    async fn resolve_ens(&self, name: &EnsName) -> Result<Option<Address>, ChainError> {
        let node = name.namehash();
        let Some(resolver) = self.resolver(node).await? else {
            return Ok(None);
        };
        let data = call_data("addr(bytes32)", &[Token::FixedBytes(node.to_vec())]);
        let out = self.eth_call(resolver.as_str(), data).await?;
        decode_address(&out)
    }
}
