// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use nouns_reasons_model::{Address, EnsName};
use nouns_reasons_query::QueryError;
use std::time::Duration;

pub mod chain;
pub mod fake;
pub mod subgraph;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 150,
        }
    }
}

impl RetryPolicy {
    /// Linear backoff before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainError(pub String);

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ChainError {}

impl From<ChainError> for QueryError {
    fn from(value: ChainError) -> Self {
        QueryError::upstream(value.0)
    }
}

/// Reads against the chain: block data and ENS records.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Unix seconds of the block's header.
    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError>;

    /// Primary name for the address, only when it resolves back to it.
    async fn ens_name(&self, address: &Address) -> Result<Option<EnsName>, ChainError>;

    /// Displayable avatar URL from the address's primary name.
    async fn ens_avatar(&self, address: &Address) -> Result<Option<String>, ChainError>;

    async fn resolve_ens(&self, name: &EnsName) -> Result<Option<Address>, ChainError>;
}

/// Turns an ENS `avatar` text record into something a browser can load.
///
/// `ipfs://` URIs are rewritten onto `gateway`; other non-http schemes such
/// as NFT references yield nothing.
#[must_use]
pub fn normalize_avatar_uri(raw: &str, gateway: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("ipfs://") {
        let cid = rest.trim_start_matches("ipfs/").trim_start_matches('/');
        if cid.is_empty() {
            return None;
        }
        return Some(format!("{}/{cid}", gateway.trim_end_matches('/')));
    }
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return Some(raw.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_uris_are_normalized() {
        let gw = "https://ipfs.io/ipfs/";
        assert_eq!(
            normalize_avatar_uri("ipfs://QmHash/1.png", gw).as_deref(),
            Some("https://ipfs.io/ipfs/QmHash/1.png")
        );
        assert_eq!(
            normalize_avatar_uri("ipfs://ipfs/QmHash", gw).as_deref(),
            Some("https://ipfs.io/ipfs/QmHash")
        );
        assert_eq!(
            normalize_avatar_uri("https://x.io/a.png", gw).as_deref(),
            Some("https://x.io/a.png")
        );
        assert_eq!(
            normalize_avatar_uri("eip155:1/erc721:0xb7f7f6c52f2e2fdb1963eab30438024864c313f6/2430", gw),
            None
        );
        assert_eq!(normalize_avatar_uri("  ", gw), None);
    }

    #[test]
    fn backoff_grows_linearly() {
        let retry = RetryPolicy {
            max_attempts: 4,
            base_backoff_ms: 100,
        };
        assert_eq!(retry.backoff(1), Duration::from_millis(100));
        assert_eq!(retry.backoff(3), Duration::from_millis(300));
    }
}
