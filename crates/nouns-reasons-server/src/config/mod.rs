// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::time::Duration;

use crate::RetryPolicy;

pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub page_size: u64,
    pub max_page_size: u64,
    pub home_votes: u64,
    pub home_proposals: u64,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub request_timeout: Duration,
    /// Resolve ENS names, avatars and block ages for vote cards.
    pub enrich_cards: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
            home_votes: 5,
            home_proposals: 10,
            cache_ttl: Duration::from_secs(30),
            cache_max_entries: 1024,
            request_timeout: Duration::from_secs(10),
            enrich_cards: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpstreamConfig {
    pub subgraph_url: String,
    pub rpc_url: String,
    pub ipfs_gateway: String,
    pub timeout: Duration,
    #[serde(skip)]
    pub retry: RetryPolicy,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            subgraph_url: "https://api.thegraph.com/subgraphs/name/nounsdao/nouns-subgraph"
                .to_string(),
            rpc_url: "https://cloudflare-eth.com".to_string(),
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            timeout: Duration::from_secs(8),
            retry: RetryPolicy::default(),
        }
    }
}

pub fn validate_startup_config_contract(
    api: &ApiConfig,
    upstream: &UpstreamConfig,
) -> Result<(), String> {
    if api.page_size == 0 || api.home_votes == 0 || api.home_proposals == 0 {
        return Err("page sizes must be > 0".to_string());
    }
    if api.page_size > api.max_page_size {
        return Err(format!(
            "page_size {} exceeds max_page_size {}",
            api.page_size, api.max_page_size
        ));
    }
    if api.cache_max_entries == 0 {
        return Err("cache capacity must be > 0".to_string());
    }
    if api.request_timeout.is_zero() || upstream.timeout.is_zero() {
        return Err("timeouts must be > 0".to_string());
    }
    if upstream.retry.max_attempts == 0 {
        return Err("retry max_attempts must be > 0".to_string());
    }
    for (name, url) in [
        ("subgraph_url", &upstream.subgraph_url),
        ("rpc_url", &upstream.rpc_url),
        ("ipfs_gateway", &upstream.ipfs_gateway),
    ] {
        let parsed = reqwest::Url::parse(url).map_err(|e| format!("invalid {name}: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("{name} must use http or https"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_startup_validation() {
        validate_startup_config_contract(&ApiConfig::default(), &UpstreamConfig::default())
            .expect("defaults are valid");
    }

    #[test]
    fn startup_config_validation_rejects_oversized_pages() {
        let api = ApiConfig {
            page_size: 500,
            ..ApiConfig::default()
        };
        let err = validate_startup_config_contract(&api, &UpstreamConfig::default())
            .expect_err("page size over max");
        assert!(err.contains("max_page_size"));
    }

    #[test]
    fn startup_config_validation_rejects_bad_urls() {
        let upstream = UpstreamConfig {
            rpc_url: "ftp://node.example".to_string(),
            ..UpstreamConfig::default()
        };
        let err = validate_startup_config_contract(&ApiConfig::default(), &upstream)
            .expect_err("ftp rpc");
        assert!(err.contains("rpc_url"));

        let upstream = UpstreamConfig {
            retry: RetryPolicy {
                max_attempts: 0,
                base_backoff_ms: 10,
            },
            ..UpstreamConfig::default()
        };
        let err = validate_startup_config_contract(&ApiConfig::default(), &upstream)
            .expect_err("zero attempts");
        assert!(err.contains("max_attempts"));
    }
}
