// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use axum::routing::get;
use axum::Router;
use nouns_reasons_query::{PageCache, PageLoader, ProposalIndex, VoteIndex};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

mod config;
mod http;
mod upstream;

pub use config::{validate_startup_config_contract, ApiConfig, UpstreamConfig, DEFAULT_IPFS_GATEWAY};
pub use upstream::chain::{RpcChainClient, ENS_REGISTRY};
pub use upstream::fake::{FakeChain, FakeIndex};
pub use upstream::subgraph::SubgraphClient;
pub use upstream::{normalize_avatar_uri, ChainClient, ChainError, RetryPolicy};

pub const CRATE_NAME: &str = "nouns-reasons-server";

/// Shared handler state. Upstream clients are built once at startup and
/// injected here.
#[derive(Clone)]
pub struct AppState {
    pub votes: Arc<dyn VoteIndex>,
    pub proposals: Arc<dyn ProposalIndex>,
    pub chain: Arc<dyn ChainClient>,
    pub loader: PageLoader,
    pub api: Arc<ApiConfig>,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(
        votes: Arc<dyn VoteIndex>,
        proposals: Arc<dyn ProposalIndex>,
        chain: Arc<dyn ChainClient>,
    ) -> Self {
        Self::with_config(votes, proposals, chain, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(
        votes: Arc<dyn VoteIndex>,
        proposals: Arc<dyn ProposalIndex>,
        chain: Arc<dyn ChainClient>,
        api: ApiConfig,
    ) -> Self {
        let cache = Arc::new(
            PageCache::new(api.cache_ttl, api.cache_max_entries).with_page_size(api.page_size),
        );
        Self {
            loader: PageLoader::new(Arc::clone(&votes), cache),
            votes,
            proposals,
            chain,
            api: Arc::new(api),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route(
            "/api/getProposalVotes",
            get(http::handlers::proposal_votes_handler),
        )
        .route("/api/votes", get(http::handlers::votes_page_handler))
        .route("/api/voteCards", get(http::handlers::vote_cards_handler))
        .route("/api/home", get(http::handlers::home_handler))
        .route("/voters/:id", get(http::handlers::voter_page_handler))
        .with_state(state)
}
