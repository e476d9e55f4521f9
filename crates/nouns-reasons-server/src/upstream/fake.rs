// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use nouns_reasons_model::{Address, EnsName, Proposal, SortOrder, Vote};
use nouns_reasons_query::{ProposalIndex, QueryError, VoteIndex, VoteQuery};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::{ChainClient, ChainError};

/// In-memory vote and proposal index for tests and local runs.
#[derive(Default)]
pub struct FakeIndex {
    pub votes: Mutex<Vec<Vote>>,
    pub proposals: Mutex<Vec<Proposal>>,
    pub vote_calls: AtomicU64,
    pub fail: AtomicBool,
    pub slow_read: bool,
}

impl FakeIndex {
    #[must_use]
    pub fn with_votes(votes: Vec<Vote>) -> Self {
        Self {
            votes: Mutex::new(votes),
            ..Self::default()
        }
    }

    fn check_fail(&self) -> Result<(), QueryError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(QueryError::upstream("fake index unavailable"));
        }
        Ok(())
    }
}

fn page<T: Clone>(items: &[T], offset: u64, limit: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl VoteIndex for FakeIndex {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn get_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, QueryError> {
        self.vote_calls.fetch_add(1, Ordering::Relaxed);
        if self.slow_read {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.check_fail()?;
        let mut matching: Vec<Vote> = self
            .votes
            .lock()
            .await
            .iter()
            .filter(|v| query.voter_id.as_ref().is_none_or(|a| &v.voter == a))
            .filter(|v| query.proposal_id.as_ref().is_none_or(|p| &v.proposal.id == p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.block_number.cmp(&b.block_number).then(a.id.cmp(&b.id)));
        if query.order == SortOrder::Desc {
            matching.reverse();
        }
        Ok(page(&matching, query.offset, query.limit))
    }
}

#[async_trait]
impl ProposalIndex for FakeIndex {
    async fn get_open_proposals(
        &self,
        as_of_block: u64,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Proposal>, QueryError> {
        self.check_fail()?;
        let mut open: Vec<Proposal> = self
            .proposals
            .lock()
            .await
            .iter()
            .filter(|p| p.is_open_at(as_of_block))
            .cloned()
            .collect();
        open.sort_by_key(|p| p.start_block);
        if order == SortOrder::Desc {
            open.reverse();
        }
        Ok(page(&open, offset, limit))
    }
}

/// Chain stand-in with fixed block data and ENS records.
#[derive(Default)]
pub struct FakeChain {
    pub block_number: AtomicU64,
    /// Seconds per block when no explicit timestamp is set.
    pub block_time_secs: u64,
    pub genesis_timestamp: u64,
    pub names: Mutex<HashMap<Address, EnsName>>,
    pub avatars: Mutex<HashMap<Address, String>>,
    pub fail: AtomicBool,
}

impl FakeChain {
    #[must_use]
    pub fn at_block(block: u64) -> Self {
        Self {
            block_number: AtomicU64::new(block),
            block_time_secs: 12,
            ..Self::default()
        }
    }

    pub async fn register(&self, address: Address, name: EnsName) {
        self.names.lock().await.insert(address, name);
    }

    fn check_fail(&self) -> Result<(), ChainError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(ChainError("fake chain unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.check_fail()?;
        Ok(self.block_number.load(Ordering::Relaxed))
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError> {
        self.check_fail()?;
        Ok(self
            .genesis_timestamp
            .saturating_add(block.saturating_mul(self.block_time_secs)))
    }

    async fn ens_name(&self, address: &Address) -> Result<Option<EnsName>, ChainError> {
        self.check_fail()?;
        Ok(self.names.lock().await.get(address).cloned())
    }

    async fn ens_avatar(&self, address: &Address) -> Result<Option<String>, ChainError> {
        self.check_fail()?;
        Ok(self.avatars.lock().await.get(address).cloned())
    }

    async fn resolve_ens(&self, name: &EnsName) -> Result<Option<Address>, ChainError> {
        self.check_fail()?;
        Ok(self
            .names
            .lock()
            .await
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(a, _)| a.clone()))
    }
}
