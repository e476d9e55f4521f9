// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use nouns_reasons_model::{Address, ProposalId, ProposalRef, SortOrder, Support, Vote};
use nouns_reasons_query::{QueryError, VoteIndex, VoteQuery};

pub const VOTER_A: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const VOTER_B: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

pub fn vote(n: u64, voter: &str, proposal: &str, support: Support) -> Vote {
    Vote {
        id: format!("vote-{n}"),
        voter: Address::new(voter).expect("voter"),
        support,
        votes: 1,
        reason: None,
        block_number: 1_000 + n,
        proposal: ProposalRef {
            id: ProposalId::new(proposal).expect("proposal id"),
            title: format!("Proposal {proposal}"),
        },
    }
}

/// In-memory index ordered by block number.
#[derive(Default)]
pub struct MemoryIndex {
    pub votes: Vec<Vote>,
    pub calls: AtomicU64,
    pub fail: AtomicBool,
}

impl MemoryIndex {
    pub fn with_votes(votes: Vec<Vote>) -> Self {
        Self {
            votes,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoteIndex for MemoryIndex {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(QueryError::upstream("index unavailable"));
        }
        let mut matching: Vec<Vote> = self
            .votes
            .iter()
            .filter(|v| query.voter_id.as_ref().is_none_or(|id| &v.voter == id))
            .filter(|v| query.proposal_id.as_ref().is_none_or(|id| &v.proposal.id == id))
            .cloned()
            .collect();
        matching.sort_by_key(|v| v.block_number);
        if query.order == SortOrder::Desc {
            matching.reverse();
        }
        Ok(matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }
}
