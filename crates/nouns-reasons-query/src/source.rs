// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use nouns_reasons_model::{Address, Proposal, ProposalId, SortOrder, Vote};
use serde::{Deserialize, Serialize};

use crate::QueryError;

/// Upper bound used when a caller wants every vote of a single proposal.
pub const PROPOSAL_VOTES_LIMIT: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteQuery {
    pub order: SortOrder,
    pub voter_id: Option<Address>,
    pub proposal_id: Option<ProposalId>,
    pub offset: u64,
    pub limit: u64,
}

impl VoteQuery {
    /// Unfiltered query over all votes.
    #[must_use]
    pub fn latest(order: SortOrder, limit: u64, offset: u64) -> Self {
        Self {
            order,
            voter_id: None,
            proposal_id: None,
            offset,
            limit,
        }
    }

    #[must_use]
    pub fn for_proposal(proposal_id: ProposalId, limit: u64) -> Self {
        Self {
            order: SortOrder::Desc,
            voter_id: None,
            proposal_id: Some(proposal_id),
            offset: 0,
            limit,
        }
    }
}

#[async_trait]
pub trait VoteIndex: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    async fn get_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, QueryError>;

    async fn get_votes_positional(
        &self,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Vote>, QueryError> {
        self.get_votes(&VoteQuery::latest(order, limit, offset)).await
    }
}

#[async_trait]
pub trait ProposalIndex: Send + Sync + 'static {
    async fn get_open_proposals(
        &self,
        as_of_block: u64,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Proposal>, QueryError>;
}
