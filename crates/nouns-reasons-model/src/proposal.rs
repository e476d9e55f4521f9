// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{Address, ProposalId, Vote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ProposalStatus {
    Pending,
    Active,
    Cancelled,
    Vetoed,
    Queued,
    Executed,
    #[serde(other)]
    Unknown,
}

impl ProposalStatus {
    /// Pending and active proposals can still receive votes.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub status: ProposalStatus,
    pub start_block: u64,
    pub end_block: u64,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

impl Proposal {
    #[must_use]
    pub fn is_open_at(&self, block: u64) -> bool {
        self.status.is_open() && self.end_block > block
    }

    #[must_use]
    pub fn has_vote_from(&self, account: &Address) -> bool {
        self.votes.iter().any(|vote| &vote.voter == account)
    }
}

/// Proposals the account has not voted on yet. Without an account every
/// proposal is votable.
#[must_use]
pub fn votable_proposals(proposals: &[Proposal], account: Option<&Address>) -> Vec<Proposal> {
    proposals
        .iter()
        .filter(|proposal| account.is_none_or(|a| !proposal.has_vote_from(a)))
        .cloned()
        .collect()
}
