// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use nouns_reasons_model::{Proposal, ProposalId, Support, Vote};
use serde::{Deserialize, Serialize};

use crate::{QueryError, QueryErrorCode, VoteIndex, VoteQuery, PROPOSAL_VOTES_LIMIT};

/// Which proposal set the caller should supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    #[default]
    Active,
    All,
}

/// Performs the vote fetch for a newly selected proposal.
#[async_trait]
pub trait ProposalVotesDelegate: Send + Sync {
    async fn fetch_proposal_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, QueryError>;
}

/// Delegate that asks a [`VoteIndex`] for every vote on the proposal.
pub struct IndexVotesDelegate {
    index: Arc<dyn VoteIndex>,
}

impl IndexVotesDelegate {
    #[must_use]
    pub fn new(index: Arc<dyn VoteIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl ProposalVotesDelegate for IndexVotesDelegate {
    async fn fetch_proposal_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, QueryError> {
        self.index
            .get_votes(&VoteQuery::for_proposal(
                proposal.clone(),
                PROPOSAL_VOTES_LIMIT,
            ))
            .await
    }
}

/// Horizontal proposal picker. Holds the candidates and at most one selected
/// proposal; vote data lives with the caller.
pub struct ProposalSelection<D> {
    proposals: Vec<Proposal>,
    selected: Option<ProposalId>,
    segment: Segment,
    delegate: D,
}

impl<D: ProposalVotesDelegate> ProposalSelection<D> {
    #[must_use]
    pub fn new(proposals: Vec<Proposal>, delegate: D) -> Self {
        Self {
            proposals,
            selected: None,
            segment: Segment::default(),
            delegate,
        }
    }

    #[must_use]
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Replaces the candidates; a selection that is no longer present is
    /// cleared.
    pub fn set_proposals(&mut self, proposals: Vec<Proposal>) {
        self.proposals = proposals;
        if let Some(id) = &self.selected {
            if !self.proposals.iter().any(|p| &p.id == id) {
                self.selected = None;
            }
        }
    }

    #[must_use]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn set_segment(&mut self, segment: Segment) -> bool {
        let changed = self.segment != segment;
        self.segment = segment;
        changed
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Proposal> {
        let id = self.selected.as_ref()?;
        self.proposals.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn is_selected(&self, id: &ProposalId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Selects `id` and fetches its votes through the delegate. `None` goes
    /// back to the aggregate listing and fetches nothing.
    pub async fn select(&mut self, id: Option<&ProposalId>) -> Result<Option<Vec<Vote>>, QueryError> {
        let Some(id) = id else {
            self.selected = None;
            return Ok(None);
        };
        if !self.proposals.iter().any(|p| &p.id == id) {
            return Err(QueryError::new(
                QueryErrorCode::InvalidRequest,
                format!("proposal {id} is not among the candidates"),
            ));
        }
        self.selected = Some(id.clone());
        self.delegate.fetch_proposal_votes(id).await.map(Some)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteSide {
    #[default]
    For,
    Against,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitVotes {
    pub for_votes: Vec<Vote>,
    pub against_votes: Vec<Vote>,
}

impl SplitVotes {
    /// The single column shown on narrow screens.
    #[must_use]
    pub fn visible(&self, side: VoteSide) -> &[Vote] {
        match side {
            VoteSide::For => &self.for_votes,
            VoteSide::Against => &self.against_votes,
        }
    }
}

/// Splits a proposal's votes into for and against columns. Abstentions
/// appear in neither.
#[must_use]
pub fn split_by_support(votes: Vec<Vote>) -> SplitVotes {
    let mut split = SplitVotes::default();
    for vote in votes {
        match vote.support {
            Support::For => split.for_votes.push(vote),
            Support::Against => split.against_votes.push(vote),
            Support::Abstain => {}
        }
    }
    split
}
