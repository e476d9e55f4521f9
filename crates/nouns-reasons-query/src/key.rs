// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use nouns_reasons_model::{Address, ProposalId, SortOrder};
use serde::{Deserialize, Serialize};

use crate::VoteQuery;

pub const VOTES_KEY_PATH: &str = "/api/votes";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteFilter {
    pub voter_id: Option<Address>,
    pub proposal_id: Option<ProposalId>,
    pub order: SortOrder,
}

impl VoteFilter {
    #[must_use]
    pub fn all(order: SortOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_voter(voter: Address) -> Self {
        Self {
            voter_id: Some(voter),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_proposal(proposal: ProposalId) -> Self {
        Self {
            proposal_id: Some(proposal),
            ..Self::default()
        }
    }
}

/// Cache key for one page of a filtered vote listing.
///
/// The wire form mirrors the votes endpoint path so a fallback payload can be
/// keyed by the same string a client would request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pure function of `(filter, page_index)`.
///
/// Page numbers in the key are 1-based. Every field is rendered from a
/// validated identifier, so no value can contain `&` or `=` and distinct
/// inputs never render to the same string.
#[must_use]
pub fn derive_cache_key(filter: &VoteFilter, page_index: u64) -> CacheKey {
    let page = u128::from(page_index) + 1;
    let mut key = format!("{VOTES_KEY_PATH}?page={page}&order={}", filter.order);
    if let Some(voter) = &filter.voter_id {
        key.push_str("&voterId=");
        key.push_str(&voter.to_lowercase());
    }
    if let Some(proposal) = &filter.proposal_id {
        key.push_str("&proposalId=");
        key.push_str(proposal.as_str());
    }
    CacheKey(key)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageDescriptor {
    pub filter: VoteFilter,
    pub page_index: u64,
    pub page_size: u64,
}

impl PageDescriptor {
    #[must_use]
    pub fn new(filter: VoteFilter, page_index: u64, page_size: u64) -> Self {
        Self {
            filter,
            page_index,
            page_size,
        }
    }

    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        derive_cache_key(&self.filter, self.page_index)
    }

    #[must_use]
    pub fn query(&self) -> VoteQuery {
        VoteQuery {
            order: self.filter.order,
            voter_id: self.filter.voter_id.clone(),
            proposal_id: self.filter.proposal_id.clone(),
            offset: self.page_index.saturating_mul(self.page_size),
            limit: self.page_size,
        }
    }
}
