// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use nouns_reasons_model::{Proposal, Support, Vote};
use serde::{Deserialize, Serialize};

/// Prefetched pages keyed by their derived cache key.
pub type FallbackDto = BTreeMap<String, Vec<Vote>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoteCardDto {
    pub vote_id: String,
    pub voter: String,
    pub display_name: String,
    pub avatar_url: String,
    pub address_url: String,
    pub support: Support,
    pub support_label: String,
    pub support_style: String,
    pub proposal_url: String,
    pub proposal_label: String,
    pub votes_label: String,
    pub reason_html: String,
    pub reason_muted: bool,
    pub age: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoterPageDto {
    pub address: String,
    pub ens_name: Option<String>,
    pub title: String,
    pub etherscan_url: String,
    pub fallback: FallbackDto,
    pub revalidate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HomePageDto {
    pub initial_votes: Vec<Vote>,
    pub block_number: u64,
    pub open_proposals: Vec<Proposal>,
    pub fallback: FallbackDto,
    pub revalidate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SplitVotesDto {
    pub proposal_id: String,
    pub for_votes: Vec<Vote>,
    pub against_votes: Vec<Vote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthDto {
    pub status: String,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}
