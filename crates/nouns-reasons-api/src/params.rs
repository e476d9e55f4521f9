// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use nouns_reasons_model::{Address, ProposalId, SortOrder, VoterId};
use nouns_reasons_query::{PageDescriptor, VoteFilter, VoteSide};

use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalVotesParams {
    pub proposal_id: ProposalId,
    /// Respond with for/against columns instead of a flat list.
    pub split: bool,
    pub side: Option<VoteSide>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotesPageParams {
    pub descriptor: PageDescriptor,
}

pub fn parse_proposal_votes_params(
    query: &BTreeMap<String, String>,
) -> Result<ProposalVotesParams, ApiError> {
    let raw = query
        .get("proposalId")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_param("proposalId"))?;
    let proposal_id =
        ProposalId::new(raw.as_str()).map_err(|_| ApiError::invalid_param("proposalId", raw))?;
    let split = match query.get("split").map(String::as_str) {
        None | Some("false" | "0") => false,
        Some("true" | "1") => true,
        Some(other) => return Err(ApiError::invalid_param("split", other)),
    };
    let side = match query.get("side").map(String::as_str) {
        None => None,
        Some("for") => Some(VoteSide::For),
        Some("against") => Some(VoteSide::Against),
        Some(other) => return Err(ApiError::invalid_param("side", other)),
    };
    Ok(ProposalVotesParams {
        proposal_id,
        split: split || side.is_some(),
        side,
    })
}

/// Parses one page request of the votes listing.
///
/// Page size is a process setting rather than a query parameter: cache keys
/// carry the filter and page number only, so a per-request size would alias
/// pages of different lengths under one key.
pub fn parse_votes_page_params(
    query: &BTreeMap<String, String>,
    page_size: u64,
) -> Result<VotesPageParams, ApiError> {
    let page = match query.get("page") {
        None => 1,
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| ApiError::invalid_param("page", raw))?,
    };
    let order = match query.get("order") {
        None => SortOrder::default(),
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|_| ApiError::invalid_param("order", raw))?,
    };
    let voter_id = query
        .get("voterId")
        .map(|raw| Address::new(raw.as_str()).map_err(|_| ApiError::invalid_param("voterId", raw)))
        .transpose()?;
    let proposal_id = query
        .get("proposalId")
        .map(|raw| {
            ProposalId::new(raw.as_str()).map_err(|_| ApiError::invalid_param("proposalId", raw))
        })
        .transpose()?;
    let filter = VoteFilter {
        voter_id,
        proposal_id,
        order,
    };
    Ok(VotesPageParams {
        descriptor: PageDescriptor::new(filter, page - 1, page_size),
    })
}

pub fn parse_voter_route_id(raw: &str) -> Result<VoterId, ApiError> {
    VoterId::parse(raw.trim()).map_err(|_| ApiError::invalid_voter_id(raw))
}
