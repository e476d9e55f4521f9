// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nouns_reasons_api::dto::{FallbackDto, HealthDto, HomePageDto, SplitVotesDto, VoterPageDto};
use nouns_reasons_api::present::etherscan_address_url;
use nouns_reasons_api::{
    parse_proposal_votes_params, parse_voter_route_id, parse_votes_page_params, ApiError,
    REVALIDATE_SECS,
};
use nouns_reasons_model::{Address, EnsName, SortOrder, VoterId};
use nouns_reasons_query::{
    split_by_support, IndexVotesDelegate, PageDescriptor, ProposalVotesDelegate, VoteFilter,
};
use tracing::{info, warn};

use super::cards::build_vote_cards;
use super::request_tracing::extract_request_id;
use super::response_contract::{api_error_response, json_response, query_error};
use crate::AppState;

type Params = BTreeMap<String, String>;

fn finish(
    route: &'static str,
    request_id: &str,
    started: Instant,
    result: Result<Response, ApiError>,
) -> Response {
    let resp = match result {
        Ok(resp) => resp,
        Err(err) => api_error_response(err.with_request_id(request_id)),
    };
    info!(
        request_id,
        route,
        status = resp.status().as_u16(),
        latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
    resp
}

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> Response {
    let stats = state.loader.cache().stats().await;
    Json(HealthDto {
        status: "ok".to_string(),
        cache_entries: stats.entries,
        cache_hits: stats.hits,
        cache_misses: stats.misses,
    })
    .into_response()
}

pub(crate) async fn proposal_votes_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Response {
    let started = Instant::now();
    let request_id = extract_request_id(&headers, &state);
    let result = proposal_votes(&state, &headers, &query, &request_id).await;
    finish("/api/getProposalVotes", &request_id, started, result)
}

async fn proposal_votes(
    state: &AppState,
    headers: &HeaderMap,
    query: &Params,
    request_id: &str,
) -> Result<Response, ApiError> {
    let params = parse_proposal_votes_params(query)?;
    let delegate = IndexVotesDelegate::new(state.votes.clone());
    let votes = delegate
        .fetch_proposal_votes(&params.proposal_id)
        .await
        .map_err(|e| query_error(&e, request_id))?;
    if !params.split {
        return Ok(json_response(headers, request_id, REVALIDATE_SECS, &votes));
    }
    let split = split_by_support(votes);
    if let Some(side) = params.side {
        let visible = split.visible(side);
        return Ok(json_response(headers, request_id, REVALIDATE_SECS, &visible));
    }
    let body = SplitVotesDto {
        proposal_id: params.proposal_id.as_str().to_string(),
        for_votes: split.for_votes,
        against_votes: split.against_votes,
    };
    Ok(json_response(headers, request_id, REVALIDATE_SECS, &body))
}

pub(crate) async fn votes_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Response {
    let started = Instant::now();
    let request_id = extract_request_id(&headers, &state);
    let result = votes_page(&state, &headers, &query, &request_id, false).await;
    finish("/api/votes", &request_id, started, result)
}

pub(crate) async fn vote_cards_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Response {
    let started = Instant::now();
    let request_id = extract_request_id(&headers, &state);
    let result = votes_page(&state, &headers, &query, &request_id, true).await;
    finish("/api/voteCards", &request_id, started, result)
}

async fn votes_page(
    state: &AppState,
    headers: &HeaderMap,
    query: &Params,
    request_id: &str,
    as_cards: bool,
) -> Result<Response, ApiError> {
    let params = parse_votes_page_params(query, state.loader.page_size())?;
    let votes = state
        .loader
        .load(&params.descriptor)
        .await
        .map_err(|e| query_error(&e, request_id))?;
    if as_cards {
        let cards = build_vote_cards(state.chain.as_ref(), &votes, state.api.enrich_cards).await;
        return Ok(json_response(headers, request_id, REVALIDATE_SECS, &cards));
    }
    Ok(json_response(headers, request_id, REVALIDATE_SECS, &votes))
}

pub(crate) async fn voter_page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = extract_request_id(&headers, &state);
    let result = voter_page(&state, &headers, &id, &request_id).await;
    finish("/voters/:id", &request_id, started, result)
}

async fn resolve_voter(
    state: &AppState,
    voter: VoterId,
    request_id: &str,
) -> Result<(Address, Option<EnsName>), ApiError> {
    match voter {
        VoterId::Ens(name) => {
            let address = state
                .chain
                .resolve_ens(&name)
                .await
                .map_err(|e| ApiError::upstream(&e.0))?
                .ok_or_else(|| ApiError::voter_not_found(name.as_str()))?;
            Ok((address, Some(name)))
        }
        VoterId::Address(address) => {
            let name = match state.chain.ens_name(&address).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(request_id, "ens reverse lookup failed: {e}");
                    None
                }
            };
            Ok((address, name))
        }
    }
}

async fn voter_page(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    request_id: &str,
) -> Result<Response, ApiError> {
    let voter = parse_voter_route_id(id)?;
    let (address, ens_name) = resolve_voter(state, voter, request_id).await?;
    let page = PageDescriptor::new(
        VoteFilter::for_voter(address.clone()),
        0,
        state.loader.page_size(),
    );
    let votes = state
        .loader
        .load(&page)
        .await
        .map_err(|e| query_error(&e, request_id))?;
    let display = ens_name
        .as_ref()
        .map_or_else(|| address.short(), EnsName::title_case);
    let mut fallback = FallbackDto::new();
    fallback.insert(page.cache_key().to_string(), votes);
    let body = VoterPageDto {
        address: address.as_str().to_string(),
        ens_name: ens_name.map(|n| n.as_str().to_string()),
        title: format!("{display} Votes"),
        etherscan_url: etherscan_address_url(address.as_str()),
        fallback,
        revalidate: REVALIDATE_SECS,
    };
    Ok(json_response(headers, request_id, REVALIDATE_SECS, &body))
}

pub(crate) async fn home_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = extract_request_id(&headers, &state);
    let result = home(&state, &headers, &request_id).await;
    finish("/api/home", &request_id, started, result)
}

async fn home(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &str,
) -> Result<Response, ApiError> {
    let block_number = state
        .chain
        .block_number()
        .await
        .map_err(|e| ApiError::upstream(&e.0))?;
    // Fallback pages are always full listing pages.
    let first_page = PageDescriptor::new(
        VoteFilter::all(SortOrder::Desc),
        0,
        state.loader.page_size(),
    );
    let (votes, proposals) = tokio::join!(
        state.loader.load(&first_page),
        state.proposals.get_open_proposals(
            block_number,
            SortOrder::Asc,
            state.api.home_proposals,
            0,
        )
    );
    let votes = votes.map_err(|e| query_error(&e, request_id))?;
    let open_proposals = proposals.map_err(|e| query_error(&e, request_id))?;
    let take = usize::try_from(state.api.home_votes).unwrap_or(usize::MAX);
    let initial_votes = votes.iter().take(take).cloned().collect();
    let mut fallback = FallbackDto::new();
    fallback.insert(first_page.cache_key().to_string(), votes);
    let body = HomePageDto {
        initial_votes,
        block_number,
        open_proposals,
        fallback,
        revalidate: REVALIDATE_SECS,
    };
    Ok(json_response(headers, request_id, REVALIDATE_SECS, &body))
}
