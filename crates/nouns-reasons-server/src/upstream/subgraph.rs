// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use nouns_reasons_model::{Address, Proposal, ProposalId, ProposalRef, ProposalStatus, SortOrder, Support, Vote};
use nouns_reasons_query::{ProposalIndex, QueryError, VoteIndex, VoteQuery, PROPOSAL_VOTES_LIMIT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{instrument, warn};

use super::RetryPolicy;

const VOTE_FIELDS: &str =
    "id voter { id } support supportDetailed votes reason blockNumber proposal { id title }";

/// GraphQL client for the DAO's indexing subgraph.
pub struct SubgraphClient {
    url: String,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl SubgraphClient {
    #[must_use]
    pub fn new(url: String, timeout: Duration, retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            url,
            retry,
            client,
        }
    }

    #[instrument(name = "subgraph_post_with_retry", skip(self, query, variables))]
    async fn post_with_retry<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<T, QueryError> {
        let body = json!({"query": query, "variables": variables});
        let mut attempt = 0;
        let bytes = loop {
            attempt += 1;
            match self.client.post(&self.url).json(&body).send().await {
                Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                    Ok(bytes) => break bytes,
                    Err(e) if attempt >= self.retry.max_attempts => {
                        return Err(QueryError::upstream(format!("read body failed: {e}")));
                    }
                    Err(e) => warn!(operation, attempt, "subgraph body read failed: {e}"),
                },
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(QueryError::upstream(format!(
                            "subgraph {operation} failed status={}",
                            resp.status()
                        )));
                    }
                    warn!(operation, attempt, status = resp.status().as_u16(), "subgraph retry");
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(QueryError::upstream(format!(
                            "subgraph {operation} failed: {e}"
                        )));
                    }
                    warn!(operation, attempt, "subgraph request failed: {e}");
                }
            }
            tokio::time::sleep(self.retry.backoff(attempt)).await;
        };
        decode_graph_response(&bytes)
    }
}

#[derive(Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Deserialize)]
struct GraphError {
    message: String,
}

fn decode_graph_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, QueryError> {
    let parsed: GraphResponse<T> = serde_json::from_slice(bytes)
        .map_err(|e| QueryError::decode(format!("subgraph response: {e}")))?;
    if let Some(first) = parsed.errors.first() {
        return Err(QueryError::upstream(format!(
            "subgraph error: {}",
            first.message
        )));
    }
    parsed
        .data
        .ok_or_else(|| QueryError::decode("subgraph response has no data"))
}

#[derive(Deserialize)]
struct VotesData {
    votes: Vec<WireVote>,
}

#[derive(Deserialize)]
struct ProposalsData {
    proposals: Vec<WireProposal>,
}

#[derive(Deserialize)]
struct WireAccount {
    id: String,
}

#[derive(Deserialize)]
struct WireProposalRef {
    id: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVote {
    id: String,
    voter: WireAccount,
    #[serde(default)]
    support: Option<bool>,
    #[serde(default)]
    support_detailed: Option<u8>,
    votes: String,
    #[serde(default)]
    reason: Option<String>,
    block_number: String,
    proposal: WireProposalRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProposal {
    id: String,
    #[serde(default)]
    title: Option<String>,
    status: ProposalStatus,
    start_block: String,
    end_block: String,
    #[serde(default)]
    votes: Vec<WireVote>,
}

fn parse_u64(field: &str, raw: &str) -> Result<u64, QueryError> {
    raw.parse::<u64>()
        .map_err(|_| QueryError::decode(format!("{field} is not an unsigned integer: {raw}")))
}

impl TryFrom<WireVote> for Vote {
    type Error = QueryError;

    fn try_from(wire: WireVote) -> Result<Self, Self::Error> {
        let support = wire
            .support_detailed
            .and_then(Support::from_detailed)
            .unwrap_or_else(|| Support::from_flag(wire.support));
        Ok(Vote {
            voter: Address::new(wire.voter.id)
                .map_err(|e| QueryError::decode(e.to_string()))?,
            support,
            votes: parse_u64("votes", &wire.votes)?,
            reason: wire.reason,
            block_number: parse_u64("blockNumber", &wire.block_number)?,
            proposal: ProposalRef {
                id: ProposalId::new(wire.proposal.id)
                    .map_err(|e| QueryError::decode(e.to_string()))?,
                title: wire.proposal.title.unwrap_or_default(),
            },
            id: wire.id,
        })
    }
}

impl TryFrom<WireProposal> for Proposal {
    type Error = QueryError;

    fn try_from(wire: WireProposal) -> Result<Self, Self::Error> {
        Ok(Proposal {
            id: ProposalId::new(wire.id).map_err(|e| QueryError::decode(e.to_string()))?,
            title: wire.title.unwrap_or_default(),
            status: wire.status,
            start_block: parse_u64("startBlock", &wire.start_block)?,
            end_block: parse_u64("endBlock", &wire.end_block)?,
            votes: wire
                .votes
                .into_iter()
                .map(Vote::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn order_direction(order: SortOrder) -> &'static str {
    order.as_str()
}

/// The `where` argument for a vote query. Addresses are matched lowercase.
fn vote_filter(query: &VoteQuery) -> Value {
    let mut filter = Map::new();
    if let Some(voter) = &query.voter_id {
        filter.insert("voter".to_string(), Value::String(voter.to_lowercase()));
    }
    if let Some(proposal) = &query.proposal_id {
        filter.insert(
            "proposal".to_string(),
            Value::String(proposal.as_str().to_string()),
        );
    }
    Value::Object(filter)
}

#[async_trait]
impl VoteIndex for SubgraphClient {
    fn backend_tag(&self) -> &'static str {
        "subgraph"
    }

    #[instrument(name = "subgraph_get_votes", skip(self), fields(offset = query.offset, limit = query.limit))]
    async fn get_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>, QueryError> {
        let gql = format!(
            "query Votes($first: Int!, $skip: Int!, $order: OrderDirection!, $where: Vote_filter) {{ \
             votes(first: $first, skip: $skip, orderBy: blockNumber, orderDirection: $order, where: $where) {{ {VOTE_FIELDS} }} }}"
        );
        let variables = json!({
            "first": query.limit,
            "skip": query.offset,
            "order": order_direction(query.order),
            "where": vote_filter(query),
        });
        let data: VotesData = self.post_with_retry("votes", &gql, variables).await?;
        data.votes.into_iter().map(Vote::try_from).collect()
    }
}

#[async_trait]
impl ProposalIndex for SubgraphClient {
    #[instrument(name = "subgraph_get_open_proposals", skip(self))]
    async fn get_open_proposals(
        &self,
        as_of_block: u64,
        order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Proposal>, QueryError> {
        let gql = format!(
            "query OpenProposals($first: Int!, $skip: Int!, $order: OrderDirection!, $block: BigInt!) {{ \
             proposals(first: $first, skip: $skip, orderBy: startBlock, orderDirection: $order, \
             where: {{ status_in: [PENDING, ACTIVE], endBlock_gt: $block }}) {{ \
             id title status startBlock endBlock votes(first: {PROPOSAL_VOTES_LIMIT}) {{ {VOTE_FIELDS} }} }} }}"
        );
        let variables = json!({
            "first": limit,
            "skip": offset,
            "order": order_direction(order),
            "block": as_of_block.to_string(),
        });
        let data: ProposalsData = self.post_with_retry("proposals", &gql, variables).await?;
        let mut proposals = data
            .proposals
            .into_iter()
            .map(Proposal::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        proposals.retain(|p| p.is_open_at(as_of_block));
        Ok(proposals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_votes_decode_into_model_votes() {
        let body = br#"{"data":{"votes":[{
            "id":"0xabc-1",
            "voter":{"id":"0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"},
            "support":false,
            "supportDetailed":2,
            "votes":"4",
            "reason":null,
            "blockNumber":"15000000",
            "proposal":{"id":"142","title":"Fund"}
        }]}}"#;
        let data: VotesData = decode_graph_response(body).expect("decode");
        let votes: Vec<Vote> = data
            .votes
            .into_iter()
            .map(Vote::try_from)
            .collect::<Result<_, _>>()
            .expect("convert");
        assert_eq!(votes[0].support, Support::Abstain);
        assert_eq!(votes[0].votes, 4);
        assert_eq!(votes[0].voter.as_str(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(votes[0].proposal.id.as_str(), "142");
    }

    #[test]
    fn graph_errors_surface_as_upstream() {
        let err = decode_graph_response::<VotesData>(br#"{"errors":[{"message":"boom"}]}"#)
            .err()
            .expect("graph error");
        assert_eq!(err.code, nouns_reasons_query::QueryErrorCode::Upstream);
    }

    #[test]
    fn malformed_numbers_are_decode_errors() {
        let body = br#"{"data":{"votes":[{"id":"1","voter":{"id":"0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"},
            "support":true,"votes":"lots","blockNumber":"1","proposal":{"id":"1"}}]}}"#;
        let data: VotesData = decode_graph_response(body).expect("decode");
        let err = data
            .votes
            .into_iter()
            .map(Vote::try_from)
            .collect::<Result<Vec<_>, _>>()
            .expect_err("bad votes");
        assert_eq!(err.code, nouns_reasons_query::QueryErrorCode::Decode);
    }

    #[test]
    fn vote_filter_uses_lowercase_voter() {
        let query = VoteQuery {
            order: SortOrder::Desc,
            voter_id: Some(
                Address::new("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").expect("address"),
            ),
            proposal_id: Some(ProposalId::new("9").expect("id")),
            offset: 0,
            limit: 10,
        };
        assert_eq!(
            vote_filter(&query),
            json!({"voter":"0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed","proposal":"9"})
        );
    }
}
