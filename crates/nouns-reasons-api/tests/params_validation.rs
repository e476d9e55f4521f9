use std::collections::BTreeMap;

use nouns_reasons_api::{
    map_error, parse_proposal_votes_params, parse_voter_route_id, parse_votes_page_params,
    ApiErrorCode,
};
use nouns_reasons_model::{SortOrder, VoterId};
use nouns_reasons_query::VoteSide;

const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn proposal_votes_requires_numeric_proposal_id() {
    let missing = parse_proposal_votes_params(&query(&[])).expect_err("missing");
    assert_eq!(missing.code, ApiErrorCode::MissingQueryParameter);
    assert_eq!(map_error(&missing).status_code, 400);

    let bad = parse_proposal_votes_params(&query(&[("proposalId", "12a")])).expect_err("bad");
    assert_eq!(bad.code, ApiErrorCode::InvalidQueryParameter);

    let ok = parse_proposal_votes_params(&query(&[("proposalId", "142")])).expect("ok");
    assert_eq!(ok.proposal_id.as_str(), "142");
    assert!(!ok.split);
}

#[test]
fn proposal_votes_side_implies_split() {
    let parsed = parse_proposal_votes_params(&query(&[("proposalId", "7"), ("side", "against")]))
        .expect("side");
    assert!(parsed.split);
    assert_eq!(parsed.side, Some(VoteSide::Against));

    let bad = parse_proposal_votes_params(&query(&[("proposalId", "7"), ("side", "abstain")]))
        .expect_err("abstain side");
    assert_eq!(bad.code, ApiErrorCode::InvalidQueryParameter);
}

#[test]
fn votes_page_defaults_to_first_descending_page() {
    let parsed = parse_votes_page_params(&query(&[]), 10).expect("defaults");
    assert_eq!(parsed.descriptor.page_index, 0);
    assert_eq!(parsed.descriptor.page_size, 10);
    assert_eq!(parsed.descriptor.filter.order, SortOrder::Desc);
    assert_eq!(
        parsed.descriptor.cache_key().as_str(),
        "/api/votes?page=1&order=desc"
    );
}

#[test]
fn votes_page_rejects_page_zero_and_garbage() {
    for raw in ["0", "-1", "x", ""] {
        let err = parse_votes_page_params(&query(&[("page", raw)]), 10).expect_err(raw);
        assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
    }
    let err = parse_votes_page_params(&query(&[("order", "sideways")]), 10).expect_err("order");
    assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
}

#[test]
fn votes_page_filters_build_the_shared_key() {
    let parsed = parse_votes_page_params(
        &query(&[
            ("page", "3"),
            ("order", "asc"),
            ("voterId", CHECKSUMMED),
            ("proposalId", "88"),
        ]),
        25,
    )
    .expect("filters");
    assert_eq!(parsed.descriptor.query().offset, 50);
    assert_eq!(parsed.descriptor.query().limit, 25);
    assert_eq!(
        parsed.descriptor.cache_key().as_str(),
        "/api/votes?page=3&order=asc&voterId=0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed&proposalId=88"
    );
}

#[test]
fn votes_page_voter_filter_must_be_an_address() {
    let err = parse_votes_page_params(&query(&[("voterId", "nouns.eth")]), 10).expect_err("ens");
    assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
}

#[test]
fn voter_route_accepts_addresses_and_ens_names() {
    assert!(matches!(
        parse_voter_route_id(CHECKSUMMED).expect("address"),
        VoterId::Address(_)
    ));
    assert!(matches!(
        parse_voter_route_id("Nouns.eth").expect("ens"),
        VoterId::Ens(_)
    ));
}

#[test]
fn voter_route_rejects_other_identifiers() {
    for raw in ["hello", "0x1234", "0xZZZeb6053F3E94C9b9A09f33669435E7Ef1BeAed"] {
        let err = parse_voter_route_id(raw).expect_err(raw);
        assert_eq!(err.code, ApiErrorCode::InvalidVoterId);
        assert_eq!(err.message, "invalid address or ens name");
        assert_eq!(map_error(&err).status_code, 400);
    }
}
