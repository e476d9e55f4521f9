// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod dto;
mod error_mapping;
mod errors;
pub mod params;
pub mod present;

pub use error_mapping::{map_error, ApiErrorMapping};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{
    parse_proposal_votes_params, parse_voter_route_id, parse_votes_page_params,
    ProposalVotesParams, VotesPageParams,
};

pub const CRATE_NAME: &str = "nouns-reasons-api";
pub const REVALIDATE_SECS: u64 = 30;
