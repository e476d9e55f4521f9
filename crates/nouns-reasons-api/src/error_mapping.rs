// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::MissingQueryParameter
        | ApiErrorCode::InvalidQueryParameter
        | ApiErrorCode::InvalidVoterId => 400,
        ApiErrorCode::VoterNotFound => 404,
        ApiErrorCode::UpstreamUnavailable => 502,
        _ => 500,
    };
    ApiErrorMapping { status_code }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(map_error(&ApiError::invalid_voter_id("x")).status_code, 400);
        assert_eq!(map_error(&ApiError::missing_param("proposalId")).status_code, 400);
        assert_eq!(map_error(&ApiError::voter_not_found("a.eth")).status_code, 404);
        assert_eq!(map_error(&ApiError::upstream("timeout")).status_code, 502);
    }
}
