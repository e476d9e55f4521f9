// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    MissingQueryParameter,
    InvalidQueryParameter,
    InvalidVoterId,
    VoterNotFound,
    UpstreamUnavailable,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingQueryParameter => "MissingQueryParameter",
            Self::InvalidQueryParameter => "InvalidQueryParameter",
            Self::InvalidVoterId => "InvalidVoterId",
            Self::VoterNotFound => "VoterNotFound",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
            Self::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn missing_param(name: &str) -> Self {
        Self::new(
            ApiErrorCode::MissingQueryParameter,
            format!("missing query parameter: {name}"),
            json!({"parameter": name}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"field_errors":[{"parameter": name, "reason": "invalid", "value": value}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_voter_id(value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidVoterId,
            "invalid address or ens name",
            json!({"id": value}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn voter_not_found(name: &str) -> Self {
        Self::new(
            ApiErrorCode::VoterNotFound,
            format!("ens name {name} does not resolve to an address"),
            json!({"id": name}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn upstream(message: &str) -> Self {
        Self::new(
            ApiErrorCode::UpstreamUnavailable,
            "upstream unavailable",
            json!({"reason": message}),
            "req-unknown",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}
