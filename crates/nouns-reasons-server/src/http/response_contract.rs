// SPDX-License-Identifier: Apache-2.0

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use nouns_reasons_api::{map_error, ApiError, ApiErrorCode};
use nouns_reasons_core::canonical::json_etag;
use nouns_reasons_query::{QueryError, QueryErrorCode};
use serde::Serialize;
use serde_json::json;

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = StatusCode::from_u16(map_error(&err).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = err.request_id.clone();
    let mut resp = (status, Json(json!({"error": err}))).into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

pub(crate) fn query_error(err: &QueryError, request_id: &str) -> ApiError {
    let api = match err.code {
        QueryErrorCode::InvalidRequest => ApiError::new(
            ApiErrorCode::InvalidQueryParameter,
            err.message.clone(),
            json!({}),
            request_id,
        ),
        _ => ApiError::upstream(&err.message),
    };
    api.with_request_id(request_id)
}

/// JSON body with a weak content etag; answers `304` when the client
/// already holds it.
pub(crate) fn json_response<T: Serialize>(
    headers: &HeaderMap,
    request_id: &str,
    max_age_secs: u64,
    value: &T,
) -> Response {
    let etag = match json_etag(value) {
        Ok(tag) => tag,
        Err(e) => {
            return api_error_response(ApiError::new(
                ApiErrorCode::Internal,
                format!("response serialization failed: {e}"),
                json!({}),
                request_id,
            ))
        }
    };
    let fresh = headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|t| t.trim() == etag));
    let mut resp = if fresh {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Json(value).into_response()
    };
    let out = resp.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&etag) {
        out.insert("etag", v);
    }
    if let Ok(v) = HeaderValue::from_str(request_id) {
        out.insert("x-request-id", v);
    }
    if let Ok(v) = HeaderValue::from_str(&format!(
        "public, s-maxage={max_age_secs}, stale-while-revalidate"
    )) {
        out.insert("cache-control", v);
    }
    resp
}
