use crate::{ApiError, AppState, Result};
use axum::extract::{Query, Request, State};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::Response;
use notesync_core::AUTH_HEADER;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Query parameters accepted in place of the auth header
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

/// Reject requests that do not present the configured shared secret
///
/// The secret is read from the `X-Auth-Access-Token` header, or from a
/// `token` query parameter so the HTML view can be opened in a browser.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let Some(expected) = state.auth_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| token_from_query(request.uri()));

    match provided {
        Some(token) if constant_time_compare(&token, expected) => Ok(next.run(request).await),
        Some(_) => {
            warn!("Rejected {} {}: invalid token", request.method(), request.uri().path());
            Err(ApiError::Unauthorized("Invalid token".to_string()))
        }
        None => {
            warn!("Rejected {} {}: no token", request.method(), request.uri().path());
            Err(ApiError::Unauthorized("No auth token provided".to_string()))
        }
    }
}

fn token_from_query(uri: &Uri) -> Option<String> {
    Query::<TokenParams>::try_from_uri(uri)
        .ok()
        .and_then(|Query(params)| params.token)
}

/// Compare two secrets without leaking where they differ
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    // Pad to a common length with different fill bytes so a length mismatch
    // can never compare equal
    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
