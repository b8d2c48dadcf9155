use super::with_store;
use crate::response::{document_response, version_response};
use crate::validation::{client_version, is_force, validate_body, write_version};
use crate::{AppState, Result};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

/// GET /
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let since = client_version(&headers)?;
    debug!("Fetching document since {}", since);

    let (version, body) = with_store(&state, move |store| {
        let mut body = Vec::new();
        let version = store.get(since, &mut body)?;
        Ok((version, body))
    })
    .await?;

    info!("Served document version {} ({} bytes)", version, body.len());
    Ok(document_response(version, body))
}

/// HEAD /
pub async fn head_document(State(state): State<Arc<AppState>>) -> Result<Response> {
    let version = with_store(&state, |store| store.current_version()).await?;
    debug!("Current document version {}", version);

    Ok(version_response(version))
}

/// PUT /
pub async fn put_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let version = write_version(&headers)?;
    validate_body(&headers, &body, state.size_limit)?;

    let stored = if is_force(&headers) {
        info!("Requested FORCE put ({} bytes)", body.len());
        with_store(&state, move |store| store.overwrite(body)).await?
    } else {
        info!("Writing document at version {} ({} bytes)", version, body.len());
        with_store(&state, move |store| store.safe_put(version, body)).await?
    };

    Ok(version_response(stored))
}
