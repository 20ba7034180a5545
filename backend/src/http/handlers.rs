use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::Span;

use super::AppState;
use crate::error::ApiError;

/// GET /{username}: canonical document, or an empty 200 when there is none.
pub async fn get_session(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    Span::current().record("username", username.as_str());

    match state.sessions.fetch(&username).await? {
        Some(body) => Ok(json(body)),
        None => Ok(StatusCode::OK.into_response()),
    }
}

/// PUT|POST /{username}: store the raw body, echo it back wrapped.
pub async fn put_session(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    Span::current().record("username", username.as_str());

    let raw = std::str::from_utf8(&body)
        .map_err(|_| ApiError::BadRequest("request body is not valid UTF-8".to_string()))?;

    let (_, stored) = state.sessions.replace(&username, raw).await?;
    Ok(json(stored))
}

/// DELETE /{username}: always 200 with an empty body.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    Span::current().record("username", username.as_str());

    state.sessions.delete(&username).await?;
    Ok(StatusCode::OK)
}

pub async fn healthz() -> &'static str {
    "ok"
}

fn json(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
