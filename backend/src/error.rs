use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(e) if e.is_client_fault() => StatusCode::BAD_REQUEST,
            ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let msg = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            errored(&msg)
        } else {
            tracing::warn!(error = %msg, "request rejected");
            bad_request(&msg)
        }
    }
}

/// 400 with `msg` as a newline-terminated plain-text body.
pub fn bad_request(msg: &str) -> Response {
    plain_text(StatusCode::BAD_REQUEST, msg)
}

/// 500 with `msg` as a newline-terminated plain-text body.
pub fn errored(msg: &str) -> Response {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, msg)
}

fn plain_text(status: StatusCode, msg: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{msg}\n"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(res: Response) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn bad_request_is_400_with_newline() {
        let res = bad_request("test message");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(res).await, "test message\n");
    }

    #[tokio::test]
    async fn errored_is_500_with_newline() {
        let res = errored("test message");
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(res).await, "test message\n");
    }

    #[test]
    fn session_errors_map_to_fault_side() {
        let unknown: ApiError = SessionError::UnknownUser("ghost".into()).into();
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let malformed: ApiError = SessionError::MalformedSession(parse).into();
        assert_eq!(malformed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let store: ApiError = SessionError::StoreFailure(anyhow::anyhow!("db down")).into();
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn store_failure_surfaces_message() {
        let err: ApiError = SessionError::StoreFailure(anyhow::anyhow!("db down")).into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(res).await, "db down\n");
    }
}
