mod handlers;

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use common::logger::{TraceId, request_span};
use session::service::SessionService;
use tower_http::trace::TraceLayer;
use tracing::Span;

pub use handlers::{delete_session, get_session, healthz, put_session};

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(sessions: SessionService) -> Self {
        Self { sessions }
    }
}

/// Session routes plus a liveness probe. PUT and POST share one handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/{username}",
            get(get_session)
                .put(put_session)
                .post(put_session)
                .delete(delete_session),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    request_span(req.method().as_str(), req.uri().path(), &TraceId::new())
                })
                .on_response(|res: &Response, latency: Duration, span: &Span| {
                    span.record("status", res.status().as_u16());
                    tracing::info!(latency_ms = latency.as_millis() as u64, "request finished");
                }),
        )
        .with_state(state)
}
