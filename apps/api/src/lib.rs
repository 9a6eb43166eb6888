pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::{Router, body::Body, extract::MatchedPath, http::Request};
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

pub use auth::AuthState;
pub use state::AppState;

pub fn app(state: AppState, auth_state: AuthState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health))
        .merge(routes::router(state, auth_state))
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let path = request.uri().path();

                    if path == "/health" {
                        return tracing::Span::none();
                    }

                    let method = request.method();
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(path);

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        http.route = %matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<Body>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        if span.is_disabled() {
                            return;
                        }
                        tracing::info!(
                            parent: span,
                            http_status = %response.status().as_u16(),
                            latency_ms = %latency.as_millis(),
                            "http_request_finished"
                        );
                    },
                )
                .on_failure(
                    |failure_class: ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        if span.is_disabled() {
                            return;
                        }
                        tracing::error!(
                            parent: span,
                            failure_class = ?failure_class,
                            latency_ms = %latency.as_millis(),
                            "http_request_failed"
                        );
                    },
                ),
        )
}

async fn health() -> &'static str {
    "ok"
}
