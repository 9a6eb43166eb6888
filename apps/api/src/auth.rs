use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Shared-secret auth for the bot-facing ingest routes. A `None` token
/// disables the check, which is only meant for local development.
#[derive(Clone)]
pub struct AuthState {
    token: Option<String>,
}

impl AuthState {
    pub fn new(token: Option<String>) -> Self {
        if token.is_none() {
            tracing::warn!("service_token_unset_auth_disabled");
        }
        Self { token }
    }
}

pub async fn require_service_token(
    State(auth): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = &auth.token else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => Err(ApiError::Auth("invalid service token".to_string())),
        None => Err(ApiError::Auth("missing bearer token".to_string())),
    }
}
