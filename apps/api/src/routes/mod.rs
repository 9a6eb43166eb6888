pub(crate) mod chunks;
pub(crate) mod events;
pub(crate) mod meetings;
pub(crate) mod ws;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::auth::{self, AuthState};
use crate::state::AppState;

const MAX_CHUNK_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn router(state: AppState, auth_state: AuthState) -> Router {
    let ingest = Router::new()
        .route("/meetings", post(meetings::register))
        .route("/audio/chunk", post(chunks::upload))
        .route("/events/speaker-started", post(events::speaker_started))
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            auth::require_service_token,
        ));

    Router::new()
        .route("/meetings/{id}", get(meetings::show))
        .route("/meetings/{id}/segments", get(meetings::segments))
        .route("/meetings/{id}/chunks", get(meetings::chunks))
        .route("/ws/meetings/{id}", get(ws::handler))
        .merge(ingest)
        .layer(DefaultBodyLimit::max(MAX_CHUNK_UPLOAD_BYTES))
        .with_state(state)
}
