use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plenum_db::NewSpeakerEvent;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Speaker-change notification from the bot. `member_id` and `member_name`
/// are both optional; anonymous attendees still produce events.
#[derive(Debug, Deserialize)]
pub struct SpeakerStarted {
    pub meeting_id: Uuid,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventAccepted {
    pub event_id: Uuid,
}

pub async fn speaker_started(
    State(state): State<AppState>,
    Json(body): Json<SpeakerStarted>,
) -> Result<impl IntoResponse> {
    if state.db.get_meeting(body.meeting_id).await?.is_none() {
        return Err(ApiError::BadRequest(format!(
            "unknown meeting: {}",
            body.meeting_id
        )));
    }

    let event = state
        .db
        .insert_speaker_event(NewSpeakerEvent {
            meeting_id: body.meeting_id,
            member_id: body.member_id,
            member_name: body.member_name,
            started_at: body.started_at,
        })
        .await?;

    tracing::debug!(
        event_id = %event.id,
        meeting_id = %event.meeting_id,
        member = event.member_name.as_deref().unwrap_or("unknown"),
        "speaker_event_recorded"
    );

    Ok((StatusCode::CREATED, Json(EventAccepted { event_id: event.id })))
}
