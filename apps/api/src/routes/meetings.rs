use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plenum_db::{AudioChunk, Meeting, NewMeeting, SegmentRow};

use crate::error::{ApiError, Result};
use crate::state::AppState;

fn default_checkpoint_frequency() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct RegisterMeeting {
    pub meeting_id: Uuid,
    pub title: Option<String>,
    pub host_email: Option<String>,
    #[serde(default)]
    pub checkpoint_enabled: bool,
    #[serde(default = "default_checkpoint_frequency")]
    pub checkpoint_frequency: i64,
}

#[derive(Debug, Serialize)]
pub struct MeetingResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub host_email: Option<String>,
    pub checkpoint_enabled: bool,
    pub checkpoint_frequency: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Meeting> for MeetingResponse {
    fn from(m: Meeting) -> Self {
        Self {
            id: m.id,
            title: m.title,
            host_email: m.host_email,
            checkpoint_enabled: m.checkpoint_enabled,
            checkpoint_frequency: m.checkpoint_frequency,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub id: Uuid,
    pub speaker_id: Option<String>,
    pub speaker_name: String,
    pub text: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub confidence: f64,
}

impl From<SegmentRow> for SegmentResponse {
    fn from(s: SegmentRow) -> Self {
        Self {
            id: s.id,
            speaker_id: s.speaker_member_id,
            speaker_name: s.speaker_name,
            text: s.text,
            start_time: s.start_time,
            end_time: s.end_time,
            confidence: s.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub id: Uuid,
    pub seq: i64,
    pub status: String,
    pub has_transcript: bool,
    pub audio_started_at: Option<DateTime<Utc>>,
    pub audio_ended_at: Option<DateTime<Utc>>,
}

impl From<AudioChunk> for ChunkResponse {
    fn from(c: AudioChunk) -> Self {
        Self {
            id: c.id,
            seq: c.seq,
            status: c.status.as_str().to_string(),
            has_transcript: c.transcript.is_some(),
            audio_started_at: c.audio_started_at,
            audio_ended_at: c.audio_ended_at,
        }
    }
}

/// Upsert keeps registration idempotent; the bot re-registers on every
/// reconnect and only the checkpoint settings may change.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterMeeting>,
) -> Result<impl IntoResponse> {
    let meeting = state
        .db
        .upsert_meeting(NewMeeting {
            id: body.meeting_id,
            title: body.title,
            host_email: body.host_email,
            checkpoint_enabled: body.checkpoint_enabled,
            checkpoint_frequency: body.checkpoint_frequency,
        })
        .await?;

    if let Some(runner) = &state.runner {
        match runner.ensure_running().await {
            Ok(spawned) => {
                if spawned {
                    tracing::info!(meeting_id = %meeting.id, "bot_started_for_meeting");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, meeting_id = %meeting.id, "bot_spawn_failed");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(MeetingResponse::from(meeting))))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingResponse>> {
    let meeting = state
        .db
        .get_meeting(id)
        .await?
        .ok_or(ApiError::NotFound("meeting"))?;
    Ok(Json(MeetingResponse::from(meeting)))
}

pub async fn segments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SegmentResponse>>> {
    let segments = state.db.list_segments(id).await?;
    Ok(Json(
        segments.into_iter().map(SegmentResponse::from).collect(),
    ))
}

pub async fn chunks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChunkResponse>>> {
    let chunks = state.db.list_chunks(id).await?;
    Ok(Json(chunks.into_iter().map(ChunkResponse::from).collect()))
}
