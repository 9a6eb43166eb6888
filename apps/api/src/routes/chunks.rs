use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use plenum_db::NewChunk;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChunkAccepted {
    pub chunk_id: Uuid,
    pub seq: i64,
}

#[derive(Default)]
struct Upload {
    meeting_id: Option<Uuid>,
    seq: Option<i64>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    audio: Option<Bytes>,
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::BadRequest(format!("invalid {field}: {e}")))
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read {name}: {e}")))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read audio: {e}")))?;
                upload.audio = Some(bytes);
            }
            "meeting_id" => {
                let text = text_field(field, "meeting_id").await?;
                upload.meeting_id = Some(
                    text.parse()
                        .map_err(|e| ApiError::BadRequest(format!("invalid meeting_id: {e}")))?,
                );
            }
            "seq" => {
                let text = text_field(field, "seq").await?;
                upload.seq = Some(
                    text.parse()
                        .map_err(|e| ApiError::BadRequest(format!("invalid seq: {e}")))?,
                );
            }
            "started_at" => {
                let text = text_field(field, "started_at").await?;
                upload.started_at = Some(parse_timestamp("started_at", &text)?);
            }
            "ended_at" => {
                let text = text_field(field, "ended_at").await?;
                upload.ended_at = Some(parse_timestamp("ended_at", &text)?);
            }
            other => {
                tracing::debug!(field = other, "ignored_multipart_field");
            }
        }
    }

    Ok(upload)
}

/// Multipart ingest: `meeting_id`, `seq`, optional `started_at` / `ended_at`
/// anchors (RFC 3339) and the `audio` file. The chunk is stored as-is and the
/// transcription job queued; alignment later skips chunks whose anchors never
/// arrived.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_upload(multipart).await?;

    let meeting_id = upload
        .meeting_id
        .ok_or_else(|| ApiError::BadRequest("missing field: meeting_id".to_string()))?;
    let seq = upload
        .seq
        .ok_or_else(|| ApiError::BadRequest("missing field: seq".to_string()))?;
    let audio = upload
        .audio
        .ok_or_else(|| ApiError::BadRequest("missing field: audio".to_string()))?;
    if audio.is_empty() {
        return Err(ApiError::BadRequest("audio file is empty".to_string()));
    }
    if state.db.get_meeting(meeting_id).await?.is_none() {
        return Err(ApiError::BadRequest(format!(
            "unknown meeting: {meeting_id}"
        )));
    }

    let chunk = state
        .db
        .insert_chunk(NewChunk {
            meeting_id,
            seq,
            audio: audio.to_vec(),
            audio_started_at: upload.started_at,
            audio_ended_at: upload.ended_at,
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::Conflict(format!("chunk {seq} already uploaded for this meeting"))
            } else {
                ApiError::Db(e)
            }
        })?;

    state.queue.enqueue(chunk.id).await?;
    tracing::info!(
        chunk_id = %chunk.id,
        meeting_id = %meeting_id,
        seq,
        bytes = audio.len(),
        "chunk_accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ChunkAccepted {
            chunk_id: chunk.id,
            seq,
        }),
    ))
}
