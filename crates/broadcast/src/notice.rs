use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Wire payload pushed to WebSocket subscribers. Serializes as
/// `{"type": "...", "data": {...}}`, timestamps as RFC 3339.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notice {
    Transcript(SegmentNotice),
    Status(StatusNotice),
    Checkpoint(CheckpointNotice),
}

/// One finalized speaker-attributed segment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SegmentNotice {
    pub meeting_id: Uuid,
    pub speaker_name: String,
    pub text: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub confidence: f64,
}

/// Chunk lifecycle announcement (processing, completed, failed).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatusNotice {
    pub meeting_id: Uuid,
    pub seq: i64,
    pub status: String,
}

/// Periodic checkpoint trigger fired every N chunks for meetings that have
/// the feature enabled. What downstream does with it is not our business.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CheckpointNotice {
    pub meeting_id: Uuid,
    pub seq: i64,
}
