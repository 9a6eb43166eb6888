use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Ready,
    Processing,
    Completed,
    Failed,
}

impl ChunkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::Ready => "ready",
            ChunkStatus::Processing => "processing",
            ChunkStatus::Completed => "completed",
            ChunkStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ChunkStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(ChunkStatus::Ready),
            "processing" => Ok(ChunkStatus::Processing),
            "completed" => Ok(ChunkStatus::Completed),
            "failed" => Ok(ChunkStatus::Failed),
            other => Err(Error::UnknownChunkStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Meeting {
    pub id: Uuid,
    pub title: Option<String>,
    pub host_email: Option<String>,
    pub checkpoint_enabled: bool,
    pub checkpoint_frequency: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub id: Uuid,
    pub title: Option<String>,
    pub host_email: Option<String>,
    pub checkpoint_enabled: bool,
    pub checkpoint_frequency: i64,
}

/// One chunk's metadata. The audio blob is deliberately not carried here —
/// listings would haul megabytes per row; fetch it with
/// [`crate::Database::chunk_audio`] when actually transcribing.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub seq: i64,
    pub transcript: Option<String>,
    pub status: ChunkStatus,
    pub audio_started_at: Option<DateTime<Utc>>,
    pub audio_ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChunk {
    pub meeting_id: Uuid,
    pub seq: i64,
    pub audio: Vec<u8>,
    pub audio_started_at: Option<DateTime<Utc>>,
    pub audio_ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SpeakerEventRow {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSpeakerEvent {
    pub meeting_id: Uuid,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SegmentRow {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub source_chunk_id: Uuid,
    pub speaker_member_id: Option<String>,
    pub speaker_name: String,
    pub text: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSegment {
    pub meeting_id: Uuid,
    pub source_chunk_id: Uuid,
    pub speaker_member_id: Option<String>,
    pub speaker_name: String,
    pub text: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub confidence: f64,
}

/// Everything the alignment orchestrator needs from one read pass: the chunk,
/// its meeting (checkpoint settings) and the meeting's full speaker-event
/// history. Plain values — safe to carry into CPU-bound work without holding
/// a connection.
#[derive(Debug, Clone)]
pub struct ChunkSnapshot {
    pub chunk: AudioChunk,
    pub meeting: Meeting,
    pub events: Vec<SpeakerEventRow>,
}

// ── Row converters ───────────────────────────────────────────────────────────

impl Meeting {
    // columns: id, title, host_email, checkpoint_enabled, checkpoint_frequency, created_at
    pub(crate) fn from_row(row: &libsql::Row) -> Result<Self, Error> {
        Ok(Self {
            id: parse_uuid(row.get::<String>(0)?)?,
            title: row.get::<Option<String>>(1)?,
            host_email: row.get::<Option<String>>(2)?,
            checkpoint_enabled: row.get::<i64>(3)? != 0,
            checkpoint_frequency: row.get::<i64>(4)?,
            created_at: parse_dt(row.get::<String>(5)?)?,
        })
    }
}

impl AudioChunk {
    // columns: id, meeting_id, seq, transcript, status, audio_started_at, audio_ended_at, created_at
    pub(crate) fn from_row(row: &libsql::Row) -> Result<Self, Error> {
        Ok(Self {
            id: parse_uuid(row.get::<String>(0)?)?,
            meeting_id: parse_uuid(row.get::<String>(1)?)?,
            seq: row.get::<i64>(2)?,
            transcript: row.get::<Option<String>>(3)?,
            status: row.get::<String>(4)?.parse()?,
            audio_started_at: parse_opt_dt(row.get::<Option<String>>(5)?)?,
            audio_ended_at: parse_opt_dt(row.get::<Option<String>>(6)?)?,
            created_at: parse_dt(row.get::<String>(7)?)?,
        })
    }
}

impl SpeakerEventRow {
    // columns: id, meeting_id, member_id, member_name, started_at
    pub(crate) fn from_row(row: &libsql::Row) -> Result<Self, Error> {
        Ok(Self {
            id: parse_uuid(row.get::<String>(0)?)?,
            meeting_id: parse_uuid(row.get::<String>(1)?)?,
            member_id: row.get::<Option<String>>(2)?,
            member_name: row.get::<Option<String>>(3)?,
            started_at: parse_dt(row.get::<String>(4)?)?,
        })
    }
}

impl SegmentRow {
    // columns: id, meeting_id, source_chunk_id, speaker_member_id, speaker_name,
    //          text, start_time, end_time, confidence, created_at
    pub(crate) fn from_row(row: &libsql::Row) -> Result<Self, Error> {
        Ok(Self {
            id: parse_uuid(row.get::<String>(0)?)?,
            meeting_id: parse_uuid(row.get::<String>(1)?)?,
            source_chunk_id: parse_uuid(row.get::<String>(2)?)?,
            speaker_member_id: row.get::<Option<String>>(3)?,
            speaker_name: row.get::<String>(4)?,
            text: row.get::<String>(5)?,
            start_time: parse_dt(row.get::<String>(6)?)?,
            end_time: parse_dt(row.get::<String>(7)?)?,
            confidence: row.get::<f64>(8)?,
            created_at: parse_dt(row.get::<String>(9)?)?,
        })
    }
}

fn parse_uuid(s: String) -> Result<Uuid, Error> {
    Ok(Uuid::parse_str(&s)?)
}

fn parse_dt(s: String) -> Result<DateTime<Utc>, Error> {
    Ok(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc))
}

fn parse_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>, Error> {
    s.map(parse_dt).transpose()
}
