use std::path::Path;

use uuid::Uuid;

use crate::error::Error;
use crate::types::ChunkSnapshot;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meetings (
  id TEXT PRIMARY KEY,
  title TEXT,
  host_email TEXT,
  checkpoint_enabled INTEGER NOT NULL DEFAULT 0,
  checkpoint_frequency INTEGER NOT NULL DEFAULT 5,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audio_chunks (
  id TEXT PRIMARY KEY,
  meeting_id TEXT NOT NULL REFERENCES meetings (id),
  seq INTEGER NOT NULL,
  audio BLOB,
  transcript TEXT,
  status TEXT NOT NULL DEFAULT 'ready',
  audio_started_at TEXT,
  audio_ended_at TEXT,
  created_at TEXT NOT NULL,
  UNIQUE (meeting_id, seq)
);

CREATE TABLE IF NOT EXISTS speaker_events (
  id TEXT PRIMARY KEY,
  meeting_id TEXT NOT NULL REFERENCES meetings (id),
  member_id TEXT,
  member_name TEXT,
  started_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_speaker_events_meeting_started
  ON speaker_events (meeting_id, started_at);

CREATE TABLE IF NOT EXISTS transcript_segments (
  id TEXT PRIMARY KEY,
  meeting_id TEXT NOT NULL REFERENCES meetings (id),
  source_chunk_id TEXT NOT NULL REFERENCES audio_chunks (id),
  speaker_member_id TEXT,
  speaker_name TEXT NOT NULL,
  text TEXT NOT NULL,
  start_time TEXT NOT NULL,
  end_time TEXT NOT NULL,
  confidence REAL NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_segments_meeting_start
  ON transcript_segments (meeting_id, start_time);

CREATE UNIQUE INDEX IF NOT EXISTS idx_segments_chunk_speaker_start
  ON transcript_segments (source_chunk_id, ifnull(speaker_member_id, ''), start_time);
"#;

/// Handle to the service's libsql store. Cheap to clone; clones share the
/// underlying connection.
#[derive(Clone)]
pub struct Database {
    conn: libsql::Connection,
}

impl Database {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let db = libsql::Builder::new_local(path.as_ref()).build().await?;
        let conn = db.connect()?;
        let this = Self { conn };
        this.migrate().await?;
        Ok(this)
    }

    /// In-memory store. Used by tests and by local runs that do not care
    /// about persistence across restarts.
    pub async fn memory() -> Result<Self, Error> {
        let db = libsql::Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;
        let this = Self { conn };
        this.migrate().await?;
        Ok(this)
    }

    async fn migrate(&self) -> Result<(), Error> {
        self.conn.execute_batch(SCHEMA).await?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// One read pass for the alignment orchestrator: chunk, meeting, full
    /// speaker-event history. `None` when the chunk (or its meeting) is gone.
    pub async fn chunk_snapshot(&self, chunk_id: Uuid) -> Result<Option<ChunkSnapshot>, Error> {
        let Some(chunk) = self.get_chunk(chunk_id).await? else {
            return Ok(None);
        };
        let Some(meeting) = self.get_meeting(chunk.meeting_id).await? else {
            return Ok(None);
        };
        let events = self.list_speaker_events(chunk.meeting_id).await?;
        Ok(Some(ChunkSnapshot {
            chunk,
            meeting,
            events,
        }))
    }
}
