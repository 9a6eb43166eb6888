use chrono::Utc;
use libsql::params;
use uuid::Uuid;

use crate::error::Error;
use crate::store::Database;
use crate::types::{AudioChunk, ChunkStatus, NewChunk};

const CHUNK_COLUMNS: &str =
    "id, meeting_id, seq, transcript, status, audio_started_at, audio_ended_at, created_at";

impl Database {
    pub async fn insert_chunk(&self, chunk: NewChunk) -> Result<AudioChunk, Error> {
        let id = Uuid::new_v4();
        self.conn()
            .execute(
                "INSERT INTO audio_chunks (id, meeting_id, seq, audio, status, audio_started_at, audio_ended_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    chunk.meeting_id.to_string(),
                    chunk.seq,
                    chunk.audio,
                    ChunkStatus::Ready.as_str(),
                    chunk.audio_started_at.map(|t| t.to_rfc3339()),
                    chunk.audio_ended_at.map(|t| t.to_rfc3339()),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;

        self.get_chunk(id).await?.ok_or(Error::NotFound("chunk"))
    }

    pub async fn get_chunk(&self, id: Uuid) -> Result<Option<AudioChunk>, Error> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {CHUNK_COLUMNS} FROM audio_chunks WHERE id = ?1"),
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(AudioChunk::from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_chunks(&self, meeting_id: Uuid) -> Result<Vec<AudioChunk>, Error> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CHUNK_COLUMNS} FROM audio_chunks WHERE meeting_id = ?1 ORDER BY seq"
                ),
                params![meeting_id.to_string()],
            )
            .await?;

        let mut chunks = Vec::new();
        while let Some(row) = rows.next().await? {
            chunks.push(AudioChunk::from_row(&row)?);
        }
        Ok(chunks)
    }

    /// The raw audio blob, fetched only when it is about to be transcribed.
    pub async fn chunk_audio(&self, id: Uuid) -> Result<Option<Vec<u8>>, Error> {
        let mut rows = self
            .conn()
            .query(
                "SELECT audio FROM audio_chunks WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<Option<Vec<u8>>>(0)?),
            None => Ok(None),
        }
    }

    pub async fn set_chunk_status(&self, id: Uuid, status: ChunkStatus) -> Result<(), Error> {
        self.conn()
            .execute(
                "UPDATE audio_chunks SET status = ?2 WHERE id = ?1",
                params![id.to_string(), status.as_str()],
            )
            .await?;
        Ok(())
    }

    /// Store the provider's raw transcription payload and mark the chunk
    /// completed in one statement.
    pub async fn store_transcript(&self, id: Uuid, payload: &str) -> Result<(), Error> {
        self.conn()
            .execute(
                "UPDATE audio_chunks SET transcript = ?2, status = ?3 WHERE id = ?1",
                params![id.to_string(), payload, ChunkStatus::Completed.as_str()],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewMeeting;
    use chrono::{TimeZone, Utc};

    async fn db_with_meeting() -> (Database, Uuid) {
        let db = Database::memory().await.unwrap();
        let meeting_id = Uuid::new_v4();
        db.upsert_meeting(NewMeeting {
            id: meeting_id,
            title: None,
            host_email: None,
            checkpoint_enabled: false,
            checkpoint_frequency: 5,
        })
        .await
        .unwrap();
        (db, meeting_id)
    }

    fn chunk(meeting_id: Uuid, seq: i64) -> NewChunk {
        let started = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        NewChunk {
            meeting_id,
            seq,
            audio: vec![0xAA, 0xBB],
            audio_started_at: Some(started + chrono::Duration::seconds(seq * 30)),
            audio_ended_at: Some(started + chrono::Duration::seconds((seq + 1) * 30)),
        }
    }

    #[tokio::test]
    async fn insert_starts_ready_without_transcript() {
        let (db, meeting_id) = db_with_meeting().await;

        let stored = db.insert_chunk(chunk(meeting_id, 1)).await.unwrap();

        assert_eq!(stored.status, ChunkStatus::Ready);
        assert_eq!(stored.seq, 1);
        assert!(stored.transcript.is_none());
        assert!(stored.audio_started_at.is_some());
    }

    #[tokio::test]
    async fn audio_blob_round_trips() {
        let (db, meeting_id) = db_with_meeting().await;
        let stored = db.insert_chunk(chunk(meeting_id, 1)).await.unwrap();

        let audio = db.chunk_audio(stored.id).await.unwrap().unwrap();

        assert_eq!(audio, vec![0xAA, 0xBB]);
    }

    #[tokio::test]
    async fn store_transcript_completes_the_chunk() {
        let (db, meeting_id) = db_with_meeting().await;
        let stored = db.insert_chunk(chunk(meeting_id, 1)).await.unwrap();

        db.set_chunk_status(stored.id, ChunkStatus::Processing)
            .await
            .unwrap();
        db.store_transcript(stored.id, r#"{"text": "hi"}"#)
            .await
            .unwrap();

        let reread = db.get_chunk(stored.id).await.unwrap().unwrap();
        assert_eq!(reread.status, ChunkStatus::Completed);
        assert_eq!(reread.transcript.as_deref(), Some(r#"{"text": "hi"}"#));
    }

    #[tokio::test]
    async fn duplicate_seq_for_a_meeting_is_a_unique_violation() {
        let (db, meeting_id) = db_with_meeting().await;
        db.insert_chunk(chunk(meeting_id, 1)).await.unwrap();

        let err = db.insert_chunk(chunk(meeting_id, 1)).await.unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn list_orders_by_seq() {
        let (db, meeting_id) = db_with_meeting().await;
        db.insert_chunk(chunk(meeting_id, 2)).await.unwrap();
        db.insert_chunk(chunk(meeting_id, 1)).await.unwrap();

        let chunks = db.list_chunks(meeting_id).await.unwrap();

        let seqs: Vec<i64> = chunks.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, [1, 2]);
    }
}
