use chrono::Utc;
use libsql::params;
use uuid::Uuid;

use crate::error::Error;
use crate::store::Database;
use crate::types::{NewSegment, SegmentRow};

const SEGMENT_COLUMNS: &str = "id, meeting_id, source_chunk_id, speaker_member_id, speaker_name, \
                               text, start_time, end_time, confidence, created_at";

impl Database {
    /// Persist one chunk's segments in a single transaction.
    ///
    /// The insert is `OR IGNORE` against the unique
    /// `(source_chunk_id, speaker_member_id, start_time)` index, so replaying
    /// alignment for a chunk is harmless: rows that already exist are left
    /// untouched and the return value counts only the rows actually written.
    pub async fn insert_segments(&self, segments: &[NewSegment]) -> Result<u64, Error> {
        if segments.is_empty() {
            return Ok(0);
        }

        let tx = self.conn().transaction().await?;
        let mut inserted = 0;
        for segment in segments {
            inserted += tx
                .execute(
                    "INSERT OR IGNORE INTO transcript_segments
                       (id, meeting_id, source_chunk_id, speaker_member_id, speaker_name,
                        text, start_time, end_time, confidence, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        Uuid::new_v4().to_string(),
                        segment.meeting_id.to_string(),
                        segment.source_chunk_id.to_string(),
                        segment.speaker_member_id.clone(),
                        segment.speaker_name.clone(),
                        segment.text.clone(),
                        segment.start_time.to_rfc3339(),
                        segment.end_time.to_rfc3339(),
                        segment.confidence,
                        Utc::now().to_rfc3339(),
                    ],
                )
                .await?;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// All segments of a meeting in reading order. Chunks are aligned
    /// concurrently, so insertion order means nothing — `start_time` is the
    /// contract.
    pub async fn list_segments(&self, meeting_id: Uuid) -> Result<Vec<SegmentRow>, Error> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SEGMENT_COLUMNS} FROM transcript_segments
                     WHERE meeting_id = ?1 ORDER BY start_time"
                ),
                params![meeting_id.to_string()],
            )
            .await?;

        let mut segments = Vec::new();
        while let Some(row) = rows.next().await? {
            segments.push(SegmentRow::from_row(&row)?);
        }
        Ok(segments)
    }
}
