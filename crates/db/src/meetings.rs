use chrono::Utc;
use libsql::params;
use uuid::Uuid;

use crate::error::Error;
use crate::store::Database;
use crate::types::{Meeting, NewMeeting};

const MEETING_COLUMNS: &str =
    "id, title, host_email, checkpoint_enabled, checkpoint_frequency, created_at";

impl Database {
    /// Register a meeting, or refresh its settings if it already exists.
    /// `created_at` is set on first insert and never touched again.
    pub async fn upsert_meeting(&self, meeting: NewMeeting) -> Result<Meeting, Error> {
        self.conn()
            .execute(
                "INSERT INTO meetings (id, title, host_email, checkpoint_enabled, checkpoint_frequency, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (id) DO UPDATE SET
                   title = excluded.title,
                   host_email = excluded.host_email,
                   checkpoint_enabled = excluded.checkpoint_enabled,
                   checkpoint_frequency = excluded.checkpoint_frequency",
                params![
                    meeting.id.to_string(),
                    meeting.title,
                    meeting.host_email,
                    meeting.checkpoint_enabled as i64,
                    meeting.checkpoint_frequency,
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;

        self.get_meeting(meeting.id)
            .await?
            .ok_or(Error::NotFound("meeting"))
    }

    pub async fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>, Error> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Meeting::from_row(&row)?)),
            None => Ok(None),
        }
    }
}
