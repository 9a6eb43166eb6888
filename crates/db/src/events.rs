use libsql::params;
use uuid::Uuid;

use crate::error::Error;
use crate::store::Database;
use crate::types::{NewSpeakerEvent, SpeakerEventRow};

const EVENT_COLUMNS: &str = "id, meeting_id, member_id, member_name, started_at";

impl Database {
    pub async fn insert_speaker_event(
        &self,
        event: NewSpeakerEvent,
    ) -> Result<SpeakerEventRow, Error> {
        let id = Uuid::new_v4();
        self.conn()
            .execute(
                "INSERT INTO speaker_events (id, meeting_id, member_id, member_name, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    event.meeting_id.to_string(),
                    event.member_id.clone(),
                    event.member_name.clone(),
                    event.started_at.to_rfc3339(),
                ],
            )
            .await?;

        Ok(SpeakerEventRow {
            id,
            meeting_id: event.meeting_id,
            member_id: event.member_id,
            member_name: event.member_name,
            started_at: event.started_at,
        })
    }

    /// The meeting's complete speaker history, oldest first. Alignment always
    /// wants all of it — segments near a chunk boundary depend on events from
    /// long before the chunk began.
    pub async fn list_speaker_events(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<SpeakerEventRow>, Error> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM speaker_events
                     WHERE meeting_id = ?1 ORDER BY started_at"
                ),
                params![meeting_id.to_string()],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(SpeakerEventRow::from_row(&row)?);
        }
        Ok(events)
    }
}
