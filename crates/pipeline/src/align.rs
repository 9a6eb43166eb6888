//! Alignment orchestration for one chunk.
//!
//! Three phases, deliberately kept short and separate:
//!
//! 1. **Read** — one snapshot query copies the chunk, its meeting and the
//!    full speaker-event history out as plain values.
//! 2. **Compute** — the pure engine runs over those values; no datastore
//!    handle is touched while CPU work happens.
//! 3. **Write** — all segments go in as a single idempotent batch.
//!
//! Missing data is never an error here: a chunk without timing anchors or
//! word timings is logged and permanently skipped — the meeting goes on,
//! that speech just stays unattributed. Only datastore failures propagate.
//! Notifications run after the write and are fire-and-forget.

use plenum_alignment::{Normalized, Segment, SpeakerEvent, SpeakerTimeline};
use plenum_broadcast::{CheckpointNotice, Notice, SegmentNotice};
use plenum_db::{AudioChunk, Meeting, NewSegment, SpeakerEventRow};
use plenum_relay::SegmentBody;
use uuid::Uuid;

use crate::{Error, Pipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ChunkMissing,
    MissingAnchor,
    NoWordTimings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOutcome {
    /// The chunk cannot be aligned, now or ever. Logged, not retried.
    Skipped(SkipReason),
    /// Segments were computed; `inserted` counts rows actually written
    /// (a replay reports the full segment count but zero inserts).
    Aligned { segments: usize, inserted: u64 },
}

impl Pipeline {
    /// Align one transcribed chunk and persist the resulting segments.
    pub async fn align_chunk(&self, chunk_id: Uuid) -> Result<AlignOutcome, Error> {
        let Some(snapshot) = self.db.chunk_snapshot(chunk_id).await? else {
            tracing::warn!(chunk_id = %chunk_id, "alignment_skipped_chunk_missing");
            return Ok(AlignOutcome::Skipped(SkipReason::ChunkMissing));
        };
        let chunk = &snapshot.chunk;

        let Some(audio_started_at) = chunk.audio_started_at else {
            tracing::warn!(chunk_id = %chunk_id, seq = chunk.seq, "alignment_skipped_missing_anchor");
            return Ok(AlignOutcome::Skipped(SkipReason::MissingAnchor));
        };
        if chunk.audio_ended_at.is_none() {
            tracing::warn!(chunk_id = %chunk_id, seq = chunk.seq, "alignment_skipped_missing_anchor");
            return Ok(AlignOutcome::Skipped(SkipReason::MissingAnchor));
        }

        let payload = chunk.transcript.as_deref().unwrap_or_default();
        let words = match plenum_alignment::normalize(payload) {
            Normalized::Words(words) => words,
            Normalized::NoWordTimings => {
                tracing::warn!(chunk_id = %chunk_id, seq = chunk.seq, "alignment_skipped_no_word_timings");
                return Ok(AlignOutcome::Skipped(SkipReason::NoWordTimings));
            }
        };

        let timeline = SpeakerTimeline::new(
            snapshot
                .events
                .iter()
                .map(speaker_event_from_row)
                .collect(),
        );
        let segments = plenum_alignment::align(words, audio_started_at, &timeline);
        if segments.is_empty() {
            return Ok(AlignOutcome::Aligned {
                segments: 0,
                inserted: 0,
            });
        }

        let rows: Vec<NewSegment> = segments
            .iter()
            .map(|s| segment_row(&snapshot.meeting, chunk, s))
            .collect();
        let inserted = self.db.insert_segments(&rows).await?;

        tracing::info!(
            chunk_id = %chunk_id,
            seq = chunk.seq,
            segments = segments.len(),
            inserted,
            "segments_persisted"
        );

        self.notify(&snapshot.meeting, chunk, &segments).await;

        Ok(AlignOutcome::Aligned {
            segments: segments.len(),
            inserted,
        })
    }

    /// Best-effort fan-out after persistence. Nothing here may fail the
    /// alignment — every error is logged and swallowed.
    async fn notify(&self, meeting: &Meeting, chunk: &AudioChunk, segments: &[Segment]) {
        for segment in segments {
            self.hub.publish(
                meeting.id,
                Notice::Transcript(SegmentNotice {
                    meeting_id: meeting.id,
                    speaker_name: segment.speaker_name.clone(),
                    text: segment.text.clone(),
                    start_time: segment.start,
                    end_time: segment.end,
                    confidence: segment.confidence,
                }),
            );

            let body = SegmentBody {
                speaker_name: segment.speaker_name.clone(),
                text: segment.text.clone(),
                start_time: segment.start,
                end_time: segment.end,
            };
            if let Err(e) = self.relay.forward_segment(&body).await {
                tracing::warn!(error = %e, meeting_id = %meeting.id, "relay_forward_failed");
            }
        }

        if checkpoint_due(meeting, chunk.seq) {
            tracing::info!(meeting_id = %meeting.id, seq = chunk.seq, "checkpoint_triggered");
            self.hub.publish(
                meeting.id,
                Notice::Checkpoint(CheckpointNotice {
                    meeting_id: meeting.id,
                    seq: chunk.seq,
                }),
            );
            if let Err(e) = self.relay.trigger_checkpoint(meeting.id, chunk.seq).await {
                tracing::warn!(error = %e, meeting_id = %meeting.id, "relay_checkpoint_failed");
            }
        }
    }
}

fn speaker_event_from_row(row: &SpeakerEventRow) -> SpeakerEvent {
    SpeakerEvent {
        member_id: row.member_id.clone(),
        member_name: row.member_name.clone(),
        started_at: row.started_at,
    }
}

fn segment_row(meeting: &Meeting, chunk: &AudioChunk, segment: &Segment) -> NewSegment {
    NewSegment {
        meeting_id: meeting.id,
        source_chunk_id: chunk.id,
        speaker_member_id: segment.speaker_id.clone(),
        speaker_name: segment.speaker_name.clone(),
        text: segment.text.clone(),
        start_time: segment.start,
        end_time: segment.end,
        confidence: segment.confidence,
    }
}

fn checkpoint_due(meeting: &Meeting, seq: i64) -> bool {
    meeting.checkpoint_enabled
        && meeting.checkpoint_frequency > 0
        && seq % meeting.checkpoint_frequency == 0
}
