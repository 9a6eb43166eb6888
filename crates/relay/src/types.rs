use chrono::{DateTime, Utc};

/// One finalized segment, ready to be forwarded downstream.
#[derive(Debug, Clone)]
pub struct SegmentBody {
    pub speaker_name: String,
    pub text: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl SegmentBody {
    /// The downstream automation wants a single human-readable line.
    pub(crate) fn transcription_line(&self) -> String {
        format!("{}: {}", self.speaker_name, self.text)
    }
}
