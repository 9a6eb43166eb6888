use chrono::{DateTime, Utc};

/// One transcribed word. Offsets are seconds relative to the start of the
/// chunk's audio, exactly as the provider reported them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// "This participant became the active speaker at this instant."
///
/// Events carry no end time; a speaker stays active until the next event.
/// `member_id` is the platform identity and may be absent — the platform
/// sometimes reports a speaker change without knowing who.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpeakerEvent {
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub started_at: DateTime<Utc>,
}

// ── Intermediate attribution ─────────────────────────────────────────────────

/// One word pinned to absolute time and attributed to a speaker.
///
/// Transient — produced by [`crate::resolve::resolve_words`], consumed by
/// [`crate::segment::group_attributions`], never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct WordAttribution<'a> {
    pub text: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub speaker: Option<&'a SpeakerEvent>,
    pub confidence: f64,
}

/// A maximal run of consecutive words with the same speaker identity.
///
/// `confidence` is the confidence of the attribution that opened the run;
/// `word_count` is diagnostic only and is not persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub speaker_id: Option<String>,
    pub speaker_name: String,
    pub text: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub confidence: f64,
    pub word_count: usize,
}
