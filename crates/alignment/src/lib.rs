//! Speaker-to-transcript alignment.
//!
//! Takes one transcribed audio chunk (words with offsets relative to the
//! chunk's capture start) plus the meeting's speaker-change history, and
//! produces speaker-attributed transcript segments. Everything here is pure:
//! plain values in, plain values out, no I/O, no clocks, no shared state —
//! the same inputs always yield the same segments, so callers are free to run
//! chunks in parallel.
//!
//! The pipeline has four stages, each its own module:
//!
//! 1. [`normalize`] — stored provider payload → canonical [`Word`] list, or a
//!    typed "no word timings" outcome for legacy/malformed payloads.
//! 2. [`timeline`] — speaker-change events → [`SpeakerTimeline`] point lookup.
//! 3. [`resolve`] — per-word speaker attribution at the word's absolute start.
//! 4. [`segment`] — consecutive same-speaker words folded into segments.

pub mod normalize;
pub mod resolve;
pub mod segment;
pub mod timeline;
pub mod types;

pub use normalize::{Normalized, normalize};
pub use resolve::{SPEAKER_MATCH_CONFIDENCE, UNKNOWN_SPEAKER_CONFIDENCE, resolve_words};
pub use segment::{UNKNOWN_SPEAKER_NAME, group_attributions};
pub use timeline::{LOOKAHEAD_WINDOW_MS, SpeakerTimeline};
pub use types::{Segment, SpeakerEvent, Word, WordAttribution};

use chrono::{DateTime, Utc};

/// Attribute `words` against `timeline` and fold the result into segments.
///
/// `audio_started_at` is the wall-clock instant the chunk's audio began;
/// word offsets are relative to it.
pub fn align(
    words: Vec<Word>,
    audio_started_at: DateTime<Utc>,
    timeline: &SpeakerTimeline,
) -> Vec<Segment> {
    group_attributions(resolve_words(words, audio_started_at, timeline))
}
