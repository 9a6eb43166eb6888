use chrono::{DateTime, Duration, Utc};

use crate::timeline::SpeakerTimeline;
use crate::types::{Word, WordAttribution};

/// Confidence when a speaker event covered the word (directly or via
/// look-ahead).
pub const SPEAKER_MATCH_CONFIDENCE: f64 = 0.95;
/// Confidence when no speaker could be determined.
pub const UNKNOWN_SPEAKER_CONFIDENCE: f64 = 0.30;

/// Pin each word to absolute time and attribute it to a speaker.
///
/// Absolute times are `audio_started_at` plus the word's relative offset,
/// rounded to whole milliseconds. The speaker lookup uses the word's
/// absolute *start*; a word straddling a speaker change belongs to whoever
/// was speaking when it began. Output order matches input order.
pub fn resolve_words<'a>(
    words: Vec<Word>,
    audio_started_at: DateTime<Utc>,
    timeline: &'a SpeakerTimeline,
) -> Vec<WordAttribution<'a>> {
    words
        .into_iter()
        .map(|word| {
            let start = audio_started_at + Duration::milliseconds(to_ms(word.start));
            let end = audio_started_at + Duration::milliseconds(to_ms(word.end));
            let speaker = timeline.active_at(start);
            let confidence = if speaker.is_some() {
                SPEAKER_MATCH_CONFIDENCE
            } else {
                UNKNOWN_SPEAKER_CONFIDENCE
            };
            WordAttribution {
                text: word.text,
                start,
                end,
                speaker,
                confidence,
            }
        })
        .collect()
}

fn to_ms(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}
