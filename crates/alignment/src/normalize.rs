use plenum_stt_interface::{Transcription, WordTiming};

use crate::types::Word;

/// Outcome of normalizing a stored transcript payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// Word-level timings were present; alignment can proceed.
    Words(Vec<Word>),
    /// The payload carries no usable word timings — legacy plain text,
    /// malformed JSON, or a provider result without `words`. The chunk
    /// can never be aligned; callers skip it.
    NoWordTimings,
}

/// Parse the transcript payload stored on an audio chunk into canonical words.
///
/// Chunks written before word-granularity transcription store the bare
/// transcript text instead of the provider's JSON, so any unparseable payload
/// is treated as "no word timings" rather than an error. Tokens that are
/// empty after trimming are dropped; offsets are passed through untouched.
pub fn normalize(payload: &str) -> Normalized {
    if payload.trim().is_empty() {
        return Normalized::NoWordTimings;
    }

    let Ok(transcription) = serde_json::from_str::<Transcription>(payload) else {
        return Normalized::NoWordTimings;
    };

    let Some(timings) = transcription.words else {
        return Normalized::NoWordTimings;
    };

    let words: Vec<Word> = timings.into_iter().filter_map(word_from_timing).collect();

    if words.is_empty() {
        Normalized::NoWordTimings
    } else {
        Normalized::Words(words)
    }
}

fn word_from_timing(timing: WordTiming) -> Option<Word> {
    let text = timing.word.trim();
    if text.is_empty() {
        return None;
    }
    Some(Word {
        text: text.to_string(),
        start: timing.start,
        end: timing.end,
    })
}
