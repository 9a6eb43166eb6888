/// Batch transcription result in the provider's `verbose_json` shape.
///
/// This is the payload stored verbatim on the audio-chunk row, so both the
/// provider client and the alignment normalizer deserialize the same type.
/// Unknown provider fields (task, segments, usage metadata) are ignored.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Word-level timings. Only present when the request asked for
    /// `timestamp_granularities[]=word`; older stored payloads lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

/// One word with offsets in seconds relative to the start of the audio.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl Transcription {
    pub fn has_word_timings(&self) -> bool {
        self.words.as_ref().is_some_and(|ws| !ws.is_empty())
    }
}
