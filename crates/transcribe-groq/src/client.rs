use std::time::Duration;

use bytes::Bytes;
use plenum_stt_interface::Transcription;

use crate::error::Error;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "whisper-large-v3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Batch client for the provider's OpenAI-compatible `/audio/transcriptions`
/// endpoint. Always requests `verbose_json` with word-level timestamp
/// granularity — the alignment pipeline is useless without word timings.
pub struct GroqClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Default)]
pub struct GroqClientBuilder {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

impl GroqClientBuilder {
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn build(self) -> Result<GroqClient, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GroqClient {
            http,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

impl GroqClient {
    pub fn builder() -> GroqClientBuilder {
        GroqClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Transcribe one audio blob. `file_name`'s extension tells the upstream
    /// the container format (`chunk.webm`, `chunk.wav`, …).
    pub async fn transcribe(
        &self,
        audio: Bytes,
        file_name: &str,
    ) -> Result<Transcription, Error> {
        let url = format!(
            "{}/audio/transcriptions",
            self.api_base.trim_end_matches('/')
        );

        tracing::debug!(
            model = %self.model,
            file_name,
            body_size_bytes = audio.len(),
            "groq_transcription_request"
        );

        let file = reqwest::multipart::Part::stream(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("temperature", "0");

        let mut request = self.http.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus { status, body });
        }

        Ok(response.json::<Transcription>().await?)
    }
}
