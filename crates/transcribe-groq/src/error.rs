#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("transcription upstream returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl Error {
    /// Transport failures, throttling and server-side statuses are worth
    /// another attempt; any other status means the request itself is wrong.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::UpstreamStatus { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}
