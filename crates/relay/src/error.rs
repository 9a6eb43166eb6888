#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("relay endpoint returned {status}")]
    Status { status: reqwest::StatusCode },
}
