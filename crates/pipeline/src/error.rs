#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] plenum_db::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("transcription queue is closed")]
    QueueClosed,
}
