#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Libsql(#[from] libsql::Error),
    #[error(transparent)]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error(transparent)]
    InvalidUuid(#[from] uuid::Error),
    #[error("unknown chunk status: {0}")]
    UnknownChunkStatus(String),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl Error {
    /// True when the write hit a unique constraint. Matches the primary
    /// constraint code (19) and the extended codes for unique indexes (2067)
    /// and primary keys (1555); the message check covers builds that report
    /// only a generic failure code.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Libsql(libsql::Error::SqliteFailure(code, message)) => {
                matches!(*code, 19 | 1555 | 2067) || message.contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}
