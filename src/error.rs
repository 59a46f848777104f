use thiserror::Error;

/// Errors raised at the storage, file and browser boundaries.
///
/// The parsing and analysis engine never produces one of these: unparseable
/// problems are skipped and missing data is reported as "no trouble spot".
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {url}: {source}")]
    Browser {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TrainerError>;
