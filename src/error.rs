use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid {0}")]
    Validation(String),

    #[error("cannot compute a percentage with zero available points")]
    Division,

    #[error("no quiz results have been recorded yet")]
    NoResults,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    // Losing the terminal is the only thing the menu cannot recover from
    pub fn is_fatal(&self) -> bool {
        matches!(self, QuizError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
