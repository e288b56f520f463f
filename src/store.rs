use crate::error::Result;
use crate::models::{NewResult, Question, QuizResult, SessionId};

/// Read access to the question bank.
pub trait QuestionStore {
    /// Distinct category labels, sorted.
    ///
    /// Fails with `QuizError::NotFound` when the bank is empty.
    fn list_categories(&self) -> Result<Vec<String>>;

    /// Every question in `category`. Never returns an empty list.
    fn questions_by_category(&self, category: &str) -> Result<Vec<Question>>;

    fn question_by_id(&self, id: i64) -> Result<Question>;
}

/// Append-only storage for answered questions.
pub trait ResultStore {
    /// Persist one result and return its row id.
    fn append(&self, result: &NewResult) -> Result<i64>;

    /// Every result recorded under `session_id`. Never returns an empty list.
    fn results_by_session(&self, session_id: &SessionId) -> Result<Vec<QuizResult>>;

    /// Session of the result with the latest end timestamp.
    ///
    /// Fails with `QuizError::NoResults` when nothing has been recorded.
    fn most_recent_session_id(&self) -> Result<SessionId>;
}
