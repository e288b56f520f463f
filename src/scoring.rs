//! Aggregates over the results of one session.

use crate::error::{QuizError, Result};
use crate::models::QuizResult;

/// Sum of points for correctly answered questions.
pub fn total_score(results: &[QuizResult]) -> i64 {
    results.iter().map(QuizResult::points_earned).sum()
}

/// Sum of points at stake, the best score the session allowed.
pub fn total_available(results: &[QuizResult]) -> i64 {
    results.iter().map(|r| r.points).sum()
}

pub fn percentage(score: i64, available: i64) -> Result<f64> {
    if available == 0 {
        return Err(QuizError::Division);
    }
    Ok((score as f64 / available as f64) * 100.0)
}

/// Seconds spent on one question. Not clamped: a negative value means the
/// stored timestamps are wrong.
pub fn elapsed_seconds(result: &QuizResult) -> f64 {
    let elapsed = result.ended_at - result.started_at;
    elapsed.num_milliseconds() as f64 / 1000.0
}

pub fn total_elapsed_seconds(results: &[QuizResult]) -> f64 {
    results.iter().map(elapsed_seconds).sum()
}

pub fn to_minutes(seconds: f64) -> f64 {
    seconds / 60.0
}
