use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QuizError, Result};

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;
pub const MIN_POINTS: i64 = 1;
pub const MAX_POINTS: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: [String; 3],
    pub difficulty: i64,
    pub points: i64,
    pub category: String,
}

impl Question {
    // Stored order: correct answer first
    pub fn all_answers(&self) -> [String; 4] {
        [
            self.correct_answer.clone(),
            self.incorrect_answers[0].clone(),
            self.incorrect_answers[1].clone(),
            self.incorrect_answers[2].clone(),
        ]
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ID. {} Difficulty: {}, Points: {}, Category: {}",
            self.id, self.difficulty, self.points, self.category
        )?;
        write!(
            f,
            "Q: {}, A: {}; {}; {}; {}",
            self.text,
            self.correct_answer,
            self.incorrect_answers[0],
            self.incorrect_answers[1],
            self.incorrect_answers[2]
        )
    }
}

/// A question that has not been stored yet. This is also the shape of an
/// entry in an imported question bank file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: [String; 3],
    pub difficulty: i64,
    pub points: i64,
    pub category: String,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(QuizError::Validation("question text: must not be empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(QuizError::Validation("category: must not be empty".into()));
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(QuizError::Validation(format!(
                "difficulty {}: must be between {} and {}",
                self.difficulty, MIN_DIFFICULTY, MAX_DIFFICULTY
            )));
        }
        if !(MIN_POINTS..=MAX_POINTS).contains(&self.points) {
            return Err(QuizError::Validation(format!(
                "points {}: must be between {} and {}",
                self.points, MIN_POINTS, MAX_POINTS
            )));
        }

        let mut seen = HashSet::new();
        let answers = std::iter::once(&self.correct_answer).chain(self.incorrect_answers.iter());
        for answer in answers {
            if answer.is_empty() {
                return Err(QuizError::Validation("answer: must not be empty".into()));
            }
            if !seen.insert(answer.as_str()) {
                return Err(QuizError::Validation(format!(
                    "answer '{}': answers must be distinct",
                    answer
                )));
            }
        }

        Ok(())
    }
}

/// Identifier grouping every result produced by one quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// One answered question within one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub user_answer: String,
    /// Points at stake for the question, whether or not it was answered correctly.
    pub points: i64,
    pub is_correct: bool,
    pub session_id: SessionId,
    pub question_id: i64,
}

impl QuizResult {
    pub fn points_earned(&self) -> i64 {
        if self.is_correct {
            self.points
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub user_answer: String,
    pub points: i64,
    pub is_correct: bool,
    pub session_id: SessionId,
    pub question_id: i64,
}

impl NewResult {
    pub fn validate(&self) -> Result<()> {
        if self.ended_at < self.started_at {
            return Err(QuizError::Validation(
                "result timestamps: end is before start".into(),
            ));
        }
        if !(MIN_POINTS..=MAX_POINTS).contains(&self.points) {
            return Err(QuizError::Validation(format!(
                "result points {}: must be between {} and {}",
                self.points, MIN_POINTS, MAX_POINTS
            )));
        }
        Ok(())
    }
}

// Aggregate row for one stored session, used by history views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub answered: i64,
    pub correct: i64,
    pub score: i64,
    pub available: i64,
}

impl SessionSummary {
    pub fn percentage(&self) -> f64 {
        if self.available == 0 {
            0.0
        } else {
            (self.score as f64 / self.available as f64) * 100.0
        }
    }
}

// A stored result joined with the question it answered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub result: QuizResult,
    pub question_text: String,
    pub correct_answer: String,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
