use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::models::SessionId;
use crate::scoring;
use crate::store::{QuestionStore, ResultStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub category: String,
    pub score: i64,
    pub available: i64,
    pub percentage: f64,
    pub elapsed_minutes: f64,
    pub answered: usize,
    pub correct: usize,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "For the most recent quiz session:")?;
        writeln!(f, "The quiz category was {}.", self.category)?;
        writeln!(
            f,
            "The total time to take the quiz was {:.2} minutes.",
            self.elapsed_minutes
        )?;
        writeln!(
            f,
            "{} of {} questions were answered correctly.",
            self.correct, self.answered
        )?;
        writeln!(
            f,
            "{} points were earned, out of a total of {}.",
            self.score, self.available
        )?;
        write!(f, "The user got a score of {:.2}%", self.percentage)
    }
}

/// Summarise the most recently finished session.
///
/// The category is taken from the question behind the session's first
/// result. A run only ever draws from one category, so this stands for the
/// whole session.
pub fn build_report(
    questions: &impl QuestionStore,
    results: &impl ResultStore,
) -> Result<SessionReport> {
    let session_id = results.most_recent_session_id()?;
    let session_results = results.results_by_session(&session_id)?;

    // results_by_session never returns an empty list
    let category = questions
        .question_by_id(session_results[0].question_id)?
        .category;

    let score = scoring::total_score(&session_results);
    let available = scoring::total_available(&session_results);
    let percentage = scoring::percentage(score, available)?;
    let elapsed_minutes = scoring::to_minutes(scoring::total_elapsed_seconds(&session_results));

    Ok(SessionReport {
        session_id,
        category,
        score,
        available,
        percentage,
        elapsed_minutes,
        answered: session_results.len(),
        correct: session_results.iter().filter(|r| r.is_correct).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::QuizError;
    use crate::models::{NewQuestion, NewResult};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    fn add_question(db: &Database, category: &str, text: &str, points: i64) -> i64 {
        db.add_question(&NewQuestion {
            text: text.to_string(),
            correct_answer: "right".to_string(),
            incorrect_answers: ["a".to_string(), "b".to_string(), "c".to_string()],
            difficulty: 1,
            points,
            category: category.to_string(),
        })
        .unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 18, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn record(db: &Database, session: &str, question_id: i64, points: i64, span: (i64, i64), correct: bool) {
        db.append(&NewResult {
            started_at: at(span.0),
            ended_at: at(span.1),
            user_answer: if correct { "right" } else { "a" }.to_string(),
            points,
            is_correct: correct,
            session_id: SessionId::from(session),
            question_id,
        })
        .unwrap();
    }

    #[test]
    fn empty_store_has_no_results() {
        let db = setup_db();
        assert!(matches!(build_report(&db, &db), Err(QuizError::NoResults)));
    }

    #[test]
    fn report_aggregates_latest_session() {
        let db = setup_db();
        let q1 = add_question(&db, "Space", "Q1", 10);
        let q2 = add_question(&db, "Space", "Q2", 30);
        let old = add_question(&db, "Music", "Q3", 50);

        record(&db, "older", old, 50, (0, 20), true);
        record(&db, "latest", q1, 10, (100, 160), true);
        record(&db, "latest", q2, 30, (160, 190), false);

        let report = build_report(&db, &db).unwrap();
        assert_eq!(report.session_id, SessionId::from("latest"));
        assert_eq!(report.category, "Space");
        assert_eq!(report.score, 10);
        assert_eq!(report.available, 40);
        assert_eq!(report.percentage, 25.0);
        assert_eq!(report.elapsed_minutes, 1.5);
        assert_eq!(report.answered, 2);
        assert_eq!(report.correct, 1);
    }

    #[test]
    fn latest_means_latest_end_timestamp() {
        let db = setup_db();
        let q1 = add_question(&db, "Space", "Q1", 10);
        let q2 = add_question(&db, "Music", "Q2", 10);

        record(&db, "zzzz", q1, 10, (0, 10), true);
        record(&db, "aaaa", q2, 10, (50, 60), false);

        let report = build_report(&db, &db).unwrap();
        assert_eq!(report.category, "Music");
        assert_eq!(report.percentage, 0.0);
    }

    #[test]
    fn perfect_session() {
        let db = setup_db();
        let q1 = add_question(&db, "Space", "Q1", 100);
        record(&db, "s", q1, 100, (0, 120), true);

        let report = build_report(&db, &db).unwrap();
        assert_eq!(report.percentage, 100.0);
        assert_eq!(report.elapsed_minutes, 2.0);
    }

    #[test]
    fn display_formats_two_decimals() {
        let report = SessionReport {
            session_id: SessionId::from("s"),
            category: "Space".to_string(),
            score: 1,
            available: 3,
            percentage: 100.0 / 3.0,
            elapsed_minutes: 1.0 / 3.0,
            answered: 3,
            correct: 1,
        };
        let text = report.to_string();
        assert!(text.contains("The quiz category was Space."));
        assert!(text.contains("0.33 minutes"));
        assert!(text.contains("1 points were earned, out of a total of 3."));
        assert!(text.contains("33.33%"));
    }
}
