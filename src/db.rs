use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{QuizError, Result};
use crate::models::{
    AnsweredQuestion, NewQuestion, NewResult, Question, QuizResult, SessionId, SessionSummary,
};
use crate::store::{QuestionStore, ResultStore};

const QUESTION_COLUMNS: &str = "id, question, answer_correct, answer_incorrect_a, \
     answer_incorrect_b, answer_incorrect_c, difficulty, points, category";

const RESULT_COLUMNS: &str =
    "id, started_at, ended_at, user_answer, points, is_correct, session_id, question_id";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer_correct TEXT NOT NULL,
                answer_incorrect_a TEXT NOT NULL,
                answer_incorrect_b TEXT NOT NULL,
                answer_incorrect_c TEXT NOT NULL,
                difficulty INTEGER NOT NULL CHECK(1 <= difficulty AND difficulty <= 5),
                points INTEGER NOT NULL CHECK(1 <= points AND points <= 100),
                category TEXT NOT NULL CHECK(length(trim(category)) > 0)
            );

            -- One row per answered question; timestamps are epoch milliseconds
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at INTEGER NOT NULL,
                ended_at INTEGER NOT NULL CHECK(ended_at >= started_at),
                user_answer TEXT NOT NULL,
                points INTEGER NOT NULL,
                is_correct INTEGER NOT NULL DEFAULT 0 CHECK(is_correct IN (0, 1)),
                session_id TEXT NOT NULL,
                question_id INTEGER NOT NULL,
                FOREIGN KEY (question_id) REFERENCES questions(id)
            );

            CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
            CREATE INDEX IF NOT EXISTS idx_results_session ON results(session_id);
            CREATE INDEX IF NOT EXISTS idx_results_ended_at ON results(ended_at);
            "#,
        )?;

        Ok(())
    }

    // Question operations
    pub fn add_question(&self, question: &NewQuestion) -> Result<i64> {
        question.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO questions (question, answer_correct, answer_incorrect_a,
                                   answer_incorrect_b, answer_incorrect_c,
                                   difficulty, points, category)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                question.text,
                question.correct_answer,
                question.incorrect_answers[0],
                question.incorrect_answers[1],
                question.incorrect_answers[2],
                question.difficulty,
                question.points,
                question.category.trim(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a whole question bank atomically. Nothing is stored if any
    /// question fails validation.
    pub fn import_questions(&self, questions: &[NewQuestion]) -> Result<usize> {
        for question in questions {
            question.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for question in questions {
            self.add_question(question)?;
        }
        tx.commit()?;

        info!("Imported {} questions", questions.len());
        Ok(questions.len())
    }

    pub fn list_questions(&self, category: Option<&str>) -> Result<Vec<Question>> {
        let questions = if let Some(category) = category {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM questions WHERE category = ?1 ORDER BY id",
                QUESTION_COLUMNS
            ))?;
            let rows = stmt.query_map(params![category], question_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM questions ORDER BY category, id",
                QUESTION_COLUMNS
            ))?;
            let rows = stmt.query_map([], question_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok(questions)
    }

    // Result operations beyond the ResultStore contract
    pub fn session_answers(&self, session_id: &SessionId) -> Result<Vec<AnsweredQuestion>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.id, r.started_at, r.ended_at, r.user_answer, r.points, r.is_correct,
                   r.session_id, r.question_id, q.question, q.answer_correct
            FROM results r
            JOIN questions q ON q.id = r.question_id
            WHERE r.session_id = ?1
            ORDER BY r.id
            "#,
        )?;

        let rows = stmt.query_map(params![session_id.as_str()], |row| {
            Ok(AnsweredQuestion {
                result: result_from_row(row)?,
                question_text: row.get(8)?,
                correct_answer: row.get(9)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Sessions newest first, where newest means the latest answer.
    pub fn list_session_summaries(&self, limit: Option<usize>) -> Result<Vec<SessionSummary>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.session_id,
                   (SELECT q.category
                    FROM results r2
                    JOIN questions q ON q.id = r2.question_id
                    WHERE r2.session_id = r.session_id
                    ORDER BY r2.id
                    LIMIT 1) AS category,
                   MIN(r.started_at), MAX(r.ended_at),
                   COUNT(*), SUM(r.is_correct),
                   SUM(r.points * r.is_correct), SUM(r.points)
            FROM results r
            GROUP BY r.session_id
            ORDER BY MAX(r.ended_at) DESC, MAX(r.id) DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            let category: Option<String> = row.get(1)?;
            Ok(SessionSummary {
                session_id: SessionId::from(row.get::<_, String>(0)?),
                category: category.unwrap_or_default(),
                started_at: timestamp_from_sql(2, row.get(2)?)?,
                ended_at: timestamp_from_sql(3, row.get(3)?)?,
                answered: row.get(4)?,
                correct: row.get(5)?,
                score: row.get(6)?,
                available: row.get(7)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let total_questions: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;

        let total_categories: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT category) FROM questions",
            [],
            |row| row.get(0),
        )?;

        let (total_sessions, total_answers, correct_answers, points_earned, points_available) =
            self.conn.query_row(
                r#"
                SELECT COUNT(DISTINCT session_id), COUNT(*),
                       COALESCE(SUM(is_correct), 0),
                       COALESCE(SUM(points * is_correct), 0),
                       COALESCE(SUM(points), 0)
                FROM results
                "#,
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )?;

        Ok(Stats {
            total_questions,
            total_categories,
            total_sessions,
            total_answers,
            correct_answers,
            points_earned,
            points_available,
        })
    }
}

impl QuestionStore for Database {
    fn list_categories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM questions ORDER BY category")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let categories = rows.collect::<rusqlite::Result<Vec<String>>>()?;

        if categories.is_empty() {
            return Err(QuizError::NotFound("question categories".into()));
        }
        Ok(categories)
    }

    fn questions_by_category(&self, category: &str) -> Result<Vec<Question>> {
        let questions = self.list_questions(Some(category))?;
        if questions.is_empty() {
            return Err(QuizError::NotFound(format!(
                "questions with category '{}'",
                category
            )));
        }
        Ok(questions)
    }

    fn question_by_id(&self, id: i64) -> Result<Question> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
                params![id],
                question_from_row,
            )
            .optional()?
            .ok_or_else(|| QuizError::NotFound(format!("question with id {}", id)))
    }
}

impl ResultStore for Database {
    fn append(&self, result: &NewResult) -> Result<i64> {
        result.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO results (started_at, ended_at, user_answer, points,
                                 is_correct, session_id, question_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                result.started_at.timestamp_millis(),
                result.ended_at.timestamp_millis(),
                result.user_answer,
                result.points,
                flag_to_sql(result.is_correct),
                result.session_id.as_str(),
                result.question_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn results_by_session(&self, session_id: &SessionId) -> Result<Vec<QuizResult>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM results WHERE session_id = ?1 ORDER BY id",
            RESULT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![session_id.as_str()], result_from_row)?;
        let results = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        if results.is_empty() {
            return Err(QuizError::NotFound(format!(
                "results for session id {}",
                session_id
            )));
        }
        Ok(results)
    }

    fn most_recent_session_id(&self) -> Result<SessionId> {
        self.conn
            .query_row(
                "SELECT session_id FROM results ORDER BY ended_at DESC, id DESC LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(SessionId::from)
            .ok_or(QuizError::NoResults)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Stats {
    pub total_questions: i64,
    pub total_categories: i64,
    pub total_sessions: i64,
    pub total_answers: i64,
    pub correct_answers: i64,
    pub points_earned: i64,
    pub points_available: i64,
}

impl Stats {
    pub fn accuracy(&self) -> f64 {
        if self.total_answers == 0 {
            0.0
        } else {
            (self.correct_answers as f64 / self.total_answers as f64) * 100.0
        }
    }
}

fn question_from_row(row: &Row) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        text: row.get(1)?,
        correct_answer: row.get(2)?,
        incorrect_answers: [row.get(3)?, row.get(4)?, row.get(5)?],
        difficulty: row.get(6)?,
        points: row.get(7)?,
        category: row.get(8)?,
    })
}

fn result_from_row(row: &Row) -> rusqlite::Result<QuizResult> {
    Ok(QuizResult {
        id: row.get(0)?,
        started_at: timestamp_from_sql(1, row.get(1)?)?,
        ended_at: timestamp_from_sql(2, row.get(2)?)?,
        user_answer: row.get(3)?,
        points: row.get(4)?,
        is_correct: flag_from_sql(5, row.get(5)?)?,
        session_id: SessionId::from(row.get::<_, String>(6)?),
        question_id: row.get(7)?,
    })
}

// The correctness flag is a real bool everywhere except this table
fn flag_to_sql(flag: bool) -> i64 {
    i64::from(flag)
}

fn flag_from_sql(column: usize, value: i64) -> rusqlite::Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(rusqlite::Error::IntegralValueOutOfRange(column, other)),
    }
}

fn timestamp_from_sql(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}
