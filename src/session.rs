//! Runs one quiz session: picks the working set, asks each question with its
//! answers in random order, grades the selection and records one result per
//! answer.

use chrono::Utc;
use log::{debug, info};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{QuizError, Result};
use crate::models::{NewResult, Question, SessionId};
use crate::presenter::Presenter;
use crate::store::ResultStore;

const ANSWER_PROMPT: &str = "Type the number of your chosen answer: ";

pub struct SessionRunner<'a, P, S, R = ThreadRng> {
    presenter: &'a mut P,
    results: &'a S,
    rng: R,
}

impl<'a, P: Presenter, S: ResultStore> SessionRunner<'a, P, S, ThreadRng> {
    pub fn new(presenter: &'a mut P, results: &'a S) -> Self {
        Self::with_rng(presenter, results, rand::thread_rng())
    }
}

impl<'a, P: Presenter, S: ResultStore, R: Rng> SessionRunner<'a, P, S, R> {
    pub fn with_rng(presenter: &'a mut P, results: &'a S, rng: R) -> Self {
        Self {
            presenter,
            results,
            rng,
        }
    }

    /// Ask up to `desired_count` of `questions` and return the id every
    /// recorded result was stored under.
    ///
    /// Results are written one at a time as questions are answered. If the
    /// presenter or the store fails, the run stops and the answers recorded
    /// so far stay stored.
    pub fn run(&mut self, questions: &[Question], desired_count: usize) -> Result<SessionId> {
        if questions.is_empty() {
            return Err(QuizError::Validation(
                "question set: a session needs at least one question".into(),
            ));
        }

        let session_id = SessionId::generate();
        let working_set = prepare(questions, desired_count, &mut self.rng);
        info!(
            "Starting session {} with {} of {} questions",
            session_id,
            working_set.len(),
            questions.len()
        );

        let total = working_set.len();
        for (i, question) in working_set.into_iter().enumerate() {
            self.ask(&session_id, question, i + 1, total)?;
        }

        info!("Finished session {}", session_id);
        Ok(session_id)
    }

    fn ask(
        &mut self,
        session_id: &SessionId,
        question: &Question,
        number: usize,
        total: usize,
    ) -> Result<()> {
        let started_at = Utc::now();
        let correct_answer = question.correct_answer.as_str();
        let options = shuffled_options(question, &mut self.rng);

        self.presenter.render(&format!(
            "Question {} of {} ({} points): {}\n",
            number, total, question.points, question.text
        ))?;
        let index = self.presenter.choose_from_list(ANSWER_PROMPT, &options)?;
        let selected = options.get(index).ok_or_else(|| {
            QuizError::Validation(format!("answer choice {}: out of range", index + 1))
        })?;

        let is_correct = grade(correct_answer, selected);
        self.presenter
            .render(&feedback(correct_answer, selected, is_correct))?;
        let ended_at = Utc::now();

        self.results.append(&NewResult {
            started_at,
            ended_at,
            user_answer: selected.clone(),
            points: question.points,
            is_correct,
            session_id: session_id.clone(),
            question_id: question.id,
        })?;

        debug!(
            "Session {} question {}: correct={} in {}ms",
            session_id,
            question.id,
            is_correct,
            (ended_at - started_at).num_milliseconds()
        );
        Ok(())
    }
}

/// Shuffle the questions and keep at most `desired_count` of them.
pub fn prepare<'q, R: Rng + ?Sized>(
    questions: &'q [Question],
    desired_count: usize,
    rng: &mut R,
) -> Vec<&'q Question> {
    let mut working_set: Vec<&Question> = questions.iter().collect();
    working_set.shuffle(rng);
    working_set.truncate(desired_count);
    working_set
}

/// The question's four answers in display order.
pub fn shuffled_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut options = question.all_answers().to_vec();
    options.shuffle(rng);
    options
}

// Exact, case-sensitive comparison
pub fn grade(correct_answer: &str, selected: &str) -> bool {
    correct_answer == selected
}

fn feedback(correct_answer: &str, selected: &str, is_correct: bool) -> String {
    if is_correct {
        format!("You selected {}.\nThat's correct!\n", selected)
    } else {
        format!(
            "You selected {}.\nThat is incorrect, sorry!\nThe correct answer is {}.\n",
            selected, correct_answer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{NewQuestion, QuizResult};
    use crate::presenter::testing::ScriptedPresenter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::collections::HashSet;

    fn question(id: i64, text: &str) -> Question {
        Question {
            id,
            text: text.to_string(),
            correct_answer: format!("{} right", text),
            incorrect_answers: [
                format!("{} wrong a", text),
                format!("{} wrong b", text),
                format!("{} wrong c", text),
            ],
            difficulty: 2,
            points: 10 * id,
            category: "Trivia".to_string(),
        }
    }

    fn questions(n: i64) -> Vec<Question> {
        (1..=n).map(|id| question(id, &format!("Q{}", id))).collect()
    }

    fn setup_db_with(n: usize) -> (Database, Vec<Question>) {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        for i in 1..=n {
            db.add_question(&NewQuestion {
                text: format!("Q{}", i),
                correct_answer: format!("Q{} right", i),
                incorrect_answers: [
                    format!("Q{} wrong a", i),
                    format!("Q{} wrong b", i),
                    format!("Q{} wrong c", i),
                ],
                difficulty: 1,
                points: 5 * i as i64,
                category: "Trivia".to_string(),
            })
            .unwrap();
        }
        let questions = db.list_questions(Some("Trivia")).unwrap();
        (db, questions)
    }

    // Answers every question by picking the option accepted by `pick`
    struct PickingPresenter<F> {
        pick: F,
        rendered: Vec<String>,
    }

    impl<F: FnMut(&[String]) -> usize> Presenter for PickingPresenter<F> {
        fn choose_from_list(&mut self, _prompt: &str, options: &[String]) -> Result<usize> {
            Ok((self.pick)(options))
        }

        fn read_count(&mut self, _prompt: &str) -> Result<usize> {
            Ok(0)
        }

        fn render(&mut self, text: &str) -> Result<()> {
            self.rendered.push(text.to_string());
            Ok(())
        }
    }

    fn always_right() -> PickingPresenter<impl FnMut(&[String]) -> usize> {
        PickingPresenter {
            pick: |options: &[String]| {
                options
                    .iter()
                    .position(|o| o.ends_with(" right"))
                    .unwrap()
            },
            rendered: Vec::new(),
        }
    }

    fn always_wrong() -> PickingPresenter<impl FnMut(&[String]) -> usize> {
        PickingPresenter {
            pick: |options: &[String]| {
                options
                    .iter()
                    .position(|o| !o.ends_with(" right"))
                    .unwrap()
            },
            rendered: Vec::new(),
        }
    }

    // Delegates to a real store but fails the Nth append
    struct FailingStore<'a> {
        inner: &'a Database,
        fail_on: usize,
        calls: Cell<usize>,
    }

    impl ResultStore for FailingStore<'_> {
        fn append(&self, result: &NewResult) -> Result<i64> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call == self.fail_on {
                return Err(QuizError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk unavailable",
                )));
            }
            self.inner.append(result)
        }

        fn results_by_session(&self, session_id: &SessionId) -> Result<Vec<QuizResult>> {
            self.inner.results_by_session(session_id)
        }

        fn most_recent_session_id(&self) -> Result<SessionId> {
            self.inner.most_recent_session_id()
        }
    }

    mod grade_tests {
        use super::*;

        #[test]
        fn exact_match_is_correct() {
            assert!(grade("Paris", "Paris"));
        }

        #[test]
        fn case_differences_are_wrong() {
            assert!(!grade("Paris", "paris"));
        }

        #[test]
        fn other_answer_is_wrong() {
            assert!(!grade("Correct Answer", "Incorrect B"));
        }

        #[test]
        fn empty_and_emoji_answers_are_wrong() {
            assert!(!grade("Correct Answer", ""));
            assert!(!grade("Correct Answer", "👻👻👻👻👻"));
        }

        #[test]
        fn surrounding_whitespace_matters() {
            assert!(!grade("Paris", "Paris "));
        }
    }

    mod prepare_tests {
        use super::*;

        #[test]
        fn count_above_available_is_clamped() {
            let qs = questions(5);
            let mut rng = StdRng::seed_from_u64(1);
            assert_eq!(prepare(&qs, 10, &mut rng).len(), 5);
        }

        #[test]
        fn count_below_available_trims() {
            let qs = questions(5);
            let mut rng = StdRng::seed_from_u64(2);
            assert_eq!(prepare(&qs, 3, &mut rng).len(), 3);
        }

        #[test]
        fn zero_count_is_empty() {
            let qs = questions(5);
            let mut rng = StdRng::seed_from_u64(3);
            assert!(prepare(&qs, 0, &mut rng).is_empty());
        }

        #[test]
        fn working_set_has_no_duplicates() {
            let qs = questions(8);
            let mut rng = StdRng::seed_from_u64(4);
            let picked = prepare(&qs, 8, &mut rng);
            let ids: HashSet<i64> = picked.iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), 8);
        }

        #[test]
        fn every_question_can_lead_the_working_set() {
            let qs = questions(4);
            let mut rng = StdRng::seed_from_u64(5);
            let mut leaders = HashSet::new();
            for _ in 0..200 {
                leaders.insert(prepare(&qs, 1, &mut rng)[0].id);
            }
            assert_eq!(leaders.len(), 4);
        }
    }

    mod shuffle_tests {
        use super::*;

        #[test]
        fn options_are_a_permutation_of_the_answers() {
            let q = question(1, "Q1");
            let mut rng = StdRng::seed_from_u64(6);
            let mut options = shuffled_options(&q, &mut rng);
            let mut expected = q.all_answers().to_vec();
            options.sort();
            expected.sort();
            assert_eq!(options, expected);
        }

        #[test]
        fn correct_answer_position_is_roughly_uniform() {
            let q = question(1, "Q1");
            let mut rng = StdRng::seed_from_u64(7);
            let trials = 8000;
            let mut slots = [0usize; 4];

            for _ in 0..trials {
                let options = shuffled_options(&q, &mut rng);
                let slot = options.iter().position(|o| *o == q.correct_answer).unwrap();
                slots[slot] += 1;
            }

            // Expect 2000 per slot; allow a generous band
            for count in slots {
                assert!((1700..=2300).contains(&count), "slot counts: {:?}", slots);
            }
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn empty_question_set_is_rejected() {
            let (db, _) = setup_db_with(0);
            let mut presenter = ScriptedPresenter::default();
            let result = SessionRunner::new(&mut presenter, &db).run(&[], 3);
            assert!(matches!(result, Err(QuizError::Validation(_))));
        }

        #[test]
        fn request_above_available_records_each_question_once() {
            let (db, qs) = setup_db_with(3);
            let mut presenter = ScriptedPresenter::with_choices([0, 1, 2]);

            let session_id = SessionRunner::with_rng(&mut presenter, &db, StdRng::seed_from_u64(8))
                .run(&qs, 5)
                .unwrap();

            let results = db.results_by_session(&session_id).unwrap();
            assert_eq!(results.len(), 3);
            let ids: HashSet<i64> = results.iter().map(|r| r.question_id).collect();
            assert_eq!(ids.len(), 3);
        }

        #[test]
        fn request_below_available_records_a_subset() {
            let (db, qs) = setup_db_with(5);
            let mut presenter = ScriptedPresenter::with_choices([3, 3]);

            let session_id = SessionRunner::with_rng(&mut presenter, &db, StdRng::seed_from_u64(9))
                .run(&qs, 2)
                .unwrap();

            let results = db.results_by_session(&session_id).unwrap();
            assert_eq!(results.len(), 2);

            let all_ids: HashSet<i64> = qs.iter().map(|q| q.id).collect();
            let picked: HashSet<i64> = results.iter().map(|r| r.question_id).collect();
            assert_eq!(picked.len(), 2);
            assert!(picked.is_subset(&all_ids));
        }

        #[test]
        fn correct_answers_are_graded_and_stored() {
            let (db, qs) = setup_db_with(4);
            let mut presenter = always_right();

            let session_id = SessionRunner::new(&mut presenter, &db).run(&qs, 4).unwrap();

            let results = db.results_by_session(&session_id).unwrap();
            assert!(results.iter().all(|r| r.is_correct));
            for result in &results {
                let q = qs.iter().find(|q| q.id == result.question_id).unwrap();
                assert_eq!(result.user_answer, q.correct_answer);
                assert_eq!(result.points, q.points);
            }
            assert!(presenter.rendered.iter().any(|t| t.contains("That's correct!")));
        }

        #[test]
        fn wrong_answers_still_store_full_points() {
            let (db, qs) = setup_db_with(3);
            let mut presenter = always_wrong();

            let session_id = SessionRunner::new(&mut presenter, &db).run(&qs, 3).unwrap();

            let results = db.results_by_session(&session_id).unwrap();
            assert_eq!(results.len(), 3);
            for result in &results {
                let q = qs.iter().find(|q| q.id == result.question_id).unwrap();
                assert!(!result.is_correct);
                assert_eq!(result.points, q.points);
                assert_ne!(result.user_answer, q.correct_answer);
            }
            assert!(presenter
                .rendered
                .iter()
                .any(|t| t.contains("The correct answer is")));
        }

        #[test]
        fn timestamps_are_ordered() {
            let (db, qs) = setup_db_with(3);
            let mut presenter = ScriptedPresenter::with_choices([0, 0, 0]);

            let session_id = SessionRunner::new(&mut presenter, &db).run(&qs, 3).unwrap();

            let results = db.results_by_session(&session_id).unwrap();
            for pair in results.windows(2) {
                assert!(pair[0].ended_at <= pair[1].started_at);
            }
            assert!(results.iter().all(|r| r.ended_at >= r.started_at));
        }

        #[test]
        fn presenter_sees_four_options_per_question() {
            let (db, qs) = setup_db_with(2);
            let mut presenter = ScriptedPresenter::with_choices([1, 2]);

            SessionRunner::new(&mut presenter, &db).run(&qs, 2).unwrap();

            assert_eq!(presenter.offered.len(), 2);
            assert!(presenter.offered.iter().all(|opts| opts.len() == 4));
            assert!(presenter.output().contains("Question 1 of 2"));
            assert!(presenter.output().contains("Question 2 of 2"));
        }

        #[test]
        fn each_run_gets_a_new_session_id() {
            let (db, qs) = setup_db_with(2);
            let mut presenter = ScriptedPresenter::with_choices([0, 0, 0, 0]);

            let first = SessionRunner::new(&mut presenter, &db).run(&qs, 2).unwrap();
            let second = SessionRunner::new(&mut presenter, &db).run(&qs, 2).unwrap();

            assert_ne!(first, second);
            assert_eq!(db.results_by_session(&first).unwrap().len(), 2);
            assert_eq!(db.results_by_session(&second).unwrap().len(), 2);
        }

        #[test]
        fn store_failure_aborts_but_keeps_earlier_results() {
            let (db, qs) = setup_db_with(4);
            let store = FailingStore {
                inner: &db,
                fail_on: 3,
                calls: Cell::new(0),
            };
            let mut presenter = ScriptedPresenter::with_choices([0, 0, 0, 0]);

            let result = SessionRunner::new(&mut presenter, &store).run(&qs, 4);
            assert!(result.is_err());

            let session_id = db.most_recent_session_id().unwrap();
            assert_eq!(db.results_by_session(&session_id).unwrap().len(), 2);
            assert_eq!(store.calls.get(), 3);
        }

        #[test]
        fn presenter_failure_aborts_but_keeps_earlier_results() {
            let (db, qs) = setup_db_with(3);
            let mut presenter = ScriptedPresenter::with_choices([0]);

            let result = SessionRunner::new(&mut presenter, &db).run(&qs, 3);
            assert!(matches!(result, Err(QuizError::Io(_))));

            let session_id = db.most_recent_session_id().unwrap();
            assert_eq!(db.results_by_session(&session_id).unwrap().len(), 1);
        }
    }
}
