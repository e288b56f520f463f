use log::warn;

use crate::error::{QuizError, Result};
use crate::presenter::Presenter;
use crate::report::build_report;
use crate::session::SessionRunner;
use crate::store::{QuestionStore, ResultStore};

pub const INSTRUCTIONS: &str = "Welcome to the quiz! Choose 1 to start a quiz, then select a category \
and how many questions you would like to answer.
Answer each question by typing the number next to your chosen answer. \
Your results are shown at the end of the quiz.
You can also display the results from the previous session from the main menu.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    TakeQuiz,
    ShowResults,
    Quit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 3] = [MenuChoice::TakeQuiz, MenuChoice::ShowResults, MenuChoice::Quit];

    fn label(&self) -> &'static str {
        match self {
            MenuChoice::TakeQuiz => "Select a category",
            MenuChoice::ShowResults => "Display last quiz results",
            MenuChoice::Quit => "Quit",
        }
    }
}

/// Interactive main menu. Returns when the user quits; lookup and validation
/// errors are shown and the menu comes back, input errors end the loop.
pub fn run<S, P>(store: &S, presenter: &mut P) -> Result<()>
where
    S: QuestionStore + ResultStore,
    P: Presenter,
{
    let labels: Vec<String> = MenuChoice::ALL.iter().map(|c| c.label().to_string()).collect();
    presenter.render(INSTRUCTIONS)?;

    loop {
        let index = presenter.choose_from_list("Enter your choice: ", &labels)?;

        let outcome = match MenuChoice::ALL.get(index) {
            Some(MenuChoice::TakeQuiz) => take_quiz(store, presenter),
            Some(MenuChoice::ShowResults) => show_results(store, presenter),
            Some(MenuChoice::Quit) => {
                presenter.render("Thanks for using this program!")?;
                return Ok(());
            }
            None => Err(out_of_range("menu choice", index)),
        };

        if let Err(err) = outcome {
            if err.is_fatal() {
                return Err(err);
            }
            warn!("Menu action failed: {}", err);
            presenter.render(&format!("Error: {}", err))?;
        }
    }
}

fn take_quiz<S, P>(store: &S, presenter: &mut P) -> Result<()>
where
    S: QuestionStore + ResultStore,
    P: Presenter,
{
    let categories = store.list_categories()?;
    let index = presenter.choose_from_list(
        "Type the number of the category you want to be quizzed on: ",
        &categories,
    )?;
    let category = categories
        .get(index)
        .ok_or_else(|| out_of_range("category choice", index))?;

    let questions = store.questions_by_category(category)?;
    presenter.render(&format!(
        "{} questions available in {}.",
        questions.len(),
        category
    ))?;
    let count = read_question_count(presenter, category)?;

    SessionRunner::new(presenter, store).run(&questions, count)?;
    show_results(store, presenter)
}

// Anything above zero is accepted; the runner clamps to what is available
fn read_question_count<P: Presenter>(presenter: &mut P, category: &str) -> Result<usize> {
    loop {
        let count =
            presenter.read_count("Type in the number of questions you want to be quizzed on: ")?;
        if count > 0 {
            return Ok(count);
        }
        presenter.render(&format!(
            "Please enter a number within the range provided for {}.",
            category
        ))?;
    }
}

fn out_of_range(what: &str, index: usize) -> QuizError {
    QuizError::Validation(format!("{} {}: out of range", what, index + 1))
}

fn show_results<S, P>(store: &S, presenter: &mut P) -> Result<()>
where
    S: QuestionStore + ResultStore,
    P: Presenter,
{
    let report = build_report(store, store)?;
    presenter.render(&format!("\n{}\n", report))
}
