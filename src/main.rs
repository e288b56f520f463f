mod db;
mod error;
mod menu;
mod models;
mod presenter;
mod report;
mod scoring;
mod session;
mod store;
mod tui;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use db::Database;
use error::QuizError;
use models::{JsonOutput, NewQuestion};
use presenter::ConsolePresenter;
use report::build_report;
use store::QuestionStore;

const DEFAULT_DB_NAME: &str = "quiz.db";
const SAMPLE_QUESTIONS: &str = include_str!("../data/sample_questions.json");

#[derive(Parser)]
#[command(name = "trivia-quiz")]
#[command(about = "A terminal trivia quiz with per-session scoring")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Start the interactive quiz menu (default)
    Play,

    /// Show results of the most recent quiz session
    Results,

    /// List question categories
    Categories,

    /// Manage questions
    #[command(subcommand)]
    Question(QuestionCommands),

    /// Import a question bank from JSON (bundled sample bank if no file is given)
    Seed {
        /// Path to a JSON array of questions
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// List past quiz sessions, newest first
    History {
        /// Maximum number of sessions to show
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
    },

    /// Show overall statistics
    Stats,

    /// Browse quiz history in a terminal UI
    Tui,
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// List questions
    List {
        /// Filter by category
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Show a question
    Show {
        /// Question ID
        id: i64,
    },

    /// Add a question
    Add {
        /// Question text
        text: String,

        /// The correct answer
        #[arg(long)]
        correct: String,

        /// Three incorrect answers
        #[arg(long, num_args = 3, required = true)]
        wrong: Vec<String>,

        /// Category label
        #[arg(long, short)]
        category: String,

        /// Difficulty from 1 to 5
        #[arg(long, short, default_value_t = 1)]
        difficulty: i64,

        /// Point value from 1 to 100
        #[arg(long, short, default_value_t = 10)]
        points: i64,
    },
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("QUIZ_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trivia-quiz");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    log::debug!("Using database at {}", db_path.display());
    let db = Database::open(&db_path)?;
    db.init()?;

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Init => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Play => {
            let mut presenter = ConsolePresenter::stdio();
            menu::run(&db, &mut presenter)?;
        }

        Commands::Results => match build_report(&db, &db) {
            Ok(report) => {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&report))?);
                } else {
                    println!("{}", report);
                }
            }
            Err(QuizError::NoResults) if cli.json => {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::<()>::err(QuizError::NoResults.to_string()))?
                );
            }
            Err(QuizError::NoResults) => {
                println!("No quiz results yet. Run a quiz first!");
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Categories => {
            let categories = db.list_categories()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&categories))?);
            } else {
                for (i, category) in categories.iter().enumerate() {
                    println!("{}. {}", i + 1, category);
                }
            }
        }

        Commands::Question(question_cmd) => match question_cmd {
            QuestionCommands::List { category } => {
                let questions = db.list_questions(category.as_deref())?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&questions))?);
                } else if questions.is_empty() {
                    println!("No questions found.");
                } else {
                    println!("{:<5} {:<15} {:<4} {:<4} QUESTION", "ID", "CATEGORY", "DIFF", "PTS");
                    println!("{}", "-".repeat(80));
                    for q in questions {
                        println!(
                            "{:<5} {:<15} {:<4} {:<4} {}",
                            q.id,
                            truncate(&q.category, 15),
                            q.difficulty,
                            q.points,
                            truncate(&q.text, 48)
                        );
                    }
                }
            }

            QuestionCommands::Show { id } => match db.question_by_id(id) {
                Ok(question) => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&question))?);
                    } else {
                        println!("{}", question);
                    }
                }
                Err(QuizError::NotFound(what)) => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::<()>::err(format!(
                                "{} not found",
                                what
                            )))?
                        );
                    } else {
                        println!("Question not found.");
                    }
                }
                Err(e) => return Err(e.into()),
            },

            QuestionCommands::Add {
                text,
                correct,
                wrong,
                category,
                difficulty,
                points,
            } => {
                let incorrect_answers: [String; 3] = wrong
                    .try_into()
                    .map_err(|_| QuizError::Validation("wrong answers: exactly three are required".into()))?;
                let question = NewQuestion {
                    text,
                    correct_answer: correct,
                    incorrect_answers,
                    difficulty,
                    points,
                    category,
                };
                let id = db.add_question(&question)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "category": question.category
                        })))?
                    );
                } else {
                    println!("Added question {} to '{}'.", id, question.category);
                }
            }
        },

        Commands::Seed { file } => {
            let questions = load_question_bank(file.as_deref())?;
            let imported = db.import_questions(&questions)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "imported": imported
                    })))?
                );
            } else {
                println!("Imported {} questions.", imported);
            }
        }

        Commands::History { limit } => {
            let sessions = db.list_session_summaries(Some(limit))?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&sessions))?);
            } else if sessions.is_empty() {
                println!("No quiz sessions yet.");
            } else {
                println!(
                    "{:<17} {:<15} {:>8} {:>10} {:>8}",
                    "FINISHED", "CATEGORY", "CORRECT", "SCORE", "PERCENT"
                );
                println!("{}", "-".repeat(62));
                for s in sessions {
                    println!(
                        "{:<17} {:<15} {:>8} {:>10} {:>7.1}%",
                        s.ended_at.format("%Y-%m-%d %H:%M"),
                        truncate(&s.category, 15),
                        format!("{}/{}", s.correct, s.answered),
                        format!("{}/{}", s.score, s.available),
                        s.percentage()
                    );
                }
            }
        }

        Commands::Stats => {
            let stats = db.get_stats()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&stats))?);
            } else {
                println!("=== Quiz Statistics ===");
                println!("Questions: {} in {} categories", stats.total_questions, stats.total_categories);
                println!("Sessions played: {}", stats.total_sessions);
                println!(
                    "Answers: {} ({} correct, {:.0}% accuracy)",
                    stats.total_answers,
                    stats.correct_answers,
                    stats.accuracy()
                );
                println!(
                    "Points: {} earned of {} available",
                    stats.points_earned, stats.points_available
                );
            }
        }

        Commands::Tui => {
            tui::run(db)?;
        }
    }

    Ok(())
}

fn load_question_bank(path: Option<&Path>) -> Result<Vec<NewQuestion>, QuizError> {
    let questions = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        }
        None => serde_json::from_str(SAMPLE_QUESTIONS)?,
    };
    Ok(questions)
}

pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
