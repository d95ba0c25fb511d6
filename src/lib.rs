//! # chapter-quiz
//!
//! A terminal quiz over a chapter-organised, multiple-answer question bank.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chapter_quiz::{Quiz, QuizError, Settings};
//!
//! fn main() -> Result<(), QuizError> {
//!     // Load and validate the bank
//!     let quiz = Quiz::from_json("questions.json", Settings::default())?;
//!
//!     // Run the quiz in the terminal
//!     quiz.run()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! The quiz logic is usable without a terminal through [`QuizController`]:
//!
//! ```rust
//! use chapter_quiz::models::Question;
//! use chapter_quiz::quiz::ChapterKey;
//! use chapter_quiz::{QuestionBank, QuizController, Settings};
//!
//! let bank = QuestionBank::new([
//!     Question::new("1.1", "Pick a", [("a", "first"), ("b", "second")], ["a"]).unwrap(),
//! ]);
//! let mut quiz = QuizController::new(bank, Settings::default());
//! quiz.toggle_chapter(ChapterKey(1)).unwrap();
//! assert_eq!(quiz.start().unwrap(), 1);
//! ```

mod app;
pub mod data;
pub mod models;
pub mod quiz;
pub mod session;
pub mod settings;
pub mod terminal;
mod ui;
pub mod view;

use std::io;
use std::path::Path;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;

pub use app::{App, Screen};
pub use data::{LoadError, QuestionBank, load_bank_from_json};
pub use models::{Judgment, Question, ScoringMode};
pub use session::{QuizController, SessionError, SessionState};
pub use settings::{AnsweredPolicy, Settings};
pub use view::BankReport;

use terminal::{AppTerminal, TerminalGuard};

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Error loading questions from file.
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),

    /// A session action was refused.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// IO error during quiz execution.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    /// Wrap a prepared controller, for example one with chapters already
    /// selected.
    pub fn new(quiz: QuizController) -> Self {
        Self { app: App::new(quiz) }
    }

    /// Load a quiz from a JSON bank file.
    ///
    /// ```rust,no_run
    /// use chapter_quiz::{Quiz, Settings};
    ///
    /// let quiz = Quiz::from_json("questions.json", Settings::default()).expect("Failed to load quiz");
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P, settings: Settings) -> Result<Self, QuizError> {
        let bank = load_bank_from_json(path)?;
        Ok(Self::new(QuizController::new(bank, settings)))
    }

    /// Run the quiz in the terminal.
    ///
    /// Takes over the terminal until the user quits. The terminal is handed
    /// back on every exit path.
    pub fn run(mut self) -> Result<(), QuizError> {
        let mut guard = TerminalGuard::enter()?;
        run_event_loop(guard.terminal(), &mut self.app)
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }
}

fn run_event_loop(terminal: &mut AppTerminal, app: &mut App) -> Result<(), QuizError> {
    tracing::debug!("event loop started");
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_input(app, key.code) {
                break;
            }
        }
    }
    tracing::debug!("event loop finished");

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return true;
    }

    app.clear_notice();
    match app.screen() {
        Screen::Chapters => handle_chapters_input(app, key),
        Screen::NoQuestions => handle_empty_input(app, key),
        Screen::Question => handle_question_input(app, key),
        Screen::Review => handle_review_input(app, key),
    }
    false
}

fn handle_chapters_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_chapter(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_chapter(),
        KeyCode::Char(' ') => app.toggle_chapter(),
        KeyCode::Char('a') => app.select_all_chapters(),
        KeyCode::Char('n') => app.clear_chapters(),
        KeyCode::Char('m') => app.toggle_scoring(),
        KeyCode::Char('s') => app.toggle_shuffle_questions(),
        KeyCode::Char('o') => app.toggle_shuffle_options(),
        KeyCode::Char('p') => app.toggle_practice(),
        KeyCode::Enter => app.start_quiz(),
        _ => {}
    }
}

fn handle_empty_input(app: &mut App, key: KeyCode) {
    if matches!(key, KeyCode::Enter | KeyCode::Esc) {
        app.back_to_chapters();
    }
}

fn handle_question_input(app: &mut App, key: KeyCode) {
    let submitted = app.quiz().state() == SessionState::Submitted;
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_option(),
        KeyCode::Char('c') => app.judge_option(Judgment::MarkedCorrect),
        KeyCode::Char('x') => app.judge_option(Judgment::MarkedWrong),
        KeyCode::Char('u') => app.judge_option(Judgment::Undecided),
        KeyCode::Char('o') => app.toggle_shuffle_options(),
        KeyCode::Char('p') => app.toggle_practice(),
        KeyCode::Char('s') => app.submit(),
        KeyCode::Char('v') if submitted => app.open_review(),
        KeyCode::Char('r') | KeyCode::Char('R') if submitted => app.restart(),
        _ => {}
    }
}

fn handle_review_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_review_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_review_up(),
        KeyCode::Enter => app.open_reviewed_question(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        _ => {}
    }
}
