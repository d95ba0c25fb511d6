use crate::models::{Judgment, ScoringMode};
use crate::session::{QuizController, SessionError, SessionState};

/// Which screen the terminal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chapters,
    /// Start found no question to ask; only going back is possible.
    NoQuestions,
    Question,
    Review,
}

/// Terminal-side state wrapped around the quiz controller: cursors and the
/// status line. Quiz state itself lives in [`QuizController`].
pub struct App {
    quiz: QuizController,
    chapter_cursor: usize,
    option_cursor: usize,
    review_cursor: usize,
    review_open: bool,
    empty_selection: Option<SessionError>,
    notice: Option<String>,
}

impl App {
    pub fn new(quiz: QuizController) -> Self {
        Self {
            quiz,
            chapter_cursor: 0,
            option_cursor: 0,
            review_cursor: 0,
            review_open: false,
            empty_selection: None,
            notice: None,
        }
    }

    pub fn quiz(&self) -> &QuizController {
        &self.quiz
    }

    pub fn screen(&self) -> Screen {
        match self.quiz.state() {
            SessionState::Selecting if self.empty_selection.is_some() => Screen::NoQuestions,
            SessionState::Selecting => Screen::Chapters,
            SessionState::InProgress => Screen::Question,
            SessionState::Submitted if self.review_open => Screen::Review,
            SessionState::Submitted => Screen::Question,
        }
    }

    pub fn chapter_cursor(&self) -> usize {
        self.chapter_cursor
    }

    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }

    pub fn review_cursor(&self) -> usize {
        self.review_cursor
    }

    /// Last rejected action, shown until the next key press.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn report(&mut self, result: Result<(), SessionError>) {
        if let Err(e) = result {
            tracing::debug!("action rejected: {e}");
            self.notice = Some(e.to_string());
        }
    }

    // Chapter selection

    pub fn select_next_chapter(&mut self) {
        let count = self.quiz.chapters().len();
        if count > 0 {
            self.chapter_cursor = (self.chapter_cursor + 1) % count;
        }
    }

    pub fn select_previous_chapter(&mut self) {
        let count = self.quiz.chapters().len();
        if count > 0 {
            self.chapter_cursor = (self.chapter_cursor + count - 1) % count;
        }
    }

    pub fn toggle_chapter(&mut self) {
        if let Some(&key) = self.quiz.chapters().get(self.chapter_cursor) {
            let result = self.quiz.toggle_chapter(key);
            self.report(result);
        }
    }

    pub fn select_all_chapters(&mut self) {
        let result = self.quiz.select_all_chapters();
        self.report(result);
    }

    pub fn clear_chapters(&mut self) {
        let result = self.quiz.clear_chapters();
        self.report(result);
    }

    pub fn toggle_shuffle_questions(&mut self) {
        let shuffle = !self.quiz.settings().shuffle_questions;
        self.quiz.set_shuffle_questions(shuffle);
    }

    pub fn toggle_shuffle_options(&mut self) {
        let shuffle = !self.quiz.settings().shuffle_options;
        let result = self.quiz.set_shuffle_options(shuffle);
        self.report(result);
    }

    pub fn toggle_practice(&mut self) {
        let practice = !self.quiz.settings().practice;
        self.quiz.set_practice(practice);
    }

    pub fn toggle_scoring(&mut self) {
        let scoring = match self.quiz.settings().scoring {
            ScoringMode::Selection => ScoringMode::Judgment,
            ScoringMode::Judgment => ScoringMode::Selection,
        };
        let result = self.quiz.set_scoring(scoring);
        self.report(result);
    }

    pub fn start_quiz(&mut self) {
        match self.quiz.start() {
            Ok(_) => {
                self.option_cursor = 0;
                self.review_cursor = 0;
                self.review_open = false;
            }
            Err(e @ (SessionError::NoChaptersSelected | SessionError::NoMatchingQuestions)) => {
                tracing::info!("start refused: {e}");
                self.empty_selection = Some(e);
            }
            Err(e) => self.report(Err(e)),
        }
    }

    /// Why the last start found nothing to ask.
    pub fn empty_selection(&self) -> Option<&SessionError> {
        self.empty_selection.as_ref()
    }

    pub fn back_to_chapters(&mut self) {
        self.empty_selection = None;
    }

    // Questions

    pub fn select_next_option(&mut self) {
        let count = self.quiz.current_pack().map_or(0, |p| p.len());
        if count > 0 {
            self.option_cursor = (self.option_cursor + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.quiz.current_pack().map_or(0, |p| p.len());
        if count > 0 {
            self.option_cursor = (self.option_cursor + count - 1) % count;
        }
    }

    /// Toggle or cycle the option under the cursor.
    pub fn activate_option(&mut self) {
        let result = self.quiz.activate_option(self.option_cursor);
        self.report(result);
    }

    /// Set a judgment on the option under the cursor.
    pub fn judge_option(&mut self, judgment: Judgment) {
        let label = self
            .quiz
            .current_pack()
            .and_then(|p| p.label_at(self.option_cursor))
            .cloned();
        if let Some(label) = label {
            let result = self.quiz.set_judgment(&label, judgment);
            self.report(result);
        }
    }

    pub fn next_question(&mut self) {
        self.quiz.next();
        self.option_cursor = 0;
    }

    pub fn previous_question(&mut self) {
        self.quiz.previous();
        self.option_cursor = 0;
    }

    pub fn submit(&mut self) {
        match self.quiz.submit() {
            Ok(_) => {
                self.review_open = true;
                self.review_cursor = self.quiz.cursor();
            }
            Err(e) => self.report(Err(e)),
        }
    }

    // Review

    pub fn scroll_review_down(&mut self) {
        let max = self.quiz.len().saturating_sub(1);
        self.review_cursor = (self.review_cursor + 1).min(max);
    }

    pub fn scroll_review_up(&mut self) {
        self.review_cursor = self.review_cursor.saturating_sub(1);
    }

    /// Leave the review for the question under the review cursor.
    pub fn open_reviewed_question(&mut self) {
        self.quiz.go_to(self.review_cursor);
        self.option_cursor = 0;
        self.review_open = false;
    }

    pub fn open_review(&mut self) {
        if self.quiz.state() == SessionState::Submitted {
            self.review_cursor = self.quiz.cursor();
            self.review_open = true;
        }
    }

    pub fn restart(&mut self) {
        let result = self.quiz.reset();
        if result.is_ok() {
            self.chapter_cursor = 0;
            self.option_cursor = 0;
            self.review_cursor = 0;
            self.review_open = false;
        }
        self.report(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::QuestionBank;
    use crate::models::Question;
    use crate::settings::Settings;

    fn app() -> App {
        let bank = QuestionBank::new([
            Question::new("1.1", "?", [("A", "a"), ("B", "b"), ("C", "c")], ["A"]).unwrap(),
            Question::new("1.2", "?", [("A", "a"), ("B", "b")], ["B"]).unwrap(),
            Question::new("2.1", "?", [("A", "a"), ("B", "b")], ["B"]).unwrap(),
        ]);
        App::new(QuizController::new(
            bank,
            Settings {
                shuffle_questions: false,
                shuffle_options: false,
                seed: Some(3),
                ..Settings::default()
            },
        ))
    }

    #[test]
    fn test_start_without_chapters_shows_empty_state() {
        let mut app = app();
        app.start_quiz();
        assert_eq!(app.screen(), Screen::NoQuestions);
        assert_eq!(
            app.empty_selection(),
            Some(&SessionError::NoChaptersSelected)
        );

        app.back_to_chapters();
        assert_eq!(app.screen(), Screen::Chapters);
    }

    #[test]
    fn test_option_cursor_wraps() {
        let mut app = app();
        app.toggle_chapter();
        app.start_quiz();
        assert_eq!(app.screen(), Screen::Question);

        app.select_previous_option();
        assert_eq!(app.option_cursor(), 2);
        app.select_next_option();
        assert_eq!(app.option_cursor(), 0);
    }

    #[test]
    fn test_full_round() {
        let mut app = app();
        app.select_next_chapter();
        app.toggle_chapter();
        app.start_quiz();
        assert_eq!(app.quiz().len(), 1);

        app.submit();
        assert_eq!(
            app.notice(),
            Some("answer at least one question before submitting")
        );

        app.clear_notice();
        app.select_next_option();
        app.activate_option();
        app.submit();
        assert_eq!(app.screen(), Screen::Review);
        assert_eq!(app.quiz().score().unwrap().points, 1);

        app.open_reviewed_question();
        assert_eq!(app.screen(), Screen::Question);
        app.open_review();
        assert_eq!(app.screen(), Screen::Review);

        app.restart();
        assert_eq!(app.screen(), Screen::Chapters);
    }
}
