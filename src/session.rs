//! Session state management.
//!
//! [`QuizController`] owns everything that changes while the program runs:
//! chapter selection, settings, the random source and the running session.
//! All mutation goes through its named operations; each one either applies
//! fully or returns a [`SessionError`] and leaves state untouched.

use std::collections::{BTreeSet, HashMap};

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::data::QuestionBank;
use crate::models::{AnswerRecord, Judgment, OptionLabel, Question, ScoringMode};
use crate::quiz::{
    ChapterKey, OptionPack, OptionPackCache, QuestionScore, Tally, available_chapters,
    build_quiz, chapter_of, score_question,
};
use crate::settings::{AnsweredPolicy, Settings};

/// Where the controller is in the quiz lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Choosing chapters and settings; no session exists.
    Selecting,
    /// Answering; answers are mutable.
    InProgress,
    /// Answers frozen, score and review available.
    Submitted,
}

/// How far the user got on one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Untouched,
    Touched,
    /// Every option judged (judgment mode only).
    FullyJudged,
}

/// A rejected action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("select at least one chapter")]
    NoChaptersSelected,

    #[error("no questions for this selection")]
    NoMatchingQuestions,

    #[error("a quiz is already running")]
    AlreadyStarted,

    #[error("no quiz is running")]
    NotStarted,

    #[error("answer at least one question before submitting")]
    NothingAnswered,

    #[error("answers are frozen after submission")]
    AlreadySubmitted,

    #[error("submit the quiz before resetting")]
    NotSubmitted,

    #[error("option {label} is not part of this question")]
    UnknownOption { label: String },

    #[error("this action needs {expected:?} scoring")]
    WrongMode { expected: ScoringMode },
}

/// A running quiz.
#[derive(Debug)]
struct Session {
    quiz: Vec<Question>,
    generation: u64,
    packs: OptionPackCache,
    answers: HashMap<String, AnswerRecord>,
    cursor: usize,
    submitted: bool,
}

impl Session {
    fn new(quiz: Vec<Question>, generation: u64, shuffle_options: bool, rng: &mut StdRng) -> Self {
        let mut packs = OptionPackCache::new();
        packs.get_or_build(generation, &quiz, shuffle_options, rng);

        Self {
            quiz,
            generation,
            packs,
            answers: HashMap::new(),
            cursor: 0,
            submitted: false,
        }
    }

    /// Rebuild packs for a new shuffle setting, carrying answers across by
    /// origin label so they stay on the options the user picked.
    fn refresh_packs(&mut self, shuffle_options: bool, rng: &mut StdRng) {
        if self.packs.shuffled() == Some(shuffle_options) {
            return;
        }

        let previous = self.packs.packs().to_vec();
        let (packs, _) = self
            .packs
            .get_or_build(self.generation, &self.quiz, shuffle_options, rng);

        for (question, (old, new)) in self.quiz.iter().zip(previous.iter().zip(packs)) {
            if let Some(record) = self.answers.get_mut(question.id()) {
                *record = record.remap(|label| {
                    old.origin_of(label)
                        .and_then(|origin| new.label_for(origin))
                        .cloned()
                });
            }
        }
    }

    fn pack(&self, index: usize) -> Option<&OptionPack> {
        self.packs.packs().get(index)
    }

    fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.quiz
            .get(index)
            .and_then(|q| self.answers.get(q.id()))
    }

    fn status(&self, index: usize) -> QuestionStatus {
        let touched = self.answer(index).map_or(0, AnswerRecord::touched);
        match (self.answer(index), self.pack(index)) {
            (Some(AnswerRecord::Judgments(_)), Some(pack)) if touched == pack.len() => {
                QuestionStatus::FullyJudged
            }
            _ if touched > 0 => QuestionStatus::Touched,
            _ => QuestionStatus::Untouched,
        }
    }

    fn is_answered(&self, index: usize, policy: AnsweredPolicy) -> bool {
        match (policy, self.status(index)) {
            (_, QuestionStatus::Untouched) => false,
            (AnsweredPolicy::FullyJudged, QuestionStatus::Touched) => {
                !matches!(self.answer(index), Some(AnswerRecord::Judgments(_)))
            }
            _ => true,
        }
    }

    fn score(&self, index: usize) -> Option<QuestionScore> {
        self.pack(index)
            .map(|pack| score_question(pack, self.answer(index)))
    }

    fn tally(&self) -> Tally {
        (0..self.quiz.len()).filter_map(|i| self.score(i)).collect()
    }
}

/// The single owner of quiz state.
#[derive(Debug)]
pub struct QuizController {
    bank: QuestionBank,
    settings: Settings,
    chapters: Vec<ChapterKey>,
    selected: BTreeSet<ChapterKey>,
    rng: StdRng,
    generation: u64,
    session: Option<Session>,
}

impl QuizController {
    pub fn new(bank: QuestionBank, settings: Settings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let chapters = available_chapters(bank.questions());
        let unchaptered = bank
            .questions()
            .iter()
            .filter(|q| chapter_of(q).is_none())
            .count();
        if unchaptered > 0 {
            tracing::info!("{unchaptered} questions have no chapter and cannot be selected");
        }

        Self {
            bank,
            settings,
            chapters,
            selected: BTreeSet::new(),
            rng,
            generation: 0,
            session: None,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        match &self.session {
            None => SessionState::Selecting,
            Some(session) if session.submitted => SessionState::Submitted,
            Some(_) => SessionState::InProgress,
        }
    }

    // Chapter selection

    /// Chapters available in the bank, ascending.
    pub fn chapters(&self) -> &[ChapterKey] {
        &self.chapters
    }

    pub fn selected_chapters(&self) -> &BTreeSet<ChapterKey> {
        &self.selected
    }

    pub fn is_chapter_selected(&self, key: ChapterKey) -> bool {
        self.selected.contains(&key)
    }

    /// Add or remove `key` from the selection. Keys not in the bank are
    /// accepted and simply match nothing.
    pub fn toggle_chapter(&mut self, key: ChapterKey) -> Result<(), SessionError> {
        self.require_selecting()?;
        if !self.selected.remove(&key) {
            self.selected.insert(key);
        }
        Ok(())
    }

    pub fn select_chapters(
        &mut self,
        keys: impl IntoIterator<Item = ChapterKey>,
    ) -> Result<(), SessionError> {
        self.require_selecting()?;
        self.selected.extend(keys);
        Ok(())
    }

    pub fn select_all_chapters(&mut self) -> Result<(), SessionError> {
        let all = self.chapters.clone();
        self.select_chapters(all)
    }

    pub fn clear_chapters(&mut self) -> Result<(), SessionError> {
        self.require_selecting()?;
        self.selected.clear();
        Ok(())
    }

    fn require_selecting(&self) -> Result<(), SessionError> {
        match self.session {
            None => Ok(()),
            Some(_) => Err(SessionError::AlreadyStarted),
        }
    }

    // Settings

    /// Takes effect at the next start; a running quiz keeps its order.
    pub fn set_shuffle_questions(&mut self, shuffle: bool) {
        self.settings.shuffle_questions = shuffle;
    }

    /// Rebuilds option packs of a running quiz. Not allowed once submitted.
    pub fn set_shuffle_options(&mut self, shuffle: bool) -> Result<(), SessionError> {
        if self.state() == SessionState::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        self.settings.shuffle_options = shuffle;
        if let Some(session) = &mut self.session {
            session.refresh_packs(shuffle, &mut self.rng);
        }
        Ok(())
    }

    pub fn set_practice(&mut self, practice: bool) {
        self.settings.practice = practice;
    }

    /// Scoring mode can only change while selecting, since answer records are
    /// shaped by it.
    pub fn set_scoring(&mut self, scoring: ScoringMode) -> Result<(), SessionError> {
        self.require_selecting()?;
        self.settings.scoring = scoring;
        Ok(())
    }

    // Transitions

    /// Selecting -> InProgress. Returns the quiz length.
    pub fn start(&mut self) -> Result<usize, SessionError> {
        self.require_selecting()?;
        if self.selected.is_empty() {
            return Err(SessionError::NoChaptersSelected);
        }

        let quiz = build_quiz(
            self.bank.questions(),
            &self.selected,
            self.settings.shuffle_questions,
            &mut self.rng,
        );
        if quiz.is_empty() {
            return Err(SessionError::NoMatchingQuestions);
        }

        self.generation += 1;
        let len = quiz.len();
        self.session = Some(Session::new(
            quiz,
            self.generation,
            self.settings.shuffle_options,
            &mut self.rng,
        ));

        tracing::info!(
            questions = len,
            chapters = ?self.selected,
            scoring = ?self.settings.scoring,
            "quiz started"
        );
        Ok(len)
    }

    /// InProgress -> Submitted. Submitting again is a no-op.
    pub fn submit(&mut self) -> Result<Tally, SessionError> {
        let policy = self.settings.answered;
        let session = self.session.as_mut().ok_or(SessionError::NotStarted)?;
        if session.submitted {
            return Ok(session.tally());
        }

        let any_answered = (0..session.quiz.len()).any(|i| session.is_answered(i, policy));
        if !any_answered {
            return Err(SessionError::NothingAnswered);
        }

        session.submitted = true;
        let tally = session.tally();
        tracing::info!(points = tally.points, max = tally.max, "quiz submitted");
        Ok(tally)
    }

    /// Submitted -> Selecting. Drops the session with its answers and cursor;
    /// the chapter selection is kept.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Submitted => {
                self.session = None;
                tracing::info!("quiz reset");
                Ok(())
            }
            SessionState::InProgress => Err(SessionError::NotSubmitted),
            SessionState::Selecting => Err(SessionError::NotStarted),
        }
    }

    // Navigation

    pub fn cursor(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.cursor)
    }

    /// Move to `index`, clamped to the quiz.
    pub fn go_to(&mut self, index: usize) {
        if let Some(session) = &mut self.session {
            session.cursor = index.min(session.quiz.len().saturating_sub(1));
        }
    }

    pub fn next(&mut self) {
        self.go_to(self.cursor().saturating_add(1));
    }

    pub fn previous(&mut self) {
        self.go_to(self.cursor().saturating_sub(1));
    }

    pub fn is_first(&self) -> bool {
        self.cursor() == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor() + 1 >= self.len()
    }

    // Answers

    /// Toggle `label` in the current question's selection.
    pub fn toggle_option(&mut self, label: &OptionLabel) -> Result<(), SessionError> {
        let mode = self.settings.scoring;
        if mode != ScoringMode::Selection {
            return Err(SessionError::WrongMode {
                expected: ScoringMode::Selection,
            });
        }
        self.with_current_record(label, |record| {
            if let AnswerRecord::Selection(set) = record {
                if !set.remove(label) {
                    set.insert(label.clone());
                }
            }
        })
    }

    /// Record a judgment for `label` on the current question.
    pub fn set_judgment(
        &mut self,
        label: &OptionLabel,
        judgment: Judgment,
    ) -> Result<(), SessionError> {
        if self.settings.scoring != ScoringMode::Judgment {
            return Err(SessionError::WrongMode {
                expected: ScoringMode::Judgment,
            });
        }
        self.with_current_record(label, |record| {
            if let AnswerRecord::Judgments(map) = record {
                map.insert(label.clone(), judgment);
            }
        })
    }

    /// Advance the judgment for `label` one step.
    pub fn cycle_judgment(&mut self, label: &OptionLabel) -> Result<(), SessionError> {
        let current = self
            .current_answer()
            .map(|r| r.judgment(label))
            .unwrap_or_default();
        self.set_judgment(label, current.cycle())
    }

    /// Act on the option at `index` of the current question in whatever way
    /// the scoring mode calls for.
    pub fn activate_option(&mut self, index: usize) -> Result<(), SessionError> {
        let label = self
            .current_pack()
            .and_then(|pack| pack.label_at(index))
            .cloned()
            .ok_or(SessionError::UnknownOption {
                label: format!("#{}", index + 1),
            })?;
        match self.settings.scoring {
            ScoringMode::Selection => self.toggle_option(&label),
            ScoringMode::Judgment => self.cycle_judgment(&label),
        }
    }

    fn with_current_record(
        &mut self,
        label: &OptionLabel,
        edit: impl FnOnce(&mut AnswerRecord),
    ) -> Result<(), SessionError> {
        let mode = self.settings.scoring;
        let session = self.session.as_mut().ok_or(SessionError::NotStarted)?;
        if session.submitted {
            return Err(SessionError::AlreadySubmitted);
        }

        let index = session.cursor;
        let known = session.pack(index).is_some_and(|p| p.contains(label));
        let Some(question) = session.quiz.get(index).filter(|_| known) else {
            return Err(SessionError::UnknownOption {
                label: label.to_string(),
            });
        };

        let record = session
            .answers
            .entry(question.id().to_string())
            .or_insert_with(|| AnswerRecord::empty(mode));
        edit(record);
        tracing::debug!(question = question.id(), %label, "answer updated");
        Ok(())
    }

    // Queries

    /// Quiz length; 0 while selecting.
    pub fn len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.quiz.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn quiz(&self) -> &[Question] {
        self.session
            .as_ref()
            .map(|s| s.quiz.as_slice())
            .unwrap_or_default()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.quiz().get(index)
    }

    pub fn pack(&self, index: usize) -> Option<&OptionPack> {
        self.session.as_ref().and_then(|s| s.pack(index))
    }

    pub fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.session.as_ref().and_then(|s| s.answer(index))
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question(self.cursor())
    }

    pub fn current_pack(&self) -> Option<&OptionPack> {
        self.pack(self.cursor())
    }

    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        self.answer(self.cursor())
    }

    pub fn question_status(&self, index: usize) -> Option<QuestionStatus> {
        self.session
            .as_ref()
            .filter(|s| index < s.quiz.len())
            .map(|s| s.status(index))
    }

    /// Questions that count as answered under the configured policy.
    pub fn answered_count(&self) -> usize {
        let policy = self.settings.answered;
        self.session.as_ref().map_or(0, |s| {
            (0..s.quiz.len()).filter(|&i| s.is_answered(i, policy)).count()
        })
    }

    pub fn can_submit(&self) -> bool {
        self.state() == SessionState::InProgress && self.answered_count() > 0
    }

    /// Score of one question; post-submit only.
    pub fn question_score(&self, index: usize) -> Option<QuestionScore> {
        self.session
            .as_ref()
            .filter(|s| s.submitted)
            .and_then(|s| s.score(index))
    }

    /// Session score; post-submit only.
    pub fn score(&self) -> Option<Tally> {
        self.session
            .as_ref()
            .filter(|s| s.submitted)
            .map(Session::tally)
    }

    /// Score of one question regardless of submission, for practice feedback.
    pub(crate) fn provisional_score(&self, index: usize) -> Option<QuestionScore> {
        self.session.as_ref().and_then(|s| s.score(index))
    }
}
