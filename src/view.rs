//! Display records handed to the presentation layer.
//!
//! Everything here is derived from a [`QuizController`] on demand and
//! serializes to JSON.

use serde::Serialize;

use crate::data::{BankDiagnostic, QuestionBank};
use crate::models::{AnswerRecord, Judgment, ScoringMode};
use crate::quiz::{ChapterKey, OptionPack, QuestionScore, Tally, chapter_of, is_mismatch};
use crate::session::{QuestionStatus, QuizController, SessionState};

/// Position in the quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    /// 1-based.
    pub step: usize,
    pub total: usize,
    pub answered: usize,
    pub percent: f64,
}

/// Final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub points: usize,
    pub max: usize,
    pub percent: f64,
}

impl From<Tally> for ScoreView {
    fn from(tally: Tally) -> Self {
        Self {
            points: tally.points,
            max: tally.max,
            percent: tally.percent(),
        }
    }
}

/// What the user has entered for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChoiceView {
    Selected(bool),
    Judged(Judgment),
}

impl ChoiceView {
    fn is_decided(self) -> bool {
        match self {
            Self::Selected(selected) => selected,
            Self::Judged(judgment) => judgment.is_decided(),
        }
    }
}

/// Revealed outcome for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Chosen and correct, or judged as it truly is.
    Right,
    /// Chosen but wrong, or judged against the truth.
    Wrong,
    /// Correct but not chosen, or left undecided.
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub label: String,
    pub text: String,
    pub image: Option<String>,
    pub origin: String,
    pub choice: ChoiceView,
    /// Present after submission, or in practice mode for decided options.
    pub verdict: Option<Verdict>,
}

/// Practice-mode feedback for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: bool,
    pub points: usize,
    pub max: usize,
    pub correct_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub id: String,
    /// Chapter and source, joined.
    pub meta: Option<String>,
    pub prompt: String,
    pub image: Option<String>,
    /// Shown once answers are revealed.
    pub comment: Option<String>,
    pub status: QuestionStatus,
    pub options: Vec<OptionView>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Partial,
    Incorrect,
}

impl From<QuestionScore> for Outcome {
    fn from(score: QuestionScore) -> Self {
        if score.is_full() {
            Self::Correct
        } else if score.points > 0 {
            Self::Partial
        } else {
            Self::Incorrect
        }
    }
}

/// One row of the post-submission review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub index: usize,
    pub id: String,
    pub prompt: String,
    pub outcome: Outcome,
    pub points: usize,
    pub max: usize,
    /// Labels the user claimed correct.
    pub yours: Vec<String>,
    pub correct: Vec<String>,
}

fn verdict(choice: ChoiceView, truth: bool) -> Option<Verdict> {
    match choice {
        ChoiceView::Selected(true) if truth => Some(Verdict::Right),
        ChoiceView::Selected(true) => Some(Verdict::Wrong),
        ChoiceView::Selected(false) if truth => Some(Verdict::Missed),
        ChoiceView::Selected(false) => None,
        ChoiceView::Judged(Judgment::Undecided) => Some(Verdict::Missed),
        ChoiceView::Judged(judgment) if is_mismatch(judgment, truth) => Some(Verdict::Wrong),
        ChoiceView::Judged(_) => Some(Verdict::Right),
    }
}

fn option_views(
    pack: &OptionPack,
    record: Option<&AnswerRecord>,
    mode: ScoringMode,
    reveal_all: bool,
    reveal_decided: bool,
) -> Vec<OptionView> {
    pack.options()
        .iter()
        .map(|option| {
            let choice = match mode {
                ScoringMode::Selection => {
                    ChoiceView::Selected(record.is_some_and(|r| r.is_selected(&option.label)))
                }
                ScoringMode::Judgment => {
                    ChoiceView::Judged(record.map(|r| r.judgment(&option.label)).unwrap_or_default())
                }
            };
            let revealed = reveal_all || (reveal_decided && choice.is_decided());

            OptionView {
                label: option.label.to_string(),
                text: option.content.text().to_string(),
                image: option.content.image().map(str::to_string),
                origin: option.origin.to_string(),
                choice,
                verdict: revealed
                    .then(|| verdict(choice, pack.is_correct(&option.label)))
                    .flatten(),
            }
        })
        .collect()
}

fn labels(pack: &OptionPack) -> Vec<String> {
    pack.correct().iter().map(ToString::to_string).collect()
}

impl QuizController {
    pub fn progress(&self) -> Option<ProgressView> {
        if self.is_empty() {
            return None;
        }
        let step = self.cursor() + 1;
        let total = self.len();
        Some(ProgressView {
            step,
            total,
            answered: self.answered_count(),
            percent: (step as f64 / total as f64) * 100.0,
        })
    }

    pub fn score_view(&self) -> Option<ScoreView> {
        self.score().map(ScoreView::from)
    }

    pub fn question_view(&self, index: usize) -> Option<QuestionView> {
        let question = self.question(index)?;
        let pack = self.pack(index)?;
        let record = self.answer(index);
        let status = self.question_status(index)?;

        let submitted = self.state() == SessionState::Submitted;
        let practice = self.settings().practice && !submitted;
        let mode = self.settings().scoring;

        let meta: Vec<String> = chapter_of(question)
            .map(|key| key.to_string())
            .into_iter()
            .chain(question.source().map(str::to_string))
            .collect();

        let feedback = if practice && status != QuestionStatus::Untouched {
            self.provisional_score(index).map(|score| Feedback {
                correct: score.is_full(),
                points: score.points,
                max: score.max,
                correct_labels: labels(pack),
            })
        } else {
            None
        };

        Some(QuestionView {
            index,
            id: question.id().to_string(),
            meta: (!meta.is_empty()).then(|| meta.join(" • ")),
            prompt: question.prompt().to_string(),
            image: question.image().map(str::to_string),
            comment: submitted
                .then(|| question.comment().map(str::to_string))
                .flatten(),
            status,
            options: option_views(pack, record, mode, submitted, practice),
            feedback,
        })
    }

    pub fn current_view(&self) -> Option<QuestionView> {
        self.question_view(self.cursor())
    }

    /// Per-question outcomes; post-submit only.
    pub fn review(&self) -> Option<Vec<ReviewEntry>> {
        self.score()?;
        let entries = (0..self.len())
            .filter_map(|index| {
                let question = self.question(index)?;
                let pack = self.pack(index)?;
                let score = self.question_score(index)?;
                let yours = self
                    .answer(index)
                    .map(|r| r.claimed_correct().iter().map(ToString::to_string).collect())
                    .unwrap_or_default();

                Some(ReviewEntry {
                    index,
                    id: question.id().to_string(),
                    prompt: question.prompt().to_string(),
                    outcome: Outcome::from(score),
                    points: score.points,
                    max: score.max,
                    yours,
                    correct: labels(pack),
                })
            })
            .collect();
        Some(entries)
    }
}

/// Questions in one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    pub chapter: ChapterKey,
    pub questions: usize,
}

/// Summary of a loaded bank, for the check mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankReport {
    pub questions: usize,
    pub chapters: Vec<ChapterSummary>,
    pub unchaptered: usize,
    pub rejected: Vec<BankDiagnostic>,
}

impl BankReport {
    pub fn of(bank: &QuestionBank) -> Self {
        let mut chapters: Vec<ChapterSummary> = Vec::new();
        let mut unchaptered = 0;

        for question in bank.questions() {
            match chapter_of(question) {
                Some(key) => match chapters.iter_mut().find(|c| c.chapter == key) {
                    Some(summary) => summary.questions += 1,
                    None => chapters.push(ChapterSummary {
                        chapter: key,
                        questions: 1,
                    }),
                },
                None => unchaptered += 1,
            }
        }
        chapters.sort_by_key(|c| c.chapter);

        Self {
            questions: bank.len(),
            chapters,
            unchaptered,
            rejected: bank.diagnostics().to_vec(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
