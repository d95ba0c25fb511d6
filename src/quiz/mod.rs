//! Quiz core: shuffling, chapters, relabeling and scoring.
//!
//! Everything here is pure apart from the random source, which callers pass
//! in so sessions (and tests) can seed it.

mod builder;
mod chapter;
mod relabel;
mod scoring;
mod shuffle;

pub use builder::build_quiz;
pub use chapter::{ChapterKey, available_chapters, chapter_of};
pub use relabel::{OptionPack, OptionPackCache, RelabeledOption, relabel};
pub use scoring::{
    QuestionScore, Tally, is_mismatch, judgment_points, normalize_labels, same_selection,
    score_judgments, score_question, score_selection,
};
pub use shuffle::shuffled;
