mod answer;
mod question;

pub use answer::{AnswerRecord, Judgment, ScoringMode};
pub use question::{LABEL_ALPHABET, MAX_OPTIONS, OptionContent, OptionLabel, Question};
