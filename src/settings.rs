use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::ScoringMode;

/// What counts as an answered question when deciding whether submit is
/// allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AnsweredPolicy {
    /// At least one option selected or judged.
    #[default]
    Touched,
    /// In judgment mode every option judged; in selection mode same as
    /// `Touched`.
    FullyJudged,
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scoring: ScoringMode,
    /// Applies at the next start only.
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    /// Reveal verdicts for decided options before submission.
    pub practice: bool,
    pub answered: AnsweredPolicy,
    /// Fixed random seed; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scoring: ScoringMode::Selection,
            shuffle_questions: true,
            shuffle_options: true,
            practice: false,
            answered: AnsweredPolicy::Touched,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"scoring": "judgment", "answered": "fully-judged"}"#)
                .unwrap();
        assert_eq!(settings.scoring, ScoringMode::Judgment);
        assert_eq!(settings.answered, AnsweredPolicy::FullyJudged);
        assert!(settings.shuffle_questions);
        assert!(settings.shuffle_options);
        assert!(!settings.practice);
    }
}
