use std::collections::{BTreeMap, BTreeSet};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::OptionLabel;

/// How answers are collected and scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// Pick the options believed correct; all-or-nothing per question.
    #[default]
    Selection,
    /// Mark every option right or wrong; partial credit per option.
    Judgment,
}

/// A user's claim about one option in judgment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Judgment {
    #[default]
    Undecided,
    MarkedCorrect,
    MarkedWrong,
}

impl Judgment {
    /// Undecided -> correct -> wrong -> undecided.
    pub fn cycle(self) -> Self {
        match self {
            Self::Undecided => Self::MarkedCorrect,
            Self::MarkedCorrect => Self::MarkedWrong,
            Self::MarkedWrong => Self::Undecided,
        }
    }

    pub fn is_decided(self) -> bool {
        !matches!(self, Self::Undecided)
    }
}

/// What the user has entered for one question, keyed by display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerRecord {
    Selection(BTreeSet<OptionLabel>),
    Judgments(BTreeMap<OptionLabel, Judgment>),
}

impl AnswerRecord {
    pub fn empty(mode: ScoringMode) -> Self {
        match mode {
            ScoringMode::Selection => Self::Selection(BTreeSet::new()),
            ScoringMode::Judgment => Self::Judgments(BTreeMap::new()),
        }
    }

    /// Judgment for `label`; unmarked options are undecided.
    pub fn judgment(&self, label: &OptionLabel) -> Judgment {
        match self {
            Self::Judgments(map) => map.get(label).copied().unwrap_or_default(),
            Self::Selection(_) => Judgment::Undecided,
        }
    }

    pub fn is_selected(&self, label: &OptionLabel) -> bool {
        match self {
            Self::Selection(set) => set.contains(label),
            Self::Judgments(_) => false,
        }
    }

    /// Number of options the user has acted on.
    pub fn touched(&self) -> usize {
        match self {
            Self::Selection(set) => set.len(),
            Self::Judgments(map) => map.values().filter(|j| j.is_decided()).count(),
        }
    }

    /// Labels the user claims are correct, sorted.
    pub fn claimed_correct(&self) -> Vec<OptionLabel> {
        match self {
            Self::Selection(set) => set.iter().cloned().collect(),
            Self::Judgments(map) => map
                .iter()
                .filter(|(_, j)| **j == Judgment::MarkedCorrect)
                .map(|(label, _)| label.clone())
                .collect(),
        }
    }

    /// Rewrite every label through `map`, dropping labels it has no entry for.
    pub fn remap(&self, map: impl Fn(&OptionLabel) -> Option<OptionLabel>) -> Self {
        match self {
            Self::Selection(set) => Self::Selection(set.iter().filter_map(&map).collect()),
            Self::Judgments(judgments) => Self::Judgments(
                judgments
                    .iter()
                    .filter_map(|(label, j)| map(label).map(|new| (new, *j)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> OptionLabel {
        OptionLabel::parse(s).unwrap()
    }

    #[test]
    fn test_judgment_cycle_returns_to_start() {
        let j = Judgment::default();
        assert_eq!(j.cycle().cycle().cycle(), j);
        assert!(j.cycle().is_decided());
    }

    #[test]
    fn test_touched_ignores_undecided() {
        let mut map = BTreeMap::new();
        map.insert(label("A"), Judgment::MarkedCorrect);
        map.insert(label("B"), Judgment::Undecided);
        map.insert(label("C"), Judgment::MarkedWrong);
        let record = AnswerRecord::Judgments(map);

        assert_eq!(record.touched(), 2);
        assert_eq!(record.claimed_correct(), vec![label("A")]);
        assert_eq!(record.judgment(&label("D")), Judgment::Undecided);
    }

    #[test]
    fn test_remap_drops_unmapped_labels() {
        let record = AnswerRecord::Selection([label("A"), label("B")].into_iter().collect());
        let remapped = record.remap(|l| (l.as_str() == "A").then(|| label("C")));
        assert_eq!(
            remapped,
            AnswerRecord::Selection([label("C")].into_iter().collect())
        );
    }
}
