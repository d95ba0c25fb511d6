//! Scoring.
//!
//! Two modes compare what the user claimed against the answer key:
//!
//! * **Selection**: the chosen labels must equal the correct labels exactly.
//!   A question is worth one point, awarded all-or-nothing.
//! * **Judgment**: every option is judged on its own. A question with `n`
//!   options is worth `n` points, one per matching judgment, except that
//!   reaching `n / 2` mismatches zeroes the question.

use serde::Serialize;

use super::relabel::OptionPack;
use crate::models::{AnswerRecord, Judgment, OptionLabel};

/// Uppercase, trim, dedupe and sort a list of labels.
pub fn normalize_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut out: Vec<String> = labels
        .iter()
        .map(|l| l.as_ref().trim().to_uppercase())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Whether two label lists name the same set, ignoring case and order.
pub fn same_selection<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> bool {
    normalize_labels(a) == normalize_labels(b)
}

/// Whether a judgment disagrees with the truth. Undecided always does.
pub fn is_mismatch(judgment: Judgment, truth: bool) -> bool {
    match judgment {
        Judgment::Undecided => true,
        Judgment::MarkedCorrect => !truth,
        Judgment::MarkedWrong => truth,
    }
}

/// Points for a judged question with `total` options and `wrong` mismatches.
pub fn judgment_points(total: usize, wrong: usize) -> usize {
    if wrong as f64 >= total as f64 / 2.0 {
        0
    } else {
        total.saturating_sub(wrong).min(total)
    }
}

/// Outcome for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionScore {
    pub points: usize,
    pub max: usize,
    /// Options the user got wrong; in selection mode, 0 or 1.
    pub wrong: usize,
}

impl QuestionScore {
    pub fn is_full(&self) -> bool {
        self.points == self.max
    }
}

/// Set-equality score of `selection` against the pack's correct set.
pub fn score_selection<'a>(
    pack: &OptionPack,
    selection: impl IntoIterator<Item = &'a OptionLabel>,
) -> QuestionScore {
    let chosen: Vec<&str> = selection.into_iter().map(OptionLabel::as_str).collect();
    let correct: Vec<&str> = pack.correct().iter().map(OptionLabel::as_str).collect();
    let ok = same_selection(&chosen, &correct);

    QuestionScore {
        points: usize::from(ok),
        max: 1,
        wrong: usize::from(!ok),
    }
}

/// Judgment score of `record` against the pack.
pub fn score_judgments(pack: &OptionPack, record: &AnswerRecord) -> QuestionScore {
    let total = pack.len();
    let wrong = pack
        .options()
        .iter()
        .filter(|o| is_mismatch(record.judgment(&o.label), pack.is_correct(&o.label)))
        .count();

    QuestionScore {
        points: judgment_points(total, wrong),
        max: total,
        wrong,
    }
}

/// Score `record` the way its variant calls for. A missing record scores as
/// an empty answer.
pub fn score_question(pack: &OptionPack, record: Option<&AnswerRecord>) -> QuestionScore {
    match record {
        Some(AnswerRecord::Selection(set)) => score_selection(pack, set),
        Some(judged @ AnswerRecord::Judgments(_)) => score_judgments(pack, judged),
        None => score_selection(pack, std::iter::empty()),
    }
}

/// Running total over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub points: usize,
    pub max: usize,
}

impl Tally {
    pub fn add(&mut self, score: QuestionScore) {
        self.points += score.points;
        self.max += score.max;
    }

    pub fn percent(&self) -> f64 {
        if self.max > 0 {
            (self.points as f64 / self.max as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl FromIterator<QuestionScore> for Tally {
    fn from_iter<I: IntoIterator<Item = QuestionScore>>(iter: I) -> Self {
        let mut tally = Self::default();
        for score in iter {
            tally.add(score);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::models::Question;
    use crate::quiz::relabel::relabel;

    fn label(s: &str) -> OptionLabel {
        OptionLabel::parse(s).unwrap()
    }

    fn four_option_pack() -> OptionPack {
        let q = Question::new(
            "q1",
            "?",
            [("A", "a"), ("B", "b"), ("C", "c"), ("D", "d")],
            ["B", "D"],
        )
        .unwrap();
        relabel(&q, false, &mut StdRng::seed_from_u64(0))
    }

    fn judged(pairs: &[(&str, Judgment)]) -> AnswerRecord {
        AnswerRecord::Judgments(
            pairs
                .iter()
                .map(|(l, j)| (label(l), *j))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_same_selection() {
        assert!(same_selection(&["b", "D"], &["D", "B"]));
        assert!(same_selection(&["D", "B"], &["b", "D"]));
        assert!(same_selection(&["a", "A", " a "], &["A"]));
        assert!(!same_selection(&["A"], &["A", "B"]));
        assert!(!same_selection(&["A", "B"], &["A"]));
        assert!(same_selection::<&str, &str>(&[], &[]));
    }

    #[test]
    fn test_judgment_points_threshold() {
        assert_eq!(judgment_points(4, 0), 4);
        assert_eq!(judgment_points(4, 1), 3);
        assert_eq!(judgment_points(4, 2), 0);
        assert_eq!(judgment_points(3, 1), 2);
        assert_eq!(judgment_points(3, 2), 0);
        assert_eq!(judgment_points(1, 1), 0);
        assert_eq!(judgment_points(2, 1), 0);
    }

    #[test]
    fn test_mismatch() {
        assert!(is_mismatch(Judgment::Undecided, true));
        assert!(is_mismatch(Judgment::Undecided, false));
        assert!(!is_mismatch(Judgment::MarkedCorrect, true));
        assert!(is_mismatch(Judgment::MarkedCorrect, false));
        assert!(!is_mismatch(Judgment::MarkedWrong, false));
        assert!(is_mismatch(Judgment::MarkedWrong, true));
    }

    #[test]
    fn test_all_undecided_scores_zero() {
        let pack = four_option_pack();
        let score = score_judgments(&pack, &judged(&[]));
        assert_eq!(
            score,
            QuestionScore {
                points: 0,
                max: 4,
                wrong: 4
            }
        );
    }

    #[test]
    fn test_one_mismatch_keeps_partial_credit() {
        let pack = four_option_pack();
        let record = judged(&[
            ("A", Judgment::MarkedWrong),
            ("B", Judgment::MarkedCorrect),
            ("C", Judgment::MarkedCorrect),
            ("D", Judgment::MarkedCorrect),
        ]);
        let score = score_judgments(&pack, &record);
        assert_eq!(score.wrong, 1);
        assert_eq!(score.points, 3);
    }

    #[test]
    fn test_half_wrong_hits_the_cliff() {
        let pack = four_option_pack();
        let record = judged(&[
            ("A", Judgment::MarkedWrong),
            ("B", Judgment::MarkedCorrect),
            ("C", Judgment::MarkedCorrect),
        ]);
        let score = score_judgments(&pack, &record);
        assert_eq!(score.wrong, 2);
        assert_eq!(score.points, 0);
    }

    #[test]
    fn test_selection_scoring() {
        let pack = four_option_pack();
        let exact = [label("D"), label("B")];
        assert!(score_selection(&pack, &exact).is_full());

        let partial = [label("B")];
        let score = score_selection(&pack, &partial);
        assert_eq!(score.points, 0);
        assert_eq!(score.max, 1);

        assert_eq!(score_question(&pack, None).points, 0);
    }

    #[test]
    fn test_tally() {
        let tally: Tally = [
            QuestionScore {
                points: 4,
                max: 4,
                wrong: 0,
            },
            QuestionScore {
                points: 0,
                max: 4,
                wrong: 2,
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(tally, Tally { points: 4, max: 8 });
        assert_eq!(tally.percent(), 50.0);
        assert_eq!(Tally::default().percent(), 0.0);
    }
}
