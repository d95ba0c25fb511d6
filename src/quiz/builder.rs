use std::collections::BTreeSet;

use rand::Rng;

use super::chapter::{ChapterKey, chapter_of};
use super::shuffle::shuffled;
use crate::models::Question;

/// Questions whose chapter is in `selected`, in bank order or shuffled.
///
/// An empty selection, or one that matches nothing, yields an empty quiz.
pub fn build_quiz<R: Rng + ?Sized>(
    bank: &[Question],
    selected: &BTreeSet<ChapterKey>,
    shuffle_questions: bool,
    rng: &mut R,
) -> Vec<Question> {
    let filtered: Vec<Question> = bank
        .iter()
        .filter(|q| chapter_of(q).is_some_and(|key| selected.contains(&key)))
        .cloned()
        .collect();

    if shuffle_questions {
        shuffled(&filtered, rng)
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn bank() -> Vec<Question> {
        ["1.1", "1.2", "2.1", "1.3", "loose", "2.2"]
            .into_iter()
            .map(|id| Question::new(id, "?", [("A", "x"), ("B", "y")], ["A"]).unwrap())
            .collect()
    }

    fn ids(quiz: &[Question]) -> Vec<&str> {
        quiz.iter().map(|q| q.id()).collect()
    }

    #[test]
    fn test_filter_keeps_bank_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let selected = BTreeSet::from([ChapterKey(1)]);

        let quiz = build_quiz(&bank(), &selected, false, &mut rng);
        assert_eq!(ids(&quiz), vec!["1.1", "1.2", "1.3"]);
    }

    #[test]
    fn test_shuffle_keeps_membership() {
        let mut rng = StdRng::seed_from_u64(5);
        let selected = BTreeSet::from([ChapterKey(1), ChapterKey(2)]);

        let quiz = build_quiz(&bank(), &selected, true, &mut rng);
        let mut got = ids(&quiz);
        got.sort();
        assert_eq!(got, vec!["1.1", "1.2", "1.3", "2.1", "2.2"]);
    }

    #[test]
    fn test_empty_selection_is_empty_quiz() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(build_quiz(&bank(), &BTreeSet::new(), true, &mut rng).is_empty());

        let unknown = BTreeSet::from([ChapterKey(9)]);
        assert!(build_quiz(&bank(), &unknown, false, &mut rng).is_empty());
    }
}
