//! Option relabeling.
//!
//! After an optional shuffle, options are renamed `A`, `B`, `C`, ... by
//! position, and the correct set is carried over to the new names. Each
//! relabeled option keeps a back-reference to its original label.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;

use super::shuffle::shuffled;
use crate::models::{OptionContent, OptionLabel, Question};

/// One option as displayed in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelabeledOption {
    pub label: OptionLabel,
    pub content: OptionContent,
    /// Label the option carries in the bank.
    pub origin: OptionLabel,
}

/// A question's options after relabeling, with the remapped correct set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPack {
    options: Vec<RelabeledOption>,
    correct: BTreeSet<OptionLabel>,
}

impl OptionPack {
    pub fn options(&self) -> &[RelabeledOption] {
        &self.options
    }

    /// Display labels of the correct options.
    pub fn correct(&self) -> &BTreeSet<OptionLabel> {
        &self.correct
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_correct(&self, label: &OptionLabel) -> bool {
        self.correct.contains(label)
    }

    pub fn option(&self, label: &OptionLabel) -> Option<&RelabeledOption> {
        self.options.iter().find(|o| o.label == *label)
    }

    pub fn contains(&self, label: &OptionLabel) -> bool {
        self.option(label).is_some()
    }

    /// Bank label behind a display label.
    pub fn origin_of(&self, label: &OptionLabel) -> Option<&OptionLabel> {
        self.option(label).map(|o| &o.origin)
    }

    /// Display label given to a bank label.
    pub fn label_for(&self, origin: &OptionLabel) -> Option<&OptionLabel> {
        self.options
            .iter()
            .find(|o| o.origin == *origin)
            .map(|o| &o.label)
    }

    /// Bank labels of the correct options.
    pub fn correct_origins(&self) -> BTreeSet<&OptionLabel> {
        self.correct
            .iter()
            .filter_map(|label| self.origin_of(label))
            .collect()
    }

    /// Display label at `index`.
    pub fn label_at(&self, index: usize) -> Option<&OptionLabel> {
        self.options.get(index).map(|o| &o.label)
    }
}

/// Relabel `question`'s options, shuffling them first when `shuffle` is set.
///
/// With `shuffle == false` the result depends only on the question.
pub fn relabel<R: Rng + ?Sized>(question: &Question, shuffle: bool, rng: &mut R) -> OptionPack {
    let ordered = if shuffle {
        shuffled(question.options(), rng)
    } else {
        question.options().to_vec()
    };

    // `Question` caps options at the alphabet size, so every position has a label.
    let options: Vec<RelabeledOption> = ordered
        .into_iter()
        .enumerate()
        .filter_map(|(position, (origin, content))| {
            OptionLabel::sequential(position).map(|label| RelabeledOption {
                label,
                content,
                origin,
            })
        })
        .collect();

    let renamed: HashMap<&OptionLabel, &OptionLabel> =
        options.iter().map(|o| (&o.origin, &o.label)).collect();

    let correct = question
        .correct()
        .iter()
        .filter_map(|origin| renamed.get(origin).map(|label| (*label).clone()))
        .collect();

    OptionPack { options, correct }
}

/// Packs for a whole quiz, rebuilt only when the quiz or the shuffle setting
/// changes.
#[derive(Debug, Default)]
pub struct OptionPackCache {
    key: Option<(u64, bool)>,
    packs: Vec<OptionPack>,
}

impl OptionPackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs for `quiz`, identified by `generation`. Returns `true` alongside
    /// when they had to be rebuilt.
    pub fn get_or_build<R: Rng + ?Sized>(
        &mut self,
        generation: u64,
        quiz: &[Question],
        shuffle: bool,
        rng: &mut R,
    ) -> (&[OptionPack], bool) {
        let key = (generation, shuffle);
        let rebuilt = self.key != Some(key);
        if rebuilt {
            tracing::debug!(generation, shuffle, "rebuilding option packs");
            self.packs = quiz.iter().map(|q| relabel(q, shuffle, rng)).collect();
            self.key = Some(key);
        }
        (&self.packs, rebuilt)
    }

    /// Cached packs, whatever key they were built for.
    pub fn packs(&self) -> &[OptionPack] {
        &self.packs
    }

    pub fn shuffled(&self) -> Option<bool> {
        self.key.map(|(_, shuffle)| shuffle)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn label(s: &str) -> OptionLabel {
        OptionLabel::parse(s).unwrap()
    }

    fn wide_question() -> Question {
        Question::new(
            "1.1",
            "Which statements are correct?",
            [
                ("p", "Option P"),
                ("q", "Option Q"),
                ("r", "Option R"),
                ("s", "Option S"),
                ("t", "Option T"),
                ("u", "Option U"),
                ("v", "Option V"),
            ],
            ["q", "s", "v"],
        )
        .unwrap()
    }

    #[test]
    fn test_declared_order_gets_sequential_labels() {
        let mut rng = StdRng::seed_from_u64(0);
        let q = Question::new("q2", "?", [("x", "Red"), ("y", "Blue"), ("z", "Green")], ["y"])
            .unwrap();

        let pack = relabel(&q, false, &mut rng);
        let labels: Vec<&str> = pack.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(pack.options()[1].content.text(), "Blue");
        assert_eq!(pack.correct(), &BTreeSet::from([label("B")]));
    }

    #[test]
    fn test_unshuffled_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(0);
        let q = wide_question();
        assert_eq!(relabel(&q, false, &mut rng), relabel(&q, false, &mut rng));
    }

    #[test]
    fn test_correct_set_survives_shuffle() {
        let q = wide_question();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pack = relabel(&q, true, &mut rng);

            assert_eq!(pack.correct().len(), q.correct().len());
            for new in pack.correct() {
                assert!(pack.contains(new));
                assert!(q.correct().contains(pack.origin_of(new).unwrap()));
            }
            assert_eq!(
                pack.correct_origins(),
                q.correct().iter().collect::<BTreeSet<_>>()
            );
        }
    }

    #[test]
    fn test_origin_round_trip_recovers_options() {
        let q = wide_question();
        let mut rng = StdRng::seed_from_u64(99);
        let pack = relabel(&q, true, &mut rng);

        let recovered: BTreeMap<OptionLabel, OptionContent> = pack
            .options()
            .iter()
            .map(|o| (o.origin.clone(), o.content.clone()))
            .collect();
        let original: BTreeMap<OptionLabel, OptionContent> =
            q.options().iter().cloned().collect();
        assert_eq!(recovered, original);

        for (origin, _) in q.options() {
            let new = pack.label_for(origin).unwrap();
            assert_eq!(pack.origin_of(new), Some(origin));
        }
    }

    #[test]
    fn test_cache_reuses_packs_until_key_changes() {
        let quiz = vec![wide_question()];
        let mut cache = OptionPackCache::new();
        let mut rng = StdRng::seed_from_u64(3);

        let (first, rebuilt) = cache.get_or_build(1, &quiz, true, &mut rng);
        let first = first.to_vec();
        assert!(rebuilt);

        for _ in 0..10 {
            let (again, rebuilt) = cache.get_or_build(1, &quiz, true, &mut rng);
            assert!(!rebuilt);
            assert_eq!(again, first.as_slice());
        }

        let (_, rebuilt) = cache.get_or_build(1, &quiz, false, &mut rng);
        assert!(rebuilt);
        let (_, rebuilt) = cache.get_or_build(2, &quiz, false, &mut rng);
        assert!(rebuilt);
        assert_eq!(cache.shuffled(), Some(false));
    }
}
