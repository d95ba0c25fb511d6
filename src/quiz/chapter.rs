use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::models::Question;

/// Grouping key used to scope a session to part of the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChapterKey(pub u32);

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chapter {}", self.0)
    }
}

/// Chapter of a question: the leading integer of an id like `"3.14"`, else the
/// explicit chapter field, else none.
pub fn chapter_of(question: &Question) -> Option<ChapterKey> {
    id_prefix(question.id())
        .or(question.chapter_field())
        .map(ChapterKey)
}

fn id_prefix(id: &str) -> Option<u32> {
    let digits = id.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || id.as_bytes().get(digits) != Some(&b'.') {
        return None;
    }
    id[..digits].parse().ok()
}

/// Distinct chapters present in `questions`, ascending.
pub fn available_chapters(questions: &[Question]) -> Vec<ChapterKey> {
    questions
        .iter()
        .filter_map(chapter_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> Question {
        Question::new(id, "?", [("A", "x")], ["A"]).unwrap()
    }

    #[test]
    fn test_id_prefix() {
        assert_eq!(chapter_of(&question("3.14")), Some(ChapterKey(3)));
        assert_eq!(chapter_of(&question("12.")), Some(ChapterKey(12)));
        assert_eq!(chapter_of(&question("007.1")), Some(ChapterKey(7)));
    }

    #[test]
    fn test_prefix_requires_dot() {
        assert_eq!(chapter_of(&question("3-1")), None);
        assert_eq!(chapter_of(&question("q1")), None);
        assert_eq!(chapter_of(&question(".5")), None);
        assert_eq!(chapter_of(&question("99999999999.1")), None);
    }

    #[test]
    fn test_explicit_field_is_fallback() {
        assert_eq!(
            chapter_of(&question("q1").with_chapter(4)),
            Some(ChapterKey(4))
        );
        assert_eq!(
            chapter_of(&question("2.1").with_chapter(4)),
            Some(ChapterKey(2))
        );
    }

    #[test]
    fn test_available_chapters_sorted_and_distinct() {
        let questions = vec![
            question("2.1"),
            question("1.1"),
            question("2.2"),
            question("misc"),
        ];
        assert_eq!(
            available_chapters(&questions),
            vec![ChapterKey(1), ChapterKey(2)]
        );
    }
}
