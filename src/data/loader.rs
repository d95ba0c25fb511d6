use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use thiserror::Error;

use super::validate::{BankDiagnostic, BankFault, QuestionBank};
use crate::models::{OptionContent, Question};

/// Failure to produce a usable bank from a file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} contains no valid questions ({rejected} rejected)", path.display())]
    Empty { path: PathBuf, rejected: usize },
}

/// A question record as written in the bank file.
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    pub(crate) id: String,
    #[serde(default)]
    chapter: Option<RawChapter>,
    #[serde(default)]
    source: Option<String>,
    #[serde(alias = "prompt")]
    question: String,
    #[serde(default, alias = "img")]
    image: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(deserialize_with = "options_in_declared_order")]
    options: Vec<(String, OptionContent)>,
    #[serde(default)]
    correct: Vec<String>,
}

/// Any JSON value is accepted; only non-negative integers that fit a `u32`
/// (as numbers or numeric strings) name a chapter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChapter {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl RawChapter {
    fn number(&self) -> Option<u32> {
        match self {
            Self::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f))
                        .map(|f| f as u32)
                }),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl RawQuestion {
    pub(crate) fn into_question(self) -> Result<Question, BankFault> {
        let mut question = Question::new(self.id, self.question, self.options, self.correct)?;

        match self.chapter.as_ref().map(RawChapter::number) {
            Some(Some(chapter)) => question = question.with_chapter(chapter),
            Some(None) => {
                tracing::debug!("question {} has no usable chapter field", question.id())
            }
            None => {}
        }
        if let Some(source) = self.source {
            question = question.with_source(source);
        }
        if let Some(image) = self.image {
            question = question.with_image(image);
        }
        if let Some(comment) = self.comment {
            question = question.with_comment(comment);
        }

        Ok(question)
    }
}

/// Collects a JSON object into `(key, value)` pairs in document order.
fn options_in_declared_order<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, OptionContent)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedOptions;

    impl<'de> Visitor<'de> for OrderedOptions {
        type Value = Vec<(String, OptionContent)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from option label to option content")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedOptions)
}

/// Parse a bank from JSON text.
///
/// The document must be an array. Each element is decoded on its own, so a
/// malformed record becomes a diagnostic instead of failing the whole bank.
pub fn parse_bank(json: &str) -> Result<QuestionBank, serde_json::Error> {
    let records: Vec<Box<RawValue>> = serde_json::from_str(json)?;

    let records = records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_str::<RawQuestion>(raw.get()).map_err(|e| BankDiagnostic {
                index,
                id: record_id(raw),
                fault: BankFault::Malformed {
                    reason: e.to_string(),
                },
            })
        })
        .collect();

    Ok(QuestionBank::from_records(records))
}

/// Best-effort id of a record that failed to decode.
fn record_id(raw: &RawValue) -> Option<String> {
    #[derive(Deserialize)]
    struct IdOnly {
        id: String,
    }

    serde_json::from_str::<IdOnly>(raw.get()).ok().map(|r| r.id)
}

/// Read and validate a bank file, keeping it even when every record was
/// rejected.
pub fn read_bank<P: AsRef<Path>>(path: P) -> Result<QuestionBank, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bank(&json_content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a bank file. A bank left with no valid question is an
/// error.
pub fn load_bank_from_json<P: AsRef<Path>>(path: P) -> Result<QuestionBank, LoadError> {
    let path = path.as_ref();
    let bank = read_bank(path)?;

    if bank.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
            rejected: bank.diagnostics().len(),
        });
    }

    tracing::info!(
        "loaded {} questions from {} ({} rejected)",
        bank.len(),
        path.display(),
        bank.diagnostics().len()
    );

    Ok(bank)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const BANK: &str = r#"[
        {
            "id": "1.1",
            "question": "Which are even?",
            "options": { "d": "4", "a": "1", "c": "2" },
            "correct": ["D", "c"]
        },
        {
            "id": "q2",
            "chapter": "2",
            "source": "Script p.3",
            "prompt": "Pick the picture",
            "comment": "Look closely",
            "options": { "A": { "text": "Cat", "image": "cat.png" }, "B": "Dog" },
            "correct": ["A"]
        },
        {
            "id": "q3",
            "question": "Broken",
            "options": { "A": "x" },
            "correct": ["Z"]
        },
        { "id": "q4" }
    ]"#;

    #[test]
    fn test_options_keep_document_order() {
        let bank = parse_bank(BANK).unwrap();
        let labels: Vec<&str> = bank.questions()[0]
            .options()
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["D", "A", "C"]);
    }

    #[test]
    fn test_optional_fields() {
        let bank = parse_bank(BANK).unwrap();
        let q = &bank.questions()[1];
        assert_eq!(q.chapter_field(), Some(2));
        assert_eq!(q.source(), Some("Script p.3"));
        assert_eq!(q.prompt(), "Pick the picture");
        assert_eq!(q.comment(), Some("Look closely"));
        assert_eq!(q.options()[0].1.image(), Some("cat.png"));
    }

    #[test]
    fn test_bad_records_become_diagnostics() {
        let bank = parse_bank(BANK).unwrap();
        assert_eq!(bank.len(), 2);

        let diagnostics = bank.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].index, 2);
        assert_eq!(
            diagnostics[0].fault,
            BankFault::UnknownCorrectLabel {
                label: "Z".to_string()
            }
        );
        assert_eq!(diagnostics[1].id.as_deref(), Some("q4"));
        assert!(matches!(diagnostics[1].fault, BankFault::Malformed { .. }));
    }

    #[test]
    fn test_unusable_chapter_fields_fall_through() {
        let bank = parse_bank(
            r#"[
                {"id": "a", "chapter": "Intro", "question": "?", "options": {"A": "x"}, "correct": ["A"]},
                {"id": "b", "chapter": 2.0, "question": "?", "options": {"A": "x"}, "correct": ["A"]},
                {"id": "c", "chapter": -1, "question": "?", "options": {"A": "x"}, "correct": ["A"]},
                {"id": "d", "chapter": 2.5, "question": "?", "options": {"A": "x"}, "correct": ["A"]},
                {"id": "e", "chapter": true, "question": "?", "options": {"A": "x"}, "correct": ["A"]}
            ]"#,
        )
        .unwrap();

        assert!(bank.diagnostics().is_empty());
        let chapters: Vec<Option<u32>> = bank.questions().iter().map(|q| q.chapter_field()).collect();
        assert_eq!(chapters, vec![None, Some(2), None, None, None]);
    }

    #[test]
    fn test_not_an_array() {
        assert!(parse_bank(r#"{"questions": []}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BANK.as_bytes()).unwrap();

        let bank = load_bank_from_json(file.path()).unwrap();
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn test_load_rejects_bank_without_valid_questions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"id": "x", "question": "?", "options": {}}]"#)
            .unwrap();

        let err = load_bank_from_json(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Empty { rejected: 1, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_bank_from_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
