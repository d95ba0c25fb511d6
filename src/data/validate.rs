//! Bank validation.
//!
//! Every raw record is checked once, at load time. A record that breaks a
//! data-integrity rule is dropped from the bank and reported as a
//! [`BankDiagnostic`]; the rest of the bank stays usable.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::loader::RawQuestion;
use crate::models::Question;

/// Why a bank record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BankFault {
    /// The record is not a question object at all.
    #[error("malformed record: {reason}")]
    Malformed { reason: String },

    /// Another question already uses this id.
    #[error("duplicate question id '{id}'")]
    DuplicateId { id: String },

    /// An option label is blank.
    #[error("option label is empty")]
    EmptyLabel,

    /// Two options normalize to the same label.
    #[error("option label '{label}' appears more than once")]
    DuplicateLabel { label: String },

    #[error("question has no options")]
    NoOptions,

    /// More options than display labels.
    #[error("{count} options exceed the supported maximum of {max}")]
    TooManyOptions { count: usize, max: usize },

    /// A correct label names no option.
    #[error("correct label '{label}' is not one of the options")]
    UnknownCorrectLabel { label: String },
}

/// A rejected record, by position in the bank file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankDiagnostic {
    pub index: usize,
    pub id: Option<String>,
    pub fault: BankFault,
}

impl std::fmt::Display for BankDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "#{} [{}]: {}", self.index + 1, id, self.fault),
            None => write!(f, "#{}: {}", self.index + 1, self.fault),
        }
    }
}

/// The validated, read-only question bank.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    diagnostics: Vec<BankDiagnostic>,
}

impl QuestionBank {
    /// Build a bank from already-constructed questions. Later duplicates of
    /// an id are rejected.
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut bank = Self::default();
        let mut seen = HashSet::new();
        for (index, question) in questions.into_iter().enumerate() {
            bank.admit(index, Ok(question), &mut seen);
        }
        bank
    }

    pub(crate) fn from_records(records: Vec<Result<RawQuestion, BankDiagnostic>>) -> Self {
        let mut bank = Self::default();
        let mut seen = HashSet::new();

        for (index, record) in records.into_iter().enumerate() {
            let question = match record {
                Ok(raw) => {
                    let id = raw.id.clone();
                    raw.into_question().map_err(|fault| BankDiagnostic {
                        index,
                        id: Some(id),
                        fault,
                    })
                }
                Err(diagnostic) => Err(diagnostic),
            };
            bank.admit(index, question, &mut seen);
        }

        bank
    }

    fn admit(
        &mut self,
        index: usize,
        question: Result<Question, BankDiagnostic>,
        seen: &mut HashSet<String>,
    ) {
        let question = question.and_then(|q| {
            if seen.insert(q.id().to_string()) {
                Ok(q)
            } else {
                Err(BankDiagnostic {
                    index,
                    id: Some(q.id().to_string()),
                    fault: BankFault::DuplicateId {
                        id: q.id().to_string(),
                    },
                })
            }
        });

        match question {
            Ok(q) => self.questions.push(q),
            Err(diagnostic) => {
                tracing::warn!("rejecting bank record {}", diagnostic);
                self.diagnostics.push(diagnostic);
            }
        }
    }

    /// Accepted questions, in bank order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn diagnostics(&self) -> &[BankDiagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> Question {
        Question::new(id, "?", [("A", "yes"), ("B", "no")], ["A"]).unwrap()
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let bank = QuestionBank::new([question("1.1"), question("1.2"), question("1.1")]);

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.diagnostics().len(), 1);
        assert_eq!(bank.diagnostics()[0].index, 2);
        assert_eq!(
            bank.diagnostics()[0].fault,
            BankFault::DuplicateId {
                id: "1.1".to_string()
            }
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = BankDiagnostic {
            index: 0,
            id: Some("q9".to_string()),
            fault: BankFault::NoOptions,
        };
        assert_eq!(diagnostic.to_string(), "#1 [q9]: question has no options");
    }

    #[test]
    fn test_fault_serialization() {
        let fault = BankFault::TooManyOptions { count: 9, max: 7 };
        let json = serde_json::to_string(&fault).unwrap();
        assert!(json.contains("\"kind\":\"too_many_options\""));
        assert!(json.contains("\"count\":9"));
    }
}
