use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::BankFault;

/// Display labels assigned to options after relabeling, in order.
pub const LABEL_ALPHABET: [char; 7] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

/// Maximum number of options a question may carry.
pub const MAX_OPTIONS: usize = LABEL_ALPHABET.len();

/// An option label, trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionLabel(String);

impl OptionLabel {
    /// Normalize a raw label. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// The display label at `position` in [`LABEL_ALPHABET`].
    pub fn sequential(position: usize) -> Option<Self> {
        LABEL_ALPHABET
            .get(position)
            .map(|c| Self(c.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OptionLabel {
    type Error = BankFault;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(BankFault::EmptyLabel)
    }
}

impl From<OptionLabel> for String {
    fn from(label: OptionLabel) -> Self {
        label.0
    }
}

/// What an option shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionContent {
    Text(String),
    TextWithImage {
        text: String,
        #[serde(alias = "img")]
        image: String,
    },
}

impl OptionContent {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::TextWithImage { text, .. } => text,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::TextWithImage { image, .. } => Some(image),
        }
    }
}

impl From<&str> for OptionContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A validated bank question.
///
/// The only way to obtain one is [`Question::new`], which rejects option sets
/// the relabeler could not represent, so everything downstream can rely on:
/// one to [`MAX_OPTIONS`] options, unique labels, and a correct set drawn from
/// those labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: String,
    chapter: Option<u32>,
    source: Option<String>,
    prompt: String,
    image: Option<String>,
    comment: Option<String>,
    options: Vec<(OptionLabel, OptionContent)>,
    correct: BTreeSet<OptionLabel>,
}

impl Question {
    pub fn new<L, C>(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = (L, C)>,
        correct: impl IntoIterator<Item = L>,
    ) -> Result<Self, BankFault>
    where
        L: AsRef<str>,
        C: Into<OptionContent>,
    {
        let mut labelled: Vec<(OptionLabel, OptionContent)> = Vec::new();
        for (raw, content) in options {
            let label = OptionLabel::parse(raw.as_ref()).ok_or(BankFault::EmptyLabel)?;
            if labelled.iter().any(|(existing, _)| *existing == label) {
                return Err(BankFault::DuplicateLabel {
                    label: label.to_string(),
                });
            }
            labelled.push((label, content.into()));
        }

        if labelled.is_empty() {
            return Err(BankFault::NoOptions);
        }
        if labelled.len() > MAX_OPTIONS {
            return Err(BankFault::TooManyOptions {
                count: labelled.len(),
                max: MAX_OPTIONS,
            });
        }

        let mut correct_set = BTreeSet::new();
        for raw in correct {
            let label = OptionLabel::parse(raw.as_ref()).ok_or(BankFault::EmptyLabel)?;
            if !labelled.iter().any(|(existing, _)| *existing == label) {
                return Err(BankFault::UnknownCorrectLabel {
                    label: label.to_string(),
                });
            }
            correct_set.insert(label);
        }

        Ok(Self {
            id: id.into(),
            chapter: None,
            source: None,
            prompt: prompt.into(),
            image: None,
            comment: None,
            options: labelled,
            correct: correct_set,
        })
    }

    pub fn with_chapter(mut self, chapter: u32) -> Self {
        self.chapter = Some(chapter);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The explicit chapter field, if the bank gave one.
    pub fn chapter_field(&self) -> Option<u32> {
        self.chapter
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Options in declared order.
    pub fn options(&self) -> &[(OptionLabel, OptionContent)] {
        &self.options
    }

    pub fn correct(&self) -> &BTreeSet<OptionLabel> {
        &self.correct
    }
}
