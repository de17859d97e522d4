use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StudybaseError;

/// Label used whenever a chunk cannot be classified into a known type.
pub const UNKNOWN_TYPE: &str = "unknown";

/// The built-in knowledge-entry taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Concept,
    Principle,
    Quote,
    Example,
    Procedure,
    Question,
    Connection,
    Note,
    Reference,
    Template,
    Unknown,
}

impl EntryType {
    pub fn all() -> &'static [EntryType] {
        &[
            EntryType::Concept,
            EntryType::Principle,
            EntryType::Quote,
            EntryType::Example,
            EntryType::Procedure,
            EntryType::Question,
            EntryType::Connection,
            EntryType::Note,
            EntryType::Reference,
            EntryType::Template,
            EntryType::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Concept => "concept",
            EntryType::Principle => "principle",
            EntryType::Quote => "quote",
            EntryType::Example => "example",
            EntryType::Procedure => "procedure",
            EntryType::Question => "question",
            EntryType::Connection => "connection",
            EntryType::Note => "note",
            EntryType::Reference => "reference",
            EntryType::Template => "template",
            EntryType::Unknown => UNKNOWN_TYPE,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = StudybaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EntryType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| StudybaseError::UnknownEntryType(s.to_string()))
    }
}

/// The set of type labels a classified entry may carry.
///
/// Labels are stored lower-cased; anything outside the set is coerced to
/// [`UNKNOWN_TYPE`] during assembly. `unknown` is always a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedTypes {
    labels: BTreeSet<String>,
}

impl AllowedTypes {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        labels.insert(UNKNOWN_TYPE.to_string());
        Self { labels }
    }

    /// Return the canonical label for `raw` if it is allowed.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        let wanted = raw.trim().to_lowercase();
        self.labels.get(&wanted).map(String::as_str)
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.resolve(raw).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for AllowedTypes {
    fn default() -> Self {
        Self::new(EntryType::all().iter().map(EntryType::as_str))
    }
}
