//! Core data model types for vlogbook.
//!
//! An [`Entry`] is one saved vlog: the learner's Chinese source text, the
//! generated Spanish script, and the vocabulary and grammar items extracted
//! from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vocabulary item extracted from a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// The Spanish word or phrase.
    #[serde(rename = "word")]
    pub term: String,
    /// Meaning in the learner's language.
    pub meaning: String,
    /// The sentence the term appeared in, or an example.
    #[serde(default)]
    pub context: String,
}

impl VocabularyItem {
    pub fn new(
        term: impl Into<String>,
        meaning: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            term: term.into(),
            meaning: meaning.into(),
            context: context.into(),
        }
    }
}

/// A grammar point extracted from a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarItem {
    /// Name of the grammar rule.
    pub point: String,
    /// Explanation in the learner's language.
    pub explanation: String,
    /// Usage taken from the script.
    #[serde(default)]
    pub example: String,
}

/// Output of the content generator for a full script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    /// The Spanish script.
    pub target_text: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    pub grammar: Vec<GrammarItem>,
}

/// Which kind of item a selection analysis should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Vocab,
    Grammar,
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKind::Vocab => write!(f, "vocab"),
            SelectionKind::Grammar => write!(f, "grammar"),
        }
    }
}

impl FromStr for SelectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vocab" | "vocabulary" | "word" => Ok(SelectionKind::Vocab),
            "grammar" => Ok(SelectionKind::Grammar),
            other => Err(format!("unknown selection kind: {other}")),
        }
    }
}

/// Result of analysing a text selection inside a script.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionAnalysis {
    Vocabulary(VocabularyItem),
    Grammar(GrammarItem),
}

/// A saved vlog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// The learner's original text.
    pub source_text: String,
    /// The generated Spanish script.
    pub target_text: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    pub grammar: Vec<GrammarItem>,
}

impl Entry {
    /// Create a new entry from freshly generated content, stamped with a new
    /// id and the current time.
    pub fn new(source_text: impl Into<String>, content: GeneratedContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            source_text: source_text.into(),
            target_text: content.target_text,
            vocabulary: content.vocabulary,
            grammar: content.grammar,
        }
    }

    /// Replace the script and its extracted items with a rewritten version.
    ///
    /// A rewrite re-extracts vocabulary and grammar from the new text, so the
    /// previous items are dropped. Identity and source text are kept.
    pub fn apply_rewrite(&mut self, content: GeneratedContent) {
        self.target_text = content.target_text;
        self.vocabulary = content.vocabulary;
        self.grammar = content.grammar;
    }

    /// Append the result of a selection analysis.
    pub fn attach(&mut self, analysis: SelectionAnalysis) {
        match analysis {
            SelectionAnalysis::Vocabulary(item) => self.vocabulary.push(item),
            SelectionAnalysis::Grammar(item) => self.grammar.push(item),
        }
    }
}
