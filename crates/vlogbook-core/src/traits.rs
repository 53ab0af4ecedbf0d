//! Collaborator interfaces.
//!
//! The quiz engine is pure; everything with I/O sits behind these async
//! traits. `vlogbook-store` implements [`EntryStore`], and
//! `vlogbook-providers` implements [`ContentGenerator`] and
//! [`SpeechSynthesizer`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Entry, GeneratedContent, SelectionAnalysis, SelectionKind};

// ---------------------------------------------------------------------------
// Entry Store
// ---------------------------------------------------------------------------

/// Local persistent store of saved entries, keyed by id.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert an entry, overwriting any entry with the same id.
    async fn put(&self, entry: &Entry) -> anyhow::Result<()>;

    /// All entries ordered by `created_at` ascending (ties by id).
    async fn get_all(&self) -> anyhow::Result<Vec<Entry>>;

    /// Point lookup.
    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<Entry>>;

    /// Remove an entry. Removing an unknown id is not an error.
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
}

/// Sort entries into store order.
pub fn sort_by_creation(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ---------------------------------------------------------------------------
// Content Generator
// ---------------------------------------------------------------------------

/// Backend that turns Chinese text into a Spanish script with extracted
/// vocabulary and grammar.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Translate source text into a spoken-style Spanish script.
    async fn generate(&self, source_text: &str) -> anyhow::Result<GeneratedContent>;

    /// Rewrite an existing script following an instruction, re-extracting
    /// vocabulary and grammar from the new text.
    async fn rewrite(
        &self,
        target_text: &str,
        instruction: &str,
    ) -> anyhow::Result<GeneratedContent>;

    /// Explain a selection from a script as a single vocabulary or grammar
    /// item.
    async fn analyze_selection(
        &self,
        selection: &str,
        context: &str,
        kind: SelectionKind,
    ) -> anyhow::Result<SelectionAnalysis>;
}

// ---------------------------------------------------------------------------
// Speech Synthesizer
// ---------------------------------------------------------------------------

/// Backend that converts text to audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> anyhow::Result<SpeechAudio>;
}

/// Decoded 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechAudio {
    /// Interleaved samples.
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SpeechAudio {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}
