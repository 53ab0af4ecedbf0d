//! Deterministic offline backends.
//!
//! Used by tests and by the `mock` backend setting, so the whole journal and
//! quiz flow can run without network access.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vlogbook_core::model::{
    GeneratedContent, GrammarItem, SelectionAnalysis, SelectionKind, VocabularyItem,
};
use vlogbook_core::traits::{ContentGenerator, SpeechAudio, SpeechSynthesizer};

use crate::audio::DEFAULT_SAMPLE_RATE;

/// A mock content generator that always returns the same script.
pub struct MockGenerator {
    content: GeneratedContent,
    call_count: AtomicU32,
    last_input: Mutex<Option<String>>,
}

impl MockGenerator {
    /// A generator returning a short park-walk script with five vocabulary
    /// items.
    pub fn new() -> Self {
        Self::with_fixed_content(sample_content())
    }

    pub fn with_fixed_content(content: GeneratedContent) -> Self {
        Self {
            content,
            call_count: AtomicU32::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Number of calls made to any generator method.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last source text, instruction, or selection received.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|g| g.clone())
    }

    fn record(&self, input: &str) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(input.to_string());
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_content() -> GeneratedContent {
    let script = "¡Hola a todos! Hoy di un paseo por el parque. Hacía muy buen tiempo \
                  y los árboles estaban verdes. Después tomé un café con una amiga.";
    let vocab = |term: &str, meaning: &str, context: &str| VocabularyItem::new(term, meaning, context);
    GeneratedContent {
        target_text: script.to_string(),
        vocabulary: vec![
            vocab("paseo", "散步", "Hoy di un paseo por el parque."),
            vocab("parque", "公园", "Hoy di un paseo por el parque."),
            vocab("tiempo", "天气", "Hacía muy buen tiempo."),
            vocab("árboles", "树", "Los árboles estaban verdes."),
            vocab("amiga", "女性朋友", "Tomé un café con una amiga."),
        ],
        grammar: vec![GrammarItem {
            point: "Pretérito indefinido".into(),
            explanation: "表示过去已完成的动作".into(),
            example: "Hoy di un paseo".into(),
        }],
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, source_text: &str) -> anyhow::Result<GeneratedContent> {
        self.record(source_text);
        Ok(self.content.clone())
    }

    async fn rewrite(
        &self,
        target_text: &str,
        instruction: &str,
    ) -> anyhow::Result<GeneratedContent> {
        self.record(instruction);
        Ok(GeneratedContent {
            target_text: format!("{target_text} ({instruction})"),
            ..self.content.clone()
        })
    }

    async fn analyze_selection(
        &self,
        selection: &str,
        context: &str,
        kind: SelectionKind,
    ) -> anyhow::Result<SelectionAnalysis> {
        self.record(selection);
        let sentence = context
            .split_inclusive(['.', '!', '?'])
            .map(str::trim)
            .find(|s| s.contains(selection))
            .unwrap_or(selection)
            .to_string();

        Ok(match kind {
            SelectionKind::Vocab => SelectionAnalysis::Vocabulary(VocabularyItem::new(
                selection,
                format!("「{selection}」的意思"),
                sentence,
            )),
            SelectionKind::Grammar => SelectionAnalysis::Grammar(GrammarItem {
                point: format!("Uso de «{selection}»"),
                explanation: format!("「{selection}」的语法说明"),
                example: sentence,
            }),
        })
    }
}

/// A mock speech synthesizer producing silence, or failing on demand.
pub struct MockSpeech {
    fail: bool,
    call_count: AtomicU32,
}

impl MockSpeech {
    /// Ten milliseconds of silence per character.
    pub fn new() -> Self {
        Self {
            fail: false,
            call_count: AtomicU32::new(0),
        }
    }

    /// Every call returns an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for MockSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str) -> anyhow::Result<SpeechAudio> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            anyhow::bail!("mock speech failure");
        }
        let per_char = (DEFAULT_SAMPLE_RATE / 100) as usize;
        Ok(SpeechAudio {
            samples: vec![0; text.chars().count() * per_char],
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
        })
    }
}
