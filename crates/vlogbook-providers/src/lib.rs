//! vlogbook-providers — content generation and speech synthesis backends.
//!
//! Implements the `ContentGenerator` and `SpeechSynthesizer` traits for
//! Google Gemini, plus deterministic mocks, configuration loading, and the
//! retry helper shared by every provider call.

pub mod audio;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod payload;
pub mod prompt;
pub mod retry;

pub use config::{
    create_generator, create_synthesizer, load_config_from, Backend, GeminiConfig, VlogbookConfig,
};
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use retry::{with_retry, RetryPolicy};
