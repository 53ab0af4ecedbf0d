//! vlogbook-core — Data model, quiz engine, and collaborator traits.
//!
//! This crate holds everything that does not touch the network or disk: the
//! entry model, the multiple-choice vocabulary quiz, and the traits the
//! store and provider crates implement.

pub mod error;
pub mod model;
pub mod quiz;
pub mod shuffle;
pub mod traits;

pub use error::{QuizError, StoreError};
pub use model::{
    Entry, GeneratedContent, GrammarItem, SelectionAnalysis, SelectionKind, VocabularyItem,
};
pub use quiz::{build_session, can_start_session, vocabulary_pool, Question, QuizSession};
pub use shuffle::{NoShuffle, RandomShuffle, Shuffle};
