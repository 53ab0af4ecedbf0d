//! Error types for the quiz engine and entry stores.

use thiserror::Error;

/// Errors raised by the quiz engine.
///
/// `NotEnoughVocabulary` and `InsufficientDistinctVocabulary` are data
/// conditions the caller presents to the learner. The remaining variants
/// mean the caller drove a session out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The pool holds fewer items than a single question needs.
    #[error("not enough vocabulary: need at least {min}, found {found}")]
    NotEnoughVocabulary { found: usize, min: usize },

    /// No target in the pool has three distractors with distinct terms.
    #[error("not enough distinct vocabulary to build any question")]
    InsufficientDistinctVocabulary,

    /// A session was requested with a question limit of zero.
    #[error("question limit must be at least 1")]
    ZeroQuestionLimit,

    /// The selected option does not exist.
    #[error("option {index} is out of range (0..{options})")]
    OptionOutOfRange { index: usize, options: usize },

    /// `advance` was called before the current question was answered.
    #[error("current question has not been answered")]
    NotAnswered,

    /// The session already finished.
    #[error("quiz session is already completed")]
    SessionCompleted,
}

impl QuizError {
    /// Returns `true` for errors caused by the learner's data rather than by
    /// misuse of a session.
    pub fn is_data_condition(&self) -> bool {
        matches!(
            self,
            QuizError::NotEnoughVocabulary { .. } | QuizError::InsufficientDistinctVocabulary
        )
    }
}

/// Errors raised by entry stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry could not be encoded.
    #[error("failed to serialize entries: {0}")]
    Serialization(String),

    /// The backing file exists but does not hold a valid entry list.
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
}
