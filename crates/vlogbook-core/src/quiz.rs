//! Multiple-choice vocabulary quiz.
//!
//! A session is built from the flattened vocabulary of every saved entry.
//! Each question shows one target term and four meanings: the target's own
//! meaning plus three distractors taken from other terms. The session is a
//! plain value threaded through [`QuizSession::answer`] and
//! [`QuizSession::advance`]; nothing here touches I/O.

use std::fmt;

use crate::error::QuizError;
use crate::model::{Entry, VocabularyItem};
use crate::shuffle::Shuffle;

/// Options shown per question.
pub const OPTION_COUNT: usize = 4;

/// Distractors needed per question.
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Smallest pool a session can be built from.
pub const MIN_POOL_SIZE: usize = OPTION_COUNT;

/// Question limit used when the caller has no preference.
pub const DEFAULT_MAX_QUESTIONS: usize = 10;

/// Flatten the vocabulary of every entry into one pool.
///
/// Entry order and duplicates are preserved: the same term saved in two
/// entries appears twice.
pub fn vocabulary_pool(entries: &[Entry]) -> Vec<VocabularyItem> {
    entries
        .iter()
        .flat_map(|entry| entry.vocabulary.iter().cloned())
        .collect()
}

/// Whether the pool is large enough to start a session.
///
/// A `false` result is a normal state ("not enough words yet"), not an error.
pub fn can_start_session(pool: &[VocabularyItem]) -> bool {
    pool.len() >= MIN_POOL_SIZE
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The vocabulary item being asked about.
    pub target: VocabularyItem,
    /// Meanings in display order. Strings may repeat when two terms share a
    /// meaning; each still occupies its own slot.
    pub options: [String; OPTION_COUNT],
    /// Slot holding the target's meaning. When the meaning appears in more
    /// than one slot this is the first of them.
    pub correct_index: usize,
}

impl Question {
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

/// Build a session of at most `max_questions` questions.
///
/// The pool is permuted once and walked in that order; the permuted order is
/// the question order. Targets that cannot find three distractors with
/// pairwise distinct terms (all different from the target's term) are
/// skipped and do not count toward the limit.
///
/// The randomness source is consumed in a fixed order (pool, then for each
/// visited target its candidates and its options), so a deterministic
/// source yields identical sessions.
pub fn build_session<S: Shuffle>(
    pool: &[VocabularyItem],
    max_questions: usize,
    mut shuffle: S,
) -> Result<QuizSession, QuizError> {
    if !can_start_session(pool) {
        return Err(QuizError::NotEnoughVocabulary {
            found: pool.len(),
            min: MIN_POOL_SIZE,
        });
    }
    if max_questions == 0 {
        return Err(QuizError::ZeroQuestionLimit);
    }

    let mut order: Vec<&VocabularyItem> = pool.iter().collect();
    shuffle.shuffle(&mut order);

    let mut questions = Vec::with_capacity(max_questions.min(pool.len()));
    for target in order {
        if questions.len() == max_questions {
            break;
        }
        match build_question(pool, target, &mut shuffle) {
            Some(question) => questions.push(question),
            None => tracing::debug!(
                term = %target.term,
                "skipping quiz target without enough distinct distractors"
            ),
        }
    }

    if questions.is_empty() {
        return Err(QuizError::InsufficientDistinctVocabulary);
    }

    tracing::debug!(
        questions = questions.len(),
        pool = pool.len(),
        "built quiz session"
    );
    Ok(QuizSession::new(questions))
}

fn build_question<S: Shuffle>(
    pool: &[VocabularyItem],
    target: &VocabularyItem,
    shuffle: &mut S,
) -> Option<Question> {
    let mut candidates: Vec<&VocabularyItem> =
        pool.iter().filter(|item| item.term != target.term).collect();
    shuffle.shuffle(&mut candidates);

    let mut distractors: Vec<&VocabularyItem> = Vec::with_capacity(DISTRACTOR_COUNT);
    for candidate in candidates {
        if distractors.iter().any(|d| d.term == candidate.term) {
            continue;
        }
        distractors.push(candidate);
        if distractors.len() == DISTRACTOR_COUNT {
            break;
        }
    }
    if distractors.len() < DISTRACTOR_COUNT {
        return None;
    }

    let mut options = [
        distractors[0].meaning.clone(),
        distractors[1].meaning.clone(),
        distractors[2].meaning.clone(),
        target.meaning.clone(),
    ];
    shuffle.shuffle(&mut options);
    let correct_index = options.iter().position(|o| *o == target.meaning)?;

    Some(Question {
        target: target.clone(),
        options,
        correct_index,
    })
}

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for an answer to the current question.
    Unanswered,
    /// The current question was answered; waiting for `advance`.
    Answered,
    /// Terminal. The score is final.
    Completed,
}

/// The recorded answer to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Option the learner picked.
    pub selected: usize,
    /// Option holding the right meaning.
    pub correct_index: usize,
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        self.selected == self.correct_index
    }
}

/// Final result of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub total: usize,
}

impl QuizResult {
    /// Score as a percentage of the questions asked.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for QuizResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.score, self.total)
    }
}

/// An in-progress or finished review session.
///
/// Transitions only move forward: answer the current question, advance,
/// repeat, until advancing past the last question completes the session.
/// To start over, build a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    answered_current: Option<usize>,
    completed: bool,
}

impl QuizSession {
    fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current_index: 0,
            score: 0,
            answered_current: None,
            completed: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answered_current(&self) -> Option<usize> {
        self.answered_current
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The question being asked, or `None` once completed.
    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.completed {
            SessionPhase::Completed
        } else if self.answered_current.is_some() {
            SessionPhase::Answered
        } else {
            SessionPhase::Unanswered
        }
    }

    /// The final result, available once the session is completed.
    pub fn result(&self) -> Option<QuizResult> {
        self.completed.then(|| QuizResult {
            score: self.score,
            total: self.questions.len(),
        })
    }

    /// Record an answer to the current question.
    ///
    /// Scores one point when `option` is the correct slot. A second call
    /// before [`advance`](Self::advance) changes nothing and reports the
    /// answer already recorded.
    pub fn answer(&mut self, option: usize) -> Result<AnswerOutcome, QuizError> {
        if self.completed {
            return Err(QuizError::SessionCompleted);
        }
        if option >= OPTION_COUNT {
            return Err(QuizError::OptionOutOfRange {
                index: option,
                options: OPTION_COUNT,
            });
        }

        let correct_index = self.questions[self.current_index].correct_index;
        if let Some(selected) = self.answered_current {
            return Ok(AnswerOutcome {
                selected,
                correct_index,
            });
        }

        self.answered_current = Some(option);
        let outcome = AnswerOutcome {
            selected: option,
            correct_index,
        };
        if outcome.is_correct() {
            self.score += 1;
        }
        Ok(outcome)
    }

    /// Move past the answered question, completing the session after the
    /// last one.
    pub fn advance(&mut self) -> Result<SessionPhase, QuizError> {
        if self.completed {
            return Err(QuizError::SessionCompleted);
        }
        if self.answered_current.is_none() {
            return Err(QuizError::NotAnswered);
        }

        if self.is_last_question() {
            self.completed = true;
        } else {
            self.current_index += 1;
            self.answered_current = None;
        }
        Ok(self.phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeneratedContent;
    use crate::shuffle::{NoShuffle, RandomShuffle};

    fn item(term: &str, meaning: &str) -> VocabularyItem {
        VocabularyItem::new(term, meaning, format!("… {term} …"))
    }

    fn letters(terms: &str) -> Vec<VocabularyItem> {
        terms
            .chars()
            .map(|c| item(&c.to_string(), &c.to_lowercase().to_string()))
            .collect()
    }

    fn answer_all(session: &mut QuizSession, pick: impl Fn(&Question) -> usize) {
        while let Some(question) = session.current_question() {
            let option = pick(question);
            session.answer(option).unwrap();
            session.advance().unwrap();
        }
    }

    #[test]
    fn pool_flattens_entries_keeping_duplicates() {
        let entries = vec![
            Entry::new(
                "一",
                GeneratedContent {
                    target_text: "uno".into(),
                    vocabulary: vec![item("hola", "你好"), item("casa", "房子")],
                    grammar: vec![],
                },
            ),
            Entry::new(
                "二",
                GeneratedContent {
                    target_text: "dos".into(),
                    vocabulary: vec![item("hola", "你好")],
                    grammar: vec![],
                },
            ),
        ];
        let pool = vocabulary_pool(&entries);
        let terms: Vec<_> = pool.iter().map(|v| v.term.as_str()).collect();
        assert_eq!(terms, ["hola", "casa", "hola"]);
    }

    #[test]
    fn small_pools_cannot_start() {
        for n in 0..MIN_POOL_SIZE {
            let pool = letters(&"ABCDEFG"[..n]);
            assert!(!can_start_session(&pool));
            assert_eq!(
                build_session(&pool, 10, NoShuffle).unwrap_err(),
                QuizError::NotEnoughVocabulary { found: n, min: 4 }
            );
        }
        assert!(can_start_session(&letters("ABCD")));
    }

    #[test]
    fn five_item_pool_in_fixed_order() {
        let pool = letters("CAEBD");
        let session = build_session(&pool, DEFAULT_MAX_QUESTIONS, NoShuffle).unwrap();

        assert_eq!(session.len(), 5);
        let targets: Vec<_> = session
            .questions()
            .iter()
            .map(|q| q.target.term.as_str())
            .collect();
        assert_eq!(targets, ["C", "A", "E", "B", "D"]);

        let first = &session.questions()[0];
        assert_eq!(first.options, ["a", "e", "b", "c"].map(String::from));
        assert_eq!(first.correct_index, 3);

        let last = &session.questions()[4];
        assert_eq!(last.options, ["c", "a", "e", "d"].map(String::from));
    }

    #[test]
    fn question_count_is_capped() {
        let pool = letters("ABCDEFGHIJKLMNOP");
        let session = build_session(&pool, 10, RandomShuffle::seeded(1)).unwrap();
        assert_eq!(session.len(), 10);

        let session = build_session(&letters("ABCDE"), 3, NoShuffle).unwrap();
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn zero_question_limit_is_rejected() {
        assert_eq!(
            build_session(&letters("ABCD"), 0, NoShuffle).unwrap_err(),
            QuizError::ZeroQuestionLimit
        );
    }

    #[test]
    fn questions_are_well_formed_across_seeds() {
        let mut pool = letters("ABCDEFG");
        pool.push(item("A", "a")); // same term from another entry
        pool.push(item("H", "b")); // meaning shared with B

        for seed in 0..50 {
            let session = build_session(&pool, 10, RandomShuffle::seeded(seed)).unwrap();
            assert!(session.len() <= pool.len().min(10));
            for q in session.questions() {
                assert_eq!(q.options.len(), OPTION_COUNT);
                assert!(q.correct_index < OPTION_COUNT);
                assert_eq!(q.options[q.correct_index], q.target.meaning);
                let first = q.options.iter().position(|o| *o == q.target.meaning);
                assert_eq!(first, Some(q.correct_index));
            }
        }
    }

    #[test]
    fn distractors_never_share_the_target_term() {
        let pool = vec![
            item("A", "a1"),
            item("A", "a2"),
            item("B", "b"),
            item("C", "c"),
            item("D", "d"),
        ];
        let session = build_session(&pool, 10, NoShuffle).unwrap();
        assert_eq!(session.len(), 5);

        // Target A (first copy): candidates B, C, D.
        let q = &session.questions()[0];
        assert_eq!(q.options, ["b", "c", "d", "a1"].map(String::from));

        // Target B: candidates A, A, C, D; the second A is not reused.
        let q = &session.questions()[2];
        assert_eq!(q.target.term, "B");
        assert_eq!(q.options, ["a1", "c", "d", "b"].map(String::from));
    }

    #[test]
    fn too_few_distinct_terms_fails() {
        let pool = vec![item("A", "a"), item("A", "a"), item("B", "b"), item("C", "c")];
        assert!(can_start_session(&pool));
        assert_eq!(
            build_session(&pool, 10, NoShuffle).unwrap_err(),
            QuizError::InsufficientDistinctVocabulary
        );
        assert!(QuizError::InsufficientDistinctVocabulary.is_data_condition());
    }

    #[test]
    fn seeded_sessions_are_identical() {
        let pool = letters("ABCDEFGHIJKL");
        let a = build_session(&pool, 10, RandomShuffle::seeded(99)).unwrap();
        let b = build_session(&pool, 10, RandomShuffle::seeded(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn shared_meaning_resolves_to_first_slot() {
        let pool = vec![
            item("A", "igual"),
            item("B", "igual"),
            item("C", "c"),
            item("D", "d"),
        ];
        let session = build_session(&pool, 10, NoShuffle).unwrap();
        let q = &session.questions()[0];
        assert_eq!(q.target.term, "A");
        assert_eq!(q.options, ["igual", "c", "d", "igual"].map(String::from));
        assert_eq!(q.correct_index, 0);
        assert!(q.is_correct(0));
        assert!(!q.is_correct(3));

        let mut first_slot = session.clone();
        assert!(first_slot.answer(0).unwrap().is_correct());
        assert_eq!(first_slot.score(), 1);

        let mut second_slot = session;
        assert!(!second_slot.answer(3).unwrap().is_correct());
        assert_eq!(second_slot.score(), 0);
    }

    #[test]
    fn second_answer_is_ignored() {
        let mut session = build_session(&letters("ABCDE"), 10, NoShuffle).unwrap();
        let correct = session.current_question().unwrap().correct_index;
        let wrong = (correct + 1) % OPTION_COUNT;

        let first = session.answer(correct).unwrap();
        assert!(first.is_correct());
        assert_eq!(session.score(), 1);

        let again = session.answer(correct).unwrap();
        assert_eq!(again, first);
        assert_eq!(session.score(), 1);

        let other = session.answer(wrong).unwrap();
        assert_eq!(other.selected, correct);
        assert_eq!(session.score(), 1);
        assert_eq!(session.answered_current(), Some(correct));
    }

    #[test]
    fn session_runs_to_completion() {
        let mut session = build_session(&letters("ABCDE"), 10, RandomShuffle::seeded(3)).unwrap();
        assert_eq!(session.phase(), SessionPhase::Unanswered);
        assert!(session.result().is_none());

        let mut last_score = 0;
        let mut asked = 0;
        while let Some(question) = session.current_question() {
            // Alternate right and wrong answers.
            let option = if asked % 2 == 0 {
                question.correct_index
            } else {
                (question.correct_index + 1) % OPTION_COUNT
            };
            session.answer(option).unwrap();
            assert_eq!(session.phase(), SessionPhase::Answered);
            assert!(session.score() >= last_score);
            last_score = session.score();
            session.advance().unwrap();
            asked += 1;
        }

        assert_eq!(asked, 5);
        assert!(session.is_completed());
        assert_eq!(session.phase(), SessionPhase::Completed);
        let result = session.result().unwrap();
        assert_eq!(result, QuizResult { score: 3, total: 5 });
        assert_eq!(result.to_string(), "3/5");
        assert!((result.percentage() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn perfect_run_scores_every_question() {
        let mut session = build_session(&letters("ABCDEFGH"), 6, RandomShuffle::seeded(8)).unwrap();
        answer_all(&mut session, |q| q.correct_index);
        let result = session.result().unwrap();
        assert_eq!(result.score as usize, result.total);
        assert_eq!(result.total, 6);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut session = build_session(&letters("ABCD"), 10, NoShuffle).unwrap();
        assert_eq!(session.advance().unwrap_err(), QuizError::NotAnswered);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let mut session = build_session(&letters("ABCD"), 10, NoShuffle).unwrap();
        assert_eq!(
            session.answer(4).unwrap_err(),
            QuizError::OptionOutOfRange {
                index: 4,
                options: 4
            }
        );
        assert_eq!(session.answered_current(), None);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn completed_session_rejects_everything() {
        let mut session = build_session(&letters("ABCD"), 1, NoShuffle).unwrap();
        assert!(session.is_last_question());
        session.answer(0).unwrap();
        assert_eq!(session.advance().unwrap(), SessionPhase::Completed);

        assert!(session.current_question().is_none());
        assert_eq!(session.answer(0).unwrap_err(), QuizError::SessionCompleted);
        assert_eq!(session.advance().unwrap_err(), QuizError::SessionCompleted);
        assert!(!QuizError::SessionCompleted.is_data_condition());
    }
}
