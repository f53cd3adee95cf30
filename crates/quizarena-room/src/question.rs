//! Question snapshots and the question provider seam.
//!
//! QuizArena does not own question content. A [`QuestionProvider`] hands
//! the engine a difficulty-filtered pool; the engine shuffles it and
//! copies the selected questions into the room so later edits to the
//! content source never change a running battle.

use std::future::Future;

use quizarena_protocol::{Codec, JsonCodec, ProtocolError};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// A multiple-choice question as dealt into a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub statement: String,
    pub options: [String; OPTION_COUNT],
    /// Index into `options`.
    pub correct_answer: usize,
    pub topic: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Question {
    pub fn is_correct(&self, selected_answer: usize) -> bool {
        selected_answer == self.correct_answer
    }

    /// Rejects questions whose correct answer points past the options.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.correct_answer >= OPTION_COUNT {
            return Err(ProtocolError::Invalid(format!(
                "question {:?} has correct answer {} but only {} options",
                self.statement, self.correct_answer, OPTION_COUNT
            )));
        }
        Ok(())
    }
}

/// Errors from a question source.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The source could not be reached (network, storage, ...).
    #[error("question source unavailable: {0}")]
    Unavailable(String),

    /// The source answered with data that isn't a valid question set.
    #[error("invalid question data: {0}")]
    Invalid(#[from] ProtocolError),
}

/// Supplies question pools filtered by difficulty.
///
/// The engine treats this as a read-only call that may fail. On failure
/// the battle does not start and the room is left untouched.
///
/// # Example
///
/// ```rust
/// use quizarena_room::{Difficulty, ProviderError, Question, QuestionProvider};
///
/// /// A provider that is always down.
/// struct Offline;
///
/// impl QuestionProvider for Offline {
///     async fn fetch_questions(
///         &self,
///         _difficulty: Difficulty,
///     ) -> Result<Vec<Question>, ProviderError> {
///         Err(ProviderError::Unavailable("offline".into()))
///     }
/// }
/// ```
pub trait QuestionProvider: Send + Sync + 'static {
    /// Returns every available question at `difficulty`, in source order.
    fn fetch_questions(
        &self,
        difficulty: Difficulty,
    ) -> impl Future<Output = Result<Vec<Question>, ProviderError>> + Send;
}

/// Picks `count` questions from `pool` in uniformly random order.
///
/// Returns fewer than `count` when the pool is smaller.
pub fn select_questions<R: Rng + ?Sized>(
    mut pool: Vec<Question>,
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

// ---------------------------------------------------------------------------
// QuestionBank
// ---------------------------------------------------------------------------

/// An in-memory [`QuestionProvider`] over a fixed question list.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Loads a JSON array of questions, validating each one.
    pub fn from_json(data: &[u8]) -> Result<Self, ProviderError> {
        let questions: Vec<Question> = JsonCodec.decode(data)?;
        for q in &questions {
            q.validate()?;
        }
        tracing::debug!(count = questions.len(), "question bank loaded");
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Clones out every question at `difficulty`.
    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .cloned()
            .collect()
    }
}

impl QuestionProvider for QuestionBank {
    async fn fetch_questions(
        &self,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, ProviderError> {
        Ok(self.by_difficulty(difficulty))
    }
}
