use chrono::{DateTime, Utc};

use super::domain::{Choice, ChoiceId, NewQuestion, Question, QuestionDetail, QuestionId};

/// Storage abstraction so the service can be exercised in isolation.
pub trait PollRepository: Send + Sync {
    /// Store a question and its choices in one step, assigning identifiers.
    fn insert_question(&self, question: NewQuestion) -> Result<QuestionDetail, RepositoryError>;

    /// Append a choice to an existing question.
    fn insert_choice(&self, question_id: QuestionId, text: String)
        -> Result<Choice, RepositoryError>;

    fn fetch_question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError>;

    /// Choices of a question in creation order.
    fn choices_for(&self, id: QuestionId) -> Result<Vec<Choice>, RepositoryError>;

    /// Up to `limit` questions published at or before `now`, newest first.
    /// Questions sharing a publication time keep their insertion order.
    fn latest_published(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Question>, RepositoryError>;

    /// Add one vote to `choice_id` if it belongs to `question_id`.
    ///
    /// The membership check and the increment must be a single serialized
    /// step. Returns `None` when the choice does not belong to the question
    /// and `CounterOverflow` when the count cannot grow; neither mutates.
    fn record_vote(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Option<Choice>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("vote counter for choice {0} is at its maximum")]
    CounterOverflow(ChoiceId),
}
