use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::domain::{Choice, ChoiceId, NewQuestion, Question, QuestionDetail, QuestionId, VoteReceipt};
use super::repository::{PollRepository, RepositoryError};

/// Number of questions shown on the index page unless configured otherwise.
pub const DEFAULT_LISTING_LIMIT: usize = 5;

/// Message shown when a vote arrives without a usable choice.
pub const NO_CHOICE_SELECTED: &str = "You didn't select a choice.";

/// Service composing the repository with the visibility and voting rules.
pub struct PollService<R> {
    repository: Arc<R>,
    listing_limit: usize,
}

impl<R> PollService<R>
where
    R: PollRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            listing_limit: DEFAULT_LISTING_LIMIT,
        }
    }

    /// Override how many questions the index lists. Zero is treated as one.
    pub fn with_listing_limit(mut self, limit: usize) -> Self {
        self.listing_limit = limit.max(1);
        self
    }

    pub fn listing_limit(&self) -> usize {
        self.listing_limit
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Create a question and its choices.
    pub fn create_question(
        &self,
        new_question: NewQuestion,
    ) -> Result<QuestionDetail, PollServiceError> {
        let NewQuestion {
            text,
            publication_time,
            choices,
        } = new_question;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(PollServiceError::InvalidQuestion(
                "question text must not be blank".to_string(),
            ));
        }

        let choices = choices
            .into_iter()
            .map(|choice| choice.trim().to_string())
            .collect::<Vec<_>>();
        if choices.iter().any(String::is_empty) {
            return Err(PollServiceError::InvalidQuestion(
                "choice text must not be blank".to_string(),
            ));
        }

        let detail = self.repository.insert_question(NewQuestion {
            text,
            publication_time,
            choices,
        })?;

        info!(
            question_id = %detail.question.id,
            publication_time = %detail.question.publication_time,
            choices = detail.choices.len(),
            "question created"
        );
        Ok(detail)
    }

    /// Append a choice to a question, live or not.
    pub fn add_choice(
        &self,
        question_id: QuestionId,
        text: &str,
    ) -> Result<Choice, PollServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PollServiceError::InvalidQuestion(
                "choice text must not be blank".to_string(),
            ));
        }

        match self.repository.insert_choice(question_id, text.to_string()) {
            Ok(choice) => Ok(choice),
            Err(RepositoryError::NotFound) => Err(PollServiceError::NotFound(question_id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Create every question in order, returning how many were stored.
    pub fn import(&self, questions: Vec<NewQuestion>) -> Result<usize, PollServiceError> {
        let mut imported = 0;
        for question in questions {
            self.create_question(question)?;
            imported += 1;
        }
        Ok(imported)
    }

    /// Up to `limit` live questions, newest first.
    pub fn list_recent_live_questions(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Question>, PollServiceError> {
        let questions = self.repository.latest_published(now, limit)?;
        debug!(%now, limit, returned = questions.len(), "listed live questions");
        Ok(questions)
    }

    /// The index listing, bounded by the configured limit.
    pub fn index(&self, now: DateTime<Utc>) -> Result<Vec<Question>, PollServiceError> {
        self.list_recent_live_questions(now, self.listing_limit)
    }

    pub fn get_question_detail(
        &self,
        id: QuestionId,
        now: DateTime<Utc>,
    ) -> Result<QuestionDetail, PollServiceError> {
        let question = self.live_question(id, now)?;
        let choices = self.repository.choices_for(id)?;
        Ok(QuestionDetail { question, choices })
    }

    /// Results share the detail gate: unknown or unpublished questions are hidden.
    pub fn get_question_results(
        &self,
        id: QuestionId,
        now: DateTime<Utc>,
    ) -> Result<QuestionDetail, PollServiceError> {
        self.get_question_detail(id, now)
    }

    /// Count one vote for `choice_id` on a live question.
    pub fn submit_vote(
        &self,
        question_id: QuestionId,
        choice_id: Option<ChoiceId>,
        now: DateTime<Utc>,
    ) -> Result<VoteReceipt, PollServiceError> {
        self.live_question(question_id, now)?;

        let Some(choice_id) = choice_id else {
            debug!(%question_id, "vote rejected: no choice selected");
            return Err(PollServiceError::InvalidSelection(question_id));
        };

        let Some(choice) = self.repository.record_vote(question_id, choice_id)? else {
            debug!(%question_id, %choice_id, "vote rejected: choice not on question");
            return Err(PollServiceError::InvalidSelection(question_id));
        };

        info!(%question_id, %choice_id, votes = choice.votes, "vote recorded");
        Ok(VoteReceipt {
            question_id,
            choice,
        })
    }

    fn live_question(
        &self,
        id: QuestionId,
        now: DateTime<Utc>,
    ) -> Result<Question, PollServiceError> {
        match self.repository.fetch_question(id)? {
            Some(question) if question.is_live(now) => Ok(question),
            _ => Err(PollServiceError::NotFound(id)),
        }
    }
}

/// Error raised by the poll service.
#[derive(Debug, thiserror::Error)]
pub enum PollServiceError {
    #[error("question {0} not found")]
    NotFound(QuestionId),
    #[error("invalid choice for question {0}")]
    InvalidSelection(QuestionId),
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
