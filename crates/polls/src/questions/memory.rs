use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    is_live, Choice, ChoiceId, NewQuestion, Question, QuestionDetail, QuestionId,
};
use super::repository::{PollRepository, RepositoryError};

/// Process-local store. All tables sit behind one lock, so every mutation
/// (including vote increments) is serialized.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPollRepository {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    questions: Vec<Question>,
    choices: Vec<Choice>,
    last_question_id: u64,
    last_choice_id: u64,
}

impl Tables {
    fn next_question_id(&mut self) -> QuestionId {
        self.last_question_id += 1;
        QuestionId(self.last_question_id)
    }

    fn push_choice(&mut self, question_id: QuestionId, text: String) -> Choice {
        self.last_choice_id += 1;
        let choice = Choice {
            id: ChoiceId(self.last_choice_id),
            question_id,
            text,
            votes: 0,
        };
        self.choices.push(choice.clone());
        choice
    }

    fn has_question(&self, id: QuestionId) -> bool {
        self.questions.iter().any(|question| question.id == id)
    }
}

impl InMemoryPollRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("poll store lock poisoned".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn set_votes(&self, choice_id: ChoiceId, votes: u32) {
        let mut tables = self.tables.lock().expect("store lock");
        if let Some(choice) = tables.choices.iter_mut().find(|choice| choice.id == choice_id) {
            choice.votes = votes;
        }
    }
}

impl PollRepository for InMemoryPollRepository {
    fn insert_question(&self, question: NewQuestion) -> Result<QuestionDetail, RepositoryError> {
        let mut tables = self.lock()?;
        let id = tables.next_question_id();
        let stored = Question {
            id,
            text: question.text,
            publication_time: question.publication_time,
        };
        tables.questions.push(stored.clone());

        let choices = question
            .choices
            .into_iter()
            .map(|text| tables.push_choice(id, text))
            .collect();

        Ok(QuestionDetail {
            question: stored,
            choices,
        })
    }

    fn insert_choice(
        &self,
        question_id: QuestionId,
        text: String,
    ) -> Result<Choice, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_question(question_id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(tables.push_choice(question_id, text))
    }

    fn fetch_question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .questions
            .iter()
            .find(|question| question.id == id)
            .cloned())
    }

    fn choices_for(&self, id: QuestionId) -> Result<Vec<Choice>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .choices
            .iter()
            .filter(|choice| choice.question_id == id)
            .cloned()
            .collect())
    }

    fn latest_published(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Question>, RepositoryError> {
        let tables = self.lock()?;
        let mut published: Vec<Question> = tables
            .questions
            .iter()
            .filter(|question| is_live(question.publication_time, now))
            .cloned()
            .collect();
        drop(tables);

        // `sort_by` is stable, so equal timestamps stay in insertion order.
        published.sort_by(|a, b| b.publication_time.cmp(&a.publication_time));
        published.truncate(limit);
        Ok(published)
    }

    fn record_vote(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Option<Choice>, RepositoryError> {
        let mut tables = self.lock()?;
        let Some(choice) = tables
            .choices
            .iter_mut()
            .find(|choice| choice.id == choice_id && choice.question_id == question_id)
        else {
            return Ok(None);
        };

        choice.votes = choice
            .votes
            .checked_add(1)
            .ok_or(RepositoryError::CounterOverflow(choice_id))?;
        Ok(Some(choice.clone()))
    }
}
