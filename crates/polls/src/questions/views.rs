use askama::Template;
use chrono::{DateTime, Utc};

use super::domain::{Choice, Question, QuestionDetail};

/// Index row: a live question with its link and recency flag.
#[derive(Debug, Clone)]
pub struct QuestionSummary {
    pub text: String,
    pub detail_path: String,
    pub recently_published: bool,
}

impl QuestionSummary {
    pub fn from_question(question: &Question, now: DateTime<Utc>) -> Self {
        Self {
            text: question.text.clone(),
            detail_path: question.id.detail_path(),
            recently_published: question.was_published_recently(now),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub questions: &'a [QuestionSummary],
}

#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailTemplate<'a> {
    pub question: &'a Question,
    pub choices: &'a [Choice],
    pub vote_path: String,
    pub error_message: Option<&'a str>,
}

impl<'a> DetailTemplate<'a> {
    pub fn new(detail: &'a QuestionDetail, error_message: Option<&'a str>) -> Self {
        Self {
            question: &detail.question,
            choices: &detail.choices,
            vote_path: detail.question.id.vote_path(),
            error_message,
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate<'a> {
    pub question: &'a Question,
    pub choices: &'a [Choice],
    pub total_votes: u64,
    pub detail_path: String,
}

impl<'a> ResultsTemplate<'a> {
    pub fn new(detail: &'a QuestionDetail) -> Self {
        Self {
            question: &detail.question,
            choices: &detail.choices,
            total_votes: detail.total_votes(),
            detail_path: detail.question.id.detail_path(),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub requested: &'a str,
}
