use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::questions::domain::{
    Choice, ChoiceId, NewQuestion, Question, QuestionDetail, QuestionId,
};
use crate::questions::repository::{PollRepository, RepositoryError};
use crate::questions::{poll_router, FixedClock, InMemoryPollRepository, PollService};

pub(super) type MemoryService = PollService<InMemoryPollRepository>;

static TEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

/// "Now" for most scenarios: Feb 1st, 2017.
pub(super) fn frozen_now() -> DateTime<Utc> {
    at(2017, 2, 1)
}

pub(super) fn service() -> (Arc<MemoryService>, InMemoryPollRepository) {
    let repository = InMemoryPollRepository::new();
    let service = Arc::new(PollService::new(Arc::new(repository.clone())));
    (service, repository)
}

pub(super) fn router_at(now: DateTime<Utc>) -> (Router, Arc<MemoryService>, FixedClock) {
    let (service, _) = service();
    let clock = FixedClock::new(now);
    let router = poll_router(service.clone(), Arc::new(clock.clone()));
    (router, service, clock)
}

pub(super) fn sequence_text(prefix: &str) -> String {
    let n = TEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix} #{n}")
}

/// Question factory: a question published at `publication_time`, no choices.
pub(super) fn question(
    service: &MemoryService,
    text: &str,
    publication_time: DateTime<Utc>,
) -> QuestionDetail {
    question_with_choices(service, text, publication_time, &[])
}

pub(super) fn question_with_choices(
    service: &MemoryService,
    text: &str,
    publication_time: DateTime<Utc>,
    choices: &[&str],
) -> QuestionDetail {
    service
        .create_question(NewQuestion {
            text: text.to_string(),
            publication_time,
            choices: choices.iter().map(|choice| choice.to_string()).collect(),
        })
        .expect("question created")
}

pub(super) fn past_question(service: &MemoryService, now: DateTime<Utc>) -> QuestionDetail {
    question(service, "Past Question", now - Duration::days(30))
}

pub(super) fn future_question(service: &MemoryService, now: DateTime<Utc>) -> QuestionDetail {
    question(service, "Future Question", now + Duration::days(30))
}

/// Choice factory: a choice on a freshly created live question.
pub(super) fn choice(service: &MemoryService, now: DateTime<Utc>) -> Choice {
    let parent = question(service, &sequence_text("Question"), now);
    service
        .add_choice(parent.question.id, &sequence_text("Choice"))
        .expect("choice created")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

pub(super) fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

/// POST with no `Content-Type`, as sent by clients that drop the form header.
pub(super) fn post_untyped(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Repository whose backing store is always down.
pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn down() -> RepositoryError {
        RepositoryError::Unavailable("database offline".to_string())
    }
}

impl PollRepository for UnavailableRepository {
    fn insert_question(&self, _question: NewQuestion) -> Result<QuestionDetail, RepositoryError> {
        Err(Self::down())
    }

    fn insert_choice(
        &self,
        _question_id: QuestionId,
        _text: String,
    ) -> Result<Choice, RepositoryError> {
        Err(Self::down())
    }

    fn fetch_question(&self, _id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        Err(Self::down())
    }

    fn choices_for(&self, _id: QuestionId) -> Result<Vec<Choice>, RepositoryError> {
        Err(Self::down())
    }

    fn latest_published(
        &self,
        _now: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<Question>, RepositoryError> {
        Err(Self::down())
    }

    fn record_vote(
        &self,
        _question_id: QuestionId,
        _choice_id: ChoiceId,
    ) -> Result<Option<Choice>, RepositoryError> {
        Err(Self::down())
    }
}
