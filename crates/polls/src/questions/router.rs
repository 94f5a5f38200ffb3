use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::clock::Clock;
use super::domain::{ChoiceId, NewQuestion, QuestionId};
use super::repository::PollRepository;
use super::service::{PollService, PollServiceError, NO_CHOICE_SELECTED};
use super::views::{
    DetailTemplate, IndexTemplate, NotFoundTemplate, QuestionSummary, ResultsTemplate,
};

/// Shared handler state: the service plus the clock that supplies "now".
pub struct PollState<R> {
    pub service: Arc<PollService<R>>,
    pub clock: Arc<dyn Clock>,
}

impl<R> Clone for PollState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Form body of a vote submission. `choice` is absent when nothing was picked.
#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub choice: Option<String>,
}

/// Router exposing the poll pages and the question administration endpoint.
pub fn poll_router<R>(service: Arc<PollService<R>>, clock: Arc<dyn Clock>) -> Router
where
    R: PollRepository + 'static,
{
    Router::new()
        .route("/", get(index_handler::<R>))
        .route("/:question_id/", get(detail_handler::<R>))
        .route("/:question_id/vote/", post(vote_handler::<R>))
        .route("/:question_id/results/", get(results_handler::<R>))
        .route("/api/v1/questions", post(create_question_handler::<R>))
        .with_state(PollState { service, clock })
}

pub(crate) async fn index_handler<R>(State(state): State<PollState<R>>) -> Response
where
    R: PollRepository + 'static,
{
    let now = state.clock.now();
    match state.service.index(now) {
        Ok(questions) => {
            let summaries: Vec<QuestionSummary> = questions
                .iter()
                .map(|question| QuestionSummary::from_question(question, now))
                .collect();
            render(StatusCode::OK, &IndexTemplate {
                questions: &summaries,
            })
        }
        Err(other) => failure_response(other, "/"),
    }
}

pub(crate) async fn detail_handler<R>(
    State(state): State<PollState<R>>,
    Path(raw_id): Path<String>,
) -> Response
where
    R: PollRepository + 'static,
{
    let Some(question_id) = parse_question_id(&raw_id) else {
        return not_found(&raw_id);
    };

    match state
        .service
        .get_question_detail(question_id, state.clock.now())
    {
        Ok(detail) => render(StatusCode::OK, &DetailTemplate::new(&detail, None)),
        Err(other) => failure_response(other, &raw_id),
    }
}

pub(crate) async fn vote_handler<R>(
    State(state): State<PollState<R>>,
    Path(raw_id): Path<String>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> Response
where
    R: PollRepository + 'static,
{
    let Some(question_id) = parse_question_id(&raw_id) else {
        return not_found(&raw_id);
    };

    // A body that cannot be read as a vote form counts as no selection, so
    // the liveness gate still runs first.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!(%question_id, %rejection, "unreadable vote form");
            VoteForm::default()
        }
    };

    let now = state.clock.now();
    let choice_id = form.choice.as_deref().and_then(parse_choice_id);

    match state.service.submit_vote(question_id, choice_id, now) {
        Ok(receipt) => Redirect::to(&receipt.results_path()).into_response(),
        Err(PollServiceError::InvalidSelection(question_id)) => {
            match state.service.get_question_detail(question_id, now) {
                Ok(detail) => render(
                    StatusCode::OK,
                    &DetailTemplate::new(&detail, Some(NO_CHOICE_SELECTED)),
                ),
                Err(other) => failure_response(other, &raw_id),
            }
        }
        Err(other) => failure_response(other, &raw_id),
    }
}

pub(crate) async fn results_handler<R>(
    State(state): State<PollState<R>>,
    Path(raw_id): Path<String>,
) -> Response
where
    R: PollRepository + 'static,
{
    let Some(question_id) = parse_question_id(&raw_id) else {
        return not_found(&raw_id);
    };

    match state
        .service
        .get_question_results(question_id, state.clock.now())
    {
        Ok(detail) => render(StatusCode::OK, &ResultsTemplate::new(&detail)),
        Err(other) => failure_response(other, &raw_id),
    }
}

pub(crate) async fn create_question_handler<R>(
    State(state): State<PollState<R>>,
    Json(payload): Json<NewQuestion>,
) -> Response
where
    R: PollRepository + 'static,
{
    match state.service.create_question(payload) {
        Ok(detail) => (StatusCode::CREATED, Json(detail)).into_response(),
        Err(PollServiceError::InvalidQuestion(reason)) => {
            let payload = json!({ "error": reason });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn parse_question_id(raw: &str) -> Option<QuestionId> {
    raw.trim().parse::<u64>().ok().map(QuestionId)
}

fn parse_choice_id(raw: &str) -> Option<ChoiceId> {
    raw.trim().parse::<u64>().ok().map(ChoiceId)
}

fn render<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render poll template");
            (StatusCode::INTERNAL_SERVER_ERROR, "template rendering failed").into_response()
        }
    }
}

fn not_found(requested: &str) -> Response {
    render(StatusCode::NOT_FOUND, &NotFoundTemplate { requested })
}

fn failure_response(err: PollServiceError, requested: &str) -> Response {
    match err {
        PollServiceError::NotFound(_) => not_found(requested),
        other => internal_error(other),
    }
}

fn internal_error(err: PollServiceError) -> Response {
    error!(error = %err, "poll request failed");
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
