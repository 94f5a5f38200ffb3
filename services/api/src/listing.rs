use crate::infra::{load_seed, parse_now};
use chrono::{DateTime, Utc};
use clap::Args;
use polls::error::AppError;
use polls::questions::{InMemoryPollRepository, PollService, Question};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuestionListArgs {
    /// CSV with Question, Published At, and Choice columns
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Moment to evaluate the listing at (defaults to the current time)
    #[arg(long, value_parser = parse_now)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Number of questions to show (defaults to the index page size)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_question_listing(args: QuestionListArgs) -> Result<(), AppError> {
    let QuestionListArgs { seed, now, limit } = args;

    let service = PollService::new(Arc::new(InMemoryPollRepository::new()));
    let imported = load_seed(&service, &seed)?;

    let now = now.unwrap_or_else(Utc::now);
    let limit = limit.unwrap_or_else(|| service.listing_limit());
    let questions = service.list_recent_live_questions(now, limit)?;

    print!("{}", format_listing(&questions, imported, now));
    Ok(())
}

fn format_listing(questions: &[Question], imported: usize, now: DateTime<Utc>) -> String {
    let mut output = format!(
        "Polls listing at {} ({} questions in seed)\n",
        now.to_rfc3339(),
        imported
    );

    if questions.is_empty() {
        output.push_str("No polls are available.\n");
        return output;
    }

    for question in questions {
        let marker = if question.was_published_recently(now) {
            " [new]"
        } else {
            ""
        };
        output.push_str(&format!(
            "- #{} {} (published {}){}\n",
            question.id,
            question.text,
            question.publication_time.to_rfc3339(),
            marker
        ));
    }

    output
}
