use super::common::*;
use chrono::Duration;
use std::sync::Arc;
use std::thread;

use crate::questions::domain::{ChoiceId, NewQuestion, QuestionId};
use crate::questions::repository::{PollRepository, RepositoryError};
use crate::questions::{PollService, PollServiceError};

#[test]
fn factories_build_questions_and_choices() {
    let now = frozen_now();
    let (service, repository) = service();

    let past = past_question(&service, now);
    let future = future_question(&service, now);
    assert!(past.question.publication_time < now);
    assert!(future.question.publication_time > now);

    let choice = choice(&service, now);
    let parent = repository
        .fetch_question(choice.question_id)
        .expect("fetch succeeds")
        .expect("choice has a question");
    assert_eq!(parent.id, choice.question_id);
    assert_eq!(choice.votes, 0);
}

#[test]
fn listing_is_empty_without_questions() {
    let (service, _) = service();
    let listed = service.index(frozen_now()).expect("listing succeeds");
    assert!(listed.is_empty());
}

#[test]
fn listing_shows_past_questions() {
    let (service, _) = service();
    question(&service, "Past question.", at(2017, 1, 1));

    let listed = service.index(frozen_now()).expect("listing succeeds");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].text, "Past question.");
}

#[test]
fn listing_hides_future_questions() {
    let (service, _) = service();
    question(&service, "Past question.", at(2017, 1, 1));
    question(&service, "Future question.", at(2017, 3, 1));

    let listed = service.index(frozen_now()).expect("listing succeeds");

    let texts: Vec<&str> = listed.iter().map(|question| question.text.as_str()).collect();
    assert_eq!(texts, vec!["Past question."]);
}

#[test]
fn listing_orders_newest_first() {
    let (service, _) = service();
    question(&service, "Past question 1.", at(2017, 1, 1));
    question(&service, "Past question 2.", at(2017, 1, 2));

    let listed = service
        .list_recent_live_questions(at(2017, 1, 3), 5)
        .expect("listing succeeds");

    let texts: Vec<&str> = listed.iter().map(|question| question.text.as_str()).collect();
    assert_eq!(texts, vec!["Past question 2.", "Past question 1."]);
}

#[test]
fn listing_caps_at_the_configured_limit() {
    let (service, _) = service();
    for day in 1..=7 {
        question(&service, &format!("Day {day}"), at(2017, 1, day));
    }

    let listed = service.index(frozen_now()).expect("listing succeeds");
    assert_eq!(listed.len(), 5);
    assert_eq!(listed[0].text, "Day 7");
    assert_eq!(listed[4].text, "Day 3");

    let repository = Arc::clone(service.repository());
    let narrow = PollService::new(repository).with_listing_limit(2);
    assert_eq!(narrow.index(frozen_now()).expect("listing succeeds").len(), 2);
}

#[test]
fn listing_keeps_insertion_order_for_equal_times() {
    let (service, _) = service();
    let published = at(2017, 1, 15);
    question(&service, "First", published);
    question(&service, "Second", published);
    question(&service, "Third", published);

    let listed = service.index(frozen_now()).expect("listing succeeds");

    let texts: Vec<&str> = listed.iter().map(|question| question.text.as_str()).collect();
    assert_eq!(texts, vec!["First", "Second", "Third"]);
}

#[test]
fn detail_of_future_question_is_not_found() {
    let (service, _) = service();
    let future = question(&service, "Future question.", at(2017, 2, 5));

    match service.get_question_detail(future.question.id, frozen_now()) {
        Err(PollServiceError::NotFound(id)) => assert_eq!(id, future.question.id),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn detail_of_unknown_question_is_not_found() {
    let (service, _) = service();
    assert!(matches!(
        service.get_question_detail(QuestionId(404), frozen_now()),
        Err(PollServiceError::NotFound(_))
    ));
}

#[test]
fn detail_of_past_question_includes_choices_in_order() {
    let (service, _) = service();
    let past = question_with_choices(
        &service,
        "Past question.",
        at(2017, 1, 28),
        &["Choice 1", "Choice 2"],
    );

    let detail = service
        .get_question_detail(past.question.id, frozen_now())
        .expect("detail visible");

    assert_eq!(detail.question.text, "Past question.");
    let texts: Vec<&str> = detail.choices.iter().map(|choice| choice.text.as_str()).collect();
    assert_eq!(texts, vec!["Choice 1", "Choice 2"]);
}

#[test]
fn results_of_future_question_are_not_found() {
    let (service, _) = service();
    let future = future_question(&service, frozen_now());
    assert!(matches!(
        service.get_question_results(future.question.id, frozen_now()),
        Err(PollServiceError::NotFound(_))
    ));
}

#[test]
fn vote_increments_the_selected_choice_once() {
    let now = frozen_now();
    let (service, repository) = service();
    let detail = question_with_choices(&service, "Test Question", now, &["Choice 1", "Choice 2"]);
    let selected = detail.choices[0].id;

    let receipt = service
        .submit_vote(detail.question.id, Some(selected), now)
        .expect("vote accepted");

    assert_eq!(receipt.choice.votes, 1);
    assert_eq!(receipt.results_path(), detail.question.id.results_path());
    let choices = repository
        .choices_for(detail.question.id)
        .expect("choices load");
    assert_eq!(choices[0].votes, 1);
    assert_eq!(choices[1].votes, 0);
}

#[test]
fn vote_without_choice_is_rejected_without_mutation() {
    let now = frozen_now();
    let (service, repository) = service();
    let detail = question_with_choices(&service, "Test Question", now, &["Choice 1", "Choice 2"]);

    match service.submit_vote(detail.question.id, None, now) {
        Err(PollServiceError::InvalidSelection(id)) => assert_eq!(id, detail.question.id),
        other => panic!("expected invalid selection, got {other:?}"),
    }

    let choices = repository
        .choices_for(detail.question.id)
        .expect("choices load");
    assert!(choices.iter().all(|choice| choice.votes == 0));
}

#[test]
fn vote_for_another_questions_choice_is_rejected() {
    let now = frozen_now();
    let (service, repository) = service();
    let first = question_with_choices(&service, "First", now, &["A"]);
    let second = question_with_choices(&service, "Second", now, &["B"]);

    let result = service.submit_vote(first.question.id, Some(second.choices[0].id), now);

    assert!(matches!(result, Err(PollServiceError::InvalidSelection(_))));
    let untouched = repository
        .choices_for(second.question.id)
        .expect("choices load");
    assert_eq!(untouched[0].votes, 0);
}

#[test]
fn vote_for_unknown_choice_is_rejected() {
    let now = frozen_now();
    let (service, _) = service();
    let detail = question_with_choices(&service, "Test Question", now, &["Choice 1"]);

    assert!(matches!(
        service.submit_vote(detail.question.id, Some(ChoiceId(999)), now),
        Err(PollServiceError::InvalidSelection(_))
    ));
}

#[test]
fn vote_on_future_question_is_not_found() {
    let now = frozen_now();
    let (service, repository) = service();
    let detail = question_with_choices(
        &service,
        "Future question.",
        now + Duration::seconds(1),
        &["Choice 1"],
    );

    let result = service.submit_vote(detail.question.id, Some(detail.choices[0].id), now);

    assert!(matches!(result, Err(PollServiceError::NotFound(_))));
    let choices = repository
        .choices_for(detail.question.id)
        .expect("choices load");
    assert_eq!(choices[0].votes, 0);
}

#[test]
fn vote_on_unknown_question_is_not_found() {
    let (service, _) = service();

    let result = service.submit_vote(QuestionId(404), Some(ChoiceId(1)), frozen_now());

    assert!(matches!(
        result,
        Err(PollServiceError::NotFound(QuestionId(404)))
    ));
}

#[test]
fn counter_overflow_surfaces_as_repository_error() {
    let now = frozen_now();
    let (service, repository) = service();
    let detail = question_with_choices(&service, "Busy question", now, &["Choice 1"]);
    let choice_id = detail.choices[0].id;
    repository.set_votes(choice_id, u32::MAX);

    let result = service.submit_vote(detail.question.id, Some(choice_id), now);

    assert!(matches!(
        result,
        Err(PollServiceError::Repository(RepositoryError::CounterOverflow(id))) if id == choice_id
    ));
}

#[test]
fn concurrent_votes_are_not_lost() {
    let now = frozen_now();
    let (service, repository) = service();
    let detail = question_with_choices(&service, "Busy question", now, &["Popular"]);
    let question_id = detail.question.id;
    let choice_id = detail.choices[0].id;

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..50 {
                    service
                        .submit_vote(question_id, Some(choice_id), now)
                        .expect("vote accepted");
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker finished");
    }

    let choices = repository.choices_for(question_id).expect("choices load");
    assert_eq!(choices[0].votes, 400);
}

#[test]
fn create_question_trims_and_validates_text() {
    let (service, _) = service();

    let created = service
        .create_question(NewQuestion {
            text: "  What's new?  ".to_string(),
            publication_time: frozen_now(),
            choices: vec![" Not much ".to_string()],
        })
        .expect("question created");
    assert_eq!(created.question.text, "What's new?");
    assert_eq!(created.choices[0].text, "Not much");

    let blank = service.create_question(NewQuestion {
        text: "   ".to_string(),
        publication_time: frozen_now(),
        choices: Vec::new(),
    });
    assert!(matches!(blank, Err(PollServiceError::InvalidQuestion(_))));

    let blank_choice = service.create_question(NewQuestion {
        text: "Lunch?".to_string(),
        publication_time: frozen_now(),
        choices: vec!["Pizza".to_string(), "".to_string()],
    });
    assert!(matches!(blank_choice, Err(PollServiceError::InvalidQuestion(_))));
}

#[test]
fn created_questions_get_increasing_ids() {
    let (service, _) = service();
    let first = question(&service, &sequence_text("Question"), frozen_now());
    let second = question(&service, &sequence_text("Question"), frozen_now());
    assert!(second.question.id > first.question.id);
}

#[test]
fn add_choice_requires_an_existing_question() {
    let (service, _) = service();
    assert!(matches!(
        service.add_choice(QuestionId(12), "Orphan"),
        Err(PollServiceError::NotFound(QuestionId(12)))
    ));

    let future = future_question(&service, frozen_now());
    let choice = service
        .add_choice(future.question.id, "Prepared early")
        .expect("future questions accept choices");
    assert_eq!(choice.question_id, future.question.id);
}

#[test]
fn import_creates_every_question() {
    let (service, repository) = service();
    let imported = service
        .import(vec![
            NewQuestion {
                text: "One".to_string(),
                publication_time: at(2017, 1, 1),
                choices: vec!["Yes".to_string()],
            },
            NewQuestion {
                text: "Two".to_string(),
                publication_time: at(2017, 1, 2),
                choices: Vec::new(),
            },
        ])
        .expect("import succeeds");

    assert_eq!(imported, 2);
    assert_eq!(
        repository
            .latest_published(frozen_now(), 10)
            .expect("listing succeeds")
            .len(),
        2
    );
}

#[test]
fn repository_failures_propagate() {
    let service = PollService::new(Arc::new(UnavailableRepository));

    assert!(matches!(
        service.index(frozen_now()),
        Err(PollServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(matches!(
        service.submit_vote(QuestionId(1), Some(ChoiceId(1)), frozen_now()),
        Err(PollServiceError::Repository(_))
    ));
}

#[test]
fn zero_listing_limit_is_clamped() {
    let (service, _) = service();
    let repository = Arc::clone(service.repository());
    let clamped = PollService::new(repository).with_listing_limit(0);
    assert_eq!(clamped.listing_limit(), 1);
}
