//! Questions, choices, and the time-gated visibility and voting rules.
//!
//! A question is live once its publication time has passed; only live
//! questions are listed, shown, and accept votes. Every time-dependent
//! operation takes "now" explicitly, with HTTP handlers reading it from an
//! injected [`Clock`].

pub mod clock;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    is_live, is_recently_published, Choice, ChoiceId, NewQuestion, Question, QuestionDetail,
    QuestionId, VoteReceipt, RECENT_WINDOW_HOURS,
};
pub use memory::InMemoryPollRepository;
pub use repository::{PollRepository, RepositoryError};
pub use router::poll_router;
pub use seed::{SeedImportError, SeedImporter};
pub use service::{PollService, PollServiceError, DEFAULT_LISTING_LIMIT, NO_CHOICE_SELECTED};
