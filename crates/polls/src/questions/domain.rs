use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Width of the "recently published" window, in hours.
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// A question is live once its publication time is at or before `now`.
pub fn is_live(publication_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    publication_time <= now
}

/// Live and published within the last day; exactly one day ago is excluded.
pub fn is_recently_published(publication_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    is_live(publication_time, now)
        && publication_time > now - Duration::hours(RECENT_WINDOW_HOURS)
}

/// Identifier assigned to questions by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl QuestionId {
    pub fn detail_path(&self) -> String {
        format!("/{}/", self.0)
    }

    pub fn vote_path(&self) -> String {
        format!("/{}/vote/", self.0)
    }

    pub fn results_path(&self) -> String {
        format!("/{}/results/", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned to choices, unique across all questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceId(pub u64);

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub publication_time: DateTime<Utc>,
}

impl Question {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        is_live(self.publication_time, now)
    }

    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        is_recently_published(self.publication_time, now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub text: String,
    pub votes: u32,
}

impl Choice {
    /// Vote count with the noun pluralized, e.g. "1 vote" or "3 votes".
    pub fn votes_label(&self) -> String {
        if self.votes == 1 {
            "1 vote".to_string()
        } else {
            format!("{} votes", self.votes)
        }
    }
}

/// Administrative payload for creating a question together with its choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub publication_time: DateTime<Utc>,
    #[serde(default)]
    pub choices: Vec<String>,
}

/// A question with its choices in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionDetail {
    pub fn total_votes(&self) -> u64 {
        self.choices.iter().map(|choice| u64::from(choice.votes)).sum()
    }
}

/// Outcome of an accepted vote: the updated choice and where to show results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub question_id: QuestionId,
    pub choice: Choice,
}

impl VoteReceipt {
    pub fn results_path(&self) -> String {
        self.question_id.results_path()
    }
}
