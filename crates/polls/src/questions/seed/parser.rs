use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::SeedImportError;

/// One CSV row: a choice (possibly blank) under a question.
#[derive(Debug)]
pub(crate) struct SeedRecord {
    pub(crate) question: String,
    pub(crate) publication_time: DateTime<Utc>,
    pub(crate) choice: Option<String>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<SeedRecord>, SeedImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<SeedRow>().enumerate() {
        let row = row?;
        let publication_time =
            parse_timestamp(&row.published_at).ok_or_else(|| SeedImportError::InvalidTimestamp {
                row: index + 1,
                value: row.published_at.clone(),
            })?;

        records.push(SeedRecord {
            question: row.question,
            publication_time,
            choice: row.choice,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    #[serde(rename = "Question")]
    question: String,
    #[serde(rename = "Published At")]
    published_at: String,
    #[serde(rename = "Choice", default, deserialize_with = "empty_string_as_none")]
    choice: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
