//! CSV seeding for the question store.
//!
//! Expected headers are `Question`, `Published At`, and `Choice`, one row per
//! choice. Rows repeating the same question and publication time are folded
//! into a single question, in the order the questions first appear.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::questions::domain::NewQuestion;

pub use parser::parse_timestamp;

#[derive(Debug, thiserror::Error)]
pub enum SeedImportError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: '{value}' is not an RFC 3339 timestamp or YYYY-MM-DD date")]
    InvalidTimestamp { row: usize, value: String },
}

pub struct SeedImporter;

impl SeedImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<NewQuestion>, SeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<NewQuestion>, SeedImportError> {
        let mut questions: Vec<NewQuestion> = Vec::new();

        for record in parser::parse_records(reader)? {
            let position = questions.iter().position(|question| {
                question.text == record.question
                    && question.publication_time == record.publication_time
            });

            let question = match position {
                Some(index) => &mut questions[index],
                None => {
                    questions.push(NewQuestion {
                        text: record.question,
                        publication_time: record.publication_time,
                        choices: Vec::new(),
                    });
                    let last = questions.len() - 1;
                    &mut questions[last]
                }
            };

            if let Some(choice) = record.choice {
                question.choices.push(choice);
            }
        }

        Ok(questions)
    }
}
