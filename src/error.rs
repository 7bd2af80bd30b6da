//! Error handling for match filtering operations.
//!
//! Decode failures and rejected matches are not errors; they are counted
//! in the run statistics. Everything here is fatal for a run.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid match source: {reason}")]
    InvalidSource { reason: String },

    #[error("Invalid dataset file: {path} - {reason}")]
    InvalidDataset { path: PathBuf, reason: String },

    #[error("Invalid patch table in file: {path} - {reason}")]
    PatchTable { path: PathBuf, reason: String },

    #[error("Unknown patch '{name}': not present in the patch table")]
    UnknownPatch { name: String },

    #[error(
        "Match date {date} precedes the first known patch {first_patch} ({first_date})"
    )]
    DateBeforeFirstPatch {
        date: NaiveDate,
        first_patch: String,
        first_date: NaiveDate,
    },

    #[error("Match start_time {start_time} is not a valid unix timestamp")]
    InvalidTimestamp { start_time: i64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
