//! Dota 2 Match Filter Library
//!
//! Turns multi-gigabyte dumps of Dota 2 match records into a compact
//! dataset for predicting match outcomes from early-game signals.
//!
//! This library provides tools for:
//! - Streaming JSON arrays or JSON lines one match at a time
//! - Admission checks (player count, game mode, lobby type, leavers, roster)
//! - Decoding player slots into ten canonical hero columns
//! - Sampling time-series features at their midpoint
//! - Restricting a run to a single game patch
//! - Loading the filtered dataset into a polars frame

pub mod cli;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod models;
pub mod patch;
pub mod processor;

// Re-export commonly used types
pub use config::{FilterConfig, InputFormat, PatchConstraint, SourceOrder};
pub use error::{FilterError, Result};
pub use models::{FilterStats, NormalizedRecord, Patch, RawMatch, RejectReason, Termination};
pub use patch::PatchTable;
pub use processor::{Admission, MatchFilter};
