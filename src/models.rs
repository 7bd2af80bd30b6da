//! Core data structures for match filtering.
//!
//! Defines the raw match records read from the dump, patch entries,
//! the normalized output record and the statistics of a filter run.

use crate::constants::{HERO_SLOTS, LABEL_COLUMN, hero_column};
use crate::error::{FilterError, Result};
use chrono::{DateTime, NaiveDate};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// One match entry from the source dump
///
/// Only the fields needed for admission are typed; everything else is kept
/// in `extra` so configured features can be looked up by name.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatch {
    pub human_players: i64,
    pub game_mode: i64,
    pub lobby_type: i64,
    pub start_time: i64,
    /// `null` or absent when the match has no recorded winner
    pub radiant_win: Option<bool>,
    pub players: Vec<RawPlayer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawMatch {
    /// Calendar date (UTC) on which the match started
    pub fn start_date(&self) -> Result<NaiveDate> {
        DateTime::from_timestamp(self.start_time, 0)
            .map(|timestamp| timestamp.date_naive())
            .ok_or(FilterError::InvalidTimestamp {
                start_time: self.start_time,
            })
    }

    /// Look up a top-level match field by name, typed fields included
    pub fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            "human_players" => Some(Cow::Owned(Value::from(self.human_players))),
            "game_mode" => Some(Cow::Owned(Value::from(self.game_mode))),
            "lobby_type" => Some(Cow::Owned(Value::from(self.lobby_type))),
            "start_time" => Some(Cow::Owned(Value::from(self.start_time))),
            _ => self.extra.get(name).map(Cow::Borrowed),
        }
    }
}

/// Per-player entry of a raw match
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub player_slot: u8,
    pub leaver_status: i64,
    pub hero_id: i64,
}

/// A named game version and the date it went live
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Patch {
    pub name: String,
    #[serde(deserialize_with = "deserialize_patch_date")]
    pub date: NaiveDate,
}

impl Patch {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }
}

/// Patch dates are ISO-8601 date-times; only the leading `YYYY-MM-DD` counts
fn deserialize_patch_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw
        .get(..10)
        .ok_or_else(|| de::Error::custom(format!("date '{}' is shorter than YYYY-MM-DD", raw)))?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

/// One row of the training dataset
///
/// Serializes as a flat JSON object: `hero0..hero9`, then the feature
/// columns in configured order, then the label.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub heroes: [i64; HERO_SLOTS],
    pub features: Vec<(String, Value)>,
    pub radiant_win: u8,
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(HERO_SLOTS + self.features.len() + 1))?;
        for (position, hero_id) in self.heroes.iter().enumerate() {
            map.serialize_entry(&hero_column(position), hero_id)?;
        }
        for (name, value) in &self.features {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(LABEL_COLUMN, &self.radiant_win)?;
        map.end()
    }
}

/// Why a well-formed match was left out of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    HumanPlayers,
    GameMode,
    LobbyType,
    PatchOutOfWindow,
    Leaver,
    InvalidRoster,
    MissingFeature,
    MissingLabel,
}

impl RejectReason {
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::HumanPlayers => "not 10 human players",
            RejectReason::GameMode => "game mode mismatch",
            RejectReason::LobbyType => "lobby type mismatch",
            RejectReason::PatchOutOfWindow => "outside target patch",
            RejectReason::Leaver => "player left the match",
            RejectReason::InvalidRoster => "invalid player roster",
            RejectReason::MissingFeature => "missing feature",
            RejectReason::MissingLabel => "no recorded winner",
        }
    }
}

/// Why a filter run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    TargetReached,
    #[default]
    SourceExhausted,
    PatchBoundary,
}

/// Filter run statistics
#[derive(Debug, Default)]
pub struct FilterStats {
    pub scanned: usize,
    pub accepted: usize,
    pub malformed: usize,
    pub rejections: BTreeMap<RejectReason, usize>,
    pub termination: Termination,
    pub output_path: PathBuf,
    pub elapsed: Duration,
}

impl FilterStats {
    pub fn record_rejection(&mut self, reason: RejectReason) {
        *self.rejections.entry(reason).or_insert(0) += 1;
    }

    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }

    pub fn rejections_for(&self, reason: RejectReason) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }
}
