//! Per-match admission checks.
//!
//! Each check either passes a piece of the normalized record along or names
//! the reason the whole match is dropped. Nothing here is partial: a match
//! is fully assembled or not at all.

use super::slots::canonical_position;
use crate::config::SourceOrder;
use crate::constants::HERO_SLOTS;
use crate::models::{RawMatch, RawPlayer, RejectReason};
use serde_json::Value;
use std::cmp::Ordering;

/// Outcome of the patch window check for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCheck {
    Inside,
    Outside,
    /// The match lies past the window in stream order; nothing after it can qualify
    Beyond,
}

/// Compare a match's patch against the target, given how the source is ordered
pub fn check_patch_window(match_patch: usize, target_patch: usize, order: SourceOrder) -> WindowCheck {
    match (match_patch.cmp(&target_patch), order) {
        (Ordering::Equal, _) => WindowCheck::Inside,
        (_, SourceOrder::Unordered) => WindowCheck::Outside,
        (Ordering::Greater, SourceOrder::NewestFirst) => WindowCheck::Outside,
        (Ordering::Less, SourceOrder::NewestFirst) => WindowCheck::Beyond,
        (Ordering::Less, SourceOrder::OldestFirst) => WindowCheck::Outside,
        (Ordering::Greater, SourceOrder::OldestFirst) => WindowCheck::Beyond,
    }
}

/// Place every player's hero into its canonical slot
///
/// Rejects on the first leaver, and when the roster does not fill the ten
/// slots exactly once.
pub fn assign_hero_slots(players: &[RawPlayer]) -> Result<[i64; HERO_SLOTS], RejectReason> {
    let mut slots: [Option<i64>; HERO_SLOTS] = [None; HERO_SLOTS];

    for player in players {
        if player.leaver_status != 0 {
            return Err(RejectReason::Leaver);
        }
        let position = canonical_position(player.player_slot).ok_or(RejectReason::InvalidRoster)?;
        if slots[position].replace(player.hero_id).is_some() {
            return Err(RejectReason::InvalidRoster);
        }
    }

    let mut heroes = [0; HERO_SLOTS];
    for (hero, slot) in heroes.iter_mut().zip(slots) {
        *hero = slot.ok_or(RejectReason::InvalidRoster)?;
    }
    Ok(heroes)
}

/// Reduce a feature value to one scalar
///
/// Series are sampled at index `len / 2`. Null, empty series and nested
/// structures have no scalar representative.
pub fn sample_feature(value: &Value) -> Option<Value> {
    let sampled = match value {
        Value::Array(series) => series.get(series.len() / 2)?,
        other => other,
    };
    match sampled {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        scalar => Some(scalar.clone()),
    }
}

/// Look up and sample every configured feature, in configured order
pub fn extract_features(
    raw: &RawMatch,
    features: &[String],
) -> Result<Vec<(String, Value)>, RejectReason> {
    features
        .iter()
        .map(|name| {
            raw.field(name)
                .and_then(|value| sample_feature(&value))
                .map(|value| (name.clone(), value))
                .ok_or(RejectReason::MissingFeature)
        })
        .collect()
}
