//! Tests for the match filter
//!
//! Matches are built as JSON values so each test states only the fields it
//! cares about.


use serde_json::{Value, json};

/// Unix timestamp for noon UTC on 2020-01-15
pub const JAN_15_2020: i64 = 1_579_089_600;
/// Unix timestamp for noon UTC on 2020-02-01
pub const FEB_01_2020: i64 = 1_580_558_400;
/// Unix timestamp for noon UTC on 2020-03-10
pub const MAR_10_2020: i64 = 1_583_841_600;

/// Slots in dump order: Radiant 0..=4, then Dire 128..=132
pub const STANDARD_SLOTS: [u8; 10] = [0, 1, 2, 3, 4, 128, 129, 130, 131, 132];

/// A ranked All Draft match that passes every default check
pub fn valid_match(first_hero: i64) -> Value {
    let players: Vec<Value> = STANDARD_SLOTS
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            json!({
                "player_slot": slot,
                "leaver_status": 0,
                "hero_id": first_hero + i as i64,
            })
        })
        .collect();

    json!({
        "match_id": 5_000_000_000i64 + first_hero,
        "human_players": 10,
        "game_mode": 22,
        "lobby_type": 7,
        "start_time": JAN_15_2020,
        "radiant_win": true,
        "players": players,
        "radiant_xp_adv": [0, 120, 260, 410, 300],
        "radiant_gold_adv": [0, -80, -150, 90],
    })
}

/// Set a top-level field on a match
pub fn with_field(mut match_json: Value, key: &str, value: Value) -> Value {
    match_json[key] = value;
    match_json
}

/// Render matches as a JSON-lines dump
pub fn as_lines(matches: &[Value]) -> String {
    matches
        .iter()
        .map(|m| format!("{}\n", m))
        .collect::<String>()
}

/// Render matches as a single JSON array dump
pub fn as_array(matches: &[Value]) -> String {
    serde_json::to_string_pretty(&Value::Array(matches.to_vec())).unwrap()
}
