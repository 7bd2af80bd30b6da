//! Integration tests for the file-based filter pipeline
//!
//! Each test writes a small dump and patch table to a temporary directory,
//! runs the filter end to end and reads the dataset back.

use dota_match_filter::dataset::{ColumnSelection, load_dataset, summarize};
use dota_match_filter::{
    FilterConfig, FilterError, MatchFilter, PatchConstraint, PatchTable, SourceOrder, Termination,
};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DAY: i64 = 86_400;
/// 2020-01-01 00:00:00 UTC
const JAN_01_2020: i64 = 1_577_836_800;

const PATCHES: &str = r#"[
  {"name": "7.23", "date": "2019-11-26T00:00:00.000Z", "id": 43},
  {"name": "7.24", "date": "2020-01-26T00:00:00.000Z", "id": 44},
  {"name": "7.25", "date": "2020-03-17T00:00:00.000Z", "id": 45}
]"#;

/// Build a match; `seed` varies the heroes and the outcome
fn build_match(seed: i64, start_time: i64) -> Value {
    let slots = [128u8, 129, 130, 131, 132, 0, 1, 2, 3, 4];
    let players: Vec<Value> = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            json!({
                "account_id": 1000 + i,
                "player_slot": slot,
                "leaver_status": 0,
                "hero_id": (seed * 10 + i as i64) % 130 + 1,
                "kills": i,
            })
        })
        .collect();

    json!({
        "match_id": seed,
        "human_players": 10,
        "game_mode": 22,
        "lobby_type": 7,
        "start_time": start_time,
        "duration": 2400 + seed,
        "radiant_win": seed % 2 == 0,
        "players": players,
        "radiant_gold_adv": [0, seed, 2 * seed, 3 * seed, 4 * seed],
        "radiant_xp_adv": [0, -seed, -2 * seed],
    })
}

fn write_lines(dir: &Path, name: &str, matches: &[Value]) -> PathBuf {
    let path = dir.join(name);
    let contents: String = matches.iter().map(|m| format!("{}\n", m)).collect();
    fs::write(&path, contents).unwrap();
    path
}

fn read_records(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_filter_file_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let matches: Vec<Value> = (1..=30)
        .map(|seed| build_match(seed, JAN_01_2020 + seed * DAY))
        .collect();
    let input = write_lines(temp_dir.path(), "bigdata.json", &matches);
    let output = temp_dir.path().join("out").join("matches_data.jsonl");

    let config = FilterConfig::default().with_target_count(25);
    let filter = MatchFilter::new(config, None).unwrap();
    let stats = filter.run(&input, &output).unwrap();

    assert_eq!(stats.accepted, 25);
    assert_eq!(stats.termination, Termination::TargetReached);
    assert_eq!(stats.output_path, output);

    let records = read_records(&output);
    assert_eq!(records.len(), 25);
    for (record, source) in records.iter().zip(&matches) {
        // Dire players are listed first in the dump but land in hero5..hero9
        let source_heroes: Vec<i64> = source["players"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["hero_id"].as_i64().unwrap())
            .collect();
        assert_eq!(record["hero5"].as_i64().unwrap(), source_heroes[0]);
        assert_eq!(record["hero0"].as_i64().unwrap(), source_heroes[5]);

        let record_heroes: HashSet<i64> = (0..10)
            .map(|i| record[format!("hero{}", i)].as_i64().unwrap())
            .collect();
        let expected: HashSet<i64> = source_heroes.into_iter().collect();
        assert_eq!(record_heroes, expected);

        let expected_label = if source["radiant_win"].as_bool().unwrap() { 1 } else { 0 };
        assert_eq!(record["radiant_win"], json!(expected_label));
        assert_eq!(record["radiant_gold_adv"], source["radiant_gold_adv"][2]);
        assert_eq!(record["radiant_xp_adv"], source["radiant_xp_adv"][1]);
    }
}

#[test]
fn test_filter_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let matches: Vec<Value> = (1..=12)
        .map(|seed| build_match(seed, JAN_01_2020 + seed * DAY))
        .collect();
    let input = write_lines(temp_dir.path(), "bigdata.json", &matches);
    let first = temp_dir.path().join("first.jsonl");
    let second = temp_dir.path().join("second.jsonl");

    let filter = MatchFilter::new(FilterConfig::default(), None).unwrap();
    filter.run(&input, &first).unwrap();
    filter.run(&input, &second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_patch_filtered_run_over_newest_first_dump() {
    let temp_dir = TempDir::new().unwrap();
    let patches_path = temp_dir.path().join("patches.json");
    fs::write(&patches_path, PATCHES).unwrap();

    // 100 days back from 2020-04-09: starts in 7.25, crosses 7.24, ends in 7.23
    let newest = JAN_01_2020 + 99 * DAY;
    let matches: Vec<Value> = (0..100)
        .map(|seed| build_match(seed, newest - seed * DAY))
        .collect();
    let input = write_lines(temp_dir.path(), "bigdata.json", &matches);
    let output = temp_dir.path().join("matches_data.jsonl");

    let config = FilterConfig::default()
        .with_patch(PatchConstraint::new("7.24").with_order(SourceOrder::NewestFirst));
    let table = PatchTable::load(&patches_path).unwrap();
    let filter = MatchFilter::new(config, Some(table)).unwrap();
    let stats = filter.run(&input, &output).unwrap();

    // 7.24 covers 2020-01-26 ..= 2020-03-16: 51 days
    assert_eq!(stats.accepted, 51);
    assert_eq!(stats.termination, Termination::PatchBoundary);
    assert_eq!(read_records(&output).len(), 51);
}

#[test]
fn test_array_dump_with_noise() {
    let temp_dir = TempDir::new().unwrap();
    let mut leaver = build_match(3, JAN_01_2020);
    leaver["players"][0]["leaver_status"] = json!(1);
    let dump = format!(
        "[\n{},\n{{\"match_id\": 2, \"human_players\": \n}},\n{},\n{}\n]\n",
        build_match(1, JAN_01_2020),
        leaver,
        build_match(4, JAN_01_2020)
    );
    let input = temp_dir.path().join("bigdata.json");
    fs::write(&input, dump).unwrap();
    let output = temp_dir.path().join("matches_data.jsonl");

    let filter = MatchFilter::new(FilterConfig::default(), None).unwrap();
    let stats = filter.run(&input, &output).unwrap();

    assert_eq!(stats.scanned, 4);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.termination, Termination::SourceExhausted);
}

#[test]
fn test_missing_source_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let filter = MatchFilter::new(FilterConfig::default(), None).unwrap();
    let result = filter.run(
        &temp_dir.path().join("absent.json"),
        &temp_dir.path().join("out.jsonl"),
    );
    assert!(matches!(result, Err(FilterError::SourceNotFound { .. })));
}

#[test]
fn test_filtered_output_loads_as_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let matches: Vec<Value> = (1..=8)
        .map(|seed| build_match(seed, JAN_01_2020 + seed * DAY))
        .collect();
    let input = write_lines(temp_dir.path(), "bigdata.json", &matches);
    let output = temp_dir.path().join("matches_data.jsonl");

    let config = FilterConfig::default().with_features(["radiant_gold_adv", "duration"]);
    MatchFilter::new(config, None)
        .unwrap()
        .run(&input, &output)
        .unwrap();

    let frame = load_dataset(&output, ColumnSelection::Features).unwrap();
    assert_eq!(frame.height(), 8);
    assert_eq!(frame.width(), 3);

    let summary = summarize(&output, ColumnSelection::All).unwrap();
    assert_eq!(summary.rows, 8);
    assert_eq!(summary.columns.len(), 13);
    // Even seeds are Radiant wins
    assert!((summary.radiant_win_rate.unwrap() - 0.5).abs() < 1e-9);
}
