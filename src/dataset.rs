//! Loading the filtered dataset into a columnar frame.
//!
//! The JSON-lines output of the filter is read in one pass with polars
//! rather than appended row by row, then narrowed to the requested column
//! group. The label column is always kept.

use crate::constants::{LABEL_COLUMN, hero_columns, is_hero_column};
use crate::error::{FilterError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

/// Column groups a model can be trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    /// `hero0..hero9`
    Heroes,
    /// Every sampled feature column
    Features,
    /// Heroes and features
    #[default]
    All,
}

/// Summary of a filtered dataset
#[derive(Debug, Clone, Default)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    /// Share of matches won by Radiant
    pub radiant_win_rate: Option<f64>,
    pub null_counts: Vec<(String, usize)>,
}

/// Read a filtered JSON-lines dataset and keep the selected columns plus the label
pub fn load_dataset(path: &Path, selection: ColumnSelection) -> Result<DataFrame> {
    let file = File::open(path)?;
    let frame = JsonReader::new(file)
        .with_json_format(JsonFormat::JsonLines)
        .finish()?;

    let available: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let columns = selected_columns(path, &available, selection)?;
    debug!(
        "Loaded {} rows from {}, keeping {} of {} columns",
        frame.height(),
        path.display(),
        columns.len(),
        available.len()
    );

    Ok(frame.select(columns)?)
}

fn selected_columns(
    path: &Path,
    available: &[String],
    selection: ColumnSelection,
) -> Result<Vec<String>> {
    let missing = |column: &str| FilterError::InvalidDataset {
        path: path.to_path_buf(),
        reason: format!("column '{}' not found", column),
    };

    if !available.iter().any(|name| name == LABEL_COLUMN) {
        return Err(missing(LABEL_COLUMN));
    }

    let heroes = hero_columns();
    if matches!(selection, ColumnSelection::Heroes | ColumnSelection::All) {
        if let Some(absent) = heroes.iter().find(|hero| !available.contains(*hero)) {
            return Err(missing(absent.as_str()));
        }
    }

    let features = available
        .iter()
        .filter(|name| name.as_str() != LABEL_COLUMN && !is_hero_column(name.as_str()))
        .cloned();

    let mut columns: Vec<String> = match selection {
        ColumnSelection::Heroes => heroes,
        ColumnSelection::Features => features.collect(),
        ColumnSelection::All => heroes.into_iter().chain(features).collect(),
    };
    columns.push(LABEL_COLUMN.to_string());
    Ok(columns)
}

/// Load a dataset and describe its size, label balance and missing values
pub fn summarize(path: &Path, selection: ColumnSelection) -> Result<DatasetSummary> {
    if fs::metadata(path)?.len() == 0 {
        return Ok(DatasetSummary::default());
    }

    let frame = load_dataset(path, selection)?;

    let rate_frame = frame
        .clone()
        .lazy()
        .select([col(LABEL_COLUMN).cast(DataType::Float64).mean()])
        .collect()?;
    let radiant_win_rate = rate_frame.column(LABEL_COLUMN)?.get(0)?.extract::<f64>();

    let null_counts = frame
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), column.null_count()))
        .collect();

    Ok(DatasetSummary {
        rows: frame.height(),
        columns: frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        radiant_win_rate,
        null_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATASET: &str = concat!(
        r#"{"hero0":1,"hero1":2,"hero2":3,"hero3":4,"hero4":5,"hero5":6,"hero6":7,"hero7":8,"hero8":9,"hero9":10,"radiant_xp_adv":120,"radiant_gold_adv":-300,"radiant_win":1}"#,
        "\n",
        r#"{"hero0":11,"hero1":12,"hero2":13,"hero3":14,"hero4":15,"hero5":16,"hero6":17,"hero7":18,"hero8":19,"hero9":20,"radiant_xp_adv":-40,"radiant_gold_adv":80,"radiant_win":0}"#,
        "\n",
        r#"{"hero0":21,"hero1":22,"hero2":23,"hero3":24,"hero4":25,"hero5":26,"hero6":27,"hero7":28,"hero8":29,"hero9":30,"radiant_xp_adv":500,"radiant_gold_adv":900,"radiant_win":1}"#,
        "\n",
    );

    fn write_dataset(temp_dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = temp_dir.path().join("matches_data.jsonl");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_all_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir, DATASET);

        let frame = load_dataset(&path, ColumnSelection::All).unwrap();
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.width(), 13);
    }

    #[test]
    fn test_load_column_groups() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir, DATASET);

        let heroes = load_dataset(&path, ColumnSelection::Heroes).unwrap();
        assert_eq!(heroes.width(), 11);
        assert!(heroes.column("hero9").is_ok());
        assert!(heroes.column("radiant_gold_adv").is_err());

        let features = load_dataset(&path, ColumnSelection::Features).unwrap();
        let names: Vec<String> = features
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec!["radiant_xp_adv", "radiant_gold_adv", "radiant_win"]);
    }

    #[test]
    fn test_missing_label_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir, "{\"hero0\":1}\n{\"hero0\":2}\n");

        assert!(matches!(
            load_dataset(&path, ColumnSelection::Features),
            Err(FilterError::InvalidDataset { .. })
        ));
    }

    #[test]
    fn test_summary() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir, DATASET);

        let summary = summarize(&path, ColumnSelection::All).unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns.len(), 13);
        let rate = summary.radiant_win_rate.unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(summary.null_counts.iter().all(|(_, nulls)| *nulls == 0));
    }

    #[test]
    fn test_summary_of_empty_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir, "");

        let summary = summarize(&path, ColumnSelection::All).unwrap();
        assert_eq!(summary.rows, 0);
        assert!(summary.radiant_win_rate.is_none());
    }
}
