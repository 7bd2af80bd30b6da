//! Configuration management and validation.
//!
//! One configurable admission policy covers every variant of the match
//! filter: target count, game mode, lobby type, sampled features and an
//! optional patch window.

use crate::constants::{HERO_SLOTS, LABEL_COLUMN, defaults, is_hero_column};
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Layout of the source dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Detect from the first non-whitespace byte
    #[default]
    Auto,
    /// One JSON array of match objects
    Array,
    /// One JSON object per line
    Lines,
}

/// Time ordering of the source dump, used by the patch window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrder {
    /// Newest matches first: later patches are skipped, an earlier patch ends the run
    #[default]
    NewestFirst,
    /// Oldest matches first: earlier patches are skipped, a later patch ends the run
    OldestFirst,
    /// No ordering guarantee: every match outside the patch is skipped
    Unordered,
}

/// Restrict the dataset to matches played on one patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConstraint {
    /// Patch name as it appears in the patch table
    pub target: String,

    #[serde(default)]
    pub order: SourceOrder,
}

impl PatchConstraint {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            order: SourceOrder::default(),
        }
    }

    pub fn with_order(mut self, order: SourceOrder) -> Self {
        self.order = order;
        self
    }
}

/// Admission configuration for the match filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Stop after this many accepted matches
    pub target_count: usize,

    /// Required `game_mode`
    pub game_mode: i64,

    /// Required `lobby_type`
    pub lobby_type: i64,

    /// Extra match fields copied into each record, series sampled at the midpoint
    pub features: Vec<String>,

    /// Optional patch window
    pub patch: Option<PatchConstraint>,

    /// Layout of the source dump
    pub input_format: InputFormat,

    /// Show a progress bar while filtering
    pub show_progress: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            target_count: defaults::TARGET_COUNT,
            game_mode: defaults::GAME_MODE,
            lobby_type: defaults::LOBBY_TYPE,
            features: defaults::FEATURES.iter().map(|f| f.to_string()).collect(),
            patch: None,
            input_format: InputFormat::Auto,
            show_progress: false,
        }
    }
}

impl FilterConfig {
    /// Load configuration from a JSON file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            FilterError::Configuration {
                message: format!("invalid config file {}: {}", path.display(), e),
            }
        })?;
        debug!("Loaded filter configuration from {}", path.display());
        Ok(config)
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_game_mode(mut self, game_mode: i64) -> Self {
        self.game_mode = game_mode;
        self
    }

    pub fn with_lobby_type(mut self, lobby_type: i64) -> Self {
        self.lobby_type = lobby_type;
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_patch(mut self, patch: PatchConstraint) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn with_input_format(mut self, input_format: InputFormat) -> Self {
        self.input_format = input_format;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Check the configuration for settings that would produce a broken dataset
    pub fn validate(&self) -> Result<()> {
        if self.target_count == 0 {
            return Err(FilterError::Configuration {
                message: "target count must be at least 1".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(self.features.len());
        for feature in &self.features {
            if feature.is_empty() {
                return Err(FilterError::Configuration {
                    message: "feature names must not be empty".to_string(),
                });
            }
            // Features share the output object with the hero slots and the label
            if feature == LABEL_COLUMN || is_hero_column(feature) {
                return Err(FilterError::Configuration {
                    message: format!(
                        "feature '{}' collides with a reserved column (hero0..hero{} or {})",
                        feature,
                        HERO_SLOTS - 1,
                        LABEL_COLUMN
                    ),
                });
            }
            if !seen.insert(feature.as_str()) {
                return Err(FilterError::Configuration {
                    message: format!("feature '{}' is listed twice", feature),
                });
            }
        }

        if let Some(patch) = &self.patch {
            if patch.target.trim().is_empty() {
                return Err(FilterError::Configuration {
                    message: "target patch name must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}
