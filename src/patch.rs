//! Patch table loading and date-to-patch resolution.
//!
//! The table is read once at startup from a JSON array of `{name, date}`
//! objects and stays read-only for the rest of the run.

use crate::error::{FilterError, Result};
use crate::models::Patch;
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Chronologically ordered list of game patches
#[derive(Debug, Clone)]
pub struct PatchTable {
    patches: Vec<Patch>,
}

impl PatchTable {
    /// Load a patch table from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let patches: Vec<Patch> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| FilterError::PatchTable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if patches.is_empty() {
            return Err(FilterError::PatchTable {
                path: path.to_path_buf(),
                reason: "patch table is empty".to_string(),
            });
        }

        debug!("Loaded {} patches from {}", patches.len(), path.display());
        Ok(Self::from_patches(patches))
    }

    /// Build a table from patches, sorting them by date if needed
    pub fn from_patches(mut patches: Vec<Patch>) -> Self {
        if !patches.is_sorted_by_key(|patch| patch.date) {
            warn!("Patch table is not in date order, sorting it");
            patches.sort_by_key(|patch| patch.date);
        }
        Self { patches }
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Chronological index of a patch by name
    pub fn position(&self, name: &str) -> Result<usize> {
        self.patches
            .iter()
            .position(|patch| patch.name == name)
            .ok_or_else(|| FilterError::UnknownPatch {
                name: name.to_string(),
            })
    }

    /// Index of the latest patch released on or before `date`
    pub fn resolve_index(&self, date: NaiveDate) -> Result<usize> {
        let released = self.patches.partition_point(|patch| patch.date <= date);
        if released == 0 {
            let first = self.patches.first().ok_or_else(|| FilterError::Configuration {
                message: "patch table is empty".to_string(),
            })?;
            return Err(FilterError::DateBeforeFirstPatch {
                date,
                first_patch: first.name.clone(),
                first_date: first.date,
            });
        }
        Ok(released - 1)
    }

    /// Latest patch released on or before `date`
    pub fn resolve(&self, date: NaiveDate) -> Result<&Patch> {
        let index = self.resolve_index(date)?;
        Ok(&self.patches[index])
    }
}
