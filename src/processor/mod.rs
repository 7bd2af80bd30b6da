//! Streaming match filter.
//!
//! Reads a match dump one record at a time, runs every match through the
//! admission checks and writes the accepted ones as normalized JSON lines
//! until the target count is reached, the source runs out, or the patch
//! window has been passed.

pub mod admission;
pub mod slots;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::admission::{WindowCheck, assign_hero_slots, check_patch_window, extract_features};
use self::streaming::{RecordSource, SourceItem};
use self::writer::RecordWriter;

use crate::config::{FilterConfig, SourceOrder};
use crate::constants::REQUIRED_HUMAN_PLAYERS;
use crate::error::{FilterError, Result};
use crate::models::{FilterStats, NormalizedRecord, RawMatch, RejectReason, Termination};
use crate::patch::PatchTable;

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Decision for a single match
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Accept(NormalizedRecord),
    Reject(RejectReason),
    /// The source has moved past the patch window
    Stop,
}

/// Patch table plus the resolved target patch
#[derive(Debug, Clone)]
struct PatchWindow {
    table: PatchTable,
    target_index: usize,
    order: SourceOrder,
}

/// Configurable filter turning raw matches into dataset rows
#[derive(Debug, Clone)]
pub struct MatchFilter {
    config: FilterConfig,
    window: Option<PatchWindow>,
}

impl MatchFilter {
    /// Create a filter; a patch table is required when the config names a target patch
    pub fn new(config: FilterConfig, patches: Option<PatchTable>) -> Result<Self> {
        config.validate()?;

        let window = match (&config.patch, patches) {
            (Some(constraint), Some(table)) => {
                let target_index = table.position(&constraint.target)?;
                debug!(
                    "Patch window: {} (index {} of {}), source order {:?}",
                    constraint.target,
                    target_index,
                    table.len(),
                    constraint.order
                );
                Some(PatchWindow {
                    table,
                    target_index,
                    order: constraint.order,
                })
            }
            (Some(constraint), None) => {
                return Err(FilterError::Configuration {
                    message: format!(
                        "target patch '{}' requires a patch table",
                        constraint.target
                    ),
                });
            }
            (None, Some(_)) => {
                warn!("Patch table supplied without a target patch, ignoring it");
                None
            }
            (None, None) => None,
        };

        Ok(Self { config, window })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Run every admission check against one match
    ///
    /// Errors are reserved for conditions that invalidate the whole run,
    /// such as a match dated before the first known patch.
    pub fn evaluate(&self, raw: &RawMatch) -> Result<Admission> {
        if raw.human_players != REQUIRED_HUMAN_PLAYERS {
            return Ok(Admission::Reject(RejectReason::HumanPlayers));
        }
        if raw.game_mode != self.config.game_mode {
            return Ok(Admission::Reject(RejectReason::GameMode));
        }
        if raw.lobby_type != self.config.lobby_type {
            return Ok(Admission::Reject(RejectReason::LobbyType));
        }

        if let Some(window) = &self.window {
            let match_patch = window.table.resolve_index(raw.start_date()?)?;
            match check_patch_window(match_patch, window.target_index, window.order) {
                WindowCheck::Inside => {}
                WindowCheck::Outside => {
                    return Ok(Admission::Reject(RejectReason::PatchOutOfWindow));
                }
                WindowCheck::Beyond => return Ok(Admission::Stop),
            }
        }

        let heroes = match assign_hero_slots(&raw.players) {
            Ok(heroes) => heroes,
            Err(reason) => return Ok(Admission::Reject(reason)),
        };
        let features = match extract_features(raw, &self.config.features) {
            Ok(features) => features,
            Err(reason) => return Ok(Admission::Reject(reason)),
        };
        let Some(radiant_win) = raw.radiant_win else {
            return Ok(Admission::Reject(RejectReason::MissingLabel));
        };

        Ok(Admission::Accept(NormalizedRecord {
            heroes,
            features,
            radiant_win: u8::from(radiant_win),
        }))
    }

    /// Filter matches from `reader` into JSON lines on `writer`
    pub fn filter<R: BufRead, W: Write>(&self, reader: R, writer: W) -> Result<FilterStats> {
        let start_time = Instant::now();
        let mut stats = FilterStats::default();
        let mut source = RecordSource::new(reader, self.config.input_format)?;
        let mut sink = RecordWriter::new(writer);
        let progress = self.progress_bar();

        while stats.accepted < self.config.target_count {
            let Some(item) = source.next_item()? else {
                stats.termination = Termination::SourceExhausted;
                break;
            };
            stats.scanned += 1;

            let raw = match item {
                SourceItem::Record(raw) => raw,
                SourceItem::Malformed => {
                    stats.malformed += 1;
                    continue;
                }
            };

            match self.evaluate(&raw)? {
                Admission::Accept(record) => {
                    sink.write_record(&record)?;
                    stats.accepted += 1;
                    progress.inc(1);
                }
                Admission::Reject(reason) => {
                    debug!("Rejected match: {}", reason.label());
                    stats.record_rejection(reason);
                }
                Admission::Stop => {
                    info!("Passed the target patch window, stopping");
                    stats.termination = Termination::PatchBoundary;
                    break;
                }
            }
        }

        if stats.accepted == self.config.target_count {
            stats.termination = Termination::TargetReached;
        }

        let written = sink.finish()?;
        progress.finish_with_message("done");
        debug!("Flushed {} records", written);

        if stats.malformed > 0 {
            warn!("Skipped {} malformed records", stats.malformed);
        }
        stats.elapsed = start_time.elapsed();
        info!(
            "Accepted {} of {} scanned matches ({:?})",
            stats.accepted, stats.scanned, stats.termination
        );

        Ok(stats)
    }

    /// Filter the dump at `input` into a new JSON-lines file at `output`
    pub fn run(&self, input: &Path, output: &Path) -> Result<FilterStats> {
        if !input.exists() {
            return Err(FilterError::SourceNotFound {
                path: input.to_path_buf(),
            });
        }

        let reader = BufReader::new(File::open(input)?);

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let writer = File::create(output)?;

        debug!("Filtering {} into {}", input.display(), output.display());
        let mut stats = self.filter(reader, writer)?;
        stats.output_path = output.to_path_buf();
        Ok(stats)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(self.config.target_count as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Filtering matches");
        pb
    }
}
