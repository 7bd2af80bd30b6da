//! Command-line interface components.

use crate::config::{FilterConfig, InputFormat, PatchConstraint, SourceOrder};
use crate::constants::defaults;
use crate::dataset::{ColumnSelection, DatasetSummary, summarize};
use crate::models::{FilterStats, Termination};
use crate::patch::PatchTable;
use crate::processor::MatchFilter;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dota_match_filter")]
#[command(about = "Filter Dota 2 match dumps into a compact outcome-prediction dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream a match dump and write accepted matches as JSON lines
    Filter(FilterArgs),

    /// Load a filtered dataset and report its size and label balance
    Summary(SummaryArgs),
}

#[derive(clap::Args, Debug)]
pub struct FilterArgs {
    /// Match dump: one JSON array or one match object per line
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output JSON-lines file (default: matches_data.jsonl next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of matches to collect
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Required game mode
    #[arg(long)]
    pub game_mode: Option<i64>,

    /// Required lobby type
    #[arg(long)]
    pub lobby_type: Option<i64>,

    /// Match field to copy into each record (repeatable); series are sampled at the midpoint
    #[arg(short, long = "feature", value_name = "NAME")]
    pub features: Vec<String>,

    /// Emit hero slots and the label only
    #[arg(long, conflicts_with = "features")]
    pub no_features: bool,

    /// Patch table: JSON array of {name, date}
    #[arg(long)]
    pub patches: Option<PathBuf>,

    /// Keep only matches played on this patch (overrides the config file's target)
    #[arg(long, requires = "patches")]
    pub patch: Option<String>,

    /// Time ordering of the dump, used with --patch
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Layout of the dump
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Filtered JSON-lines dataset
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Column group to load
    #[arg(long, value_enum, default_value = "all")]
    pub columns: ColumnsArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OrderArg {
    NewestFirst,
    OldestFirst,
    Unordered,
}

impl From<OrderArg> for SourceOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::NewestFirst => SourceOrder::NewestFirst,
            OrderArg::OldestFirst => SourceOrder::OldestFirst,
            OrderArg::Unordered => SourceOrder::Unordered,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Auto,
    Array,
    Lines,
}

impl From<FormatArg> for InputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Array => InputFormat::Array,
            FormatArg::Lines => InputFormat::Lines,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ColumnsArg {
    Heroes,
    Features,
    All,
}

impl From<ColumnsArg> for ColumnSelection {
    fn from(arg: ColumnsArg) -> Self {
        match arg {
            ColumnsArg::Heroes => ColumnSelection::Heroes,
            ColumnsArg::Features => ColumnSelection::Features,
            ColumnsArg::All => ColumnSelection::All,
        }
    }
}

impl FilterArgs {
    /// Get the output path, defaulting to the input's directory
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self
                .input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(defaults::OUTPUT_FILENAME),
        }
    }

    /// Merge the optional config file with command-line overrides
    pub fn to_config(&self) -> Result<FilterConfig> {
        let mut config = match &self.config {
            Some(path) => FilterConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => FilterConfig::default(),
        };

        if let Some(count) = self.count {
            config = config.with_target_count(count);
        }
        if let Some(game_mode) = self.game_mode {
            config = config.with_game_mode(game_mode);
        }
        if let Some(lobby_type) = self.lobby_type {
            config = config.with_lobby_type(lobby_type);
        }
        if self.no_features {
            config = config.with_features(Vec::<String>::new());
        } else if !self.features.is_empty() {
            config = config.with_features(self.features.iter().cloned());
        }
        if let Some(target) = &self.patch {
            match config.patch.as_mut() {
                // Keep the configured source order, only the target changes
                Some(constraint) => constraint.target = target.clone(),
                None => config = config.with_patch(PatchConstraint::new(target.clone())),
            }
        }
        if let (Some(order), Some(patch)) = (self.order, config.patch.as_mut()) {
            patch.order = order.into();
        }
        if let Some(format) = self.format {
            config = config.with_input_format(format.into());
        }
        if !self.no_progress {
            config = config.with_progress();
        }

        config.validate().context("Invalid filter configuration")?;
        Ok(config)
    }
}

/// Dispatch a parsed command line
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Filter(filter_args) => run_filter(&filter_args).map(|_| ()),
        Command::Summary(summary_args) => run_summary(&summary_args).map(|_| ()),
    }
}

pub fn run_filter(args: &FilterArgs) -> Result<FilterStats> {
    let config = args.to_config()?;
    let output = args.output_path();

    let patches = match &args.patches {
        Some(path) => Some(
            PatchTable::load(path)
                .with_context(|| format!("Failed to load patch table {}", path.display()))?,
        ),
        None if config.patch.is_some() => {
            anyhow::bail!("A target patch was configured but no --patches table was given")
        }
        None => None,
    };

    println!("{}", "Filtering match dump".bright_green().bold());
    println!("  {} {}", "Input:".bright_cyan(), args.input.display());
    println!("  {} {}", "Output:".bright_cyan(), output.display());
    println!(
        "  {} {} (game mode {}, lobby type {})",
        "Target:".bright_cyan(),
        config.target_count.to_string().bright_white().bold(),
        config.game_mode,
        config.lobby_type
    );
    if let Some(patch) = &config.patch {
        println!(
            "  {} {} ({:?})",
            "Patch:".bright_cyan(),
            patch.target,
            patch.order
        );
    }

    let filter = MatchFilter::new(config, patches)?;
    let stats = filter
        .run(&args.input, &output)
        .with_context(|| format!("Failed to filter {}", args.input.display()))?;

    report_filter_stats(&stats);
    Ok(stats)
}

fn report_filter_stats(stats: &FilterStats) {
    println!("\n{}", "Filter Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.elapsed.as_millis().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Matches scanned:".bright_cyan(),
        stats.scanned.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Matches accepted:".bright_cyan(),
        stats.accepted.to_string().bright_white().bold()
    );
    if stats.malformed > 0 {
        println!(
            "  {} {}",
            "Malformed records:".bright_red(),
            stats.malformed.to_string().bright_red()
        );
    }
    for (reason, count) in &stats.rejections {
        println!(
            "  {} {}",
            format!("Rejected ({}):", reason.label()).bright_black(),
            count
        );
    }

    let stopped = match stats.termination {
        Termination::TargetReached => "target count reached",
        Termination::SourceExhausted => "end of source",
        Termination::PatchBoundary => "left the target patch",
    };
    println!("  {} {}", "Stopped:".bright_cyan(), stopped);
}

pub fn run_summary(args: &SummaryArgs) -> Result<DatasetSummary> {
    let summary = summarize(&args.dataset, args.columns.into())
        .with_context(|| format!("Failed to load dataset {}", args.dataset.display()))?;

    println!("{}", "Dataset Summary".bright_green().bold());
    println!("  {} {}", "Dataset:".bright_cyan(), args.dataset.display());
    println!(
        "  {} {}",
        "Rows:".bright_cyan(),
        summary.rows.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Columns:".bright_cyan(),
        summary.columns.join(", ")
    );
    if let Some(rate) = summary.radiant_win_rate {
        println!(
            "  {} {:.1}%",
            "Radiant win rate:".bright_cyan(),
            rate * 100.0
        );
    }
    for (column, nulls) in summary.null_counts.iter().filter(|(_, nulls)| *nulls > 0) {
        println!(
            "  {} {}",
            format!("Missing {}:", column).bright_red(),
            nulls
        );
    }

    Ok(summary)
}
