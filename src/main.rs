use cardpulse::analytics::{CoarseShift, EventKind, FilterOption, Selectors};
use cardpulse::board::{Snapshot, TsGroup};
use cardpulse::config::Config;
use cardpulse::dashboard::Dashboard;
use cardpulse::{logging, report};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "cardpulse")]
#[command(about = "Support-ticket analytics over a card board's audit log")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/cardpulse/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
  format: Format,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  Text,
  Json,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Resolution, TS resolution and first action times per card
  Timing {
    snapshot: PathBuf,
    #[command(flatten)]
    selectors: SelectorArgs,
  },
  /// Cards per local hour of creation or completion
  Heatmap {
    snapshot: PathBuf,
    #[command(flatten)]
    view: ViewArgs,
    #[command(flatten)]
    selectors: SelectorArgs,
  },
  /// Cards left after the filter pipeline
  Filter {
    snapshot: PathBuf,
    #[command(flatten)]
    selectors: SelectorArgs,
  },
  /// Heatmap counts rolled up by shift
  Shifts {
    snapshot: PathBuf,
    #[command(flatten)]
    view: ViewArgs,
    #[command(flatten)]
    selectors: SelectorArgs,
  },
  /// Cards per product team
  Teams {
    snapshot: PathBuf,
    #[arg(short, long, default_value = "created")]
    event: EventKind,
    #[command(flatten)]
    selectors: SelectorArgs,
  },
  /// Selectable values for every filter
  Options { snapshot: PathBuf },
}

#[derive(ClapArgs, Debug)]
struct ViewArgs {
  /// created or completed
  #[arg(short, long, default_value = "created")]
  event: EventKind,

  /// Restrict to one support team (TS1, TS2)
  #[arg(short, long)]
  team: Option<TsGroup>,
}

#[derive(ClapArgs, Debug)]
struct SelectorArgs {
  /// Member id that must be on the card
  #[arg(long)]
  member: Option<String>,
  /// Status list id
  #[arg(long)]
  list: Option<String>,
  /// Shift of creation (Ca1..Ca6)
  #[arg(long)]
  shift: Option<CoarseShift>,
  /// Full name of the member who removed someone from the card
  #[arg(long)]
  removed_by: Option<String>,
  /// App label without the "App:" prefix
  #[arg(long)]
  app: Option<String>,
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  completed_hour: Option<u32>,
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  created_hour: Option<u32>,
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  ts1_completed_hour: Option<u32>,
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  ts1_created_hour: Option<u32>,
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  ts2_completed_hour: Option<u32>,
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  ts2_created_hour: Option<u32>,
}

impl From<SelectorArgs> for Selectors {
  fn from(args: SelectorArgs) -> Self {
    Selectors {
      member_id: args.member,
      list_id: args.list,
      shift: args.shift,
      removed_by: args.removed_by,
      app: args.app,
      completed_hour: args.completed_hour,
      created_hour: args.created_hour,
      ts1_completed_hour: args.ts1_completed_hour,
      ts1_created_hour: args.ts1_created_hour,
      ts2_completed_hour: args.ts2_completed_hour,
      ts2_created_hour: args.ts2_created_hour,
    }
  }
}

/// Print a report as a text table or as pretty JSON
fn print_report<T: Serialize + ?Sized>(
  format: Format,
  text: impl FnOnce() -> String,
  json: &T,
) -> Result<()> {
  match format {
    Format::Text => print!("{}", text()),
    Format::Json => {
      let encoded = serde_json::to_string_pretty(json)
        .map_err(|e| eyre!("Failed to encode output: {}", e))?;
      println!("{}", encoded);
    }
  }
  Ok(())
}

fn open(snapshot: &Path, config: &Config) -> Result<Dashboard> {
  let snapshot = Snapshot::load(snapshot)?;
  Ok(Dashboard::new(snapshot, config.reference_data()))
}

fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Flushes buffered log lines on drop
  let _guard = logging::init_tracing(&config.log)?;
  debug!(command = ?args.command, "Starting");

  let format = args.format;
  match args.command {
    Command::Timing {
      snapshot,
      selectors,
    } => {
      let dashboard = open(&snapshot, &config)?;
      let selectors = Selectors::from(selectors);
      let rows = dashboard.timings(&selectors);
      let summary = dashboard.timing_summary(&selectors);
      print_report(
        format,
        || report::render_timings(&rows, &summary),
        &(&rows, &summary),
      )
    }
    Command::Heatmap {
      snapshot,
      view,
      selectors,
    } => {
      let dashboard = open(&snapshot, &config)?;
      let heatmap = dashboard.heatmap(&selectors.into(), view.event, view.team);
      print_report(format, || report::render_heatmap(&heatmap), heatmap.as_ref())
    }
    Command::Filter {
      snapshot,
      selectors,
    } => {
      let dashboard = open(&snapshot, &config)?;
      let cards = dashboard.filtered(&selectors.into());
      let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
      print_report(
        format,
        || report::render_cards(&cards, dashboard.refs()),
        &ids,
      )
    }
    Command::Shifts {
      snapshot,
      view,
      selectors,
    } => {
      let dashboard = open(&snapshot, &config)?;
      let totals = dashboard.shift_totals(&selectors.into(), view.event, view.team);
      let labelled: Vec<(&str, usize)> = totals.iter().map(|(s, n)| (s.label(), *n)).collect();
      print_report(format, || report::render_shift_totals(&totals), &labelled)
    }
    Command::Teams {
      snapshot,
      event,
      selectors,
    } => {
      let dashboard = open(&snapshot, &config)?;
      let rollup = dashboard.team_rollup(&selectors.into(), event);
      print_report(format, || report::render_team_rollup(&rollup), &rollup)
    }
    Command::Options { snapshot } => {
      let dashboard = open(&snapshot, &config)?;
      let options = dashboard.options();
      let labelled: Vec<(&str, &[FilterOption])> = options
        .iter()
        .map(|(stage, values)| (stage.label(), values.as_slice()))
        .collect();
      print_report(format, || report::render_options(&options), &labelled)
    }
  }
}
