use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use chores::config::{config_dir, AppConfig, LoggingConfig};
use chores::notion::{parse_query_response, CompletionRecord};
use chores::{complete, due_label, load_snapshot, Board, Chore, ChoreWithStatus};

const USAGE: &str = "\
usage:
  chores [board] [SNAPSHOT] [--json]
  chores complete ID [SNAPSHOT] [--json]
  chores log-entry ID --by PERSON_ID [SNAPSHOT]
  chores import-notion QUERY_JSON";

fn main() -> Result<()> {
    let cfg    = AppConfig::load()?;
    let _guard = init_logging(&cfg.logging)?;
    let args   = Args::parse(std::env::args().skip(1))?;
    let now    = Local::now().naive_local();

    match args.command.as_deref() {
        None | Some("board") => cmd_board(&cfg, &args, now),
        Some("complete")      => cmd_complete(&cfg, &args, now),
        Some("log-entry")     => cmd_log_entry(&cfg, &args, now),
        Some("import-notion") => cmd_import_notion(&args),
        Some("help") | Some("--help") | Some("-h") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => bail!("unknown command `{other}`\n{USAGE}"),
    }
}

// ─── Arguments ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Args {
    command:    Option<String>,
    positional: Vec<String>,
    json:       bool,
    by:         Option<String>,
}

impl Args {
    fn parse(mut it: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = Args::default();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--json" => args.json = true,
                "--by"   => args.by = Some(it.next().ok_or_else(|| anyhow!("--by needs a person id"))?),
                _ if args.command.is_none() => args.command = Some(arg),
                _ => args.positional.push(arg),
            }
        }
        Ok(args)
    }

    fn snapshot_path(&self, idx: usize, cfg: &AppConfig) -> Result<PathBuf> {
        self.positional
            .get(idx)
            .map(PathBuf::from)
            .or_else(|| cfg.board.snapshot.clone())
            .ok_or_else(|| anyhow!("no snapshot given and no [board] snapshot in {}",
                config_dir().join("config.toml").display()))
    }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn init_logging(cfg: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level = LevelFilter::from_str(&cfg.level)
        .with_context(|| format!("invalid log level `{}`", cfg.level))?;

    match &cfg.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "chores.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(level)
                .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
                .init();
            Ok(Some(guard))
        }
        None => {
            // stderr keeps stdout clean for --json output
            tracing_subscriber::registry()
                .with(level)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(None)
        }
    }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn read_snapshot(path: &Path) -> Result<Vec<Chore>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let chores = load_snapshot(&raw).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!("loaded {} chores from {}", chores.len(), path.display());
    Ok(chores)
}

fn cmd_board(cfg: &AppConfig, args: &Args, now: NaiveDateTime) -> Result<()> {
    let chores = read_snapshot(&args.snapshot_path(0, cfg)?)?;
    print_board(&Board::build(&chores, now), now, args.json)
}

fn cmd_complete(cfg: &AppConfig, args: &Args, now: NaiveDateTime) -> Result<()> {
    let id = args.positional.first().ok_or_else(|| anyhow!("complete needs a chore id\n{USAGE}"))?;
    let mut chores = read_snapshot(&args.snapshot_path(1, cfg)?)?;
    complete(&mut chores, id, now)?;
    print_board(&Board::build(&chores, now), now, args.json)
}

fn cmd_log_entry(cfg: &AppConfig, args: &Args, now: NaiveDateTime) -> Result<()> {
    let id = args.positional.first().ok_or_else(|| anyhow!("log-entry needs a chore id\n{USAGE}"))?;
    let by = args.by.as_deref().ok_or_else(|| anyhow!("log-entry needs --by PERSON_ID"))?;
    let notion = cfg.notion.as_ref().ok_or_else(|| {
        anyhow!("No [notion] section found in {}", config_dir().join("config.toml").display())
    })?;

    let chores = read_snapshot(&args.snapshot_path(1, cfg)?)?;
    let chore  = chores.iter().find(|c| &c.id == id).ok_or_else(|| anyhow!("no chore with id {id}"))?;
    let record = CompletionRecord::for_chore(chore, by, now.date())?;

    println!("{}", serde_json::to_string_pretty(&record.to_create_body(&notion.chore_log_db_id))?);
    Ok(())
}

fn cmd_import_notion(args: &Args) -> Result<()> {
    let path = args.positional.first().ok_or_else(|| anyhow!("import-notion needs a file\n{USAGE}"))?;
    let raw  = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let response: serde_json::Value = serde_json::from_str(&raw)?;
    let outcome = parse_query_response(&response)?;

    for (page, failure) in &outcome.failures {
        eprintln!("page {page}: {failure}");
    }
    println!("{}", serde_json::to_string_pretty(&outcome.chores)?);
    Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_board(board: &Board, now: NaiveDateTime, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(board)?);
        return Ok(());
    }

    println!("Action required ({})", board.actionable.len());
    if board.actionable.is_empty() {
        println!("  All caught up.");
    }
    print_section(&board.actionable, now);

    if !board.completed_today.is_empty() {
        println!("\nCompleted today ({})", board.completed_today.len());
        print_section(&board.completed_today, now);
    }

    println!("\nFuture schedule ({})", board.upcoming.len());
    print_section(&board.upcoming, now);

    let summary: Vec<String> = board.counts().iter().map(|(s, n)| format!("{s}={n}")).collect();
    tracing::info!("board {}", summary.join(" "));
    Ok(())
}

fn print_section(items: &[ChoreWithStatus], now: NaiveDateTime) {
    for item in items {
        println!(
            "  {:<28} {:<20} {:<16} next {}",
            item.chore.name,
            item.chore.assignee_names(),
            due_label(item.status, item.next_due, now),
            item.next_due.format("%-d %b"),
        );
    }
}
