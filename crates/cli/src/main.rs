use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::debug;

use partner_recon::{DailyFiles, PartnerConfig};
use partner_recon_cli::event::TriggerEvent;
use partner_recon_cli::exit_codes::*;
use partner_recon_cli::sink::{SpoolQueue, SqliteTable};
use partner_recon_cli::storage::LocalObjectStore;
use partner_recon_cli::{check_arrival, run_daily, Collaborators, PipelineError, RunOutcome};

#[derive(Parser)]
#[command(name = "precon")]
#[command(about = "Daily partner-feed reconciliation: orphan detection and per-customer spend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one day's delivery and dispatch both output streams
    #[command(after_help = "\
Examples:
  precon run --bucket partner-drop
  precon run --event s3-event.json --date 2026-01-15 --json
  cat event.json | precon run --event - --fail-on-errors")]
    Run {
        #[command(flatten)]
        target: Target,

        /// Spool directory for queue messages (overrides [storage].spool_dir)
        #[arg(long)]
        spool_dir: Option<PathBuf>,

        /// SQLite database for table items (overrides [storage].database)
        #[arg(long)]
        database: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit non-zero when any error record was produced
        #[arg(long)]
        fail_on_errors: bool,
    },

    /// Report which of the day's files have arrived
    Check {
        #[command(flatten)]
        target: Target,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    Validate {
        /// Path to the .toml config (defaults are checked when omitted)
        config: Option<PathBuf>,
    },
}

/// Which partition to look at, and where.
#[derive(Args)]
struct Target {
    /// Bucket holding the day's files
    #[arg(long, required_unless_present = "event", conflicts_with = "event")]
    bucket: Option<String>,

    /// Trigger event JSON file (`-` for stdin)
    #[arg(long)]
    event: Option<PathBuf>,

    /// Delivery date, YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Job config (.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing one sub-directory per bucket
    #[arg(long, env = "PARTNER_RECON_ROOT")]
    root: Option<PathBuf>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        let code = pipeline_exit_code(&err);
        let hint = match &err {
            PipelineError::Storage(_) => Some("check --root / PARTNER_RECON_ROOT and the bucket name".to_string()),
            PipelineError::Event(_) => Some("expected {\"Records\":[{\"s3\":{\"bucket\":{\"name\":...}}}]}".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { target, spool_dir, database, json, output, fail_on_errors } => {
            cmd_run(target, spool_dir, database, json, output, fail_on_errors)
        }
        Commands::Check { target, json } => cmd_check(target, json),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

// ============================================================================
// Shared resolution
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<PartnerConfig, CliError> {
    let Some(path) = path else {
        return Ok(PartnerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    PartnerConfig::from_toml(&text).map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))
}

fn resolve_bucket(target: &Target) -> Result<String, CliError> {
    if let Some(bucket) = &target.bucket {
        return Ok(bucket.clone());
    }
    let Some(path) = &target.event else {
        return Err(CliError::usage("one of --bucket or --event is required"));
    };

    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::usage(format!("cannot read event from stdin: {e}")))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| CliError::usage(format!("cannot read event {}: {e}", path.display())))?
    };

    let event = TriggerEvent::from_json(&text)?;
    if let Some(key) = event.object_key() {
        debug!("triggered by {key}");
    }
    Ok(event.bucket_name()?.to_string())
}

struct Resolved {
    config: PartnerConfig,
    bucket: String,
    date: NaiveDate,
    store: LocalObjectStore,
}

fn resolve(target: &Target) -> Result<Resolved, CliError> {
    let config = load_config(target.config.as_deref())?;
    let bucket = resolve_bucket(target)?;
    let date = target.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let root = target.root.clone().unwrap_or_else(|| PathBuf::from(&config.storage.root));
    Ok(Resolved { config, bucket, date, store: LocalObjectStore::new(root) })
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(
    target: Target,
    spool_dir: Option<PathBuf>,
    database: Option<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
    fail_on_errors: bool,
) -> Result<(), CliError> {
    let Resolved { config, bucket, date, store } = resolve(&target)?;

    let spool_dir = spool_dir.unwrap_or_else(|| PathBuf::from(&config.storage.spool_dir));
    let database = database.unwrap_or_else(|| PathBuf::from(&config.storage.database));
    let queue = SpoolQueue::new(spool_dir);
    let table = SqliteTable::open(&database);
    let collab = Collaborators { store: &store, queue: &queue, table: &table };

    let result = match run_daily(&collab, &config, &bucket, date)? {
        RunOutcome::Waiting { missing } => {
            if json_output {
                let waiting = serde_json::json!({
                    "status": "waiting",
                    "bucket": bucket,
                    "date": date,
                    "missing": missing,
                });
                println!("{waiting}");
            }
            return Err(CliError::new(EXIT_WAITING, format!("waiting for {}", missing.join(", ")))
                .with_hint("rerun once the remaining files have landed"));
        }
        RunOutcome::Completed(result) => result,
    };

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::usage(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    let s = &result.summary;
    eprintln!(
        "{bucket} {date}: {} customers, {} orders, {} items -> {} summaries, {} errors ({} orphaned orders, {} orphaned items)",
        s.customers, s.orders, s.items, s.summaries, s.errors, s.orphaned_orders, s.orphaned_items,
    );

    if fail_on_errors && !s.is_clean() {
        return Err(CliError::new(EXIT_ERRORS_FOUND, format!("{} error records produced", s.errors)));
    }
    Ok(())
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(target: Target, json_output: bool) -> Result<(), CliError> {
    let Resolved { config, bucket, date, store } = resolve(&target)?;
    let files = DailyFiles::for_date(&config.files, date).map_err(PipelineError::from)?;
    let arrival = check_arrival(&store, &bucket, &files)?;
    let missing = arrival.missing();

    if json_output {
        let report = serde_json::json!({
            "bucket": bucket,
            "date": date,
            "complete": missing.is_empty(),
            "files": arrival.files,
            "missing": missing,
        });
        println!("{report}");
    } else {
        for (entity, key) in files.all() {
            let mark = if arrival.present.contains(&entity) { "ok" } else { "missing" };
            let entity = entity.to_string();
            eprintln!("{entity:<10} {key:<32} {mark}");
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::new(EXIT_WAITING, format!("{} of 3 files missing", missing.len())))
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let today = chrono::Local::now().date_naive();
    let files = DailyFiles::for_date(&config.files, today).map_err(PipelineError::from)?;

    eprintln!("config OK: \"{}\"", config.name);
    eprintln!("  files:   {}, {}, {}", files.customers, files.orders, files.items);
    eprintln!("  queue:   {}", config.output.queue);
    eprintln!("  table:   {}", config.output.table);
    eprintln!("  message: {}", config.output.error_message);
    Ok(())
}
