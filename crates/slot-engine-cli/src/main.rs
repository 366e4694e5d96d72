//! `slots` CLI: compute bookable slots from a JSON fixture of workers and
//! busy blocks.
//!
//! ## Usage
//!
//! ```sh
//! # Every 30-minute slot of March 2026 for two workers
//! slots compute --fixture salon.json --year 2026 --month 3 \
//!     --timezone Europe/Helsinki --workers ana,ben --duration 30
//!
//! # Only starts where both workers are free, with a 10-minute buffer
//! slots compute --fixture salon.json --year 2026 --month 3 \
//!     --timezone Europe/Helsinki --workers ana,ben --duration 30 \
//!     --buffer 10 --policy all -o march.json
//!
//! # Free intervals of a single worker, per date
//! slots free --fixture salon.json --worker ana --year 2026 --month 3 \
//!     --timezone Europe/Helsinki
//! ```
//!
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slot_engine::{
    build_free_index, compute_availability, load_month, AggregationPolicy, AvailabilityRequest,
    DataQualityWarning, DstPolicy, EngineConfig, InMemoryProvider, Interval, ServiceParameters,
    WorkerId,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compute bookable appointment slots from working hours and busy blocks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every bookable slot of a month
    #[command(args_override_self = true)]
    Compute {
        #[command(flatten)]
        month: MonthArgs,
        /// Comma-separated ids of the workers assigned to the service
        #[arg(long, value_delimiter = ',')]
        workers: Vec<String>,
        /// Worker used when no worker is assigned
        #[arg(long)]
        default_worker: Option<String>,
        /// Appointment length in minutes
        #[arg(long)]
        duration: i64,
        /// Step between candidate starts in minutes (defaults to the duration)
        #[arg(long)]
        interval: Option<i64>,
        /// Gap required after each appointment in minutes
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        buffer: i64,
        /// Minimum lead time before a slot may start, in minutes
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        notice: i64,
        /// Reference time for the notice, RFC 3339 (defaults to the wall clock)
        #[arg(long)]
        now: Option<String>,
        /// How slots of several workers are combined (overrides the config)
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// What to do with starts that fall in a DST gap (overrides the config)
        #[arg(long, value_enum)]
        dst: Option<DstArg>,
        /// TOML engine configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the free intervals of one worker, per date
    Free {
        #[command(flatten)]
        month: MonthArgs,
        /// Worker id
        #[arg(long)]
        worker: String,
        /// TOML engine configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct MonthArgs {
    /// JSON fixture with `workers` and `busyBlocks`
    #[arg(long)]
    fixture: PathBuf,
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
    /// IANA timezone of the service, e.g. Europe/Helsinki
    #[arg(long)]
    timezone: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// A slot is offered when any assigned worker can serve it
    Any,
    /// A slot is offered only when every assigned worker can serve it
    All,
}

impl From<PolicyArg> for AggregationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Any => AggregationPolicy::AnyWorker,
            PolicyArg::All => AggregationPolicy::AllWorkers,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DstArg {
    ShiftForward,
    Skip,
}

impl From<DstArg> for DstPolicy {
    fn from(arg: DstArg) -> Self {
        match arg {
            DstArg::ShiftForward => DstPolicy::ShiftForward,
            DstArg::Skip => DstPolicy::Skip,
        }
    }
}

/// Output of the `free` subcommand.
#[derive(Serialize)]
struct FreeReport {
    worker: WorkerId,
    free: BTreeMap<NaiveDate, Vec<Interval>>,
    warnings: Vec<DataQualityWarning>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            month,
            workers,
            default_worker,
            duration,
            interval,
            buffer,
            notice,
            now,
            policy,
            dst,
            config,
            output,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(policy) = policy {
                config.aggregation = policy.into();
            }
            if let Some(dst) = dst {
                config.dst_policy = dst.into();
            }

            let provider = load_fixture(&month.fixture)?;
            let params = ServiceParameters::new(duration, interval.unwrap_or(duration))
                .with_buffer(buffer)
                .with_minimum_notice(notice);

            let mut request = AvailabilityRequest::new(
                workers.iter().map(|w| w.trim()).filter(|w| !w.is_empty()),
                params,
                month.year,
                month.month,
                &month.timezone,
            );
            if let Some(id) = default_worker {
                request = request.with_default_worker(id);
            }
            if let Some(raw) = now {
                request = request.with_now(parse_now(&raw)?);
            }

            let response = compute_availability(&provider, &request, &config)
                .await
                .context("Failed to compute availability")?;
            write_json(output.as_deref(), &response)?;
        }
        Commands::Free {
            month,
            worker,
            config,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let provider = load_fixture(&month.fixture)?;

            // Service parameters do not affect free time.
            let request = AvailabilityRequest::new(
                [worker.as_str()],
                ServiceParameters::new(1, 1),
                month.year,
                month.month,
                &month.timezone,
            );
            let resolved = request.resolve().context("Invalid request")?;

            let data = load_month(&provider, &resolved.workers, resolved.month, &config, None)
                .await
                .context("Failed to load provider data")?;
            let mut warnings = Vec::new();
            let mut index = build_free_index(&resolved, &data, &mut warnings);

            let worker = WorkerId::new(worker);
            let report = FreeReport {
                free: index.remove(&worker).unwrap_or_default(),
                worker,
                warnings,
            };
            write_json(output.as_deref(), &report)?;
        }
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_fixture(path: &std::path::Path) -> Result<InMemoryProvider> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    InMemoryProvider::from_json(&raw)
        .with_context(|| format!("Invalid fixture: {}", path.display()))
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid --now timestamp: {}", raw))
}

fn write_json<T: Serialize>(path: Option<&std::path::Path>, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
