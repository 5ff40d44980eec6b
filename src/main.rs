//! Bookstore calendar and daily order reports.
//!
//! - Calendar dimension rebuild (atomic swap into ClickHouse)
//! - Daily order report with month-to-date sums and a 7-row lag
//! - Schema bootstrap for development databases

mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use clickhouse_client::{health::check_connection, schema, ClickHouseClient, ClickHouseConfig};
use output::{CalendarView, DayMetricView, Formatter, MonthTotalView, OutputFormat, RebuildView};
use report_core::{
    rebuild_calendar, run_report, CalendarStore, CoveragePolicy, DataErrorCode, DateRange, Holiday,
    ReportRequest,
};
use telemetry::{init_tracing_from_env, log_snapshot, metrics};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Config {
    #[serde(default)]
    clickhouse: ClickHouseConfig,

    #[serde(default)]
    calendar: CalendarSettings,

    #[serde(default)]
    report: ReportSettings,
}

/// Calendar rebuild settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalendarSettings {
    #[serde(default = "default_start_date")]
    start_date: NaiveDate,
    /// Fixed end date; today when unset
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    holidays: Vec<Holiday>,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default()
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: None,
            holidays: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ReportSettings {
    #[serde(default)]
    coverage: CoveragePolicy,
}

#[derive(Parser)]
#[command(name = "bookstore-reports", version)]
#[command(about = "Calendar dimension and daily order reports for the bookstore database", long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Config file path (extension optional)
    #[arg(long, env = "BOOKSTORE_CONFIG", default_value = "config/default")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and tables if missing
    InitSchema,
    /// Calendar dimension commands
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
    /// Report commands
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
enum CalendarCommands {
    /// Rebuild the calendar table from scratch
    Rebuild {
        /// First day (defaults to calendar.start_date)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (defaults to calendar.end_date, then today)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Print stored calendar rows
    Show {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Per-day orders, lines, revenue, month-to-date sums and 7-row lag
    Daily {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// What to do with orders dated outside the calendar: strict or exclude
        #[arg(long)]
        coverage: Option<CoveragePolicy>,
        /// Print per-month totals instead of daily rows
        #[arg(long)]
        monthly: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    let cli = Cli::parse();

    let outcome = run(cli).await;
    log_snapshot(&metrics().snapshot());

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit code of the first domain error in the chain, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<report_core::Error>())
        .map(report_core::Error::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    let formatter = Formatter::new(cli.format);

    let client = ClickHouseClient::new(config.clickhouse.clone())
        .context("Failed to create ClickHouse client")?;

    if !check_connection(&client).await {
        return Err(report_core::Error::data(
            DataErrorCode::Unavailable,
            format!("cannot reach ClickHouse at {}", config.clickhouse.url),
        )
        .into());
    }

    match cli.command {
        Commands::InitSchema => {
            schema::init_schema(&client)
                .await
                .context("Failed to initialize schema")?;
            info!(database = %config.clickhouse.database, "Schema ready");
        }
        Commands::Calendar { command } => match command {
            CalendarCommands::Rebuild { start, end } => {
                let start = start.unwrap_or(config.calendar.start_date);
                // "Today" is only resolved here, at the call site
                let end = end
                    .or(config.calendar.end_date)
                    .unwrap_or_else(|| chrono::Local::now().date_naive());
                let range = DateRange::new(start, end)?;

                let summary = rebuild_calendar(&client, range, &config.calendar.holidays)
                    .await
                    .context("Calendar rebuild failed")?;
                formatter.print(&[RebuildView::from(&summary)], |v| v.clone())?;
            }
            CalendarCommands::Show { start, end } => {
                let range = DateRange::new(start, end)?;
                let days = client
                    .load_calendar(range)
                    .await
                    .context("Failed to load calendar")?;
                formatter.print(&days, |d| CalendarView::from(d))?;
            }
        },
        Commands::Report { command } => match command {
            ReportCommands::Daily {
                start,
                end,
                coverage,
                monthly,
            } => {
                let range = DateRange::new(start, end)?;
                let request = ReportRequest::new(range)
                    .with_coverage(coverage.unwrap_or(config.report.coverage));

                let report = run_report(&client, &client, &request)
                    .await
                    .context("Daily report failed")?;

                if monthly {
                    formatter.print(&report.month_totals(), |t| MonthTotalView::from(t))?;
                } else {
                    formatter.print(&report.rows, |m| DayMetricView::from(m))?;
                }
            }
        },
    }

    Ok(())
}

/// Load configuration from files and environment.
fn load_config(path: &str) -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(config::File::with_name(path).required(false))
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("BOOKSTORE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat overrides for the ClickHouse connection
    if let Ok(url) = std::env::var("BOOKSTORE_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Ok(database) = std::env::var("BOOKSTORE_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Ok(username) = std::env::var("BOOKSTORE_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Ok(password) = std::env::var("BOOKSTORE_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    Ok(config)
}
