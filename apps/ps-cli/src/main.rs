use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ps_api::{
    ApiError, DashboardClient, Direction, DynamicSavingsRequest, FilterRequest, SavingsRequest,
};
use ps_core::{DashboardConfig, PsError};
use ps_export::{ExportController, ExportError, ExportJob, JobStatus, StartExportRequest};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] PsError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Export failed: {0}")]
    ExportFailed(String),
    #[error("No CSV history for {0}; run an export that includes it first")]
    MissingHistory(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(about = "PriceScope CLI - price history, exports and savings simulations", long_about = None)]
struct Cli {
    /// Path to a YAML config file (environment overrides still apply)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List coins by market cap
    Coins {
        /// Maximum number of coins (defaults to the configured limit)
        #[arg(long)]
        limit: Option<u32>,
        /// Only show coins whose symbol or name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the current BTC spot price
    Price,
    /// Print a daily price history
    History {
        /// Years of BTC history (ignored with --symbol)
        #[arg(long)]
        years: Option<u32>,
        /// Read the history of this symbol from the last export CSV
        #[arg(long)]
        symbol: Option<String>,
        /// Trailing moving-average window in days
        #[arg(long)]
        ma: Option<usize>,
    },
    /// Start a Coinbase export and watch it until it finishes
    Export {
        /// Comma separated symbols, e.g. BTC,ETH,SOL
        #[arg(long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,
        /// Years of history to export
        #[arg(long)]
        years: Option<u32>,
    },
    /// Show the status of an export job once
    Status {
        /// Job ID returned by the start call
        job_id: String,
    },
    /// Ask the server to stop the running export
    Stop,
    /// Filter exported coins by price change over a period
    Filter {
        #[arg(long, default_value_t = 3.0)]
        years: f64,
        /// Minimum change in percent
        #[arg(long, default_value_t = 20.0)]
        percent: f64,
        #[arg(long, value_enum, default_value_t = DirectionArg::Rose)]
        direction: DirectionArg,
    },
    /// Simulate a fixed monthly savings plan
    Savings {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        years: f64,
        #[arg(long)]
        monthly: f64,
    },
    /// Simulate a savings plan that buys more below the moving average
    SavingsDynamic {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        years: f64,
        #[arg(long)]
        monthly: f64,
        /// Deviation from the moving average that triggers an adjustment
        #[arg(long, default_value_t = 10.0)]
        threshold: f64,
        /// Percent of the monthly amount to shift
        #[arg(long, default_value_t = 50.0)]
        adjust: f64,
        #[arg(long, default_value_t = 200)]
        ma_days: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Rose,
    Fell,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Rose => Direction::Rose,
            DirectionArg::Fell => Direction::Fell,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref())?;
    let client = DashboardClient::new(&config)?;

    match cli.command {
        Commands::Coins { limit, search } => {
            cmd_coins(&client, limit.unwrap_or(config.coin_limit), search.as_deref())
        }
        Commands::Price => cmd_price(&client),
        Commands::History { years, symbol, ma } => cmd_history(
            &client,
            years.unwrap_or(config.default_years),
            symbol.as_deref(),
            ma,
        ),
        Commands::Export { symbols, years } => {
            cmd_export(client, &config, &symbols, years.unwrap_or(config.default_years))
        }
        Commands::Status { job_id } => cmd_status(&client, &job_id),
        Commands::Stop => {
            client.stop_coinbase_export()?;
            println!("Stop requested");
            Ok(())
        }
        Commands::Filter {
            years,
            percent,
            direction,
        } => cmd_filter(
            &client,
            &FilterRequest {
                years,
                percent,
                direction: direction.into(),
            },
        ),
        Commands::Savings {
            symbol,
            years,
            monthly,
        } => cmd_savings(
            &client,
            &SavingsRequest {
                symbol: symbol.to_uppercase(),
                years,
                monthly_usd: monthly,
            },
        ),
        Commands::SavingsDynamic {
            symbol,
            years,
            monthly,
            threshold,
            adjust,
            ma_days,
        } => cmd_savings_dynamic(
            &client,
            &DynamicSavingsRequest {
                symbol: symbol.to_uppercase(),
                years,
                monthly_usd: monthly,
                threshold_pct: threshold,
                adjust_pct: adjust,
                ma_days,
            },
        ),
    }
}

fn cmd_coins(client: &DashboardClient, limit: u32, search: Option<&str>) -> CliResult<()> {
    let list = client.coins(limit)?;
    let query = search.unwrap_or("");
    let mut shown = 0usize;
    println!("{:>5}  {:<8} {:<24} {:>14} {:>9}", "rank", "symbol", "name", "price", "24h");
    for coin in list.coins.iter().filter(|c| c.matches(query)) {
        println!(
            "{:>5}  {:<8} {:<24} {:>14} {:>9}",
            coin.market_cap_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".into()),
            coin.symbol,
            coin.name.as_deref().unwrap_or("-"),
            coin.current_price
                .map(|p| format!("{p:.4}"))
                .unwrap_or_else(|| "-".into()),
            coin.price_change_percentage_24h
                .map(|p| format!("{p:+.2}%"))
                .unwrap_or_else(|| "-".into()),
        );
        shown += 1;
    }
    println!("{shown} of {} coins", list.coins.len());
    Ok(())
}

fn cmd_price(client: &DashboardClient) -> CliResult<()> {
    let spot = client.btc_price()?;
    println!("{}: {:.2} USD ({})", spot.symbol, spot.price_usd, spot.source);
    Ok(())
}

fn cmd_history(
    client: &DashboardClient,
    years: u32,
    symbol: Option<&str>,
    ma: Option<usize>,
) -> CliResult<()> {
    let series = match symbol {
        Some(symbol) => client
            .csv_history(symbol)?
            .ok_or_else(|| CliError::MissingHistory(symbol.to_uppercase()))?,
        None => client.btc_history(years)?,
    };

    let averages = ma.map(|w| series.moving_average(w)).unwrap_or_default();
    println!("{} ({} days)", series.name, series.len());
    for (i, (label, value)) in series.labels.iter().zip(&series.values).enumerate() {
        match averages.get(i).copied().flatten() {
            Some(avg) => println!("  {label}  {value:>14.2}  ma={avg:.2}"),
            None => println!("  {label}  {value:>14.2}"),
        }
    }
    Ok(())
}

fn cmd_export(
    client: DashboardClient,
    config: &DashboardConfig,
    symbols: &[String],
    years: u32,
) -> CliResult<()> {
    let request = StartExportRequest::new(symbols, years)?;
    println!(
        "Exporting {} symbol(s) over {} year(s)",
        request.symbols.len(),
        request.years
    );

    tracing::info!(symbols = ?request.symbols, years = request.years, "starting export");
    let mut controller = ExportController::from_config(Arc::new(client), config);
    controller.start(request)?;

    let started = Instant::now();
    let wait = config.poll_interval().max(Duration::from_millis(100));
    while controller.is_active() {
        if controller.wait_for_update(wait) {
            if let Some(job) = controller.job() {
                render_progress(job, started.elapsed());
            }
        }
        if !controller.is_active() {
            break;
        }
        if controller.worker_finished() && !controller.update() {
            // Worker gone without a terminal event; nothing more will arrive.
            break;
        }
    }
    clear_progress_line();

    match controller.job() {
        Some(job) => report_outcome(job),
        None => Ok(()),
    }
}

/// Print the final state of a watched export; `failed` becomes an error.
fn report_outcome(job: &ExportJob) -> CliResult<()> {
    match job.status {
        JobStatus::Done => {
            tracing::info!(summary = %job.summary(), "export finished");
            println!("✓ Export done: {}", job.summary());
            if let Some(filename) = &job.filename {
                println!("  File: {filename}");
            }
            Ok(())
        }
        JobStatus::Stopped => {
            tracing::warn!(summary = %job.summary(), "export stopped before completion");
            println!("Export stopped: {}", job.summary());
            Ok(())
        }
        _ => {
            let reason = job
                .fail_reason
                .clone()
                .unwrap_or_else(|| job.status.label().to_string());
            tracing::warn!(status = job.status.label(), %reason, "export did not complete");
            Err(CliError::ExportFailed(reason))
        }
    }
}

fn cmd_status(client: &DashboardClient, job_id: &str) -> CliResult<()> {
    let snapshot = client.coinbase_export_status(job_id)?;
    println!(
        "{}: {}/{} ({:.1}%) - current: {} - errors: {}",
        snapshot.status.label(),
        snapshot.done,
        snapshot.total,
        snapshot.percent,
        snapshot.current.as_deref().unwrap_or("-"),
        snapshot.errors
    );
    if let Some(filename) = &snapshot.filename {
        println!("  File: {filename}");
    }
    if let Some(reason) = &snapshot.fail_reason {
        println!("  Reason: {reason}");
    }
    Ok(())
}

fn cmd_filter(client: &DashboardClient, request: &FilterRequest) -> CliResult<()> {
    let response = client.filter(request)?;
    if let Some(csv) = &response.csv_used {
        println!("Using {csv}");
    }
    println!(
        "{} coin(s) {} by at least {:.1}% over {} year(s)",
        response.count,
        request.direction.label(),
        request.percent,
        request.years
    );
    for hit in &response.results {
        println!(
            "  {:<8} {:>12.4} -> {:>12.4}  {:+.2}%  {}",
            hit.symbol, hit.start_price, hit.end_price, hit.change_percent, hit.period
        );
    }
    Ok(())
}

fn cmd_savings(client: &DashboardClient, request: &SavingsRequest) -> CliResult<()> {
    let result = client.simulate_savings(request)?;
    let cash = result
        .cash_only_usd
        .unwrap_or_else(|| request.cash_only_usd());
    println!("Invested value: {:.2} USD", result.result_usd);
    println!("Cash only:      {cash:.2} USD");
    Ok(())
}

fn cmd_savings_dynamic(client: &DashboardClient, request: &DynamicSavingsRequest) -> CliResult<()> {
    let result = client.simulate_savings_dynamic(request)?;
    println!("Invested value: {:.2} USD", result.result_usd);
    println!("Cash buffer:    {:.2} USD", result.cash_buffer_usd);
    println!("Total:          {:.2} USD", result.total_value_usd);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_progress(job: &ExportJob, elapsed: Duration) {
    let width = 28usize;
    let filled = ((job.fraction() * width as f32).round() as usize).min(width);
    print!(
        "\r[{}{}] {}  status={}  elapsed={:.1}s",
        "#".repeat(filled),
        "-".repeat(width - filled),
        job.summary(),
        job.status.label(),
        elapsed.as_secs_f64()
    );
    let _ = io::stdout().flush();
}
