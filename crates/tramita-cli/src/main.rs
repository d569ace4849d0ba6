use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tramita_core::TRACKED_SEEDS;
use tramita_report::{CSV_FILE_NAME, Pipeline, PipelineOptions, Report, write_csv};
use tramita_sync::{CamaraClient, DEFAULT_BASE_URL};

mod display;
mod web;

#[derive(Parser, Debug)]
#[command(
    name = "tramita",
    version,
    about = "Monitor selected legislative proposals in the Chamber of Deputies"
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Config {
    /// Base URL of the open-data API
    #[arg(long, env = "TRAMITA_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "TRAMITA_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// How long lookup results are reused, in seconds
    #[arg(long, env = "TRAMITA_CACHE_TTL_SECS", default_value_t = 3600, global = true)]
    cache_ttl_secs: u64,

    /// Run the four lookups of each proposal concurrently
    #[arg(long, global = true)]
    concurrent_lookups: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the report and print a summary table
    Report,
    /// Build the report and print one proposal in full
    Show {
        /// Upstream proposal id
        id: i64,
    },
    /// Build the report and write it as CSV
    Export {
        #[arg(long, value_name = "PATH", default_value = CSV_FILE_NAME)]
        out: PathBuf,
    },
    /// Serve the report as a web page with a CSV download
    Serve {
        #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("tramita v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let pipeline = build_pipeline(&cli.config)?;

    match cli.command {
        Command::Report => {
            let report = build_report(&runtime, &pipeline)?;
            display::print_summary(&report)?;
        }
        Command::Show { id } => {
            let report = build_report(&runtime, &pipeline)?;
            let row = report
                .row_for(id)
                .with_context(|| format!("proposal {id} is not in the report"))?;
            display::print_proposal_card(&row)?;
        }
        Command::Export { out } => {
            let report = build_report(&runtime, &pipeline)?;
            write_csv(&report, &out).with_context(|| format!("writing {}", out.display()))?;
            eprintln!("  Wrote {} proposals to {}", report.num_rows(), out.display());
        }
        Command::Serve { addr } => web::serve(addr, &runtime, &pipeline)?,
    }

    Ok(())
}

fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline<CamaraClient>> {
    let client = CamaraClient::with_timeout(
        config.api_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )
    .context("building HTTP client")?;
    let options = PipelineOptions {
        cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        concurrent_lookups: config.concurrent_lookups,
    };
    Ok(Pipeline::with_options(client, options))
}

fn build_report(
    runtime: &tokio::runtime::Runtime,
    pipeline: &Pipeline<CamaraClient>,
) -> anyhow::Result<Report> {
    runtime
        .block_on(pipeline.build(TRACKED_SEEDS))
        .context("building proposal report")
}
