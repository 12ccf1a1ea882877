use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricegap_core::ingest::yahoo::YahooChartProvider;
use pricegap_core::report::SortColumn;

mod freeze;

#[derive(Debug, Parser)]
#[command(name = "pricegap_worker")]
struct Args {
    /// Where to write the rendered page.
    #[arg(long, default_value = "build/index.html")]
    out: PathBuf,

    /// Comma-separated tickers. Overrides TICKERS.
    #[arg(long)]
    tickers: Option<String>,

    /// Sort column (ticker, last_close, high_1y, ..., low_5y). Defaults to ticker order.
    #[arg(long)]
    sort: Option<SortColumn>,

    /// As-of date (YYYY-MM-DD). Defaults to today's UTC date.
    #[arg(long)]
    as_of_date: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = pricegap_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "static export failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: pricegap_core::config::Settings) -> anyhow::Result<()> {
    let as_of = pricegap_core::time::lookback::resolve_as_of_date(
        args.as_of_date.as_deref(),
        chrono::Utc::now(),
    )?;

    let tickers = match args.tickers.as_deref() {
        Some(raw) => pricegap_core::config::parse_ticker_list(raw).context("invalid --tickers")?,
        None => settings.tickers.clone(),
    };

    let provider = YahooChartProvider::from_settings(&settings)?;
    let summary = freeze::export_page(&provider, &tickers, as_of, args.sort, &args.out).await?;

    tracing::info!(
        %as_of,
        out = %args.out.display(),
        rows = summary.rows,
        failures = summary.failures.len(),
        "static page written"
    );
    Ok(())
}

fn init_sentry(settings: &pricegap_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
