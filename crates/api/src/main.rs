use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricegap_core::ingest::provider::HistoricalDataProvider;
use pricegap_core::ingest::yahoo::YahooChartProvider;
use pricegap_core::render::{render_table_page, PageOptions};
use pricegap_core::report::{build_report, sort_rows, SortColumn};

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

    let provider = YahooChartProvider::from_settings(&settings)?;
    let state = AppState {
        provider: Arc::new(provider),
        tickers: settings.tickers.clone().into(),
    };

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn HistoricalDataProvider>,
    tickers: Arc<[String]>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct IndexParams {
    sort: Option<String>,
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<Html<String>, StatusCode> {
    let sort = params
        .sort
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<SortColumn>)
        .transpose()
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected sort parameter");
            StatusCode::BAD_REQUEST
        })?;

    let as_of = chrono::Utc::now().date_naive();
    let mut report = build_report(state.provider.as_ref(), &state.tickers, as_of).await;

    if let Some(column) = sort {
        sort_rows(&mut report.rows, column);
    }

    Ok(Html(render_table_page(
        &report.rows,
        PageOptions {
            as_of,
            sort_links: true,
        },
    )))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
