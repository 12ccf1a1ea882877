use crate::domain::series::{FailureMarker, MetricRow, TickerOutcome};
use crate::error::MetricsError;
use crate::ingest::provider::{HistoricalDataProvider, HistoryQuery};
use crate::reduce::reduce_series;
use crate::time::lookback::history_start_date;
use chrono::NaiveDate;
use futures::future::join_all;
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Successful rows, in input ticker order.
    pub rows: Vec<MetricRow>,
    pub failures: Vec<FailureMarker>,
}

impl Report {
    pub fn from_outcomes(outcomes: Vec<TickerOutcome>) -> Self {
        let mut report = Report::default();
        for outcome in outcomes {
            match outcome {
                TickerOutcome::Row(row) => report.rows.push(row),
                TickerOutcome::Failed(marker) => report.failures.push(marker),
            }
        }
        report
    }
}

/// Fetches and reduces every ticker concurrently and waits for all of them to settle.
///
/// A failing ticker only produces a [`FailureMarker`]; it never affects the others.
pub async fn build_report(
    provider: &dyn HistoricalDataProvider,
    tickers: &[String],
    as_of: NaiveDate,
) -> Report {
    let query = HistoryQuery::weekly(history_start_date(as_of), as_of);

    let outcomes = join_all(
        tickers
            .iter()
            .map(|ticker| fetch_ticker_outcome(provider, ticker, &query)),
    )
    .await;

    let report = Report::from_outcomes(outcomes);
    for failure in &report.failures {
        tracing::warn!(ticker = %failure.ticker, reason = %failure.reason, "ticker not fetched");
    }
    tracing::info!(
        provider = provider.provider_name(),
        %as_of,
        requested = tickers.len(),
        rows = report.rows.len(),
        failures = report.failures.len(),
        "report built"
    );
    report
}

pub async fn fetch_ticker_outcome(
    provider: &dyn HistoricalDataProvider,
    ticker: &str,
    query: &HistoryQuery,
) -> TickerOutcome {
    match fetch_ticker_metrics(provider, ticker, query).await {
        Ok(row) => TickerOutcome::Row(row),
        Err(err) => TickerOutcome::Failed(FailureMarker {
            ticker: ticker.to_string(),
            reason: err.to_string(),
        }),
    }
}

async fn fetch_ticker_metrics(
    provider: &dyn HistoricalDataProvider,
    ticker: &str,
    query: &HistoryQuery,
) -> Result<MetricRow, MetricsError> {
    let mut points = provider.fetch_historical_series(ticker, query).await?;
    // Providers may append a bar past the requested range (e.g. the live week).
    points.retain(|p| p.date <= query.end_date);
    if points.is_empty() {
        return Err(MetricsError::DataUnavailable);
    }
    reduce_series(ticker, &points)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Ticker,
    LastClose,
    High1y,
    High2y,
    High5y,
    Low1y,
    Low2y,
    Low5y,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Ticker,
        SortColumn::LastClose,
        SortColumn::High1y,
        SortColumn::High2y,
        SortColumn::High5y,
        SortColumn::Low1y,
        SortColumn::Low2y,
        SortColumn::Low5y,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Ticker => "ticker",
            SortColumn::LastClose => "last_close",
            SortColumn::High1y => "high_1y",
            SortColumn::High2y => "high_2y",
            SortColumn::High5y => "high_5y",
            SortColumn::Low1y => "low_1y",
            SortColumn::Low2y => "low_2y",
            SortColumn::Low5y => "low_5y",
        }
    }

    fn value(self, row: &MetricRow) -> f64 {
        match self {
            SortColumn::Ticker => 0.0,
            SortColumn::LastClose => row.last_close,
            SortColumn::High1y => row.high_1y_diff_pct,
            SortColumn::High2y => row.high_2y_diff_pct,
            SortColumn::High5y => row.high_5y_diff_pct,
            SortColumn::Low1y => row.low_1y_diff_pct,
            SortColumn::Low2y => row.low_2y_diff_pct,
            SortColumn::Low5y => row.low_5y_diff_pct,
        }
    }
}

impl FromStr for SortColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SortColumn::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown sort column: {s}"))
    }
}

/// Stable ascending sort; ties keep their current order.
pub fn sort_rows(rows: &mut [MetricRow], column: SortColumn) {
    match column {
        SortColumn::Ticker => rows.sort_by(|a, b| a.ticker.cmp(&b.ticker)),
        _ => rows.sort_by(|a, b| {
            column
                .value(a)
                .partial_cmp(&column.value(b))
                .unwrap_or(Ordering::Equal)
        }),
    }
}
