use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;

use pricegap_core::domain::series::FailureMarker;
use pricegap_core::ingest::provider::HistoricalDataProvider;
use pricegap_core::render::{render_table_page, PageOptions};
use pricegap_core::report::{build_report, sort_rows, SortColumn};

#[derive(Debug)]
pub struct ExportSummary {
    pub rows: usize,
    pub failures: Vec<FailureMarker>,
}

/// Builds the report once and writes the rendered page to `out`, creating parent
/// directories as needed.
pub async fn export_page(
    provider: &dyn HistoricalDataProvider,
    tickers: &[String],
    as_of: NaiveDate,
    sort: Option<SortColumn>,
    out: &Path,
) -> anyhow::Result<ExportSummary> {
    let mut report = build_report(provider, tickers, as_of).await;
    if let Some(column) = sort {
        sort_rows(&mut report.rows, column);
    }

    let html = render_table_page(
        &report.rows,
        PageOptions {
            as_of,
            sort_links: false,
        },
    );

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(out, html)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;

    Ok(ExportSummary {
        rows: report.rows.len(),
        failures: report.failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricegap_core::domain::series::PricePoint;
    use pricegap_core::error::ProviderError;
    use pricegap_core::ingest::provider::HistoryQuery;

    struct OneGoodTicker;

    #[async_trait::async_trait]
    impl HistoricalDataProvider for OneGoodTicker {
        fn provider_name(&self) -> &'static str {
            "one_good"
        }

        async fn fetch_historical_series(
            &self,
            ticker: &str,
            _query: &HistoryQuery,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            if ticker != "INFY.NS" {
                return Err(ProviderError::NotFound(ticker.to_string()));
            }
            Ok(vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
                open: 100.0,
                high: 110.0,
                low: 90.0,
                close: 100.0,
                volume: 5,
            }])
        }
    }

    #[tokio::test]
    async fn writes_page_and_reports_failures() {
        let dir = std::env::temp_dir().join(format!("pricegap-freeze-{}", std::process::id()));
        let out = dir.join("nested").join("index.html");
        let tickers = vec!["INFY.NS".to_string(), "GONE.NS".to_string()];
        let as_of = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let summary = export_page(&OneGoodTicker, &tickers, as_of, None, &out)
            .await
            .unwrap();

        assert_eq!(summary.rows, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(
            summary.failures[0].to_string(),
            "GONE.NS: symbol not found: GONE.NS"
        );

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("<td>INFY.NS</td>"));
        assert!(html.contains("-9.09"));
        assert!(!html.contains("GONE.NS"));
        assert!(!html.contains("href="));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
