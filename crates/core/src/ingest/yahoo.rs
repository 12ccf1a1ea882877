use crate::config::Settings;
use crate::domain::series::PricePoint;
use crate::error::ProviderError;
use crate::ingest::provider::{HistoricalDataProvider, HistoryQuery};
use crate::ingest::types::{ChartResponse, ChartResult};
use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate};
use reqwest::Url;

const CHART_PATH: [&str; 3] = ["v8", "finance", "chart"];

/// Yahoo Finance v8 chart API. No API key, no retries and no request timeout.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: Url,
}

impl YahooChartProvider {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.yahoo_base_url)
            .with_context(|| format!("invalid YAHOO_BASE_URL: {}", settings.yahoo_base_url))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "YAHOO_BASE_URL cannot be used as a base URL: {base_url}"
        );

        let http = reqwest::Client::builder()
            .user_agent(settings.yahoo_user_agent.as_str())
            .build()
            .context("failed to build yahoo http client")?;

        Ok(Self { http, base_url })
    }

    fn chart_url(&self, ticker: &str, query: &HistoryQuery) -> Result<Url, ProviderError> {
        let period1 = midnight_utc(query.start_date)?;
        // period2 is exclusive; stop at the midnight after the end date.
        let period2 = midnight_utc(query.end_date + Duration::days(1))?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::BadResponse("base url has no path".to_string()))?
            .pop_if_empty()
            .extend(CHART_PATH)
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", query.interval.as_query_value())
            .append_pair("events", "history");
        Ok(url)
    }
}

#[async_trait::async_trait]
impl HistoricalDataProvider for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_historical_series(
        &self,
        ticker: &str,
        query: &HistoryQuery,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let url = self.chart_url(ticker, query)?;
        tracing::debug!(ticker, %url, "fetching historical series");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        parse_chart(ticker, status.as_u16(), &text)
    }
}

/// Turns a chart payload into an ascending series.
///
/// An `error` object in the payload wins over the HTTP status since Yahoo reports
/// unknown symbols as a 404 carrying that object.
pub fn parse_chart(ticker: &str, status: u16, body: &str) -> Result<Vec<PricePoint>, ProviderError> {
    let parsed = serde_json::from_str::<ChartResponse>(body);

    let chart = match parsed {
        Ok(resp) => resp.chart,
        Err(e) => {
            if !(200..300).contains(&status) {
                return Err(ProviderError::Status {
                    status,
                    body: truncate(body, 200),
                });
            }
            return Err(ProviderError::Parse(e.to_string()));
        }
    };

    if let Some(err) = chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Err(ProviderError::NotFound(ticker.to_string()));
        }
        return Err(ProviderError::BadResponse(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    if !(200..300).contains(&status) {
        return Err(ProviderError::Status {
            status,
            body: truncate(body, 200),
        });
    }

    let result = chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| ProviderError::BadResponse("missing chart result".to_string()))?;

    to_points(result)
}

fn midnight_utc(date: NaiveDate) -> Result<i64, ProviderError> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| ProviderError::BadResponse(format!("invalid query date: {date}")))
}

fn to_points(result: ChartResult) -> Result<Vec<PricePoint>, ProviderError> {
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        // Symbols with no trading history come back without a quote block.
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();

        // Rows with a missing price are holidays or partial weeks; skip them.
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };

        let date = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| ProviderError::Parse(format!("bad timestamp: {ts}")))?
            .date_naive();

        out.push(PricePoint {
            date,
            open,
            high,
            low,
            close,
            volume: field(&quote.volume).map(|v| v.max(0.0) as u64).unwrap_or(0),
        });
    }

    out.sort_by_key(|p| p.date);
    Ok(out)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(base_url: &str) -> YahooChartProvider {
        let settings = Settings {
            port: 3000,
            tickers: vec!["AAA".to_string()],
            yahoo_base_url: base_url.to_string(),
            yahoo_user_agent: "test".to_string(),
            sentry_dsn: None,
        };
        YahooChartProvider::from_settings(&settings).unwrap()
    }

    #[test]
    fn chart_url_encodes_symbol_and_range() {
        let p = provider("https://example.test/");
        let query = HistoryQuery::weekly(
            NaiveDate::from_ymd_opt(2021, 10, 16).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        );
        let url = p.chart_url("M&M.NS", &query).unwrap();

        assert_eq!(url.path(), "/v8/finance/chart/M&M.NS");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("period1".to_string(), "1634342400".to_string())));
        // Midnight after the end date, so the as-of week is included.
        assert!(pairs.contains(&("period2".to_string(), "1792195200".to_string())));
        assert!(pairs.contains(&("interval".to_string(), "1wk".to_string())));
    }

    #[test]
    fn past_end_date_bounds_the_request() {
        let p = provider("https://example.test");
        let query = HistoryQuery::weekly(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );
        let url = p.chart_url("INFY.NS", &query).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("period2".to_string(), "1735862400".to_string())));
    }

    #[test]
    fn parses_points_and_drops_incomplete_rows() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [1700006400, 1699401600, 1700611200],
                    "indicators": {
                        "quote": [{
                            "open":   [101.0, 99.0, null],
                            "high":   [105.0, 102.0, 104.0],
                            "low":    [100.0, 97.5, 99.0],
                            "close":  [104.0, 100.5, 103.0],
                            "volume": [1200, 900, 1000]
                        }]
                    }
                }],
                "error": null
            }
        })
        .to_string();

        let points = parse_chart("AAA", 200, &body).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].date < points[1].date);
        assert_eq!(points[0].close, 100.5);
        assert_eq!(points[1].close, 104.0);
        assert_eq!(points[1].volume, 1200);
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        let body = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        })
        .to_string();

        let err = parse_chart("NOPE.NS", 404, &body).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(ref t) if t == "NOPE.NS"));
    }

    #[test]
    fn non_json_error_page_reports_status() {
        let err = parse_chart("AAA", 503, "<html>busy</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }

    #[test]
    fn missing_quote_block_yields_empty_series() {
        let body = json!({
            "chart": {
                "result": [{"timestamp": [], "indicators": {"quote": []}}],
                "error": null
            }
        })
        .to_string();

        assert!(parse_chart("AAA", 200, &body).unwrap().is_empty());
    }
}
