use chrono::NaiveDate;
use std::fmt;

/// One sampled interval of a historical series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub ticker: String,
    pub last_close: f64,
    pub high_1y_diff_pct: f64,
    pub high_2y_diff_pct: f64,
    pub high_5y_diff_pct: f64,
    pub low_1y_diff_pct: f64,
    pub low_2y_diff_pct: f64,
    pub low_5y_diff_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMarker {
    pub ticker: String,
    pub reason: String,
}

impl fmt::Display for FailureMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ticker, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Row(MetricRow),
    Failed(FailureMarker),
}
