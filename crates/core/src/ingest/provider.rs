use crate::domain::series::PricePoint;
use crate::error::ProviderError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Weekly,
}

impl Interval {
    pub fn as_query_value(self) -> &'static str {
        match self {
            Interval::Weekly => "1wk",
        }
    }
}

/// Inclusive date range of the requested history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interval: Interval,
}

impl HistoryQuery {
    pub fn weekly(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            interval: Interval::Weekly,
        }
    }
}

#[async_trait::async_trait]
pub trait HistoricalDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Returns the series for `ticker` between `query.start_date` and `query.end_date`,
    /// ascending by date.
    async fn fetch_historical_series(
        &self,
        ticker: &str,
        query: &HistoryQuery,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}
