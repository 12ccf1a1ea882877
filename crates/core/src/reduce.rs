use crate::domain::series::{MetricRow, PricePoint};
use crate::error::MetricsError;

// Windows are counted in samples, not calendar days.
pub const WEEKS_PER_YEAR: usize = 52;
const TWO_YEAR_POINTS: usize = 2 * WEEKS_PER_YEAR;
const FIVE_YEAR_POINTS: usize = 5 * WEEKS_PER_YEAR;

/// Reduces an ascending weekly series to the deviation of its last close from the
/// 1/2/5-year extremes.
///
/// The "1y" extremes are taken over the whole series and the longer windows over the
/// trailing 104 and 260 points; windows longer than the series clamp to it.
pub fn reduce_series(ticker: &str, points: &[PricePoint]) -> Result<MetricRow, MetricsError> {
    let Some(last) = points.last() else {
        return Err(MetricsError::DataUnavailable);
    };
    let last_close = last.close;
    ensure_finite("last close", last_close)?;

    let two_year = trailing(points, TWO_YEAR_POINTS);
    let five_year = trailing(points, FIVE_YEAR_POINTS);

    let high_1y = max_high(points)?;
    let high_2y = max_high(two_year)?;
    let high_5y = max_high(five_year)?;
    let low_1y = min_low(points)?;
    let low_2y = min_low(two_year)?;
    let low_5y = min_low(five_year)?;

    Ok(MetricRow {
        ticker: ticker.to_string(),
        last_close,
        high_1y_diff_pct: diff_pct(last_close, high_1y)?,
        high_2y_diff_pct: diff_pct(last_close, high_2y)?,
        high_5y_diff_pct: diff_pct(last_close, high_5y)?,
        low_1y_diff_pct: diff_pct(last_close, low_1y)?,
        low_2y_diff_pct: diff_pct(last_close, low_2y)?,
        low_5y_diff_pct: diff_pct(last_close, low_5y)?,
    })
}

/// Percentage deviation of `current` from `reference`, rounded to 2 decimals.
pub fn diff_pct(current: f64, reference: f64) -> Result<f64, MetricsError> {
    if reference == 0.0 {
        return Err(MetricsError::Reduction(
            "reference price is zero".to_string(),
        ));
    }
    let pct = (current - reference) / reference * 100.0;
    ensure_finite("percentage difference", pct)?;
    Ok(round2(pct))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trailing(points: &[PricePoint], len: usize) -> &[PricePoint] {
    &points[points.len().saturating_sub(len)..]
}

fn max_high(window: &[PricePoint]) -> Result<f64, MetricsError> {
    extremum(window, |p| p.high, f64::max, "high")
}

fn min_low(window: &[PricePoint]) -> Result<f64, MetricsError> {
    extremum(window, |p| p.low, f64::min, "low")
}

fn extremum(
    window: &[PricePoint],
    field: impl Fn(&PricePoint) -> f64,
    pick: impl Fn(f64, f64) -> f64,
    label: &str,
) -> Result<f64, MetricsError> {
    let mut values = window.iter().map(field);
    let first = values.next().ok_or(MetricsError::DataUnavailable)?;
    let value = values.fold(first, pick);
    ensure_finite(label, value)?;
    Ok(value)
}

fn ensure_finite(label: &str, value: f64) -> Result<(), MetricsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MetricsError::Reduction(format!(
            "{label} is not a finite number ({value})"
        )))
    }
}
