use chrono::NaiveDate;
use std::fmt;

use super::fundamentals::FundamentalMetrics;

/// Direction of the last close relative to a moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Positive,
    Negative,
    Stable,
}

impl Trend {
    pub fn classify(price: f64, average: f64) -> Self {
        if price > average {
            Trend::Positive
        } else if price < average {
            Trend::Negative
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Positive => "positive",
            Trend::Negative => "negative",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}

/// Held-out quality of the price regression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub mse: f64,
    pub r2: f64,
    pub intercept: f64,
    pub coefficients: [f64; 4],
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub ticker: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub rows: usize,
    pub last_close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub short_window: usize,
    pub long_window: usize,
    pub short_term_trend: Trend,
    pub long_term_trend: Trend,
    pub volatility: Option<f64>,
    pub last_change_pct: Option<f64>,
    pub close_volume_correlation: Option<f64>,
    pub regression: RegressionSummary,
    pub fundamentals: Option<FundamentalMetrics>,
}
