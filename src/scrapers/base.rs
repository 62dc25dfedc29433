use crate::models::price::PriceSeries;
use crate::models::fundamentals::FundamentalMetrics;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of daily price history
#[async_trait]
pub trait PriceSource {
    /// Name of the provider, used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch daily bars for `ticker` in `[start, end)`, ascending by date
    async fn fetch_history(&self, ticker: &str, start: &NaiveDate, end: &NaiveDate) -> Result<PriceSeries>;
}

/// Source of fundamental key statistics
#[async_trait]
pub trait FundamentalsSource {
    fn source_name(&self) -> &'static str;

    async fn fetch_key_statistics(&self, ticker: &str) -> Result<FundamentalMetrics>;
}
