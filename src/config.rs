use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TICKER: &str = "VIVA3.SA";
pub const DEFAULT_START: &str = "2023-12-01";
pub const DEFAULT_END: &str = "2024-07-28";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// 单次分析运行的配置
#[derive(Debug, Clone)]
pub struct Config {
    pub ticker: String,
    pub start: NaiveDate,
    /// 结束日期（不含）
    pub end: NaiveDate,
    pub chart_path: PathBuf,
    pub export_path: Option<PathBuf>,
    pub sma_short_window: usize,
    pub sma_long_window: usize,
    pub test_size: f64,
    pub random_seed: u64,
    pub trading_days_per_year: f64,
    pub fetch_fundamentals: bool,
    pub http_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 7, 28).unwrap_or_default(),
            chart_path: PathBuf::from("chart.svg"),
            export_path: None,
            sma_short_window: 50,
            sma_long_window: 200,
            test_size: 0.2,
            random_seed: 42,
            trading_days_per_year: 252.0,
            fetch_fundamentals: true,
            http_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_ticker(mut self, ticker: &str) -> Self {
        self.ticker = ticker.trim().to_uppercase();
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_chart_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.chart_path = path.into();
        self
    }

    pub fn with_export_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.export_path = path.map(Into::into);
        self
    }

    pub fn with_sma_windows(mut self, short: usize, long: usize) -> Self {
        self.sma_short_window = short.max(1);
        self.sma_long_window = long.max(1);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_fetch_fundamentals(mut self, fetch: bool) -> Self {
        self.fetch_fundamentals = fetch;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_viva3_window() {
        let config = Config::new();
        assert_eq!(config.ticker, "VIVA3.SA");
        assert_eq!(config.start.to_string(), DEFAULT_START);
        assert_eq!(config.end.to_string(), DEFAULT_END);
        assert_eq!(config.sma_short_window, 50);
        assert_eq!(config.sma_long_window, 200);
        assert_eq!(config.random_seed, 42);
        assert!(config.fetch_fundamentals);
    }

    #[test]
    fn builders_normalize_inputs() {
        let config = Config::new()
            .with_ticker(" petr4.sa ")
            .with_sma_windows(0, 20)
            .with_export_path(Some("out.arrow"))
            .with_random_seed(7)
            .with_http_timeout(Duration::from_secs(5));
        assert_eq!(config.ticker, "PETR4.SA");
        assert_eq!(config.sma_short_window, 1);
        assert_eq!(config.sma_long_window, 20);
        assert_eq!(config.export_path, Some(PathBuf::from("out.arrow")));
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }
}
