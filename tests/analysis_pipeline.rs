use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ticker_analysis::data_provider::PriceHistoryProvider;
use ticker_analysis::report::format_report;
use ticker_analysis::scrapers::base::{FundamentalsSource, PriceSource};
use ticker_analysis::scrapers::statistics::parse_key_statistics;
use ticker_analysis::services::analysis_service::AnalysisService;
use ticker_analysis::{AnalysisError, Config, FundamentalMetrics, PriceBar, PriceSeries, Result, Trend};

struct FakePrices {
    bars: Vec<PriceBar>,
}

#[async_trait]
impl PriceSource for FakePrices {
    fn source_name(&self) -> &'static str {
        "fake prices"
    }

    async fn fetch_history(&self, _ticker: &str, start: &NaiveDate, end: &NaiveDate) -> Result<PriceSeries> {
        Ok(PriceSeries {
            currency: Some("BRL".to_string()),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= *start && b.date < *end)
                .cloned()
                .collect(),
        })
    }
}

struct FakeStatistics {
    calls: AtomicUsize,
}

#[async_trait]
impl FundamentalsSource for FakeStatistics {
    fn source_name(&self) -> &'static str {
        "fake statistics"
    }

    async fn fetch_key_statistics(&self, _ticker: &str) -> Result<FundamentalMetrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parse_key_statistics(
            r#"<table>
                <tr><td class="Fz(s) Fw(500) Ta(end) Pstart(10px) Miw(60px)">Trailing P/E</td>
                    <td class="Fz(s) Ta(end) Pstart(10px) Miw(60px)">12.80</td></tr>
                <tr><td class="Fz(s) Fw(500) Ta(end) Pstart(10px) Miw(60px)">Profit Margin</td>
                    <td class="Fz(s) Ta(end) Pstart(10px) Miw(60px)">9.15%</td></tr>
                <tr><td class="Fz(s) Fw(500) Ta(end) Pstart(10px) Miw(60px)">Return on Equity (ttm)</td>
                    <td class="Fz(s) Ta(end) Pstart(10px) Miw(60px)">14.02%</td></tr>
            </table>"#,
        )
    }
}

struct BlockedStatistics;

#[async_trait]
impl FundamentalsSource for BlockedStatistics {
    fn source_name(&self) -> &'static str {
        "blocked statistics"
    }

    async fn fetch_key_statistics(&self, ticker: &str) -> Result<FundamentalMetrics> {
        Err(AnalysisError::Http {
            status: 404,
            url: format!("https://finance.yahoo.com/quote/{}/key-statistics", ticker),
        })
    }
}

/// Weekday bars from late 2023 that fall over the last month
fn declining_bars() -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
    (0..300)
        .map(|i| start + Duration::days(i))
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .enumerate()
        .map(|(i, date)| {
            let i = i as f64;
            let close = if i < 150.0 { 20.0 + i * 0.05 } else { 27.5 - (i - 150.0) * 0.2 };
            PriceBar {
                date,
                open: close + 0.1,
                high: close + 0.4 + (i % 4.0) * 0.05,
                low: close - 0.3,
                close,
                adj_close: close,
                volume: 500_000 + ((i * 7919.0) % 100_000.0) as i64,
            }
        })
        .collect()
}

fn service(config: Config, statistics: Arc<FakeStatistics>) -> AnalysisService {
    AnalysisService::new(config, Arc::new(FakePrices { bars: declining_bars() }), statistics)
}

#[tokio::test]
async fn full_run_writes_chart_export_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let chart_path = dir.path().join("chart.svg");
    let export_path = dir.path().join("history.arrow");
    let statistics = Arc::new(FakeStatistics { calls: AtomicUsize::new(0) });

    let config = Config::new()
        .with_chart_path(&chart_path)
        .with_export_path(Some(&export_path));
    let outcome = service(config, statistics.clone()).run().await.unwrap();

    let report = &outcome.report;
    assert_eq!(report.ticker, "VIVA3.SA");
    assert!(report.first_date >= NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    assert!(report.last_date < NaiveDate::from_ymd_opt(2024, 7, 28).unwrap());
    assert_eq!(report.short_term_trend, Trend::Negative);
    assert!(report.regression.r2 > 0.999);
    assert_eq!(statistics.calls.load(Ordering::SeqCst), 1);
    assert!(outcome.fundamentals_error.is_none());
    assert_eq!(outcome.history.currency.as_deref(), Some("BRL"));

    assert!(chart_path.exists());
    let exported = PriceHistoryProvider::load_from_file(&export_path).unwrap();
    assert_eq!(exported.history().rows, outcome.history.rows);

    let text = format_report(report, "2024-07-28");
    assert!(text.contains("Short-term trend: negative"));
    assert!(text.contains("P/E Ratio (Price/Earnings): 12.8"));
    assert!(text.contains("Net Profit Margin (%): 9.15"));
    assert!(text.contains("ROE (Return on Equity) (%): 14.02"));
}

#[tokio::test]
async fn fundamentals_can_be_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let statistics = Arc::new(FakeStatistics { calls: AtomicUsize::new(0) });
    let config = Config::new()
        .with_chart_path(dir.path().join("chart.svg"))
        .with_fetch_fundamentals(false);

    let outcome = service(config, statistics.clone()).run().await.unwrap();
    assert!(outcome.report.fundamentals.is_none());
    assert!(outcome.fundamentals_error.is_none());
    assert_eq!(statistics.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_scrape_keeps_the_technical_report() {
    let dir = tempfile::tempdir().unwrap();
    let chart_path = dir.path().join("chart.svg");
    let config = Config::new().with_chart_path(&chart_path);
    let service = AnalysisService::new(
        config,
        Arc::new(FakePrices { bars: declining_bars() }),
        Arc::new(BlockedStatistics),
    );

    let outcome = service.run().await.unwrap();
    assert!(chart_path.exists());
    assert!(outcome.report.fundamentals.is_none());
    assert!(matches!(outcome.fundamentals_error, Some(AnalysisError::Http { status: 404, .. })));

    let text = format_report(&outcome.report, "2024-07-28");
    assert!(text.contains("Short-term trend: negative"));
    assert!(text.contains("Coefficient of Determination"));
    assert!(!text.contains("Fundamental Analysis"));
}

#[tokio::test]
async fn empty_range_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let statistics = Arc::new(FakeStatistics { calls: AtomicUsize::new(0) });
    let config = Config::new()
        .with_chart_path(dir.path().join("chart.svg"))
        .with_date_range(
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 2, 1).unwrap(),
        );

    let result = service(config, statistics).run().await;
    assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    assert!(!dir.path().join("chart.svg").exists());
}
