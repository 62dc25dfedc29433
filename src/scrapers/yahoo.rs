use crate::config::Config;
use crate::errors::{AnalysisError, Result};
use crate::models::fundamentals::FundamentalMetrics;
use crate::models::price::{PriceBar, PriceSeries};
use crate::scrapers::base::{FundamentalsSource, PriceSource};
use crate::scrapers::{chart, statistics};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_URL: &str = "https://finance.yahoo.com/quote";

/// Yahoo Finance 数据抓取器
pub struct YahooScraper {
    client: Client,
    last_request: Mutex<Option<Instant>>,
}

impl YahooScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(AnalysisError::RequestError)?;

        Ok(Self {
            client,
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        const MIN_INTERVAL: Duration = Duration::from_millis(500);

        let now = Instant::now();
        let should_wait = {
            let mut last = match self.last_request.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let should_wait = last
                .map(|instant| instant.elapsed())
                .filter(|elapsed| *elapsed < MIN_INTERVAL)
                .map(|elapsed| MIN_INTERVAL - elapsed);
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} between requests", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        self.wait_for_rate_limit().await;

        let response = self.client.get(url).query(query).send().await?;
        check_status(response.status(), url)?;

        Ok(response.text().await?)
    }
}

fn check_status(status: StatusCode, url: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AnalysisError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// 保留 `[start, end)` 区间内的日线，结束日期不含
fn within_range(bars: Vec<PriceBar>, start: &NaiveDate, end: &NaiveDate) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|b| b.date >= *start && b.date < *end)
        .collect()
}

/// Unix seconds of midnight UTC at the start of `date`
fn unix_seconds(date: &NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl PriceSource for YahooScraper {
    fn source_name(&self) -> &'static str {
        "Yahoo Finance chart"
    }

    async fn fetch_history(&self, ticker: &str, start: &NaiveDate, end: &NaiveDate) -> Result<PriceSeries> {
        if end <= start {
            return Err(AnalysisError::DataError(format!(
                "End date {} must be after start date {}",
                end, start
            )));
        }
        info!("Fetching daily prices for {} from {} to {}", ticker, start, end);

        let url = format!("{}/{}", CHART_URL, ticker);
        let body = self
            .get_text(
                &url,
                &[
                    ("period1", unix_seconds(start).to_string()),
                    ("period2", unix_seconds(end).to_string()),
                    ("interval", "1d".to_string()),
                    ("events", "div,splits".to_string()),
                    ("includePrePost", "false".to_string()),
                ],
            )
            .await?;

        let data = chart::parse_chart_response(&body)?;
        let bars = within_range(data.bars, start, end);

        info!(
            "Received {} daily bars for {} ({})",
            bars.len(),
            ticker,
            data.currency.as_deref().unwrap_or("unknown currency")
        );
        Ok(PriceSeries {
            currency: data.currency,
            bars,
        })
    }
}

#[async_trait]
impl FundamentalsSource for YahooScraper {
    fn source_name(&self) -> &'static str {
        "Yahoo Finance key statistics"
    }

    async fn fetch_key_statistics(&self, ticker: &str) -> Result<FundamentalMetrics> {
        info!("Scraping key statistics for {}", ticker);

        let url = format!("{}/{}/key-statistics", QUOTE_URL, ticker);
        let html = self.get_text(&url, &[("p", ticker.to_string())]).await?;
        let metrics = statistics::parse_key_statistics(&html)?;

        info!("Scraped {} fundamental metrics for {}", metrics.len(), ticker);
        Ok(metrics)
    }
}
