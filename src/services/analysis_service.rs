use crate::analysis;
use crate::chart;
use crate::config::Config;
use crate::errors::{AnalysisError, Result};
use crate::models::fundamentals::FundamentalMetrics;
use crate::models::price::PriceHistory;
use crate::models::report::AnalysisReport;
use crate::scrapers::base::{FundamentalsSource, PriceSource};
use crate::util::arrow_utils;
use log::{info, warn};
use std::sync::Arc;

/// Output of one pipeline run
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub history: PriceHistory,
    pub report: AnalysisReport,
    /// 基本面抓取失败时保留错误，技术分析结果仍然有效
    pub fundamentals_error: Option<AnalysisError>,
}

/// 分析服务：抓取行情 → 计算指标 → 绘图 → 抓取基本面
pub struct AnalysisService {
    config: Config,
    prices: Arc<dyn PriceSource + Send + Sync>,
    fundamentals: Arc<dyn FundamentalsSource + Send + Sync>,
}

impl AnalysisService {
    pub fn new(
        config: Config,
        prices: Arc<dyn PriceSource + Send + Sync>,
        fundamentals: Arc<dyn FundamentalsSource + Send + Sync>,
    ) -> Self {
        Self {
            config,
            prices,
            fundamentals,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 获取并整理行情数据
    pub async fn load_history(&self) -> Result<PriceHistory> {
        let config = &self.config;
        info!("Loading prices from {}", self.prices.source_name());

        let series = self
            .prices
            .fetch_history(&config.ticker, &config.start, &config.end)
            .await?;
        if series.bars.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no prices for {} between {} and {}",
                config.ticker, config.start, config.end
            )));
        }

        Ok(analysis::build_history(&config.ticker, series.currency, series.bars, config))
    }

    /// 行情部分：指标、回归、绘图、可选导出
    pub async fn analyze_prices(&self) -> Result<AnalysisOutcome> {
        let config = &self.config;

        let history = self.load_history().await?;
        let report = analysis::analyze(&history, config)?;

        chart::render_moving_average_chart(
            &history,
            config.sma_short_window,
            config.sma_long_window,
            &config.chart_path,
        )?;

        if let Some(path) = &config.export_path {
            arrow_utils::save_history_to_arrow(&history, path)?;
        }

        Ok(AnalysisOutcome {
            history,
            report,
            fundamentals_error: None,
        })
    }

    pub async fn load_fundamentals(&self) -> Result<FundamentalMetrics> {
        let ticker = &self.config.ticker;
        info!("Loading fundamentals from {}", self.fundamentals.source_name());

        let metrics = self.fundamentals.fetch_key_statistics(ticker).await?;
        if metrics.is_empty() {
            warn!("No fundamental metrics found for {}", ticker);
        }
        Ok(metrics)
    }

    /// Runs the whole pipeline once. A failed key-statistics scrape is kept in
    /// `fundamentals_error` so the price analysis still reaches the caller.
    pub async fn run(&self) -> Result<AnalysisOutcome> {
        let mut outcome = self.analyze_prices().await?;

        if self.config.fetch_fundamentals {
            match self.load_fundamentals().await {
                Ok(metrics) => outcome.report.fundamentals = Some(metrics),
                Err(e) => {
                    warn!("Key statistics for {} unavailable: {}", self.config.ticker, e);
                    outcome.fundamentals_error = Some(e);
                }
            }
        }

        info!("Finished analysis of {}", self.config.ticker);
        Ok(outcome)
    }
}
