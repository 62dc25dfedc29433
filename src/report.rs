use crate::models::fundamentals::FundamentalMetrics;
use crate::models::report::AnalysisReport;
use std::fmt;

/// Headline ratios printed after the metric table
pub const HEADLINE_METRICS: [(&str, &str); 3] = [
    ("Trailing P/E", "P/E Ratio (Price/Earnings)"),
    ("Profit Margin", "Net Profit Margin (%)"),
    ("Return on Equity", "ROE (Return on Equity) (%)"),
];

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// 技术分析部分
pub struct TechnicalSection<'a> {
    pub report: &'a AnalysisReport,
    /// 最后一日涨跌幅所标注的日期
    pub end_label: &'a str,
}

impl fmt::Display for TechnicalSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        writeln!(f)?;
        writeln!(
            f,
            "Trend Analysis ({}, {} to {}, {} trading days):",
            report.ticker, report.first_date, report.last_date, report.rows
        )?;
        writeln!(f, "Short-term trend: {}", report.short_term_trend)?;
        writeln!(f, "Long-term trend: {}", report.long_term_trend)?;
        writeln!(
            f,
            "Last close: {:.2} | {}-day SMA: {:.2} | {}-day SMA: {:.2}",
            report.last_close, report.short_window, report.sma_short, report.long_window, report.sma_long
        )?;

        writeln!(f, "\nHistorical Volatility: {}", opt(report.volatility))?;
        writeln!(
            f,
            "\nPercent change of the closing price on {} versus the previous day: {}",
            self.end_label,
            opt(report.last_change_pct)
        )?;
        writeln!(
            f,
            "\nCorrelation between Closing Price and Trading Volume: {}",
            opt(report.close_volume_correlation)
        )?;

        writeln!(f, "\nLinear Regression Model Performance:")?;
        writeln!(f, "Mean Squared Error (MSE): {}", report.regression.mse)?;
        writeln!(f, "Coefficient of Determination (R²): {}", report.regression.r2)
    }
}

/// 基本面部分；缺失或无法解析的比率按 0 输出
pub struct FundamentalsSection<'a>(pub &'a FundamentalMetrics);

impl fmt::Display for FundamentalsSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nFundamental Analysis:")?;
        for (name, value) in self.0.iter() {
            writeln!(f, "{}: {}", name, value)?;
        }

        for (key, label) in HEADLINE_METRICS {
            writeln!(f, "{}: {}", label, self.0.numeric(key).unwrap_or(0.0))?;
        }
        Ok(())
    }
}

pub fn format_technical(report: &AnalysisReport, end_label: &str) -> String {
    TechnicalSection { report, end_label }.to_string()
}

pub fn format_fundamentals(metrics: &FundamentalMetrics) -> String {
    FundamentalsSection(metrics).to_string()
}

pub fn format_report(report: &AnalysisReport, end_label: &str) -> String {
    let mut out = format_technical(report, end_label);
    if let Some(metrics) = &report.fundamentals {
        out.push_str(&format_fundamentals(metrics));
    }
    out
}
