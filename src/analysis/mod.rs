pub mod indicators;
pub mod regression;

use crate::config::Config;
use crate::errors::{AnalysisError, Result};
use crate::models::price::{IndicatorRow, PriceBar, PriceHistory};
use crate::models::report::{AnalysisReport, RegressionSummary, Trend};
use log::{debug, info};

use indicators::{annualized_volatility, last_percent_change, pearson_correlation, simple_moving_average};
use regression::{mean_squared_error, r2_score, train_test_split, LinearRegression};

/// Attaches the short and long moving averages to each bar
pub fn build_history(ticker: &str, currency: Option<String>, mut bars: Vec<PriceBar>, config: &Config) -> PriceHistory {
    bars.sort_by(|a, b| a.date.cmp(&b.date));

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let sma_short = simple_moving_average(&closes, config.sma_short_window);
    let sma_long = simple_moving_average(&closes, config.sma_long_window);

    let rows = bars
        .into_iter()
        .zip(sma_short.into_iter().zip(sma_long))
        .map(|(bar, (short, long))| IndicatorRow {
            bar,
            sma_short: short,
            sma_long: long,
        })
        .collect();

    PriceHistory {
        ticker: ticker.to_string(),
        currency,
        rows,
    }
}

/// Fits `Close ~ Open + High + Low + Close` on a seeded split and scores it on the held-out rows
pub fn evaluate_regression(history: &PriceHistory, config: &Config) -> Result<RegressionSummary> {
    let features: Vec<Vec<f64>> = history
        .rows
        .iter()
        .map(|r| vec![r.bar.open, r.bar.high, r.bar.low, r.bar.close])
        .collect();
    let target = history.closes();

    let (train, test) = train_test_split(features.len(), config.test_size, config.random_seed)?;
    let pick_x = |idx: &[usize]| idx.iter().map(|&i| features[i].clone()).collect::<Vec<_>>();
    let pick_y = |idx: &[usize]| idx.iter().map(|&i| target[i]).collect::<Vec<_>>();

    let model = LinearRegression::fit(&pick_x(&train), &pick_y(&train))?;
    let y_test = pick_y(&test);
    let y_pred = model.predict(&pick_x(&test));

    let mut coefficients = [0.0; 4];
    coefficients.copy_from_slice(&model.coefficients);
    debug!("Regression intercept {} coefficients {:?}", model.intercept, coefficients);

    Ok(RegressionSummary {
        train_rows: train.len(),
        test_rows: test.len(),
        mse: mean_squared_error(&y_test, &y_pred),
        r2: r2_score(&y_test, &y_pred),
        intercept: model.intercept,
        coefficients,
    })
}

/// 计算趋势、波动率、相关性与回归指标
pub fn analyze(history: &PriceHistory, config: &Config) -> Result<AnalysisReport> {
    let (first, last) = match (history.rows.first(), history.rows.last()) {
        (Some(first), Some(last)) if history.rows.len() >= 2 => (first, last),
        _ => {
            return Err(AnalysisError::InsufficientData(format!(
                "{} has {} trading days, at least 2 are needed",
                history.ticker,
                history.rows.len()
            )))
        }
    };
    info!("Analyzing {} trading days of {}", history.rows.len(), history.ticker);

    let closes = history.closes();
    let volumes: Vec<f64> = history.rows.iter().map(|r| r.bar.volume as f64).collect();

    Ok(AnalysisReport {
        ticker: history.ticker.clone(),
        first_date: first.bar.date,
        last_date: last.bar.date,
        rows: history.rows.len(),
        last_close: last.bar.close,
        sma_short: last.sma_short,
        sma_long: last.sma_long,
        short_window: config.sma_short_window,
        long_window: config.sma_long_window,
        short_term_trend: Trend::classify(last.bar.close, last.sma_short),
        long_term_trend: Trend::classify(last.bar.close, last.sma_long),
        volatility: annualized_volatility(&closes, config.trading_days_per_year),
        last_change_pct: last_percent_change(&closes),
        close_volume_correlation: pearson_correlation(&closes, &volumes),
        regression: evaluate_regression(history, config)?,
        fundamentals: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: start + Duration::days(i as i64),
                open: c - 0.5,
                high: c + 1.0,
                low: c - 1.0 - (i % 3) as f64 * 0.1,
                close: c,
                adj_close: c,
                volume: 1000 + (i as i64 * 37) % 500,
            })
            .collect()
    }

    #[test]
    fn history_is_sorted_and_carries_averages() {
        let mut input = bars(&[10.0, 11.0, 12.0, 13.0]);
        input.reverse();
        let config = Config::new().with_sma_windows(2, 3);
        let history = build_history("TEST", None, input, &config);

        assert_eq!(history.rows[0].bar.close, 10.0);
        assert_eq!(history.rows[3].sma_short, 12.5);
        assert_eq!(history.rows[3].sma_long, 12.0);
        assert_eq!(history.rows[0].sma_long, 10.0);
    }

    #[test]
    fn report_for_rising_series() {
        let closes: Vec<f64> = (0..30).map(|i| 20.0 + i as f64 * 0.5).collect();
        let config = Config::new();
        let history = build_history("TEST", None, bars(&closes), &config);
        let report = analyze(&history, &config).unwrap();

        assert_eq!(report.rows, 30);
        assert_eq!(report.last_close, 34.5);
        assert_eq!(report.short_term_trend, Trend::Positive);
        assert_eq!(report.long_term_trend, Trend::Positive);
        assert_eq!(report.regression.test_rows, 6);
        assert_eq!(report.regression.train_rows, 24);
        // close is one of the features, so the held-out fit is exact
        assert!(report.regression.r2 > 0.999_999);
        assert!(report.regression.mse < 1e-9);
        assert!(report.volatility.unwrap() > 0.0);
        assert!((report.last_change_pct.unwrap() - (0.5 / 34.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn flat_series_is_stable() {
        let config = Config::new();
        let history = build_history("FLAT", None, bars(&[5.0; 10]), &config);
        let report = analyze(&history, &config).unwrap();
        assert_eq!(report.short_term_trend, Trend::Stable);
        assert_eq!(report.long_term_trend, Trend::Stable);
        assert_eq!(report.volatility, Some(0.0));
        assert_eq!(report.close_volume_correlation, None);
    }

    #[test]
    fn single_day_is_insufficient() {
        let config = Config::new();
        let history = build_history("ONE", None, bars(&[5.0]), &config);
        assert!(matches!(analyze(&history, &config), Err(AnalysisError::InsufficientData(_))));
    }
}
