use crate::errors::{AnalysisError, Result};
use crate::models::price::PriceHistory;
use chrono::{Datelike, NaiveDate};
use log::info;
use plotters::prelude::*;
use std::path::Path;

const CLOSE_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const SMA_SHORT_COLOR: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
const SMA_LONG_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);

const CHART_SIZE: (u32, u32) = (1200, 600);

fn chart_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::ChartError(e.to_string())
}

/// Row indices of the first trading day of each month, used as x-axis ticks
pub(crate) fn month_ticks(dates: &[NaiveDate]) -> Vec<f64> {
    dates
        .iter()
        .enumerate()
        .filter(|(i, d)| match i.checked_sub(1).and_then(|p| dates.get(p)) {
            Some(prev) => (prev.year(), prev.month()) != (d.year(), d.month()),
            None => d.day() == 1,
        })
        .map(|(i, _)| i as f64)
        .collect()
}

/// 绘制收盘价与长短期均线图（深色背景，SVG 输出）
pub fn render_moving_average_chart(history: &PriceHistory, short_window: usize, long_window: usize, path: &Path) -> Result<()> {
    if history.rows.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "no prices to chart for {}",
            history.ticker
        )));
    }

    let (lo, hi) = history
        .rows
        .iter()
        .flat_map(|r| [r.bar.close, r.sma_short, r.sma_long])
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(0.01);
    let x_max = (history.rows.len().max(2) - 1) as f64;
    let dates = history.dates();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&BLACK).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{}-Day and {}-Day Moving Averages: {}", short_window, long_window, history.ticker),
            ("sans-serif", 24).into_font().style(FontStyle::Bold).color(&WHITE),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0f64..x_max).with_key_points(month_ticks(&dates)),
            (lo - pad)..(hi + pad),
        )
        .map_err(chart_err)?;

    let label_date = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        dates
            .get(idx as usize)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&label_date)
        .label_style(("sans-serif", 12).into_font().color(&WHITE))
        .axis_desc_style(("sans-serif", 14).into_font().color(&WHITE))
        .axis_style(&WHITE)
        .bold_line_style(WHITE.mix(0.25))
        .light_line_style(WHITE.mix(0.08))
        .draw()
        .map_err(chart_err)?;

    let series = [
        ("Close Price".to_string(), CLOSE_COLOR, history.closes()),
        (
            format!("{}-Day Moving Average", short_window),
            SMA_SHORT_COLOR,
            history.rows.iter().map(|r| r.sma_short).collect::<Vec<_>>(),
        ),
        (
            format!("{}-Day Moving Average", long_window),
            SMA_LONG_COLOR,
            history.rows.iter().map(|r| r.sma_long).collect::<Vec<_>>(),
        ),
    ];

    for (label, color, values) in series {
        chart
            .draw_series(LineSeries::new(
                values.into_iter().enumerate().map(|(i, v)| (i as f64, v)),
                color.stroke_width(2),
            ))
            .map_err(chart_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(BLACK.mix(0.8))
        .border_style(&WHITE)
        .label_font(("sans-serif", 12).into_font().color(&WHITE))
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!("Chart written to {}", path.display());
    Ok(())
}
