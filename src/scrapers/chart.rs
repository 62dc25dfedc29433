use crate::errors::{AnalysisError, Result};
use crate::models::price::{PriceBar, PriceSeries};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::Deserialize;

// `chart` endpoint schema
#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: ChartResponse,
}

#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub currency: Option<String>,
    pub symbol: Option<String>,
    pub exchange_timezone_name: Option<String>,
    pub gmtoffset: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// 解析 chart 接口返回的 JSON，丢弃含空值的行，并按日期升序排列
pub fn parse_chart_response(body: &str) -> Result<PriceSeries> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(AnalysisError::Provider(format!(
            "{}: {}",
            err.code.unwrap_or_else(|| "unknown".to_string()),
            err.description.unwrap_or_default()
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| AnalysisError::DataError("chart response has no result".to_string()))?;

    let to_date = date_converter(&result.meta);
    let quote = result.indicators.quote.first();
    let adjclose = result.indicators.adjclose.first().map(|a| a.adjclose.as_slice());

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;

    for (i, ts) in result.timestamp.iter().enumerate() {
        let row = quote.and_then(|q| {
            Some((
                value_at(&q.open, i)?,
                value_at(&q.high, i)?,
                value_at(&q.low, i)?,
                value_at(&q.close, i)?,
                value_at(&q.volume, i)?,
            ))
        });
        let date = to_date(*ts);

        match (row, date) {
            (Some((open, high, low, close, volume)), Some(date)) => {
                let adj_close = adjclose.and_then(|a| value_at(a, i)).unwrap_or(close);
                bars.push(PriceBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    adj_close,
                    volume: volume.round() as i64,
                });
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} incomplete rows", dropped);
    }

    bars.sort_by(|a, b| a.date.cmp(&b.date));
    // 同一交易日只保留最后一条（盘中快照会与日线重复）
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();

    Ok(PriceSeries {
        currency: result.meta.currency,
        bars,
    })
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Picks the exchange timezone for converting timestamps to trading dates:
/// the IANA name first, then the fixed GMT offset, then UTC.
fn date_converter(meta: &ChartMeta) -> Box<dyn Fn(i64) -> Option<NaiveDate>> {
    if let Some(name) = meta.exchange_timezone_name.as_deref() {
        match name.parse::<Tz>() {
            Ok(tz) => {
                return Box::new(move |ts| {
                    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&tz).date_naive())
                })
            }
            Err(_) => warn!("Unknown exchange timezone {}, using gmtoffset", name),
        }
    }

    let offset = meta
        .gmtoffset
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    Box::new(move |ts| DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&offset).date_naive()))
}
