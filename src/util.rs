use chrono::{Datelike, NaiveDate};
use crate::errors::{Result, AnalysisError};

// 日期转换工具
pub fn naive_date_to_int(date: &NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

pub fn int_to_naive_date(date_int: i32) -> Result<NaiveDate> {
    let date_str = date_int.to_string();
    if date_str.len() != 8 {
        return Err(AnalysisError::DataError(format!("Invalid date format: {}", date_str)));
    }

    let year = date_str[0..4].parse::<i32>()?;
    let month = date_str[4..6].parse::<u32>()?;
    let day = date_str[6..8].parse::<u32>()?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AnalysisError::DataError(format!("Invalid date: {}-{}-{}", year, month, day)))
}

pub fn parse_cli_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?)
}

// Arrow数据转换工具
pub mod arrow_utils {
    use super::*;
    use crate::models::price::{IndicatorRow, PriceBar, PriceHistory};
    use arrow::array::{ArrayRef, StringBuilder};
    use arrow::record_batch::RecordBatch;
    use arrow_array::{Array, Float64Array, Int32Array, Int64Array, StringArray};
    use arrow_ipc::reader::FileReader;
    use arrow_ipc::writer::FileWriter;
    use arrow_schema::{DataType, Field, Schema};
    use log::info;
    use std::collections::HashMap;
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    const CURRENCY_KEY: &str = "currency";

    pub fn history_schema(currency: Option<&str>) -> Schema {
        let fields = vec![
            Field::new("ticker", DataType::Utf8, false),
            Field::new("date", DataType::Int32, false),
            Field::new("open", DataType::Float64, false),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
            Field::new("adj_close", DataType::Float64, false),
            Field::new("volume", DataType::Int64, false),
            Field::new("sma_short", DataType::Float64, false),
            Field::new("sma_long", DataType::Float64, false),
        ];
        let mut metadata = HashMap::new();
        if let Some(currency) = currency {
            metadata.insert(CURRENCY_KEY.to_string(), currency.to_string());
        }
        Schema::new_with_metadata(fields, metadata)
    }

    // 将行情与均线转换为Arrow记录批次
    pub fn history_to_record_batch(history: &PriceHistory) -> Result<RecordBatch> {
        let mut ticker_builder = StringBuilder::new();
        for _ in &history.rows {
            ticker_builder.append_value(&history.ticker);
        }

        let rows = &history.rows;
        let f64_column = |f: fn(&IndicatorRow) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
        };

        let columns: Vec<ArrayRef> = vec![
            Arc::new(ticker_builder.finish()),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| naive_date_to_int(&r.bar.date)).collect::<Vec<_>>(),
            )),
            f64_column(|r| r.bar.open),
            f64_column(|r| r.bar.high),
            f64_column(|r| r.bar.low),
            f64_column(|r| r.bar.close),
            f64_column(|r| r.bar.adj_close),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.bar.volume).collect::<Vec<_>>())),
            f64_column(|r| r.sma_short),
            f64_column(|r| r.sma_long),
        ];

        Ok(RecordBatch::try_new(
            Arc::new(history_schema(history.currency.as_deref())),
            columns,
        )?)
    }

    fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<T>())
            .ok_or_else(|| AnalysisError::ArrowError(format!("Failed to downcast {} column", name)))
    }

    // 从Arrow文件读取行情数据
    pub fn read_history_from_arrow<P: AsRef<Path>>(path: P) -> Result<PriceHistory> {
        let file = File::open(path.as_ref())?;
        let reader = FileReader::try_new(file, None)?;
        let currency = reader.schema().metadata().get(CURRENCY_KEY).cloned();

        let mut ticker = String::new();
        let mut rows = Vec::new();

        for batch in reader {
            let batch = batch?;

            let tickers = column::<StringArray>(&batch, "ticker")?;
            let dates = column::<Int32Array>(&batch, "date")?;
            let open = column::<Float64Array>(&batch, "open")?;
            let high = column::<Float64Array>(&batch, "high")?;
            let low = column::<Float64Array>(&batch, "low")?;
            let close = column::<Float64Array>(&batch, "close")?;
            let adj_close = column::<Float64Array>(&batch, "adj_close")?;
            let volume = column::<Int64Array>(&batch, "volume")?;
            let sma_short = column::<Float64Array>(&batch, "sma_short")?;
            let sma_long = column::<Float64Array>(&batch, "sma_long")?;

            for i in 0..batch.num_rows() {
                if ticker.is_empty() && !tickers.is_null(i) {
                    ticker = tickers.value(i).to_string();
                }
                rows.push(IndicatorRow {
                    bar: PriceBar {
                        date: int_to_naive_date(dates.value(i))?,
                        open: open.value(i),
                        high: high.value(i),
                        low: low.value(i),
                        close: close.value(i),
                        adj_close: adj_close.value(i),
                        volume: volume.value(i),
                    },
                    sma_short: sma_short.value(i),
                    sma_long: sma_long.value(i),
                });
            }
        }

        Ok(PriceHistory { ticker, currency, rows })
    }

    // 将行情数据保存到Arrow文件
    pub fn save_history_to_arrow<P: AsRef<Path>>(history: &PriceHistory, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Saving {} rows of {} to {}", history.rows.len(), history.ticker, path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let batch = history_to_record_batch(history)?;
        let file = File::create(path)?;

        let mut writer = FileWriter::try_new(file, &batch.schema())?;
        writer.write(&batch)?;
        writer.finish()?;

        Ok(())
    }
}
