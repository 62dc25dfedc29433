use chrono::NaiveDate;
use log::info;

use crate::errors::Result;
use crate::models::price::{IndicatorRow, PriceHistory};
use crate::util::arrow_utils;
use std::collections::HashMap;
use std::path::Path;

/// 已导出行情数据的访问入口
pub struct PriceHistoryProvider {
    history: PriceHistory,
    // 索引用于快速查找
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceHistoryProvider {
    /// 使用提供的数据创建新的数据提供者实例
    pub fn new_with_data(mut history: PriceHistory) -> Self {
        history.rows.sort_by(|a, b| a.bar.date.cmp(&b.bar.date));

        let mut provider = Self {
            history,
            date_index: HashMap::new(),
        };
        provider.rebuild_indices();
        provider
    }

    /// 从文件加载数据
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let history = arrow_utils::read_history_from_arrow(path.as_ref())?;
        info!(
            "Loaded {} rows of {} from {}",
            history.rows.len(),
            history.ticker,
            path.as_ref().display()
        );
        Ok(Self::new_with_data(history))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        arrow_utils::save_history_to_arrow(&self.history, path)
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn ticker(&self) -> &str {
        &self.history.ticker
    }

    pub fn get_row_by_date(&self, date: &NaiveDate) -> Option<&IndicatorRow> {
        self.date_index.get(date).map(|&idx| &self.history.rows[idx])
    }

    /// Rows with `start <= date <= end`, ascending
    pub fn get_rows_between(&self, start: &NaiveDate, end: &NaiveDate) -> &[IndicatorRow] {
        let rows = &self.history.rows;
        let from = rows.partition_point(|r| r.bar.date < *start);
        let to = rows.partition_point(|r| r.bar.date <= *end);
        if from >= to {
            return &[];
        }
        &rows[from..to]
    }

    pub fn get_latest_trading_date(&self) -> Option<NaiveDate> {
        self.history.rows.last().map(|r| r.bar.date)
    }

    /// 最近 `limit` 条记录，按日期降序
    pub fn latest_rows(&self, limit: usize) -> impl Iterator<Item = &IndicatorRow> {
        self.history.rows.iter().rev().take(limit)
    }

    fn rebuild_indices(&mut self) {
        self.date_index.clear();
        for (i, row) in self.history.rows.iter().enumerate() {
            self.date_index.insert(row.bar.date, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::PriceBar;

    fn row(y: i32, m: u32, d: u32, close: f64) -> IndicatorRow {
        IndicatorRow {
            bar: PriceBar {
                date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                adj_close: close,
                volume: 10,
            },
            sma_short: close,
            sma_long: close,
        }
    }

    fn provider() -> PriceHistoryProvider {
        PriceHistoryProvider::new_with_data(PriceHistory {
            ticker: "VIVA3.SA".to_string(),
            currency: Some("BRL".to_string()),
            rows: vec![row(2024, 7, 26, 3.0), row(2024, 7, 24, 1.0), row(2024, 7, 25, 2.0)],
        })
    }

    #[test]
    fn indexes_rows_by_date() {
        let provider = provider();
        let date = NaiveDate::from_ymd_opt(2024, 7, 25).unwrap();
        assert_eq!(provider.get_row_by_date(&date).unwrap().bar.close, 2.0);
        assert_eq!(provider.get_latest_trading_date(), NaiveDate::from_ymd_opt(2024, 7, 26));
        let latest: Vec<f64> = provider.latest_rows(2).map(|r| r.bar.close).collect();
        assert_eq!(latest, vec![3.0, 2.0]);
    }

    #[test]
    fn range_query_is_inclusive() {
        let provider = provider();
        let start = NaiveDate::from_ymd_opt(2024, 7, 25).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 30).unwrap();
        assert_eq!(provider.get_rows_between(&start, &end).len(), 2);
        assert!(provider.get_rows_between(&end, &start).is_empty());
    }

    #[test]
    fn survives_an_arrow_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.arrow");
        provider().save_to_file(&path).unwrap();

        let loaded = PriceHistoryProvider::load_from_file(&path).unwrap();
        assert_eq!(loaded.ticker(), "VIVA3.SA");
        assert_eq!(loaded.history().currency.as_deref(), Some("BRL"));
        assert_eq!(loaded.history().rows, provider().history().rows);
    }
}
