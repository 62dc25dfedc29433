use chrono::NaiveDate;

/// 日线数据结构
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
}

/// Daily bars as delivered by a price source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub currency: Option<String>,
    pub bars: Vec<PriceBar>,
}

/// A price bar enriched with its short and long simple moving averages
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub sma_short: f64,
    pub sma_long: f64,
}

/// Price history of one ticker, ascending by date
#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub ticker: String,
    pub currency: Option<String>,
    pub rows: Vec<IndicatorRow>,
}

impl PriceHistory {
    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.bar.date).collect()
    }
}
