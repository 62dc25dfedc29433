// 公开导出的模块，供二进制程序与测试使用
pub mod models;
pub mod errors;
pub mod config;
pub mod analysis;
pub mod chart;
pub mod report;
pub mod scrapers;
pub mod services;
pub mod data_provider;
pub mod util;

// 重新导出常用类型，方便使用
pub use models::price::{PriceBar, PriceSeries, PriceHistory, IndicatorRow};
pub use models::fundamentals::FundamentalMetrics;
pub use models::report::{AnalysisReport, Trend};
pub use config::Config;
pub use errors::{Result, AnalysisError};
