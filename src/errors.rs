use thiserror::Error;
use std::num::ParseIntError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Chart rendering error: {0}")]
    ChartError(String),

    #[error("HTML selector error: {0}")]
    SelectorError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Parse int error: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

// 用于从字符串创建错误
impl From<String> for AnalysisError {
    fn from(s: String) -> Self {
        AnalysisError::Unknown(s)
    }
}

impl From<&str> for AnalysisError {
    fn from(s: &str) -> Self {
        AnalysisError::Unknown(s.to_string())
    }
}

impl From<arrow::error::ArrowError> for AnalysisError {
    fn from(e: arrow::error::ArrowError) -> Self {
        AnalysisError::ArrowError(e.to_string())
    }
}
