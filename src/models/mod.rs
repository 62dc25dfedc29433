pub mod price;
pub mod fundamentals;
pub mod report;
