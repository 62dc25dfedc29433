pub mod base;
pub mod chart;
pub mod statistics;
pub mod yahoo;
