// src/services/mod.rs

pub mod dividends;
pub mod scoring;
pub mod screener;
pub mod snapshot;
pub mod sync;
pub mod universe;
pub mod yahoo;
