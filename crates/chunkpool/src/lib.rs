//! chunkpool library — application logic for the chunk pool demonstration driver.

pub mod app;
pub mod config;
pub mod errors;
