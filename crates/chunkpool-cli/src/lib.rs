//! # chunkpool-cli
//!
//! CLI output, stats presentation, and shell completion.

pub mod completion;
pub mod output;
pub mod presenter;
pub mod ui;

pub use presenter::{JsonPresenter, StatsPresenter, TextPresenter};
