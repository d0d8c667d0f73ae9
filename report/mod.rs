//! # Reporting
//!
//! Writes fitted weights as TSV. When a ground truth is known, it also
//! compares the estimator's support against it after every arrival and
//! presents the result either as a TSV table or as a text stacked bar chart:
//! correct selections at the bottom of each bar, incorrect ones stacked on
//! top, and a dashed reference line at the true dimension.

pub mod plot;
pub mod selection;
pub mod weights;

pub use plot::render_stacked_bars;
pub use selection::{SelectionCounts, SelectionTrace, write_tsv};
pub use weights::write_weights_tsv;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReportConfig {
    /// First arrival drawn in the chart; earlier arrivals are still tabulated.
    pub first_arrival: usize,
    pub title: String,
    /// Number of text rows the tallest possible bar (all `P` features) spans.
    pub chart_height: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            first_arrival: 0,
            title: "Online lasso feature selection".to_string(),
            chart_height: 20,
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to write TSV report: {0}")]
    CsvError(#[from] csv::Error),
    #[error("The chart starts at arrival {first}, but only {available} arrivals were recorded.")]
    EmptyRange { first: usize, available: usize },
}
