//! # Streaming Observation Input
//!
//! Reads arrivals from a tab-separated file and feeds them to the engine one
//! row at a time, so the file never has to fit in memory.
//!
//! - Strict Schema: the first column must be named `label`; every remaining
//!   column is a feature, in file order. The number of features is fixed by
//!   the header.
//! - User-Centric Errors: failures are assumed to be problems with the input
//!   file and name the offending row and column.

use crate::config::EngineConfig;
use crate::engine::{ArrivalObserver, Observation, OnlineLasso};
use crate::error::LassoError;
use crate::state::LassoState;
use ndarray::Array1;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub const LABEL_COLUMN: &str = "label";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed TSV input: {0}")]
    CsvError(#[from] csv::Error),
    #[error("The first column must be named 'label', but found '{0}'.")]
    LabelColumnMissing(String),
    #[error("The input has a 'label' column but no feature columns.")]
    NoFeatureColumns,
    #[error("Row {row}, column '{column}': '{value}' is not a number.")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Arrival {row} was rejected: {source}")]
    Arrival {
        row: usize,
        #[source]
        source: LassoError,
    },
    #[error("Invalid engine configuration: {0}")]
    Engine(#[from] LassoError),
}

/// Streams a TSV file through a freshly built engine.
pub fn fit_tsv_file<O: ArrivalObserver>(
    path: &Path,
    config: &EngineConfig,
    observer: &mut O,
) -> Result<LassoState, DataError> {
    log::info!("Streaming observations from {}", path.display());
    fit_tsv(File::open(path)?, config, observer)
}

/// Streams TSV rows through an engine sized by the header.
///
/// Rows are numbered from 0, header excluded.
pub fn fit_tsv<R: Read, O: ArrivalObserver>(
    reader: R,
    config: &EngineConfig,
    observer: &mut O,
) -> Result<LassoState, DataError> {
    let mut rows = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let headers = rows.headers()?.clone();
    match headers.get(0) {
        Some(first) if first.trim() == LABEL_COLUMN => {}
        Some(first) => return Err(DataError::LabelColumnMissing(first.to_string())),
        None => return Err(DataError::LabelColumnMissing(String::new())),
    }
    let dimension = headers.len() - 1;
    if dimension == 0 {
        return Err(DataError::NoFeatureColumns);
    }

    let engine = OnlineLasso::with_config(dimension, config)?;
    observer.on_run_start(None);

    let mut state = engine.initial_state();
    let mut record = csv::StringRecord::new();
    let mut features = Array1::<f64>::zeros(dimension);
    let mut row = 0;
    while rows.read_record(&mut record)? {
        let label = parse_field(&record, &headers, row, 0)?;
        for j in 0..dimension {
            features[j] = parse_field(&record, &headers, row, j + 1)?;
        }

        let outcome = engine
            .step(&state, &Observation::new(label, features.view()))
            .map_err(|source| DataError::Arrival { row, source })?;
        observer.on_arrival(row, &outcome);
        state = outcome.state;
        row += 1;
    }

    observer.on_run_finish(&state);
    log::info!(
        "Processed {} arrivals; {} of {} features selected.",
        row,
        state.support().len(),
        dimension
    );
    Ok(state)
}

fn parse_field(
    record: &csv::StringRecord,
    headers: &csv::StringRecord,
    row: usize,
    column: usize,
) -> Result<f64, DataError> {
    let raw = record.get(column).unwrap_or("");
    raw.trim().parse::<f64>().map_err(|_| DataError::NotNumeric {
        row,
        column: headers.get(column).unwrap_or("").to_string(),
        value: raw.to_string(),
    })
}
