use crate::engine::{ArrivalObserver, ArrivalOutcome};
use crate::report::ReportError;
use serde::Serialize;
use std::io::Write;

/// How one estimated support lines up with the true support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionCounts {
    /// Selected features that are truly nonzero.
    pub correct: usize,
    /// Selected features that are truly zero.
    pub incorrect: usize,
}

impl SelectionCounts {
    /// `true_support` must be sorted ascending.
    pub fn compare(estimated: &[usize], true_support: &[usize]) -> Self {
        let correct = estimated
            .iter()
            .filter(|&&j| true_support.binary_search(&j).is_ok())
            .count();
        Self {
            correct,
            incorrect: estimated.len() - correct,
        }
    }

    pub fn selected(&self) -> usize {
        self.correct + self.incorrect
    }
}

/// Per-arrival selection counts, filled in as a run streams.
#[derive(Debug, Clone)]
pub struct SelectionTrace {
    true_support: Vec<usize>,
    counts: Vec<SelectionCounts>,
}

impl SelectionTrace {
    pub fn new(mut true_support: Vec<usize>) -> Self {
        true_support.sort_unstable();
        true_support.dedup();
        Self {
            true_support,
            counts: Vec::new(),
        }
    }

    pub fn true_support(&self) -> &[usize] {
        &self.true_support
    }

    pub fn counts(&self) -> &[SelectionCounts] {
        &self.counts
    }

    pub fn record(&mut self, estimated: &[usize]) -> SelectionCounts {
        let counts = SelectionCounts::compare(estimated, &self.true_support);
        self.counts.push(counts);
        counts
    }
}

impl ArrivalObserver for SelectionTrace {
    fn on_run_start(&mut self, total_arrivals: Option<usize>) {
        self.counts.clear();
        self.counts.reserve(total_arrivals.unwrap_or(0));
    }

    fn on_arrival(&mut self, _: usize, outcome: &ArrivalOutcome) {
        self.record(&outcome.state.support());
    }
}

#[derive(Serialize)]
struct SelectionRow {
    arrival: usize,
    correct: usize,
    incorrect: usize,
}

/// Writes `arrival  correct  incorrect` rows, tab-separated, with a header.
pub fn write_tsv<W: Write>(counts: &[SelectionCounts], writer: W) -> Result<(), ReportError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    for (arrival, c) in counts.iter().enumerate() {
        out.serialize(SelectionRow {
            arrival,
            correct: c.correct,
            incorrect: c.incorrect,
        })?;
    }
    out.flush()?;
    Ok(())
}
