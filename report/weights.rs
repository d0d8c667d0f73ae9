use crate::report::ReportError;
use ndarray::ArrayView1;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct WeightRow {
    feature: usize,
    weight: f64,
}

/// Writes one `feature  weight` row per coordinate, tab-separated, with a
/// header. Zero weights are included so the file always has `P` rows.
pub fn write_weights_tsv<W: Write>(theta: ArrayView1<f64>, writer: W) -> Result<(), ReportError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    for (feature, &weight) in theta.iter().enumerate() {
        out.serialize(WeightRow { feature, weight })?;
    }
    out.flush()?;
    Ok(())
}
