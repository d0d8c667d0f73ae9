use crate::report::selection::SelectionCounts;
use crate::report::{ReportConfig, ReportError};
use std::io::Write;

const GUTTER: usize = 8;

/// Draws one stacked bar per arrival from `config.first_arrival` onwards.
///
/// Bars are scaled so that `total_dim` fills `config.chart_height` rows. A
/// nonzero count never rounds away: it is drawn with at least one cell.
/// Correct selections are drawn with `#`, incorrect ones with `+` on top of
/// them, and empty cells on the row of `true_dim` carry a dashed `-` line.
pub fn render_stacked_bars<W: Write>(
    counts: &[SelectionCounts],
    true_dim: usize,
    total_dim: usize,
    config: &ReportConfig,
    out: &mut W,
) -> Result<(), ReportError> {
    if config.first_arrival >= counts.len() {
        return Err(ReportError::EmptyRange {
            first: config.first_arrival,
            available: counts.len(),
        });
    }
    let window = &counts[config.first_arrival..];

    let full = total_dim.max(1);
    let rows = config.chart_height.clamp(1, full);
    let scale = full as f64 / rows as f64;
    let cells = |value: usize| ((value as f64 / scale).round() as usize).min(rows);
    let reference = cells(true_dim);
    // Nonzero segments keep at least one cell each, as far as the height allows.
    let stack = |c: &SelectionCounts| {
        let correct = if c.correct > 0 { cells(c.correct).max(1) } else { 0 };
        let top = if c.incorrect > 0 {
            cells(c.selected()).max(correct + 1).min(rows)
        } else {
            correct
        };
        (correct, top)
    };

    writeln!(out, "{}", config.title)?;
    for level in (1..=rows).rev() {
        let label = if level == rows {
            total_dim.to_string()
        } else if level == reference {
            true_dim.to_string()
        } else {
            String::new()
        };
        let bars: String = window
            .iter()
            .map(|c| {
                let (correct, top) = stack(c);
                if level <= correct {
                    '#'
                } else if level <= top {
                    '+'
                } else if level == reference {
                    '-'
                } else {
                    ' '
                }
            })
            .collect();
        writeln!(out, "{label:>width$} |{bars}", width = GUTTER - 2)?;
    }
    writeln!(out, "{:>width$} +{}", 0, "-".repeat(window.len()), width = GUTTER - 2)?;

    let first_label = config.first_arrival.to_string();
    let mut axis = format!("{:width$}{first_label}", "", width = GUTTER);
    if window.len() > first_label.len() {
        let last_label = (counts.len() - 1).to_string();
        axis.push_str(&format!(
            "{last_label:>width$}",
            width = window.len() - first_label.len()
        ));
    }
    writeln!(out, "{axis}")?;
    writeln!(
        out,
        "{:width$}# Correct  + Incorrect  - True dim ({true_dim})  x: arrival",
        "",
        width = GUTTER
    )?;
    Ok(())
}
