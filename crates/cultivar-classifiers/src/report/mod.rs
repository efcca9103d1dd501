//! Benchmark report output: CSV file and console table.
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::evaluation::MetricsRow;

pub const REPORT_HEADERS: [&str; 7] = [
    "Classifier",
    "Accuracy",
    "Cross-Validation Mean",
    "Cross-Validation Std",
    "Precision",
    "Recall",
    "F1 Score",
];

fn record(row: &MetricsRow) -> [String; 7] {
    [
        row.classifier.clone(),
        format!("{:.4}", row.accuracy),
        format!("{:.4}", row.cv_mean),
        format!("{:.4}", row.cv_std),
        format!("{:.4}", row.precision),
        format!("{:.4}", row.recall),
        format!("{:.4}", row.f1),
    ]
}

/// Write the metrics table as CSV.
pub fn write_metrics_csv<P: AsRef<Path>>(path: P, rows: &[MetricsRow]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    writer.write_record(REPORT_HEADERS)?;
    for row in rows {
        writer.write_record(record(row))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write report file {}", path.display()))?;
    log::info!("[Cultivar: report] wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Render the metrics table as aligned plain text.
pub fn render_table(rows: &[MetricsRow]) -> String {
    let mut table: Vec<[String; 7]> = Vec::with_capacity(rows.len() + 1);
    table.push(REPORT_HEADERS.map(String::from));
    table.extend(rows.iter().map(record));

    let mut widths = [0usize; 7];
    for row in &table {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in &table {
        for (i, (cell, width)) in row.iter().zip(widths.iter()).enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(cell);
            for _ in cell.len()..*width {
                out.push(' ');
            }
        }
        while out.ends_with(' ') {
            out.pop();
        }
        out.push('\n');
    }
    out
}

/// Write the rendered table to any sink.
pub fn print_table<W: Write>(mut sink: W, rows: &[MetricsRow]) -> anyhow::Result<()> {
    sink.write_all(render_table(rows).as_bytes())
        .context("Failed to write metrics table")?;
    Ok(())
}
