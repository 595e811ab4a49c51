// ============================================================
// Layer 6 — Metrics History
// ============================================================
// Appends one row per test run to a CSV file so repeated
// evaluations of the same model can be compared later.
//
// Output file: output/<model>/metrics.csv
//
// Example CSV output:
//   timestamp,checkpoint,loss,accuracy,precision,recall,f1,auc
//   2026-10-19T09:12:44,model-1200,0.412300,0.861000,0.861000,0.861000,0.861000,0.902100
//   2026-10-19T09:40:02,model-1500,0.398100,0.870000,0.870000,0.870000,0.870000,
//
// An undefined AUC is written as an empty field.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::ml::metrics::MetricReport;

const HEADER: &str = "timestamp,checkpoint,loss,accuracy,precision,recall,f1,auc";

/// Appends test-run metrics to a CSV file.
pub struct MetricsHistory {
    csv_path: PathBuf,
}

impl MetricsHistory {
    /// Open the history in `dir`, writing the header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }
        Ok(Self { csv_path })
    }

    /// Append one row for a finished run.
    pub fn log(&self, checkpoint: &str, report: &MetricReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let auc = report.auc.map(|a| format!("{a:.6}")).unwrap_or_default();
        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
            checkpoint,
            report.loss,
            report.accuracy,
            report.precision,
            report.recall,
            report.f1,
            auc,
        )?;
        Ok(())
    }
}
