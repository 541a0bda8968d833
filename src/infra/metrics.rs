// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch training metrics to a CSV file so learning
// curves can be inspected after the run.
//
// Output file: {checkpoint_dir}/metrics.csv
//
//   epoch,train_loss,train_acc,val_acc
//   1,0.693211,0.500000,0.500000
//   2,0.641008,0.625000,0.500000
//   ...

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// One epoch's summary, retained for reporting after the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    /// Average binary cross-entropy over all training batches
    pub train_loss: f64,

    /// Fraction of training predictions (sigmoid > 0.5) that matched
    /// the true label, over all examples seen this epoch
    pub train_acc: f64,

    /// Same fraction on the held-out validation split, computed with
    /// no parameter updates
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc, val_acc }
    }
}

/// Appends epoch metrics rows to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so a
    /// resumed run appends to the same log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,train_acc,val_acc")?;
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.train_acc, m.val_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_appended_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().to_str().unwrap()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.6931, 0.5, 0.5)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.6410, 0.625, 0.5)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,train_acc,val_acc");
        assert!(lines[1].starts_with("1,0.693100"));
    }
}
