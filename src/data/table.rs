// ============================================================
// Layer 4 — Feature Table
// ============================================================
// Row-oriented CSV with one row per processed waveform.
// Columns are exactly the schema's scalar keys followed by
// MFCC_1..MFCC_20 (the demographic placeholder never appears),
// plus an optional trailing Label column for training tables.
//
// The header is written from the schema and validated against
// the schema on read-back. A table whose columns drifted from
// the vectorization order fails with SchemaMismatch instead of
// silently feeding misaligned values into the model.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use crate::domain::errors::ScreenError;
use crate::domain::features::{table_columns, FeatureBundle, LABEL_COLUMN};

/// One parsed training row: the raw feature values (pre-padding)
/// and the binary condition label.
#[derive(Debug, Clone)]
pub struct LabeledRow {
    pub values: Vec<f32>,
    pub label: i32,
}

/// Write extracted bundles as a feature table without labels.
/// Used by the batch extraction entry point.
pub fn write_feature_table(path: &Path, bundles: &[FeatureBundle]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let mut f = File::create(path)
        .with_context(|| format!("cannot create feature table '{}'", path.display()))?;

    writeln!(f, "{}", table_columns().join(","))?;
    for bundle in bundles {
        let row: Vec<String> = bundle.values().iter().map(|v| v.to_string()).collect();
        writeln!(f, "{}", row.join(","))?;
    }

    tracing::info!("Wrote {} rows to '{}'", bundles.len(), path.display());
    Ok(())
}

/// Read a feature table back for training.
///
/// If the table carries a trailing Label column it is used; otherwise
/// `assigned_label` must provide the label for every row (the original
/// datasets ship as one pathological table and one control table).
pub fn read_labeled_table(path: &Path, assigned_label: Option<i32>) -> Result<Vec<LabeledRow>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read feature table '{}'", path.display()))?;
    let mut lines = text.lines();

    let header = lines
        .next()
        .ok_or_else(|| ScreenError::schema(format!("'{}' is empty", path.display())))?;
    let columns: Vec<&str> = header.split(',').collect();

    let expected = table_columns();
    let has_label = columns.last().copied() == Some(LABEL_COLUMN);
    let feature_columns = if has_label { &columns[..columns.len() - 1] } else { &columns[..] };

    // Exact header validation: same keys, same order. Anything else is
    // a drift between extraction-time and training-time feature sets.
    if feature_columns.len() != expected.len()
        || feature_columns.iter().zip(&expected).any(|(got, want)| got != want)
    {
        return Err(ScreenError::schema(format!(
            "'{}' columns do not match the feature schema (expected {} feature columns \
             starting with '{}', got {} starting with '{}')",
            path.display(),
            expected.len(),
            expected[0],
            feature_columns.len(),
            feature_columns.first().copied().unwrap_or(""),
        ))
        .into());
    }

    if !has_label && assigned_label.is_none() {
        return Err(ScreenError::schema(format!(
            "'{}' has no Label column and no label was assigned",
            path.display()
        ))
        .into());
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != columns.len() {
            return Err(ScreenError::schema(format!(
                "'{}' row {} has {} fields, header has {}",
                path.display(),
                line_no + 2,
                fields.len(),
                columns.len(),
            ))
            .into());
        }

        let value_count = if has_label { fields.len() - 1 } else { fields.len() };
        let values = fields[..value_count]
            .iter()
            .map(|s| s.trim().parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .with_context(|| {
                format!("'{}' row {}: unparseable feature value", path.display(), line_no + 2)
            })?;

        let label = if has_label {
            fields[value_count]
                .trim()
                .parse::<i32>()
                .with_context(|| {
                    format!("'{}' row {}: unparseable label", path.display(), line_no + 2)
                })?
        } else {
            assigned_label.unwrap_or(0)
        };

        rows.push(LabeledRow { values, label });
    }

    tracing::debug!("Read {} labeled rows from '{}'", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::MFCC_COUNT;

    fn bundle(fill: f32) -> FeatureBundle {
        FeatureBundle {
            gender: "Male".into(),
            duration_s: fill,
            rms_energy: fill,
            zero_crossing_rate: fill,
            spectral_centroid: fill,
            spectral_bandwidth: fill,
            spectral_rolloff: fill,
            pitch_hz: fill,
            mfcc_mean: [fill; MFCC_COUNT],
        }
    }

    #[test]
    fn written_table_reads_back_with_assigned_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.csv");
        write_feature_table(&path, &[bundle(0.25), bundle(0.5)]).unwrap();

        let rows = read_labeled_table(&path, Some(0)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values.len(), 27);
        assert_eq!(rows[0].values[0], 0.25);
        assert!(rows.iter().all(|r| r.label == 0));
    }

    #[test]
    fn label_column_overrides_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        let mut header = table_columns().join(",");
        header.push_str(",Label");
        let row: Vec<String> = (0..27).map(|i| (i as f32).to_string()).collect();
        let content = format!("{header}\n{},1\n", row.join(","));
        fs::write(&path, content).unwrap();

        let rows = read_labeled_table(&path, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, 1);
        assert_eq!(rows[0].values[26], 26.0);
    }

    #[test]
    fn reordered_header_is_a_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drifted.csv");
        let mut cols = table_columns();
        cols.swap(0, 1); // RMS before Duration — same keys, wrong order
        let row: Vec<String> = (0..27).map(|_| "0".to_string()).collect();
        fs::write(&path, format!("{}\n{}\n", cols.join(","), row.join(","))).unwrap();

        let err = read_labeled_table(&path, Some(0)).unwrap_err();
        let screen = err.downcast_ref::<ScreenError>().unwrap();
        assert!(matches!(screen, ScreenError::SchemaMismatch { .. }));
    }

    #[test]
    fn ragged_row_is_a_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, format!("{}\n1.0,2.0\n", table_columns().join(","))).unwrap();

        let err = read_labeled_table(&path, Some(1)).unwrap_err();
        let screen = err.downcast_ref::<ScreenError>().unwrap();
        assert!(matches!(screen, ScreenError::SchemaMismatch { .. }));
    }

    #[test]
    fn unlabeled_table_without_assignment_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nolabel.csv");
        write_feature_table(&path, &[bundle(1.0)]).unwrap();
        assert!(read_labeled_table(&path, None).is_err());
    }
}
