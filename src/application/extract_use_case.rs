// ============================================================
// Layer 2 — Extract Use Case
// ============================================================
// Walks a directory tree for .wav files, extracts features from
// each, and writes the feature table. A file that fails
// extraction is logged and skipped — one corrupt recording must
// not abort a batch run.
//
// The walk is recursive and SORTED, so the table's row order is
// reproducible across runs regardless of filesystem enumeration
// order.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::audio::extractor::FeatureExtractor;
use crate::data::table::write_feature_table;
use crate::domain::features::FeatureBundle;

pub struct ExtractUseCase {
    input_dir: String,
    output_table: String,
}

impl ExtractUseCase {
    pub fn new(input_dir: impl Into<String>, output_table: impl Into<String>) -> Self {
        Self { input_dir: input_dir.into(), output_table: output_table.into() }
    }

    pub fn execute(&self) -> Result<usize> {
        let files = collect_wav_files(Path::new(&self.input_dir))?;
        tracing::info!("Found {} .wav files under '{}'", files.len(), self.input_dir);

        let extractor = FeatureExtractor::new();
        let mut bundles: Vec<FeatureBundle> = Vec::with_capacity(files.len());
        let mut skipped = 0usize;

        for path in &files {
            match extractor.extract(path) {
                Ok(bundle) => bundles.push(bundle),
                Err(e) => {
                    tracing::warn!("Skipping '{}': {}", path.display(), e);
                    skipped += 1;
                }
            }
        }

        if bundles.is_empty() {
            tracing::warn!("No usable recordings found — writing an empty table");
        }

        write_feature_table(Path::new(&self.output_table), &bundles)?;
        tracing::info!(
            "Extracted {} recordings ({} skipped) → '{}'",
            bundles.len(),
            skipped,
            self.output_table,
        );
        Ok(bundles.len())
    }
}

/// Recursively collect .wav paths under `dir`, sorted for a
/// deterministic dataset order.
fn collect_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in
        fs::read_dir(dir).with_context(|| format!("cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
        {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn write_sine(path: &Path, freq: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..8000 {
            let v = (2.0 * PI * freq * i as f32 / 16000.0).sin() * 0.4;
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn bad_files_are_skipped_and_good_ones_land_in_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("session1");
        fs::create_dir(&nested).unwrap();

        write_sine(&dir.path().join("a.wav"), 150.0);
        write_sine(&nested.join("b.wav"), 200.0);
        fs::write(dir.path().join("broken.wav"), b"garbage").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let out = dir.path().join("features.csv");
        let count = ExtractUseCase::new(
            dir.path().to_str().unwrap(),
            out.to_str().unwrap(),
        )
        .execute()
        .unwrap();

        assert_eq!(count, 2);
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 3); // header + 2 rows
    }

    #[test]
    fn walk_order_is_sorted_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        write_sine(&dir.path().join("zz.wav"), 100.0);
        write_sine(&dir.path().join("aa.wav"), 100.0);

        let files = collect_wav_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("aa.wav"));
    }
}
