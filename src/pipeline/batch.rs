use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;

use crate::config::WatermarkOptions;

use super::embed;

/// Outcome of watermarking one file in a batch.
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<()>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Output path for `input` inside `out_dir`: same stem, `.png` extension.
pub fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    out_dir.join(format!("{stem}.png"))
}

/// Watermark every file in `inputs` with the same text and options.
///
/// Files are independent, so they are processed in parallel. A failure on
/// one file is recorded in its [`FileOutcome`] and does not stop the rest.
pub fn embed_files(
    inputs: &[PathBuf],
    out_dir: &Path,
    text: &str,
    opts: &WatermarkOptions,
) -> Result<Vec<FileOutcome>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    info!("watermarking {} files into {}", inputs.len(), out_dir.display());
    let progress = ProgressBar::new(inputs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} images ({eta})")?
            .progress_chars("##-"),
    );

    let outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| {
            let output = output_path(input, out_dir);
            let result = embed::embed_file(input, &output, text, opts);
            if let Err(e) = &result {
                warn!("{}: {:#}", input.display(), e);
            }
            progress.inc(1);
            FileOutcome {
                input: input.clone(),
                output,
                result,
            }
        })
        .collect();

    progress.finish_with_message("batch complete");

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!("{} of {} files watermarked", outcomes.len() - failed, outcomes.len());
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_png_extension() {
        let out = output_path(Path::new("/photos/cat.jpeg"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/cat.png"));
    }

    #[test]
    fn test_missing_inputs_are_reported_not_fatal() {
        let out_dir = std::env::temp_dir().join(format!("dwtmark-batch-{}", std::process::id()));
        let inputs = vec![
            PathBuf::from("/definitely/not/here-1.png"),
            PathBuf::from("/definitely/not/here-2.png"),
        ];
        let outcomes = embed_files(&inputs, &out_dir, "hi", &WatermarkOptions::default()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.is_ok()));
        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
