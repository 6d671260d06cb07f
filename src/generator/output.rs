//! Disk writer
//!
//! Writing the in-memory file index to disk is deliberately trivial:
//! create parent directories, then overwrite or skip per the caller flag.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Outcome of writing one generated SDK to disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Write the generated file index under `out_dir`.
///
/// Paths in the index use forward slashes; they are joined onto `out_dir`
/// segment by segment so the result is correct on every platform.
pub fn write_sdk(
    files: &BTreeMap<String, String>,
    out_dir: &Path,
    overwrite: bool,
) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for (relative, text) in files {
        let mut path = out_dir.to_path_buf();
        for segment in relative.split('/') {
            path.push(segment);
        }

        if path.exists() && !overwrite {
            tracing::debug!(path = %path.display(), "skipping existing file");
            summary.skipped += 1;
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        summary.written += 1;
    }

    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        "wrote generated SDK"
    );
    Ok(summary)
}
