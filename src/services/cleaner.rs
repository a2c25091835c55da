use crate::constants::ARTIFACT_EXTENSIONS;
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Removes generated artifacts from the output directory.
pub struct Cleaner;

impl Cleaner {
    /// Delete every `.png` and `.html` file directly inside `directory`,
    /// regardless of which run produced it. Returns how many files were removed.
    ///
    /// A missing directory counts as already clean.
    pub fn remove_previous_outputs(directory: &Path) -> Result<usize> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_artifact(&path) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        tracing::debug!("Removed {} previous artifacts from {}", removed, directory.display());
        Ok(removed)
    }
}

fn is_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ARTIFACT_EXTENSIONS
                .iter()
                .any(|artifact| ext.eq_ignore_ascii_case(artifact))
        })
        .unwrap_or(false)
}
