//! Static asset copying.

use std::path::Path;

use walkdir::WalkDir;

use crate::BuildError;

/// Extensions copied from the static directory. Everything else is skipped.
pub const ASSET_EXTENSIONS: [&str; 8] = ["css", "js", "txt", "svg", "png", "jpg", "jpeg", "gif"];

/// Whether `path` has an allow-listed asset extension.
#[must_use]
pub fn is_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Copy allow-listed files from `static_dir` into `output_dir`, keeping
/// their relative paths.
///
/// A missing static directory copies nothing.
///
/// # Errors
///
/// Returns [`BuildError`] if the tree cannot be walked or a file cannot be
/// copied.
pub fn copy_static_assets(static_dir: &Path, output_dir: &Path) -> Result<usize, BuildError> {
    if !static_dir.is_dir() {
        tracing::debug!(path = %static_dir.display(), "No static directory, skipping assets");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(static_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_asset(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(static_dir) else {
            continue;
        };
        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BuildError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::copy(entry.path(), &target).map_err(|source| BuildError::Write {
            path: target.clone(),
            source,
        })?;
        copied += 1;
    }

    Ok(copied)
}
