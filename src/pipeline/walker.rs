//! Directory walker: deterministic enumeration of work items.
//!
//! The input layout is exactly two levels deep: module directories under the
//! root, PDF files inside each module. The walk is re-done fresh on every
//! run; ordering is lexicographic by module name, then by filename within a
//! module, so that output ordering and resume behaviour do not depend on
//! filesystem iteration order.

use crate::error::IngestError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One discovered input file, with its derived identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Name of the module directory containing the file.
    pub module: String,
    /// Filename without the `.pdf` extension.
    pub stem: String,
    /// Full path to the PDF.
    pub path: PathBuf,
}

impl WorkItem {
    /// The page id used for resume/skip decisions: `<module>_<stem>`.
    ///
    /// This is the sole identity key — it depends only on the path, never on
    /// file content or modification time.
    pub fn page_id(&self) -> String {
        format!("{}_{}", self.module, self.stem)
    }

    /// Human-readable page title derived from the file stem.
    pub fn title(&self) -> String {
        self.stem.replace('_', " ")
    }
}

/// Enumerate every PDF under `root`, ordered by module then filename.
///
/// Returns a fatal error if `root` does not exist or is not a directory —
/// checked before any other work so a misconfigured run produces or
/// modifies no output. Non-directory entries at the module level, non-PDF
/// files, and anything nested deeper than one level inside a module are
/// silently skipped.
pub fn walk(root: &Path) -> Result<Vec<WorkItem>, IngestError> {
    match std::fs::metadata(root) {
        Err(_) => {
            return Err(IngestError::InputDirNotFound {
                path: root.to_path_buf(),
            })
        }
        Ok(meta) if !meta.is_dir() => {
            return Err(IngestError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Ok(_) => {}
    }

    let mut items = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            continue;
        }

        let (Some(module), Some(stem)) = (
            path.parent().and_then(Path::file_name),
            path.file_stem(),
        ) else {
            continue;
        };

        items.push(WorkItem {
            module: module.to_string_lossy().into_owned(),
            stem: stem.to_string_lossy().into_owned(),
            path: path.to_path_buf(),
        });
    }

    debug!("Discovered {} PDF files under {}", items.len(), root.display());
    Ok(items)
}
