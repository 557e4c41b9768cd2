use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::codec;
use crate::config::Config;
use crate::error::{Result, YteError};
use crate::extract::extract;
use crate::model::FlatItem;

/// YAML files directly inside `dir` (no recursion), sorted by name.
pub fn find_yaml_files(dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(YteError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| YteError::io(dir, std::io::Error::other(e.to_string())))?;
        let p = entry.path();
        if entry.file_type().is_file() && config.matches_extension(p) {
            out.push(p.to_path_buf());
        }
    }
    Ok(out)
}

/// Outcome of loading a folder. Files that failed are listed, not fatal.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: usize,
    pub items: usize,
    pub failures: Vec<YteError>,
}

impl core::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.files == 0 {
            return write!(f, "No YAML files found");
        }
        write!(
            f,
            "Loaded {} text items from {} YAML files.",
            self.items, self.files
        )?;
        if let Some(last) = self.failures.last() {
            write!(f, " {} file(s) skipped; last error: {}", self.failures.len(), last)?;
        }
        Ok(())
    }
}

/// Parses every YAML file in `dir` and flattens the string leaves in file order.
pub fn scan_folder(dir: &Path, config: &Config) -> Result<(Vec<FlatItem>, ScanReport)> {
    let files = find_yaml_files(dir, config)?;
    let mut items = Vec::new();
    let mut report = ScanReport {
        files: files.len(),
        ..Default::default()
    };
    for file in &files {
        match codec::load_file(file) {
            Ok(doc) => items.extend(extract(&doc, file)),
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping file");
                report.failures.push(e);
            }
        }
    }
    report.items = items.len();
    tracing::info!(
        folder = %dir.display(),
        files = report.files,
        items = report.items,
        failed = report.failures.len(),
        "scanned folder"
    );
    Ok((items, report))
}
