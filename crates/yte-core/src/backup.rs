use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::config::Config;
use crate::error::{Result, YteError};
use crate::scan::find_yaml_files;

/// Zips the YAML files of `dir` into `<dirname>_<timestamp>.zip` next to it.
pub fn zip_backup_folder(dir: &Path, config: &Config) -> Result<PathBuf> {
    let files = find_yaml_files(dir, config)?;
    write_zip(dir, &files).map_err(|e| YteError::Backup(e.to_string()))
}

fn write_zip(dir: &Path, files: &[PathBuf]) -> io::Result<PathBuf> {
    let parent = dir.parent().unwrap_or(Path::new("."));
    let name = dir.file_name().and_then(|s| s.to_str()).unwrap_or("yaml");
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let dest = parent.join(format!("{}_{}.zip", name, ts));

    let file = fs::File::create(&dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    for path in files {
        let Some(entry) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        zip.start_file(entry, options)?;
        zip.write_all(&fs::read(path)?)?;
    }
    zip.finish()?;
    tracing::info!(backup = %dest.display(), files = files.len(), "wrote backup");
    Ok(dest)
}
