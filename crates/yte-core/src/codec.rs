// YAML parse/serialize pair. Everything else in the crate works on the
// `serde_yaml::Value` tree these produce; mapping key order survives a round trip,
// comments and quoting style do not.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, YteError};

pub type Document = serde_yaml::Value;

pub fn parse(text: &str) -> std::result::Result<Document, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(Document::Null);
    }
    serde_yaml::from_str(text)
}

pub fn serialize(doc: &Document) -> std::result::Result<String, serde_yaml::Error> {
    serde_yaml::to_string(doc)
}

pub fn load_file(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).map_err(|e| YteError::io(path, e))?;
    parse(&text).map_err(|e| YteError::Parse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn to_text(path: &Path, doc: &Document) -> Result<String> {
    serialize(doc).map_err(|e| YteError::Parse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serializes the whole document before touching the file, then replaces it in full.
pub fn write_file(path: &Path, doc: &Document) -> Result<()> {
    let text = to_text(path, doc)?;
    write_all_or_nothing(&[(path.to_path_buf(), text)])?;
    tracing::debug!(file = %path.display(), "wrote document");
    Ok(())
}

/// Stages every text in a temp file next to its target, then renames them over
/// the targets. A failure while staging leaves every target untouched.
pub fn write_all_or_nothing(texts: &[(PathBuf, String)]) -> Result<()> {
    let mut staged = Vec::with_capacity(texts.len());
    for (target, text) in texts {
        staged.push(stage(target, text)?);
    }
    for (tmp, (target, _)) in staged.into_iter().zip(texts) {
        tmp.persist(target).map_err(|e| YteError::io(target, e.error))?;
    }
    Ok(())
}

fn stage(target: &Path, text: &str) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| YteError::io(target, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| YteError::io(target, e))?;
    if let Ok(meta) = fs::metadata(target) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| YteError::io(target, e))?;
    }
    Ok(tmp)
}
