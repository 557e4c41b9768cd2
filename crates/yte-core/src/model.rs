use serde::Serialize;
use std::path::{Path, PathBuf};

/// One string leaf pulled out of a YAML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatItem {
    pub source_file: PathBuf,
    /// Dotted/indexed address inside `source_file`, e.g. `a.b[2].c`.
    pub path: String,
    pub value: String,
}

impl FlatItem {
    pub fn file_name(&self) -> &str {
        file_name_of(&self.source_file)
    }

    pub fn row(&self, preview_chars: usize) -> Row<'_> {
        Row {
            file_name: self.file_name(),
            path: &self.path,
            preview: preview(&self.value, preview_chars),
        }
    }
}

/// Render record handed to the display surface, one per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row<'a> {
    pub file_name: &'a str,
    pub path: &'a str,
    pub preview: String,
}

impl core::fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} :: {} :: {}", self.file_name, self.path, self.preview)
    }
}

/// Single-line preview: newlines become spaces, carriage returns are dropped,
/// and anything past `max_chars` is cut and marked with `...`.
pub fn preview(value: &str, max_chars: usize) -> String {
    let flat: String = value
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

pub(crate) fn file_name_of(p: &Path) -> &str {
    p.file_name().and_then(|s| s.to_str()).unwrap_or("file")
}
