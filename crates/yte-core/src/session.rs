//! Editing session over one folder of YAML files.
//!
//! The session owns the flat item list (a read-through cache of the files on
//! disk), the configuration and the find/replace cursor. Every write re-reads
//! and re-parses its target file first, checks that the addressed value still
//! holds the cached text, mutates the fresh tree and only then writes the file.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::backup::zip_backup_folder;
use crate::codec::{self, Document};
use crate::config::Config;
use crate::error::{Result, YteError};
use crate::model::{FlatItem, Row};
use crate::path;
use crate::scan::{ScanReport, scan_folder};
use crate::search::{self, Cursor, Match, Matcher};

#[derive(Debug, Default)]
struct SearchState {
    term: String,
    case_sensitive: bool,
    cursor: Cursor,
    current: Option<Match>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaceAllReport {
    pub replacements: usize,
    pub items: usize,
    pub files: usize,
    pub backup: Option<PathBuf>,
}

impl core::fmt::Display for ReplaceAllReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.replacements == 0 {
            return write!(f, "Nothing to replace; no value would change.");
        }
        write!(
            f,
            "Replaced {} instance(s) across {} file(s).",
            self.replacements, self.files
        )
    }
}

#[derive(Debug, Default)]
pub struct Session {
    config: Config,
    folder: Option<PathBuf>,
    items: Vec<FlatItem>,
    search: SearchState,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn items(&self) -> &[FlatItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Result<&FlatItem> {
        self.items
            .get(index)
            .ok_or(YteError::ItemOutOfRange(index))
    }

    pub fn rows(&self) -> Vec<Row<'_>> {
        self.items
            .iter()
            .map(|it| it.row(self.config.preview_chars))
            .collect()
    }

    /// Loads `folder`, replacing the item list and resetting the search.
    pub fn open(&mut self, folder: &Path) -> Result<ScanReport> {
        let (items, report) = scan_folder(folder, &self.config)?;
        self.folder = Some(folder.to_path_buf());
        self.items = items;
        self.search = SearchState::default();
        Ok(report)
    }

    pub fn reload(&mut self) -> Result<ScanReport> {
        let folder = self.folder.clone().ok_or(YteError::NoFolder)?;
        self.open(&folder)
    }

    /// Writes `new_value` for item `index` to its file and updates the cached item.
    pub fn edit(&mut self, index: usize, new_value: &str) -> Result<()> {
        let item = self.item(index)?;
        write_back(item, new_value, &self.config)?;
        self.items[index].value = new_value.to_string();
        if self.search.current.is_some_and(|m| m.item == index) {
            self.search.current = None;
        }
        Ok(())
    }

    pub fn current_match(&self) -> Option<Match> {
        self.search.current
    }

    pub fn reset_search(&mut self) {
        self.search = SearchState::default();
    }

    /// Next occurrence of `term` after the cursor, wrapping once.
    /// A changed term or case flag restarts from the first item.
    pub fn find_next(&mut self, term: &str, case_sensitive: bool) -> Result<Option<Match>> {
        let matcher = Matcher::new(term, case_sensitive)?;
        if term != self.search.term || case_sensitive != self.search.case_sensitive {
            self.search = SearchState {
                term: term.to_string(),
                case_sensitive,
                ..Default::default()
            };
        }
        Ok(self.advance(&matcher))
    }

    fn advance(&mut self, matcher: &Matcher) -> Option<Match> {
        let found = search::find_next(&self.items, matcher, self.search.cursor);
        self.search.current = found;
        self.search.cursor = found.map(|m| m.after()).unwrap_or_default();
        found
    }

    /// Replaces the active match, persists it, then searches again from just
    /// after the inserted text. Returns the following match, if any.
    pub fn replace_current(&mut self, replacement: &str) -> Result<Option<Match>> {
        let m = self.search.current.ok_or(YteError::NoActiveMatch)?;
        let matcher = Matcher::new(&self.search.term, self.search.case_sensitive)?;
        let item = self.item(m.item)?;
        if matcher.find_at(&item.value, m.start) != Some((m.start, m.end)) {
            self.search.current = None;
            return Err(YteError::NoActiveMatch);
        }
        let new_value = search::splice(&item.value, m.start, m.end, replacement).ok_or_else(|| {
            YteError::StaleData {
                file: item.source_file.clone(),
                path: item.path.clone(),
            }
        })?;
        self.edit(m.item, &new_value)?;
        self.search.current = None;
        self.search.cursor = Cursor {
            item: m.item,
            offset: m.start + replacement.len(),
        };
        Ok(self.advance(&matcher))
    }

    /// Replaces every occurrence in every item. Each touched file is parsed once
    /// and written once; nothing is written unless every change applied cleanly.
    pub fn replace_all(
        &mut self,
        term: &str,
        replacement: &str,
        case_sensitive: bool,
    ) -> Result<ReplaceAllReport> {
        let matcher = Matcher::new(term, case_sensitive)?;
        let mut report = ReplaceAllReport::default();
        let mut planned: Vec<(usize, String)> = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            let (new_value, n) = search::replace_in(&item.value, &matcher, replacement);
            if n > 0 && new_value != item.value {
                report.replacements += n;
                planned.push((i, new_value));
            }
        }
        if planned.is_empty() {
            return Ok(report);
        }

        let mut docs: Vec<(PathBuf, Document)> = Vec::new();
        let mut slot_of: HashMap<PathBuf, usize> = HashMap::new();
        for (i, new_value) in &planned {
            let item = &self.items[*i];
            let slot = match slot_of.get(&item.source_file) {
                Some(&s) => s,
                None => {
                    docs.push((item.source_file.clone(), codec::load_file(&item.source_file)?));
                    slot_of.insert(item.source_file.clone(), docs.len() - 1);
                    docs.len() - 1
                }
            };
            apply(&mut docs[slot].1, item, new_value, &self.config)?;
        }
        let texts = docs
            .iter()
            .map(|(p, d)| codec::to_text(p, d).map(|t| (p.clone(), t)))
            .collect::<Result<Vec<_>>>()?;

        if self.config.backup_before_replace_all
            && let Some(folder) = &self.folder
        {
            report.backup = Some(zip_backup_folder(folder, &self.config)?);
        }

        codec::write_all_or_nothing(&texts)?;
        for (i, new_value) in planned {
            self.items[i].value = new_value;
            report.items += 1;
        }
        report.files = texts.len();
        self.reset_search();
        tracing::info!(
            replacements = report.replacements,
            files = report.files,
            "replace all finished"
        );
        Ok(report)
    }
}

/// Stale check plus set on an already parsed document.
fn apply(doc: &mut Document, item: &FlatItem, new_value: &str, config: &Config) -> Result<()> {
    if path::get_str(doc, &item.path) != Some(item.value.as_str()) {
        return Err(YteError::StaleData {
            file: item.source_file.clone(),
            path: item.path.clone(),
        });
    }
    if !path::set_str(doc, &item.path, new_value, config.missing_key) {
        return Err(YteError::PathResolution {
            file: item.source_file.clone(),
            path: item.path.clone(),
        });
    }
    Ok(())
}

fn write_back(item: &FlatItem, new_value: &str, config: &Config) -> Result<()> {
    let mut doc = codec::load_file(&item.source_file)?;
    apply(&mut doc, item, new_value, config)?;
    codec::write_file(&item.source_file, &doc)
}
