// Linear find/replace over the flat item list.
// Offsets are byte offsets into `FlatItem::value` and always sit on char boundaries.
use regex::{NoExpand, Regex, RegexBuilder};

use crate::error::{Result, YteError};
use crate::model::FlatItem;

/// Literal search term, optionally case-insensitive.
#[derive(Debug, Clone)]
pub struct Matcher {
    re: Regex,
    term: String,
    case_sensitive: bool,
}

impl Matcher {
    pub fn new(term: &str, case_sensitive: bool) -> Result<Self> {
        if term.is_empty() {
            return Err(YteError::EmptySearchTerm);
        }
        let re = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| YteError::InvalidSearchTerm(e.to_string()))?;
        Ok(Self {
            re,
            term: term.to_string(),
            case_sensitive,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// First match in `hay` starting at or after `from`.
    pub fn find_at(&self, hay: &str, from: usize) -> Option<(usize, usize)> {
        if from > hay.len() || !hay.is_char_boundary(from) {
            return None;
        }
        self.re.find_at(hay, from).map(|m| (m.start(), m.end()))
    }

    pub fn count(&self, hay: &str) -> usize {
        self.re.find_iter(hay).count()
    }
}

/// Where the next search starts: item index plus offset inside that item's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub item: usize,
    pub offset: usize,
}

/// A hit: `[start, end)` inside `items[item].value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub item: usize,
    pub start: usize,
    pub end: usize,
}

impl Match {
    /// Cursor positioned right after this match.
    pub fn after(&self) -> Cursor {
        Cursor {
            item: self.item,
            offset: self.end,
        }
    }
}

/// Scans forward from `from` to the end of the list, then wraps once and scans
/// from the top up to (not past) `from`. Returns `None` when nothing matches.
pub fn find_next(items: &[FlatItem], m: &Matcher, from: Cursor) -> Option<Match> {
    for (i, item) in items.iter().enumerate().skip(from.item) {
        let offset = if i == from.item { from.offset } else { 0 };
        if let Some((start, end)) = m.find_at(&item.value, offset) {
            return Some(Match { item: i, start, end });
        }
    }
    if from == Cursor::default() {
        return None;
    }
    for (i, item) in items.iter().enumerate().take(from.item) {
        if let Some((start, end)) = m.find_at(&item.value, 0) {
            return Some(Match { item: i, start, end });
        }
    }
    let item = items.get(from.item)?;
    m.find_at(&item.value, 0)
        .filter(|(start, _)| *start < from.offset)
        .map(|(start, end)| Match {
            item: from.item,
            start,
            end,
        })
}

/// Every non-overlapping match in list order.
pub fn find_all(items: &[FlatItem], m: &Matcher) -> Vec<Match> {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        for hit in m.re.find_iter(&item.value) {
            out.push(Match {
                item: i,
                start: hit.start(),
                end: hit.end(),
            });
        }
    }
    out
}

/// Leftmost-first, non-overlapping global substitution. `replacement` is literal.
pub fn replace_in(value: &str, m: &Matcher, replacement: &str) -> (String, usize) {
    let count = m.count(value);
    if count == 0 {
        return (value.to_string(), 0);
    }
    (
        m.re.replace_all(value, NoExpand(replacement)).into_owned(),
        count,
    )
}

/// Splices `replacement` over `[start, end)`. `None` if the range is not valid for `value`.
pub fn splice(value: &str, start: usize, end: usize, replacement: &str) -> Option<String> {
    let head = value.get(..start)?;
    let tail = value.get(end..)?;
    if start > end {
        return None;
    }
    Some(format!("{}{}{}", head, replacement, tail))
}
