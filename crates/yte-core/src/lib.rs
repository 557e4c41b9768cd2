//! yte-core: extraction, path addressing and find/replace for YAML text editing
//!
//! This crate focuses on a small, well-factored surface:
//! - `extract` flattens every string leaf of a document into a `FlatItem`
//! - `path` resolves dotted/indexed paths (`a.b[2].c`) for get and set
//! - `search` is the linear find/replace scan over the flat list
//! - `session` ties them together with write-back to the originating files
//!
pub mod backup;
pub mod codec;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod path;
pub mod scan;
pub mod search;
pub mod session;
pub mod symbols;

pub use codec::Document;
pub use config::Config;
pub use error::{Result, YteError};
pub use extract::extract;
pub use model::{FlatItem, Row, preview};
pub use path::{MissingKey, get, get_str, set, set_str};
pub use scan::{ScanReport, scan_folder};
pub use search::{Cursor, Match, Matcher, find_all, find_next, replace_in};
pub use session::{ReplaceAllReport, Session};
