// Depth-first flattening of a YAML document into `FlatItem`s.
// Emission order is traversal order and is what the list view and the search
// scan iterate over. Numbers, booleans and nulls are never emitted, nor is
// anything under a key containing `.`.
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::model::FlatItem;
use crate::path::{join, join_indexed, key_text, untag};

pub fn extract(root: &Value, source_file: &Path) -> Vec<FlatItem> {
    let mut out = Vec::new();
    if let Value::Mapping(map) = untag(root) {
        walk_mapping(map, "", source_file, &mut out);
    }
    out
}

fn walk_mapping(map: &Mapping, parent: &str, source_file: &Path, out: &mut Vec<FlatItem>) {
    for (k, v) in map {
        let key = key_text(k);
        // a dotted key would read back as nested segments
        if key.contains('.') {
            continue;
        }
        match untag(v) {
            Value::String(s) => push(out, source_file, join(parent, &key), s),
            Value::Mapping(child) => walk_mapping(child, &join(parent, &key), source_file, out),
            Value::Sequence(seq) => {
                for (i, el) in seq.iter().enumerate() {
                    let p = join_indexed(parent, &key, i);
                    match untag(el) {
                        Value::String(s) => push(out, source_file, p, s),
                        Value::Mapping(child) => walk_mapping(child, &p, source_file, out),
                        // a bare index cannot address a nested sequence
                        Value::Sequence(_)
                        | Value::Null
                        | Value::Bool(_)
                        | Value::Number(_)
                        | Value::Tagged(_) => {}
                    }
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Tagged(_) => {}
        }
    }
}

fn push(out: &mut Vec<FlatItem>, source_file: &Path, path: String, value: &str) {
    out.push(FlatItem {
        source_file: source_file.to_path_buf(),
        path,
        value: value.to_string(),
    });
}
