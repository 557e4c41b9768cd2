//! Dotted/indexed addressing into a YAML document.
//!
//! A path is a list of segments joined with `.`. A segment may end in one
//! `[n]` index, meaning "element `n` of the sequence stored under the segment's
//! prefix", e.g. `menu.items[2].label`.
//!
//! Every segment is first tried as a literal mapping key, then as an indexed
//! segment, so keys that happen to contain brackets still resolve. Failures are
//! reported as `None`/`false`; nothing here panics on a bad path.
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;

/// What `set` does when the final mapping key does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKey {
    /// Fail the write. Paths come from extraction, so a missing key means the
    /// file changed underneath us.
    #[default]
    Reject,
    /// Insert the key into the parent mapping.
    Create,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub raw: &'a str,
    pub indexed: Option<(&'a str, usize)>,
}

impl<'a> Segment<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Segment {
            raw,
            indexed: split_index(raw),
        }
    }
}

fn split_index(raw: &str) -> Option<(&str, usize)> {
    let body = raw.strip_suffix(']')?;
    let open = body.rfind('[')?;
    let (name, digits) = (&body[..open], &body[open + 1..]);
    if name.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((name, digits.parse().ok()?))
}

pub fn segments(path: &str) -> Vec<Segment<'_>> {
    path.split('.').map(Segment::parse).collect()
}

pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

pub(crate) fn join_indexed(parent: &str, key: &str, index: usize) -> String {
    join(parent, &format!("{}[{}]", key, index))
}

/// Mapping keys as they appear in paths. Non-string keys are stringified.
pub fn key_text(key: &Value) -> Cow<'_, str> {
    match key {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Null => Cow::Borrowed("null"),
        Value::Tagged(t) => key_text(&t.value),
        Value::Sequence(_) | Value::Mapping(_) => Cow::Owned(
            serde_yaml::to_string(key)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        ),
    }
}

pub(crate) fn untag(v: &Value) -> &Value {
    match v {
        Value::Tagged(t) => untag(&t.value),
        other => other,
    }
}

fn untag_mut(v: &mut Value) -> &mut Value {
    match v {
        Value::Tagged(t) => untag_mut(&mut t.value),
        other => other,
    }
}

fn find_key(map: &Mapping, name: &str) -> Option<Value> {
    let direct = Value::String(name.to_string());
    if map.contains_key(&direct) {
        return Some(direct);
    }
    map.keys().find(|k| key_text(k) == name).cloned()
}

fn lookup<'a>(map: &'a Mapping, name: &str) -> Option<&'a Value> {
    find_key(map, name).and_then(|k| map.get(&k))
}

fn step<'a>(node: &'a Value, seg: &Segment<'_>) -> Option<&'a Value> {
    let map = match untag(node) {
        Value::Mapping(m) => m,
        Value::Null
        | Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Sequence(_)
        | Value::Tagged(_) => return None,
    };
    if let Some(v) = lookup(map, seg.raw) {
        return Some(v);
    }
    let (name, idx) = seg.indexed?;
    match untag(lookup(map, name)?) {
        Value::Sequence(seq) => seq.get(idx),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, seg: &Segment<'_>) -> Option<&'a mut Value> {
    let Value::Mapping(map) = untag_mut(node) else {
        return None;
    };
    if let Some(k) = find_key(map, seg.raw) {
        return map.get_mut(&k);
    }
    let (name, idx) = seg.indexed?;
    let k = find_key(map, name)?;
    match untag_mut(map.get_mut(&k)?) {
        Value::Sequence(seq) => seq.get_mut(idx),
        _ => None,
    }
}

pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = root;
    for seg in segments(path) {
        cur = step(cur, &seg)?;
    }
    Some(untag(cur))
}

pub fn get_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    get(root, path).and_then(Value::as_str)
}

/// Writes `value` at `path`. Tags on the replaced node are kept.
/// Returns `false` without modifying `root` when the path does not resolve.
pub fn set(root: &mut Value, path: &str, value: Value, missing: MissingKey) -> bool {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        return false;
    };
    let mut cur = root;
    for seg in parents {
        cur = match step_mut(cur, seg) {
            Some(next) => next,
            None => return false,
        };
    }
    let Value::Mapping(map) = untag_mut(cur) else {
        return false;
    };
    if let Some(k) = find_key(map, last.raw)
        && let Some(slot) = map.get_mut(&k)
    {
        *untag_mut(slot) = value;
        return true;
    }
    if let Some((name, idx)) = last.indexed {
        let slot = find_key(map, name)
            .and_then(|k| map.get_mut(&k))
            .map(untag_mut)
            .and_then(|node| match node {
                Value::Sequence(seq) => seq.get_mut(idx),
                _ => None,
            });
        return match slot {
            Some(slot) => {
                *untag_mut(slot) = value;
                true
            }
            None => false,
        };
    }
    match missing {
        MissingKey::Create => {
            map.insert(Value::String(last.raw.to_string()), value);
            true
        }
        MissingKey::Reject => false,
    }
}

pub fn set_str(root: &mut Value, path: &str, value: &str, missing: MissingKey) -> bool {
    set(root, path, Value::String(value.to_string()), missing)
}
