use std::fs;
use std::path::{Path, PathBuf};

use yte_core::{
    Config, Cursor, Matcher, MissingKey, Session, YteError, codec, extract, find_all, find_next,
    get, get_str, preview, replace_in, set_str,
};

fn parse(text: &str) -> yte_core::Document {
    codec::parse(text).expect("parse")
}

fn paths_and_values(items: &[yte_core::FlatItem]) -> Vec<(&str, &str)> {
    items
        .iter()
        .map(|it| (it.path.as_str(), it.value.as_str()))
        .collect()
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, text).unwrap();
    p
}

const NESTED: &str = r#"
title: Main menu
count: 3
enabled: true
nothing: ~
menu:
  items:
    - label: Start
      hint: Begin a new game
    - label: Quit
      weight: 1.5
    - plain entry
    - [nested, list]
  footer: Bye
tags: [one, 2, three]
"#;

#[test]
fn extract_scenario_paths_in_order() {
    let doc = parse("greeting: Hello\nitems:\n  - World\n  - Moon\n");
    let items = extract(&doc, Path::new("x.yaml"));
    assert_eq!(
        paths_and_values(&items),
        vec![("greeting", "Hello"), ("items[0]", "World"), ("items[1]", "Moon")]
    );
    assert!(items.iter().all(|it| it.file_name() == "x.yaml"));
}

#[test]
fn extract_nested_skips_non_strings() {
    let doc = parse(NESTED);
    let items = extract(&doc, Path::new("menu.yaml"));
    assert_eq!(
        paths_and_values(&items),
        vec![
            ("title", "Main menu"),
            ("menu.items[0].label", "Start"),
            ("menu.items[0].hint", "Begin a new game"),
            ("menu.items[1].label", "Quit"),
            ("menu.items[2]", "plain entry"),
            ("menu.footer", "Bye"),
            ("tags[0]", "one"),
            ("tags[2]", "three"),
        ]
    );
}

#[test]
fn extract_stringifies_non_string_keys() {
    let doc = parse("1: one\ntrue: yes-text\nnested:\n  2: two\n");
    let items = extract(&doc, Path::new("k.yaml"));
    assert_eq!(
        paths_and_values(&items),
        vec![("1", "one"), ("true", "yes-text"), ("nested.2", "two")]
    );
    for it in &items {
        assert_eq!(get_str(&doc, &it.path), Some(it.value.as_str()));
    }
}

#[test]
fn extract_non_mapping_root_yields_nothing() {
    assert!(extract(&parse("- a\n- b\n"), Path::new("l.yaml")).is_empty());
    assert!(extract(&parse("just text"), Path::new("s.yaml")).is_empty());
    assert!(extract(&parse(""), Path::new("e.yaml")).is_empty());
}

#[test]
fn extract_skips_dotted_keys() {
    let doc = parse("a:\n  b: nested\n\"a.b\": flat\n\"x.y\":\n  z: deep\nplain: ok\n");
    let items = extract(&doc, Path::new("d.yaml"));
    assert_eq!(paths_and_values(&items), vec![("a.b", "nested"), ("plain", "ok")]);
    assert_eq!(get_str(&doc, "a.b"), Some("nested"));
}

#[test]
fn get_resolves_every_extracted_path() {
    let doc = parse(NESTED);
    for it in extract(&doc, Path::new("menu.yaml")) {
        assert_eq!(get_str(&doc, &it.path), Some(it.value.as_str()), "{}", it.path);
    }
}

#[test]
fn get_missing_paths_return_none() {
    let doc = parse("greeting: Hello\nitems:\n  - World\n  - Moon\n");
    assert!(get(&doc, "missing.path").is_none());
    assert!(get(&doc, "greeting.deeper").is_none());
    assert!(get(&doc, "items[2]").is_none());
    assert!(get(&doc, "greeting[0]").is_none());
    assert!(get(&doc, "items[x]").is_none());
    assert!(get(&doc, "").is_none());
    assert!(get(&parse("- a"), "a").is_none());
}

#[test]
fn get_prefers_literal_bracket_keys() {
    let doc = parse("\"odd[0]\": literal\nodd: [from-list]\n");
    assert_eq!(get_str(&doc, "odd[0]"), Some("literal"));
}

#[test]
fn set_resolves_parents_like_get() {
    let mut doc = parse("\"odd[0]\":\n  name: literal\nodd:\n  - name: listed\n");
    assert!(set_str(&mut doc, "odd[0].name", "changed", MissingKey::Reject));
    assert_eq!(get_str(&doc, "odd[0].name"), Some("changed"));
    assert_eq!(get(&doc, "odd").and_then(|v| v.as_sequence()).map(|s| s.len()), Some(1));
    assert_eq!(
        get(&doc, "odd").and_then(|v| v[0].get("name")).and_then(|v| v.as_str()),
        Some("listed")
    );
}

#[test]
fn set_indexed_then_serialize_keeps_siblings() {
    let mut doc = parse("greeting: Hello\nitems:\n  - World\n  - Moon\n");
    assert!(set_str(&mut doc, "items[1]", "Sun", MissingKey::Reject));
    let text = codec::serialize(&doc).unwrap();
    let back = parse(&text);
    assert_eq!(get_str(&back, "greeting"), Some("Hello"));
    assert_eq!(get_str(&back, "items[0]"), Some("World"));
    assert_eq!(get_str(&back, "items[1]"), Some("Sun"));
    assert!(text.find("greeting").unwrap() < text.find("items").unwrap());
}

#[test]
fn set_missing_key_policy() {
    let mut doc = parse("menu:\n  title: Old\nlist: [a]\n");
    let before = doc.clone();

    assert!(!set_str(&mut doc, "menu.subtitle", "New", MissingKey::Reject));
    assert_eq!(doc, before);

    assert!(set_str(&mut doc, "menu.subtitle", "New", MissingKey::Create));
    assert_eq!(get_str(&doc, "menu.subtitle"), Some("New"));
    assert_eq!(get_str(&doc, "menu.title"), Some("Old"));

    // parents are never created, and indexes never grow a list
    assert!(!set_str(&mut doc, "absent.key", "x", MissingKey::Create));
    assert!(!set_str(&mut doc, "list[1]", "x", MissingKey::Create));
    assert!(!set_str(&mut doc, "menu.title.deeper", "x", MissingKey::Create));
}

#[test]
fn set_keeps_tags() {
    let mut doc = parse("a: !custom hello\n");
    let items = extract(&doc, Path::new("t.yaml"));
    assert_eq!(paths_and_values(&items), vec![("a", "hello")]);
    assert!(set_str(&mut doc, "a", "bye", MissingKey::Reject));
    assert_eq!(get_str(&doc, "a"), Some("bye"));
    assert!(codec::serialize(&doc).unwrap().contains("!custom"));
}

#[test]
fn search_finds_from_offset_and_wraps_once() {
    let doc = parse("a: needle first\nb: hay\nc: more hay\n");
    let items = extract(&doc, Path::new("s.yaml"));
    let m = Matcher::new("needle", true).unwrap();

    let first = find_next(&items, &m, Cursor::default()).unwrap();
    assert_eq!((first.item, first.start, first.end), (0, 0, 6));

    // nothing after item 0, so the scan wraps back to the same hit
    let again = find_next(&items, &m, first.after()).unwrap();
    assert_eq!(again, first);

    let from_middle = find_next(&items, &m, Cursor { item: 1, offset: 0 }).unwrap();
    assert_eq!(from_middle.item, 0);

    let none = Matcher::new("absent", true).unwrap();
    assert!(find_next(&items, &none, Cursor { item: 2, offset: 3 }).is_none());
}

#[test]
fn search_cycles_through_every_match() {
    let doc = parse("a: needle a needle\nb: hay\nc: needle\n");
    let items = extract(&doc, Path::new("s.yaml"));
    let m = Matcher::new("needle", true).unwrap();
    let mut cursor = Cursor::default();
    let mut seen = Vec::new();
    for _ in 0..4 {
        let hit = find_next(&items, &m, cursor).unwrap();
        seen.push((hit.item, hit.start));
        cursor = hit.after();
    }
    assert_eq!(seen, vec![(0, 0), (0, 9), (2, 0), (0, 0)]);

    // a cursor past the end of its value still wraps to earlier hits
    let hit = find_next(&items, &m, Cursor { item: 2, offset: 99 }).unwrap();
    assert_eq!((hit.item, hit.start), (0, 0));
}

#[test]
fn search_case_sensitivity() {
    let doc = parse("a: Hello World\n");
    let items = extract(&doc, Path::new("s.yaml"));
    let ci = Matcher::new("hello", false).unwrap();
    let cs = Matcher::new("hello", true).unwrap();
    assert!(find_next(&items, &ci, Cursor::default()).is_some());
    assert!(find_next(&items, &cs, Cursor::default()).is_none());
    assert!(matches!(Matcher::new("", true), Err(YteError::EmptySearchTerm)));
}

#[test]
fn search_term_is_literal() {
    let doc = parse("a: 'cost: $5.00 (approx)'\nb: cost 5x00\n");
    let items = extract(&doc, Path::new("s.yaml"));
    let m = Matcher::new("$5.00 (", true).unwrap();
    let hits = find_all(&items, &m);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item, 0);
}

#[test]
fn replace_in_is_non_overlapping() {
    let m = Matcher::new("aa", true).unwrap();
    assert_eq!(replace_in("aaaa", &m, "a"), ("aa".to_string(), 2));
    assert_eq!(replace_in("aaa", &m, "b"), ("ba".to_string(), 1));
    assert_eq!(replace_in("xyz", &m, "b"), ("xyz".to_string(), 0));

    let dollar = Matcher::new("x", true).unwrap();
    assert_eq!(replace_in("axb", &dollar, "$0"), ("a$0b".to_string(), 1));

    let ci = Matcher::new("ab", false).unwrap();
    assert_eq!(replace_in("Ab aB ab", &ci, "-"), ("- - -".to_string(), 3));
}

#[test]
fn preview_flattens_and_truncates() {
    assert_eq!(preview("line one\r\nline two", 100), "line one line two");
    assert_eq!(preview("abcdef", 3), "abc...");
    assert_eq!(preview("abc", 3), "abc");
    assert_eq!(preview("äöüß", 2), "äö...");
}

#[test]
fn symbol_spans_cover_text() {
    let text = "Hi \\n[1]! See <br>\\c[4]you\\{";
    let spans = yte_core::symbols::spans(text);
    let joined: String = spans.iter().map(|s| s.text).collect();
    assert_eq!(joined, text);
    let symbols: Vec<&str> = spans.iter().filter(|s| s.symbol).map(|s| s.text).collect();
    assert_eq!(symbols, vec!["\\n[1]", "<br>", "\\c[4]", "\\{"]);
    assert!(yte_core::symbols::spans("plain").iter().all(|s| !s.symbol));
}

#[test]
fn config_defaults_and_partial_files() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("yte.json");
    assert_eq!(Config::load(&p).unwrap(), Config::default());

    fs::write(&p, r#"{"preview_chars": 10, "missing_key": "create"}"#).unwrap();
    let cfg = Config::load(&p).unwrap();
    assert_eq!(cfg.preview_chars, 10);
    assert_eq!(cfg.missing_key, MissingKey::Create);
    assert_eq!(cfg.extensions, vec!["yaml", "yml"]);

    cfg.save(&p).unwrap();
    assert_eq!(Config::load(&p).unwrap(), cfg);

    fs::write(&p, "{not json").unwrap();
    assert!(matches!(Config::load(&p), Err(YteError::Config(_))));
}

fn sample_folder() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("texts");
    fs::create_dir(&folder).unwrap();
    write(
        &folder,
        "a.yaml",
        "greeting: Hello\nitems:\n  - World\n  - Moon\ncount: 2\n",
    );
    write(&folder, "b.yml", "menu:\n  title: Hello there\n  hint: say hello\n");
    write(&folder, "bad.yaml", "key: [unclosed\n");
    write(&folder, "notes.txt", "greeting: ignored\n");
    (dir, folder)
}

#[test]
fn session_open_skips_bad_files() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    let report = s.open(&folder).unwrap();
    assert_eq!(report.files, 3);
    assert_eq!(report.items, 5);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], YteError::Parse { .. }));
    assert!(report.to_string().starts_with("Loaded 5 text items from 3 YAML files."));

    let rows: Vec<String> = s.rows().iter().map(|r| r.to_string()).collect();
    assert_eq!(rows[0], "a.yaml :: greeting :: Hello");
    assert_eq!(rows[3], "b.yml :: menu.title :: Hello there");
    assert_eq!(s.folder(), Some(folder.as_path()));
}

#[test]
fn session_open_missing_folder_and_reload_without_folder() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = Session::new(Config::default());
    assert!(matches!(s.reload(), Err(YteError::NoFolder)));
    assert!(matches!(
        s.open(&dir.path().join("nope")),
        Err(YteError::Io { .. })
    ));
    assert!(matches!(s.item(0), Err(YteError::ItemOutOfRange(0))));
}

#[test]
fn session_edit_writes_back() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    s.edit(2, "Sun").unwrap();
    assert_eq!(s.items()[2].value, "Sun");

    let doc = codec::load_file(&folder.join("a.yaml")).unwrap();
    assert_eq!(get_str(&doc, "items[1]"), Some("Sun"));
    assert_eq!(get_str(&doc, "greeting"), Some("Hello"));
    assert_eq!(get(&doc, "count").and_then(|v| v.as_u64()), Some(2));

    s.reload().unwrap();
    assert_eq!(s.items()[2].value, "Sun");
}

#[test]
fn session_edit_refuses_stale_values() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    let changed = "greeting: 42\nitems:\n  - World\n";
    fs::write(folder.join("a.yaml"), changed).unwrap();

    assert!(matches!(s.edit(0, "Hi"), Err(YteError::StaleData { .. })));
    assert!(matches!(s.edit(2, "Sun"), Err(YteError::StaleData { .. })));
    assert_eq!(fs::read_to_string(folder.join("a.yaml")).unwrap(), changed);
    assert_eq!(s.items()[0].value, "Hello");

    fs::remove_file(folder.join("a.yaml")).unwrap();
    assert!(matches!(s.edit(1, "x"), Err(YteError::Io { .. })));
}

#[test]
fn session_edit_refuses_when_file_value_differs() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    let changed = "greeting: Hello\nitems:\n  - Earth\n  - Moon\ncount: 2\n";
    fs::write(folder.join("a.yaml"), changed).unwrap();

    assert!(matches!(s.edit(1, "Mars"), Err(YteError::StaleData { .. })));
    assert_eq!(fs::read_to_string(folder.join("a.yaml")).unwrap(), changed);
    assert_eq!(s.items()[1].value, "World");
}

#[test]
fn session_edit_drops_match_on_edited_item() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    let m = s.find_next("World", true).unwrap().unwrap();
    assert_eq!(m.item, 1);

    s.edit(1, "Goodbye friend").unwrap();
    assert!(s.current_match().is_none());
    assert!(matches!(s.replace_current("Moon"), Err(YteError::NoActiveMatch)));
    let doc = codec::load_file(&folder.join("a.yaml")).unwrap();
    assert_eq!(get_str(&doc, "items[0]"), Some("Goodbye friend"));

    // an edit elsewhere keeps the match usable
    let m = s.find_next("Moon", true).unwrap().unwrap();
    assert_eq!(m.item, 2);
    s.edit(0, "Hi").unwrap();
    assert_eq!(s.current_match(), Some(m));
    s.replace_current("Sun").unwrap();
    assert_eq!(s.items()[2].value, "Sun");
}

#[test]
fn session_find_and_replace_current() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    assert!(matches!(s.replace_current("x"), Err(YteError::NoActiveMatch)));

    let m = s.find_next("hello", false).unwrap().unwrap();
    assert_eq!((m.item, m.start, m.end), (0, 0, 5));
    let m = s.find_next("hello", false).unwrap().unwrap();
    assert_eq!((m.item, m.start), (3, 0));

    let next = s.replace_current("Hi").unwrap().unwrap();
    assert_eq!(s.items()[3].value, "Hi there");
    assert_eq!((next.item, next.start), (4, 4));
    let doc = codec::load_file(&folder.join("b.yml")).unwrap();
    assert_eq!(get_str(&doc, "menu.title"), Some("Hi there"));

    // changing the term starts over from the top
    let m = s.find_next("World", true).unwrap().unwrap();
    assert_eq!(m.item, 1);
    assert!(s.find_next("world", true).unwrap().is_none());
    assert!(s.current_match().is_none());
}

#[test]
fn session_replace_all_batches_per_file() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();

    let report = s.replace_all("hello", "Howdy", false).unwrap();
    assert_eq!(report.replacements, 3);
    assert_eq!(report.items, 3);
    assert_eq!(report.files, 2);
    assert!(report.backup.is_none());

    let a = codec::load_file(&folder.join("a.yaml")).unwrap();
    let b = codec::load_file(&folder.join("b.yml")).unwrap();
    assert_eq!(get_str(&a, "greeting"), Some("Howdy"));
    assert_eq!(get_str(&b, "menu.title"), Some("Howdy there"));
    assert_eq!(get_str(&b, "menu.hint"), Some("say Howdy"));
    assert_eq!(s.items()[4].value, "say Howdy");
    assert!(s.current_match().is_none());

    let none = s.replace_all("hello", "x", false).unwrap();
    assert_eq!(none.replacements, 0);
    assert_eq!(none.to_string(), "Nothing to replace; no value would change.");
}

#[test]
fn session_replace_all_with_itself_touches_nothing() {
    let (_dir, folder) = sample_folder();
    let original = "# keep me\ngreeting:   'World'\n";
    write(&folder, "a.yaml", original);
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    let before: Vec<_> = s.items().to_vec();

    let report = s.replace_all("World", "World", true).unwrap();
    assert_eq!(report.replacements, 0);
    assert_eq!(report.items, 0);
    assert_eq!(report.files, 0);
    assert_eq!(report.to_string(), "Nothing to replace; no value would change.");
    assert_eq!(s.items(), before.as_slice());
    assert_eq!(fs::read_to_string(folder.join("a.yaml")).unwrap(), original);
}

#[test]
fn session_replace_all_aborts_without_partial_writes() {
    let (_dir, folder) = sample_folder();
    let mut s = Session::new(Config::default());
    s.open(&folder).unwrap();
    let a_before = fs::read_to_string(folder.join("a.yaml")).unwrap();
    fs::write(folder.join("b.yml"), "menu:\n  other: 1\n").unwrap();

    let err = s.replace_all("hello", "Howdy", false).unwrap_err();
    assert!(matches!(err, YteError::StaleData { .. }));
    assert_eq!(fs::read_to_string(folder.join("a.yaml")).unwrap(), a_before);
    assert_eq!(s.items()[0].value, "Hello");
}

#[test]
fn write_all_or_nothing_stages_before_renaming() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "first.yaml", "k: old\n");
    let missing = dir.path().join("no_such_dir").join("second.yaml");
    let texts = vec![
        (first.clone(), "k: new\n".to_string()),
        (missing.clone(), "k: new\n".to_string()),
    ];

    assert!(matches!(
        codec::write_all_or_nothing(&texts),
        Err(YteError::Io { .. })
    ));
    assert_eq!(fs::read_to_string(&first).unwrap(), "k: old\n");
    assert!(!missing.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

    codec::write_all_or_nothing(&texts[..1]).unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "k: new\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn session_replace_all_backs_up_first() {
    let (dir, folder) = sample_folder();
    let mut cfg = Config::default();
    cfg.backup_before_replace_all = true;
    let mut s = Session::new(cfg);
    s.open(&folder).unwrap();

    let report = s.replace_all("Moon", "Sun", true).unwrap();
    let zip = report.backup.expect("backup path");
    assert!(zip.exists());
    assert_eq!(zip.parent(), Some(dir.path()));
    assert!(
        zip.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("texts_") && n.ends_with(".zip"))
    );
}
