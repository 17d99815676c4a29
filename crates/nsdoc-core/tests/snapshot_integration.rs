//! End-to-end tests: source tree to decoded snapshot

use std::fs;
use std::path::Path;

use nsdoc_core::{
    aggregate, read_snapshot, write_snapshot, MetaValue, ProjectDescriptor, SourceFile,
    StaticLoader,
};

fn write(root: &Path, relative: &str, text: &str) -> SourceFile {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    SourceFile::new(root, path)
}

#[test]
fn test_demo_project_snapshot() {
    let project = tempfile::tempdir().unwrap();
    let src = project.path().join("src");
    let core = write(
        &src,
        "demo/core.clj",
        r#"(ns demo.core)

(defn greet "Greets." [name] (str "Hello, " name))
"#,
    );

    let descriptor = ProjectDescriptor::new("demo", "0.1.0");
    let result = aggregate(&descriptor, &[core], &mut StaticLoader::default());
    assert!(result.failures.is_empty());

    let out = tempfile::tempdir().unwrap();
    let path = write_snapshot(&result.document, out.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "demo-0.1.0.json.gz");

    let decoded = read_snapshot(&path).unwrap();
    assert_eq!(decoded.name.as_deref(), Some("demo"));
    assert_eq!(decoded.version.as_deref(), Some("0.1.0"));
    let records = &decoded.namespaces["demo.core"];
    assert_eq!(records.len(), 1);
    let greet = &records[0];
    assert_eq!(greet.name(), Some("greet"));
    assert_eq!(greet.ns(), Some("demo.core"));
    assert_eq!(greet.doc(), Some("Greets."));
    assert_eq!(greet.arglists(), vec!["[name]"]);
    assert_eq!(greet.get("file"), Some(&MetaValue::Text("demo/core.clj".into())));
    assert_eq!(greet.get("line"), Some(&MetaValue::Int(3)));
}

#[test]
fn test_broken_file_is_skipped() {
    let project = tempfile::tempdir().unwrap();
    let src = project.path();
    let files = vec![
        write(src, "demo/a.clj", "(ns demo.a)\n(defn one [] 1)\n"),
        write(src, "demo/b.clj", "(ns demo.b)\n(defn two [] (unclosed\n"),
        write(src, "demo/c.clj", "(in-ns 'demo.a)\n(defn three [] 3)\n"),
    ];

    let result = aggregate(
        &ProjectDescriptor::new("demo", "0.1.0"),
        &files,
        &mut StaticLoader::default(),
    );
    assert_eq!(result.failures.len(), 2);
    assert_eq!(
        result.document.namespaces.keys().collect::<Vec<_>>(),
        vec!["demo.a"]
    );

    let out = tempfile::tempdir().unwrap();
    let decoded = read_snapshot(&write_snapshot(&result.document, out.path()).unwrap()).unwrap();
    assert_eq!(decoded.namespaces["demo.a"][0].name(), Some("one"));
}

#[test]
fn test_duplicate_namespace_keeps_last_file() {
    let project = tempfile::tempdir().unwrap();
    let src = project.path();
    let files = vec![
        write(src, "demo/old.clj", "(ns demo.core)\n(defn old-fn [] 1)\n"),
        write(src, "demo/new.clj", "(ns demo.core)\n(defn new-fn [] 2)\n"),
    ];

    let result = aggregate(
        &ProjectDescriptor::new("demo", "0.1.0"),
        &files,
        &mut StaticLoader::default(),
    );
    let names: Vec<_> = result.document.namespaces["demo.core"]
        .iter()
        .filter_map(|r| r.name())
        .collect();
    assert_eq!(names, vec!["new-fn"]);
}

#[test]
fn test_protocols_and_tags_in_snapshot() {
    let project = tempfile::tempdir().unwrap();
    let src = project.path();
    let file = write(
        src,
        "demo/shapes.clj",
        r#"(ns demo.shapes)

(defprotocol Shape
  "Things with area."
  (area [s] "Area of s."))

(defn ^String label [s] (str s))

(def ^{:tag nil} untagged 1)

(defn ^{:inline (fn [x] x)} fast [x] x)
"#,
    );

    let result = aggregate(
        &ProjectDescriptor::new("demo", "0.1.0"),
        &[file],
        &mut StaticLoader::default(),
    );
    assert!(result.failures.is_empty());

    let out = tempfile::tempdir().unwrap();
    let decoded = read_snapshot(&write_snapshot(&result.document, out.path()).unwrap()).unwrap();
    let records = &decoded.namespaces["demo.shapes"];
    let find = |name: &str| records.iter().find(|r| r.name() == Some(name)).unwrap();

    let area = find("area");
    assert_eq!(area.doc(), Some("Area of s."));
    assert!(area.get("protocol").is_none());
    assert_eq!(find("label").get("tag"), Some(&MetaValue::Text("String".into())));
    assert!(find("untagged").get("tag").is_none());
    assert!(find("fast").get("inline").is_none());
}
