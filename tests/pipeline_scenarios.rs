use std::collections::HashSet;
use std::fs;
use std::path::Path;

use symgraph::error::{ConfigurationError, DiscoveryError, PipelineError};
use symgraph::model::{EdgeKind, FileContent, RankedGraph, StyleIntent, SymbolKind};
use symgraph::{Pipeline, RunOptions, analyze_files};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn edges(ranked: &RankedGraph, kind: EdgeKind) -> Vec<(&str, &str)> {
    ranked
        .edges()
        .iter()
        .filter(|edge| edge.kind == kind)
        .map(|edge| (edge.from_id.as_str(), edge.to_id.as_str()))
        .collect()
}

fn assert_graph_invariants(ranked: &RankedGraph) {
    let mut seen = HashSet::new();
    for edge in ranked.edges() {
        assert!(ranked.nodes().contains_key(&edge.from_id), "dangling from {edge:?}");
        assert!(ranked.nodes().contains_key(&edge.to_id), "dangling to {edge:?}");
        assert_ne!(edge.from_id, edge.to_id, "self loop {edge:?}");
        assert!(seen.insert((&edge.from_id, &edge.to_id, edge.kind)), "duplicate {edge:?}");
    }
    for (id, node) in ranked.nodes() {
        assert_eq!(id, &node.id);
        assert!(node.start_line >= 1);
        assert!(node.start_line <= node.end_line, "{id}");
        assert!(ranked.nodes().contains_key(&node.file_path), "{id} has no file node");
        if node.kind != SymbolKind::File {
            assert!(id.starts_with(&format!("{}#", node.file_path)), "{id}");
        }
    }
    assert_eq!(ranked.ranks().len(), ranked.nodes().len());
}

#[test]
fn scenario_a_cross_file_call_through_an_import() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.py", "from b import helper\n\n\ndef run():\n    return helper()\n");
    write(dir.path(), "b.py", "def helper():\n    return 1\n");

    let pipeline = Pipeline::new(RunOptions::new(dir.path())).unwrap();
    let (ranked, stats) = pipeline.run_with_stats().unwrap();

    assert_eq!(edges(&ranked, EdgeKind::Imports), vec![("a.py", "b.py")]);
    assert_eq!(edges(&ranked, EdgeKind::Calls), vec![("a.py#run", "b.py#helper")]);
    assert_eq!(stats.files_seen, 2);
    assert_eq!(stats.files_extracted, 2);
    assert_eq!(stats.relations_dropped, 0);
    assert_graph_invariants(&ranked);

    let total: f64 = ranked.ranks().values().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(ranked.rank("b.py#helper") > ranked.rank("a.py#run"));
}

#[test]
fn scenario_b_markup_class_links_to_imported_style_rule() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "site/index.html",
        "<html>\n<head><link rel=\"stylesheet\" href=\"style.css\"></head>\n<body>\n<div class=\"btn\">Go</div>\n</body>\n</html>\n",
    );
    write(dir.path(), "site/style.css", ".btn { color: red }\n");

    let ranked = Pipeline::new(RunOptions::new(dir.path())).unwrap().run().unwrap();

    let rule = ranked.graph().node("site/style.css#.btn").unwrap();
    assert_eq!(rule.kind, SymbolKind::StyleRule);
    assert_eq!(rule.style_intents, vec![StyleIntent::Appearance]);

    // references are recorded as calls
    let calls = edges(&ranked, EdgeKind::Calls);
    assert!(calls.contains(&("site/index.html#div:4", "site/style.css#.btn")));
    assert!(edges(&ranked, EdgeKind::Imports).contains(&("site/index.html#link:2", "site/style.css")));
    assert_graph_invariants(&ranked);
}

#[test]
fn scenario_c_missing_root_is_a_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(RunOptions::new(dir.path().join("missing"))).unwrap();
    let err = pipeline.run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Discovery(DiscoveryError::RootNotFound(_))
    ));
}

#[test]
fn scenario_d_unknown_ranking_fails_before_reading_files() {
    let mut options = RunOptions::new("/definitely/not/a/real/root");
    options.ranking_strategy = "popularity".to_string();
    let err = Pipeline::new(options).err().unwrap();
    assert_eq!(
        err,
        ConfigurationError::UnknownRankingStrategy("popularity".to_string())
    );

    let mut options = RunOptions::new(".");
    options.max_workers = 0;
    assert_eq!(
        Pipeline::new(options).err().unwrap(),
        ConfigurationError::InvalidMaxWorkers(0)
    );
}

#[test]
fn scenario_e_unsupported_files_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.txt", "def not_code(): pass\n");
    write(dir.path(), "README.md", "# hello\n");
    write(dir.path(), "main.py", "def main():\n    pass\n");

    let (ranked, stats) = Pipeline::new(RunOptions::new(dir.path()))
        .unwrap()
        .run_with_stats()
        .unwrap();
    assert_eq!(stats.files_seen, 1);
    assert!(ranked.nodes().values().all(|node| node.file_path == "main.py"));

    // files handed in directly are skipped the same way
    let options = RunOptions::default().validate().unwrap();
    let files = vec![
        FileContent::new("notes.txt", "def not_code(): pass\n"),
        FileContent::new("main.py", "def main():\n    pass\n"),
    ];
    let ranked = analyze_files(&files, &options).unwrap();
    assert!(ranked.graph().node("notes.txt").is_none());
    assert!(ranked.nodes().values().all(|node| node.file_path != "notes.txt"));
    assert!(ranked.edges().is_empty());
}

#[test]
fn mixed_language_project() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "web/src/app.ts",
        "import { Store } from './store';\n\nexport class App extends Store {\n  start(): void {\n    this.load();\n    render();\n  }\n}\n\nfunction render() {}\n",
    );
    write(
        dir.path(),
        "web/src/store.ts",
        "export class Store {\n  load() {\n    return fetchAll();\n  }\n}\n",
    );
    write(
        dir.path(),
        "server/src/lib.rs",
        "mod db;\n\npub fn serve() {\n    db::connect();\n}\n",
    );
    write(dir.path(), "server/src/db.rs", "pub fn connect() {}\n");
    write(dir.path(), "scripts/util.go", "package scripts\n\nfunc fetchAll() {}\n");
    write(dir.path(), ".gitignore", "build/\n");
    write(dir.path(), "build/out.js", "function generated() {}\n");

    let (ranked, stats) = Pipeline::new(RunOptions::new(dir.path()))
        .unwrap()
        .run_with_stats()
        .unwrap();
    assert_eq!(stats.files_seen, 5);
    assert!(ranked.graph().node("build/out.js").is_none());

    let imports = edges(&ranked, EdgeKind::Imports);
    assert!(imports.contains(&("web/src/app.ts", "web/src/store.ts")));
    assert!(imports.contains(&("server/src/lib.rs#db", "server/src/db.rs")));

    let inherits = edges(&ranked, EdgeKind::Inherits);
    assert_eq!(inherits, vec![("web/src/app.ts#App", "web/src/store.ts#Store")]);

    let calls = edges(&ranked, EdgeKind::Calls);
    assert!(calls.contains(&("web/src/app.ts#App.start", "web/src/app.ts#render")));
    assert!(calls.contains(&("server/src/lib.rs#serve", "server/src/db.rs#connect")));
    // no import path leads there; the project-wide fallback finds it
    assert!(calls.contains(&("web/src/store.ts#Store.load", "scripts/util.go#fetchAll")));
    assert_graph_invariants(&ranked);
}

#[test]
fn include_and_ignore_narrow_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/app.py", "def app():\n    pass\n");
    write(dir.path(), "src/test_app.py", "def test_app():\n    pass\n");
    write(dir.path(), "docs/conf.py", "project = 'x'\n");

    let mut options = RunOptions::new(dir.path());
    options.include = vec!["src/**".to_string()];
    options.ignore = vec!["**/test_*.py".to_string()];
    let ranked = Pipeline::new(options).unwrap().run().unwrap();
    let files: Vec<&str> = ranked
        .nodes()
        .values()
        .filter(|node| node.kind == SymbolKind::File)
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(files, vec!["src/app.py"]);
}

#[test]
fn ranked_graph_serializes_with_ranks() {
    let options = RunOptions::default().validate().unwrap();
    let files = vec![FileContent::new("m.py", "def f():\n    return g()\n\ndef g():\n    return 1\n")];
    let ranked = analyze_files(&files, &options).unwrap();
    let value = serde_json::to_value(&ranked).unwrap();
    assert!(value["nodes"]["m.py#f"].is_object());
    assert_eq!(value["nodes"]["m.py#f"]["kind"], "function");
    assert_eq!(value["edges"][0]["fromId"], "m.py#f");
    assert_eq!(value["edges"][0]["toId"], "m.py#g");
    assert_eq!(value["edges"][0]["kind"], "calls");
    assert!(value["ranks"]["m.py#g"].as_f64().unwrap() > 0.0);
}
