use symgraph::extract::{Extractor, FileExtraction};
use symgraph::grammar::GrammarLoader;
use symgraph::model::{FileContent, RelationKind, StyleIntent};

fn extract(path: &str, source: &str) -> FileExtraction {
    let loader = GrammarLoader::new();
    Extractor::new(&loader)
        .extract(&FileContent::new(path, source))
        .unwrap()
        .unwrap()
}

#[test]
fn rules_carry_selector_and_intents() {
    let source = r#"@import "base.css";

.btn {
  color: red;
}

.layout {
  display: flex;
  font-size: 12px;
}
"#;
    let extracted = extract("site/style.css", source);

    let names: Vec<_> = extracted
        .nodes
        .iter()
        .map(|n| (n.kind.as_str(), n.id.as_str()))
        .collect();
    assert!(names.contains(&("file", "site/style.css")));
    assert!(names.contains(&("style-rule", "site/style.css#.btn")));
    assert!(names.contains(&("style-rule", "site/style.css#.layout")));

    let rule = |id: &str| extracted.nodes.iter().find(|n| n.id == id).unwrap();
    let btn = rule("site/style.css#.btn");
    assert_eq!(btn.selector.as_deref(), Some(".btn"));
    assert_eq!(btn.style_intents, vec![StyleIntent::Appearance]);
    assert_eq!(btn.start_line, 3);
    assert_eq!(btn.end_line, 5);
    assert_eq!(
        rule("site/style.css#.layout").style_intents,
        vec![StyleIntent::Layout, StyleIntent::Typography]
    );

    assert!(extracted.relations.iter().any(|r| r.kind == RelationKind::Imports
        && r.from_id == "site/style.css"
        && r.to_name == "base.css"));
}
