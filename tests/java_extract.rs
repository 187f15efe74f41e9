use symgraph::extract::{Extractor, FileExtraction};
use symgraph::grammar::GrammarLoader;
use symgraph::model::{FileContent, RelationKind, Visibility};

fn extract(path: &str, source: &str) -> FileExtraction {
    let loader = GrammarLoader::new();
    Extractor::new(&loader)
        .extract(&FileContent::new(path, source))
        .unwrap()
        .unwrap()
}

#[test]
fn extract_symbols_and_relations() {
    let source = r#"package com.example;

import com.example.util.Helper;
import java.util.*;

public class Service extends Base implements Runnable {
    public static final int LIMIT = 10;
    private String name;

    public Service(String name) {
        this.name = name;
    }

    @Override
    public void run() throws IllegalStateException {
        Helper.assist(name);
    }

    static int count(int a, int b) {
        return a + b;
    }
}

interface Task {
    void execute();
}

enum Level { LOW, HIGH }
"#;
    let path = "src/main/java/com/example/Service.java";
    let extracted = extract(path, source);

    let names: Vec<_> = extracted
        .nodes
        .iter()
        .map(|n| (n.kind.as_str(), n.name.as_str()))
        .collect();
    assert!(names.contains(&("class", "Service")));
    assert!(names.contains(&("constant", "LIMIT")));
    assert!(names.contains(&("field", "name")));
    assert!(names.contains(&("constructor", "Service")));
    assert!(names.contains(&("method", "run")));
    assert!(names.contains(&("method", "count")));
    assert!(names.contains(&("interface", "Task")));
    assert!(names.contains(&("method", "execute")));
    assert!(names.contains(&("enum", "Level")));

    let node = |name: &str| {
        let id = format!("{path}#{name}");
        extracted.nodes.iter().find(|n| n.id == id).unwrap()
    };
    assert_eq!(node("Service").visibility, Some(Visibility::Public));
    assert_eq!(node("Service.name").visibility, Some(Visibility::Private));
    assert_eq!(node("Service.LIMIT").visibility, Some(Visibility::Public));

    let ctor = node("Service.Service");
    assert_eq!(ctor.parameters.len(), 1);
    assert_eq!(ctor.parameters[0].name, "name");
    assert_eq!(ctor.parameters[0].type_name.as_deref(), Some("String"));

    let run = node("Service.run");
    assert!(run.can_throw);
    assert_eq!(run.visibility, Some(Visibility::Public));
    assert_eq!(run.return_type.as_deref(), Some("void"));

    let count = node("Service.count");
    assert!(count.is_static);
    assert_eq!(count.visibility, Some(Visibility::Default));
    assert!(!count.can_throw);
    assert_eq!(node("Task.execute").visibility, Some(Visibility::Default));

    let file = path;
    let relations: Vec<_> = extracted
        .relations
        .iter()
        .map(|r| (r.kind, r.from_id.as_str(), r.to_name.as_str()))
        .collect();
    assert!(relations.contains(&(RelationKind::Imports, file, "com.example.util.Helper")));
    assert!(relations.contains(&(RelationKind::Imports, file, "java.util.*")));
    let service = format!("{path}#Service");
    let run_id = format!("{path}#Service.run");
    assert!(relations.contains(&(RelationKind::Inherits, service.as_str(), "Base")));
    assert!(relations.contains(&(RelationKind::Implements, service.as_str(), "Runnable")));
    assert!(relations.contains(&(RelationKind::Calls, run_id.as_str(), "assist")));
}
