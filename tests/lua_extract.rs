use symgraph::extract::{Extractor, FileExtraction};
use symgraph::grammar::GrammarLoader;
use symgraph::model::{FileContent, RelationKind};

fn extract(path: &str, source: &str) -> FileExtraction {
    let loader = GrammarLoader::new();
    Extractor::new(&loader)
        .extract(&FileContent::new(path, source))
        .unwrap()
        .unwrap()
}

#[test]
fn extract_symbols_and_relations() {
    let source = r#"local util = require("util")
local M = {}

function M.greet(name)
  return util.format(name)
end

function M:reset()
  self.count = 0
end

local function helper(x)
  error("bad")
end

function global_fn()
  helper(1)
end

return M
"#;
    let extracted = extract("lua/mod.lua", source);

    let names: Vec<_> = extracted
        .nodes
        .iter()
        .map(|n| (n.kind.as_str(), n.id.as_str()))
        .collect();
    assert!(names.contains(&("method", "lua/mod.lua#M.greet")));
    assert!(names.contains(&("method", "lua/mod.lua#M.reset")));
    assert!(names.contains(&("function", "lua/mod.lua#helper")));
    assert!(names.contains(&("function", "lua/mod.lua#global_fn")));

    let node = |id: &str| extracted.nodes.iter().find(|n| n.id == id).unwrap();
    assert!(node("lua/mod.lua#helper").can_throw);
    assert!(!node("lua/mod.lua#global_fn").can_throw);
    assert_eq!(node("lua/mod.lua#M.greet").start_line, 4);
    assert_eq!(node("lua/mod.lua#M.greet").end_line, 6);

    let relations: Vec<_> = extracted
        .relations
        .iter()
        .map(|r| (r.kind, r.from_id.as_str(), r.to_name.as_str()))
        .collect();
    assert!(relations.contains(&(RelationKind::Imports, "lua/mod.lua", "util")));
    assert!(relations.contains(&(RelationKind::Calls, "lua/mod.lua#M.greet", "format")));
    assert!(relations.contains(&(RelationKind::Calls, "lua/mod.lua#global_fn", "helper")));
}
