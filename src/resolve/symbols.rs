use super::imports::{KnownFiles, resolve_import};
use crate::grammar;
use crate::model::{Edge, EdgeKind, RelationKind, SymbolKind, SymbolNode, UnresolvedRelation};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Import edges of a run, finalized before any other relation is looked at.
///
/// Only [`ResolvedImports::resolve`] builds one, and [`SymbolResolver::new`]
/// requires one, so symbol lookup cannot start while imports are pending.
#[derive(Debug)]
pub struct ResolvedImports {
    edges: Vec<Edge>,
    by_file: BTreeMap<String, BTreeSet<String>>,
    unresolved: usize,
}

impl ResolvedImports {
    fn empty() -> Self {
        Self {
            edges: Vec::new(),
            by_file: BTreeMap::new(),
            unresolved: 0,
        }
    }

    pub fn resolve<'r>(
        nodes: &BTreeMap<String, SymbolNode>,
        relations: impl IntoIterator<Item = &'r UnresolvedRelation>,
        known: &KnownFiles,
    ) -> Self {
        let mut out = Self::empty();
        for relation in relations {
            if relation.kind != RelationKind::Imports {
                continue;
            }
            let Some(from) = nodes.get(&relation.from_id) else {
                out.unresolved += 1;
                continue;
            };
            let Some(config) = grammar::lookup(&from.file_path) else {
                out.unresolved += 1;
                continue;
            };
            match resolve_import(config.family, &from.file_path, &relation.to_name, known) {
                Some(target) if nodes.contains_key(&target) => {
                    tracing::trace!(from = %from.file_path, spec = %relation.to_name, %target, "import resolved");
                    out.by_file
                        .entry(from.file_path.clone())
                        .or_default()
                        .insert(target.clone());
                    out.edges
                        .push(Edge::new(&relation.from_id, target, EdgeKind::Imports));
                }
                _ => out.unresolved += 1,
            }
        }
        out
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Files `file` imports directly, in path order.
    pub fn imported_by<'a>(&'a self, file: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_file
            .get(file)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Import specs that pointed outside the analysed files.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }
}

/// Name lookup for calls, inheritance and references. Tiers, first hit wins:
/// same file, directly imported files, style selectors, then any
/// class/function/interface/struct/type-alias/enum in the project.
///
/// The last tier can bind a name to an unrelated symbol of the same name in a
/// file with no import relationship; it picks the smallest id for stability.
pub struct SymbolResolver<'g> {
    nodes: &'g BTreeMap<String, SymbolNode>,
    imports: &'g ResolvedImports,
    selectors: HashMap<&'g str, &'g SymbolNode>,
    globals: HashMap<&'g str, &'g SymbolNode>,
}

impl<'g> SymbolResolver<'g> {
    pub fn new(nodes: &'g BTreeMap<String, SymbolNode>, imports: &'g ResolvedImports) -> Self {
        let mut selectors = HashMap::new();
        let mut globals = HashMap::new();
        for node in nodes.values() {
            if node.kind == SymbolKind::StyleRule {
                let selector = node.selector.as_deref().unwrap_or(&node.name);
                for part in selector.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    selectors.entry(part).or_insert(node);
                }
            }
            if node.kind.is_global_fallback() {
                globals.entry(node.name.as_str()).or_insert(node);
            }
        }
        Self {
            nodes,
            imports,
            selectors,
            globals,
        }
    }

    pub fn resolve(&self, name: &str, context_file: &str) -> Option<&'g SymbolNode> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(node) = self.nodes.get(&format!("{context_file}#{name}")) {
            return Some(node);
        }
        for imported in self.imports.imported_by(context_file) {
            if let Some(node) = self.nodes.get(&format!("{imported}#{name}")) {
                return Some(node);
            }
        }
        if let Some(node) = self.selectors.get(name) {
            return Some(*node);
        }
        self.globals.get(name).copied()
    }

    /// Edge for a non-import relation, or `None` when nothing matches.
    pub fn resolve_relation(&self, relation: &UnresolvedRelation) -> Option<Edge> {
        if relation.kind == RelationKind::Imports {
            return None;
        }
        let from = self.nodes.get(&relation.from_id)?;
        let target = self.resolve(&relation.to_name, &from.file_path)?;
        Some(Edge::new(
            &relation.from_id,
            &target.id,
            relation.kind.edge_kind(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: SymbolKind, name: &str) -> SymbolNode {
        let file = id.split('#').next().unwrap_or(id);
        SymbolNode::new(id, kind, name, file, 1, 1)
    }

    fn nodes(list: Vec<SymbolNode>) -> BTreeMap<String, SymbolNode> {
        list.into_iter().map(|n| (n.id.clone(), n)).collect()
    }

    fn relation(from: &str, to: &str, kind: RelationKind) -> UnresolvedRelation {
        UnresolvedRelation {
            from_id: from.to_string(),
            to_name: to.to_string(),
            kind,
        }
    }

    #[test]
    fn tiers_are_tried_in_order() {
        let map = nodes(vec![
            SymbolNode::file("a.ts", "typescript", 3),
            SymbolNode::file("b.ts", "typescript", 3),
            SymbolNode::file("z.ts", "typescript", 3),
            node("a.ts#local", SymbolKind::Function, "local"),
            node("b.ts#shared", SymbolKind::Function, "shared"),
            node("z.ts#shared", SymbolKind::Function, "shared"),
            node("z.ts#onlyHere", SymbolKind::Class, "onlyHere"),
            node("z.ts#notGlobal", SymbolKind::Variable, "notGlobal"),
        ]);
        let known = KnownFiles::new(["a.ts", "b.ts", "z.ts"]);
        let relations = vec![relation("a.ts", "./b", RelationKind::Imports)];
        let imports = ResolvedImports::resolve(&map, &relations, &known);
        assert_eq!(imports.edges().len(), 1);

        let resolver = SymbolResolver::new(&map, &imports);
        assert_eq!(resolver.resolve("local", "a.ts").map(|n| n.id.as_str()), Some("a.ts#local"));
        assert_eq!(resolver.resolve("shared", "a.ts").map(|n| n.id.as_str()), Some("b.ts#shared"));
        assert_eq!(resolver.resolve("onlyHere", "a.ts").map(|n| n.id.as_str()), Some("z.ts#onlyHere"));
        assert_eq!(resolver.resolve("shared", "other.ts").map(|n| n.id.as_str()), Some("b.ts#shared"));
        assert!(resolver.resolve("notGlobal", "a.ts").is_none());
        assert!(resolver.resolve("missing", "a.ts").is_none());
    }

    #[test]
    fn selectors_match_any_part_of_a_list() {
        let mut rule = node("s.css#.btn, .primary", SymbolKind::StyleRule, ".btn, .primary");
        rule.selector = Some(".btn, .primary".to_string());
        let map = nodes(vec![SymbolNode::file("s.css", "css", 1), rule]);
        let imports = ResolvedImports::empty();
        let resolver = SymbolResolver::new(&map, &imports);
        assert_eq!(
            resolver.resolve(".primary", "page.html").map(|n| n.kind),
            Some(SymbolKind::StyleRule)
        );
    }

    #[test]
    fn references_become_calls() {
        let map = nodes(vec![
            SymbolNode::file("a.go", "go", 3),
            node("a.go#Point", SymbolKind::Struct, "Point"),
            node("a.go#main", SymbolKind::Function, "main"),
        ]);
        let imports = ResolvedImports::empty();
        let resolver = SymbolResolver::new(&map, &imports);
        let edge = resolver
            .resolve_relation(&relation("a.go#main", "Point", RelationKind::Reference))
            .unwrap();
        assert_eq!(edge.kind, EdgeKind::Calls);
        assert_eq!(edge.to_id, "a.go#Point");
    }
}
