//! Per-file extraction: parse, run the structural query, and turn captures
//! into symbol nodes plus unresolved relations.
//!
//! Captures are consumed in three passes over one sorted capture list:
//! definitions (outer before inner, so containers exist before their
//! members), qualifiers (attributed to the innermost owning definition), and
//! relations (attributed to the nearest enclosing definition or the file).

pub mod qualifiers;
pub mod strategy;
pub mod style;

pub use strategy::{LanguageStrategy, strategy_for};

use crate::error::ParserError;
use crate::grammar::{
    self, CaptureRole, GrammarLoader, LanguageConfig, LoadedGrammar, QualifierCapture,
    RelationCapture,
};
use crate::model::{
    FileContent, Parameter, RelationKind, SymbolKind, SymbolNode, UnresolvedRelation,
};
use crate::util::{line_count, node_text};
use qualifiers::{Qualifiers, code_snippet, infer_purity, parse_parameters};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor};

/// Everything one file contributes to the graph. Plain data, safe to move
/// between worker threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileExtraction {
    pub path: String,
    pub language: String,
    pub nodes: Vec<SymbolNode>,
    pub relations: Vec<UnresolvedRelation>,
}

pub struct Extractor<'a> {
    loader: &'a GrammarLoader,
}

impl<'a> Extractor<'a> {
    pub fn new(loader: &'a GrammarLoader) -> Self {
        Self { loader }
    }

    /// `Ok(None)` when the file has no registered grammar.
    pub fn extract(&self, file: &FileContent) -> Result<Option<FileExtraction>, ParserError> {
        let Some(config) = grammar::lookup(&file.path) else {
            return Ok(None);
        };
        self.extract_with(file, config).map(Some)
    }

    pub fn extract_with(
        &self,
        file: &FileContent,
        config: &'static LanguageConfig,
    ) -> Result<FileExtraction, ParserError> {
        let (mut parser, grammar) = self.loader.create_parser(config)?;
        let tree = parser
            .parse(&file.content, None)
            .ok_or_else(|| ParserError::Parse {
                language: config.name.to_string(),
                path: file.path.clone(),
            })?;
        let captures = collect_captures(&grammar, tree.root_node(), &file.content);

        let mut pass = FilePass::new(file, config);
        pass.definitions(&captures);
        pass.qualifiers(&captures);
        pass.relations(&captures);
        Ok(pass.finish())
    }
}

struct Capture<'t> {
    role: CaptureRole,
    node: Node<'t>,
}

fn collect_captures<'t>(grammar: &LoadedGrammar, root: Node<'t>, source: &str) -> Vec<Capture<'t>> {
    let mut cursor = QueryCursor::new();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut matches = cursor.matches(&grammar.query, root, source.as_bytes());
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let role = grammar.role(capture.index);
            if role == CaptureRole::Ignored {
                continue;
            }
            if seen.insert((capture.index, capture.node.id())) {
                out.push((capture.index, Capture {
                    role,
                    node: capture.node,
                }));
            }
        }
    }
    out.sort_by_key(|(index, c)| (c.node.start_byte(), Reverse(c.node.end_byte()), *index));
    out.into_iter().map(|(_, capture)| capture).collect()
}

struct Definition<'t> {
    node: Node<'t>,
    symbol: SymbolNode,
    in_container: bool,
    qualifiers: Qualifiers,
}

struct FilePass<'f, 't> {
    file: &'f FileContent,
    config: &'static LanguageConfig,
    strategy: &'static dyn LanguageStrategy,
    defs: Vec<Definition<'t>>,
    by_node: HashMap<usize, usize>,
    ids: HashSet<String>,
    // container syntax node -> prefix for its members
    prefixes: HashMap<usize, String>,
    taken_prefixes: HashMap<String, usize>,
    relations: Vec<UnresolvedRelation>,
}

impl<'f, 't> FilePass<'f, 't> {
    fn new(file: &'f FileContent, config: &'static LanguageConfig) -> Self {
        Self {
            file,
            config,
            strategy: strategy_for(config.family),
            defs: Vec::new(),
            by_node: HashMap::new(),
            ids: HashSet::new(),
            prefixes: HashMap::new(),
            taken_prefixes: HashMap::new(),
            relations: Vec::new(),
        }
    }

    fn source(&self) -> &'f str {
        &self.file.content
    }

    fn is_scope(&self, node: Node) -> bool {
        self.strategy.function_scopes().contains(&node.kind())
    }

    fn is_local(&self, node: Node) -> bool {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if self.is_scope(ancestor) {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    fn enclosing_prefix(&self, node: Node) -> Option<String> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if let Some(prefix) = self.prefixes.get(&ancestor.id()) {
                return Some(prefix.clone());
            }
            current = ancestor.parent();
        }
        None
    }

    /// `template <..> class Box` and similar wrappers already stand for the
    /// declaration they wrap.
    fn wrapped_by_same_symbol(&self, node: Node, name: &str) -> bool {
        node.parent()
            .and_then(|parent| self.by_node.get(&parent.id()))
            .map(|idx| &self.defs[*idx].symbol)
            .is_some_and(|owner| owner.kind == SymbolKind::Template && owner.name == name)
    }

    fn definitions(&mut self, captures: &[Capture<'t>]) {
        let source = self.source();
        for capture in captures {
            let CaptureRole::Definition(kind) = capture.role else {
                continue;
            };
            let node = capture.node;
            if self.by_node.contains_key(&node.id())
                || self.strategy.should_skip(kind, node, source)
                || self.is_local(node)
            {
                continue;
            }

            let name = self
                .strategy
                .symbol_name(kind, node, source)
                .unwrap_or_else(|| "default".to_string());
            if self.wrapped_by_same_symbol(node, &name) {
                continue;
            }
            let prefix = self
                .enclosing_prefix(node)
                .or_else(|| self.strategy.detached_container(node, source));
            let in_container = prefix.is_some();
            let kind = match kind {
                SymbolKind::Function if in_container => SymbolKind::Method,
                SymbolKind::Variable if in_container => SymbolKind::Field,
                SymbolKind::Method if !in_container => SymbolKind::Function,
                other => other,
            };
            let kind = self
                .strategy
                .refine_kind(kind, node, &name, source, in_container);

            let start_line = node.start_position().row as u32 + 1;
            let end_line = node.end_position().row as u32 + 1;
            let mut qualified = match &prefix {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name.clone(),
            };

            let mut member_prefix = None;
            if kind.is_container() || kind == SymbolKind::Template {
                let mut candidate = self.strategy.member_prefix(kind, node, &qualified, source);
                let clash = self
                    .taken_prefixes
                    .get(&candidate)
                    .is_some_and(|owner| *owner != node.id());
                if clash && !self.strategy.merges_containers(kind) {
                    qualified = format!("{qualified}:{start_line}");
                    candidate = format!("{candidate}:{start_line}");
                }
                member_prefix = Some(candidate);
            }

            let id = if kind == SymbolKind::MarkupElement {
                format!("{}#{}:{}", self.file.path, name, start_line)
            } else {
                format!("{}#{}", self.file.path, qualified)
            };
            if !self.ids.insert(id.clone()) {
                // another `impl Foo` block: members still join `Foo`
                if let Some(member_prefix) = member_prefix {
                    if self.strategy.merges_containers(kind) {
                        self.prefixes.insert(node.id(), member_prefix);
                    }
                }
                continue;
            }
            if let Some(member_prefix) = member_prefix {
                self.taken_prefixes
                    .entry(member_prefix.clone())
                    .or_insert(node.id());
                self.prefixes.insert(node.id(), member_prefix);
            }

            let mut symbol = SymbolNode::new(
                id,
                kind,
                name,
                self.file.path.clone(),
                start_line,
                end_line.max(start_line),
            );
            symbol.language = Some(self.config.name.to_string());
            self.by_node.insert(node.id(), self.defs.len());
            self.defs.push(Definition {
                node,
                symbol,
                in_container,
                qualifiers: Qualifiers::default(),
            });
        }
    }

    /// Definition a qualifier belongs to. Qualifiers of local functions and of
    /// parameters are not attributed to the surrounding declaration.
    fn qualifier_owner(&self, node: Node) -> Option<usize> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if let Some(idx) = self.by_node.get(&ancestor.id()) {
                return Some(*idx);
            }
            if ancestor.kind().contains("parameter") {
                return None;
            }
            if self.is_scope(ancestor) {
                // a function bound directly to a declaration shares its qualifiers
                match ancestor.parent() {
                    Some(parent) if self.by_node.contains_key(&parent.id()) => {}
                    _ => return None,
                }
            }
            current = ancestor.parent();
        }
        None
    }

    fn qualifiers(&mut self, captures: &[Capture<'t>]) {
        let source = self.source();
        for capture in captures {
            let CaptureRole::Qualifier(qualifier) = capture.role else {
                continue;
            };
            if qualifier == QualifierCapture::Throw {
                let mut current = capture.node.parent();
                while let Some(ancestor) = current {
                    if let Some(idx) = self.by_node.get(&ancestor.id()) {
                        self.defs[*idx].qualifiers.can_throw = true;
                    }
                    current = ancestor.parent();
                }
                continue;
            }
            let Some(idx) = self.qualifier_owner(capture.node) else {
                continue;
            };
            let text = node_text(capture.node, source);
            let target = &mut self.defs[idx].qualifiers;
            match qualifier {
                QualifierCapture::Visibility => target.set_visibility(text),
                QualifierCapture::Modifiers => target.apply_modifiers(text),
                QualifierCapture::Async => target.is_async = true,
                QualifierCapture::Static => target.is_static = true,
                QualifierCapture::Parameters => target.set_parameters(capture.node, source),
                QualifierCapture::ReturnType => target.set_return_type(text),
                QualifierCapture::Throw => {}
            }
        }
    }

    fn enclosing_symbol(&self, node: Node) -> String {
        let mut current = Some(node);
        while let Some(ancestor) = current {
            if let Some(idx) = self.by_node.get(&ancestor.id()) {
                return self.defs[*idx].symbol.id.clone();
            }
            current = ancestor.parent();
        }
        self.file.path.clone()
    }

    fn push_relation(&mut self, from_id: &str, to_name: &str, kind: RelationKind) {
        let to_name = to_name.trim();
        if to_name.is_empty() {
            return;
        }
        self.relations.push(UnresolvedRelation {
            from_id: from_id.to_string(),
            to_name: to_name.to_string(),
            kind,
        });
    }

    fn relations(&mut self, captures: &[Capture<'t>]) {
        let source = self.source();
        for capture in captures {
            let CaptureRole::Relation(relation) = capture.role else {
                continue;
            };
            let node = capture.node;
            let from = self.enclosing_symbol(node);
            let text = node_text(node, source).trim();
            match relation {
                RelationCapture::Import => {
                    if let Some(spec) = self.strategy.import_spec(node, source) {
                        self.push_relation(&from, &spec, RelationKind::Imports);
                    }
                }
                RelationCapture::Call => self.push_relation(&from, text, RelationKind::Calls),
                RelationCapture::Inherit => {
                    let kind = self.strategy.inheritance_kind(text);
                    self.push_relation(&from, text, kind);
                }
                RelationCapture::Implement => {
                    self.push_relation(&from, text, RelationKind::Implements)
                }
                RelationCapture::Reference => {
                    self.push_relation(&from, text, RelationKind::Reference)
                }
                RelationCapture::MarkupClass => {
                    for class in text.split_whitespace() {
                        self.push_relation(&from, &format!(".{class}"), RelationKind::Reference);
                    }
                }
                RelationCapture::MarkupId => {
                    if !text.is_empty() {
                        self.push_relation(&from, &format!("#{text}"), RelationKind::Reference);
                    }
                }
            }
        }
    }

    fn finish(self) -> FileExtraction {
        let source = self.source();
        let mut nodes = Vec::with_capacity(self.defs.len() + 1);
        nodes.push(SymbolNode::file(
            &self.file.path,
            self.config.name,
            line_count(source),
        ));

        for def in self.defs {
            let Definition {
                node,
                mut symbol,
                in_container,
                qualifiers,
            } = def;
            let has_parameters = qualifiers.parameters.is_some();
            qualifiers.apply_to(&mut symbol);

            if symbol.kind.is_callable() {
                if !has_parameters {
                    symbol.parameters = fallback_parameters(node, source);
                }
                if symbol.return_type.is_none() {
                    symbol.return_type = fallback_return_type(node, source);
                }
            }
            if symbol.visibility.is_none() {
                symbol.visibility =
                    self.strategy
                        .infer_visibility(symbol.kind, &symbol.name, in_container);
            }
            self.strategy.decorate(node, source, &mut symbol);

            let text = node_text(node, source);
            symbol.code_snippet = code_snippet(symbol.kind, text, body_offset(node));
            symbol.is_pure = infer_purity(symbol.kind, symbol.is_async, text);
            nodes.push(symbol);
        }

        FileExtraction {
            path: self.file.path.clone(),
            language: self.config.name.to_string(),
            nodes,
            relations: self.relations,
        }
    }
}

/// Offset of the declaration's body within the declaration's own text.
fn body_offset(node: Node) -> Option<usize> {
    function_target(node)
        .child_by_field_name("body")
        .and_then(|body| body.start_byte().checked_sub(node.start_byte()))
}

fn function_target(node: Node) -> Node {
    node.child_by_field_name("value")
        .filter(|value| value.kind().contains("function"))
        .unwrap_or(node)
}

fn fallback_parameters(node: Node, source: &str) -> Vec<Parameter> {
    let target = function_target(node);
    if let Some(list) = target.child_by_field_name("parameters") {
        return parse_parameters(list, source);
    }
    if let Some(single) = target.child_by_field_name("parameter") {
        return vec![Parameter {
            name: node_text(single, source).to_string(),
            type_name: None,
        }];
    }
    Vec::new()
}

fn fallback_return_type(node: Node, source: &str) -> Option<String> {
    let target = function_target(node);
    ["return_type", "result", "returns"]
        .iter()
        .find_map(|field| target.child_by_field_name(field))
        .and_then(|ty| {
            let mut q = Qualifiers::default();
            q.set_return_type(node_text(ty, source));
            q.return_type
        })
}
