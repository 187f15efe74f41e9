use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A discovered source file: project-relative `/`-separated path plus its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
}

impl FileContent {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    File,
    Class,
    Function,
    ArrowFunction,
    Method,
    Constructor,
    Interface,
    TypeAlias,
    Enum,
    Namespace,
    Struct,
    Trait,
    Impl,
    Union,
    Template,
    Property,
    Field,
    Variable,
    Constant,
    Static,
    MarkupElement,
    StyleRule,
}

impl SymbolKind {
    /// Maps a query capture prefix (`function` in `function.definition`) to a kind.
    pub fn from_capture(prefix: &str) -> Option<Self> {
        let kind = match prefix {
            "class" => SymbolKind::Class,
            "function" => SymbolKind::Function,
            "arrow_function" => SymbolKind::ArrowFunction,
            "method" => SymbolKind::Method,
            "constructor" => SymbolKind::Constructor,
            "interface" => SymbolKind::Interface,
            "type_alias" => SymbolKind::TypeAlias,
            "enum" => SymbolKind::Enum,
            "namespace" => SymbolKind::Namespace,
            "struct" => SymbolKind::Struct,
            "trait" => SymbolKind::Trait,
            "impl" => SymbolKind::Impl,
            "union" => SymbolKind::Union,
            "template" => SymbolKind::Template,
            "property" => SymbolKind::Property,
            "field" => SymbolKind::Field,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "static" => SymbolKind::Static,
            "element" => SymbolKind::MarkupElement,
            "rule" => SymbolKind::StyleRule,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::File => "file",
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::ArrowFunction => "arrow-function",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Interface => "interface",
            SymbolKind::TypeAlias => "type-alias",
            SymbolKind::Enum => "enum",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Struct => "struct",
            SymbolKind::Trait => "trait",
            SymbolKind::Impl => "impl",
            SymbolKind::Union => "union",
            SymbolKind::Template => "template",
            SymbolKind::Property => "property",
            SymbolKind::Field => "field",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Static => "static",
            SymbolKind::MarkupElement => "markup-element",
            SymbolKind::StyleRule => "style-rule",
        }
    }

    pub fn is_callable(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::ArrowFunction
                | SymbolKind::Method
                | SymbolKind::Constructor
        )
    }

    /// Kinds that own members (`Class.method`).
    pub fn is_container(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Struct
                | SymbolKind::Trait
                | SymbolKind::Impl
                | SymbolKind::Enum
                | SymbolKind::Union
        )
    }

    /// Kinds eligible for the project-wide name fallback during symbol resolution.
    pub fn is_global_fallback(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Function
                | SymbolKind::Interface
                | SymbolKind::Struct
                | SymbolKind::TypeAlias
                | SymbolKind::Enum
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
    Default,
}

impl Visibility {
    /// Parses a visibility keyword (`pub(crate)` counts as internal).
    pub fn from_keyword(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with("pub(") {
            return Some(Visibility::Internal);
        }
        match text {
            "public" | "pub" | "export" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            "internal" => Some(Visibility::Internal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleIntent {
    Appearance,
    Layout,
    Typography,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolNode {
    pub id: String,
    pub kind: SymbolKind,
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub can_throw: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_intents: Vec<StyleIntent>,
}

impl SymbolNode {
    pub fn new(
        id: impl Into<String>,
        kind: SymbolKind,
        name: impl Into<String>,
        file_path: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            file_path: file_path.into(),
            start_line,
            end_line,
            language: None,
            visibility: None,
            is_async: false,
            is_static: false,
            return_type: None,
            parameters: Vec::new(),
            can_throw: false,
            is_pure: None,
            code_snippet: None,
            tag_name: None,
            selector: None,
            style_intents: Vec::new(),
        }
    }

    /// The node standing for a whole file.
    pub fn file(path: &str, language: &str, line_count: u32) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut node = Self::new(path, SymbolKind::File, name, path, 1, line_count.max(1));
        node.language = Some(language.to_string());
        node
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Imports,
    Calls,
    Inherits,
    Implements,
    Reference,
}

impl RelationKind {
    /// Edge kind a resolved relation turns into; references become calls.
    pub fn edge_kind(self) -> EdgeKind {
        match self {
            RelationKind::Imports => EdgeKind::Imports,
            RelationKind::Calls | RelationKind::Reference => EdgeKind::Calls,
            RelationKind::Inherits => EdgeKind::Inherits,
            RelationKind::Implements => EdgeKind::Implements,
        }
    }
}

/// A textual reference found during extraction, not yet linked to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedRelation {
    pub from_id: String,
    pub to_name: String,
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Imports,
    Calls,
    Inherits,
    Implements,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Imports => "imports",
            EdgeKind::Calls => "calls",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Implements => "implements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind,
        }
    }
}

/// Frozen output of assembly. Construction enforces the edge invariants:
/// endpoints exist, no self-loops, no duplicate `(from, to, kind)` triples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    nodes: BTreeMap<String, SymbolNode>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: BTreeMap<String, SymbolNode>, edges: Vec<Edge>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let edges = edges
            .into_iter()
            .filter(|edge| edge.from_id != edge.to_id)
            .filter(|edge| nodes.contains_key(&edge.from_id) && nodes.contains_key(&edge.to_id))
            .filter(|edge| seen.insert(edge.clone()))
            .collect();
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &BTreeMap<String, SymbolNode> {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&SymbolNode> {
        self.nodes.get(id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.from_id == id)
    }

    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.to_id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Order-independent fingerprint of the node and edge sets.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (id, node) in &self.nodes {
            hasher.update(id.as_bytes());
            hasher.update(b"\0");
            hasher.update(node.kind.as_str().as_bytes());
            hasher.update(b"\n");
        }
        let mut edges: Vec<&Edge> = self.edges.iter().collect();
        edges.sort();
        for edge in edges {
            hasher.update(edge.from_id.as_bytes());
            hasher.update(b"\0");
            hasher.update(edge.to_id.as_bytes());
            hasher.update(b"\0");
            hasher.update(edge.kind.as_str().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGraph {
    #[serde(flatten)]
    graph: Graph,
    ranks: BTreeMap<String, f64>,
}

impl RankedGraph {
    /// Attaches ranks; nodes missing from `ranks` get 0 and unknown ids are dropped.
    pub fn new(graph: Graph, mut ranks: BTreeMap<String, f64>) -> Self {
        ranks.retain(|id, _| graph.nodes.contains_key(id));
        for id in graph.nodes.keys() {
            ranks.entry(id.clone()).or_insert(0.0);
        }
        Self { graph, ranks }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &BTreeMap<String, SymbolNode> {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn ranks(&self) -> &BTreeMap<String, f64> {
        &self.ranks
    }

    pub fn rank(&self, id: &str) -> f64 {
        self.ranks.get(id).copied().unwrap_or(0.0)
    }

    /// Highest-ranked nodes first; ties broken by id.
    pub fn top(&self, n: usize) -> Vec<(&SymbolNode, f64)> {
        let mut ranked: Vec<(&SymbolNode, f64)> = self
            .graph
            .nodes
            .values()
            .map(|node| (node, self.rank(&node.id)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
        ranked.truncate(n);
        ranked
    }
}
