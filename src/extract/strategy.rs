//! Per-family hooks consulted by the extractor while it turns definition
//! captures into symbols. Every hook has a default; families override only
//! what their grammar needs.

use crate::grammar::LanguageFamily;
use crate::model::{RelationKind, SymbolKind, SymbolNode, Visibility};
use crate::util::{collapse_whitespace, node_text, strip_quotes};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static INTERFACE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^I[A-Z]").unwrap());

pub trait LanguageStrategy: Sync {
    /// Node kinds whose bodies hold locals rather than addressable symbols.
    fn function_scopes(&self) -> &'static [&'static str] {
        &[]
    }

    fn should_skip(&self, _kind: SymbolKind, _node: Node, _source: &str) -> bool {
        false
    }

    fn name_node<'t>(&self, _kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        default_name_node(node)
    }

    fn symbol_name(&self, kind: SymbolKind, node: Node, source: &str) -> Option<String> {
        let name_node = self.name_node(kind, node)?;
        let text = collapse_whitespace(node_text(name_node, source));
        if text.is_empty() { None } else { Some(text) }
    }

    /// Final say on the kind once name and container are known.
    fn refine_kind(
        &self,
        kind: SymbolKind,
        _node: Node,
        _name: &str,
        _source: &str,
        _in_container: bool,
    ) -> SymbolKind {
        kind
    }

    /// Owner declared outside the syntactic nesting: Go receivers,
    /// `Widget::run` definitions, Lua `M.fn` tables.
    fn detached_container(&self, _node: Node, _source: &str) -> Option<String> {
        None
    }

    /// Prefix used to qualify members of a container symbol.
    fn member_prefix(&self, _kind: SymbolKind, _node: Node, name: &str, _source: &str) -> String {
        name.to_string()
    }

    /// Containers of this kind may be split across declarations (Rust impls).
    fn merges_containers(&self, _kind: SymbolKind) -> bool {
        false
    }

    fn infer_visibility(&self, _kind: SymbolKind, _name: &str, _in_container: bool) -> Option<Visibility> {
        None
    }

    /// Language-specific attributes applied after qualifiers.
    fn decorate(&self, _node: Node, _source: &str, _symbol: &mut SymbolNode) {}

    fn import_spec(&self, node: Node, source: &str) -> Option<String> {
        let spec = strip_quotes(node_text(node, source)).trim();
        if spec.is_empty() { None } else { Some(spec.to_string()) }
    }

    fn inheritance_kind(&self, _target: &str) -> RelationKind {
        RelationKind::Inherits
    }
}

pub fn strategy_for(family: LanguageFamily) -> &'static dyn LanguageStrategy {
    match family {
        LanguageFamily::JavaScript => &JavaScriptStrategy,
        LanguageFamily::Python => &PythonStrategy,
        LanguageFamily::Rust => &RustStrategy,
        LanguageFamily::Go => &GoStrategy,
        LanguageFamily::Java => &JavaStrategy,
        LanguageFamily::CFamily => &CFamilyStrategy,
        LanguageFamily::CSharp => &CSharpStrategy,
        LanguageFamily::Ruby => &RubyStrategy,
        LanguageFamily::Php => &PhpStrategy,
        LanguageFamily::Lua => &LuaStrategy,
        LanguageFamily::Markup => &MarkupStrategy,
        LanguageFamily::Style => &StyleStrategy,
    }
}

pub fn default_name_node(node: Node) -> Option<Node> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(name);
    }
    if let Some(declarator) = node.child_by_field_name("declarator") {
        return declarator_name(declarator);
    }
    node.child_by_field_name("property")
}

/// Follows C-style declarator chains (`*name`, `name[4]`, `name(args)`,
/// `Type::name`) down to the identifier being declared.
pub fn declarator_name(mut node: Node) -> Option<Node> {
    loop {
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "destructor_name"
            | "operator_name" | "property_identifier" => return Some(node),
            "qualified_identifier" => node = node.child_by_field_name("name")?,
            _ => {
                if let Some(inner) = node.child_by_field_name("declarator") {
                    node = inner;
                } else if let Some(name) = node.child_by_field_name("name") {
                    node = name;
                } else {
                    let mut cursor = node.walk();
                    return node
                        .named_children(&mut cursor)
                        .find(|child| child.kind() == "identifier");
                }
            }
        }
    }
}

fn has_declarator_kind(mut node: Node, kind: &str) -> bool {
    loop {
        if node.kind() == kind {
            return true;
        }
        match node.child_by_field_name("declarator") {
            Some(inner) => node = inner,
            None => return false,
        }
    }
}

fn first_descendant<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == kind {
            return Some(child);
        }
        if let Some(found) = first_descendant(child, kind) {
            return Some(found);
        }
    }
    None
}

fn value_kind(node: Node) -> Option<&'static str> {
    node.child_by_field_name("value").map(|value| value.kind())
}

fn strip_generics(text: &str) -> &str {
    text.split('<').next().unwrap_or(text).trim()
}

struct JavaScriptStrategy;

impl LanguageStrategy for JavaScriptStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &[
            "function_declaration",
            "generator_function_declaration",
            "function_expression",
            "generator_function",
            "arrow_function",
            "method_definition",
        ]
    }

    fn should_skip(&self, kind: SymbolKind, node: Node, _source: &str) -> bool {
        match kind {
            // an arrow function bound to a name is reported once, as that binding
            SymbolKind::Variable => matches!(
                value_kind(node),
                Some("arrow_function" | "function_expression")
            ),
            SymbolKind::Property => value_kind(node) == Some("arrow_function"),
            // `export default <expr>`: only function and class values declare anything
            SymbolKind::Function
                if node
                    .parent()
                    .is_some_and(|p| p.child_by_field_name("value") == Some(node)) =>
            {
                !matches!(
                    node.kind(),
                    "function_expression" | "arrow_function" | "class" | "generator_function"
                )
            }
            _ => false,
        }
    }

    fn refine_kind(
        &self,
        kind: SymbolKind,
        node: Node,
        name: &str,
        source: &str,
        _in_container: bool,
    ) -> SymbolKind {
        match kind {
            SymbolKind::Function if node.kind() == "class" => SymbolKind::Class,
            SymbolKind::Function if node.kind() == "arrow_function" => SymbolKind::ArrowFunction,
            SymbolKind::Method if name == "constructor" => SymbolKind::Constructor,
            SymbolKind::Variable => {
                let declaration = node.parent().map(|p| node_text(p, source)).unwrap_or("");
                if declaration.trim_start().starts_with("const") {
                    SymbolKind::Constant
                } else {
                    SymbolKind::Variable
                }
            }
            _ => kind,
        }
    }

    fn infer_visibility(&self, _kind: SymbolKind, name: &str, _in_container: bool) -> Option<Visibility> {
        name.starts_with('#').then_some(Visibility::Private)
    }
}

struct PythonStrategy;

impl LanguageStrategy for PythonStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &["function_definition", "lambda"]
    }

    fn name_node<'t>(&self, _kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("name")
            .or_else(|| node.child_by_field_name("left"))
    }

    fn refine_kind(
        &self,
        kind: SymbolKind,
        _node: Node,
        name: &str,
        _source: &str,
        in_container: bool,
    ) -> SymbolKind {
        match kind {
            SymbolKind::Method if in_container && name == "__init__" => SymbolKind::Constructor,
            SymbolKind::Variable
                if name.chars().any(|c| c.is_ascii_uppercase())
                    && !name.chars().any(|c| c.is_ascii_lowercase()) =>
            {
                SymbolKind::Constant
            }
            _ => kind,
        }
    }

    fn infer_visibility(&self, _kind: SymbolKind, name: &str, _in_container: bool) -> Option<Visibility> {
        if name.starts_with("__") && name.ends_with("__") {
            Some(Visibility::Public)
        } else if name.starts_with('_') {
            Some(Visibility::Private)
        } else {
            Some(Visibility::Public)
        }
    }

    fn decorate(&self, node: Node, source: &str, symbol: &mut SymbolNode) {
        let Some(parent) = node.parent() else {
            return;
        };
        if parent.kind() != "decorated_definition" {
            return;
        }
        let mut cursor = parent.walk();
        for decorator in parent.named_children(&mut cursor) {
            if decorator.kind() == "decorator" {
                let text = node_text(decorator, source);
                if text.contains("staticmethod") || text.contains("classmethod") {
                    symbol.is_static = true;
                }
            }
        }
    }
}

struct RustStrategy;

impl LanguageStrategy for RustStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &["function_item", "closure_expression"]
    }

    fn symbol_name(&self, kind: SymbolKind, node: Node, source: &str) -> Option<String> {
        if kind == SymbolKind::Impl {
            let ty = node.child_by_field_name("type")?;
            let ty = collapse_whitespace(node_text(ty, source));
            return Some(match node.child_by_field_name("trait") {
                Some(tr) => format!("impl {} for {}", node_text(tr, source), ty),
                None => format!("impl {ty}"),
            });
        }
        let name = self.name_node(kind, node)?;
        Some(node_text(name, source).to_string())
    }

    fn member_prefix(&self, kind: SymbolKind, node: Node, name: &str, source: &str) -> String {
        if kind == SymbolKind::Impl {
            if let Some(ty) = node.child_by_field_name("type") {
                return strip_generics(node_text(ty, source)).to_string();
            }
        }
        name.to_string()
    }

    fn merges_containers(&self, kind: SymbolKind) -> bool {
        kind == SymbolKind::Impl
    }

    fn infer_visibility(&self, _kind: SymbolKind, _name: &str, _in_container: bool) -> Option<Visibility> {
        Some(Visibility::Private)
    }
}

struct GoStrategy;

impl LanguageStrategy for GoStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &["function_declaration", "method_declaration", "func_literal"]
    }

    fn should_skip(&self, kind: SymbolKind, node: Node, _source: &str) -> bool {
        kind == SymbolKind::TypeAlias
            && node.kind() == "type_spec"
            && node
                .child_by_field_name("type")
                .is_some_and(|ty| matches!(ty.kind(), "struct_type" | "interface_type"))
    }

    fn detached_container(&self, node: Node, source: &str) -> Option<String> {
        if node.kind() != "method_declaration" {
            return None;
        }
        let receiver = node.child_by_field_name("receiver")?;
        let param = first_descendant(receiver, "parameter_declaration")?;
        let mut ty = param.child_by_field_name("type")?;
        while ty.kind() == "pointer_type" || ty.kind() == "generic_type" {
            ty = match ty.child_by_field_name("type") {
                Some(inner) => inner,
                None => ty.named_child(0)?,
            };
        }
        Some(strip_generics(node_text(ty, source)).to_string())
    }

    fn infer_visibility(&self, _kind: SymbolKind, name: &str, _in_container: bool) -> Option<Visibility> {
        let first = name.chars().next()?;
        if first.is_uppercase() {
            Some(Visibility::Public)
        } else {
            Some(Visibility::Private)
        }
    }

    fn decorate(&self, node: Node, source: &str, symbol: &mut SymbolNode) {
        if let Some(result) = node.child_by_field_name("result") {
            if node_text(result, source).contains("error") {
                symbol.can_throw = true;
            }
        }
    }
}

struct JavaStrategy;

impl LanguageStrategy for JavaStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &[
            "method_declaration",
            "constructor_declaration",
            "lambda_expression",
            "static_initializer",
        ]
    }

    fn refine_kind(
        &self,
        kind: SymbolKind,
        node: Node,
        _name: &str,
        source: &str,
        _in_container: bool,
    ) -> SymbolKind {
        if kind != SymbolKind::Field {
            return kind;
        }
        let mut cursor = node.walk();
        let modifiers = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "modifiers")
            .map(|m| node_text(m, source))
            .unwrap_or("");
        if modifiers.contains("static") && modifiers.contains("final") {
            SymbolKind::Constant
        } else {
            kind
        }
    }

    fn infer_visibility(&self, _kind: SymbolKind, _name: &str, _in_container: bool) -> Option<Visibility> {
        Some(Visibility::Default)
    }

    fn import_spec(&self, node: Node, source: &str) -> Option<String> {
        let text = node_text(node, source)
            .trim()
            .trim_start_matches("import")
            .trim_end_matches(';')
            .trim();
        let text = text.strip_prefix("static ").unwrap_or(text);
        let spec: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if spec.is_empty() { None } else { Some(spec) }
    }
}

struct CFamilyStrategy;

impl LanguageStrategy for CFamilyStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &["function_definition", "lambda_expression"]
    }

    fn should_skip(&self, kind: SymbolKind, node: Node, _source: &str) -> bool {
        // anonymous struct members and bitfield padding have no declarator
        kind == SymbolKind::Field && node.child_by_field_name("declarator").is_none()
    }

    fn name_node<'t>(&self, kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        if kind == SymbolKind::Template {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).find(|child| {
                matches!(
                    child.kind(),
                    "class_specifier"
                        | "struct_specifier"
                        | "function_definition"
                        | "declaration"
                        | "alias_declaration"
                        | "concept_definition"
                )
            })?;
            return default_name_node(inner);
        }
        default_name_node(node)
    }

    fn refine_kind(
        &self,
        kind: SymbolKind,
        node: Node,
        _name: &str,
        source: &str,
        _in_container: bool,
    ) -> SymbolKind {
        match kind {
            SymbolKind::Field
                if node
                    .child_by_field_name("declarator")
                    .is_some_and(|d| has_declarator_kind(d, "function_declarator")) =>
            {
                SymbolKind::Method
            }
            SymbolKind::Variable => {
                let mut cursor = node.walk();
                let is_const = node
                    .named_children(&mut cursor)
                    .any(|child| child.kind() == "type_qualifier" && node_text(child, source) == "const");
                if is_const { SymbolKind::Constant } else { kind }
            }
            _ => kind,
        }
    }

    fn detached_container(&self, node: Node, source: &str) -> Option<String> {
        if node.kind() != "function_definition" {
            return None;
        }
        let mut declarator = node.child_by_field_name("declarator")?;
        loop {
            if declarator.kind() == "qualified_identifier" {
                let scope = declarator.child_by_field_name("scope")?;
                return Some(strip_generics(node_text(scope, source)).to_string());
            }
            declarator = declarator.child_by_field_name("declarator")?;
        }
    }
}

struct CSharpStrategy;

impl LanguageStrategy for CSharpStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &[
            "method_declaration",
            "constructor_declaration",
            "local_function_statement",
            "lambda_expression",
            "accessor_declaration",
            "anonymous_method_expression",
        ]
    }

    fn name_node<'t>(&self, kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        if kind == SymbolKind::Field {
            let declarator = first_descendant(node, "variable_declarator")?;
            return declarator.child_by_field_name("name").or_else(|| {
                let mut cursor = declarator.walk();
                declarator
                    .named_children(&mut cursor)
                    .find(|child| child.kind() == "identifier")
            });
        }
        node.child_by_field_name("name")
    }

    fn infer_visibility(&self, _kind: SymbolKind, _name: &str, in_container: bool) -> Option<Visibility> {
        if in_container {
            Some(Visibility::Private)
        } else {
            Some(Visibility::Internal)
        }
    }

    fn inheritance_kind(&self, target: &str) -> RelationKind {
        if INTERFACE_NAME.is_match(target) {
            RelationKind::Implements
        } else {
            RelationKind::Inherits
        }
    }
}

struct RubyStrategy;

impl LanguageStrategy for RubyStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &["method", "singleton_method", "block", "do_block", "lambda"]
    }

    fn name_node<'t>(&self, _kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("name")
            .or_else(|| node.child_by_field_name("left"))
    }

    fn decorate(&self, node: Node, _source: &str, symbol: &mut SymbolNode) {
        if node.kind() == "singleton_method" {
            symbol.is_static = true;
        }
    }
}

struct PhpStrategy;

impl LanguageStrategy for PhpStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &[
            "function_definition",
            "method_declaration",
            "anonymous_function",
            "anonymous_function_creation_expression",
            "arrow_function",
        ]
    }

    fn symbol_name(&self, kind: SymbolKind, node: Node, source: &str) -> Option<String> {
        let name = match kind {
            SymbolKind::Property => first_descendant(node, "variable_name")?,
            SymbolKind::Constant => first_descendant(node, "name")?,
            _ => node.child_by_field_name("name")?,
        };
        let text = node_text(name, source).trim_start_matches('$').trim();
        if text.is_empty() { None } else { Some(text.to_string()) }
    }

    fn infer_visibility(&self, _kind: SymbolKind, _name: &str, in_container: bool) -> Option<Visibility> {
        in_container.then_some(Visibility::Public)
    }
}

struct LuaStrategy;

impl LanguageStrategy for LuaStrategy {
    fn function_scopes(&self) -> &'static [&'static str] {
        &["function_declaration", "function_definition"]
    }

    fn name_node<'t>(&self, _kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        let name = node.child_by_field_name("name")?;
        match name.kind() {
            "dot_index_expression" => name.child_by_field_name("field"),
            "method_index_expression" => name.child_by_field_name("method"),
            _ => Some(name),
        }
    }

    fn detached_container(&self, node: Node, source: &str) -> Option<String> {
        let name = node.child_by_field_name("name")?;
        if matches!(name.kind(), "dot_index_expression" | "method_index_expression") {
            let table = name.child_by_field_name("table")?;
            return Some(node_text(table, source).to_string());
        }
        None
    }
}

struct MarkupStrategy;

impl LanguageStrategy for MarkupStrategy {
    fn name_node<'t>(&self, _kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let tag = node
            .named_children(&mut cursor)
            .find(|child| matches!(child.kind(), "start_tag" | "self_closing_tag"))?;
        let mut cursor = tag.walk();
        tag.named_children(&mut cursor)
            .find(|child| child.kind() == "tag_name")
    }

    fn symbol_name(&self, kind: SymbolKind, node: Node, source: &str) -> Option<String> {
        let tag = self.name_node(kind, node)?;
        Some(node_text(tag, source).to_ascii_lowercase())
    }

    fn decorate(&self, _node: Node, _source: &str, symbol: &mut SymbolNode) {
        symbol.tag_name = Some(symbol.name.clone());
    }
}

struct StyleStrategy;

impl LanguageStrategy for StyleStrategy {
    fn name_node<'t>(&self, _kind: SymbolKind, node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|child| child.kind() == "selectors")
    }

    fn decorate(&self, node: Node, source: &str, symbol: &mut SymbolNode) {
        symbol.selector = Some(symbol.name.clone());
        symbol.style_intents = super::style::rule_intents(node, source);
    }
}
