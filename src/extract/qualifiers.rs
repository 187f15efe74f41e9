//! Symbol attributes derived from qualifier captures and raw declaration text.
//!
//! `is_pure` is a best-effort textual classifier: it flags bodies that touch
//! obvious side channels (member assignment, console/IO, globals, clocks,
//! randomness). It is not an effect analysis and will misclassify code that
//! mutates state through calls it cannot see.

use crate::model::{Parameter, SymbolKind, SymbolNode, Visibility};
use crate::util::{collapse_whitespace, node_text, truncate_str_bytes};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

const SNIPPET_MAX_BYTES: usize = 200;

static IMPURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b(?:this|self)\s*\.\s*[A-Za-z_]\w*\s*(?:[-+*/%|&]?=)(?:[^=]|$)
        | \b(?:console|document|window|localStorage|sessionStorage|process)\s*\.
        | \b(?:print|println|printf|eprintln|puts|echo)\b
        | \bfmt\.(?:Print|Fprint)
        | \b(?:fetch|open|write|writeln|setTimeout|setInterval)\s*\(
        | \b(?:global|nonlocal)\s+\w
        | \bstatic\s+mut\b
        | \bMath\.random\b | \brandom\.\w | \bDate\.now\b | \bnew\s+Date\b
        | \b(?:fs|os|sys|io)\.\w
        | \bstd::(?:fs|io|env|process)::
        ",
    )
    .unwrap()
});

/// Attributes collected from `qualifier.*` captures for one symbol.
#[derive(Debug, Default)]
pub struct Qualifiers {
    pub visibility: Option<Visibility>,
    pub is_async: bool,
    pub is_static: bool,
    pub parameters: Option<Vec<Parameter>>,
    pub return_type: Option<String>,
    pub can_throw: bool,
}

impl Qualifiers {
    pub fn set_visibility(&mut self, text: &str) {
        if self.visibility.is_none() {
            self.visibility = Visibility::from_keyword(text);
        }
    }

    /// Scans a modifier list (`public static async`, `pub(crate)`, `const unsafe`).
    pub fn apply_modifiers(&mut self, text: &str) {
        if text.trim_start().starts_with("pub") {
            self.set_visibility(text.split_whitespace().next().unwrap_or(text));
        }
        for word in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
            match word {
                "async" => self.is_async = true,
                "static" => self.is_static = true,
                "public" | "private" | "protected" | "internal" => self.set_visibility(word),
                _ => {}
            }
        }
    }

    pub fn set_parameters(&mut self, list: Node, source: &str) {
        if self.parameters.is_none() {
            self.parameters = Some(parse_parameters(list, source));
        }
    }

    pub fn set_return_type(&mut self, text: &str) {
        if self.return_type.is_none() {
            let cleaned = clean_type(text);
            if !cleaned.is_empty() {
                self.return_type = Some(cleaned);
            }
        }
    }

    pub fn apply_to(self, symbol: &mut SymbolNode) {
        symbol.visibility = self.visibility;
        symbol.is_async |= self.is_async;
        symbol.is_static |= self.is_static;
        symbol.can_throw |= self.can_throw;
        if let Some(parameters) = self.parameters {
            symbol.parameters = parameters;
        }
        symbol.return_type = self.return_type;
    }
}

fn clean_type(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("->").unwrap_or(text);
    let text = text.strip_prefix(':').unwrap_or(text);
    collapse_whitespace(text)
}

/// Parses a parameter-list node into `(name, type)` pairs. Destructured
/// object patterns contribute one untyped entry per bound property.
pub fn parse_parameters(list: Node, source: &str) -> Vec<Parameter> {
    let mut out = Vec::new();
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        collect_parameter(param, source, &mut out);
    }
    out
}

fn collect_parameter(param: Node, source: &str, out: &mut Vec<Parameter>) {
    if matches!(param.kind(), "comment" | "self_parameter" | "this") {
        return;
    }
    let type_name = param
        .child_by_field_name("type")
        .map(|ty| clean_type(node_text(ty, source)))
        .filter(|ty| !ty.is_empty());

    let mut cursor = param.walk();
    let names: Vec<Node> = param.children_by_field_name("name", &mut cursor).collect();
    if names.len() > 1 {
        for name in names {
            push_parameter(out, node_text(name, source), type_name.clone());
        }
        return;
    }

    let target = names
        .first()
        .copied()
        .or_else(|| param.child_by_field_name("pattern"))
        .or_else(|| param.child_by_field_name("left"))
        .or_else(|| param.child_by_field_name("declarator"))
        .unwrap_or(param);

    if target.kind() == "object_pattern" {
        collect_destructured(target, source, out);
        return;
    }
    let name = parameter_name(target, param, source);
    push_parameter(out, &name, type_name);
}

fn push_parameter(out: &mut Vec<Parameter>, name: &str, type_name: Option<String>) {
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() || name == "self" || name == "this" {
        return;
    }
    out.push(Parameter {
        name: name.to_string(),
        type_name,
    });
}

fn parameter_name(target: Node, param: Node, source: &str) -> String {
    if target != param {
        if let Some(name) = super::strategy::declarator_name(target) {
            return node_text(name, source).to_string();
        }
        return collapse_whitespace(node_text(target, source));
    }
    if target.kind().contains("identifier") || target.kind() == "variable_name" {
        return node_text(target, source).to_string();
    }
    if target.child_by_field_name("type").is_none() && target.named_child_count() == 0 {
        return node_text(target, source).to_string();
    }
    let mut cursor = target.walk();
    let found = target.named_children(&mut cursor).find(|child| {
        matches!(child.kind(), "identifier" | "variable_declarator" | "variable_name")
    });
    match found {
        Some(child) if child.kind() == "variable_declarator" => child
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string())
            .unwrap_or_default(),
        Some(child) => node_text(child, source).to_string(),
        None if target.child_by_field_name("type").is_some() => String::new(),
        None => collapse_whitespace(node_text(target, source)),
    }
}

fn collect_destructured(pattern: Node, source: &str, out: &mut Vec<Parameter>) {
    let mut cursor = pattern.walk();
    for prop in pattern.named_children(&mut cursor) {
        let name = match prop.kind() {
            "shorthand_property_identifier_pattern" | "rest_pattern" => Some(prop),
            "pair_pattern" => prop.child_by_field_name("key"),
            "object_assignment_pattern" => prop.child_by_field_name("left"),
            _ => None,
        };
        if let Some(name) = name {
            push_parameter(out, node_text(name, source), None);
        }
    }
}

/// Signature-like excerpt of a declaration: bodies are dropped, initializers
/// keep only their right-hand side. `body_start` is the offset of the body
/// node within `text`; without one the excerpt ends at the first `{`.
pub fn code_snippet(kind: SymbolKind, text: &str, body_start: Option<usize>) -> Option<String> {
    let excerpt = match kind {
        SymbolKind::ArrowFunction => match text.find("=>") {
            Some(pos) => &text[..pos + 2],
            None => first_line(text),
        },
        SymbolKind::Variable
        | SymbolKind::Constant
        | SymbolKind::Static
        | SymbolKind::Field
        | SymbolKind::Property => match initializer_start(text) {
            Some(pos) => &text[pos..],
            None => first_line(text),
        },
        SymbolKind::StyleRule | SymbolKind::MarkupElement => first_line(text),
        _ => match body_start.and_then(|pos| text.get(..pos)) {
            Some(head) => head,
            None => match text.find('{') {
                Some(pos) => &text[..pos],
                None => first_line(text),
            },
        },
    };
    let excerpt = collapse_whitespace(excerpt);
    let excerpt = excerpt.trim_end_matches(':').trim_end().to_string();
    if excerpt.is_empty() {
        None
    } else {
        Some(truncate_str_bytes(&excerpt, SNIPPET_MAX_BYTES))
    }
}

/// Byte offset just after the first lone `=` (not `==`, `=>`, `<=`, `!=`).
fn initializer_start(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for (idx, byte) in bytes.iter().enumerate() {
        if *byte != b'=' {
            continue;
        }
        let prev = idx.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(idx + 1).copied();
        if matches!(prev, Some(b'=' | b'!' | b'<' | b'>' | b':'))
            || matches!(next, Some(b'=' | b'>'))
        {
            continue;
        }
        return Some(idx + 1);
    }
    None
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

pub fn infer_purity(kind: SymbolKind, is_async: bool, text: &str) -> Option<bool> {
    if !kind.is_callable() {
        return None;
    }
    Some(!is_async && !IMPURE.is_match(text))
}
