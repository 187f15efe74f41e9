//! Extension → grammar table and the structural queries bound to each grammar.
//!
//! Query captures follow one naming protocol across languages:
//! `<kind>.definition` declares a symbol, `import.source`, `call.target`,
//! `inherit.target`, `implement.target`, `reference.identifier`,
//! `markup.class` and `markup.id` mark relation sites, and `qualifier.*`
//! captures feed symbol attributes. Captures starting with `_` only exist for
//! predicates.

pub mod loader;

pub use loader::{GrammarLoader, LoadedGrammar};

use crate::model::SymbolKind;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Tsx,
    Python,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Lua,
    Html,
    Css,
}

/// Groups languages that share extraction hooks and import rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    CFamily,
    CSharp,
    Ruby,
    Php,
    Lua,
    Markup,
    Style,
}

#[derive(Debug)]
pub struct LanguageConfig {
    pub language: Language,
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub family: LanguageFamily,
    query: &'static str,
}

impl LanguageConfig {
    pub fn grammar(&self) -> tree_sitter::Language {
        match self.language {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
            Language::Lua => tree_sitter_lua::LANGUAGE.into(),
            Language::Html => tree_sitter_html::LANGUAGE.into(),
            Language::Css => tree_sitter_css::LANGUAGE.into(),
        }
    }

    pub fn query_source(&self) -> &'static str {
        self.query
    }
}

static LANGUAGE_CONFIGS: &[LanguageConfig] = &[
    LanguageConfig {
        language: Language::JavaScript,
        name: "javascript",
        extensions: &["js", "jsx", "mjs", "cjs"],
        family: LanguageFamily::JavaScript,
        query: include_str!("../../queries/javascript.scm"),
    },
    LanguageConfig {
        language: Language::TypeScript,
        name: "typescript",
        extensions: &["ts", "mts", "cts"],
        family: LanguageFamily::JavaScript,
        query: include_str!("../../queries/typescript.scm"),
    },
    LanguageConfig {
        language: Language::Tsx,
        name: "tsx",
        extensions: &["tsx"],
        family: LanguageFamily::JavaScript,
        query: include_str!("../../queries/typescript.scm"),
    },
    LanguageConfig {
        language: Language::Python,
        name: "python",
        extensions: &["py", "pyi"],
        family: LanguageFamily::Python,
        query: include_str!("../../queries/python.scm"),
    },
    LanguageConfig {
        language: Language::Rust,
        name: "rust",
        extensions: &["rs"],
        family: LanguageFamily::Rust,
        query: include_str!("../../queries/rust.scm"),
    },
    LanguageConfig {
        language: Language::Go,
        name: "go",
        extensions: &["go"],
        family: LanguageFamily::Go,
        query: include_str!("../../queries/go.scm"),
    },
    LanguageConfig {
        language: Language::Java,
        name: "java",
        extensions: &["java"],
        family: LanguageFamily::Java,
        query: include_str!("../../queries/java.scm"),
    },
    LanguageConfig {
        language: Language::C,
        name: "c",
        extensions: &["c", "h"],
        family: LanguageFamily::CFamily,
        query: include_str!("../../queries/c.scm"),
    },
    LanguageConfig {
        language: Language::Cpp,
        name: "cpp",
        extensions: &["cc", "cpp", "cxx", "hh", "hpp", "hxx"],
        family: LanguageFamily::CFamily,
        query: include_str!("../../queries/cpp.scm"),
    },
    LanguageConfig {
        language: Language::CSharp,
        name: "csharp",
        extensions: &["cs"],
        family: LanguageFamily::CSharp,
        query: include_str!("../../queries/csharp.scm"),
    },
    LanguageConfig {
        language: Language::Ruby,
        name: "ruby",
        extensions: &["rb"],
        family: LanguageFamily::Ruby,
        query: include_str!("../../queries/ruby.scm"),
    },
    LanguageConfig {
        language: Language::Php,
        name: "php",
        extensions: &["php"],
        family: LanguageFamily::Php,
        query: include_str!("../../queries/php.scm"),
    },
    LanguageConfig {
        language: Language::Lua,
        name: "lua",
        extensions: &["lua"],
        family: LanguageFamily::Lua,
        query: include_str!("../../queries/lua.scm"),
    },
    LanguageConfig {
        language: Language::Html,
        name: "html",
        extensions: &["html", "htm"],
        family: LanguageFamily::Markup,
        query: include_str!("../../queries/html.scm"),
    },
    LanguageConfig {
        language: Language::Css,
        name: "css",
        extensions: &["css"],
        family: LanguageFamily::Style,
        query: include_str!("../../queries/css.scm"),
    },
];

pub fn language_configs() -> &'static [LanguageConfig] {
    LANGUAGE_CONFIGS
}

/// Registry entry for a file, or `None` when the extension is unsupported.
pub fn lookup(path: &str) -> Option<&'static LanguageConfig> {
    let ext = Path::new(path).extension().and_then(|ext| ext.to_str())?;
    let ext = ext.to_ascii_lowercase();
    LANGUAGE_CONFIGS
        .iter()
        .find(|config| config.extensions.iter().any(|candidate| *candidate == ext))
}

pub fn by_name(name: &str) -> Option<&'static LanguageConfig> {
    LANGUAGE_CONFIGS.iter().find(|config| config.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationCapture {
    Import,
    Call,
    Inherit,
    Implement,
    Reference,
    MarkupClass,
    MarkupId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierCapture {
    Visibility,
    Modifiers,
    Async,
    Static,
    Parameters,
    ReturnType,
    Throw,
}

/// What a named query capture means to the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRole {
    Definition(SymbolKind),
    Relation(RelationCapture),
    Qualifier(QualifierCapture),
    Ignored,
}

impl CaptureRole {
    pub fn parse(name: &str) -> Self {
        if name.starts_with('_') {
            return CaptureRole::Ignored;
        }
        if let Some(prefix) = name.strip_suffix(".definition") {
            return SymbolKind::from_capture(prefix)
                .map(CaptureRole::Definition)
                .unwrap_or(CaptureRole::Ignored);
        }
        match name {
            "import.source" => CaptureRole::Relation(RelationCapture::Import),
            "call.target" => CaptureRole::Relation(RelationCapture::Call),
            "inherit.target" => CaptureRole::Relation(RelationCapture::Inherit),
            "implement.target" => CaptureRole::Relation(RelationCapture::Implement),
            "reference.identifier" => CaptureRole::Relation(RelationCapture::Reference),
            "markup.class" => CaptureRole::Relation(RelationCapture::MarkupClass),
            "markup.id" => CaptureRole::Relation(RelationCapture::MarkupId),
            "qualifier.visibility" => CaptureRole::Qualifier(QualifierCapture::Visibility),
            "qualifier.modifiers" => CaptureRole::Qualifier(QualifierCapture::Modifiers),
            "qualifier.async" => CaptureRole::Qualifier(QualifierCapture::Async),
            "qualifier.static" => CaptureRole::Qualifier(QualifierCapture::Static),
            "qualifier.parameters" => CaptureRole::Qualifier(QualifierCapture::Parameters),
            "qualifier.return_type" => CaptureRole::Qualifier(QualifierCapture::ReturnType),
            "qualifier.throw" => CaptureRole::Qualifier(QualifierCapture::Throw),
            _ => CaptureRole::Ignored,
        }
    }
}
