//! Import specs to project files. Each language family gets one pure function
//! over the set of known paths; nothing here touches the filesystem, so the
//! same inputs always produce the same answer.

use crate::grammar::LanguageFamily;
use crate::util::{file_stem, join_relative, parent_dir};
use std::collections::BTreeSet;

const JS_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx", "mjs", "cjs"];
const JS_INDEX: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.d.ts",
    "index.js",
    "index.jsx",
    "index.mjs",
    "index.cjs",
];
const PY_EXTENSIONS: &[&str] = &["py", "pyi"];
const PY_INDEX: &[&str] = &["__init__.py", "__init__.pyi"];
const RB_EXTENSIONS: &[&str] = &["rb"];
const LUA_EXTENSIONS: &[&str] = &["lua"];
const LUA_INDEX: &[&str] = &["init.lua"];
const PHP_EXTENSIONS: &[&str] = &["php"];

/// Project-relative paths of every file in the run, kept sorted so that
/// ambiguous lookups settle on the same candidate every time.
#[derive(Debug, Clone, Default)]
pub struct KnownFiles {
    paths: BTreeSet<String>,
}

impl KnownFiles {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Files directly inside `dir` (not in sub-directories), sorted.
    pub fn files_in_dir<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |path| parent_dir(path) == dir)
    }

    /// First path equal to `suffix` or ending in `/<suffix>`.
    pub fn find_suffix(&self, suffix: &str) -> Option<&str> {
        let suffix = suffix.trim_start_matches('/');
        if suffix.is_empty() {
            return None;
        }
        if self.contains(suffix) {
            return Some(self.paths.get(suffix)?.as_str());
        }
        let needle = format!("/{suffix}");
        self.iter().find(|path| path.ends_with(&needle))
    }
}

impl<S: Into<String>> FromIterator<S> for KnownFiles {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Resolves `spec`, written in `from`, to a known file. `None` means the
/// dependency points outside the analysed set.
pub fn resolve_import(
    family: LanguageFamily,
    from: &str,
    spec: &str,
    known: &KnownFiles,
) -> Option<String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return None;
    }
    let resolved = match family {
        LanguageFamily::JavaScript => resolve_javascript(from, spec, known),
        LanguageFamily::Python => resolve_python(from, spec, known),
        LanguageFamily::Rust => resolve_rust(from, spec, known),
        LanguageFamily::Go => resolve_go(from, spec, known),
        LanguageFamily::Java => resolve_java(spec, known),
        LanguageFamily::CSharp => resolve_csharp(spec, known),
        LanguageFamily::CFamily => resolve_c(from, spec, known),
        LanguageFamily::Ruby => resolve_ruby(from, spec, known),
        LanguageFamily::Php => resolve_php(from, spec, known),
        LanguageFamily::Lua => resolve_lua(from, spec, known),
        LanguageFamily::Markup | LanguageFamily::Style => resolve_web_asset(from, spec, known),
    };
    resolved.filter(|path| path != from)
}

/// As-is, then `base.<ext>` per extension, then `base/<index>` per index name.
fn find_candidate(known: &KnownFiles, base: &str, extensions: &[&str], index_files: &[&str]) -> Option<String> {
    if base.is_empty() {
        return None;
    }
    if known.contains(base) {
        return Some(base.to_string());
    }
    for ext in extensions {
        let candidate = format!("{base}.{ext}");
        if known.contains(&candidate) {
            return Some(candidate);
        }
    }
    for index in index_files {
        let candidate = format!("{base}/{index}");
        if known.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn relative_to(from: &str, spec: &str) -> Option<String> {
    join_relative(parent_dir(from), spec)
}

fn is_relative(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../") || spec.starts_with('/') || spec == "." || spec == ".."
}

fn strip_query(spec: &str) -> &str {
    spec.split(['?', '#']).next().unwrap_or(spec).trim()
}

fn resolve_javascript(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    let spec = strip_query(spec);
    if !is_relative(spec) {
        return None;
    }
    let base = relative_to(from, spec)?;
    if let Some(found) = find_candidate(known, &base, JS_EXTENSIONS, JS_INDEX) {
        return Some(found);
    }
    // ESM sources import `./x.js` while the file on disk is `./x.ts`
    let stem = base
        .strip_suffix(".js")
        .or_else(|| base.strip_suffix(".jsx"))
        .or_else(|| base.strip_suffix(".mjs"))?;
    find_candidate(known, stem, &["ts", "tsx", "mts"], &[])
}

fn ancestor_dir(dir: &str, levels: usize) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|part| !part.is_empty()).collect();
    for _ in 0..levels {
        parts.pop()?;
    }
    Some(parts.join("/"))
}

fn join_dir(dir: &str, rest: &str) -> String {
    match (dir.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => dir.to_string(),
        (false, false) => format!("{dir}/{rest}"),
    }
}

fn resolve_python(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    let spec: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
    let level = spec.chars().take_while(|c| *c == '.').count();
    let rest = spec[level..].replace('.', "/");

    if level > 0 {
        // one dot is the importing file's own package
        let dir = ancestor_dir(parent_dir(from), level - 1)?;
        if rest.is_empty() {
            return find_index(known, &dir, PY_INDEX);
        }
        return find_candidate(known, &join_dir(&dir, &rest), PY_EXTENSIONS, PY_INDEX);
    }

    if let Some(found) = find_candidate(known, &join_dir(parent_dir(from), &rest), PY_EXTENSIONS, PY_INDEX) {
        return Some(found);
    }
    if let Some(found) = find_candidate(known, &rest, PY_EXTENSIONS, PY_INDEX) {
        return Some(found);
    }
    // src-layout projects: `pkg.mod` living under `src/pkg/mod.py`
    ["src", "lib"]
        .iter()
        .find_map(|root| find_candidate(known, &format!("{root}/{rest}"), PY_EXTENSIONS, PY_INDEX))
}

fn find_index(known: &KnownFiles, dir: &str, index_files: &[&str]) -> Option<String> {
    index_files
        .iter()
        .map(|index| join_dir(dir, index))
        .find(|candidate| known.contains(candidate))
}

/// Directory holding the children of the module defined by `path`.
fn rust_module_dir(path: &str) -> String {
    let dir = parent_dir(path);
    match file_stem(path) {
        "lib" | "main" | "mod" => dir.to_string(),
        stem => join_dir(dir, stem),
    }
}

fn rust_crate_root(from: &str, known: &KnownFiles) -> String {
    let mut dir = parent_dir(from).to_string();
    loop {
        if ["lib.rs", "main.rs"]
            .iter()
            .any(|root| known.contains(&join_dir(&dir, root)))
        {
            return dir;
        }
        if dir.is_empty() {
            break;
        }
        dir = parent_dir(&dir).to_string();
    }
    if known.iter().any(|path| path.starts_with("src/")) {
        "src".to_string()
    } else {
        String::new()
    }
}

fn rust_module_file(known: &KnownFiles, dir: &str, segments: &[&str]) -> Option<String> {
    for len in (1..=segments.len()).rev() {
        let base = join_dir(dir, &segments[..len].join("/"));
        if let Some(found) = find_candidate(known, &base, &["rs"], &["mod.rs"]) {
            return Some(found);
        }
    }
    None
}

fn resolve_rust(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    let mut spec = spec.trim();
    if let Some(idx) = spec.find(" as ") {
        spec = &spec[..idx];
    }
    if let Some(idx) = spec.find('{') {
        spec = &spec[..idx];
    }
    let spec = spec.trim().trim_end_matches("::*").trim_end_matches("::");
    let segments: Vec<&str> = spec.split("::").map(str::trim).filter(|s| !s.is_empty()).collect();
    let (first, rest) = segments.split_first()?;

    match *first {
        "crate" => rust_module_file(known, &rust_crate_root(from, known), rest),
        "self" => rust_module_file(known, &rust_module_dir(from), rest),
        "super" => {
            let mut dir = parent_dir(&rust_module_dir(from)).to_string();
            let mut rest = rest;
            while let Some((next, tail)) = rest.split_first() {
                if *next != "super" {
                    break;
                }
                dir = parent_dir(&dir).to_string();
                rest = tail;
            }
            rust_module_file(known, &dir, rest)
        }
        // `mod name;` declares a child of the current module
        _ if rest.is_empty() => rust_module_file(known, &rust_module_dir(from), &segments),
        _ => rust_module_file(known, &rust_crate_root(from, known), &segments),
    }
}

fn resolve_go(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    let spec = spec.trim_end_matches('/');
    let dir = if is_relative(spec) {
        relative_to(from, spec)?
    } else {
        let mut best: Option<&str> = None;
        for path in known.iter().filter(|path| is_go_source(path)) {
            let dir = parent_dir(path);
            if dir.is_empty() || !(spec == dir || spec.ends_with(&format!("/{dir}"))) {
                continue;
            }
            if best.is_none_or(|current| dir.len() > current.len()) {
                best = Some(dir);
            }
        }
        best?.to_string()
    };
    known
        .files_in_dir(&dir)
        .find(|path| is_go_source(path))
        .map(str::to_string)
}

fn is_go_source(path: &str) -> bool {
    path.ends_with(".go") && !path.ends_with("_test.go")
}

fn resolve_java(spec: &str, known: &KnownFiles) -> Option<String> {
    if spec.ends_with(".*") {
        return None;
    }
    let segments: Vec<&str> = spec.split('.').filter(|s| !s.is_empty()).collect();
    // `import static a.b.Util.method` names a member of `a/b/Util.java`
    for len in (1..=segments.len()).rev().take(2) {
        let candidate = format!("{}.java", segments[..len].join("/"));
        if let Some(found) = known.find_suffix(&candidate) {
            return Some(found.to_string());
        }
    }
    None
}

fn resolve_csharp(spec: &str, known: &KnownFiles) -> Option<String> {
    let spec = match spec.split_once('=') {
        Some((_, target)) => target.trim(),
        None => spec,
    };
    let segments: Vec<&str> = spec.split('.').map(str::trim).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    if let Some(found) = known.find_suffix(&format!("{}.cs", segments.join("/"))) {
        return Some(found.to_string());
    }
    // a namespace maps onto a directory; project folders usually drop the root segment
    let min = segments.len().min(2);
    for start in 0..=segments.len() - min {
        let dir = segments[start..].join("/");
        let needle = format!("/{dir}");
        let found = known.iter().find(|path| {
            path.ends_with(".cs") && {
                let parent = parent_dir(path);
                parent == dir || parent.ends_with(&needle)
            }
        });
        if let Some(found) = found {
            return Some(found.to_string());
        }
    }
    None
}

fn resolve_c(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    if let Some(found) = relative_to(from, spec).filter(|path| known.contains(path)) {
        return Some(found);
    }
    if known.contains(spec) {
        return Some(spec.to_string());
    }
    ["include", "src"]
        .iter()
        .map(|root| format!("{root}/{spec}"))
        .find(|candidate| known.contains(candidate))
        .or_else(|| known.find_suffix(spec).map(str::to_string))
}

fn resolve_ruby(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    if let Some(found) = relative_to(from, spec).and_then(|base| find_candidate(known, &base, RB_EXTENSIONS, &[])) {
        return Some(found);
    }
    if let Some(found) = find_candidate(known, &format!("lib/{spec}"), RB_EXTENSIONS, &[]) {
        return Some(found);
    }
    let file = if spec.ends_with(".rb") {
        spec.to_string()
    } else {
        format!("{spec}.rb")
    };
    known.find_suffix(&file).map(str::to_string)
}

fn resolve_php(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    if spec.contains('/') || spec.ends_with(".php") {
        return relative_to(from, spec).and_then(|base| find_candidate(known, &base, PHP_EXTENSIONS, &[]));
    }
    let segments: Vec<&str> = spec
        .trim_start_matches('\\')
        .split('\\')
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() < 2 {
        return None;
    }
    // PSR-4 roots replace the vendor prefix with a directory like `src/`
    for start in 0..=segments.len() - 2 {
        let candidate = format!("{}.php", segments[start..].join("/"));
        if let Some(found) = known.find_suffix(&candidate) {
            return Some(found.to_string());
        }
    }
    None
}

fn resolve_lua(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    let rest = spec.replace('.', "/");
    find_candidate(known, &join_dir(parent_dir(from), &rest), LUA_EXTENSIONS, LUA_INDEX)
        .or_else(|| find_candidate(known, &rest, LUA_EXTENSIONS, LUA_INDEX))
}

fn resolve_web_asset(from: &str, spec: &str, known: &KnownFiles) -> Option<String> {
    if spec.contains("://")
        || spec.starts_with("//")
        || spec.starts_with('#')
        || spec.starts_with("data:")
        || spec.starts_with("mailto:")
    {
        return None;
    }
    let spec = strip_query(spec);
    let path = relative_to(from, spec)?;
    known.contains(&path).then_some(path)
}
