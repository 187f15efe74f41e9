use symgraph::grammar::LanguageFamily;
use symgraph::resolve::{KnownFiles, resolve_import};

fn known(paths: &[&str]) -> KnownFiles {
    paths.iter().copied().collect()
}

fn resolve(family: LanguageFamily, from: &str, spec: &str, files: &KnownFiles) -> Option<String> {
    resolve_import(family, from, spec, files)
}

#[test]
fn javascript_relative_specs() {
    let files = known(&[
        "src/app.ts",
        "src/util.ts",
        "src/components/index.tsx",
        "src/legacy.js",
        "lib/shared.mjs",
    ]);
    let js = LanguageFamily::JavaScript;
    assert_eq!(resolve(js, "src/app.ts", "./util", &files).as_deref(), Some("src/util.ts"));
    assert_eq!(
        resolve(js, "src/app.ts", "./components", &files).as_deref(),
        Some("src/components/index.tsx")
    );
    assert_eq!(resolve(js, "src/app.ts", "./util.js", &files).as_deref(), Some("src/util.ts"));
    assert_eq!(resolve(js, "src/app.ts", "./legacy.js", &files).as_deref(), Some("src/legacy.js"));
    assert_eq!(
        resolve(js, "src/app.ts", "../lib/shared.mjs?raw", &files).as_deref(),
        Some("lib/shared.mjs")
    );
    // bare package names live outside the project
    assert_eq!(resolve(js, "src/app.ts", "react", &files), None);
    assert_eq!(resolve(js, "src/app.ts", "./missing", &files), None);
}

#[test]
fn python_absolute_and_relative_modules() {
    let files = known(&[
        "pkg/__init__.py",
        "pkg/models.py",
        "pkg/api/views.py",
        "src/tools/cli.py",
        "settings.py",
    ]);
    let py = LanguageFamily::Python;
    assert_eq!(resolve(py, "pkg/api/views.py", "..models", &files).as_deref(), Some("pkg/models.py"));
    assert_eq!(resolve(py, "pkg/models.py", ".", &files).as_deref(), Some("pkg/__init__.py"));
    assert_eq!(resolve(py, "pkg/api/views.py", "pkg.models", &files).as_deref(), Some("pkg/models.py"));
    assert_eq!(resolve(py, "pkg/api/views.py", "pkg", &files).as_deref(), Some("pkg/__init__.py"));
    assert_eq!(resolve(py, "pkg/models.py", "tools.cli", &files).as_deref(), Some("src/tools/cli.py"));
    assert_eq!(resolve(py, "pkg/models.py", "settings", &files).as_deref(), Some("settings.py"));
    assert_eq!(resolve(py, "pkg/models.py", "os", &files), None);
}

#[test]
fn rust_paths_and_module_declarations() {
    let files = known(&[
        "src/lib.rs",
        "src/model.rs",
        "src/resolve/mod.rs",
        "src/resolve/imports.rs",
        "src/grammar/mod.rs",
        "src/grammar/loader.rs",
    ]);
    let rs = LanguageFamily::Rust;
    assert_eq!(
        resolve(rs, "src/resolve/imports.rs", "crate::model::Graph", &files).as_deref(),
        Some("src/model.rs")
    );
    assert_eq!(
        resolve(rs, "src/lib.rs", "crate::grammar::{GrammarLoader, Language}", &files).as_deref(),
        Some("src/grammar/mod.rs")
    );
    assert_eq!(resolve(rs, "src/lib.rs", "model", &files).as_deref(), Some("src/model.rs"));
    assert_eq!(resolve(rs, "src/grammar/mod.rs", "loader", &files).as_deref(), Some("src/grammar/loader.rs"));
    assert_eq!(
        resolve(rs, "src/resolve/imports.rs", "super::super::grammar::loader", &files).as_deref(),
        Some("src/grammar/loader.rs")
    );
    assert_eq!(
        resolve(rs, "src/resolve/mod.rs", "self::imports::*", &files).as_deref(),
        Some("src/resolve/imports.rs")
    );
    assert_eq!(resolve(rs, "src/lib.rs", "std::collections::BTreeMap", &files), None);
}

#[test]
fn go_import_paths_match_directories() {
    let files = known(&[
        "cmd/server/main.go",
        "internal/store/store.go",
        "internal/store/store_test.go",
        "internal/store/cache.go",
    ]);
    let go = LanguageFamily::Go;
    assert_eq!(
        resolve(go, "cmd/server/main.go", "example.com/app/internal/store", &files).as_deref(),
        Some("internal/store/cache.go")
    );
    assert_eq!(resolve(go, "cmd/server/main.go", "fmt", &files), None);
}

#[test]
fn java_and_csharp_names_map_to_files() {
    let files = known(&[
        "src/main/java/com/acme/util/Helper.java",
        "src/main/java/com/acme/App.java",
        "MyApp/Models/User.cs",
        "MyApp/Services/UserService.cs",
    ]);
    let java = LanguageFamily::Java;
    assert_eq!(
        resolve(java, "src/main/java/com/acme/App.java", "com.acme.util.Helper", &files).as_deref(),
        Some("src/main/java/com/acme/util/Helper.java")
    );
    assert_eq!(
        resolve(java, "src/main/java/com/acme/App.java", "com.acme.util.Helper.assist", &files).as_deref(),
        Some("src/main/java/com/acme/util/Helper.java")
    );
    assert_eq!(resolve(java, "src/main/java/com/acme/App.java", "com.acme.util.*", &files), None);

    let cs = LanguageFamily::CSharp;
    assert_eq!(
        resolve(cs, "MyApp/Services/UserService.cs", "MyApp.Models", &files).as_deref(),
        Some("MyApp/Models/User.cs")
    );
    assert_eq!(resolve(cs, "MyApp/Services/UserService.cs", "System", &files), None);
}

#[test]
fn c_includes_ruby_requires_php_uses_lua_requires() {
    let files = known(&[
        "src/main.c",
        "src/util.h",
        "include/api.h",
        "lib/billing/invoice.rb",
        "app/models/user.rb",
        "app/main.rb",
        "src/Models/User.php",
        "src/Http/Controller.php",
        "lua/app/init.lua",
        "lua/app/config.lua",
    ]);
    assert_eq!(
        resolve(LanguageFamily::CFamily, "src/main.c", "util.h", &files).as_deref(),
        Some("src/util.h")
    );
    assert_eq!(
        resolve(LanguageFamily::CFamily, "src/main.c", "api.h", &files).as_deref(),
        Some("include/api.h")
    );
    assert_eq!(
        resolve(LanguageFamily::Ruby, "app/main.rb", "billing/invoice", &files).as_deref(),
        Some("lib/billing/invoice.rb")
    );
    assert_eq!(
        resolve(LanguageFamily::Ruby, "app/main.rb", "./models/user", &files).as_deref(),
        Some("app/models/user.rb")
    );
    assert_eq!(
        resolve(LanguageFamily::Php, "src/Http/Controller.php", "App\\Models\\User", &files).as_deref(),
        Some("src/Models/User.php")
    );
    assert_eq!(
        resolve(LanguageFamily::Php, "src/Http/Controller.php", "../Models/User.php", &files).as_deref(),
        Some("src/Models/User.php")
    );
    assert_eq!(
        resolve(LanguageFamily::Lua, "lua/app/init.lua", "config", &files).as_deref(),
        Some("lua/app/config.lua")
    );
    assert_eq!(
        resolve(LanguageFamily::Lua, "main.lua", "lua.app", &files).as_deref(),
        Some("lua/app/init.lua")
    );
}

#[test]
fn web_assets_resolve_relative_to_the_page() {
    let files = known(&["site/index.html", "site/style.css", "site/css/base.css"]);
    let markup = LanguageFamily::Markup;
    assert_eq!(
        resolve(markup, "site/index.html", "style.css", &files).as_deref(),
        Some("site/style.css")
    );
    assert_eq!(
        resolve(LanguageFamily::Style, "site/style.css", "./css/base.css?v=2", &files).as_deref(),
        Some("site/css/base.css")
    );
    assert_eq!(resolve(markup, "site/index.html", "https://cdn.example.com/x.css", &files), None);
    assert_eq!(resolve(markup, "site/index.html", "#top", &files), None);
    assert_eq!(resolve(markup, "site/index.html", "missing.css", &files), None);
}

#[test]
fn resolution_is_deterministic() {
    let files = known(&["a/util.py", "b/util.py", "util.py"]);
    let first = resolve(LanguageFamily::Python, "a/main.py", "util", &files);
    for _ in 0..10 {
        assert_eq!(resolve(LanguageFamily::Python, "a/main.py", "util", &files), first);
    }
    assert_eq!(first.as_deref(), Some("a/util.py"));
    assert_eq!(resolve(LanguageFamily::Python, "a/main.py", "", &files), None);
}
