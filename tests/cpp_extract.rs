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
    let source = r#"#include "shape.hpp"

namespace geo {

class Shape {
public:
    virtual double area() const = 0;
};

class Circle : public Shape {
public:
    double area() const override { return 3.14 * r * r; }
private:
    double r;
};

}

template <typename T>
T clamp(T v, T lo, T hi) {
    return v < lo ? lo : v;
}

double total(geo::Circle c) {
    return c.area();
}
"#;
    let extracted = extract("src/geo.cpp", source);

    let names: Vec<_> = extracted
        .nodes
        .iter()
        .map(|n| (n.kind.as_str(), n.id.as_str()))
        .collect();
    assert!(names.contains(&("namespace", "src/geo.cpp#geo")));
    assert!(names.contains(&("class", "src/geo.cpp#Shape")));
    assert!(names.contains(&("method", "src/geo.cpp#Shape.area")));
    assert!(names.contains(&("class", "src/geo.cpp#Circle")));
    assert!(names.contains(&("method", "src/geo.cpp#Circle.area")));
    assert!(names.contains(&("field", "src/geo.cpp#Circle.r")));
    assert!(names.contains(&("template", "src/geo.cpp#clamp")));
    assert!(names.contains(&("function", "src/geo.cpp#total")));
    // the templated function is reported once, as the template
    assert!(!names.contains(&("function", "src/geo.cpp#clamp")));

    let relations: Vec<_> = extracted
        .relations
        .iter()
        .map(|r| (r.kind, r.from_id.as_str(), r.to_name.as_str()))
        .collect();
    assert!(relations.contains(&(RelationKind::Imports, "src/geo.cpp", "shape.hpp")));
    assert!(relations.contains(&(RelationKind::Inherits, "src/geo.cpp#Circle", "Shape")));
    assert!(relations.contains(&(RelationKind::Calls, "src/geo.cpp#total", "area")));
}

#[test]
fn out_of_line_members_attach_to_their_class() {
    let source = "class Counter {\n  int n;\n};\n\nint Counter::next() {\n  return ++n;\n}\n";
    let extracted = extract("counter.cc", source);
    let next = extracted
        .nodes
        .iter()
        .find(|n| n.id == "counter.cc#Counter.next")
        .unwrap();
    assert_eq!(next.kind.as_str(), "method");
    assert_eq!(next.start_line, 5);
}
