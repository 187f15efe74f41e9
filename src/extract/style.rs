use crate::model::StyleIntent;
use crate::util::node_text;
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static LAYOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:display|position|top|right|bottom|left|inset(?:-[a-z-]+)?|float|clear|z-index|overflow(?:-[xy])?|(?:min-|max-)?(?:width|height)|margin(?:-[a-z-]+)?|padding(?:-[a-z-]+)?|box-sizing|flex(?:-[a-z-]+)?|grid(?:-[a-z-]+)?|(?:row-|column-)?gap|align-[a-z-]+|justify-[a-z-]+|place-[a-z-]+|order)$",
    )
    .unwrap()
});

static TYPOGRAPHY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:font(?:-[a-z-]+)?|text-[a-z-]+|line-height|letter-spacing|word-spacing|white-space|word-break|vertical-align|direction)$",
    )
    .unwrap()
});

static APPEARANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:color|background(?:-[a-z-]+)?|border(?:-[a-z-]+)?|outline(?:-[a-z-]+)?|box-shadow|text-shadow|opacity|filter|visibility|cursor|fill|stroke)$",
    )
    .unwrap()
});

/// Sorted, de-duplicated intents of a set of CSS property names.
pub fn classify_properties<'a>(properties: impl IntoIterator<Item = &'a str>) -> Vec<StyleIntent> {
    let mut intents = Vec::new();
    for property in properties {
        let property = property.trim().to_ascii_lowercase();
        if LAYOUT.is_match(&property) {
            intents.push(StyleIntent::Layout);
        }
        if TYPOGRAPHY.is_match(&property) {
            intents.push(StyleIntent::Typography);
        }
        if APPEARANCE.is_match(&property) {
            intents.push(StyleIntent::Appearance);
        }
    }
    intents.sort();
    intents.dedup();
    intents
}

/// Intents of the declarations directly inside a `rule_set` block.
pub fn rule_intents(rule: Node, source: &str) -> Vec<StyleIntent> {
    let mut cursor = rule.walk();
    let Some(block) = rule
        .named_children(&mut cursor)
        .find(|child| child.kind() == "block")
    else {
        return Vec::new();
    };
    let mut properties = Vec::new();
    let mut cursor = block.walk();
    for declaration in block.named_children(&mut cursor) {
        if declaration.kind() != "declaration" {
            continue;
        }
        let mut inner = declaration.walk();
        if let Some(name) = declaration
            .named_children(&mut inner)
            .find(|child| child.kind() == "property_name")
        {
            properties.push(node_text(name, source));
        }
    }
    classify_properties(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_independently() {
        assert_eq!(classify_properties(["color"]), vec![StyleIntent::Appearance]);
        assert_eq!(
            classify_properties(["display", "font-size", "Margin-Top"]),
            vec![StyleIntent::Layout, StyleIntent::Typography]
        );
        // text-shadow reads as both typography and appearance
        assert_eq!(
            classify_properties(["text-shadow", "text-shadow"]),
            vec![StyleIntent::Appearance, StyleIntent::Typography]
        );
        assert!(classify_properties(["--custom-prop", "content"]).is_empty());
    }
}
