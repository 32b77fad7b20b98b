//! UXML Markup
//!
//! Just enough of a UXML layout to connect it to style sheets: the class
//! names listed in `class` attributes, and what the cursor is typing.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::Span;

/// `class="a b"` or `class='a b'`; group 1 or 2 is the value
static CLASS_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid class attribute pattern")
});

/// Line prefix ending inside an unterminated class attribute value
static OPEN_CLASS_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bclass\s*=\s*["'][^"']*$"#).expect("valid open class pattern")
});

/// Line prefix ending in a tag name being typed
static OPEN_TAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][A-Za-z0-9.:-]*)?$").expect("valid tag name pattern")
});

/// Line prefix ending inside the attribute list of a tag
static OPEN_TAG_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][A-Za-z0-9.:-]*)\s+[^>]*$").expect("valid attribute list pattern")
});

/// One class name inside a `class` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReference {
    pub name: String,
    pub span: Span,
}

/// What the cursor is typing in a markup document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupContext {
    /// Inside a `class` attribute value
    ClassAttribute,
    /// After `<`; `prefix` is the element name typed so far, namespace removed
    ElementName { prefix: String },
    /// In the attribute list of `element` (namespace removed)
    Attribute { element: String },
}

/// Every class name of every `class` attribute, in document order
pub fn class_references(text: &str) -> Vec<ClassReference> {
    let mut references = Vec::new();

    for caps in CLASS_ATTRIBUTE.captures_iter(text) {
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };

        let mut offset = value.start();
        for piece in value.as_str().split(|c: char| c.is_ascii_whitespace()) {
            if !piece.is_empty() {
                references.push(ClassReference {
                    name: piece.to_string(),
                    span: Span::new(offset, offset + piece.len()),
                });
            }
            offset += piece.len() + 1;
        }
    }

    references
}

/// Class name under `offset`, end inclusive
pub fn class_reference_at(text: &str, offset: usize) -> Option<ClassReference> {
    class_references(text)
        .into_iter()
        .find(|r| r.span.touches(offset))
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Classify the cursor from the text of its line before it
pub fn markup_context(text: &str, offset: usize) -> Option<MarkupContext> {
    let offset = offset.min(text.len());
    let line_start = text[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    let prefix = &text[line_start..offset];

    if OPEN_CLASS_VALUE.is_match(prefix) {
        return Some(MarkupContext::ClassAttribute);
    }

    if let Some(caps) = OPEN_TAG_NAME.captures(prefix) {
        let typed = caps.get(1).map_or("", |m| m.as_str());
        return Some(MarkupContext::ElementName {
            prefix: local_name(typed).to_string(),
        });
    }

    let caps = OPEN_TAG_ATTRIBUTES.captures(prefix)?;
    Some(MarkupContext::Attribute {
        element: local_name(&caps[1]).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"<ui:UXML xmlns:ui="UnityEngine.UIElements">
    <ui:VisualElement class="panel  panel--wide">
        <ui:Button class='button' text="OK" />
    </ui:VisualElement>
</ui:UXML>"#;

    #[test]
    fn test_class_references() {
        let references = class_references(LAYOUT);
        let names: Vec<_> = references.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["panel", "panel--wide", "button"]);

        for reference in &references {
            assert_eq!(&LAYOUT[reference.span.start..reference.span.end], reference.name);
        }
    }

    #[test]
    fn test_class_reference_at() {
        let offset = LAYOUT.find("wide").unwrap();
        assert_eq!(class_reference_at(LAYOUT, offset).unwrap().name, "panel--wide");
        assert!(class_reference_at(LAYOUT, LAYOUT.find("text=").unwrap()).is_none());
    }

    #[test]
    fn test_markup_context() {
        let text = "<ui:Button class=\"button pri";
        assert_eq!(markup_context(text, text.len()), Some(MarkupContext::ClassAttribute));

        let text = "  <ui:Bu";
        assert_eq!(
            markup_context(text, text.len()),
            Some(MarkupContext::ElementName {
                prefix: "Bu".to_string()
            })
        );

        let text = "<ui:Label name=\"title\" ";
        assert_eq!(
            markup_context(text, text.len()),
            Some(MarkupContext::Attribute {
                element: "Label".to_string()
            })
        );

        let text = "<ui:Label class=\"a\" />\nplain text";
        assert_eq!(markup_context(text, text.len()), None);
    }
}
