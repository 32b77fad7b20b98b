//! UXML completions: element names, their attributes, and stylesheet classes

use tower_lsp::lsp_types::*;

/// UI Toolkit elements offered after `<`
const ELEMENTS: &[(&str, &str)] = &[
    ("VisualElement", "Base class for all visual elements"),
    ("BindableElement", "Base class for bindable elements"),
    ("Box", "A simple container element"),
    ("Button", "A clickable button element"),
    ("Label", "A text display element"),
    ("TextField", "A text input field"),
    ("Toggle", "A checkbox/toggle element"),
    ("Slider", "A slider for numeric input"),
    ("SliderInt", "A slider for integer input"),
    ("FloatField", "A field for float input"),
    ("IntegerField", "A field for integer input"),
    ("DoubleField", "A field for double input"),
    ("LongField", "A field for long input"),
    ("Vector2Field", "A field for Vector2 input"),
    ("Vector3Field", "A field for Vector3 input"),
    ("Vector4Field", "A field for Vector4 input"),
    ("Vector2IntField", "A field for Vector2Int input"),
    ("Vector3IntField", "A field for Vector3Int input"),
    ("RectField", "A field for Rect input"),
    ("RectIntField", "A field for RectInt input"),
    ("BoundsField", "A field for Bounds input"),
    ("BoundsIntField", "A field for BoundsInt input"),
    ("ScrollView", "A scrollable container"),
    ("ListView", "A list view for displaying collections"),
    ("TreeView", "A tree view for hierarchical data"),
    ("Foldout", "A collapsible section"),
    ("GroupBox", "A grouped container with optional title"),
    ("TwoPaneSplitView", "A split view with two panes"),
    ("TabView", "A tabbed container"),
    ("Tab", "A single tab in a TabView"),
    ("DropdownField", "A dropdown selection field"),
    ("EnumField", "A field for enum selection"),
    ("RadioButton", "A radio button element"),
    ("RadioButtonGroup", "A group of radio buttons"),
    ("Image", "An image display element"),
    ("ProgressBar", "A progress indicator"),
    ("MinMaxSlider", "A slider with min and max values"),
    ("HelpBox", "A help message box"),
    ("TemplateContainer", "A container for UXML templates"),
    ("Template", "A UXML template definition"),
    ("Instance", "An instance of a UXML template"),
];

/// Attributes every element accepts
const COMMON_ATTRIBUTES: &[(&str, &str)] = &[
    ("name", "The name of the element for identification"),
    ("class", "Style sheet classes applied to the element"),
    ("style", "Inline styles for the element"),
    ("picking-mode", "How the element responds to picking"),
    ("tooltip", "Tooltip text for the element"),
    ("usage-hints", "Hints for optimizing element usage"),
];

fn element_attributes(element: &str) -> &'static [(&'static str, &'static str)] {
    match element {
        "Button" => &[("text", "The text displayed on the button")],
        "Label" => &[("text", "The text content of the label")],
        "TextField" => &[
            ("value", "The current text value"),
            ("placeholder-text", "Placeholder text when empty"),
            ("multiline", "Whether the field supports multiple lines"),
            ("readonly", "Whether the field is read-only"),
        ],
        "Toggle" => &[
            ("value", "The current toggle state (true/false)"),
            ("text", "The label text for the toggle"),
        ],
        "Slider" => &[
            ("value", "The current slider value"),
            ("low-value", "The minimum value"),
            ("high-value", "The maximum value"),
            ("direction", "The direction of the slider"),
        ],
        "Image" => &[
            ("image", "The image asset to display"),
            ("scale-mode", "How the image should be scaled"),
            ("tint-color", "Tint color for the image"),
        ],
        "ProgressBar" => &[
            ("value", "The current progress value"),
            ("title", "The title text for the progress bar"),
        ],
        _ => &[],
    }
}

fn markdown(value: &str) -> Option<Documentation> {
    Some(Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value: value.to_string(),
    }))
}

/// Element names starting with `prefix`
pub fn element_items(prefix: &str) -> Vec<CompletionItem> {
    ELEMENTS
        .iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, description)| {
            let insert = match *name {
                "Button" | "Label" => format!("{} text=\"$1\"$0", name),
                "TextField" => format!("{} placeholder-text=\"$1\"$0", name),
                _ => format!("{}$0", name),
            };
            CompletionItem {
                label: name.to_string(),
                kind: Some(CompletionItemKind::CLASS),
                detail: Some("Unity UI Element".to_string()),
                documentation: markdown(description),
                insert_text: Some(insert),
                insert_text_format: Some(InsertTextFormat::SNIPPET),
                ..Default::default()
            }
        })
        .collect()
}

/// Common attributes followed by those specific to `element`
pub fn attribute_items(element: &str) -> Vec<CompletionItem> {
    let common = COMMON_ATTRIBUTES
        .iter()
        .map(|attribute| (attribute, "Common attribute".to_string()));
    let specific = element_attributes(element)
        .iter()
        .map(|attribute| (attribute, format!("{} attribute", element)));

    common
        .chain(specific)
        .map(|((name, description), detail)| CompletionItem {
            label: name.to_string(),
            kind: Some(CompletionItemKind::PROPERTY),
            detail: Some(detail),
            documentation: markdown(description),
            insert_text: Some(format!("{}=\"$1\"$0", name)),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        })
        .collect()
}

/// Class names declared in the workspace stylesheets
pub fn class_items(names: Vec<String>) -> Vec<CompletionItem> {
    names
        .into_iter()
        .map(|name| CompletionItem {
            label: name,
            kind: Some(CompletionItemKind::CLASS),
            detail: Some("USS class".to_string()),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_items_filtered() {
        let items = element_items("Slid");
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Slider", "SliderInt"]);

        let button = &element_items("Butt")[0];
        assert_eq!(button.insert_text.as_deref(), Some("Button text=\"$1\"$0"));
        assert_eq!(element_items("").len(), ELEMENTS.len());
    }

    #[test]
    fn test_attribute_items() {
        let labels: Vec<_> = attribute_items("Slider")
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert!(labels.contains(&"class".to_string()));
        assert!(labels.contains(&"high-value".to_string()));

        assert_eq!(attribute_items("Custom").len(), COMMON_ATTRIBUTES.len());
    }
}
