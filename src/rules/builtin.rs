//! The rule table compiled into the tools, describing the knowledge graph
//! metadata form.

use super::{Decoration, FieldRule, Transform};
use crate::language::{Closing, Element};

// Fields taking several values, entered one at a time in a tag input.
const TAG_FIELDS: &[&str] = &["identifier", "alternativeTitle"];

// Ordinary single value fields.
const REGULAR_FIELDS: &[(&str, Element)] = &[
    ("title", Element::Input),
    ("description", Element::Textarea),
    ("license", Element::Input),
    ("version", Element::Input),
    ("accessStatement", Element::Textarea),
];

const DATE_FIELDS: &[&str] = &["distReleaseDate", "distModificationDate"];

// Marker expected on the line before a tag list item, per tag field.
const TAG_CONTEXTS: &[&str] = &["identifier", "alt-title"];

/// identifier -> Identifier
fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars)
            .collect(),
        None => String::new(),
    }
}

fn closing_for(element: Element) -> Closing {
    match element {
        Element::Input => Closing::SelfClosing,
        Element::Textarea => Closing::TagEnd,
    }
}

fn tag_rule(field: &str) -> FieldRule {
    let upper = capitalize(field);

    FieldRule {
        field: field.to_string(),
        element: Element::Input,
        closing: Closing::SelfClosing,
        transforms: vec![
            Transform::set(
                "className",
                format!("{{{}InputValid ? 'tag-input-valid' : ''}}", field),
            ),
            Transform::replace(
                "onChange",
                format!(
                    "{{(e) => {{ set{0}Input(e.target.value); set{0}InputValid(false); }}}}",
                    upper
                ),
            ),
            Transform::ensure(
                "onBlur",
                format!(
                    "{{() => {{ if ({0}Input.trim()) set{1}InputValid(true); }}}}",
                    field, upper
                ),
            ),
            Transform::keep("onKeyPress"),
        ],
    }
}

fn regular_rule(field: &str, element: Element) -> FieldRule {
    FieldRule {
        field: field.to_string(),
        element,
        closing: closing_for(element),
        transforms: vec![
            Transform::set(
                "className",
                format!("{{`${{{}Valid ? 'form-input-valid' : ''}}`}}", field),
            ),
            Transform::keep("onChange"),
            Transform::ensure("onBlur", "{validateRegularInput}".to_string()),
        ],
    }
}

fn date_rule(field: &str) -> FieldRule {
    FieldRule {
        field: field.to_string(),
        element: Element::Input,
        closing: Closing::SelfClosing,
        transforms: vec![Transform::set(
            "className",
            format!(
                "{{`date-input subfield-input ${{{0}Error ? 'date-input-error' : ''}} ${{{0}Valid ? 'date-input-valid' : ''}} `}}",
                field
            ),
        )],
    }
}

pub(super) fn rules() -> Vec<FieldRule> {
    let mut rules = Vec::new();

    for field in TAG_FIELDS {
        rules.push(tag_rule(field));
    }
    for (field, element) in REGULAR_FIELDS {
        rules.push(regular_rule(field, *element));
    }
    for field in DATE_FIELDS {
        rules.push(date_rule(field));
    }

    rules
}

pub(super) fn decorations() -> Vec<Decoration> {
    let mut decorations: Vec<Decoration> = TAG_CONTEXTS
        .iter()
        .map(|context| Decoration {
            context: Some(context.to_string()),
            find: r#"className="tag-item""#.to_string(),
            replace: r#"className="tag-item tag-item-valid""#.to_string(),
        })
        .collect();

    decorations.push(Decoration {
        context: None,
        find: r#"className="radio-group""#.to_string(),
        replace: "className={`radio-group ${typeValid ? 'form-input-valid' : ''}` }".to_string(),
    });

    decorations
}
