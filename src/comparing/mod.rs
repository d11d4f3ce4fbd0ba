//! Comparing the field identifiers declared in form markup against the keys
//! of the instructional text mapping.

use std::collections::BTreeSet;

use tracing::debug;

use crate::language::Document;
use crate::matching;

/// Which object literal in the mapping document holds the keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingShape {
    pub name: String,
}

impl Default for MappingShape {
    fn default() -> Self {
        MappingShape {
            name: "fieldInstructions".to_string(),
        }
    }
}

impl MappingShape {
    fn starts(&self, stripped: &str) -> bool {
        stripped
            .strip_prefix("const")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(|rest| rest.trim_start())
            .and_then(|rest| rest.strip_prefix(self.name.as_str()))
            .filter(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
            .map(|rest| rest.contains('{'))
            .unwrap_or(false)
    }
}

/// Identifiers present in the markup but absent from the mapping, sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub missing: Vec<String>,
}

impl Comparison {
    pub fn total(&self) -> usize {
        self.missing
            .len()
    }
}

/// Every value bound to an `id` or `name` attribute anywhere in the markup.
pub fn identifiers(markup: &Document) -> BTreeSet<String> {
    let mut result = BTreeSet::new();

    for line in &markup.lines {
        for value in matching::identifiers(line.text) {
            result.insert(value.to_string());
        }
    }

    debug!("Found {} identifiers in markup", result.len());
    result
}

/// The top level keys of the mapping literal. Scanning starts after the line
/// declaring it and stops at the first line beginning with its closing
/// brace; no such declaration means no keys.
pub fn keys(mapping: &Document, shape: &MappingShape) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut inside = false;

    for line in &mapping.lines {
        let stripped = line
            .text
            .trim();

        if !inside {
            if shape.starts(stripped) {
                inside = true;
            }
            continue;
        }

        if stripped.starts_with('}') {
            break;
        }

        let quoted = crate::regex!(r#"^["']([^"']+)["']\s*:"#);
        let bare = crate::regex!(r"^([A-Za-z_$][\w$]*)\s*:");

        if let Some(key) = matching::capture(stripped, quoted).or_else(|| matching::capture(stripped, bare)) {
            result.insert(key.to_string());
        }
    }

    if !inside {
        debug!("No '{}' mapping found", shape.name);
    }

    result
}

/// Markup identifiers minus mapping keys.
pub fn compare(markup: &Document, mapping: &Document, shape: &MappingShape) -> Comparison {
    let declared = identifiers(markup);
    let documented = keys(mapping, shape);

    Comparison {
        missing: declared
            .difference(&documented)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::parsing::parse;

    #[test]
    fn identifiers_from_markup() {
        let document = parse(
            r#"<input id="title" name="title" />
<input
  id='prov:qualifiedAttribution'
  aria-invalid="false"
/>
<select name="roleType"></select>
<label htmlFor="license" className="label">
"#,
        );

        let found: Vec<String> = identifiers(&document)
            .into_iter()
            .collect();
        assert_eq!(found, vec!["prov:qualifiedAttribution", "roleType", "title"]);
    }

    #[test]
    fn keys_from_mapping() {
        let document = parse(
            r#"import x from "y";
const other = {
    "notThis": "no",
};

const fieldInstructions = {
    "identifier": "The identifier for KG metadata.",
    // a comment
    'title': "The name",
    description: "bare key",
    "prov:qualifiedAttribution": "contact",
  };

"afterwards": "ignored",
"#,
        );

        let found: Vec<String> = keys(&document, &MappingShape::default())
            .into_iter()
            .collect();
        assert_eq!(
            found,
            vec!["description", "identifier", "prov:qualifiedAttribution", "title"]
        );
    }

    #[test]
    fn mapping_without_marker() {
        let document = parse("\"title\": \"x\",\n");
        assert!(keys(&document, &MappingShape::default()).is_empty());

        // a name that merely begins the same way is not the mapping
        let document = parse("const fieldInstructionsOld = {\n  \"title\": \"x\",\n};\n");
        assert!(keys(&document, &MappingShape::default()).is_empty());
    }
}
