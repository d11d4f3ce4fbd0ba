//! Blanket injection of blur handlers into every input and textarea
//! declaration that doesn't have one already.

use std::collections::HashSet;

use tracing::debug;

use crate::language::{Closing, Document, Element, Line};
use crate::matching::{self, closing_end, scan};

const REFERENCE_FIELDS: &[&str] = &[
    "homepageURL",
    "homepageURLInput",
    "otherPages",
    "otherPagesInput",
    "primaryReferenceDocument",
    "primaryReferenceDocInput",
    "statistics",
    "statisticsInput",
    "category",
    "categoryInput",
    "publicationReferences",
    "publicationReferencesInput",
    "source",
    "sourceInput",
];

const DATE_FIELDS: &[&str] = &[
    "createdDate",
    "publishedDate",
    "modifiedDate",
    "distReleaseDate",
    "distModificationDate",
];

const COMPOSITE_FIELDS: &[&str] = &[
    "identifier",
    "alternativeTitle",
    "keywords",
    "vocabulariesUsed",
    "language",
    "iriTemplate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Fields holding an IRI.
    Reference,
    Date,
    /// Tag style inputs building up a list of values.
    Composite,
    Generic,
}

impl Category {
    /// The blur handler this category gets, if any. Dates and tag inputs
    /// have their own handling elsewhere.
    pub fn handler(&self) -> Option<&'static str> {
        match self {
            Category::Reference => Some("{validateIriInput}"),
            Category::Generic => Some("{validateRegularInput}"),
            Category::Date | Category::Composite => None,
        }
    }
}

/// Sorts field identifiers into categories by exact membership in fixed
/// lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    reference: HashSet<String>,
    date: HashSet<String>,
    composite: HashSet<String>,
}

impl Classifier {
    pub fn new<S: AsRef<str>>(reference: &[S], date: &[S], composite: &[S]) -> Classifier {
        fn set<S: AsRef<str>>(list: &[S]) -> HashSet<String> {
            list.iter()
                .map(|s| {
                    s.as_ref()
                        .to_string()
                })
                .collect()
        }

        Classifier {
            reference: set(reference),
            date: set(date),
            composite: set(composite),
        }
    }

    pub fn builtin() -> Classifier {
        Classifier::new(REFERENCE_FIELDS, DATE_FIELDS, COMPOSITE_FIELDS)
    }

    pub fn classify(&self, identifier: Option<&str>) -> Category {
        match identifier {
            Some(id) if self
                .reference
                .contains(id) =>
            {
                Category::Reference
            }
            Some(id) if self
                .date
                .contains(id) =>
            {
                Category::Date
            }
            Some(id) if self
                .composite
                .contains(id) =>
            {
                Category::Composite
            }
            _ => Category::Generic,
        }
    }
}

// One element declaration, from its opening tag to where the tag closes. The
// first line starts at the opener and the last ends with the closing marker.
struct Declaration<'i> {
    indent: &'i str, // of the line the opener is on
    lines: Vec<(Line<'i>, usize)>, // with the expression depth each began at
    depth: usize,
}

impl<'i> Declaration<'i> {
    fn identifier(&self) -> Option<&'i str> {
        let mut lines = self
            .lines
            .iter()
            .map(|(line, _)| line.text);

        let id = lines
            .clone()
            .find_map(matching::identifier);
        id.or_else(|| lines.find_map(matching::name))
    }

    fn has_blur(&self) -> bool {
        self.lines
            .iter()
            .any(|(line, depth)| matching::declares(line.text, "onBlur", *depth))
    }
}

/// Add the default blur handler of its category to every declaration
/// lacking one. A line may hold several declarations, or the end of one and
/// the start of the next.
pub fn annotate(document: &Document, classifier: &Classifier) -> String {
    let mut output = String::new();
    let mut current: Option<Declaration> = None;
    let mut count = 0;

    for line in &document.lines {
        let mut rest = Some(*line);

        while let Some(piece) = rest.take() {
            if let Some(declaration) = current.as_mut() {
                let result = scan(piece.text, 0, declaration.depth, Closing::TagEnd);
                match result.closing {
                    Some(at) => {
                        let (head, tail) = piece.split_at(closing_end(piece.text, at));
                        declaration
                            .lines
                            .push((head, declaration.depth));
                        if let Some(declaration) = current.take() {
                            count += emit(&mut output, &declaration, at, classifier);
                        }
                        // with nothing after the marker, the ending went out
                        // with the declaration
                        rest = tail;
                    }
                    None => {
                        declaration
                            .lines
                            .push((piece, declaration.depth));
                        declaration.depth = result.depth;
                    }
                }
                continue;
            }

            match Element::locate(piece.text) {
                Some((_, from)) => {
                    let (before, opener) = piece.split_at(from);
                    match opener {
                        Some(opener) => {
                            output.push_str(before.text);
                            rest = Some(opener);
                        }
                        None => rest = Some(before),
                    }
                    current = Some(Declaration {
                        indent: line.indent(),
                        lines: Vec::new(),
                        depth: 0,
                    });
                }
                None => {
                    output.push_str(piece.text);
                    output.push_str(piece.ending);
                }
            }
        }
    }

    // a declaration still open at the end is left as it was
    if let Some(declaration) = current {
        for (line, _) in &declaration.lines {
            output.push_str(line.text);
            output.push_str(line.ending);
        }
    }

    debug!(
        "Added {} handler{}",
        count,
        if count == 1 { "" } else { "s" }
    );

    output
}

// Write out a complete declaration, with a handler added if needed. `at` is
// the offset of the closing marker on the last line. Returns the number of
// handlers added.
fn emit(output: &mut String, declaration: &Declaration, at: usize, classifier: &Classifier) -> usize {
    let category = classifier.classify(declaration.identifier());

    let handler = match category.handler() {
        Some(handler) if !declaration.has_blur() => handler,
        _ => {
            for (line, _) in &declaration.lines {
                output.push_str(line.text);
                output.push_str(line.ending);
            }
            return 0;
        }
    };

    debug!(?category, identifier = ?declaration.identifier(), "Adding onBlur");

    let attribute = format!("onBlur={}", handler);

    match declaration
        .lines
        .as_slice()
    {
        [(line, _)] => {
            // all on one line: put the handler just before the tag closes
            let head = line.text[..at].trim_end();
            let tail = &line.text[at..];
            output.push_str(head);
            output.push(' ');
            output.push_str(&attribute);
            if tail.starts_with("/>") {
                output.push(' ');
            }
            output.push_str(tail);
            output.push_str(line.ending);
        }
        [(first, _), rest @ ..] => {
            // across several lines: a new attribute line right after the opener
            let indent = match rest.first() {
                Some((next, _))
                    if !next
                        .text
                        .trim_start()
                        .starts_with(['/', '>']) =>
                {
                    next.indent()
                        .to_string()
                }
                _ => format!("{}  ", declaration.indent),
            };

            output.push_str(first.text);
            output.push_str(first.ending);
            output.push_str(&indent);
            output.push_str(&attribute);
            output.push_str(first.successor_ending());
            for (line, _) in rest {
                output.push_str(line.text);
                output.push_str(line.ending);
            }
        }
        [] => return 0,
    }

    1
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::parsing::parse;

    #[test]
    fn classification() {
        let classifier = Classifier::builtin();

        assert_eq!(classifier.classify(Some("homepageURL")), Category::Reference);
        assert_eq!(classifier.classify(Some("createdDate")), Category::Date);
        assert_eq!(classifier.classify(Some("keywords")), Category::Composite);
        assert_eq!(classifier.classify(Some("title")), Category::Generic);
        assert_eq!(classifier.classify(None), Category::Generic);

        // exact matches only
        assert_eq!(classifier.classify(Some("homepage")), Category::Generic);
        assert_eq!(classifier.classify(Some("sourceInputs")), Category::Generic);
    }

    #[test]
    fn single_line_declarations() {
        let classifier = Classifier::builtin();
        let document = parse(
            r#"<input id="title" value={title} />
<input id="homepageURL" />
<textarea id="description" rows="3"></textarea>
"#,
        );

        let result = annotate(&document, &classifier);
        assert_eq!(
            result,
            r#"<input id="title" value={title} onBlur={validateRegularInput} />
<input id="homepageURL" onBlur={validateIriInput} />
<textarea id="description" rows="3" onBlur={validateRegularInput}></textarea>
"#
        );
    }

    #[test]
    fn multiple_line_declaration() {
        let classifier = Classifier::builtin();
        let document = parse(
            r#"    <input
      type="text"
      id="sourceInput"
      onChange={(e) => {
        if (a > b) setSourceInput(e.target.value);
      }}
    />
"#,
        );

        let result = annotate(&document, &classifier);
        assert_eq!(
            result,
            r#"    <input
      onBlur={validateIriInput}
      type="text"
      id="sourceInput"
      onChange={(e) => {
        if (a > b) setSourceInput(e.target.value);
      }}
    />
"#
        );
    }

    #[test]
    fn name_used_without_id() {
        let classifier = Classifier::builtin();
        let document = parse("<input name=\"category\" />");

        let result = annotate(&document, &classifier);
        assert_eq!(result, "<input name=\"category\" onBlur={validateIriInput} />");
    }

    #[test]
    fn several_declarations_on_one_line() {
        let classifier = Classifier::builtin();
        let document = parse(
            "<label><input name=\"a\" /> A</label><label><input name=\"b\" /> B</label>\r\n",
        );

        assert_eq!(
            annotate(&document, &classifier),
            "<label><input name=\"a\" onBlur={validateRegularInput} /> A</label><label><input name=\"b\" onBlur={validateRegularInput} /> B</label>\r\n"
        );
    }

    #[test]
    fn declaration_closing_before_another_opens() {
        let classifier = Classifier::builtin();
        let document = parse(
            r#"<input
  id="homepageURL"
/><input id="createdDate" /><textarea id="notes"></textarea>
"#,
        );

        assert_eq!(
            annotate(&document, &classifier),
            r#"<input
  onBlur={validateIriInput}
  id="homepageURL"
/><input id="createdDate" /><textarea id="notes" onBlur={validateRegularInput}></textarea>
"#
        );
    }

    #[test]
    fn unterminated_declaration_left_alone() {
        let classifier = Classifier::builtin();
        let content = "<input\n  id=\"title\"\n";
        let document = parse(content);

        assert_eq!(annotate(&document, &classifier), content);
    }
}
