//! Lexical walking of markup lines: where the `{ }` expressions are, where
//! quoted strings are, and where an element's opening tag ends.

use crate::language::Closing;

/// Result of walking (part of) a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan {
    /// Expression nesting at the end of the line, or at the closing marker
    /// if one was found.
    pub depth: usize,
    /// Byte offset of the tag-closing marker, if it was on this line.
    pub closing: Option<usize>,
}

/// An attribute declaration found on a line. All offsets are bytes into the
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub start: usize,
    pub value: usize,
    /// One past the end of the value, or None if the value is an expression
    /// that carries on past the end of the line.
    pub end: Option<usize>,
}

impl Attribute {
    /// The value as written, delimiters included.
    pub fn text<'i>(&self, line: &'i str) -> &'i str {
        match self.end {
            Some(end) => &line[self.value..end],
            None => &line[self.value..],
        }
    }
}

// What the walk is inside of, innermost last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Quote(u8),
    Template,
    // `${ }` within a template literal, with its own brace nesting
    Interpolation(usize),
}

// For every byte of the line, the expression depth it sits at, or None if it
// is inside a string (quoted or template literal). Braces are recorded at the
// depth outside them, so the `{` and `}` delimiting a top level attribute
// value are both at 0.
fn layout(line: &str, depth: usize) -> (Vec<Option<usize>>, usize) {
    let bytes = line.as_bytes();
    let mut depths = Vec::with_capacity(bytes.len());
    let mut depth = depth;
    let mut stack: Vec<Context> = Vec::new();
    let mut escaped = false;

    for (i, &b) in bytes
        .iter()
        .enumerate()
    {
        match stack.last_mut() {
            None => match b {
                b'"' | b'\'' => {
                    stack.push(Context::Quote(b));
                    depths.push(Some(depth));
                }
                b'`' => {
                    stack.push(Context::Template);
                    depths.push(Some(depth));
                }
                b'{' => {
                    depths.push(Some(depth));
                    depth += 1;
                }
                b'}' => {
                    depth = depth.saturating_sub(1);
                    depths.push(Some(depth));
                }
                _ => depths.push(Some(depth)),
            },
            Some(Context::Quote(q)) => {
                let q = *q;
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == q {
                    stack.pop();
                }
                depths.push(closed(&stack, depth));
            }
            Some(Context::Template) => {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'`' {
                    stack.pop();
                } else if b == b'$' && bytes.get(i + 1) == Some(&b'{') {
                    stack.push(Context::Interpolation(0));
                }
                depths.push(closed(&stack, depth));
            }
            Some(Context::Interpolation(nesting)) => {
                match b {
                    b'{' => *nesting += 1,
                    b'}' => {
                        *nesting = nesting.saturating_sub(1);
                        if *nesting == 0 {
                            stack.pop();
                        }
                    }
                    b'"' | b'\'' => stack.push(Context::Quote(b)),
                    b'`' => stack.push(Context::Template),
                    _ => {}
                }
                depths.push(None);
            }
        }
    }

    (depths, depth)
}

// The closing delimiter of a top level string sits at the surrounding depth;
// anything still within a string has none.
fn closed(stack: &[Context], depth: usize) -> Option<usize> {
    if stack.is_empty() {
        Some(depth)
    } else {
        None
    }
}

/// Offset just past the tag-closing marker found at `at`.
pub fn closing_end(line: &str, at: usize) -> usize {
    if line[at..].starts_with("/>") {
        at + 2
    } else {
        at + 1
    }
}

/// Walk the line starting at byte offset `from`, entering at the given
/// expression depth, looking for the marker that closes an opening tag.
/// Markers inside `{ }` expressions or quoted strings don't count, which is
/// what keeps `(e) => ...` handlers from ending a declaration.
pub fn scan(line: &str, from: usize, depth: usize, closing: Closing) -> Scan {
    let region = &line[from..];
    let bytes = region.as_bytes();
    let (depths, last) = layout(region, depth);

    for (i, d) in depths
        .iter()
        .enumerate()
    {
        if *d != Some(0) {
            continue;
        }
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Scan {
                    depth: 0,
                    closing: Some(from + i),
                };
            }
            b'>' if closing == Closing::TagEnd => {
                if i > 0 && bytes[i - 1] == b'=' {
                    continue;
                }
                return Scan {
                    depth: 0,
                    closing: Some(from + i),
                };
            }
            _ => {}
        }
    }

    Scan {
        depth: last,
        closing: None,
    }
}

/// Locate the declaration `name=` at the top level of the line (not inside
/// an expression or string, and preceded by whitespace or the start of the
/// search region).
pub fn attribute(line: &str, name: &str, from: usize, depth: usize) -> Option<Attribute> {
    if name.is_empty() {
        return None;
    }

    let region = &line[from..];
    let bytes = region.as_bytes();
    let (depths, _) = layout(region, depth);

    let mut search = 0;
    while let Some(found) = region[search..].find(name) {
        let i = search + found;
        search = i + name.len();

        if depths.get(i) != Some(&Some(0)) {
            continue;
        }
        if i > 0 && !bytes[i - 1].is_ascii_whitespace() {
            continue;
        }

        let mut j = i + name.len();
        while bytes
            .get(j)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            continue;
        }
        j += 1;
        while bytes
            .get(j)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            j += 1;
        }
        if j >= bytes.len() {
            continue;
        }

        let end = value_end(bytes, &depths, j);

        return Some(Attribute {
            start: from + i,
            value: from + j,
            end: end.map(|e| from + e),
        });
    }

    None
}

fn value_end(bytes: &[u8], depths: &[Option<usize>], j: usize) -> Option<usize> {
    match bytes.get(j) {
        Some(&q) if q == b'"' || q == b'\'' => (j + 1..bytes.len())
            .find(|&k| bytes[k] == q && depths[k].is_some())
            .map(|k| k + 1),
        Some(b'{') => {
            let base = depths[j];
            (j + 1..bytes.len())
                .find(|&k| bytes[k] == b'}' && depths[k] == base)
                .map(|k| k + 1)
        }
        Some(_) => {
            let end = (j..bytes.len())
                .find(|&k| {
                    bytes[k].is_ascii_whitespace()
                        || bytes[k] == b'>'
                        || (bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>'))
                })
                .unwrap_or(bytes.len());
            Some(end)
        }
        None => None,
    }
}

/// Does the line declare the named attribute at its top level?
pub fn declares(line: &str, name: &str, depth: usize) -> bool {
    attribute(line, name, 0, depth).is_some()
}

/// For a line that begins inside an expression `depth` levels deep, the
/// offset just past the brace that brings it back to the top level.
pub fn expression_end(line: &str, depth: usize) -> Option<usize> {
    if depth == 0 {
        return Some(0);
    }
    let bytes = line.as_bytes();
    let (depths, _) = layout(line, depth);

    (0..bytes.len())
        .find(|&k| bytes[k] == b'}' && depths[k] == Some(0))
        .map(|k| k + 1)
}

/// Expression depth at the end of the line.
pub fn depth_after(line: &str, depth: usize) -> usize {
    layout(line, depth).1
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn closing_marker_outside_expressions() {
        let line = r#"<input id="title" onChange={(e) => set(e)} />"#;
        let result = scan(line, 0, 0, Closing::SelfClosing);
        assert_eq!(result.closing, line.find("/>"));

        let line = r#"  onChange={(e) => set(e.target.value)}"#;
        let result = scan(line, 0, 0, Closing::TagEnd);
        assert_eq!(result.closing, None);
        assert_eq!(result.depth, 0);
    }

    #[test]
    fn depth_carries_across_lines() {
        let first = "  onChange={(e) => {";
        let result = scan(first, 0, 0, Closing::SelfClosing);
        assert_eq!(result.closing, None);
        assert_eq!(result.depth, 2);

        let middle = "    if (a > b) return;";
        let result = scan(middle, 0, 2, Closing::TagEnd);
        assert_eq!(result.closing, None);
        assert_eq!(result.depth, 2);

        let last = "  }} />";
        let result = scan(last, 0, 2, Closing::SelfClosing);
        assert_eq!(result.closing, Some(5));
        assert_eq!(expression_end(last, 2), Some(4));
    }

    #[test]
    fn tag_end_for_textarea() {
        let line = r#"  rows="3"></textarea>"#;
        let result = scan(line, 0, 0, Closing::TagEnd);
        assert_eq!(result.closing, Some(10));

        // a '>' in a quoted value is not the end of the tag
        let line = r#"  placeholder="a > b">"#;
        let result = scan(line, 0, 0, Closing::TagEnd);
        assert_eq!(result.closing, Some(21));
    }

    #[test]
    fn finding_attributes() {
        let line = r#"  <input id="title" className="wide" onBlur={check} />"#;

        let found = attribute(line, "className", 0, 0).unwrap();
        assert_eq!(found.text(line), r#""wide""#);

        let found = attribute(line, "onBlur", 0, 0).unwrap();
        assert_eq!(found.text(line), "{check}");

        assert!(attribute(line, "onChange", 0, 0).is_none());
        assert!(declares(line, "id", 0));
    }

    #[test]
    fn attribute_names_must_stand_alone() {
        let line = r#"  aria-invalid="true" data-id="x""#;
        assert!(attribute(line, "id", 0, 0).is_none());

        let line = r#"  label={"className=fake"}"#;
        assert!(attribute(line, "className", 0, 0).is_none());
    }

    #[test]
    fn expression_values_running_past_the_line() {
        let line = "  onChange={(e) => {";
        let found = attribute(line, "onChange", 0, 0).unwrap();
        assert_eq!(found.end, None);
        assert_eq!(found.text(line), "{(e) => {");
    }

    #[test]
    fn template_literals_balance() {
        let line = "  className={`${titleValid ? 'form-input-valid' : ''}`} />";
        let found = attribute(line, "className", 0, 0).unwrap();
        assert_eq!(
            found.text(line),
            "{`${titleValid ? 'form-input-valid' : ''}`}"
        );
        assert_eq!(
            scan(line, 0, 0, Closing::SelfClosing).closing,
            line.find("/>")
        );
    }

    #[test]
    fn template_literal_contents_are_strings() {
        // an apostrophe inside backticks opens nothing
        let line = "  placeholder={`The KG's title`}";
        let result = scan(line, 0, 0, Closing::SelfClosing);
        assert_eq!(result.depth, 0);
        let found = attribute(line, "placeholder", 0, 0).unwrap();
        assert_eq!(found.text(line), "{`The KG's title`}");

        // nor do unbalanced braces, or a closing marker
        let line = "  title={`{ not code /> `} />";
        let result = scan(line, 0, 0, Closing::SelfClosing);
        assert_eq!(result.closing, line.rfind("/>"));

        // interpolations may hold strings and templates of their own
        let line = "  className={`a ${ok ? `b ${'}'}` : \"}\"} c`} />";
        let result = scan(line, 0, 0, Closing::SelfClosing);
        assert_eq!(result.closing, line.rfind("/>"));
        assert_eq!(depth_after(line, 0), 0);
    }

    #[test]
    fn end_of_closing_marker() {
        let line = "<input /> <textarea></textarea>";
        assert_eq!(closing_end(line, 7), 9);
        assert_eq!(closing_end(line, 19), 20);
    }
}
