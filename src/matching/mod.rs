//! Recognizing things on individual lines of markup. Nothing here carries
//! state between calls; a missing match is a normal result, not an error.

use regex::Regex;

mod cache;
mod scan;

pub use scan::*;

/// Literal substring test.
pub fn contains(line: &str, needle: &str) -> bool {
    line.contains(needle)
}

/// The first capture group of the pattern, if the line matches it.
pub fn capture<'i>(line: &'i str, re: &Regex) -> Option<&'i str> {
    re.captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Every value of the first capture group across the text.
pub fn captures<'i>(text: &'i str, re: &Regex) -> Vec<&'i str> {
    re.captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .collect()
}

// Word boundaries keep `aria-invalid=` and `className=` from matching.
fn id_pattern() -> &'static Regex {
    crate::regex!(r#"\bid\s*=\s*["']([\w:-]+)["']"#)
}

fn name_pattern() -> &'static Regex {
    crate::regex!(r#"\bname\s*=\s*["']([\w:-]+)["']"#)
}

/// The quoted value bound to an `id` attribute on this line.
pub fn identifier(line: &str) -> Option<&str> {
    capture(line, id_pattern())
}

/// The quoted value bound to a `name` attribute on this line.
pub fn name(line: &str) -> Option<&str> {
    capture(line, name_pattern())
}

/// Every `id` value in the text, followed by every `name` value.
pub fn identifiers(text: &str) -> Vec<&str> {
    let mut result = captures(text, id_pattern());
    result.extend(captures(text, name_pattern()));
    result
}
