//! Loading markup documents and splitting them into lines

use std::path::Path;
use tracing::debug;

use crate::language::{Document, Line, LoadingError};

/// Read a file and return an owned String. We pass that ownership back to the
/// main function so that the Document object created by parse() below can
/// borrow from it.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    match std::fs::read_to_string(filename) {
        Ok(content) => Ok(content),
        Err(error) => {
            debug!(?error);
            match error.kind() {
                std::io::ErrorKind::NotFound => Err(LoadingError {
                    problem: "File not found".to_string(),
                    details: String::new(),
                    filename,
                }),
                _ => Err(LoadingError {
                    problem: "Failed reading".to_string(),
                    details: error
                        .kind()
                        .to_string(),
                    filename,
                }),
            }
        }
    }
}

/// Split text into lines, each keeping the terminator it had so that output
/// can be line-terminated identically to the input.
pub fn parse(content: &str) -> Document<'_> {
    let mut lines = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        match rest.find('\n') {
            Some(i) => {
                let (text, ending) = if i > 0 && rest.as_bytes()[i - 1] == b'\r' {
                    (&rest[..i - 1], &rest[i - 1..=i])
                } else {
                    (&rest[..i], &rest[i..=i])
                };
                lines.push(Line { text, ending });
                rest = &rest[i + 1..];
            }
            None => {
                lines.push(Line {
                    text: rest,
                    ending: "",
                });
                rest = "";
            }
        }
    }

    debug!(
        "Split {} line{}",
        lines.len(),
        if lines.len() == 1 { "" } else { "s" }
    );

    Document { lines }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn splitting_keeps_terminators() {
        let content = "one\ntwo\r\nthree";
        let document = parse(content);

        assert_eq!(document.len(), 3);
        assert_eq!(
            document.lines[0],
            Line {
                text: "one",
                ending: "\n"
            }
        );
        assert_eq!(
            document.lines[1],
            Line {
                text: "two",
                ending: "\r\n"
            }
        );
        assert_eq!(
            document.lines[2],
            Line {
                text: "three",
                ending: ""
            }
        );

        assert_eq!(document.text(), content);
    }

    #[test]
    fn empty_and_blank_lines() {
        let document = parse("");
        assert!(document.is_empty());

        let document = parse("\n\n");
        assert_eq!(document.len(), 2);
        assert_eq!(document.lines[1].text, "");
        assert_eq!(document.text(), "\n\n");
    }

    #[test]
    fn missing_file() {
        let path = Path::new("tests/samples/does-not-exist.jsx");
        let error = load(path).unwrap_err();
        assert_eq!(error.problem, "File not found");
        assert_eq!(error.filename, path);
    }
}
