//! Types representing a markup document as a sequence of lines

/// A markup document, borrowed from the text it was split from. Nothing here
/// is ever changed in place; the tools build a new output String instead.
#[derive(Eq, Debug, PartialEq)]
pub struct Document<'i> {
    pub lines: Vec<Line<'i>>,
}

impl<'i> Document<'i> {
    pub fn len(&self) -> usize {
        self.lines
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines
            .is_empty()
    }

    /// Reassemble the original text. Each line carries its own terminator
    /// so this is byte-for-byte what was parsed.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for line in &self.lines {
            result.push_str(line.text);
            result.push_str(line.ending);
        }
        result
    }
}

#[derive(Eq, Debug, PartialEq, Clone, Copy)]
pub struct Line<'i> {
    pub text: &'i str,
    pub ending: &'i str, // "\n", "\r\n", or "" on an unterminated last line
}

impl<'i> Line<'i> {
    /// The terminator to use for a line inserted after this one.
    pub fn successor_ending(&self) -> &'i str {
        if self
            .ending
            .is_empty()
        {
            "\n"
        } else {
            self.ending
        }
    }

    /// Divide the line at a byte offset. The first part carries no
    /// terminator; the rest, if there is any, keeps the line's own.
    pub fn split_at(&self, at: usize) -> (Line<'i>, Option<Line<'i>>) {
        if at >= self
            .text
            .len()
        {
            return (*self, None);
        }
        (
            Line {
                text: &self.text[..at],
                ending: "",
            },
            Some(Line {
                text: &self.text[at..],
                ending: self.ending,
            }),
        )
    }

    /// Leading whitespace of this line.
    pub fn indent(&self) -> &'i str {
        let trimmed = self
            .text
            .trim_start();
        &self.text[..self.text.len() - trimmed.len()]
    }
}

/// The kinds of form element whose declarations the tools recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Input,
    Textarea,
}

impl Element {
    pub fn name(&self) -> &'static str {
        match self {
            Element::Input => "input",
            Element::Textarea => "textarea",
        }
    }

    /// The opening tag, ie `<input`
    pub fn opener(&self) -> &'static str {
        match self {
            Element::Input => "<input",
            Element::Textarea => "<textarea",
        }
    }

    /// Which element, if any, is opened first on this line, and where.
    pub fn locate(text: &str) -> Option<(Element, usize)> {
        [Element::Input, Element::Textarea]
            .into_iter()
            .filter_map(|element| {
                let opener = element.opener();
                text.match_indices(opener)
                    .map(|(i, _)| i)
                    .find(|i| {
                        // "<input" must not be a prefix of some longer tag name
                        !text[i + opener.len()..].starts_with(|c: char| c.is_ascii_alphanumeric())
                    })
                    .map(|i| (element, i))
            })
            .min_by_key(|(_, i)| *i)
    }
}

/// How the declaration of an element is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    SelfClosing, // "/>"
    TagEnd,      // ">", as with <textarea ...></textarea>
}
