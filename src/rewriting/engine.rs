//! Rewriting the declarations of the fields named in a rule table

use tracing::{debug, warn};

use super::span::{Open, Pending, Span, Tracker};
use crate::language::{Closing, Document, Element, Line};
use crate::matching::{self, attribute, closing_end, scan};
use crate::rules::{Action, FieldRule, RuleTable};

/// Rewrite a whole document. Lines outside of any recognized field's
/// declaration come through untouched unless a decoration applies to them.
pub fn rewrite(document: &Document, table: &RuleTable) -> String {
    let mut rewriter = Rewriter::new(table);

    for line in &document.lines {
        rewriter.step(*line);
    }

    rewriter.finish()
}

/// A single forward pass over a document, one line at a time. A line may
/// close one declaration and go on to hold others; it is worked through in
/// pieces, each picking up after the previous one's closing marker.
pub struct Rewriter<'t, 'i> {
    table: &'t RuleTable,
    tracker: Tracker<'i>,
    previous: Option<&'i str>,
    newline: &'i str,
    output: String,
}

// What consuming one piece of a line inside a span came to.
enum Outcome<'i> {
    Continue,
    Closed {
        rewritten: String,
        at: usize,
        from: usize,
        ending: &'i str,
        remainder: Option<Line<'i>>,
    },
}

impl<'t, 'i> Rewriter<'t, 'i> {
    pub fn new(table: &'t RuleTable) -> Rewriter<'t, 'i> {
        Rewriter {
            table,
            tracker: Tracker::new(),
            previous: None,
            newline: "\n",
            output: String::new(),
        }
    }

    /// The field whose declaration is currently open, if any.
    pub fn current(&self) -> Option<&'t str> {
        self.tracker
            .current()
            .and_then(|index| {
                self.table
                    .get(index)
            })
            .map(|rule| {
                rule.field
                    .as_str()
            })
    }

    pub fn step(&mut self, line: Line<'i>) {
        let previous = self.previous;
        self.previous = Some(line.text);
        self.newline = line.successor_ending();

        let mut rest = Some(line);
        while let Some(piece) = rest {
            rest = self.piece(piece, previous);
        }
    }

    /// Flush anything still in progress and return the rewritten text.
    pub fn finish(mut self) -> String {
        match self
            .tracker
            .reset()
        {
            Span::Open(open) => self.abandon(open),
            Span::Pending(pending) => self.release(pending),
            Span::Closed => {}
        }
        self.output
    }

    // Handle one piece of a line, returning whatever follows a closing
    // marker within it.
    fn piece(&mut self, line: Line<'i>, previous: Option<&'i str>) -> Option<Line<'i>> {
        let interrupted = match self
            .tracker
            .span()
        {
            Span::Open(open) => {
                let deep = open.swallowing || open.depth > 0;
                !deep && self.interrupts(open.rule, line.text)
            }
            _ => return self.outside(line, previous),
        };

        if interrupted {
            // a new element began before the open one closed
            if let Some(open) = self
                .tracker
                .close()
            {
                self.abandon(open);
            }
            self.outside(line, previous)
        } else {
            self.consume(line, 0)
        }
    }

    // Does an opening tag on this line come before the open field's tag
    // closes?
    fn interrupts(&self, rule: usize, text: &str) -> bool {
        let Some((_, i)) = Element::locate(text) else {
            return false;
        };
        let closing = self
            .table
            .get(rule)
            .map(|rule| rule.closing)
            .unwrap_or(Closing::SelfClosing);

        match scan(text, 0, 0, closing).closing {
            Some(at) => i < at,
            None => true,
        }
    }

    fn outside(&mut self, line: Line<'i>, previous: Option<&'i str>) -> Option<Line<'i>> {
        let text = line.text;
        let here = Element::locate(text);

        if here.is_some() {
            // a second opening tag means the pending one never named a field
            if let Some(pending) = self
                .tracker
                .unpend()
            {
                self.release(pending);
            }
        }

        let (opened, start, depth) = match (here, self.tracker.span()) {
            (Some((element, i)), _) => (Some(element), i, 0),
            (None, Span::Pending(pending)) => (Some(pending.element), 0, pending.depth),
            _ => (None, 0, 0),
        };

        // only the declaration being opened can name the field
        let close = opened
            .and_then(|_| scan(text, start, depth, Closing::TagEnd).closing)
            .map(|at| closing_end(text, at));
        let scope = &text[start..close.unwrap_or(text.len())];

        if let Some(index) = self
            .table
            .entered_by(matching::identifier(scope), opened)
        {
            let held = self
                .tracker
                .unpend();
            return self.enter(index, held, line, here.map(|(_, i)| i));
        }

        if let Some(pending) = self
            .tracker
            .pending_mut()
        {
            let result = scan(text, 0, pending.depth, Closing::TagEnd);
            let Some(at) = result.closing else {
                pending
                    .lines
                    .push((line, previous));
                pending.depth = result.depth;
                return None;
            };

            let (head, rest) = line.split_at(closing_end(text, at));
            pending
                .lines
                .push((head, previous));
            if let Some(pending) = self
                .tracker
                .unpend()
            {
                self.release(pending);
            }
            return rest;
        }

        if let Some((element, i)) = here {
            let result = scan(text, i, 0, Closing::TagEnd);
            let Some(at) = result.closing else {
                self.tracker
                    .pend(Pending {
                        element,
                        depth: result.depth,
                        from: i,
                        lines: vec![(line, previous)],
                    });
                return None;
            };

            let (head, rest) = line.split_at(closing_end(text, at));
            self.pass(head, previous);
            return rest;
        }

        self.pass(line, previous);
        None
    }

    fn enter(
        &mut self,
        index: usize,
        held: Option<Pending<'i>>,
        line: Line<'i>,
        from: Option<usize>,
    ) -> Option<Line<'i>> {
        let table = self.table;
        let Some(rule) = table.get(index) else {
            self.pass(line, None);
            return None;
        };

        debug!("Entering {} '{}'", rule.element.name(), rule.field);

        if let Some(open) = self
            .tracker
            .open(
                index,
                rule.transforms
                    .len(),
            )
        {
            self.abandon(open);
        }

        match held {
            Some(pending) => {
                // held lines never close the tag, or they would not be held
                let mut from = pending.from;
                for (held, _) in pending.lines {
                    self.consume(held, from);
                    from = 0;
                }
                self.consume(line, 0)
            }
            None => self.consume(line, from.unwrap_or(0)),
        }
    }

    fn consume(&mut self, line: Line<'i>, from: usize) -> Option<Line<'i>> {
        if self
            .tracker
            .current()
            .is_none()
        {
            self.pass(line, None);
            return None;
        }

        let table = self.table;
        let open = self
            .tracker
            .open_mut()?;
        let rule = table.get(open.rule)?;

        match advance(open, rule, line, from) {
            Outcome::Continue => None,
            Outcome::Closed {
                rewritten,
                at,
                from,
                ending,
                remainder,
            } => {
                if let Some(open) = self
                    .tracker
                    .close()
                {
                    self.complete(open, rule, rewritten, at, from, ending);
                }
                remainder
            }
        }
    }

    fn complete(&mut self, open: Open<'i>, rule: &FieldRule, rewritten: String, at: usize, from: usize, ending: &str) {
        let missing: Vec<String> = rule
            .transforms
            .iter()
            .zip(&open.seen)
            .filter(|(_, seen)| !**seen)
            .filter_map(|(transform, _)| {
                transform
                    .fallback
                    .as_ref()
                    .map(|value| format!("{}={}", transform.attribute, value))
            })
            .collect();

        let mut output = open.output;

        if missing.is_empty() {
            output.push_str(&rewritten);
        } else if rewritten[from..at]
            .trim()
            .is_empty()
        {
            // closing marker on a line of its own; put additions above it
            let indent = match open.indent {
                Some(indent) => indent,
                None => format!("{}  ", indentation(&rewritten)),
            };
            for addition in &missing {
                output.push_str(&indent);
                output.push_str(addition);
                output.push_str(self.newline);
            }
            output.push_str(&rewritten);
        } else {
            let head = rewritten[..at].trim_end();
            let tail = &rewritten[at..];
            let gap = if tail.starts_with("/>") { " " } else { "" };
            output.push_str(head);
            output.push(' ');
            output.push_str(&missing.join(" "));
            output.push_str(gap);
            output.push_str(tail);
        }
        output.push_str(ending);

        debug!(added = missing.len(), "Closed '{}'", rule.field);

        self.output
            .push_str(&output);
    }

    // Outside of any span: decorate, or copy through unchanged.
    fn pass(&mut self, line: Line<'i>, previous: Option<&'i str>) {
        match self
            .table
            .decoration_for(line.text, previous)
        {
            Some(decoration) => {
                debug!("Decorating '{}'", decoration.find);
                self.output
                    .push_str(&decoration.apply(line.text));
            }
            None => {
                self.output
                    .push_str(line.text);
            }
        }
        self.output
            .push_str(line.ending);
    }

    // Held back lines that turned out not to be a field's declaration.
    fn release(&mut self, pending: Pending<'i>) {
        for (line, previous) in pending.lines {
            self.pass(line, previous);
        }
    }

    // A span that never closed: emit what it consumed exactly as it was.
    fn abandon(&mut self, open: Open<'i>) {
        let field = self
            .table
            .get(open.rule)
            .map(|rule| {
                rule.field
                    .as_str()
            })
            .unwrap_or("?");
        warn!(
            "Declaration of '{}' never closed; leaving its {} line{} unchanged",
            field,
            open.lines
                .len(),
            if open
                .lines
                .len()
                == 1
            {
                ""
            } else {
                "s"
            }
        );

        for line in open.lines {
            self.output
                .push_str(line.text);
            self.output
                .push_str(line.ending);
        }
    }
}

// Take one piece of a line inside an open span. Only the part up to the
// closing marker, if there is one, belongs to the span.
fn advance<'i>(open: &mut Open<'i>, rule: &FieldRule, line: Line<'i>, from: usize) -> Outcome<'i> {
    open.lines
        .push(line);

    let mut lead = "";
    let mut body = line;
    let mut from = from;

    if open.swallowing {
        match matching::expression_end(line.text, open.depth) {
            None => {
                open.depth = matching::depth_after(line.text, open.depth);
                return Outcome::Continue;
            }
            Some(k) => {
                open.swallowing = false;
                open.depth = 0;
                let rest = line.text[k..].trim_start();
                if rest.is_empty() {
                    return Outcome::Continue;
                }
                lead = line.indent();
                body = Line {
                    text: rest,
                    ending: line.ending,
                };
                from = 0;
            }
        }
    }

    let result = scan(body.text, from, open.depth, rule.closing);
    let (piece, remainder) = match result.closing {
        Some(at) => body.split_at(closing_end(body.text, at)),
        None => (body, None),
    };

    let (rewritten, swallow) = transform(rule, piece.text, from, open.depth, &mut open.seen);
    let rewritten = format!("{}{}", lead, rewritten);

    let trimmed = rewritten.trim_start();
    if !trimmed.is_empty() && !trimmed.starts_with(['<', '/', '>']) {
        open.indent = Some(indentation(&rewritten).to_string());
    }

    if swallow {
        open.swallowing = true;
        open.depth = matching::depth_after(&piece.text[from..], open.depth);
        open.output
            .push_str(&rewritten);
        open.output
            .push_str(piece.ending);
        return Outcome::Continue;
    }

    match result.closing {
        Some(at) => {
            // the piece ends with the marker, which no transform touches
            let marker = piece
                .text
                .len()
                - at;
            Outcome::Closed {
                at: rewritten.len() - marker,
                from: lead.len() + from,
                ending: piece.ending,
                remainder,
                rewritten,
            }
        }
        None => {
            open.depth = result.depth;
            open.output
                .push_str(&rewritten);
            open.output
                .push_str(piece.ending);
            Outcome::Continue
        }
    }
}

/// Apply every transform whose attribute the line declares. Returns the new
/// text, and whether a replaced value ran on past the end of the line (in
/// which case the rest of the old value must be dropped from what follows).
fn transform(rule: &FieldRule, text: &str, from: usize, depth: usize, seen: &mut [bool]) -> (String, bool) {
    let mut current = text.to_string();
    let mut swallow = false;

    for (i, transform) in rule
        .transforms
        .iter()
        .enumerate()
    {
        let Some(found) = attribute(&current, &transform.attribute, from, depth) else {
            continue;
        };
        if let Some(flag) = seen.get_mut(i) {
            *flag = true;
        }

        match &transform.action {
            Action::Keep => {}
            Action::Replace(value) => {
                debug!(
                    attribute = %transform.attribute,
                    was = found.text(&current),
                    "Replacing"
                );
                match found.end {
                    Some(end) => {
                        current = format!("{}{}{}", &current[..found.value], value, &current[end..]);
                    }
                    None => {
                        current = format!("{}{}", &current[..found.value], value);
                        swallow = true;
                    }
                }
            }
        }
    }

    (current, swallow)
}

fn indentation(text: &str) -> &str {
    let trimmed = text.trim_start();
    &text[..text.len() - trimmed.len()]
}
