use crate::language::{Element, Line};

/// Where a rewrite pass is relative to the fields in the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Span<'i> {
    /// Outside of any field's declaration, by definition the base state.
    #[default]
    Closed,
    /// Still closed, but an element's opening tag has begun on an earlier
    /// line without saying which field it is yet.
    Pending(Pending<'i>),
    /// Inside the declaration of one field.
    Open(Open<'i>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending<'i> {
    pub element: Element,
    pub depth: usize,
    /// Offset of the opening tag on the first line.
    pub from: usize,
    /// Lines held back, each with the input line that preceded it.
    pub lines: Vec<(Line<'i>, Option<&'i str>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Open<'i> {
    pub rule: usize,
    pub depth: usize,
    /// Per transform, whether the declaration mentioned its attribute.
    pub seen: Vec<bool>,
    /// Dropping the rest of an expression whose value was replaced.
    pub swallowing: bool,
    /// Indentation of the attribute lines, used for added attributes.
    pub indent: Option<String>,
    /// The input consumed so far, in case the span never closes.
    pub lines: Vec<Line<'i>>,
    /// Rewritten output, committed only when the span closes.
    pub output: String,
}

impl<'i> Open<'i> {
    fn new(rule: usize, transforms: usize) -> Open<'i> {
        Open {
            rule,
            depth: 0,
            seen: vec![false; transforms],
            swallowing: false,
            indent: None,
            lines: Vec::new(),
            output: String::new(),
        }
    }
}

/// Holds the single Span of a rewrite pass. Opening a field replaces
/// whatever was there, so two fields can never be open at once.
#[derive(Debug, Default)]
pub(crate) struct Tracker<'i> {
    span: Span<'i>,
}

impl<'i> Tracker<'i> {
    pub(crate) fn new() -> Tracker<'i> {
        Tracker { span: Span::Closed }
    }

    /// Index of the rule whose field is open, if any.
    pub(crate) fn current(&self) -> Option<usize> {
        match &self.span {
            Span::Open(open) => Some(open.rule),
            _ => None,
        }
    }

    pub(crate) fn span(&self) -> &Span<'i> {
        &self.span
    }

    /// Open the given field. Returns the span that was open before, if
    /// there was one; the caller decides what to do with its contents.
    pub(crate) fn open(&mut self, rule: usize, transforms: usize) -> Option<Open<'i>> {
        let previous = std::mem::replace(&mut self.span, Span::Open(Open::new(rule, transforms)));
        match previous {
            Span::Open(open) => Some(open),
            _ => None,
        }
    }

    pub(crate) fn open_mut(&mut self) -> Option<&mut Open<'i>> {
        match &mut self.span {
            Span::Open(open) => Some(open),
            _ => None,
        }
    }

    pub(crate) fn close(&mut self) -> Option<Open<'i>> {
        match std::mem::take(&mut self.span) {
            Span::Open(open) => Some(open),
            other => {
                self.span = other;
                None
            }
        }
    }

    pub(crate) fn pend(&mut self, pending: Pending<'i>) {
        self.span = Span::Pending(pending);
    }

    pub(crate) fn pending_mut(&mut self) -> Option<&mut Pending<'i>> {
        match &mut self.span {
            Span::Pending(pending) => Some(pending),
            _ => None,
        }
    }

    pub(crate) fn unpend(&mut self) -> Option<Pending<'i>> {
        match std::mem::take(&mut self.span) {
            Span::Pending(pending) => Some(pending),
            other => {
                self.span = other;
                None
            }
        }
    }

    /// Empty the tracker at the end of a document, handing back whatever
    /// was still in progress.
    pub(crate) fn reset(&mut self) -> Span<'i> {
        std::mem::take(&mut self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_transitions() {
        let mut tracker = Tracker::new();
        assert_eq!(tracker.current(), None);
        assert_eq!(tracker.span(), &Span::Closed);

        let previous = tracker.open(2, 3);
        assert_eq!(previous, None);
        assert_eq!(tracker.current(), Some(2));

        let open = tracker
            .open_mut()
            .unwrap();
        assert_eq!(open.seen, vec![false, false, false]);
        open.seen[1] = true;

        let closed = tracker
            .close()
            .unwrap();
        assert_eq!(closed.rule, 2);
        assert_eq!(closed.seen, vec![false, true, false]);
        assert_eq!(tracker.current(), None);

        // and if we close again, we're still closed
        assert_eq!(tracker.close(), None);
        assert_eq!(tracker.span(), &Span::Closed);
    }

    #[test]
    fn check_only_one_open() {
        let mut tracker = Tracker::new();

        tracker.open(0, 1);
        let abandoned = tracker.open(4, 1);
        assert_eq!(
            abandoned
                .unwrap()
                .rule,
            0
        );
        assert_eq!(tracker.current(), Some(4));
    }

    #[test]
    fn check_pending() {
        let mut tracker = Tracker::new();

        tracker.pend(Pending {
            element: Element::Textarea,
            depth: 0,
            from: 2,
            lines: vec![],
        });
        assert_eq!(tracker.current(), None);
        assert!(tracker
            .pending_mut()
            .is_some());

        // closing only affects open spans
        assert_eq!(tracker.close(), None);
        assert!(tracker
            .pending_mut()
            .is_some());

        let pending = tracker
            .unpend()
            .unwrap();
        assert_eq!(pending.element, Element::Textarea);
        assert_eq!(tracker.reset(), Span::Closed);
    }
}
