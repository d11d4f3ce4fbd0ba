//! Per-field rewriting rules: how to recognize a field's element declaration
//! and what to do to the attributes found inside it.

use std::collections::HashSet;

use crate::language::{Closing, Element, RuleError};
use crate::matching;

mod builtin;

/// What happens to an attribute the declaration already has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Keep,
    Replace(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    pub attribute: String,
    pub action: Action,
    /// Value to add just before the tag closes if nothing in the
    /// declaration mentioned the attribute.
    pub fallback: Option<String>,
}

impl Transform {
    pub fn keep(attribute: &str) -> Transform {
        Transform {
            attribute: attribute.to_string(),
            action: Action::Keep,
            fallback: None,
        }
    }

    pub fn replace(attribute: &str, value: String) -> Transform {
        Transform {
            attribute: attribute.to_string(),
            action: Action::Replace(value),
            fallback: None,
        }
    }

    /// Replace if present, add if absent.
    pub fn set(attribute: &str, value: String) -> Transform {
        Transform {
            attribute: attribute.to_string(),
            action: Action::Replace(value.clone()),
            fallback: Some(value),
        }
    }

    /// Leave alone if present, add if absent.
    pub fn ensure(attribute: &str, value: String) -> Transform {
        Transform {
            attribute: attribute.to_string(),
            action: Action::Keep,
            fallback: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: String,
    pub element: Element,
    pub closing: Closing,
    pub transforms: Vec<Transform>,
}

impl FieldRule {
    /// Does this line begin the declaration of this rule's field? `opened`
    /// is the element whose tag is open at this point, either because it
    /// was opened on this very line or on one before it.
    pub fn enters(&self, identifier: Option<&str>, opened: Option<Element>) -> bool {
        identifier == Some(self.field.as_str()) && opened == Some(self.element)
    }
}

/// A line level substitution made outside of any field's span. With a
/// context, it only applies when the previous input line contains that
/// context marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub context: Option<String>,
    pub find: String,
    pub replace: String,
}

impl Decoration {
    pub fn applies(&self, line: &str, previous: Option<&str>) -> bool {
        if !matching::contains(line, &self.find) {
            return false;
        }
        match &self.context {
            None => true,
            Some(context) => previous
                .map(|text| matching::contains(text, context))
                .unwrap_or(false),
        }
    }

    pub fn apply(&self, line: &str) -> String {
        line.replace(self.find.as_str(), &self.replace)
    }
}

/// The set of rules one rewrite pass works from. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<FieldRule>,
    decorations: Vec<Decoration>,
}

impl RuleTable {
    pub fn new(rules: Vec<FieldRule>, decorations: Vec<Decoration>) -> Result<RuleTable, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if rule
                .field
                .is_empty()
            {
                return Err(RuleError::EmptyField);
            }
            if !seen.insert(
                rule.field
                    .as_str(),
            ) {
                return Err(RuleError::DuplicateField(
                    rule.field
                        .clone(),
                ));
            }
        }

        Ok(RuleTable { rules, decorations })
    }

    /// The table compiled into the tools.
    pub fn builtin() -> Result<RuleTable, RuleError> {
        RuleTable::new(builtin::rules(), builtin::decorations())
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn get(&self, index: usize) -> Option<&FieldRule> {
        self.rules
            .get(index)
    }

    /// Index of the first rule whose entry this line is. Table order decides
    /// if more than one could match.
    pub fn entered_by(&self, identifier: Option<&str>, opened: Option<Element>) -> Option<usize> {
        identifier?;
        self.rules
            .iter()
            .position(|rule| rule.enters(identifier, opened))
    }

    /// The first decoration applicable to this line.
    pub fn decoration_for(&self, line: &str, previous: Option<&str>) -> Option<&Decoration> {
        self.decorations
            .iter()
            .find(|decoration| decoration.applies(line, previous))
    }
}
