use std::{fmt, path::Path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingError<'i> {
    pub problem: String,
    pub details: String,
    pub filename: &'i Path,
}

impl<'i> fmt::Display for LoadingError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self
            .details
            .is_empty()
        {
            write!(f, "{}", self.problem)
        } else {
            write!(f, "{}: {}", self.problem, self.details)
        }
    }
}

impl<'i> std::error::Error for LoadingError<'i> {}

/// Problems with a compiled-in rule table. These are configuration mistakes
/// and are reported when the table is constructed, never mid-rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    DuplicateField(String),
    EmptyField,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::DuplicateField(field) => {
                write!(f, "field '{}' has more than one rule", field)
            }
            RuleError::EmptyField => write!(f, "rule with an empty field identifier"),
        }
    }
}

impl std::error::Error for RuleError {}
