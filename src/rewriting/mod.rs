//! The field-scoped rewriting engine

mod engine;
mod span;

pub use engine::{rewrite, Rewriter};
pub use span::{Open, Pending, Span};
