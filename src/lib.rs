//! Rewrite form markup to carry validation attributes, and audit which of
//! its fields lack instructional text.

pub mod annotating;
pub mod comparing;
pub mod language;
pub mod matching;
pub mod parsing;
pub mod rewriting;
pub mod rules;
