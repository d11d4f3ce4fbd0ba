use fieldguard::language::{LoadingError, RuleError};
use owo_colors::OwoColorize;

/// Format a LoadingError with concise single-line output
pub fn concise_loading_error<'i>(error: &LoadingError<'i>) -> String {
    let problem = if error
        .details
        .is_empty()
    {
        error
            .problem
            .clone()
    } else {
        format!("{} ({})", error.problem, error.details)
    };

    format!(
        "{}: {}: {}",
        "error".bright_red(),
        error
            .filename
            .display(),
        problem.bold()
    )
}

/// Format a problem with the compiled-in rules
pub fn concise_rule_error(error: &RuleError) -> String {
    format!(
        "{}: {}",
        "error".bright_red(),
        error
            .to_string()
            .bold()
    )
}
