//! Output generation for the fieldguard command line tools

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tinytemplate::TinyTemplate;
use tracing::debug;

use fieldguard::comparing::Comparison;

static REPORT: &'static str = "IDs in {markup} but missing in {mapping}:
{{ for id in missing }}{id}
{{ endfor }}
Total missing: {total}
";

#[derive(Serialize)]
struct Context<'a> {
    markup: String,
    mapping: String,
    missing: &'a [String],
    total: usize,
}

/// Render the human readable report of identifiers lacking instructions.
pub fn report(markup: &Path, mapping: &Path, comparison: &Comparison) -> Result<String, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("report", REPORT)?;

    let context = Context {
        markup: markup
            .display()
            .to_string(),
        mapping: mapping
            .display()
            .to_string(),
        missing: &comparison.missing,
        total: comparison.total(),
    };

    tt.render("report", &context)
}

/// Write the result of a tool to standard output, exactly as given.
pub fn emit(text: &str) -> std::io::Result<()> {
    debug!("Writing {} bytes", text.len());

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes())?;
    handle.flush()
}
