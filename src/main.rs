use clap::{Arg, Command};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use fieldguard::annotating::{self, Classifier};
use fieldguard::comparing::{self, MappingShape};
use fieldguard::parsing;
use fieldguard::rewriting;
use fieldguard::rules::RuleTable;

mod output;
mod problem;

const DEFAULT_MARKUP: &str = "src/components/ModalForm.js";
const DEFAULT_MAPPING: &str = "src/fieldInstructions.js";

const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();

    match matches.subcommand() {
        Some(("rewrite", submatches)) => {
            let filename = required(submatches, "filename");
            let filename = Path::new(filename);

            let table = match RuleTable::builtin() {
                Ok(table) => table,
                Err(error) => {
                    eprintln!("{}", problem::concise_rule_error(&error));
                    std::process::exit(1);
                }
            };
            debug!(
                rules = table
                    .rules()
                    .len(),
                decorations = table
                    .decorations()
                    .len(),
                "Loaded rule table"
            );

            let content = load(filename);
            let document = parsing::parse(&content);

            info!("Rewriting {}", filename.display());
            let result = rewriting::rewrite(&document, &table);
            write(&result);
        }
        Some(("annotate", submatches)) => {
            let filename = required(submatches, "filename");
            let filename = Path::new(filename);

            let classifier = Classifier::builtin();

            let content = load(filename);
            let document = parsing::parse(&content);

            info!("Annotating {}", filename.display());
            let result = annotating::annotate(&document, &classifier);
            write(&result);
        }
        Some(("compare", submatches)) => {
            let markup = Path::new(required(submatches, "markup"));
            let mapping = Path::new(required(submatches, "mapping"));

            let markup_content = load(markup);
            let mapping_content = load(mapping);

            let comparison = comparing::compare(
                &parsing::parse(&markup_content),
                &parsing::parse(&mapping_content),
                &MappingShape::default(),
            );

            match output::report(markup, mapping, &comparison) {
                Ok(report) => write(&report),
                Err(error) => {
                    eprintln!("{}: {}", "error".bright_red(), error);
                    std::process::exit(1);
                }
            }
        }
        _ => unreachable!("clap requires a known subcommand"),
    }
}

fn command() -> Command {
    Command::new("fieldguard")
        .version(VERSION)
        .propagate_version(true)
        .about("Validation attributes for form markup.")
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("rewrite")
                .about("Rewrite the declarations of known fields to carry validity styling and handlers")
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The markup file containing the form to rewrite."),
                ),
        )
        .subcommand(
            Command::new("annotate")
                .about("Add a blur handler to every input lacking one")
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The markup file containing the form to annotate."),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("List field identifiers that have no instructional text")
                .arg(
                    Arg::new("markup")
                        .default_value(DEFAULT_MARKUP)
                        .help("The markup file declaring the fields."),
                )
                .arg(
                    Arg::new("mapping")
                        .default_value(DEFAULT_MAPPING)
                        .help("The file containing the fieldInstructions mapping."),
                ),
        )
}

fn required<'a>(submatches: &'a clap::ArgMatches, id: &str) -> &'a str {
    match submatches.get_one::<String>(id) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("{}: missing argument '{}'", "error".bright_red(), id);
            std::process::exit(1);
        }
    }
}

fn load(filename: &Path) -> String {
    match parsing::load(filename) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}", problem::concise_loading_error(&error));
            std::process::exit(1);
        }
    }
}

fn write(text: &str) {
    if let Err(error) = output::emit(text) {
        debug!(?error);
        if error.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("{}: {}", "error".bright_red(), error);
            std::process::exit(1);
        }
    }
}
