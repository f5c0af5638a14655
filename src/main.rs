use clap::{Parser, ValueEnum};
use flatinc::{
    ExpandConfig, Expander, FlatincError, IncludeKind, Result, SearchContext, find_directives,
};
use flatinc::resolve::open_regular_file;
use serde::Serialize;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding extra include directories, searched after `-I`
const INCLUDE_PATH_ENV: &str = "FLATINC_INCLUDE_PATH";

const LONG_HELP: &str = r#"
Directives (must occupy the whole line):
  #include "path"     - Local include
  #include <path>     - System include
Both forms are looked up next to the including file first, then in each
include directory in the order given. Any other line is copied verbatim.

Examples:
  # Expand to stdout
  flatinc src/main.cpp -I include
  # Expand into a file
  flatinc src/main.cpp -I include1 -I include2 -o main.flat.cpp
  # Verify that every include resolves, without writing output
  flatinc src/main.cpp -I include --check
  # List the directives of the root file
  flatinc src/main.cpp --list
  # List with resolved paths, as JSON
  flatinc src/main.cpp -I include --list=json
  # Guard against include cycles
  flatinc src/main.cpp --max-depth 64
"#;

/// Flatten #include directives into a single expanded text stream.
///
/// Copyright 2026 the flatinc authors.
/// Licensed under the EUPL v1.2.
#[derive(Parser, Debug)]
#[command(
    name = "flatinc",
    version,
    about = "Flatten #include directives into a single expanded text stream.",
    after_long_help = LONG_HELP
)]
struct Cli {
    /// Root file to expand
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Include directory (repeatable, searched in order)
    #[arg(short = 'I', long = "include-dir", value_name = "DIR", action = clap::ArgAction::Append)]
    include_dirs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum include nesting depth (unbounded by default)
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Resolve every include without writing output
    #[arg(long, conflicts_with_all = ["list", "output"])]
    check: bool,

    /// List directives in the root file (optionally with format: plain, detailed, json)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "plain", conflicts_with = "check")]
    list: Option<ListFormat>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum ListFormat {
    /// Referenced paths only
    Plain,
    /// Line, kind and resolution of each directive
    Detailed,
    /// JSON output for scripting
    Json,
}

#[derive(Serialize)]
struct DirectiveInfo {
    path: String,
    kind: IncludeKind,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn include_dirs(cli: &Cli) -> Vec<PathBuf> {
    let mut dirs = cli.include_dirs.clone();
    if let Some(paths) = std::env::var_os(INCLUDE_PATH_ENV) {
        dirs.extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
    }
    dirs
}

fn run(cli: &Cli) -> Result<()> {
    let config = ExpandConfig::new(include_dirs(cli)).with_max_depth(cli.max_depth);
    let expander = Expander::new(config)?;

    if let Some(format) = cli.list {
        list_directives(&cli.root, format, &expander.config().include_dirs)
    } else if cli.check {
        check(&cli.root, &expander)
    } else {
        expand(&cli.root, cli.output.as_deref(), &expander)
    }
}

fn expand(root: &Path, output: Option<&Path>, expander: &Expander) -> Result<()> {
    if let Some(output_path) = output {
        info!("Writing output to {}", output_path.display());
        return expander.preprocess_file(root, output_path);
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let result = expander.expand_file(root, &mut writer);
    let flushed = writer.flush();
    result?;
    flushed?;
    Ok(())
}

fn check(root: &Path, expander: &Expander) -> Result<()> {
    info!("Checking includes of {}...", root.display());
    expander.expand_file(root, &mut io::sink())?;
    info!("All includes resolved");
    Ok(())
}

fn list_directives(root: &Path, format: ListFormat, include_dirs: &[PathBuf]) -> Result<()> {
    let input = open_regular_file(root).map_err(|source| FlatincError::OpenInput {
        path: root.to_path_buf(),
        source,
    })?;
    let directives = find_directives(BufReader::new(input))?;
    let ctx = SearchContext::new(root, include_dirs);

    match format {
        ListFormat::Plain => {
            for located in &directives {
                println!("{}", located.directive.path);
            }
        }
        ListFormat::Detailed => {
            for located in &directives {
                println!("Include: {}", located.directive.path);
                println!("  Line: {}", located.line);
                println!("  Kind: {}", located.directive.kind);
                match ctx.resolve(&located.directive.path) {
                    Some(resolved) => println!("  Resolved: {}", resolved.path.display()),
                    None => println!("  Resolved: no"),
                }
                println!();
            }
        }
        ListFormat::Json => {
            let infos: Vec<DirectiveInfo> = directives
                .iter()
                .map(|located| {
                    let resolved = ctx.resolve(&located.directive.path);
                    DirectiveInfo {
                        path: located.directive.path.clone(),
                        kind: located.directive.kind,
                        line: located.line,
                        error: resolved.is_none().then(|| "not found".to_string()),
                        resolved: resolved.map(|r| r.path.display().to_string()),
                    }
                })
                .collect();

            let json = serde_json::to_string_pretty(&infos)?;
            println!("{json}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_long_help_carries_license() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Licensed under the EUPL v1.2."));
    }

    #[test]
    fn test_list_default_format() {
        let cli = Cli::try_parse_from(["flatinc", "a.cpp", "--list"]).unwrap();
        assert_eq!(cli.list, Some(ListFormat::Plain));

        let cli = Cli::try_parse_from(["flatinc", "a.cpp", "-I", "inc1", "-I", "inc2"]).unwrap();
        assert_eq!(cli.include_dirs, vec![PathBuf::from("inc1"), PathBuf::from("inc2")]);
    }
}
