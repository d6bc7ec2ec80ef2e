//! CLI tool to validate Pascal-subset programs and inspect their tokens.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use pascal_validator::{Analysis, analyze, tokenize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pascal-validator", version, about)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check if program file(s) are valid
    Validate {
        /// Print every diagnostic, innermost first
        #[arg(long)]
        trace: bool,

        /// Files to check (`-` reads stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the token sequence of each file
    Tokens {
        /// Files to tokenize (`-` reads stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut had_error = false;

    match args.command {
        Command::Validate { trace, files } => {
            for path in &files {
                match read_source(path) {
                    Ok(source) => had_error |= !report(path, &analyze(&source), trace),
                    Err(e) => {
                        eprintln!("{}: {e}", path.display());
                        had_error = true;
                    }
                }
            }
        }
        Command::Tokens { files } => {
            for path in &files {
                match read_source(path) {
                    Ok(source) => {
                        for token in tokenize(&source) {
                            println!(
                                "{}:{}\t{}\t'{}'",
                                token.span.line, token.span.column, token.kind, token.text
                            );
                        }
                    }
                    Err(e) => {
                        eprintln!("{}: {e}", path.display());
                        had_error = true;
                    }
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_source(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Print the outcome for one file. Returns whether it was accepted.
fn report(path: &Path, analysis: &Analysis, full_trace: bool) -> bool {
    let path = path.display();
    let verdict = &analysis.verdict;

    if verdict.accepted {
        eprintln!("{path}: valid ({} token(s))", analysis.tokens.len());
        return true;
    }

    if let Some(err) = &verdict.lexical_error {
        eprintln!("{path}: lexical error: {err}");
        return false;
    }

    match verdict.trace.root_cause() {
        Some(root) => eprintln!("{path}: {root}"),
        None => eprintln!("{path}: invalid"),
    }
    if full_trace {
        for diagnostic in &verdict.trace {
            eprintln!("  [{}] {diagnostic}", diagnostic.rule);
        }
    }
    false
}
