//! Forge CLI - the `forge` binary.
//!
//! With no arguments it starts an interactive REPL; given a path it
//! evaluates the file once. Program output goes to stdout, errors and
//! logging to stderr. File evaluation exits 0 on success, 2 on lex and
//! parse errors, and 1 on runtime errors.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use forge::{Error, Interpreter};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The Forge stack language: an RPN interpreter with a REPL.
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "The Forge stack language", long_about = None)]
struct Cli {
    /// Script file to evaluate; starts an interactive REPL when omitted
    script: Option<PathBuf>,

    /// Evaluate a source string and exit
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "script")]
    eval: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, env = "FORGE_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(source) = cli.eval {
        return run_source(&source);
    }
    match cli.script {
        Some(path) => run_file(&path),
        None => match repl() {
            Ok(code) => code,
            Err(err) => {
                eprintln!("forge: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

/// Initialize the logging system. Logs go to stderr so that program
/// output on stdout stays clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .try_init();
}

/// Evaluate a script file once.
fn run_file(path: &Path) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("forge: {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };
    debug!(path = %path.display(), bytes = source.len(), "evaluating script");
    run_source(&source)
}

/// Evaluate source with output echoed straight to stdout.
fn run_source(source: &str) -> ExitCode {
    let mut interp = Interpreter::new();
    interp.echo_output(true);
    match interp.run(source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Map an error to the process exit code for file evaluation.
fn exit_code(err: &Error) -> u8 {
    match err {
        Error::Lex(_) | Error::Parse(_) | Error::UnexpectedEof { .. } => 2,
        _ => 1,
    }
}

/// The interactive prompt loop.
///
/// Each line is evaluated on a persistent interpreter: the stack,
/// variables, and procedures survive between lines, and errors leave
/// the stack intact for inspection. A line that ends inside an open
/// block keeps reading continuation lines. When a line grows the stack,
/// the new top is echoed back.
fn repl() -> anyhow::Result<ExitCode> {
    println!("Forge {} - type `exit` to quit", env!("CARGO_PKG_VERSION"));
    let mut interp = Interpreter::new();
    let stdin = io::stdin();
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "forge> " } else { "....> " };
        print!("{}", prompt);
        io::stdout().flush().context("failed to flush stdout")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            println!();
            break;
        }
        pending.push_str(&line);

        let depth_before = interp.stack_depth();
        match interp.run(&pending) {
            // Still inside an open block: keep accumulating lines.
            Err(Error::UnexpectedEof { .. }) => continue,
            result => {
                pending.clear();
                for printed in interp.take_output() {
                    println!("{}", printed);
                }
                match result {
                    Ok(()) => {
                        if interp.halted() {
                            break;
                        }
                        if interp.stack_depth() > depth_before {
                            if let Some(top) = interp.top() {
                                println!("{}", top);
                            }
                        }
                    }
                    Err(err) => eprintln!("{}", err),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_script_path() {
        let cli = Cli::parse_from(["forge", "script.forge"]);
        assert_eq!(cli.script, Some(PathBuf::from("script.forge")));
        assert!(cli.eval.is_none());
    }

    #[test]
    fn test_cli_parse_no_args_means_repl() {
        let cli = Cli::parse_from(["forge"]);
        assert!(cli.script.is_none());
        assert!(cli.eval.is_none());
    }

    #[test]
    fn test_cli_parse_eval_flag() {
        let cli = Cli::parse_from(["forge", "--eval", "1 2 add print"]);
        assert_eq!(cli.eval, Some("1 2 add print".to_string()));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["forge", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_exit_codes_by_error_kind() {
        assert_eq!(exit_code(&Error::Parse("x".into())), 2);
        assert_eq!(exit_code(&Error::Lex("x".into())), 2);
        assert_eq!(exit_code(&Error::DivisionByZero), 1);
        assert_eq!(exit_code(&Error::UnknownWord("w".into())), 1);
    }
}
