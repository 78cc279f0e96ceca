// hypno: HypnoScript checker and interpreter

use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use hypnoscript::checker::{Diagnostic, TypeChecker};
use hypnoscript::interpreter::Interpreter;
use hypnoscript::parser::Parser;

#[derive(Clone, Copy, PartialEq)]
enum Command {
    Run,
    Check,
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} [run|check] <file.hyp>", program_name);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run    Type check, then execute the program (default)");
    eprintln!("  check  Type check only");
    eprintln!();
    eprintln!("Set HYPNO_LOG (e.g. HYPNO_LOG=debug) to enable logging.");
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("HYPNO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_error(diagnostic: &Diagnostic) {
    eprintln!("{}", diagnostic.to_string().red());
}

fn print_warning(diagnostic: &Diagnostic) {
    eprintln!("{}", diagnostic.to_string().yellow());
}

fn main() -> ExitCode {
    init_logging();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("hypno");

    let (command, file) = match args.get(1..).unwrap_or_default() {
        [file] => (Command::Run, file),
        [cmd, file] if cmd == "run" => (Command::Run, file),
        [cmd, file] if cmd == "check" => (Command::Check, file),
        [] => {
            eprintln!("Error: No input file provided");
            eprintln!();
            usage(program_name);
            return ExitCode::FAILURE;
        }
        _ => {
            usage(program_name);
            return ExitCode::FAILURE;
        }
    };

    let path = Path::new(file);
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", file, e);
            return ExitCode::FAILURE;
        }
    };
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let program = match Parser::new(&source).parse_program() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::FAILURE;
        }
    };

    let mut checker = TypeChecker::new().with_base_dir(base_dir);
    checker.check(&program);
    let reporter = checker.reporter();
    reporter.warnings().iter().for_each(print_warning);
    reporter.errors().iter().for_each(print_error);

    if reporter.has_errors() {
        eprintln!(
            "{}",
            format!("{} error(s), {} warning(s)", reporter.errors().len(), reporter.warnings().len()).red()
        );
        return ExitCode::FAILURE;
    }
    if command == Command::Check {
        eprintln!("No errors, {} warning(s)", reporter.warnings().len());
        return ExitCode::SUCCESS;
    }

    let mut interpreter = Interpreter::new().with_base_dir(base_dir);
    let result = interpreter.execute(&program);

    for failure in interpreter.assertion_failures() {
        eprintln!("{}", failure.to_string().yellow());
    }

    match result {
        Ok(()) if interpreter.assertion_failures().is_empty() => ExitCode::SUCCESS,
        Ok(()) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{}", format!("Runtime error: {}", e).red());
            ExitCode::FAILURE
        }
    }
}
