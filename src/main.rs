// File: src/main.rs
//
// Main entry point for the Arson programming language interpreter.
// Parses the command line, runs the script through lexer, parser and
// interpreter, and maps failures to exit codes: 1 for usage, I/O, lexing,
// parsing or configuration problems, 2 for errors raised while running.

use arson::ast::Stmt;
use arson::config::KeywordTable;
use arson::errors::{ArsonError, ErrorKind};
use arson::interpreter::Interpreter;
use arson::lexer;
use arson::parser::Parser;
use clap::Parser as ClapParser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use std::thread;

#[derive(ClapParser)]
#[command(
    name = "arson",
    about = "Arson: a small dynamically typed scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Path to the .arson script
    file: PathBuf,

    /// Write the token stream to PATH as JSON
    #[arg(long, value_name = "PATH")]
    dump_tokens: Option<PathBuf>,

    /// TOML file overriding keyword spellings
    #[arg(long, value_name = "PATH")]
    keywords: Option<PathBuf>,
}

/// Initial native stack for the thread that runs the script. The evaluator
/// grows its stack on demand, so this only makes that rarer.
const STACK_SIZE: usize = 64 * 1024 * 1024;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber, but only when RUST_LOG is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn io_error(path: &Path, action: &str, err: std::io::Error) -> ArsonError {
    ArsonError::runtime(
        ErrorKind::IoError,
        format!("Cannot {} '{}': {}", action, path.display(), err),
    )
}

/// Reads, tokenizes and parses the script named on the command line.
fn load_program(cli: &Cli) -> Result<Vec<Stmt>, ArsonError> {
    let keywords = match &cli.keywords {
        Some(path) => KeywordTable::from_file(path)?,
        None => KeywordTable::default(),
    };

    let file_name = cli.file.display().to_string();
    let source = fs::read_to_string(&cli.file).map_err(|e| io_error(&cli.file, "read", e))?;

    let tokens = lexer::tokenize_with(&source, &keywords)
        .map_err(|e| e.with_source_from(&source).with_file(file_name.clone()))?;

    if let Some(path) = &cli.dump_tokens {
        let json = serde_json::to_string_pretty(&tokens).map_err(|e| {
            ArsonError::runtime(ErrorKind::IoError, format!("Cannot serialize tokens: {}", e))
        })?;
        fs::write(path, json).map_err(|e| io_error(path, "write", e))?;
    }

    Parser::new(tokens)
        .parse()
        .map_err(|e| e.with_source_from(&source).with_file(file_name))
}

/// Loads and runs the script, returning the process exit code.
fn run_script(cli: &Cli) -> u8 {
    let program = match load_program(cli) {
        Ok(program) => program,
        Err(err) => {
            eprint!("{}", err);
            return 1;
        }
    };

    let mut interpreter = Interpreter::new();
    match interpreter.run(&program) {
        Ok(()) => 0,
        Err(err) => {
            eprint!("{}", err.with_file(cli.file.display().to_string()));
            2
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        }
    };

    init_tracing();

    let runner = thread::Builder::new()
        .name("arson".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || run_script(&cli));
    match runner.map(|handle| handle.join()) {
        Ok(Ok(code)) => ExitCode::from(code),
        Ok(Err(panic)) => std::panic::resume_unwind(panic),
        Err(err) => {
            eprintln!("arson: cannot start interpreter thread: {}", err);
            ExitCode::from(2)
        }
    }
}
