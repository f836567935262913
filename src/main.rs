//! src/main.rs

/*******************************************************************************
 *                                MAIN MODULE
 *-------------------------------------------------------------------------------
 * The CLI entry point: run a source file, or drop into a line-at-a-time REPL
 * when no file is given. Both modes share one `Interpreter` and one root
 * `Environment`, so REPL bindings accumulate across lines the way a file's
 * top-level expressions accumulate across `;`.
 ******************************************************************************/

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use mindscript::{EchoOracle, Environment, FailOracle, FsLoader, Interpreter, MindError};

#[derive(Parser, Debug)]
#[command(name = "mindscript", about = "Runtime for MindScript")]
struct Cli {
    /// Source file to run. If omitted, starts an interactive REPL.
    source: Option<String>,

    /// Oracle adapter backing `oracle` values: "echo" answers from worked
    /// examples / base values, "fail" always refuses.
    #[arg(long, default_value = "echo")]
    oracle: OracleKind,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OracleKind {
    Echo,
    Fail,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "mindscript=debug" } else { "mindscript=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();

    let oracle: Box<dyn mindscript::OracleAdapter> = match cli.oracle {
        OracleKind::Echo => Box::new(EchoOracle),
        OracleKind::Fail => Box::new(FailOracle),
    };
    let interp = Interpreter::new(oracle, Box::new(FsLoader), Box::new(io::stdout()));

    match cli.source {
        Some(path) => run_file(&interp, &path),
        None => run_repl(&interp),
    }
}

fn run_file(interp: &Interpreter, path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("error reading '{}': {}", path, err);
            return ExitCode::FAILURE;
        }
    };
    match run_source(interp, &source, &interp.root) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(interp: &Interpreter) -> ExitCode {
    let stdin = io::stdin();
    loop {
        print!("mindscript> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("input error: {}", err);
                break;
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        match run_source(interp, &line, &interp.root) {
            Ok(value) => println!("{}", mindscript::value::stringify(&value)),
            Err(err) => eprintln!("{}", err),
        }
    }
    ExitCode::SUCCESS
}

fn run_source(interp: &Interpreter, source: &str, env: &Environment) -> Result<mindscript::Value, MindError> {
    let program = mindscript::parse_source(source)?;
    interp.eval_program(&program, env).map_err(|flow| match flow {
        mindscript::Flow::Error(e) => e,
        mindscript::Flow::Signal(_) => MindError::value_error("return/break/continue used outside of a function or loop", None),
    })
}
