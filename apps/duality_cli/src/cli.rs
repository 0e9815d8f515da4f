//! Command-line argument parsing for `duality`.
//!
//! `clap`'s derive API, the same crate the teacher's own CLI is built on,
//! scaled down to the handful of flags §6 specifies: an optional positional
//! source file, `--server`, `--debugger`, and `--max-steps`.

use std::fs;
use std::io::{self, Read};

use clap::Parser;

use duality_core::{Ctx, Limits};

use crate::error::CliError;
use crate::programs;

/// Check and evaluate a Duality program, or run the language server.
#[derive(Parser)]
#[command(name = "duality")]
#[command(about = "Duality kernel driver", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Source file to read. Omit to read from stdin.
    pub file: Option<std::path::PathBuf>,

    /// Run the LSP JSON-RPC server on stdin/stdout instead of checking a program.
    #[arg(long)]
    pub server: bool,

    /// Reserved for a future interactive debugger.
    #[arg(long)]
    pub debugger: bool,

    /// Override the evaluator's reduction step budget (see `duality_core::Limits`).
    #[arg(long)]
    pub max_steps: Option<usize>,
}

/// Parses arguments and dispatches. Returns the process exit code.
pub fn run_cli() -> i32 {
    env_logger::init();
    let cli = Cli::parse();

    if cli.debugger {
        log::warn!("--debugger is a reserved stub; nothing to run");
        return 0;
    }

    if cli.server {
        return run_server();
    }

    match run_program(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            -1
        }
    }
}

fn run_server() -> i32 {
    // `tower_lsp::Server` drives its own async runtime; reuse the binary
    // entry point's executor rather than spinning up a second one here.
    match tokio::runtime::Runtime::new() {
        Ok(rt) => {
            rt.block_on(duality_lsp_main());
            0
        }
        Err(e) => {
            eprintln!("failed to start async runtime: {}", e);
            -1
        }
    }
}

async fn duality_lsp_main() {
    use tower_lsp::{LspService, Server};

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(duality_lsp::DualityServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

fn run_program(cli: &Cli) -> Result<(), CliError> {
    let source = read_source(cli.file.as_deref())?;

    let limits = match cli.max_steps {
        Some(max_reduction_steps) => Limits { max_reduction_steps, ..Limits::default() },
        None => Limits::default(),
    };
    let mut ctx = Ctx::new_with_limits(limits);

    let program = programs::build_program(&mut ctx, &source)?;
    let checked = duality_core::check::check_or_err(&mut ctx, &program)?;
    let reduced = duality_core::eval::eval(&mut ctx, &checked)?;

    println!("{}", ctx.display(&reduced));
    Ok(())
}

fn read_source(file: Option<&std::path::Path>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
