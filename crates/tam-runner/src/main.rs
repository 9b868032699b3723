//! Command-line host for the Triangle Abstract Machine emulator.
//!
//! Loads a binary program image, drives the fetch/execute cycle to
//! completion, and optionally prints a stack/heap snapshot after every
//! instruction (`--trace`), pausing for RETURN between cycles (`--step`).

use std::io::{self, BufRead as _, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tam_vm::Emulator;
use tracing::{error, info};

/// Run a Triangle Abstract Machine binary.
#[derive(Parser, Debug)]
#[command(name = "tam", about = "Run a Triangle Abstract Machine binary", long_about = None)]
struct Args {
    /// Binary program image to run
    filename: PathBuf,

    /// Print the stack and allocated heap after each instruction
    #[arg(short, long)]
    trace: bool,

    /// Press RETURN to advance after each instruction (requires --trace)
    #[arg(short, long, requires = "trace")]
    step: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("warn"),
        ))
        .init();

    if !args.filename.is_file() {
        eprintln!("Binary file '{}' not found", args.filename.display());
        return ExitCode::from(1);
    }

    let bytes = match std::fs::read(&args.filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    let words = match format_tamcode::parse(&bytes) {
        Ok(words) => words,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut vm = Emulator::new();
    if let Err(e) = vm.load_program(&words) {
        error!("{e}");
        return ExitCode::from(2);
    }
    info!(words = words.len(), ct = words.len(), "program loaded");

    match run(&mut vm, args.trace, args.step) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(3)
        }
    }
}

/// Drive the fetch/execute cycle to completion, optionally tracing and
/// single-stepping between cycles.
fn run(vm: &mut Emulator, trace: bool, step: bool) -> Result<(), tam_core::TamError> {
    loop {
        let instr = vm.fetch_decode()?;
        let running = vm.execute(instr)?;

        if trace {
            println!("{}", vm.snapshot(instr));
            io::stdout().flush().ok();
        }
        if trace && step {
            let mut buf = String::new();
            let _ = io::stdin().lock().read_line(&mut buf);
        }

        if !running {
            return Ok(());
        }
    }
}

/// `0` for `--help`/`--version` requests, `1` for every other usage error.
fn usage_exit_code(e: &clap::Error) -> u8 {
    use clap::error::ErrorKind;
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
