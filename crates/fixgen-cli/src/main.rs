//! Command-line driver for the fixture-header generators.
//!
//! Every subcommand takes the same three paths as the host build system
//! passes to all of its generators: an input (manifest or log), a generated
//! source path, and a generated header path. These generators only produce
//! headers, so the middle path is accepted and ignored.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

/// Regenerate C fixture headers for the emulator test harness.
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate fixture headers from test data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// The `(input, out_src, out_hdr)` triple shared by every generator.
#[derive(Args, Debug)]
struct GenArgs {
    /// Input manifest or log file.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Generated source path; accepted for interface uniformity, unused.
    #[arg(value_name = "OUT_SRC")]
    out_src: PathBuf,

    /// Generated header path.
    #[arg(value_name = "OUT_HDR")]
    out_hdr: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump binary files listed in a manifest into C byte arrays.
    Dump(GenArgs),
    /// Convert FUSE Z80 test-vector files into fuse_test_t arrays.
    Fuse(GenArgs),
    /// Convert a 6502 CPU trace log into a cpu_state table.
    Trace(GenArgs),
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Dump(args) => dumpgen::generate(&args.input, Some(&args.out_src), &args.out_hdr),
        Command::Fuse(args) => fusegen::generate(&args.input, Some(&args.out_src), &args.out_hdr),
        Command::Trace(args) => tracegen::generate(&args.input, Some(&args.out_src), &args.out_hdr),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
