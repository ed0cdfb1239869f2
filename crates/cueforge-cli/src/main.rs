//! Cueforge CLI - Command-line interface for engine-data compilation
//!
//! This binary provides commands for compiling source audio projects
//! into binary engine-data images and for inspecting and verifying
//! existing images.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use cueforge_cli::commands;

/// Cueforge - Audio Project Compiler
#[derive(Parser)]
#[command(name = "cueforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source project document into a binary engine-data image
    Compile {
        /// Path to the source project document (JSON)
        #[arg(short, long)]
        input: String,

        /// Path the binary image is written to
        #[arg(short, long)]
        output: String,

        /// Suppress the summary printed on success
        #[arg(short, long)]
        quiet: bool,
    },

    /// Decode a binary image and print a chunk-by-chunk summary
    Inspect {
        /// Path to the binary image
        #[arg(short, long)]
        input: String,
    },

    /// Check that a binary image decodes cleanly
    Verify {
        /// Path to the binary image
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON instead of colored text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            quiet,
        } => commands::compile::run(&input, &output, quiet),
        Commands::Inspect { input } => commands::inspect::run(&input),
        Commands::Verify { input, json } => commands::verify::run(&input, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
