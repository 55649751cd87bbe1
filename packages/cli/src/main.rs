mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, init, instruct, normalize, show, validate, ApplyArgs, InitArgs, InstructArgs, NormalizeArgs, ShowArgs,
    ValidateArgs,
};
use tracing_subscriber::EnvFilter;

/// Blockpatch CLI - instruction-driven edits to block documents
#[derive(Parser, Debug)]
#[command(name = "blockpatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config and seed the example document
    Init(InitArgs),

    /// Print a stored document
    Show(ShowArgs),

    /// Normalize raw provider output and list the repairs
    Normalize(NormalizeArgs),

    /// Normalize and strictly validate raw provider output
    Validate(ValidateArgs),

    /// Apply a patch file to a stored document
    Apply(ApplyArgs),

    /// Ask the configured provider for a patch and apply it
    Instruct(InstructArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd).await,
        Command::Show(args) => show(args, &cwd).await,
        Command::Normalize(args) => normalize(args, &cwd),
        Command::Validate(args) => validate(args, &cwd),
        Command::Apply(args) => apply(args, &cwd).await,
        Command::Instruct(args) => instruct(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
