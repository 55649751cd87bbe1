use crate::config::{read_candidate, selection, Project};
use anyhow::{anyhow, Result};
use blockpatch_workspace::EditOutcome;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document id
    pub id: String,

    /// Selected block or column ids (comma separated or repeated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub select: Vec<String>,

    /// Patch candidate file
    #[arg(short, long)]
    pub patch: PathBuf,
}

#[derive(Debug, Args)]
pub struct InstructArgs {
    /// Document id
    pub id: String,

    /// Selected block or column ids (comma separated or repeated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub select: Vec<String>,

    /// What to change, in plain words
    #[arg(short, long)]
    pub instruction: String,
}

pub async fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let project = Project::load(cwd)?;
    let candidate = read_candidate(&args.patch)?;

    let outcome = project
        .service()?
        .apply_candidate(&args.id, &selection(&args.select), &candidate)
        .await
        .map_err(|e| anyhow!("[{}] {}", e.kind(), e))?;

    report(&args.id, &outcome);
    Ok(())
}

pub async fn instruct(args: InstructArgs, cwd: &str) -> Result<()> {
    let project = Project::load(cwd)?;

    println!(
        "{} {} via {}",
        "🤖".bright_blue(),
        "Generating patch".bright_blue().bold(),
        project.config.generation.model
    );

    let outcome = project
        .service()?
        .apply_instruction(&args.id, &selection(&args.select), &args.instruction)
        .await
        .map_err(|e| anyhow!("[{}] {}", e.kind(), e))?;

    report(&args.id, &outcome);
    Ok(())
}

fn report(id: &str, outcome: &EditOutcome) {
    for repair in &outcome.repairs {
        println!("  {} {}", "•".yellow(), repair);
    }
    println!(
        "{} Applied {} ops to {}",
        "✓".green(),
        outcome.patch.len(),
        id.bright_white()
    );
}
