use crate::config::read_candidate;
use anyhow::{anyhow, Result};
use blockpatch_model::{validate_patch, PatchOp};
use blockpatch_normalizer::{Normalized, Normalizer};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Raw provider output (JSON, or text with JSON inside)
    pub file: PathBuf,

    /// Seed for ids given to new blocks
    #[arg(long, default_value = "blockpatch")]
    pub seed: String,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Raw provider output (JSON, or text with JSON inside)
    pub file: PathBuf,

    /// Seed for ids given to new blocks
    #[arg(long, default_value = "blockpatch")]
    pub seed: String,
}

fn run_normalizer(file: &Path, seed: &str) -> Result<Normalized> {
    let raw = read_candidate(file)?;
    Ok(Normalizer::new(seed).normalize(&raw))
}

fn print_repairs(normalized: &Normalized) {
    if normalized.repairs.is_empty() {
        println!("{}", "No repairs needed".dimmed());
        return;
    }

    println!("{} {}", "🔧".yellow(), format!("{} repairs", normalized.repairs.len()).bold());
    for repair in &normalized.repairs {
        println!("  {} {}", "•".yellow(), repair);
    }
}

pub fn normalize(args: NormalizeArgs, _cwd: &str) -> Result<()> {
    let normalized = run_normalizer(&args.file, &args.seed)?;

    println!("{}", serde_json::to_string_pretty(&normalized.candidate)?);
    println!();
    print_repairs(&normalized);
    Ok(())
}

pub fn validate(args: ValidateArgs, _cwd: &str) -> Result<()> {
    let normalized = run_normalizer(&args.file, &args.seed)?;
    print_repairs(&normalized);
    println!();

    let patch = validate_patch(&normalized.candidate).map_err(|e| anyhow!(e))?;

    println!("{} {}", "✓".green(), format!("Valid patch with {} ops", patch.len()).bold());
    for (index, op) in patch.ops.iter().enumerate() {
        println!("  {:>2}. {}", index, describe(op));
    }
    Ok(())
}

fn describe(op: &PatchOp) -> String {
    match op {
        PatchOp::UpdateContent { id, content, text_style } => format!(
            "{} {} = {:?}{}",
            op.name().cyan(),
            id.bright_white(),
            content,
            if text_style.is_some() { " (+style)" } else { "" }
        ),
        PatchOp::ReplaceBlock { id, block } => format!(
            "{} {} with {} {}",
            op.name().cyan(),
            id.bright_white(),
            block.kind(),
            block.id()
        ),
        PatchOp::InsertAfter { after_id, block } => format!(
            "{} {} {} {}",
            op.name().cyan(),
            after_id.bright_white(),
            block.kind(),
            block.id()
        ),
        PatchOp::DeleteBlock { id } => format!("{} {}", op.name().cyan(), id.bright_white()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpatch_model::Node;

    #[test]
    fn test_describe_ops() {
        colored::control::set_override(false);

        let insert = PatchOp::InsertAfter {
            after_id: "intro".to_string(),
            block: Node::divider("rule"),
        };
        assert_eq!(describe(&insert), "insert_after intro divider rule");

        let update = PatchOp::UpdateContent {
            id: "intro".to_string(),
            content: "Hi".to_string(),
            text_style: None,
        };
        assert_eq!(describe(&update), "update_content intro = \"Hi\"");
    }
}
