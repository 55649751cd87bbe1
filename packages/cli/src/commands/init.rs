use crate::config::Project;
use anyhow::Result;
use blockpatch_workspace::{Config, DocumentStore, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::fs;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Id of the example document to create
    #[arg(long, default_value = "report")]
    pub id: String,

    /// Store directory
    #[arg(short, long, default_value = "documents")]
    pub store_dir: String,

    /// Force overwrite existing config and document
    #[arg(short, long)]
    pub force: bool,
}

pub async fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let mut project = Project::load(cwd)?;
    let config_path = project.config_path();

    println!("{}", "📝 Initializing blockpatch project...".bright_blue().bold());

    if config_path.exists() && !args.force {
        println!(
            "  {} {} already exists, keeping it (use --force to overwrite)",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
    } else {
        let config = Config {
            store_dir: args.store_dir.clone(),
            ..Config::default()
        };
        fs::write(&config_path, config.to_json_pretty()?)?;
        println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
        project.config = config;
    }

    let store_dir = project.store_dir();
    if !store_dir.exists() {
        fs::create_dir_all(&store_dir)?;
        println!("  {} Created {}/", "✓".green(), project.config.store_dir);
    }

    if project.store().exists(&args.id).await? && !args.force {
        println!(
            "  {} Document {} already exists, keeping it",
            "⚠️".yellow(),
            args.id.bright_white()
        );
    } else {
        let document = project.service()?.create_from_seed(&args.id).await?;
        println!(
            "  {} Seeded {} ({} blocks)",
            "✓".green(),
            format!("{}.json", document.id).bright_white(),
            blockpatch_common::DocumentStats::of(&document).nodes
        );
    }

    println!();
    println!("{}", "✨ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Inspect the document: blockpatch show {} --outline", args.id);
    println!(
        "  2. Set {} and run: blockpatch instruct {} --select intro --instruction \"make it shorter\"",
        project.config.generation.api_key_env, args.id
    );

    Ok(())
}
