use crate::config::Project;
use anyhow::{anyhow, Result};
use blockpatch_common::DocumentStats;
use blockpatch_model::{Document, Node, RichItem};
use blockpatch_workspace::DocumentStore;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document id
    pub id: String,

    /// Print an indented outline instead of JSON
    #[arg(long)]
    pub outline: bool,
}

pub async fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let project = Project::load(cwd)?;
    let document = project
        .store()
        .load(&args.id)
        .await?
        .ok_or_else(|| anyhow!("Document not found: {}", args.id))?;

    if args.outline {
        print!("{}", outline(&document));
    } else {
        println!("{}", document.to_json_pretty()?);
    }

    Ok(())
}

/// One line per block and column, nested columns indented
pub fn outline(document: &Document) -> String {
    let stats = DocumentStats::of(document);
    let mut out = format!(
        "{} {}\n{}\n",
        document.title.bold(),
        format!("({})", document.id).dimmed(),
        format!(
            "{} blocks, {} columns, depth {}",
            stats.nodes, stats.columns, stats.max_depth
        )
        .dimmed()
    );
    write_nodes(&document.nodes, 1, &mut out);
    out
}

fn write_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        out.push_str(&format!(
            "{}{} {}{}\n",
            indent,
            node.kind().as_str().cyan(),
            node.id().bright_white(),
            summary(node)
        ));

        for column in node.columns() {
            out.push_str(&format!("{}  {} {}\n", indent, "column".yellow(), column.id.bright_white()));
            write_nodes(&column.nodes, depth + 2, out);
        }
    }
}

fn summary(node: &Node) -> String {
    let text = match node {
        Node::Heading { level, text, .. } => format!("h{} {}", level, text),
        Node::Paragraph { text, .. } => text.clone(),
        Node::Image { src, .. } => src.clone(),
        Node::Chart { title, .. } => title.clone().unwrap_or_default(),
        Node::Rich { items, .. } => items
            .iter()
            .map(|item| match item {
                RichItem::Text { .. } => "text",
                RichItem::Image { .. } => "image",
                RichItem::Chart { .. } => "chart",
            })
            .collect::<Vec<_>>()
            .join(" + "),
        Node::Divider { .. } | Node::Columns { .. } => String::new(),
    };

    if text.is_empty() {
        String::new()
    } else {
        format!("  {}", truncate(&text, 60).dimmed())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}…", &text[..index]),
        None => text.to_string(),
    }
}
