//! Prompts sent to the generation service
//!
//! The user prompt carries only the selected subtrees, never the whole
//! document, so the model has nothing outside the selection to edit.

use crate::generator::GenerationRequest;
use blockpatch_common::find_column;
use blockpatch_model::Document;
use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str = r#"You edit structured documents by returning a JSON patch and nothing else.

A document is a list of blocks. Every block has a unique "id" and a "type":
- heading: {"type":"heading","id","level":1-3,"text","textStyle"?}
- paragraph: {"type":"paragraph","id","text","textStyle"?}
- divider: {"type":"divider","id"}
- image: {"type":"image","id","src","alt"?,"caption"?,"widthPercent"?:10-100}
- chart: {"type":"chart","id","option":{...},"title"?,"height"?:1-1200}
- rich: {"type":"rich","id","items":[{"type":"text"|"image"|"chart",...}]}
- columns: {"type":"columns","id","gap"?:0-80,"columns":[{"id","nodes":[blocks]}]}

textStyle: {"fontSize"?:8-120,"fontWeight"?:100-900,"textAlign"?:"left"|"center"|"right"|"justify","color"?}

Respond with {"ops":[...]} where each op is one of:
- {"op":"update_content","id","content","textStyle"?}
- {"op":"replace_block","id","block":{...}}
- {"op":"insert_after","afterId","block":{...}}
- {"op":"delete_block","id"}

Only target the selected blocks or blocks nested inside them. New blocks need ids not already used in the document."#;

/// The selected nodes and columns as JSON, in selection order
///
/// Ids that are not in the document are skipped.
pub fn selected_subtrees(document: &Document, selected_ids: &[String]) -> Result<Vec<Value>, serde_json::Error> {
    let mut subtrees = Vec::with_capacity(selected_ids.len());

    for id in selected_ids {
        if let Some(node) = document.find_node(id) {
            subtrees.push(serde_json::to_value(node)?);
        } else if let Some(column) = find_column(document, id) {
            subtrees.push(serde_json::to_value(column)?);
        }
    }

    Ok(subtrees)
}

pub fn user_prompt(request: &GenerationRequest) -> Result<String, serde_json::Error> {
    let subtrees = selected_subtrees(&request.document, &request.selected_ids)?;
    let context = json!({
        "documentTitle": request.document.title,
        "selectedIds": request.selected_ids,
        "selectedBlocks": subtrees,
    });

    Ok(format!(
        "Instruction: {}\n\nSelection:\n{}\n\nReturn only the JSON patch.",
        request.instruction.trim(),
        serde_json::to_string_pretty(&context)?
    ))
}
