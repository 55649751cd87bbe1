use blockpatch_model::patch::{DELETE_BLOCK, INSERT_AFTER, OP_NAMES, REPLACE_BLOCK, UPDATE_CONTENT};

/// Lower snake case form of a loosely spelled token
///
/// `updateContent`, `Update-Content`, `UPDATE CONTENT` all become
/// `update_content`.
pub fn canonical_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev: Option<char> = None;

    for c in raw.trim().chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            out.push('_');
        }

        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }

    out.trim_matches('_').to_string()
}

/// Canonical operation name for a raw token, or `None` when unrecognized
pub fn canonical_op(raw: &str) -> Option<&'static str> {
    let token = canonical_token(raw);

    if let Some(name) = OP_NAMES.iter().copied().find(|name| *name == token) {
        return Some(name);
    }

    match token.as_str() {
        "update" | "edit" | "update_text" | "set_content" | "update_block_content" => Some(UPDATE_CONTENT),
        "replace" | "replace_node" => Some(REPLACE_BLOCK),
        "insert" | "append_after" | "insert_block" | "add_after" => Some(INSERT_AFTER),
        "delete" | "remove" | "remove_block" | "delete_node" => Some(DELETE_BLOCK),
        _ => None,
    }
}
