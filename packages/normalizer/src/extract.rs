use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Generated text is empty")]
    Empty,

    #[error("No JSON object or array found in generated text")]
    NotFound,

    #[error("Generated JSON is malformed: {0}")]
    Malformed(String),
}

/// Pull the JSON payload out of free-form provider text
///
/// Tries, in order: the whole text, the first fenced block (with or
/// without a language tag), and the first balanced `{...}`/`[...]` span.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }

    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    if let Some(body) = fenced_block(text) {
        if let Ok(value) = serde_json::from_str(body) {
            return Ok(value);
        }
    }

    let slice = balanced_slice(text).ok_or(ExtractError::NotFound)?;
    serde_json::from_str(slice).map_err(|e| ExtractError::Malformed(e.to_string()))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body = after.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let end = body.find("```").unwrap_or(body.len());
    Some(body[..end].trim())
}

/// First bracket-balanced span, skipping brackets inside string literals
fn balanced_slice(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_json(r#" {"ops": []} "#).unwrap(), json!({"ops": []}));
    }

    #[test]
    fn test_fenced_json() {
        let text = "Here is the patch:\n```json\n{\"ops\": [{\"op\": \"delete_block\", \"id\": \"p1\"}]}\n```\nDone.";
        assert_eq!(
            extract_json(text).unwrap(),
            json!({"ops": [{"op": "delete_block", "id": "p1"}]})
        );

        let untagged = "```\n[1, 2]\n```";
        assert_eq!(extract_json(untagged).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_prose_around_object() {
        let text = r#"Sure! {"ops": [{"op": "update_content", "id": "p1", "content": "a } b"}]} Let me know."#;
        assert_eq!(
            extract_json(text).unwrap(),
            json!({"ops": [{"op": "update_content", "id": "p1", "content": "a } b"}]})
        );
    }

    #[test]
    fn test_failures() {
        assert_eq!(extract_json("   "), Err(ExtractError::Empty));
        assert_eq!(extract_json("no json here"), Err(ExtractError::NotFound));
        assert!(matches!(extract_json("{\"ops\": [}"), Err(ExtractError::NotFound) | Err(ExtractError::Malformed(_))));
        assert!(matches!(extract_json("x {\"a\": tru} y"), Err(ExtractError::Malformed(_))));
    }
}
