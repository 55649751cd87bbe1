//! Ordered lookups over candidate field paths
//!
//! Paths are dotted (`target.id`); the first candidate that holds a value
//! of the wanted shape wins and its path is returned with the value.

use serde_json::{Map, Value};

pub fn lookup<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// First non-blank string, used for identifiers and kind tokens
pub fn first_non_empty<'k>(map: &Map<String, Value>, candidates: &[&'k str]) -> Option<(String, &'k str)> {
    candidates.iter().find_map(|path| {
        lookup(map, path)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| (s.to_string(), *path))
    })
}

/// First string, empty allowed, used for text payloads
pub fn first_string<'k>(map: &Map<String, Value>, candidates: &[&'k str]) -> Option<(String, &'k str)> {
    candidates.iter().find_map(|path| {
        lookup(map, path)
            .and_then(Value::as_str)
            .map(|s| (s.to_string(), *path))
    })
}

pub fn first_object<'a, 'k>(
    map: &'a Map<String, Value>,
    candidates: &[&'k str],
) -> Option<(&'a Map<String, Value>, &'k str)> {
    candidates
        .iter()
        .find_map(|path| lookup(map, path).and_then(Value::as_object).map(|o| (o, *path)))
}

pub fn first_array<'a>(map: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Vec<Value>> {
    candidates
        .iter()
        .find_map(|path| lookup(map, path).and_then(Value::as_array))
}

/// First value readable as a non-negative integer
///
/// Accepts numbers and numeric strings with a unit suffix (`"18px"`, `"50%"`).
pub fn first_uint(map: &Map<String, Value>, candidates: &[&str]) -> Option<u64> {
    candidates
        .iter()
        .find_map(|path| lookup(map, path).and_then(as_uint))
}

pub fn as_uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
