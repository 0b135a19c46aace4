//! Rewrite keyed entries inside `"flags": [...]` arrays.
//!
//! Models sometimes emit `"flags": ["a": true, "b": 1]`, which is not JSON.
//! Each such entry is reduced to its bare key (`"a"`).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FLAGS_ARRAY: Regex = Regex::new(r#""flags"\s*:\s*\["#).unwrap();
    static ref KEYED_ENTRY: Regex = Regex::new(r#"^\s*"([^"\\]*)"\s*:"#).unwrap();
}

pub(crate) fn normalize_flag_entries(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for found in FLAGS_ARRAY.find_iter(text) {
        if found.start() < cursor {
            continue;
        }
        let body_start = found.end();
        let Some(body_end) = matching_bracket(text, body_start) else {
            continue;
        };
        let body = &text[body_start..body_end];
        if body.trim().is_empty() {
            continue;
        }

        let entries: Vec<String> = split_top_level(body)
            .into_iter()
            .map(|entry| match KEYED_ENTRY.captures(entry) {
                Some(caps) => format!("\"{}\"", &caps[1]),
                None => entry.trim().to_string(),
            })
            .collect();

        out.push_str(&text[cursor..body_start]);
        out.push_str(&entries.join(", "));
        cursor = body_end;
    }

    out.push_str(&text[cursor..]);
    out
}

/// Byte offset of the `]` closing an array whose body starts at `start`.
fn matching_bracket(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' if depth > 0 => depth -= 1,
            ']' => return Some(start + offset),
            '}' => return None,
            _ => {}
        }
    }
    None
}

/// Split an array body at commas that are not nested or quoted.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut from = 0;

    for (i, ch) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[from..i]);
                from = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[from..]);
    parts
}
