//! Bracket-balancing scanner.
//!
//! Walks the text once from the first `{`, keeping a stack of expected
//! closers. String literals (and escapes inside them) are tracked so that
//! braces and brackets inside strings never touch the stack.

/// Scanner phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Skipping prose before the first `{`.
    SeekingOpen,
    /// Inside the object, stack non-empty.
    Scanning,
    /// The outermost object closed; everything after is ignored.
    Closed,
}

/// Cut the first balanced object out of `text`, closing whatever the text
/// left open.
///
/// Control characters are dropped: inside strings all of them, outside
/// strings all but tab, newline and carriage return. A closer that does not
/// match the top of the stack closes the frames above its match, or is
/// dropped when nothing on the stack matches. For truncated input an open
/// string is terminated and the pending closers are appended.
///
/// Returns `None` when the text has no `{`.
pub(crate) fn balance(text: &str) -> Option<String> {
    let mut state = ScanState::SeekingOpen;
    let mut out = String::with_capacity(text.len());
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        match state {
            ScanState::SeekingOpen => {
                if ch == '{' {
                    out.push(ch);
                    closers.push('}');
                    state = ScanState::Scanning;
                }
                continue;
            }
            ScanState::Closed => break,
            ScanState::Scanning => {}
        }

        if (ch as u32) < 0x20 {
            if in_string || !matches!(ch, '\t' | '\n' | '\r') {
                continue;
            }
        }

        if in_string {
            out.push(ch);
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
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '{' => {
                closers.push('}');
                out.push(ch);
            }
            '[' => {
                closers.push(']');
                out.push(ch);
            }
            '}' | ']' => {
                let Some(pos) = closers.iter().rposition(|c| *c == ch) else {
                    continue;
                };
                while closers.len() > pos + 1 {
                    if let Some(pending) = closers.pop() {
                        out.push(pending);
                    }
                }
                closers.pop();
                out.push(ch);
                if closers.is_empty() {
                    state = ScanState::Closed;
                }
            }
            _ => out.push(ch),
        }
    }

    if state == ScanState::SeekingOpen {
        return None;
    }

    if state == ScanState::Scanning {
        if in_string {
            if escaped {
                out.pop();
            }
            out.push('"');
        }
        while let Some(pending) = closers.pop() {
            out.push(pending);
        }
    }

    Some(out)
}

/// Remove commas that directly precede a closer (or the end of input),
/// ignoring commas inside string literals.
pub(crate) fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, None | Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_after_outer_object() {
        assert_eq!(balance("x {\"a\": 1} trailing {\"b\": 2}").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_no_open_brace() {
        assert_eq!(balance("no json here ]}"), None);
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let text = r#"{"note": "use } and ] freely", "n": 1} tail"#;
        assert_eq!(balance(text).unwrap(), r#"{"note": "use } and ] freely", "n": 1}"#);
    }

    #[test]
    fn test_escaped_quote_keeps_string_open() {
        let text = r#"{"q": "say \"}\" now"}"#;
        assert_eq!(balance(text).unwrap(), text);
    }

    #[test]
    fn test_truncated_input_closed() {
        assert_eq!(
            balance(r#"{"guardrail_report": {"flags": ["a", "b"#).unwrap(),
            r#"{"guardrail_report": {"flags": ["a", "b"]}}"#
        );
    }

    #[test]
    fn test_mismatched_closer_closes_inner_frames() {
        assert_eq!(balance(r#"{"a": [1, 2}"#).unwrap(), r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn test_stray_closer_dropped() {
        assert_eq!(balance(r#"{"a": 1]}"#).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(balance("{\"a\":\u{0}\n \"b\u{7}c\"}").unwrap(), "{\"a\":\n \"bc\"}");
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas(r#"{"a": [1,2,],}"#), r#"{"a": [1,2]}"#);
        assert_eq!(strip_trailing_commas(r#"{"a": ",]"}"#), r#"{"a": ",]"}"#);
        assert_eq!(strip_trailing_commas("[1 ,\n ]"), "[1 \n ]");
    }
}
