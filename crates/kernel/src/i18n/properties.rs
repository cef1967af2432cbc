//! Java `.properties` message bundle parser.
//!
//! Parses bundle files into (key, message) pairs. Handles `=`, `:` and
//! whitespace separators, `#` / `!` comments, backslash line continuations
//! and the `\n`, `\t`, `\r`, `\\` and `\uXXXX` escapes.

/// Parse `.properties` content into key/message pairs, in file order.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut logical = String::new();

    for raw in content.lines() {
        // Leading whitespace is dropped on first and continuation lines alike
        let line = raw.trim_start();

        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }

        logical.push_str(line);
        if let Some(entry) = split_entry(&logical) {
            entries.push(entry);
        }
        logical.clear();
    }

    // File may end mid-continuation
    if !logical.is_empty() {
        if let Some(entry) = split_entry(&logical) {
            entries.push(entry);
        }
    }

    entries
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end]);
    if key.is_empty() {
        return None;
    }

    // Separator: optional whitespace, at most one of '=' / ':', optional whitespace
    let rest = line[key_end..].trim_start_matches([' ', '\t']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    let value = unescape(rest.trim_start_matches([' ', '\t']));

    Some((key, value))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
