use super::escape::unescape;
use tracing::warn;

/// Finds the value stored under `key` in the body of a flat JSON object.
///
/// The first occurrence of `"key":` wins. String values are returned
/// unescaped; anything else must be an integer token, optionally negative.
/// A missing key, an unterminated string or a non-numeric token all yield
/// `None`; the malformed cases are logged.
pub fn find_value(body: &str, key: &str) -> Option<String> {
    let pattern = format!("\"{key}\":");
    let start = body.find(&pattern)? + pattern.len();
    let rest = body[start..].trim_start_matches(|c: char| c.is_ascii_whitespace());

    match rest.strip_prefix('"') {
        Some(quoted) => match closing_quote(quoted) {
            Some(end) => Some(unescape(&quoted[..end])),
            None => {
                warn!(key, "malformed string value, no closing quote");
                None
            }
        },
        None => {
            let end = rest.find([',', '}']).unwrap_or(rest.len());
            let token = rest[..end].trim_end_matches(|c: char| c.is_ascii_whitespace());
            if is_integer(token) {
                Some(token.to_string())
            } else {
                warn!(key, token, "non-numeric value for numeric field");
                None
            }
        }
    }
}

/// Byte offset of the first `"` not preceded by an escaping backslash.
fn closing_quote(quoted: &str) -> Option<usize> {
    let mut in_escape = false;
    for (i, b) in quoted.bytes().enumerate() {
        match b {
            _ if in_escape => in_escape = false,
            b'\\' => in_escape = true,
            b'"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
