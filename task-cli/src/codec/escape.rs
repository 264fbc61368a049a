/// Escapes `"` and `\` so the text can sit inside a JSON string literal.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverses [`escape`]. Unknown escapes such as `\n` are kept verbatim,
/// backslash included, and a dangling trailing backslash is dropped.
pub fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut escape_pending = false;
    for c in text.chars() {
        if escape_pending {
            if c != '"' && c != '\\' {
                unescaped.push('\\');
            }
            unescaped.push(c);
            escape_pending = false;
        } else if c == '\\' {
            escape_pending = true;
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}
