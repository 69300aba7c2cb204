//! Embedding user text in generated source.

/// Escapes `text` for use between double quotes in C++ or JavaScript.
///
/// Backslashes and quotes are escaped, line breaks become `\n` and `\r`.
pub fn convert_to_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `text` as a double-quoted literal.
pub fn quoted(text: &str) -> String {
    format!("\"{}\"", convert_to_string(text))
}
