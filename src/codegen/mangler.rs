//! Turns user-facing names into identifiers usable in generated code.

/// Mangles a scene (layout) name into `[a-zA-Z0-9_]`.
///
/// ASCII letters and digits are kept, except a leading digit. Every other
/// character, `_` included, becomes `_` followed by its decimal code point,
/// so distinct names always give distinct identifiers.
pub fn mangle_scene_name(name: &str) -> String {
    let mut mangled = String::with_capacity(name.len());
    for (index, c) in name.chars().enumerate() {
        let allowed = c.is_ascii_alphabetic() || (c.is_ascii_digit() && index != 0);
        if allowed {
            mangled.push(c);
        } else {
            mangled.push('_');
            mangled.push_str(&u32::from(c).to_string());
        }
    }
    mangled
}

/// Mangles an object name; object names cannot start with a digit, so only
/// the character set is restricted.
pub fn mangle_object_name(name: &str) -> String {
    let mut mangled = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            mangled.push(c);
        } else {
            mangled.push('_');
            mangled.push_str(&u32::from(c).to_string());
        }
    }
    mangled
}

/// Name of the variable holding the list of `object` declared at `level`.
pub fn object_list_name(object: &str, level: usize) -> String {
    format!("GD{}Objects{}", mangle_object_name(object), level)
}
