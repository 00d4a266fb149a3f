//! Path joining.

/// Join `base` and `suffix` so exactly one `/` separates them.
///
/// Empty sides are returned as-is; slash detection looks at the raw first and
/// last bytes, so multi-byte paths are handled without decoding.
pub fn join(base: &str, suffix: &str) -> String {
    if base.is_empty() {
        return suffix.to_string();
    }
    if suffix.is_empty() {
        return base.to_string();
    }

    let base_slash = base.as_bytes().last() == Some(&b'/');
    let suffix_slash = suffix.as_bytes().first() == Some(&b'/');
    match (base_slash, suffix_slash) {
        (true, true) => format!("{}{}", base, &suffix[1..]),
        (false, false) => format!("{}/{}", base, suffix),
        _ => format!("{}{}", base, suffix),
    }
}
