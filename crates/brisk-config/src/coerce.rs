//! Value coercions shared by option accessors and markers.

/// Words accepted as boolean true (case-insensitive)
const TRUE_WORDS: &[&str] = &["true", "1", "yes", "on", "set"];

/// Boolean reading of attribute text
pub fn truthy(text: &str) -> bool {
    let text = text.trim();
    TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text))
}

/// Keep only ASCII digits
pub fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Number text the way markup authors expect: integral values without a
/// fraction, everything else in shortest form
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Check for a whole-value `{{name}}` token, returning the trimmed name
pub fn bare_token(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix("{{")?.strip_suffix("}}")?;
    let name = inner.trim();
    if name.is_empty() || name.contains(['{', '}']) {
        None
    } else {
        Some(name)
    }
}
