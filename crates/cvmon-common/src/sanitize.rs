use serde_json::Value;

/// Longest representation kept for non-textual values.
pub const MAX_RAW_LEN: usize = 255;

/// Strip everything except ASCII letters, digits, space, `_` and `-`.
///
/// # Examples
///
/// ```
/// use cvmon_common::sanitize_text;
///
/// assert_eq!(sanitize_text("Job \"42\" failed: disk/full!"), "Job 42 failed diskfull");
/// ```
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect()
}

/// Sanitize an arbitrary JSON field.
///
/// Strings go through [`sanitize_text`]. `null` becomes an empty string.
/// Anything else keeps its compact JSON form, cut to [`MAX_RAW_LEN`] chars.
pub fn sanitize_value(value: &Value) -> String {
    match value {
        Value::String(s) => sanitize_text(s),
        Value::Null => String::new(),
        other => truncate_chars(&other.to_string(), MAX_RAW_LEN),
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
