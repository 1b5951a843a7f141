//! Trapper item key templates.

/// `"Used Space"` becomes `"used_space"`.
pub fn normalize_metric_name(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

/// Render one item key parameter, quoting it when the bare form would be
/// misparsed by the trapper.
///
/// A quoted parameter cannot end in a backslash, since `\"` reads as an
/// escaped quote; trailing backslashes are dropped in that case.
pub fn key_param(param: &str) -> String {
    let needs_quotes = param.contains([',', ']', '"'])
        || param.starts_with(' ')
        || param.starts_with('[');
    if needs_quotes {
        let body = param.trim_end_matches('\\');
        format!("\"{}\"", body.replace('"', "\\\""))
    } else {
        param.to_string()
    }
}

pub fn media_agent_status_key(name: &str) -> String {
    format!("status.ma[{}]", key_param(name))
}

pub fn library_metric_key(metric: &str, library: &str) -> String {
    format!("{}.library[{}]", normalize_metric_name(metric), key_param(library))
}

pub fn job_status_key(job_id: &str) -> String {
    format!("status.job[{}]", key_param(job_id))
}
