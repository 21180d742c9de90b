use std::sync::LazyLock;

use regex::Regex;

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<+\s*([A-Za-z0-9_.\-]+)\s*>+$").unwrap());

/// True if `value` is an unmerged template echo such as `«VNIR_RMSE_X»` or
/// `<<CAL_DATE>>` naming one of `candidates` (case-insensitive). Blank values
/// count as placeholders; any other shape is genuine.
pub fn is_placeholder(value: &str, candidates: &[&str]) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return true;
    }
    let normalized: String = value
        .chars()
        .map(|c| match c {
            '«' | '‹' | '“' | '〈' => '<',
            '»' | '›' | '”' | '〉' => '>',
            other => other,
        })
        .collect();
    let Some(caps) = RE_PLACEHOLDER.captures(normalized.trim()) else {
        return false;
    };
    let inner = &caps[1];
    candidates.iter().any(|c| c.eq_ignore_ascii_case(inner))
}
