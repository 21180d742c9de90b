use std::sync::LazyLock;

use regex::Regex;

static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").unwrap());

/// First decimal number in `s`, ignoring surrounding units or labels.
///
/// `"0.123 px"` → `Some(0.123)`, `"RMSE: -1.5e-3 m"` → `Some(-0.0015)`,
/// `"N/A"` and `""` → `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    RE_NUMBER.find(s).and_then(|m| m.as_str().parse::<f64>().ok())
}
