//! Last-chance regex pass over the accumulated document text and the file
//! name. Only fills fields that are still unset.

use std::sync::LazyLock;

use regex::Regex;

use crate::certificate::{CertificateParseResult, Metric, SensorType, set_if_none};
use crate::dates;
use crate::labels::{OTHER_SENSOR_TOKENS, classify, has_word};
use crate::numeric::parse_number;

const SOURCE: &str = "regex recovery";

/// Max chars between a sensor type name and its first metric label.
const TYPE_WINDOW: usize = 400;
/// Max chars between consecutive metric labels.
const LABEL_WINDOW: usize = 200;

const NUM: &str = r"([-+]?\d*\.?\d+(?:e[-+]?\d+)?)";

static RE_DATE_SEPARATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})[-/](\d{2})[-/](\d{2})").unwrap());
static RE_DATE_COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(20\d{2})(\d{2})(\d{2})(?:\D|$)").unwrap());
static RE_FILENAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(20\d{2})(\d{2})(\d{2})").unwrap());

static RE_GNSS_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:gnss|ins|imu|nav|navigation)\b[^\n]{0,80}?\b(?:model|unit|receiver)\b\s*[:\-]\s*([^\n\r|]+)",
    )
    .unwrap()
});
static RE_GNSS_SERIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:gnss|ins|imu|nav|navigation|sbg|quanta)\b[^\n]{0,160}?\b(?:s/?n|serial(?:\s*number)?)\s*[:\-]\s*([^\n\r|]+)",
    )
    .unwrap()
});
/// GNSS/INS products recognizable without any label.
static RE_GNSS_KNOWN_MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(sbg\s+quanta(?:\s+micro)?[\w\-]*)\b").unwrap());

struct MetricPattern {
    sensor: SensorType,
    name: Regex,
    /// Anchored at the type name; group 1 is the gap before the first
    /// label, the following groups are the metric values in order.
    tail: Regex,
}

fn rmse_tail(type_name: &str, axes: &[&str]) -> Regex {
    let mut pattern = format!(r"(?is)\A{type_name}\b(.{{0,{TYPE_WINDOW}}}?)");
    for (i, axis) in axes.iter().enumerate() {
        if i > 0 {
            pattern.push_str(&format!(".{{0,{LABEL_WINDOW}}}?"));
        }
        pattern.push_str(&format!(r"rmse\s*{axis}\s*[:=|]\s*{NUM}"));
    }
    Regex::new(&pattern).unwrap()
}

fn type_name(name: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{name}\b")).unwrap()
}

static METRIC_PATTERNS: LazyLock<Vec<MetricPattern>> = LazyLock::new(|| {
    vec![
        MetricPattern {
            sensor: SensorType::Vnir,
            name: type_name("vnir"),
            tail: rmse_tail("vnir", &["x", "y"]),
        },
        MetricPattern {
            sensor: SensorType::Swir,
            name: type_name("swir"),
            tail: rmse_tail("swir", &["x", "y"]),
        },
        MetricPattern {
            sensor: SensorType::Rgb,
            name: type_name("rgb"),
            tail: rmse_tail("rgb", &["x", "y", "z"]),
        },
        MetricPattern {
            sensor: SensorType::Lidar,
            name: type_name("lidar"),
            tail: Regex::new(&format!(
                r"(?is)\Alidar\b(.{{0,{TYPE_WINDOW}}}?)(?:plane\s*(?:fit|fitting)\s*rms|rms\s*plane\s*fit)\s*[:=|]\s*{NUM}"
            ))
            .unwrap(),
        },
    ]
});

/// First valid calendar date in the text: separated forms first, then
/// compact `YYYYMMDD`.
pub fn date_from_text(text: &str) -> Option<String> {
    [&*RE_DATE_SEPARATED, &*RE_DATE_COMPACT]
        .into_iter()
        .find_map(|re| {
            re.captures_iter(text)
                .find_map(|c| dates::from_parts(&c[1], &c[2], &c[3]))
        })
}

/// Date from a `YYYYMMDD_...` file name prefix.
pub fn date_from_filename(filename: &str) -> Option<String> {
    let c = RE_FILENAME_DATE.captures(filename)?;
    dates::from_parts(&c[1], &c[2], &c[3])
}

fn missing_metrics(res: &CertificateParseResult, sensor: SensorType) -> bool {
    sensor.metrics().iter().any(|m| res.metric(sensor, *m).is_none())
}

/// Metric values for `pattern`, taken from the first occurrence of the type
/// name whose window does not run into another sensor type's text.
fn find_metrics(pattern: &MetricPattern, text: &str) -> Option<Vec<Option<f64>>> {
    let own = pattern.sensor.to_string().to_uppercase();
    let others: Vec<&str> = OTHER_SENSOR_TOKENS
        .iter()
        .copied()
        .filter(|t| *t != own)
        .collect();
    pattern.name.find_iter(text).find_map(|m| {
        let caps = pattern.tail.captures(&text[m.start()..])?;
        // Whole window, including the gaps between labels.
        if has_word(&caps[0][m.len()..], &others) {
            log::debug!("{} metrics window crosses another sensor section", pattern.sensor);
            return None;
        }
        Some(
            (2..caps.len())
                .map(|i| caps.get(i).and_then(|v| parse_number(v.as_str())))
                .collect(),
        )
    })
}

fn recover_metrics(res: &mut CertificateParseResult, text: &str) {
    for pattern in METRIC_PATTERNS.iter() {
        if !missing_metrics(res, pattern.sensor) {
            continue;
        }
        let Some(values) = find_metrics(pattern, text) else {
            continue;
        };
        let metrics: &[Metric] = pattern.sensor.metrics();
        for (metric, value) in metrics.iter().zip(values) {
            if let Some(v) = value {
                res.set_metric(pattern.sensor, *metric, v, SOURCE);
            }
        }
    }
}

fn recover_gnss(res: &mut CertificateParseResult, text: &str) {
    if res.gnss_model.is_none() {
        let model = RE_GNSS_MODEL
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .filter(|m| !m.is_empty() && classify(m).is_none())
            .or_else(|| {
                RE_GNSS_KNOWN_MODEL
                    .captures(text)
                    .map(|c| c[1].trim().to_string())
            });
        if let Some(model) = model {
            set_if_none(&mut res.gnss_model, model, &"GNSS model", SOURCE);
        }
    }

    if res.gnss_sn.is_none()
        && let Some(c) = RE_GNSS_SERIAL.captures(text)
    {
        let serial = c[1].trim();
        if !serial.is_empty() && classify(serial).is_none() {
            set_if_none(&mut res.gnss_sn, serial.to_string(), &"GNSS SN", SOURCE);
        }
    }

    // Unlabelled serial in a later pipe-delimited segment of the model's line.
    if res.gnss_sn.is_none()
        && let Some(model) = res.gnss_model.clone()
    {
        let pattern = format!(
            r"(?im){}[^\n\r]*\|\s*([A-Za-z0-9\-]{{5,}})\s*(?:\||$)",
            regex::escape(&model)
        );
        let serial = Regex::new(&pattern)
            .ok()
            .and_then(|re| re.captures(text).map(|c| c[1].to_string()));
        if let Some(serial) = serial {
            set_if_none(&mut res.gnss_sn, serial, &"GNSS SN", SOURCE);
        }
    }
}

/// Fill whatever is still unset from `text` and `filename`.
pub fn recover(res: &mut CertificateParseResult, text: &str, filename: Option<&str>) {
    if res.date_iso.is_none() {
        let date = date_from_text(text).or_else(|| filename.and_then(date_from_filename));
        if let Some(date) = date {
            set_if_none(&mut res.date_iso, date, &"date", SOURCE);
        }
    }
    recover_metrics(res, text);
    recover_gnss(res, text);
}
