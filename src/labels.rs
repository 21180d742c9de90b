//! Static label tables: merge-field name synonyms per logical field, and
//! the table/paragraph label vocabulary used by the document walk.

use crate::certificate::{Metric, SensorType};

/// Where a merge-field value lands in the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldTarget {
    Date,
    ReferenceId,
    SensorTypes,
    SystemSn,
    Model(SensorType),
    Serial(SensorType),
    Metric(SensorType, Metric),
}

use crate::certificate::Metric as M;
use crate::certificate::SensorType as S;
use FieldTarget as T;

/// Merge-field / content-control names per logical field, compared
/// case-insensitively. Earlier names win.
pub(crate) static MERGE_FIELD_SYNONYMS: &[(FieldTarget, &[&str])] = &[
    (T::Date, &["CAL_DATE", "CALIBRATION_DATE", "DATE"]),
    (T::ReferenceId, &["CALIBRATION_REFERENCE_ID", "CAL_REF_ID"]),
    (T::SensorTypes, &["SENSOR_TYPES_CALIBRATED"]),
    (
        T::SystemSn,
        &[
            "SYSTEM_SN",
            "SYSTEM",
            "SYSTEM_SERIAL",
            "SYSTEM_SERIAL_NUMBER",
            "SYSTEMSERIAL",
            "CHASSIS_SN",
            "CHASSIS",
            "CHASSIS_SERIAL",
            "CHASSIS_SERIAL_NUMBER",
        ],
    ),
    (
        T::Model(S::Gnss),
        &[
            "GNSS_MODEL",
            "GNSS_MODEL_NAME",
            "GNSS",
            "GNSS_RECEIVER",
            "GNSS_RECEIVER_MODEL",
            "GNSS_UNIT",
            "INS_MODEL",
            "INS_MODEL_NAME",
            "INS",
            "IMU_MODEL",
            "IMU_MODEL_NAME",
            "IMU",
            "NAV_MODEL",
            "NAV_MODEL_NAME",
            "NAVIGATION_MODEL",
            "NAVIGATION_UNIT",
            "NAVIGATION",
        ],
    ),
    (
        T::Serial(S::Gnss),
        &[
            "GNSS_SN",
            "GNSS_SERIAL",
            "GNSS_SERIAL_NUMBER",
            "GNSS_RECEIVER_SN",
            "GNSS_RECEIVER_SERIAL",
            "GNSS_UNIT_SN",
            "INS_SN",
            "INS_SERIAL",
            "IMU_SN",
            "IMU_SERIAL",
            "NAV_SN",
            "NAV_SERIAL",
            "RECEIVER_SN",
            "RECEIVER_SERIAL",
            "UNIT_SN",
            "DEVICE_SN",
        ],
    ),
    (T::Model(S::Vnir), &["VNIR_MODEL", "VNIR_MODEL_NAME", "VNIR", "VNIR_CAMERA_MODEL"]),
    (T::Serial(S::Vnir), &["VNIR_SN", "VNIR_SERIAL", "VNIR_SERIAL_NUMBER"]),
    (T::Model(S::Swir), &["SWIR_MODEL", "SWIR_MODEL_NAME", "SWIR", "SWIR_CAMERA_MODEL"]),
    (T::Serial(S::Swir), &["SWIR_SN", "SWIR_SERIAL", "SWIR_SERIAL_NUMBER"]),
    (T::Model(S::Lidar), &["LIDAR_MODEL", "LIDAR", "LIDAR_SENSOR_MODEL"]),
    (T::Serial(S::Lidar), &["LIDAR_SN", "LIDAR_SERIAL", "LIDAR_SERIAL_NUMBER"]),
    (T::Model(S::Rgb), &["RGB_MODEL", "RGB_MODEL_NAME", "RGB", "RGB_CAMERA_MODEL"]),
    (T::Serial(S::Rgb), &["RGB_SN", "RGB_SERIAL", "RGB_SERIAL_NUMBER"]),
    (T::Metric(S::Vnir, M::RmseX), &["VNIR_RMSE_X", "VNIR_X"]),
    (T::Metric(S::Vnir, M::RmseY), &["VNIR_RMSE_Y", "VNIR_Y"]),
    (T::Metric(S::Swir, M::RmseX), &["SWIR_RMSE_X", "SWIR_X"]),
    (T::Metric(S::Swir, M::RmseY), &["SWIR_RMSE_Y", "SWIR_Y"]),
    (T::Metric(S::Rgb, M::RmseX), &["RGB_RMSE_X", "RGB_X"]),
    (T::Metric(S::Rgb, M::RmseY), &["RGB_RMSE_Y", "RGB_Y"]),
    (T::Metric(S::Rgb, M::RmseZ), &["RGB_RMSE_Z", "RGB_Z"]),
    (
        T::Metric(S::Lidar, M::PlaneFit),
        &["LIDAR_PLANE_FIT", "LIDAR_PLANE_RMS", "PLANE_FIT", "LIDAR_RMS"],
    ),
];

/// What a table or paragraph label names, before a sensor is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LabelKind {
    Model,
    Serial,
    /// Serial label of the chassis, e.g. `System SN`.
    SystemSn,
    Metric(Metric),
    Date,
    SensorTypes,
    ReferenceId,
}

const MODEL_LABELS: &[&str] = &[
    "MODEL",
    "MODEL NAME",
    "UNIT",
    "CAMERA MODEL",
    "SENSOR MODEL",
    "RECEIVER MODEL",
];
const MODEL_SUFFIXES: &[&str] = &[" MODEL", " MODEL NAME", " UNIT"];

const SERIAL_LABELS: &[&str] = &[
    "SERIAL NUMBER",
    "SERIAL",
    "SERIAL NO",
    "SERIAL NO.",
    "S/N",
    "SN",
    "UNIT SN",
    "DEVICE SN",
    "RECEIVER SN",
    "RECEIVER S/N",
];
const SERIAL_SUFFIXES: &[&str] = &[" SN", " S/N", " SERIAL", " SERIAL NUMBER", " SERIAL NO"];

const DATE_LABELS: &[&str] = &["DATE", "CALIBRATION DATE", "CAL DATE", "DATE OF CALIBRATION"];
const SENSOR_TYPE_LABELS: &[&str] = &[
    "SENSORS",
    "SENSOR TYPES",
    "SENSOR TYPES CALIBRATED",
    "SENSORS CALIBRATED",
];
const REFERENCE_ID_LABELS: &[&str] = &[
    "CALIBRATION REFERENCE ID",
    "CAL REF ID",
    "CALIBRATION REFERENCE",
    "REFERENCE ID",
];

/// Uppercase, `_` → space, whitespace collapsed, trailing `:` dropped.
pub(crate) fn normalize_label(label: &str) -> String {
    let upper = label.to_uppercase().replace('_', " ");
    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(':').trim_end().to_string()
}

fn matches(label: &str, exact: &[&str], suffixes: &[&str]) -> bool {
    exact.contains(&label) || suffixes.iter().any(|s| label.ends_with(s))
}

/// Classify a label; `None` for anything outside the vocabulary.
pub(crate) fn classify(label: &str) -> Option<LabelKind> {
    let label = normalize_label(label);
    if label.is_empty() {
        return None;
    }
    let general = label.contains("GENERAL INFORMATION");

    if label.contains("RMSE X") {
        return Some(LabelKind::Metric(Metric::RmseX));
    }
    if label.contains("RMSE Y") {
        return Some(LabelKind::Metric(Metric::RmseY));
    }
    if label.contains("RMSE Z") {
        return Some(LabelKind::Metric(Metric::RmseZ));
    }
    if label.contains("PLANE") && label.contains("RMS") {
        return Some(LabelKind::Metric(Metric::PlaneFit));
    }
    if matches(&label, SERIAL_LABELS, SERIAL_SUFFIXES) {
        if label.starts_with("SYSTEM") || label.starts_with("CHASSIS") {
            return Some(LabelKind::SystemSn);
        }
        return Some(LabelKind::Serial);
    }
    if matches(&label, MODEL_LABELS, MODEL_SUFFIXES) {
        return Some(LabelKind::Model);
    }
    if REFERENCE_ID_LABELS.iter().any(|l| label.contains(l)) {
        return Some(LabelKind::ReferenceId);
    }
    if DATE_LABELS.contains(&label.as_str()) || (general && label.contains("DATE")) {
        return Some(LabelKind::Date);
    }
    if SENSOR_TYPE_LABELS.contains(&label.as_str()) || (general && label.contains("SENSOR")) {
        return Some(LabelKind::SensorTypes);
    }
    None
}

/// Whole-word tokens marking a GNSS/INS row or text span.
pub(crate) const GNSS_TOKENS: &[&str] = &["GNSS", "INS", "IMU", "NAV", "NAVIGATION", "SBG", "QUANTA"];

/// Tokens naming the other sensor types; a row with these and no GNSS token
/// ends a GNSS row context.
pub(crate) const OTHER_SENSOR_TOKENS: &[&str] = &["VNIR", "SWIR", "RGB", "LIDAR"];

/// True if any alphanumeric word of `text` equals one of `tokens`, ignoring case.
pub(crate) fn has_word(text: &str, tokens: &[&str]) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|w| tokens.iter().any(|t| w.eq_ignore_ascii_case(t)))
}
