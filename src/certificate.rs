use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::dates;
use crate::fields::FieldValueMap;
use crate::labels::{FieldTarget, MERGE_FIELD_SYNONYMS};
use crate::numeric::parse_number;
use crate::placeholder::is_placeholder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SensorType {
    #[serde(rename = "VNIR")]
    Vnir,
    #[serde(rename = "SWIR")]
    Swir,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "LiDAR")]
    Lidar,
    #[serde(rename = "GNSS")]
    Gnss,
}

impl SensorType {
    pub const ALL: [SensorType; 5] = [
        SensorType::Vnir,
        SensorType::Swir,
        SensorType::Rgb,
        SensorType::Lidar,
        SensorType::Gnss,
    ];

    /// Calibration metrics this sensor type carries.
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            SensorType::Vnir | SensorType::Swir => &[Metric::RmseX, Metric::RmseY],
            SensorType::Rgb => &[Metric::RmseX, Metric::RmseY, Metric::RmseZ],
            SensorType::Lidar => &[Metric::PlaneFit],
            SensorType::Gnss => &[],
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SensorType::Vnir => "VNIR",
            SensorType::Swir => "SWIR",
            SensorType::Rgb => "RGB",
            SensorType::Lidar => "LiDAR",
            SensorType::Gnss => "GNSS",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Metric {
    #[serde(rename = "RMSE_X")]
    RmseX,
    #[serde(rename = "RMSE_Y")]
    RmseY,
    #[serde(rename = "RMSE_Z")]
    RmseZ,
    #[serde(rename = "Plane_Fit")]
    PlaneFit,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::RmseX => "RMSE_X",
            Metric::RmseY => "RMSE_Y",
            Metric::RmseZ => "RMSE_Z",
            Metric::PlaneFit => "Plane_Fit",
        })
    }
}

/// Structured result of parsing one calibration certificate.
///
/// Every scalar is set at most once: the first stage that finds a value
/// (merge fields, then the document walk, then regex recovery) owns it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CertificateParseResult {
    /// Calibration date as `YYYY-MM-DD`.
    pub date_iso: Option<String>,
    pub calibration_reference_id: Option<String>,
    /// Declared sensor types, uppercased, in declaration order.
    pub sensor_types_calibrated: Vec<String>,
    /// Chassis/system serial number.
    pub system_sn: Option<String>,

    pub vnir_rmse_x: Option<f64>,
    pub vnir_rmse_y: Option<f64>,
    pub swir_rmse_x: Option<f64>,
    pub swir_rmse_y: Option<f64>,
    pub rgb_rmse_x: Option<f64>,
    pub rgb_rmse_y: Option<f64>,
    pub rgb_rmse_z: Option<f64>,
    pub lidar_plane_fit: Option<f64>,

    pub vnir_model: Option<String>,
    pub vnir_sn: Option<String>,
    pub swir_model: Option<String>,
    pub swir_sn: Option<String>,
    pub rgb_model: Option<String>,
    pub rgb_sn: Option<String>,
    pub lidar_model: Option<String>,
    pub lidar_sn: Option<String>,
    pub gnss_model: Option<String>,
    pub gnss_sn: Option<String>,
}

/// Store `value` in `slot` unless it already holds something.
pub(crate) fn set_if_none<T: fmt::Debug>(
    slot: &mut Option<T>,
    value: T,
    field: &dyn fmt::Display,
    source: &str,
) -> bool {
    if slot.is_some() {
        return false;
    }
    log::debug!("{field} = {value:?} (from {source})");
    *slot = Some(value);
    true
}

impl CertificateParseResult {
    pub fn model(&self, sensor: SensorType) -> Option<&str> {
        match sensor {
            SensorType::Vnir => self.vnir_model.as_deref(),
            SensorType::Swir => self.swir_model.as_deref(),
            SensorType::Rgb => self.rgb_model.as_deref(),
            SensorType::Lidar => self.lidar_model.as_deref(),
            SensorType::Gnss => self.gnss_model.as_deref(),
        }
    }

    pub fn serial(&self, sensor: SensorType) -> Option<&str> {
        match sensor {
            SensorType::Vnir => self.vnir_sn.as_deref(),
            SensorType::Swir => self.swir_sn.as_deref(),
            SensorType::Rgb => self.rgb_sn.as_deref(),
            SensorType::Lidar => self.lidar_sn.as_deref(),
            SensorType::Gnss => self.gnss_sn.as_deref(),
        }
    }

    pub fn metric(&self, sensor: SensorType, metric: Metric) -> Option<f64> {
        match (sensor, metric) {
            (SensorType::Vnir, Metric::RmseX) => self.vnir_rmse_x,
            (SensorType::Vnir, Metric::RmseY) => self.vnir_rmse_y,
            (SensorType::Swir, Metric::RmseX) => self.swir_rmse_x,
            (SensorType::Swir, Metric::RmseY) => self.swir_rmse_y,
            (SensorType::Rgb, Metric::RmseX) => self.rgb_rmse_x,
            (SensorType::Rgb, Metric::RmseY) => self.rgb_rmse_y,
            (SensorType::Rgb, Metric::RmseZ) => self.rgb_rmse_z,
            (SensorType::Lidar, Metric::PlaneFit) => self.lidar_plane_fit,
            _ => None,
        }
    }

    pub(crate) fn model_slot(&mut self, sensor: SensorType) -> &mut Option<String> {
        match sensor {
            SensorType::Vnir => &mut self.vnir_model,
            SensorType::Swir => &mut self.swir_model,
            SensorType::Rgb => &mut self.rgb_model,
            SensorType::Lidar => &mut self.lidar_model,
            SensorType::Gnss => &mut self.gnss_model,
        }
    }

    pub(crate) fn serial_slot(&mut self, sensor: SensorType) -> &mut Option<String> {
        match sensor {
            SensorType::Vnir => &mut self.vnir_sn,
            SensorType::Swir => &mut self.swir_sn,
            SensorType::Rgb => &mut self.rgb_sn,
            SensorType::Lidar => &mut self.lidar_sn,
            SensorType::Gnss => &mut self.gnss_sn,
        }
    }

    /// `None` when the sensor type does not carry that metric.
    pub(crate) fn metric_slot(
        &mut self,
        sensor: SensorType,
        metric: Metric,
    ) -> Option<&mut Option<f64>> {
        match (sensor, metric) {
            (SensorType::Vnir, Metric::RmseX) => Some(&mut self.vnir_rmse_x),
            (SensorType::Vnir, Metric::RmseY) => Some(&mut self.vnir_rmse_y),
            (SensorType::Swir, Metric::RmseX) => Some(&mut self.swir_rmse_x),
            (SensorType::Swir, Metric::RmseY) => Some(&mut self.swir_rmse_y),
            (SensorType::Rgb, Metric::RmseX) => Some(&mut self.rgb_rmse_x),
            (SensorType::Rgb, Metric::RmseY) => Some(&mut self.rgb_rmse_y),
            (SensorType::Rgb, Metric::RmseZ) => Some(&mut self.rgb_rmse_z),
            (SensorType::Lidar, Metric::PlaneFit) => Some(&mut self.lidar_plane_fit),
            _ => None,
        }
    }

    /// Set the per-type metric if the type carries it and it is still unset.
    pub(crate) fn set_metric(
        &mut self,
        sensor: SensorType,
        metric: Metric,
        value: f64,
        source: &str,
    ) -> bool {
        match self.metric_slot(sensor, metric) {
            Some(slot) => set_if_none(slot, value, &format_args!("{sensor} {metric}"), source),
            None => false,
        }
    }

    /// Metrics grouped by sensor type; a type appears only when at least one
    /// of its metrics was found.
    pub fn metrics_by_type(&self) -> BTreeMap<SensorType, BTreeMap<Metric, Option<f64>>> {
        SensorType::ALL
            .iter()
            .filter(|s| s.metrics().iter().any(|m| self.metric(**s, *m).is_some()))
            .map(|s| {
                let values = s.metrics().iter().map(|m| (*m, self.metric(*s, *m))).collect();
                (*s, values)
            })
            .collect()
    }

    pub fn has_metrics(&self) -> bool {
        !self.metrics_by_type().is_empty()
    }

    /// Seed a result from merge-field / content-control values.
    pub fn from_fields(fields: &FieldValueMap) -> Self {
        let mut res = CertificateParseResult::default();
        for (target, names) in MERGE_FIELD_SYNONYMS {
            let Some(value) = lookup(fields, names) else {
                continue;
            };
            res.apply_field(*target, value);
        }
        res
    }

    fn apply_field(&mut self, target: FieldTarget, value: &str) {
        const SOURCE: &str = "merge field";
        match target {
            FieldTarget::Date => match dates::parse_labelled_date(value) {
                Some(iso) => {
                    set_if_none(&mut self.date_iso, iso, &"date", SOURCE);
                }
                None => log::debug!("Unparsable date field value {value:?}"),
            },
            FieldTarget::ReferenceId => {
                set_if_none(
                    &mut self.calibration_reference_id,
                    value.to_string(),
                    &"calibration reference id",
                    SOURCE,
                );
            }
            FieldTarget::SensorTypes => {
                if self.sensor_types_calibrated.is_empty() {
                    self.sensor_types_calibrated = value
                        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                        .filter(|t| !t.is_empty())
                        .map(str::to_uppercase)
                        .collect();
                }
            }
            FieldTarget::SystemSn => {
                set_if_none(&mut self.system_sn, value.to_string(), &"system SN", SOURCE);
            }
            FieldTarget::Model(sensor) => {
                set_if_none(
                    self.model_slot(sensor),
                    value.to_string(),
                    &format_args!("{sensor} model"),
                    SOURCE,
                );
            }
            FieldTarget::Serial(sensor) => {
                set_if_none(
                    self.serial_slot(sensor),
                    value.to_string(),
                    &format_args!("{sensor} SN"),
                    SOURCE,
                );
            }
            FieldTarget::Metric(sensor, metric) => {
                if let Some(v) = parse_number(value) {
                    self.set_metric(sensor, metric, v, SOURCE);
                }
            }
        }
    }
}

/// First candidate name with a genuine (non-blank, non-placeholder) value.
fn lookup<'a>(fields: &'a FieldValueMap, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        let value = fields.get(&name.to_lowercase())?.trim();
        if is_placeholder(value, names) {
            log::debug!("Field {name} holds placeholder {value:?}");
            return None;
        }
        Some(value)
    })
}
