//! Section-aware walk over the document blocks.
//!
//! Blocks are visited once, in document order. Section headings switch the
//! sensor type that model/serial/metric labels belong to; rows mentioning a
//! GNSS/INS unit set a row context that lets a label on one row attach to
//! the GNSS receiver even though no GNSS section heading exists.

use std::sync::LazyLock;

use regex::Regex;

use crate::certificate::{CertificateParseResult, SensorType, set_if_none};
use crate::dates;
use crate::labels::{GNSS_TOKENS, LabelKind, OTHER_SENSOR_TOKENS, classify, has_word};
use crate::model::{Block, Paragraph, Table};
use crate::numeric::parse_number;

const SOURCE: &str = "document walk";

static RE_SAME_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9 /_\-]+?)(?:\s*:\s*|\s+-\s+)(.+?)\s*$").unwrap());
static RE_ID_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]*\d[A-Za-z0-9_\-]*$").unwrap());
static RE_SYSTEM_SN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").unwrap());

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SectionState {
    #[default]
    None,
    Vnir,
    Swir,
    Lidar,
    Rgb,
}

impl SectionState {
    pub fn sensor(self) -> Option<SensorType> {
        match self {
            SectionState::None => None,
            SectionState::Vnir => Some(SensorType::Vnir),
            SectionState::Swir => Some(SensorType::Swir),
            SectionState::Lidar => Some(SensorType::Lidar),
            SectionState::Rgb => Some(SensorType::Rgb),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowSensorContext {
    #[default]
    None,
    Gnss,
}

const HEADINGS: &[(&str, SectionState)] = &[
    ("VNIR", SectionState::Vnir),
    ("SWIR", SectionState::Swir),
    ("LIDAR", SectionState::Lidar),
    ("RGB", SectionState::Rgb),
];

/// Section named by a heading paragraph, if it is one.
fn heading_section(upper: &str) -> Option<SectionState> {
    let found = if upper.contains("CALIBRATION RESULTS") {
        HEADINGS.iter().find(|(token, _)| upper.contains(token))
    } else {
        HEADINGS.iter().find(|(token, _)| upper == *token)
    };
    found.map(|(_, section)| *section)
}

/// Split `"Label: Value"` text; accepted only when the label classifies.
fn split_label_value(text: &str) -> Option<(LabelKind, String)> {
    if let Some((label, value)) = text.split_once(':')
        && let Some(kind) = classify(label)
        && !value.trim().is_empty()
    {
        return Some((kind, value.trim().to_string()));
    }
    let caps = RE_SAME_CELL.captures(text)?;
    let kind = classify(&caps[1])?;
    Some((kind, caps[2].to_string()))
}

fn is_label(text: &str) -> bool {
    classify(text).is_some() || split_label_value(text).is_some()
}

fn looks_like_serial(s: &str) -> bool {
    s.len() >= 5
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && s.chars().any(|c| c.is_ascii_digit())
}

fn next_non_blank(cells: &[String], after: usize) -> Option<usize> {
    (after + 1..cells.len()).find(|&j| !cells[j].is_empty())
}

/// Walker state for one parse call.
pub struct BlockWalker<'r> {
    result: &'r mut CertificateParseResult,
    section: SectionState,
    context: RowSensorContext,
    lines: Vec<String>,
}

impl<'r> BlockWalker<'r> {
    pub fn new(result: &'r mut CertificateParseResult) -> Self {
        Self {
            result,
            section: SectionState::None,
            context: RowSensorContext::None,
            lines: Vec::new(),
        }
    }

    /// Forget section and row context, e.g. before walking header/footer parts.
    pub fn reset_context(&mut self) {
        self.section = SectionState::None;
        self.context = RowSensorContext::None;
    }

    pub fn walk(&mut self, blocks: &[Block]) {
        for block in blocks {
            match block {
                Block::Paragraph(p) => self.visit_paragraph(p),
                Block::Table(t) => self.visit_table(t),
            }
        }
    }

    /// Accumulated document text: one line per paragraph or table row.
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }

    fn visit_paragraph(&mut self, para: &Paragraph) {
        let text = para.normalized_text();
        if text.is_empty() {
            return;
        }
        let upper = text.to_uppercase();
        if let Some(section) = heading_section(&upper) {
            log::debug!("Entering section {section:?} at {text:?}");
            self.section = section;
            self.context = RowSensorContext::None;
        } else if let Some((kind, value)) = split_label_value(&text) {
            self.route(kind, &value, &[], None);
        }
        self.lines.push(text);
    }

    fn visit_table(&mut self, table: &Table) {
        for row in table.flattened_rows() {
            self.visit_row(&row.cell_texts());
        }
    }

    fn visit_row(&mut self, cells: &[String]) {
        if cells.iter().all(|c| c.is_empty()) {
            return;
        }
        let non_blank: Vec<&str> = cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .collect();
        self.lines.push(non_blank.join(" | "));

        // Some templates put section headings in a one-cell table row.
        if let [only] = non_blank.as_slice()
            && let Some(section) = heading_section(&only.to_uppercase())
        {
            log::debug!("Entering section {section:?} at row {only:?}");
            self.section = section;
            self.context = RowSensorContext::None;
            return;
        }

        let row_text = non_blank.join(" ");
        if has_word(&row_text, GNSS_TOKENS) {
            self.context = RowSensorContext::Gnss;
        } else if has_word(&row_text, OTHER_SENSOR_TOKENS) {
            self.context = RowSensorContext::None;
        }

        self.system_row(cells);

        for (i, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            if let Some((kind, value)) = split_label_value(cell) {
                self.route(kind, &value, cells, None);
                continue;
            }
            let Some(kind) = classify(cell) else {
                continue;
            };
            let Some(j) = next_non_blank(cells, i) else {
                continue;
            };
            if is_label(&cells[j]) {
                continue;
            }
            self.route(kind, &cells[j], cells, Some(j));
        }

        self.gnss_unlabelled_serial(cells);
    }

    /// `System | <name> | <serial>` rows.
    fn system_row(&mut self, cells: &[String]) {
        if cells.len() < 3 {
            return;
        }
        let head = cells[0].as_str();
        if !(head.eq_ignore_ascii_case("SYSTEM") || head.eq_ignore_ascii_case("CHASSIS")) {
            return;
        }
        let serial = cells[2].as_str();
        if !serial.is_empty() && RE_SYSTEM_SN.is_match(serial) {
            set_if_none(&mut self.result.system_sn, serial.to_string(), &"system SN", SOURCE);
        }
    }

    fn target_sensor(&self) -> Option<SensorType> {
        self.section.sensor().or(match self.context {
            RowSensorContext::Gnss => Some(SensorType::Gnss),
            RowSensorContext::None => None,
        })
    }

    /// Store a classified label's value. `value_idx` is the value's cell
    /// index when it came from a separate cell of `cells`.
    fn route(&mut self, kind: LabelKind, value: &str, cells: &[String], value_idx: Option<usize>) {
        match kind {
            LabelKind::Model => {
                if let Some(sensor) = self.target_sensor() {
                    set_if_none(
                        self.result.model_slot(sensor),
                        value.to_string(),
                        &format_args!("{sensor} model"),
                        SOURCE,
                    );
                }
            }
            LabelKind::Serial => {
                if let Some(sensor) = self.target_sensor() {
                    set_if_none(
                        self.result.serial_slot(sensor),
                        value.to_string(),
                        &format_args!("{sensor} SN"),
                        SOURCE,
                    );
                }
            }
            LabelKind::SystemSn => {
                let serial = value.trim();
                if RE_SYSTEM_SN.is_match(serial) {
                    set_if_none(
                        &mut self.result.system_sn,
                        serial.to_string(),
                        &"system SN",
                        SOURCE,
                    );
                }
            }
            LabelKind::Metric(metric) => {
                if let Some(sensor) = self.section.sensor()
                    && let Some(v) = parse_number(value)
                {
                    self.result.set_metric(sensor, metric, v, SOURCE);
                }
            }
            LabelKind::Date => {
                if let Some(iso) = dates::parse_labelled_date(value) {
                    set_if_none(&mut self.result.date_iso, iso, &"date", SOURCE);
                }
            }
            LabelKind::SensorTypes => {
                if self.result.sensor_types_calibrated.is_empty() {
                    self.result.sensor_types_calibrated = value
                        .split([',', ';'])
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_uppercase)
                        .collect();
                }
            }
            LabelKind::ReferenceId => {
                let mut id = value.trim().to_string();
                // IDs split across cells: "CAL-2025 | 0042"
                if let Some(j) = value_idx
                    && let Some(k) = next_non_blank(cells, j)
                    && RE_ID_PART.is_match(&cells[k])
                    && !is_label(&cells[k])
                {
                    id = format!("{id}_{}", cells[k]);
                }
                set_if_none(
                    &mut self.result.calibration_reference_id,
                    id,
                    &"calibration reference id",
                    SOURCE,
                );
            }
        }
    }

    /// GNSS rows often list `model | serial` without a serial label.
    fn gnss_unlabelled_serial(&mut self, cells: &[String]) {
        if self.section != SectionState::None
            || self.context != RowSensorContext::Gnss
            || self.result.gnss_sn.is_some()
        {
            return;
        }
        let Some(model) = self.result.gnss_model.clone() else {
            return;
        };
        if let Some(serial) = cells
            .iter()
            .rev()
            .find(|c| looks_like_serial(c) && c.as_str() != model)
        {
            set_if_none(&mut self.result.gnss_sn, serial.clone(), &"GNSS SN", SOURCE);
        }
    }
}
