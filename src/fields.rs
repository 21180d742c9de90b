//! Field value extraction: merge fields (complex and simple) and content
//! controls, unified as [`FieldSource`]s.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ContentControl, Document, FieldChar, Paragraph};

/// Lowercased field name → displayed text.
pub type FieldValueMap = BTreeMap<String, String>;

static RE_MERGEFIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)MERGEFIELD\s+([\w\-.]+)").unwrap());

fn mergefield_name(instr: &str) -> Option<String> {
    RE_MERGEFIELD
        .captures(instr)
        .map(|c| c[1].trim().to_lowercase())
}

/// One encoded field found in the document.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldSource {
    /// `w:fldChar` begin / `w:instrText` / separate / displayed runs / end.
    Complex { instr: String, value: String },
    /// `w:fldSimple` carrying its instruction as an attribute.
    Simple { instr: String, value: String },
    /// `w:sdt` addressed by tag, falling back to alias.
    ContentControl {
        tag: Option<String>,
        alias: Option<String>,
        value: String,
    },
}

impl FieldSource {
    /// Lowercased key this source is recorded under, if it names one.
    pub fn name(&self) -> Option<String> {
        match self {
            FieldSource::Complex { instr, .. } | FieldSource::Simple { instr, .. } => {
                mergefield_name(instr)
            }
            FieldSource::ContentControl { tag, alias, .. } => tag
                .as_deref()
                .or(alias.as_deref())
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty()),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldSource::Complex { value, .. }
            | FieldSource::Simple { value, .. }
            | FieldSource::ContentControl { value, .. } => value.trim(),
        }
    }

    pub fn is_merge_field(&self) -> bool {
        !matches!(self, FieldSource::ContentControl { .. })
    }
}

/// Complex fields of one paragraph. A field is only emitted once its end
/// marker is seen; an unterminated field is dropped.
fn complex_fields(para: &Paragraph, out: &mut Vec<FieldSource>) {
    let mut in_field = false;
    let mut capturing = false;
    let mut instr = String::new();
    let mut value = String::new();

    for run in &para.runs {
        match run.field_char {
            Some(FieldChar::Begin) => {
                // A nested begin restarts collection for the inner field.
                in_field = true;
                capturing = false;
                instr.clear();
                value.clear();
                continue;
            }
            Some(FieldChar::Separate) if in_field => {
                capturing = true;
                value.clear();
                continue;
            }
            Some(FieldChar::End) if in_field => {
                out.push(FieldSource::Complex {
                    instr: std::mem::take(&mut instr),
                    value: std::mem::take(&mut value),
                });
                in_field = false;
                capturing = false;
                continue;
            }
            _ => {}
        }
        if !in_field {
            continue;
        }
        if let Some(t) = &run.instr_text
            && !capturing
        {
            instr.push_str(t);
        } else if capturing {
            value.push_str(&run.text);
        }
    }
    if in_field {
        log::debug!("Unterminated field {:?} dropped", instr.trim());
    }
}

fn content_control_source(cc: &ContentControl) -> FieldSource {
    FieldSource::ContentControl {
        tag: cc.tag.clone(),
        alias: cc.alias.clone(),
        value: cc.text.clone(),
    }
}

/// Every field source in the document: merge fields in paragraph order
/// (complex before simple within a paragraph), then content controls.
pub fn collect_sources(doc: &Document) -> Vec<FieldSource> {
    let mut sources = Vec::new();
    for para in doc.paragraphs() {
        complex_fields(para, &mut sources);
        sources.extend(para.simple_fields.iter().map(|f| FieldSource::Simple {
            instr: f.instr.clone(),
            value: f.text.clone(),
        }));
    }
    sources.extend(doc.content_controls.iter().map(content_control_source));
    sources
}

/// Build the field map. Merge fields: the first non-empty value per name
/// wins. Content controls only fill names no merge field gave a non-empty
/// value.
pub fn extract_field_values(doc: &Document) -> FieldValueMap {
    let mut values = FieldValueMap::new();
    for source in collect_sources(doc) {
        let Some(name) = source.name() else {
            continue;
        };
        let value = source.value();
        if !source.is_merge_field() && value.is_empty() {
            continue;
        }
        match values.get(&name) {
            Some(existing) if !existing.is_empty() => {
                log::debug!("Field {name} already set, ignoring {value:?}");
            }
            _ => {
                values.insert(name, value.to_string());
            }
        }
    }
    log::debug!("Extracted {} field values", values.len());
    values
}
