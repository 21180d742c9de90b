mod certificate;
mod dates;
mod docx;
mod error;
mod fields;
mod labels;
mod model;
mod numeric;
mod placeholder;
mod recovery;
mod walker;

pub use certificate::{CertificateParseResult, Metric, SensorType};
pub use error::Error;
pub use fields::{FieldSource, FieldValueMap};
pub use numeric::parse_number;
pub use placeholder::is_placeholder;

use std::path::Path;
use std::time::Instant;

use model::Document;
use walker::BlockWalker;

/// Parse a calibration certificate. The file name doubles as a date source
/// when the document itself carries no date.
pub fn parse_calibration_certificate(path: &Path) -> Result<CertificateParseResult, Error> {
    let t0 = Instant::now();
    let doc = docx::parse(path)?;
    let t_load = t0.elapsed();

    let filename = path.file_name().and_then(|n| n.to_str());
    let res = extract(&doc, filename);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: load={:.1}ms, extract={:.1}ms, total={:.1}ms ({})",
        t_load.as_secs_f64() * 1000.0,
        (t_total - t_load).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        path.display(),
    );
    Ok(res)
}

/// Parse a certificate held in memory. `filename` is only used for date
/// recovery.
pub fn parse_calibration_certificate_bytes(
    input: &[u8],
    filename: Option<&str>,
) -> Result<CertificateParseResult, Error> {
    let t0 = Instant::now();
    let doc = docx::parse_bytes(input)?;
    let res = extract(&doc, filename);
    log::info!(
        "Timing: total={:.1}ms ({} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        input.len(),
    );
    Ok(res)
}

/// Raw `{field name → displayed value}` map, for showing an operator which
/// fields a certificate carries when no metric could be mapped.
pub fn extract_merge_fields(path: &Path) -> Result<FieldValueMap, Error> {
    let doc = docx::parse(path)?;
    Ok(fields::extract_field_values(&doc))
}

pub fn extract_merge_fields_bytes(input: &[u8]) -> Result<FieldValueMap, Error> {
    let doc = docx::parse_bytes(input)?;
    Ok(fields::extract_field_values(&doc))
}

/// Field values seed the result, the section-aware walk fills gaps in
/// document order, and regex recovery fills what is left.
fn extract(doc: &Document, filename: Option<&str>) -> CertificateParseResult {
    let values = fields::extract_field_values(doc);
    let mut res = if values.is_empty() {
        CertificateParseResult::default()
    } else {
        CertificateParseResult::from_fields(&values)
    };

    let mut walker = BlockWalker::new(&mut res);
    walker.walk(&doc.body);
    walker.reset_context();
    walker.walk(&doc.headers_footers);
    let text = walker.into_text();

    recovery::recover(&mut res, &text, filename);

    let found: Vec<String> = res.metrics_by_type().keys().map(|s| s.to_string()).collect();
    log::info!(
        "Certificate: date={:?}, metrics for [{}], {} field values",
        res.date_iso,
        found.join(", "),
        values.len(),
    );
    res
}
