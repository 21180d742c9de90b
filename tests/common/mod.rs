//! In-memory DOCX builder for tests. Bodies are written as WordprocessingML
//! fragments; helpers produce the common shapes found in certificates.
#![allow(dead_code)]

use std::io::{Cursor, Write};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn document_xml(body: &str, sect_pr: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NS}><w:body>{body}{sect_pr}</w:body></w:document>"#
    )
}

/// A DOCX whose body is `body`.
pub fn docx(body: &str) -> Vec<u8> {
    zip_parts(&[
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("word/document.xml", document_xml(body, "")),
    ])
}

/// A DOCX with one default header part holding `header` and one default
/// footer part holding `footer`.
pub fn docx_with_header_footer(body: &str, header: &str, footer: &str) -> Vec<u8> {
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
<Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
</Relationships>"#;
    let sect_pr = r#"<w:sectPr><w:headerReference w:type="default" r:id="rId8"/><w:footerReference w:type="default" r:id="rId9"/></w:sectPr>"#;
    zip_parts(&[
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("word/document.xml", document_xml(body, sect_pr)),
        ("word/_rels/document.xml.rels", rels.to_string()),
        ("word/header1.xml", format!(r#"<w:hdr {NS}>{header}</w:hdr>"#)),
        ("word/footer1.xml", format!(r#"<w:ftr {NS}>{footer}</w:ftr>"#)),
    ])
}

pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

pub fn p(text: &str) -> String {
    format!("<w:p>{}</w:p>", run(text))
}

/// Complex field runs: begin, instruction, separate, value, end.
pub fn complex_field_runs(name: &str, value: &str) -> String {
    format!(
        concat!(
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> MERGEFIELD {} \* MERGEFORMAT </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            "{}",
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
        ),
        name,
        run(value)
    )
}

pub fn complex_field(name: &str, value: &str) -> String {
    format!("<w:p>{}</w:p>", complex_field_runs(name, value))
}

pub fn simple_field(name: &str, value: &str) -> String {
    format!(
        r#"<w:p><w:fldSimple w:instr=" MERGEFIELD {} "><w:r><w:t>{}</w:t></w:r></w:fldSimple></w:p>"#,
        name,
        escape(value)
    )
}

/// Block-level content control.
pub fn content_control(tag: Option<&str>, alias: Option<&str>, text: &str) -> String {
    let tag = tag
        .map(|t| format!(r#"<w:tag w:val="{}"/>"#, escape(t)))
        .unwrap_or_default();
    let alias = alias
        .map(|a| format!(r#"<w:alias w:val="{}"/>"#, escape(a)))
        .unwrap_or_default();
    format!("<w:sdt><w:sdtPr>{alias}{tag}</w:sdtPr><w:sdtContent>{}</w:sdtContent></w:sdt>", p(text))
}

pub fn cell(content: &str) -> String {
    format!("<w:tc>{}</w:tc>", p(content))
}

pub fn table(rows: &[&[&str]]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells.iter().map(|c| cell(c)).collect();
            format!("<w:tr>{cells}</w:tr>")
        })
        .collect();
    format!("<w:tbl>{rows}</w:tbl>")
}

/// One-row table whose only cell holds `inner` (already-built blocks)
/// after a paragraph of text.
pub fn table_with_nested(text: &str, inner: &str) -> String {
    format!("<w:tbl><w:tr><w:tc>{}{inner}</w:tc></w:tr></w:tbl>", p(text))
}

pub fn parse(body: &str) -> calcert_docx::CertificateParseResult {
    let _ = env_logger::try_init();
    calcert_docx::parse_calibration_certificate_bytes(&docx(body), None).unwrap()
}

pub fn parse_named(body: &str, filename: &str) -> calcert_docx::CertificateParseResult {
    let _ = env_logger::try_init();
    calcert_docx::parse_calibration_certificate_bytes(&docx(body), Some(filename)).unwrap()
}

pub fn fields(body: &str) -> calcert_docx::FieldValueMap {
    let _ = env_logger::try_init();
    calcert_docx::extract_merge_fields_bytes(&docx(body)).unwrap()
}
