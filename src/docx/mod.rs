mod parts;

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::{
    Block, ContentControl, Document, FieldChar, Paragraph, Run, SimpleField, Table, TableCell,
    TableRow,
};

use parts::{header_footer_parts, parse_relationships, read_zip_text};

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(super) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(super) fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(super) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

pub(super) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

/// Flatten SDT wrappers: descend into w:sdtContent and collect effective children.
fn collect_block_nodes<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

/// Run-level containers whose runs belong to the enclosing paragraph.
const RUN_CONTAINERS: &[&str] = &["hyperlink", "smartTag", "ins", "customXml", "fldSimple"];

fn collect_run_nodes<'a>(
    parent: roxmltree::Node<'a, 'a>,
    simple_fields: &mut Vec<SimpleField>,
    out: &mut Vec<roxmltree::Node<'a, 'a>>,
) {
    for child in parent.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        let name = child.tag_name().name();
        if name == "r" {
            out.push(child);
        } else if name == "sdt" {
            if let Some(content) = wml(child, "sdtContent") {
                collect_run_nodes(content, simple_fields, out);
            }
        } else if RUN_CONTAINERS.contains(&name) {
            if name == "fldSimple" {
                simple_fields.push(SimpleField {
                    instr: child.attribute((WML_NS, "instr")).unwrap_or("").to_string(),
                    text: descendant_text(child),
                });
            }
            collect_run_nodes(child, simple_fields, out);
        }
    }
}

fn parse_run(run_node: roxmltree::Node) -> Run {
    let mut run = Run::default();
    // Iterate children in document order to handle w:t, w:tab, w:br, w:fldChar, w:instrText
    for child in run_node.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "fldChar" => {
                run.field_char = match child.attribute((WML_NS, "fldCharType")) {
                    Some("begin") => Some(FieldChar::Begin),
                    Some("separate") => Some(FieldChar::Separate),
                    Some("end") => Some(FieldChar::End),
                    other => {
                        log::debug!("Ignoring fldChar with type {other:?}");
                        None
                    }
                };
            }
            "instrText" => {
                if let Some(t) = child.text() {
                    run.instr_text.get_or_insert_with(String::new).push_str(t);
                }
            }
            "t" => {
                if let Some(t) = child.text() {
                    run.text.push_str(t);
                }
            }
            "tab" => run.text.push('\t'),
            "br" | "cr" => run.text.push('\n'),
            _ => {}
        }
    }
    run
}

fn parse_paragraph(para_node: roxmltree::Node) -> Paragraph {
    let mut simple_fields = Vec::new();
    let mut run_nodes = Vec::new();
    collect_run_nodes(para_node, &mut simple_fields, &mut run_nodes);
    Paragraph {
        runs: run_nodes.into_iter().map(parse_run).collect(),
        simple_fields,
    }
}

fn parse_table(tbl_node: roxmltree::Node) -> Table {
    let rows = collect_block_nodes(tbl_node)
        .into_iter()
        .filter(|n| is_wml(*n, "tr"))
        .map(|tr| TableRow {
            cells: collect_block_nodes(tr)
                .into_iter()
                .filter(|n| is_wml(*n, "tc"))
                .map(|tc| TableCell {
                    blocks: parse_blocks(tc),
                })
                .collect(),
        })
        .collect();
    Table { rows }
}

/// Paragraphs and tables under `parent`, in document order.
fn parse_blocks(parent: roxmltree::Node) -> Vec<Block> {
    let mut blocks = Vec::new();
    for node in collect_block_nodes(parent) {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "p" => blocks.push(Block::Paragraph(parse_paragraph(node))),
            "tbl" => blocks.push(Block::Table(parse_table(node))),
            _ => {}
        }
    }
    blocks
}

/// Concatenation of every `w:t` below `node`.
fn descendant_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| is_wml(*n, "t"))
        .filter_map(|n| n.text())
        .collect()
}

fn collect_content_controls(root: roxmltree::Node, out: &mut Vec<ContentControl>) {
    for sdt in root.descendants().filter(|n| is_wml(*n, "sdt")) {
        let props = wml(sdt, "sdtPr");
        let tag = props
            .and_then(|p| wml_attr(p, "tag"))
            .filter(|v| !v.trim().is_empty())
            .map(String::from);
        let alias = props
            .and_then(|p| wml_attr(p, "alias"))
            .filter(|v| !v.trim().is_empty())
            .map(String::from);
        let Some(content) = wml(sdt, "sdtContent") else {
            continue;
        };
        out.push(ContentControl {
            tag,
            alias,
            text: descendant_text(content),
        });
    }
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_archive(file)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    parse_archive(Cursor::new(bytes))
}

fn parse_archive<R: Read + Seek>(reader: R) -> Result<Document, Error> {
    let mut zip = zip::ZipArchive::new(reader)
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

    let mut xml_content = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
        .read_to_string(&mut xml_content)?;

    let xml = roxmltree::Document::parse(&xml_content)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut doc = Document {
        body: parse_blocks(body),
        ..Document::default()
    };
    collect_content_controls(body, &mut doc.content_controls);

    let rels = parse_relationships(&mut zip);
    for part in header_footer_parts(body, &rels) {
        let Some(part_xml) = read_zip_text(&mut zip, &part) else {
            log::warn!("Header/footer part {part} is referenced but missing");
            continue;
        };
        let part_doc = match roxmltree::Document::parse(&part_xml) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Skipping malformed header/footer part {part}: {e}");
                continue;
            }
        };
        let part_root = part_doc.root_element();
        doc.headers_footers.extend(parse_blocks(part_root));
        collect_content_controls(part_root, &mut doc.content_controls);
    }

    log::debug!(
        "Parsed DOCX: {} body blocks, {} header/footer blocks, {} content controls",
        doc.body.len(),
        doc.headers_footers.len(),
        doc.content_controls.len(),
    );
    Ok(doc)
}
