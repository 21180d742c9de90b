use std::collections::HashMap;
use std::io::{Read, Seek};

use super::{REL_NS, WML_NS, is_wml};

pub(super) fn read_zip_text<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    name: &str,
) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

/// Relationship ID → target for the main document part.
pub(super) fn parse_relationships<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
) -> HashMap<String, String> {
    let Some(xml_content) = read_zip_text(zip, "word/_rels/document.xml.rels") else {
        return HashMap::new();
    };
    parse_rels_xml(&xml_content)
}

fn zip_path(target: &str) -> String {
    target
        .strip_prefix('/')
        .map(String::from)
        .unwrap_or_else(|| format!("word/{}", target))
}

/// Zip paths of every header and footer referenced by any `w:sectPr` below
/// `body`, each listed once, in first reference order.
pub(super) fn header_footer_parts(
    body: roxmltree::Node,
    rels: &HashMap<String, String>,
) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for sect in body.descendants().filter(|n| is_wml(*n, "sectPr")) {
        for child in sect.children() {
            if !(is_wml(child, "headerReference") || is_wml(child, "footerReference")) {
                continue;
            }
            let Some(target) = child.attribute((REL_NS, "id")).and_then(|rid| rels.get(rid))
            else {
                log::debug!(
                    "Unresolved {} ({:?})",
                    child.tag_name().name(),
                    child.attribute((WML_NS, "type"))
                );
                continue;
            };
            let path = zip_path(target);
            if !parts.contains(&path) {
                parts.push(path);
            }
        }
    }
    parts
}
