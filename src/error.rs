//! Error type for the calcert-docx library.
//!
//! Only container-level failures are errors. Everything that goes wrong inside
//! a readable document (a malformed field, a date that does not parse, a row
//! of an unknown shape) degrades to the corresponding field staying unset.

use thiserror::Error;

/// Fatal errors: the document could not be read at all, so no partial
/// result is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a DOCX package (not a ZIP, or no main part).
    #[error("invalid DOCX: {0}")]
    InvalidDocx(String),

    /// The main document part is not well-formed XML.
    #[error("malformed document XML: {0}")]
    Xml(#[from] roxmltree::Error),
}
