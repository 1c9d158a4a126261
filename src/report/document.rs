use crate::report::slot::{normalize_stem, OutputSlot, DOCUMENT_EXTENSION};
use crate::report::ReportError;
use crate::shared::fs_atomic::write_new_file;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub file_name: String,
}

pub fn document_file_name(filename: &str) -> String {
    format!("{}.{DOCUMENT_EXTENSION}", normalize_stem(filename))
}

pub fn write_document(
    slot: &OutputSlot,
    filename: &str,
    content: &str,
) -> Result<SourceDocument, ReportError> {
    let file_name = document_file_name(filename);
    let path = slot.directory_path.join(&file_name);
    write_new_file(&path, content.as_bytes()).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(SourceDocument { path, file_name })
}
