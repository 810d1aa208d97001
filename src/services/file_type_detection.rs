use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::IngestError;

/// Container formats the ingestion normalizer can decode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            MIME_CSV => Some(FileFormat::Csv),
            MIME_XLSX => Some(FileFormat::Xlsx),
            MIME_XLS => Some(FileFormat::Xls),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
        };
        f.write_str(name)
    }
}

pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_CSV: &str = "text/csv";

/// Zip local file header, the outer container of every xlsx
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// OLE2 compound document header used by legacy xls
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Decide which decoder to use for an upload.
///
/// The upload is accepted when either the declared mime type or the file
/// extension is recognized; otherwise it is rejected before any parsing.
/// Among accepted uploads the magic bytes win, then the extension, then the
/// mime type. Anything left is treated as delimited text.
pub fn detect_file_format(
    file_name: &str,
    declared_mime: Option<&str>,
    file_data: &[u8],
) -> Result<FileFormat, IngestError> {
    let by_extension = extension_of(file_name).and_then(|ext| FileFormat::from_extension(&ext));
    let by_mime = declared_mime.and_then(FileFormat::from_mime);

    if by_extension.is_none() && by_mime.is_none() {
        return Err(IngestError::UnsupportedFormat {
            file_name: file_name.to_string(),
        });
    }

    Ok(detect_from_magic(file_data)
        .or(by_extension)
        .or(by_mime)
        .unwrap_or(FileFormat::Csv))
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

fn detect_from_magic(file_data: &[u8]) -> Option<FileFormat> {
    if file_data.starts_with(ZIP_MAGIC) {
        Some(FileFormat::Xlsx)
    } else if file_data.starts_with(OLE_MAGIC) {
        Some(FileFormat::Xls)
    } else {
        None
    }
}
