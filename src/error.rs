use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::EntryKind;
use crate::post::IssueId;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Archive error: {0}")]
    Archive(String),
    #[error("Archive has no {0} entry")]
    EntryNotFound(EntryKind),
    #[error("Failed to parse {entry}: {reason}")]
    Parse { entry: String, reason: String },
    #[error("No issue metadata found for issue {0}")]
    Join(IssueId),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(value: zip::result::ZipError) -> Self {
        ConvertError::Archive(value.to_string())
    }
}

impl From<quick_xml::Error> for ConvertError {
    fn from(value: quick_xml::Error) -> Self {
        ConvertError::Export(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
