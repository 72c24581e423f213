use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use spdlog::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::ConvertError;

pub mod entry_kind;

pub use entry_kind::{EntryKind, EntryMap};

/// A Revue export archive.
///
/// The zip handle is held for the lifetime of this value and released when it is dropped,
/// so a failed read still closes the archive.
pub struct ExportArchive<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl ExportArchive<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ConvertError> {
        let file = File::open(path)
            .map_err(|e| ConvertError::Archive(format!("Error opening {}: {}", path.display(), e)))?;
        debug!("Opened archive {}", path.display());
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> ExportArchive<R> {
    pub fn from_reader(reader: R) -> Result<Self, ConvertError> {
        let zip = ZipArchive::new(reader)?;
        Ok(ExportArchive { zip })
    }

    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(|name| name.to_string()).collect()
    }

    pub fn entry_map(&self) -> EntryMap {
        EntryMap::from_names(self.zip.file_names())
    }

    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ConvertError> {
        let mut file = match self.zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(ConvertError::Archive(format!("Entry {} not found in archive", name))),
            Err(e) => return Err(e.into()),
        };

        // The declared size comes from the zip header and is not trusted for allocation
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| ConvertError::Archive(format!("Error reading entry {}: {}", name, e)))?;
        debug!("Read {} bytes from {}", buf.len(), name);

        Ok(buf)
    }
}

/// Lists the entry names of the archive at `path`, closing it before returning.
pub fn list_entries(path: &Path) -> Result<Vec<String>, ConvertError> {
    let archive = ExportArchive::open(path)?;
    Ok(archive.entry_names())
}

/// Reads one entry of the archive at `path`, closing it before returning.
pub fn read_entry(path: &Path, name: &str) -> Result<Vec<u8>, ConvertError> {
    let mut archive = ExportArchive::open(path)?;
    archive.read_entry(name)
}
