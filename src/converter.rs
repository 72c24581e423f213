use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use spdlog::info;

use crate::archive::{EntryKind, ExportArchive};
use crate::config::{Config, MissingIssuePolicy, Site};
use crate::content::assemble_issues;
use crate::error::ConvertError;
use crate::export::wxr_writer::WxrWriter;
use crate::export::ExportWriter;
use crate::metadata::join_metadata;
use crate::post::{Author, Post};

pub struct Converter {
    site: Site,
    author: Author,
    missing_issue: MissingIssuePolicy,
}

impl Converter {
    pub fn new(site: Site, author: Author, missing_issue: MissingIssuePolicy) -> Self {
        Converter {
            site,
            author,
            missing_issue,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.site.clone(), Author::from(&config.author), config.convert.missing_issue)
    }

    pub fn convert_archive(&self, archive_path: &Path) -> Result<String, ConvertError> {
        info!("Reading archive {}", archive_path.display());
        let archive = ExportArchive::open(archive_path)?;
        self.convert(archive)
    }

    pub fn convert_reader<R: Read + Seek>(&self, reader: R) -> Result<String, ConvertError> {
        let archive = ExportArchive::from_reader(reader)?;
        self.convert(archive)
    }

    /// Builds the posts of an archive without serializing them.
    pub fn posts<R: Read + Seek>(&self, archive: &mut ExportArchive<R>) -> Result<Vec<Post>, ConvertError> {
        let entries = archive.entry_map();
        let items_entry = entries.require(EntryKind::Items)?.to_string();
        let issues_entry = entries.require(EntryKind::Issues)?.to_string();

        let raw_items = archive.read_entry(&items_entry)?;
        let issues = assemble_issues(&raw_items)?;
        info!("Assembled {} issues from {}", issues.len(), items_entry);

        let raw_issues = archive.read_entry(&issues_entry)?;
        let posts = join_metadata(&raw_issues, issues, self.missing_issue)?;
        info!("Joined {} posts with metadata from {}", posts.len(), issues_entry);

        Ok(posts)
    }

    fn convert<R: Read + Seek>(&self, mut archive: ExportArchive<R>) -> Result<String, ConvertError> {
        let posts = self.posts(&mut archive)?;
        drop(archive);

        let mut writer = WxrWriter::new(self.site.clone());
        let post_count = posts.len();
        for post in posts {
            writer.add_post(post);
        }
        writer.add_author(self.author.clone())?;
        let xml = writer.serialize()?;
        info!("Generated export with {} posts", post_count);

        Ok(xml)
    }
}

/// Output next to the archive, with the same base name and an `.xml` extension.
pub fn default_output_path(archive_path: &Path) -> PathBuf {
    archive_path.with_extension("xml")
}

pub fn write_export(output_path: &Path, xml: &str) -> Result<(), ConvertError> {
    fs::write(output_path, xml).map_err(|e| ConvertError::Write {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    info!("Export written to {}", output_path.display());
    Ok(())
}
