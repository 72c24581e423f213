use crate::error::ConvertError;
use crate::post::{Author, Post};

pub mod slug;
pub mod wxr_writer;

/// Collects posts and their author and turns them into an export document.
///
/// Posts are written in the order they are added. `serialize` consumes the writer,
/// so nothing can be added once the document is produced.
pub trait ExportWriter {
    fn add_post(&mut self, post: Post);

    /// Fails when an author was already added.
    fn add_author(&mut self, author: Author) -> Result<(), ConvertError>;

    /// Fails when no author was added.
    fn serialize(self) -> Result<String, ConvertError>;
}
