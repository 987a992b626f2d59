//! Storage backends for mapped uploads.

mod file_system;
mod uploaded_file;

pub use file_system::FileSystemStorage;
pub use uploaded_file::{LocalUploadedFile, UploadedFile};

use crate::errors::Result;
use crate::mapping::{Mapping, MappingRef};
use std::path::PathBuf;

/// Trait for upload storage backends
pub trait Storage<O>: Send + Sync {
    /// Move the mapping's pending upload into place.
    ///
    /// Returns the stored path, or `None` when the mapping holds no upload.
    fn upload(&self, owner: &O, mapping: &dyn Mapping<O>) -> Result<Option<PathBuf>>;

    /// Delete the file currently stored for the mapping.
    ///
    /// Returns whether a file was deleted. Nothing stored, or a file already gone, is not an error.
    fn remove(&self, owner: &O, mapping: &dyn Mapping<O>) -> Result<bool>;

    /// Absolute path of the stored file
    fn resolve_path(&self, owner: &O, mapping: MappingRef<'_, O>) -> Result<Option<PathBuf>>;

    /// Public URI of the stored file
    fn resolve_uri(&self, owner: &O, mapping: MappingRef<'_, O>) -> Result<Option<String>>;
}
