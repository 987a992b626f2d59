//! Mapping metadata consumed by the storage adapter.
//!
//! A [`Mapping`] describes one uploadable field of an owner record: where files land on disk, how
//! they are named and which public URI prefix serves them. Mappings are looked up through a
//! [`MappingFactory`], either all at once for an owner or by name.
//!
//! The storage adapter only ever sees these traits. [`PropertyMapping`] and [`MappingRegistry`] are
//! the config-driven implementations shipped with the crate.

mod property;

pub use property::{MappingRegistry, PropertyMapping};

use crate::naming::Namer;
use crate::storage::UploadedFile;
use std::sync::Arc;

/// The value currently held by a mapping's file field.
///
/// Only [`PendingFile::Uploaded`] is actionable. Anything else is skipped by the storage without
/// raising an error.
#[derive(Debug, Clone, Default)]
pub enum PendingFile {
    /// Nothing has been assigned to the field
    #[default]
    Absent,
    /// The field holds something that is not an upload (a plain file reference, an unrelated
    /// value). The string describes it for logs.
    Incompatible(String),
    /// A client-submitted file waiting to be moved into place
    Uploaded(Arc<dyn UploadedFile>),
}

impl PendingFile {
    pub fn as_uploaded(&self) -> Option<&Arc<dyn UploadedFile>> {
        match self {
            PendingFile::Uploaded(file) => Some(file),
            _ => None,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.as_uploaded().is_some()
    }
}

/// Per-field upload configuration for owner records of type `O`.
pub trait Mapping<O>: Send + Sync {
    /// Name the mapping is registered under
    fn mapping_name(&self) -> &str;

    /// Pending upload value for this field
    fn file(&self, owner: &O) -> PendingFile;

    /// Absolute base directory files are stored under
    fn upload_destination(&self) -> &str;

    /// Sub-directory for this owner, possibly empty
    fn upload_dir(&self, owner: &O) -> String;

    /// Public URL prefix corresponding to the upload destination
    fn uri_prefix(&self) -> &str;

    /// Name of the file currently stored for this owner, if any
    fn file_name(&self, owner: &O) -> Option<String>;

    fn namer(&self) -> Option<&dyn Namer<O>>;

    fn has_namer(&self) -> bool {
        self.namer().is_some()
    }

    /// Whether the stored file is deleted when a new upload replaces it
    fn delete_on_update(&self) -> bool {
        true
    }

    /// Whether the stored file is deleted when the owner is removed
    fn delete_on_remove(&self) -> bool {
        true
    }
}

/// Resolves mappings for owner records.
pub trait MappingFactory<O>: Send + Sync {
    /// Every mapping that applies to `owner`, in a stable order
    fn from_object(&self, owner: &O) -> Vec<Arc<dyn Mapping<O>>>;

    /// The mapping registered as `name`, if any
    fn from_name(&self, owner: &O, name: &str) -> Option<Arc<dyn Mapping<O>>>;
}

/// Either a mapping descriptor or the name of one, to be resolved through the factory.
pub enum MappingRef<'a, O> {
    Name(&'a str),
    Mapping(&'a dyn Mapping<O>),
}

impl<'a, O> From<&'a str> for MappingRef<'a, O> {
    fn from(name: &'a str) -> Self {
        MappingRef::Name(name)
    }
}

impl<'a, O> From<&'a dyn Mapping<O>> for MappingRef<'a, O> {
    fn from(mapping: &'a dyn Mapping<O>) -> Self {
        MappingRef::Mapping(mapping)
    }
}

impl<'a, O> From<&'a Arc<dyn Mapping<O>>> for MappingRef<'a, O> {
    fn from(mapping: &'a Arc<dyn Mapping<O>>) -> Self {
        MappingRef::Mapping(mapping.as_ref())
    }
}
