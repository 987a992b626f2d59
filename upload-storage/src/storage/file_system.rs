use super::Storage;
use crate::errors::{Error, Result};
use crate::mapping::{Mapping, MappingFactory, MappingRef, PendingFile};
use crate::paths;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Local filesystem storage backend.
///
/// Nothing is cached: every call recomputes locations from the mapping, so the mapping state is
/// the single source of truth for where a file lives.
pub struct FileSystemStorage<O> {
    factory: Arc<dyn MappingFactory<O>>,
}

impl<O> FileSystemStorage<O> {
    pub fn new(factory: Arc<dyn MappingFactory<O>>) -> Self {
        Self { factory }
    }

    fn with_mapping<R>(&self, owner: &O, mapping: MappingRef<'_, O>, f: impl FnOnce(&dyn Mapping<O>) -> R) -> Result<R> {
        match mapping {
            MappingRef::Mapping(mapping) => Ok(f(mapping)),
            MappingRef::Name(name) => {
                let mapping = self
                    .factory
                    .from_name(owner, name)
                    .ok_or_else(|| Error::MappingNotFound { name: name.to_string() })?;
                Ok(f(mapping.as_ref()))
            }
        }
    }
}

impl<O> fmt::Debug for FileSystemStorage<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystemStorage").finish_non_exhaustive()
    }
}

/// Stored file name, treating an empty name as nothing stored
fn stored_file_name<O>(owner: &O, mapping: &dyn Mapping<O>) -> Option<String> {
    mapping.file_name(owner).filter(|name| !name.is_empty())
}

impl<O> Storage<O> for FileSystemStorage<O> {
    fn upload(&self, owner: &O, mapping: &dyn Mapping<O>) -> Result<Option<PathBuf>> {
        let file = match mapping.file(owner) {
            PendingFile::Uploaded(file) => file,
            PendingFile::Absent => {
                tracing::debug!("No pending upload for mapping {}, skipping", mapping.mapping_name());
                return Ok(None);
            }
            PendingFile::Incompatible(kind) => {
                tracing::debug!("Mapping {} holds {} rather than an upload, skipping", mapping.mapping_name(), kind);
                return Ok(None);
            }
        };

        let generated = if mapping.has_namer() {
            mapping.namer().map(|namer| namer.name(owner, mapping))
        } else {
            None
        };
        let name = generated.unwrap_or_else(|| file.client_original_name().to_string());

        let mut directory = paths::join(mapping.upload_destination(), &mapping.upload_dir(owner));
        let (sub_dir, file_name) = paths::split_file_name(&name);
        if let Some(sub_dir) = sub_dir {
            directory = paths::append_dir(&directory, sub_dir);
        }

        let stored = file.move_to(Path::new(&directory), file_name)?;
        tracing::info!("Stored upload for mapping {} at {:?}", mapping.mapping_name(), stored);

        Ok(Some(stored))
    }

    fn remove(&self, owner: &O, mapping: &dyn Mapping<O>) -> Result<bool> {
        let Some(file_name) = stored_file_name(owner, mapping) else {
            tracing::debug!("Mapping {} has no stored file, nothing to remove", mapping.mapping_name());
            return Ok(false);
        };

        let path = PathBuf::from(paths::join(mapping.upload_destination(), &file_name));
        if !path.exists() {
            tracing::debug!("Stored file {:?} is already gone", path);
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|source| Error::Remove { path: path.clone(), source })?;
        tracing::info!("Removed {:?} for mapping {}", path, mapping.mapping_name());

        Ok(true)
    }

    // Unlike upload, the upload dir is not layered under the destination here.
    fn resolve_path(&self, owner: &O, mapping: MappingRef<'_, O>) -> Result<Option<PathBuf>> {
        self.with_mapping(owner, mapping, |mapping| {
            stored_file_name(owner, mapping).map(|name| PathBuf::from(paths::join(mapping.upload_destination(), &name)))
        })
    }

    fn resolve_uri(&self, owner: &O, mapping: MappingRef<'_, O>) -> Result<Option<String>> {
        self.with_mapping(owner, mapping, |mapping| {
            stored_file_name(owner, mapping).map(|name| paths::public_uri(mapping.uri_prefix(), &mapping.upload_dir(owner), &name))
        })
    }
}
