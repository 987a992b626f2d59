//! Lifecycle entry point for persistence layers.
//!
//! A persistence layer calls [`UploadHandler`] from its own hooks: after an owner is first saved,
//! when it is updated, and when it is deleted. The handler walks every mapping of the owner and
//! delegates to a [`Storage`] backend, honoring each mapping's `delete_on_update` and
//! `delete_on_remove` flags. Writing the new file name back onto the owner stays with the caller.

use crate::errors::Result;
use crate::mapping::{MappingFactory, MappingRef};
use crate::storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;

pub struct UploadHandler<O> {
    storage: Arc<dyn Storage<O>>,
    factory: Arc<dyn MappingFactory<O>>,
}

impl<O> Clone for UploadHandler<O> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<O> UploadHandler<O> {
    pub fn new(storage: Arc<dyn Storage<O>>, factory: Arc<dyn MappingFactory<O>>) -> Self {
        Self { storage, factory }
    }

    /// Store every pending upload of a newly persisted owner.
    pub fn on_persist(&self, owner: &O) -> Result<Vec<PathBuf>> {
        let mut stored = Vec::new();
        for mapping in self.factory.from_object(owner) {
            if let Some(path) = self.storage.upload(owner, mapping.as_ref())? {
                stored.push(path);
            }
        }
        Ok(stored)
    }

    /// Store every pending upload of an updated owner.
    ///
    /// `previous` is the owner as it was before the update. For mappings with `delete_on_update`
    /// set, the file stored for `previous` is removed once the new upload is in place, unless the
    /// new upload landed on the same path. A failed upload leaves the previous file untouched.
    pub fn on_update(&self, owner: &O, previous: &O) -> Result<Vec<PathBuf>> {
        let mut stored = Vec::new();
        for mapping in self.factory.from_object(owner) {
            let Some(path) = self.storage.upload(owner, mapping.as_ref())? else {
                continue;
            };

            if mapping.delete_on_update() {
                let replaced = self.storage.resolve_path(previous, MappingRef::from(&mapping))?;
                if replaced.is_some_and(|old| old != path) && self.storage.remove(previous, mapping.as_ref())? {
                    tracing::debug!("Replaced previous upload for mapping {}", mapping.mapping_name());
                }
            }

            stored.push(path);
        }
        Ok(stored)
    }

    /// Remove stored files of a deleted owner, for mappings with `delete_on_remove` set.
    pub fn on_remove(&self, owner: &O) -> Result<usize> {
        let mut removed = 0;
        for mapping in self.factory.from_object(owner) {
            if !mapping.delete_on_remove() {
                tracing::debug!("Mapping {} keeps files on remove", mapping.mapping_name());
                continue;
            }

            if self.storage.remove(owner, mapping.as_ref())? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
