//! File naming strategies.
//!
//! A [`Namer`] computes the stored file name for an upload. The name may contain `/`-separated
//! sub-directories, which the storage turns into directories under the mapping's destination.
//!
//! Two strategies ship with the crate and can be selected per mapping in configuration:
//!
//! - [`UniqidNamer`] (`namer: uniqid`): a random unique id keeping the original extension,
//!   e.g. `3f2a...e1.png`
//! - [`OrignameNamer`] (`namer: origname`): a random unique id prefixed to the original name,
//!   e.g. `3f2a...e1_holiday photo.png`

use crate::mapping::{Mapping, PendingFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Computes a stored file name from an owner record and its mapping.
pub trait Namer<O>: Send + Sync {
    fn name(&self, owner: &O, mapping: &dyn Mapping<O>) -> String;
}

/// Built-in namers selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamerKind {
    Uniqid,
    Origname,
}

impl NamerKind {
    pub fn build<O: 'static>(self) -> Arc<dyn Namer<O>> {
        match self {
            NamerKind::Uniqid => Arc::new(UniqidNamer),
            NamerKind::Origname => Arc::new(OrignameNamer),
        }
    }
}

/// Names files `<unique id>.<original extension>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqidNamer;

impl<O> Namer<O> for UniqidNamer {
    fn name(&self, owner: &O, mapping: &dyn Mapping<O>) -> String {
        let id = unique_id();
        match original_name(owner, mapping).as_deref().and_then(extension) {
            Some(ext) => format!("{id}.{ext}"),
            None => id,
        }
    }
}

/// Names files `<unique id>_<original name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrignameNamer;

impl<O> Namer<O> for OrignameNamer {
    fn name(&self, owner: &O, mapping: &dyn Mapping<O>) -> String {
        let id = unique_id();
        match original_name(owner, mapping) {
            Some(original) => format!("{id}_{original}"),
            None => id,
        }
    }
}

fn unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Client name of the pending upload, or the stored name when nothing is pending.
fn original_name<O>(owner: &O, mapping: &dyn Mapping<O>) -> Option<String> {
    let name = match mapping.file(owner) {
        PendingFile::Uploaded(file) => Some(file.client_original_name().to_string()),
        _ => mapping.file_name(owner),
    };
    name.filter(|name| !name.is_empty())
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}
