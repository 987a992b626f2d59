//! Test doubles for storage tests (available with `test-utils` feature).
//!
//! [`RecordingMapping`] and [`RecordingFile`] count the calls made on them so tests can assert
//! which parts of a mapping an operation touched, and which moves it asked for.

use crate::errors::{Error, Result};
use crate::mapping::{Mapping, PendingFile};
use crate::naming::Namer;
use crate::storage::UploadedFile;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Owner record used throughout the tests
#[derive(Debug, Clone, Default)]
pub struct DummyEntity {
    pub id: u32,
    pub file: Option<Arc<dyn UploadedFile>>,
    pub file_name: Option<String>,
}

impl DummyEntity {
    pub fn pending(&self) -> PendingFile {
        match &self.file {
            Some(file) => PendingFile::Uploaded(file.clone()),
            None => PendingFile::Absent,
        }
    }
}

/// Mapping with fixed answers that records every accessor call.
pub struct RecordingMapping {
    name: String,
    pending: PendingFile,
    upload_destination: String,
    upload_dir: String,
    uri_prefix: String,
    file_name: Option<String>,
    namer: Option<Arc<dyn Namer<DummyEntity>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl RecordingMapping {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pending: PendingFile::Absent,
            upload_destination: String::new(),
            upload_dir: String::new(),
            uri_prefix: "/uploads".to_string(),
            file_name: None,
            namer: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_pending(mut self, pending: PendingFile) -> Self {
        self.pending = pending;
        self
    }

    pub fn with_uploaded(self, original_name: &str) -> Self {
        self.with_pending(PendingFile::Uploaded(Arc::new(RecordingFile::new(original_name))))
    }

    pub fn with_destination(mut self, upload_destination: &str) -> Self {
        self.upload_destination = upload_destination.to_string();
        self
    }

    pub fn with_upload_dir(mut self, upload_dir: &str) -> Self {
        self.upload_dir = upload_dir.to_string();
        self
    }

    pub fn with_uri_prefix(mut self, uri_prefix: &str) -> Self {
        self.uri_prefix = uri_prefix.to_string();
        self
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_namer(mut self, namer: Arc<dyn Namer<DummyEntity>>) -> Self {
        self.namer = Some(namer);
        self
    }

    /// Number of times the named accessor was called
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().entry(method).or_insert(0) += 1;
    }
}

impl fmt::Debug for RecordingMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingMapping")
            .field("name", &self.name)
            .field("pending", &self.pending)
            .field("upload_destination", &self.upload_destination)
            .field("upload_dir", &self.upload_dir)
            .field("file_name", &self.file_name)
            .field("has_namer", &self.namer.is_some())
            .finish()
    }
}

impl Mapping<DummyEntity> for RecordingMapping {
    fn mapping_name(&self) -> &str {
        &self.name
    }

    fn file(&self, _owner: &DummyEntity) -> PendingFile {
        self.record("file");
        self.pending.clone()
    }

    fn upload_destination(&self) -> &str {
        self.record("upload_destination");
        &self.upload_destination
    }

    fn upload_dir(&self, _owner: &DummyEntity) -> String {
        self.record("upload_dir");
        self.upload_dir.clone()
    }

    fn uri_prefix(&self) -> &str {
        self.record("uri_prefix");
        &self.uri_prefix
    }

    fn file_name(&self, _owner: &DummyEntity) -> Option<String> {
        self.record("file_name");
        self.file_name.clone()
    }

    fn namer(&self) -> Option<&dyn Namer<DummyEntity>> {
        self.record("namer");
        self.namer.as_deref()
    }

    fn has_namer(&self) -> bool {
        self.record("has_namer");
        self.namer.is_some()
    }
}

/// Uploaded file that records requested moves instead of touching the filesystem.
#[derive(Debug)]
pub struct RecordingFile {
    original_name: String,
    failure: Option<io::ErrorKind>,
    moves: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingFile {
    pub fn new(original_name: &str) -> Self {
        Self {
            original_name: original_name.to_string(),
            failure: None,
            moves: Mutex::new(Vec::new()),
        }
    }

    /// A file whose every move fails with `kind`
    pub fn failing(original_name: &str, kind: io::ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::new(original_name)
        }
    }

    pub fn moves(&self) -> Vec<(PathBuf, String)> {
        self.moves.lock().clone()
    }
}

impl UploadedFile for RecordingFile {
    fn client_original_name(&self) -> &str {
        &self.original_name
    }

    fn move_to(&self, directory: &Path, name: &str) -> Result<PathBuf> {
        self.moves.lock().push((directory.to_path_buf(), name.to_string()));

        if let Some(kind) = self.failure {
            return Err(Error::Move {
                directory: directory.to_path_buf(),
                name: name.to_string(),
                source: io::Error::new(kind, "simulated move failure"),
            });
        }

        Ok(directory.join(name))
    }
}

/// Namer returning the same name every time.
#[derive(Debug)]
pub struct FixedNamer {
    name: String,
    calls: AtomicUsize,
}

impl FixedNamer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<O> Namer<O> for FixedNamer {
    fn name(&self, _owner: &O, _mapping: &dyn Mapping<O>) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.name.clone()
    }
}
