//! # upload-storage: filesystem storage for mapped uploads
//!
//! `upload-storage` places client-submitted files on disk according to declarative mapping
//! metadata, resolves where a stored file lives (as a filesystem path or a public URI), and removes
//! stored files once nothing references them.
//!
//! ## Overview
//!
//! Every uploadable field of an owner record is described by a [`Mapping`]: the directory files
//! are stored under, an optional per-owner sub-directory, the public URI prefix serving that
//! directory, and an optional [`Namer`] that picks the stored file name. Mappings are looked up
//! through a [`MappingFactory`], either all at once for an owner or by name.
//!
//! [`FileSystemStorage`] is the storage adapter. It performs four operations:
//!
//! - **upload**: move the mapping's pending upload into `destination/upload_dir`, named by the
//!   mapping's namer or after the client's original file name. A namer may return sub-directories
//!   (`2024/05/photo.png`), which end up as directories below the destination.
//! - **remove**: delete the file currently stored for the mapping.
//! - **resolve_path**: the absolute path of the stored file.
//! - **resolve_uri**: the public URI of the stored file.
//!
//! Routine states are skipped silently: a mapping holding no upload (or something that is not an
//! upload), an owner with no stored file, a stored file that is already gone. Only failures of the
//! underlying move or delete surface as [`Error`]s.
//!
//! Nothing is cached. Every call recomputes locations from the mapping, and every call is a
//! single synchronous filesystem transaction. Callers serialize work on the same owner.
//!
//! ## Components
//!
//! - [`mapping`]: the [`Mapping`] and [`MappingFactory`] traits, the [`PendingFile`] value, and the
//!   config-driven [`PropertyMapping`] / [`MappingRegistry`] implementations.
//! - [`naming`]: the [`Namer`] trait and the stock `uniqid` / `origname` strategies.
//! - [`storage`]: the [`Storage`] trait, [`FileSystemStorage`], and the [`UploadedFile`] handle
//!   with its local-disk implementation [`LocalUploadedFile`].
//! - [`handler`]: [`UploadHandler`], the entry point a persistence layer calls from its
//!   persist/update/remove hooks.
//! - [`config`]: YAML + environment configuration of named mappings.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use upload_storage::{
//!     Config, FileSystemStorage, LocalUploadedFile, MappingFactory, MappingRegistry, PendingFile,
//!     PropertyMapping, UploadHandler, UploadedFile,
//! };
//!
//! struct Product {
//!     image: Option<Arc<dyn UploadedFile>>,
//!     image_name: Option<String>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load("uploads.yaml")?;
//!
//! let registry = MappingRegistry::<Product>::from_config(&config, |name, mapping| {
//!     (name == "product_image").then(|| {
//!         PropertyMapping::new(
//!             name,
//!             mapping.clone(),
//!             |p: &Product| p.image.clone().map(PendingFile::Uploaded).unwrap_or_default(),
//!             |p: &Product| p.image_name.clone(),
//!         )
//!     })
//! })?;
//! let factory: Arc<dyn MappingFactory<Product>> = Arc::new(registry);
//! let storage = Arc::new(FileSystemStorage::new(factory.clone()));
//! let handler = UploadHandler::new(storage, factory);
//!
//! let product = Product {
//!     image: Some(Arc::new(LocalUploadedFile::new("/tmp/upload-1234", "shoe.png"))),
//!     image_name: None,
//! };
//! let stored = handler.on_persist(&product)?;
//! println!("stored at {:?}", stored);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod handler;
pub mod mapping;
pub mod naming;
pub mod paths;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Config, MappingConfig};
pub use errors::{Error, Result};
pub use handler::UploadHandler;
pub use mapping::{Mapping, MappingFactory, MappingRef, MappingRegistry, PendingFile, PropertyMapping};
pub use naming::{Namer, NamerKind, OrignameNamer, UniqidNamer};
pub use storage::{FileSystemStorage, LocalUploadedFile, Storage, UploadedFile};
