use super::{Mapping, MappingFactory, PendingFile};
use crate::config::{Config, MappingConfig};
use crate::errors::{Error, Result};
use crate::naming::Namer;
use std::fmt;
use std::sync::Arc;

type FileAccessor<O> = Box<dyn Fn(&O) -> PendingFile + Send + Sync>;
type FileNameAccessor<O> = Box<dyn Fn(&O) -> Option<String> + Send + Sync>;
type UploadDirAccessor<O> = Box<dyn Fn(&O) -> String + Send + Sync>;

/// Mapping built from a [`MappingConfig`] plus accessors into the owner record.
///
/// The file accessor reads the pending upload and the file-name accessor reads the stored name.
/// The upload directory defaults to empty; supply [`PropertyMapping::with_upload_dir`] to spread
/// files over per-owner sub-directories.
pub struct PropertyMapping<O> {
    name: String,
    config: MappingConfig,
    file: FileAccessor<O>,
    file_name: FileNameAccessor<O>,
    upload_dir: Option<UploadDirAccessor<O>>,
    namer: Option<Arc<dyn Namer<O>>>,
}

impl<O: 'static> PropertyMapping<O> {
    pub fn new<F, N>(name: impl Into<String>, config: MappingConfig, file: F, file_name: N) -> Self
    where
        F: Fn(&O) -> PendingFile + Send + Sync + 'static,
        N: Fn(&O) -> Option<String> + Send + Sync + 'static,
    {
        let namer = config.namer.map(|kind| kind.build());
        Self {
            name: name.into(),
            config,
            file: Box::new(file),
            file_name: Box::new(file_name),
            upload_dir: None,
            namer,
        }
    }

    pub fn with_upload_dir<D>(mut self, upload_dir: D) -> Self
    where
        D: Fn(&O) -> String + Send + Sync + 'static,
    {
        self.upload_dir = Some(Box::new(upload_dir));
        self
    }

    /// Override the namer selected by configuration
    pub fn with_namer(mut self, namer: Arc<dyn Namer<O>>) -> Self {
        self.namer = Some(namer);
        self
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }
}

impl<O> fmt::Debug for PropertyMapping<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMapping")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("has_upload_dir", &self.upload_dir.is_some())
            .field("has_namer", &self.namer.is_some())
            .finish()
    }
}

impl<O> Mapping<O> for PropertyMapping<O> {
    fn mapping_name(&self) -> &str {
        &self.name
    }

    fn file(&self, owner: &O) -> PendingFile {
        (self.file)(owner)
    }

    fn upload_destination(&self) -> &str {
        &self.config.upload_destination
    }

    fn upload_dir(&self, owner: &O) -> String {
        self.upload_dir.as_ref().map(|dir| dir(owner)).unwrap_or_default()
    }

    fn uri_prefix(&self) -> &str {
        &self.config.uri_prefix
    }

    fn file_name(&self, owner: &O) -> Option<String> {
        (self.file_name)(owner)
    }

    fn namer(&self) -> Option<&dyn Namer<O>> {
        self.namer.as_deref()
    }

    fn delete_on_update(&self) -> bool {
        self.config.delete_on_update
    }

    fn delete_on_remove(&self) -> bool {
        self.config.delete_on_remove
    }
}

/// In-memory [`MappingFactory`] holding named mappings in registration order.
pub struct MappingRegistry<O> {
    mappings: Vec<Arc<dyn Mapping<O>>>,
}

impl<O> Default for MappingRegistry<O> {
    fn default() -> Self {
        Self { mappings: Vec::new() }
    }
}

impl<O> MappingRegistry<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping. Names must be unique within the registry.
    pub fn register(&mut self, mapping: Arc<dyn Mapping<O>>) -> Result<()> {
        if self.get(mapping.mapping_name()).is_some() {
            return Err(Error::DuplicateMapping {
                name: mapping.mapping_name().to_string(),
            });
        }

        tracing::debug!("Registered upload mapping {}", mapping.mapping_name());
        self.mappings.push(mapping);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Mapping<O>>> {
        self.mappings.iter().find(|mapping| mapping.mapping_name() == name)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<O: 'static> MappingRegistry<O> {
    /// Build a registry from the configured mappings.
    ///
    /// `accessors` is called once per configured mapping and returns the file and file-name
    /// accessors for it, or `None` to leave that mapping out (e.g. it belongs to another owner
    /// type).
    pub fn from_config<A>(config: &Config, mut accessors: A) -> Result<Self>
    where
        A: FnMut(&str, &MappingConfig) -> Option<PropertyMapping<O>>,
    {
        let mut registry = Self::new();
        for (name, mapping_config) in &config.mappings {
            match accessors(name, mapping_config) {
                Some(mapping) => registry.register(Arc::new(mapping))?,
                None => tracing::debug!("No accessors supplied for mapping {}, leaving it out", name),
            }
        }
        Ok(registry)
    }
}

impl<O> fmt::Debug for MappingRegistry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.mappings.iter().map(|mapping| mapping.mapping_name()))
            .finish()
    }
}

impl<O> MappingFactory<O> for MappingRegistry<O> {
    fn from_object(&self, _owner: &O) -> Vec<Arc<dyn Mapping<O>>> {
        self.mappings.clone()
    }

    fn from_name(&self, _owner: &O, name: &str) -> Option<Arc<dyn Mapping<O>>> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamerKind;
    use crate::test_utils::{DummyEntity, FixedNamer, RecordingFile};

    fn avatar_config() -> MappingConfig {
        MappingConfig {
            upload_destination: "/var/www/web/uploads/avatars".to_string(),
            uri_prefix: "/uploads/avatars".to_string(),
            ..Default::default()
        }
    }

    fn avatar_mapping(config: MappingConfig) -> PropertyMapping<DummyEntity> {
        PropertyMapping::new(
            "avatar",
            config,
            |owner: &DummyEntity| owner.pending(),
            |owner: &DummyEntity| owner.file_name.clone(),
        )
    }

    #[test]
    fn test_property_mapping_reads_owner_through_accessors() {
        let mapping = avatar_mapping(avatar_config()).with_upload_dir(|owner: &DummyEntity| format!("user_{}", owner.id));
        let owner = DummyEntity {
            id: 7,
            file: Some(Arc::new(RecordingFile::new("me.png"))),
            file_name: Some("previous.png".to_string()),
        };

        assert_eq!(mapping.mapping_name(), "avatar");
        assert_eq!(mapping.upload_destination(), "/var/www/web/uploads/avatars");
        assert_eq!(mapping.uri_prefix(), "/uploads/avatars");
        assert_eq!(mapping.upload_dir(&owner), "user_7");
        assert_eq!(mapping.file_name(&owner).as_deref(), Some("previous.png"));
        assert!(mapping.file(&owner).is_uploaded());
        assert!(!mapping.has_namer());
        assert!(mapping.delete_on_update());
        assert!(mapping.delete_on_remove());
    }

    #[test]
    fn test_property_mapping_upload_dir_defaults_to_empty() {
        let mapping = avatar_mapping(avatar_config());
        assert_eq!(mapping.upload_dir(&DummyEntity::default()), "");
        assert!(matches!(mapping.file(&DummyEntity::default()), PendingFile::Absent));
    }

    #[test]
    fn test_property_mapping_namer_from_config_and_override() {
        let config = MappingConfig {
            namer: Some(NamerKind::Uniqid),
            ..avatar_config()
        };
        let mapping = avatar_mapping(config);
        assert!(mapping.has_namer());

        let mapping = avatar_mapping(avatar_config()).with_namer(Arc::new(FixedNamer::new("fixed.png")));
        let owner = DummyEntity::default();
        let namer = mapping.namer().expect("namer should be set");
        assert_eq!(namer.name(&owner, &mapping), "fixed.png");
    }

    #[test]
    fn test_registry_resolves_by_name_and_lists_in_order() {
        let mut registry = MappingRegistry::new();
        registry.register(Arc::new(avatar_mapping(avatar_config()))).unwrap();
        registry
            .register(Arc::new(PropertyMapping::new(
                "document",
                MappingConfig::default(),
                |_: &DummyEntity| PendingFile::Absent,
                |_: &DummyEntity| None,
            )))
            .unwrap();

        let owner = DummyEntity::default();
        let names: Vec<String> = registry
            .from_object(&owner)
            .iter()
            .map(|mapping| mapping.mapping_name().to_string())
            .collect();
        assert_eq!(names, vec!["avatar", "document"]);

        assert!(registry.from_name(&owner, "document").is_some());
        assert!(registry.from_name(&owner, "missing").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let mut registry = MappingRegistry::new();
        registry.register(Arc::new(avatar_mapping(avatar_config()))).unwrap();

        let result = registry.register(Arc::new(avatar_mapping(avatar_config())));
        assert!(matches!(result, Err(Error::DuplicateMapping { name }) if name == "avatar"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_from_config_skips_mappings_without_accessors() {
        let mut config = Config::default();
        config.mappings.insert("avatar".to_string(), avatar_config());
        config.mappings.insert("invoice".to_string(), MappingConfig::default());

        let registry = MappingRegistry::<DummyEntity>::from_config(&config, |name, mapping_config| {
            (name == "avatar").then(|| avatar_mapping(mapping_config.clone()))
        })
        .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("avatar").is_some());
        assert!(registry.get("invoice").is_none());
    }
}
