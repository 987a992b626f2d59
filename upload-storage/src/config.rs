//! Upload mapping configuration.
//!
//! Configuration is loaded from a YAML file with environment variable overrides, merged in this
//! order (later sources override earlier ones):
//!
//! 1. **YAML config file** - the path given to [`Config::load`]
//! 2. **Environment variables** - variables prefixed with `UPLOAD_STORAGE_` override YAML values
//!
//! For nested values use double underscores, e.g.
//! `UPLOAD_STORAGE_MAPPINGS__AVATAR__URI_PREFIX=/media/avatars` sets
//! `mappings.avatar.uri_prefix`.
//!
//! ## Example
//!
//! ```yaml
//! mappings:
//!   avatar:
//!     upload_destination: /var/www/project/web/uploads/avatars
//!     uri_prefix: /uploads/avatars
//!     namer: uniqid
//!   invoice:
//!     upload_destination: /var/lib/project/invoices
//!     delete_on_remove: false
//! ```

use crate::errors::Error;
use crate::naming::NamerKind;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "UPLOAD_STORAGE_";

/// Root configuration: the named upload mappings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mappings: BTreeMap<String, MappingConfig>,
}

/// Configuration of one upload mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Absolute directory uploaded files are moved into
    pub upload_destination: String,
    /// Public URL prefix under which `upload_destination` is served (default: `/uploads`)
    pub uri_prefix: String,
    /// Naming strategy; without one the client's original file name is kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namer: Option<NamerKind>,
    /// Delete the stored file when a new upload replaces it (default: true)
    pub delete_on_update: bool,
    /// Delete the stored file when its owner is removed (default: true)
    pub delete_on_remove: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            upload_destination: String::new(),
            uri_prefix: "/uploads".to_string(),
            namer: None,
            delete_on_update: true,
            delete_on_remove: true,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(path).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        for (name, mapping) in &self.mappings {
            if mapping.upload_destination.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("mapping {name} has no upload_destination"),
                });
            }

            if !mapping.uri_prefix.starts_with('/') {
                return Err(Error::Config {
                    message: format!("mapping {name} has uri_prefix {:?}, which must start with '/'", mapping.uri_prefix),
                });
            }
        }

        Ok(())
    }

    pub fn mapping(&self, name: &str) -> Option<&MappingConfig> {
        self.mappings.get(name)
    }
}
