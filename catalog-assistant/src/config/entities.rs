//! Entity mapping document shared with the Data API builder (`dab-config.json`).
//!
//! Only the `entities.<name>.source` part is read; runtime, host and
//! permission sections belong to the REST layer and are ignored here.

use serde::Deserialize;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::path::Path;

/// Entity exposed by the REST layer for product listing.
pub const PRODUCTS_ENTITY: &str = "Products";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityMappings {
    #[serde(default)]
    entities: BTreeMap<String, EntityDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityDefinition {
    pub source: EntitySource,
}

/// `"source": "dbo.products"` or `"source": { "object": "dbo.products", "type": "table" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntitySource {
    Object(String),
    Detailed {
        object: String,
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
}

impl EntitySource {
    pub fn object(&self) -> &str {
        match self {
            EntitySource::Object(object) => object,
            EntitySource::Detailed { object, .. } => object,
        }
    }
}

impl EntityMappings {
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid entity mapping document: {}", e))
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read entity mapping document {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn source(&self, entity: &str) -> Option<&EntitySource> {
        self.entities.get(entity).map(|e| &e.source)
    }

    pub fn require_source_object(&self, entity: &str) -> Result<&str, AppError> {
        self.source(entity)
            .map(EntitySource::object)
            .filter(|object| !object.is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Entity mapping document has no source object for '{}'",
                    entity
                ))
            })
    }
}
