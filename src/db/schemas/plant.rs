//! Plant catalog document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::portfolio::{NewCatalogEntry, PlantCatalogEntry};

/// Collection name for the shared plant catalog
pub const PLANT_COLLECTION: &str = "plants";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PlantDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Unique display name
    pub name: String,

    #[serde(default)]
    pub species: Option<String>,

    #[serde(default)]
    pub sunlight: Option<String>,

    #[serde(default)]
    pub watering: Option<String>,

    /// Days from planting to harvest
    #[serde(default)]
    pub growth_days: Option<i64>,
}

impl From<NewCatalogEntry> for PlantDoc {
    fn from(entry: NewCatalogEntry) -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            name: entry.name,
            species: entry.species,
            sunlight: entry.sunlight,
            watering: entry.watering,
            growth_days: entry.growth_days,
        }
    }
}

impl PlantDoc {
    pub fn into_entry(self, id: ObjectId) -> PlantCatalogEntry {
        PlantCatalogEntry {
            id: id.to_hex(),
            name: self.name,
            species: self.species,
            sunlight: self.sunlight,
            watering: self.watering,
            growth_days: self.growth_days,
        }
    }
}

impl IntoIndexes for PlantDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for PlantDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
