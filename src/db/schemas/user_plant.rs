//! User plant instance document schema

use bson::{doc, oid::ObjectId, Document};
use chrono::NaiveDate;
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::portfolio::{NewUserPlant, UserPlantInstance, DATE_FORMAT};

/// Collection name for user plantings
pub const USER_PLANT_COLLECTION: &str = "user_plants";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserPlantDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning user
    pub user_id: ObjectId,

    /// Catalog entry
    pub plant_id: ObjectId,

    pub nickname: String,

    /// Planting date as `YYYY-MM-DD`
    #[serde(default)]
    pub date_planted: Option<String>,

    #[serde(default)]
    pub notes: String,
}

impl UserPlantDoc {
    pub fn new(user_id: ObjectId, plant_id: ObjectId, plant: &NewUserPlant) -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            user_id,
            plant_id,
            nickname: plant.nickname.clone(),
            date_planted: Some(plant.date_planted.format(DATE_FORMAT).to_string()),
            notes: plant.notes.clone(),
        }
    }

    /// Convert to the domain type; an unparseable stored date reads as absent
    pub fn into_instance(self, id: ObjectId) -> UserPlantInstance {
        let date_planted = self
            .date_planted
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok());

        UserPlantInstance {
            id: id.to_hex(),
            user_id: self.user_id.to_hex(),
            plant_id: self.plant_id.to_hex(),
            nickname: self.nickname,
            date_planted,
            notes: self.notes,
        }
    }
}

impl IntoIndexes for UserPlantDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1, "plant_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_plant_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserPlantDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_stored_date_reads_as_absent() {
        let id = ObjectId::new();
        let doc = UserPlantDoc {
            _id: Some(id),
            metadata: Metadata::default(),
            user_id: ObjectId::new(),
            plant_id: ObjectId::new(),
            nickname: "Basil".into(),
            date_planted: Some("last spring".into()),
            notes: String::new(),
        };

        let instance = doc.into_instance(id);
        assert_eq!(instance.id, id.to_hex());
        assert_eq!(instance.date_planted, None);
    }

    #[test]
    fn test_date_stored_as_iso() {
        let plant = NewUserPlant {
            user_id: String::new(),
            plant_id: String::new(),
            nickname: "Tomato".into(),
            date_planted: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            notes: "south bed".into(),
        };
        let doc = UserPlantDoc::new(ObjectId::new(), ObjectId::new(), &plant);
        assert_eq!(doc.date_planted.as_deref(), Some("2025-05-01"));
        assert_eq!(doc.notes, "south bed");
    }
}
