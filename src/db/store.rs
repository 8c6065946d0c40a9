//! `PortfolioStore` on MongoDB
//!
//! Ids cross the trait boundary as ObjectId hex strings. A string that is
//! not a valid ObjectId cannot name any document, so lookups treat it as
//! unknown rather than as an error.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use tracing::debug;

use super::mongo::{MongoClient, MongoCollection};
use super::schemas::{
    PlantDoc, UserDoc, UserPlantDoc, PLANT_COLLECTION, USER_COLLECTION, USER_PLANT_COLLECTION,
};
use crate::portfolio::{
    NewCatalogEntry, NewUser, NewUserPlant, PlantCatalogEntry, PortfolioStore, User,
    UserPlantChanges, UserPlantInstance, DATE_FORMAT,
};
use crate::types::{GardenError, Result};

/// Portfolio persistence over the `users`, `plants` and `user_plants` collections
#[derive(Clone)]
pub struct MongoPortfolioStore {
    users: MongoCollection<UserDoc>,
    plants: MongoCollection<PlantDoc>,
    user_plants: MongoCollection<UserPlantDoc>,
}

impl MongoPortfolioStore {
    /// Open the collections and ensure their indexes
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            users: client.collection(USER_COLLECTION).await?,
            plants: client.collection(PLANT_COLLECTION).await?,
            user_plants: client.collection(USER_PLANT_COLLECTION).await?,
        })
    }

    fn owned_filter(user_id: ObjectId, user_plant_id: ObjectId) -> Document {
        doc! { "_id": user_plant_id, "user_id": user_id }
    }
}

fn object_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}

/// Resolve an id that must exist because the caller just produced it
fn required_object_id(raw: &str, what: &str) -> Result<ObjectId> {
    object_id(raw).ok_or_else(|| GardenError::InvalidInput(format!("Invalid {what} id")))
}

fn stored_id(id: Option<ObjectId>) -> Result<ObjectId> {
    id.ok_or_else(|| GardenError::Database("Stored document has no _id".into()))
}

fn to_user(doc: UserDoc) -> Result<User> {
    let id = stored_id(doc._id)?;
    Ok(doc.into_user(id))
}

fn to_entry(doc: PlantDoc) -> Result<PlantCatalogEntry> {
    let id = stored_id(doc._id)?;
    Ok(doc.into_entry(id))
}

fn to_instance(doc: UserPlantDoc) -> Result<UserPlantInstance> {
    let id = stored_id(doc._id)?;
    Ok(doc.into_instance(id))
}

#[async_trait]
impl PortfolioStore for MongoPortfolioStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut doc = UserDoc::new(user.username, user.password_hash);
        let id = self.users.insert_one(doc.clone()).await.map_err(|e| match e {
            GardenError::Conflict(_) => GardenError::Conflict("Username already exists".into()),
            other => other,
        })?;

        debug!(user_id = %id, "User document created");
        doc._id = Some(id);
        to_user(doc)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let Some(id) = object_id(user_id) else {
            return Ok(None);
        };
        self.users
            .find_one(doc! { "_id": id })
            .await?
            .map(to_user)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users
            .find_one(doc! { "username": username })
            .await?
            .map(to_user)
            .transpose()
    }

    async fn set_user_location(
        &self,
        user_id: &str,
        zip_code: &str,
        zone: &str,
    ) -> Result<Option<User>> {
        let Some(id) = object_id(user_id) else {
            return Ok(None);
        };
        self.users
            .set_fields(doc! { "_id": id }, doc! { "zip_code": zip_code, "zone": zone })
            .await?
            .map(to_user)
            .transpose()
    }

    async fn list_catalog(&self) -> Result<Vec<PlantCatalogEntry>> {
        self.plants
            .find_many(doc! {}, doc! { "name": 1 })
            .await?
            .into_iter()
            .map(to_entry)
            .collect()
    }

    async fn find_catalog_entry(&self, plant_id: &str) -> Result<Option<PlantCatalogEntry>> {
        let Some(id) = object_id(plant_id) else {
            return Ok(None);
        };
        self.plants
            .find_one(doc! { "_id": id })
            .await?
            .map(to_entry)
            .transpose()
    }

    async fn find_catalog_entry_by_name(&self, name: &str) -> Result<Option<PlantCatalogEntry>> {
        self.plants
            .find_one(doc! { "name": name })
            .await?
            .map(to_entry)
            .transpose()
    }

    async fn create_catalog_entry(&self, entry: NewCatalogEntry) -> Result<PlantCatalogEntry> {
        let name = entry.name.clone();
        let mut doc = PlantDoc::from(entry);
        let id = self.plants.insert_one(doc.clone()).await.map_err(|e| match e {
            GardenError::Conflict(_) => {
                GardenError::Conflict(format!("Plant '{}' already exists", name))
            }
            other => other,
        })?;

        doc._id = Some(id);
        to_entry(doc)
    }

    async fn list_user_plants(&self, user_id: &str) -> Result<Vec<UserPlantInstance>> {
        let Some(id) = object_id(user_id) else {
            return Ok(Vec::new());
        };
        self.user_plants
            .find_many(doc! { "user_id": id }, doc! { "_id": 1 })
            .await?
            .into_iter()
            .map(to_instance)
            .collect()
    }

    async fn find_user_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
    ) -> Result<Option<UserPlantInstance>> {
        let (Some(owner), Some(id)) = (object_id(user_id), object_id(user_plant_id)) else {
            return Ok(None);
        };
        self.user_plants
            .find_one(Self::owned_filter(owner, id))
            .await?
            .map(to_instance)
            .transpose()
    }

    async fn count_user_plants_of(&self, user_id: &str, plant_id: &str) -> Result<u64> {
        let (Some(owner), Some(plant)) = (object_id(user_id), object_id(plant_id)) else {
            return Ok(0);
        };
        self.user_plants
            .count(doc! { "user_id": owner, "plant_id": plant })
            .await
    }

    async fn insert_user_plant(&self, plant: NewUserPlant) -> Result<UserPlantInstance> {
        let owner = required_object_id(&plant.user_id, "user")?;
        let catalog_id = required_object_id(&plant.plant_id, "plant")?;

        let mut doc = UserPlantDoc::new(owner, catalog_id, &plant);
        let id = self.user_plants.insert_one(doc.clone()).await?;

        debug!(user_plant_id = %id, user_id = %owner, "User plant document created");
        doc._id = Some(id);
        to_instance(doc)
    }

    async fn update_user_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
        changes: UserPlantChanges,
    ) -> Result<Option<UserPlantInstance>> {
        let (Some(owner), Some(id)) = (object_id(user_id), object_id(user_plant_id)) else {
            return Ok(None);
        };

        let mut fields = Document::new();
        if let Some(plant_id) = changes.plant_id.as_deref() {
            fields.insert("plant_id", required_object_id(plant_id, "plant")?);
        }
        if let Some(date) = changes.date_planted {
            fields.insert("date_planted", date.format(DATE_FORMAT).to_string());
        }
        if let Some(notes) = changes.notes {
            fields.insert("notes", notes);
        }

        let filter = Self::owned_filter(owner, id);
        let updated = if fields.is_empty() {
            self.user_plants.find_one(filter).await?
        } else {
            self.user_plants.set_fields(filter, fields).await?
        };

        updated.map(to_instance).transpose()
    }

    async fn delete_user_plant(&self, user_id: &str, user_plant_id: &str) -> Result<bool> {
        let (Some(owner), Some(id)) = (object_id(user_id), object_id(user_plant_id)) else {
            return Ok(false);
        };
        let result = self
            .user_plants
            .soft_delete(Self::owned_filter(owner, id))
            .await?;
        Ok(result.modified_count > 0)
    }
}
