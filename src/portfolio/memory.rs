//! In-memory portfolio store
//!
//! Used in development mode when MongoDB is unreachable, and by tests.
//! Contents are lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::model::{
    NewCatalogEntry, NewUser, NewUserPlant, PlantCatalogEntry, User, UserPlantChanges,
    UserPlantInstance,
};
use super::store::PortfolioStore;
use crate::types::{GardenError, Result};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    catalog: Vec<PlantCatalogEntry>,
    user_plants: Vec<UserPlantInstance>,
}

/// Portfolio store held in process memory
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(GardenError::Conflict("Username already exists".into()));
        }

        let user = User {
            id: new_id(),
            username: user.username,
            password_hash: user.password_hash,
            zip_code: None,
            zone: None,
        };
        state.users.push(user.clone());
        debug!(user_id = %user.id, "Memory store: user created");
        Ok(user)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn set_user_location(
        &self,
        user_id: &str,
        zip_code: &str,
        zone: &str,
    ) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.iter_mut().find(|u| u.id == user_id).map(|user| {
            user.zip_code = Some(zip_code.to_string());
            user.zone = Some(zone.to_string());
            user.clone()
        }))
    }

    async fn list_catalog(&self) -> Result<Vec<PlantCatalogEntry>> {
        let state = self.state.read().await;
        let mut entries = state.catalog.clone();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn find_catalog_entry(&self, plant_id: &str) -> Result<Option<PlantCatalogEntry>> {
        let state = self.state.read().await;
        Ok(state.catalog.iter().find(|p| p.id == plant_id).cloned())
    }

    async fn find_catalog_entry_by_name(&self, name: &str) -> Result<Option<PlantCatalogEntry>> {
        let state = self.state.read().await;
        Ok(state.catalog.iter().find(|p| p.name == name).cloned())
    }

    async fn create_catalog_entry(&self, entry: NewCatalogEntry) -> Result<PlantCatalogEntry> {
        let mut state = self.state.write().await;
        if state.catalog.iter().any(|p| p.name == entry.name) {
            return Err(GardenError::Conflict(format!(
                "Plant '{}' already exists",
                entry.name
            )));
        }

        let entry = PlantCatalogEntry {
            id: new_id(),
            name: entry.name,
            species: entry.species,
            sunlight: entry.sunlight,
            watering: entry.watering,
            growth_days: entry.growth_days,
        };
        state.catalog.push(entry.clone());
        Ok(entry)
    }

    async fn list_user_plants(&self, user_id: &str) -> Result<Vec<UserPlantInstance>> {
        let state = self.state.read().await;
        Ok(state
            .user_plants
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_user_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
    ) -> Result<Option<UserPlantInstance>> {
        let state = self.state.read().await;
        Ok(state
            .user_plants
            .iter()
            .find(|p| p.id == user_plant_id && p.user_id == user_id)
            .cloned())
    }

    async fn count_user_plants_of(&self, user_id: &str, plant_id: &str) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state
            .user_plants
            .iter()
            .filter(|p| p.user_id == user_id && p.plant_id == plant_id)
            .count() as u64)
    }

    async fn insert_user_plant(&self, plant: NewUserPlant) -> Result<UserPlantInstance> {
        let mut state = self.state.write().await;
        let instance = UserPlantInstance {
            id: new_id(),
            user_id: plant.user_id,
            plant_id: plant.plant_id,
            nickname: plant.nickname,
            date_planted: Some(plant.date_planted),
            notes: plant.notes,
        };
        state.user_plants.push(instance.clone());
        Ok(instance)
    }

    async fn update_user_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
        changes: UserPlantChanges,
    ) -> Result<Option<UserPlantInstance>> {
        let mut state = self.state.write().await;
        let Some(instance) = state
            .user_plants
            .iter_mut()
            .find(|p| p.id == user_plant_id && p.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(plant_id) = changes.plant_id {
            instance.plant_id = plant_id;
        }
        if let Some(date_planted) = changes.date_planted {
            instance.date_planted = Some(date_planted);
        }
        if let Some(notes) = changes.notes {
            instance.notes = notes;
        }
        Ok(Some(instance.clone()))
    }

    async fn delete_user_plant(&self, user_id: &str, user_plant_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.user_plants.len();
        state
            .user_plants
            .retain(|p| !(p.id == user_plant_id && p.user_id == user_id));
        Ok(state.user_plants.len() < before)
    }
}
