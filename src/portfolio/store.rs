//! Persistence contract for users, the plant catalog and user plants
//!
//! User-plant operations are always scoped to the owning user: an id that
//! exists but belongs to someone else behaves exactly like an unknown id.

use async_trait::async_trait;

use super::model::{
    NewCatalogEntry, NewUser, NewUserPlant, PlantCatalogEntry, User, UserPlantChanges,
    UserPlantInstance,
};
use crate::types::Result;

#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn find_user(&self, user_id: &str) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Persist the resolved ZIP and zone; `None` when the user is unknown
    async fn set_user_location(
        &self,
        user_id: &str,
        zip_code: &str,
        zone: &str,
    ) -> Result<Option<User>>;

    /// All catalog entries ordered by name
    async fn list_catalog(&self) -> Result<Vec<PlantCatalogEntry>>;

    async fn find_catalog_entry(&self, plant_id: &str) -> Result<Option<PlantCatalogEntry>>;

    async fn find_catalog_entry_by_name(&self, name: &str) -> Result<Option<PlantCatalogEntry>>;

    /// Fails with `Conflict` when the name is taken
    async fn create_catalog_entry(&self, entry: NewCatalogEntry) -> Result<PlantCatalogEntry>;

    /// The user's plants in creation order
    async fn list_user_plants(&self, user_id: &str) -> Result<Vec<UserPlantInstance>>;

    async fn find_user_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
    ) -> Result<Option<UserPlantInstance>>;

    /// Live instances of `plant_id` owned by `user_id`
    async fn count_user_plants_of(&self, user_id: &str, plant_id: &str) -> Result<u64>;

    async fn insert_user_plant(&self, plant: NewUserPlant) -> Result<UserPlantInstance>;

    /// `None` when the id is unknown or owned by another user
    async fn update_user_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
        changes: UserPlantChanges,
    ) -> Result<Option<UserPlantInstance>>;

    /// `false` when the id is unknown, already deleted or owned by another user
    async fn delete_user_plant(&self, user_id: &str, user_plant_id: &str) -> Result<bool>;
}
