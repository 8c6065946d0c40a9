//! Portfolio orchestration
//!
//! Ties the store, the planting calendar, the harvest projection and the
//! zone lookup together into the operations the HTTP layer exposes.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::model::{
    batch_nickname, AddPlantRequest, NewCatalogEntry, NewUserPlant, PlantCatalogEntry, PlantRef,
    UpdatePlantRequest, User, UserPlantChanges, UserPlantInstance,
};
use super::store::PortfolioStore;
use crate::calendar::CalendarDataset;
use crate::harvest::project_harvest;
use crate::planting::{normalize_plant_name, resolve_planting_info, PlantingInfo};
use crate::types::{GardenError, Result};
use crate::zone::{validate_zip, ZoneLookup};

/// A user plant joined with its catalog entry and harvest projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioEntry {
    pub id: String,
    pub plant_id: String,
    pub plant_name: String,
    pub nickname: String,
    pub date_planted: Option<NaiveDate>,
    pub notes: String,
    pub species: Option<String>,
    pub sunlight: Option<String>,
    pub watering: Option<String>,
    pub growth_days: Option<i64>,
    pub days_elapsed: Option<i64>,
    pub days_remaining: Option<i64>,
    pub expected_harvest: Option<NaiveDate>,
}

/// Portfolio operations over a store and the planting calendar
#[derive(Clone)]
pub struct Portfolio {
    store: Arc<dyn PortfolioStore>,
    calendar: Arc<CalendarDataset>,
}

impl Portfolio {
    pub fn new(store: Arc<dyn PortfolioStore>, calendar: Arc<CalendarDataset>) -> Self {
        Self { store, calendar }
    }

    pub fn store(&self) -> &Arc<dyn PortfolioStore> {
        &self.store
    }

    pub fn calendar(&self) -> &CalendarDataset {
        &self.calendar
    }

    /// Growth duration for a catalog entry: stored value first, then the
    /// calendar's average for that plant
    pub fn growth_days_for(&self, entry: &PlantCatalogEntry) -> Option<i64> {
        entry.growth_days.or_else(|| {
            self.calendar
                .plant(&entry.name)
                .and_then(|calendar| calendar.avg_days())
        })
    }

    /// Find the catalog entry for a free-text name, creating it if absent
    pub async fn ensure_catalog_entry(&self, name: &str) -> Result<PlantCatalogEntry> {
        let name = normalize_plant_name(name);
        if name.is_empty() {
            return Err(GardenError::InvalidInput("Plant name must not be empty".into()));
        }

        if let Some(entry) = self.store.find_catalog_entry_by_name(&name).await? {
            return Ok(entry);
        }

        match self.store.create_catalog_entry(NewCatalogEntry::named(&name)).await {
            Ok(entry) => {
                info!(plant = %entry.name, plant_id = %entry.id, "Catalog entry created");
                Ok(entry)
            }
            // Lost a race with a concurrent create
            Err(GardenError::Conflict(_)) => self
                .store
                .find_catalog_entry_by_name(&name)
                .await?
                .ok_or_else(|| GardenError::Internal(format!("Catalog entry '{}' vanished", name))),
            Err(e) => Err(e),
        }
    }

    async fn resolve_plant_ref(&self, plant: &PlantRef) -> Result<PlantCatalogEntry> {
        match plant {
            PlantRef::ById(id) => self
                .store
                .find_catalog_entry(id)
                .await?
                .ok_or_else(|| GardenError::NotFound("Plant not found".into())),
            PlantRef::ByName(name) => self.ensure_catalog_entry(name).await,
        }
    }

    /// Add a plant to the user's portfolio
    pub async fn add_plant(
        &self,
        user_id: &str,
        request: AddPlantRequest,
        today: NaiveDate,
    ) -> Result<PortfolioEntry> {
        let entry = self.resolve_plant_ref(&request.plant).await?;
        let existing = self.store.count_user_plants_of(user_id, &entry.id).await?;

        let instance = self
            .store
            .insert_user_plant(NewUserPlant {
                user_id: user_id.to_string(),
                plant_id: entry.id.clone(),
                nickname: batch_nickname(&entry.name, existing),
                date_planted: request.date_planted,
                notes: request.notes.unwrap_or_default(),
            })
            .await?;

        info!(
            user_id = %user_id,
            user_plant_id = %instance.id,
            nickname = %instance.nickname,
            "Plant added to portfolio"
        );
        Ok(self.project(instance, &entry, today))
    }

    /// Apply a partial update to one of the user's plants
    pub async fn update_plant(
        &self,
        user_id: &str,
        user_plant_id: &str,
        request: UpdatePlantRequest,
        today: NaiveDate,
    ) -> Result<PortfolioEntry> {
        // Ownership check before anything is written, catalog included
        self.store
            .find_user_plant(user_id, user_plant_id)
            .await?
            .ok_or_else(user_plant_not_found)?;

        let plant_id = match request.plant_name.as_deref() {
            Some(name) => Some(self.ensure_catalog_entry(name).await?.id),
            None => None,
        };

        let changes = UserPlantChanges {
            plant_id,
            date_planted: request.date_planted,
            notes: request.notes,
        };

        let instance = self
            .store
            .update_user_plant(user_id, user_plant_id, changes)
            .await?
            .ok_or_else(user_plant_not_found)?;

        let entry = self.catalog_entry_of(&instance).await?;
        info!(user_id = %user_id, user_plant_id = %user_plant_id, "Portfolio plant updated");
        Ok(self.project(instance, &entry, today))
    }

    /// Remove one of the user's plants. A second call for the same id fails
    /// with `NotFound`.
    pub async fn remove_plant(&self, user_id: &str, user_plant_id: &str) -> Result<()> {
        if !self.store.delete_user_plant(user_id, user_plant_id).await? {
            return Err(user_plant_not_found());
        }
        info!(user_id = %user_id, user_plant_id = %user_plant_id, "Portfolio plant removed");
        Ok(())
    }

    /// Every plant the user owns, with harvest projections as of `today`
    pub async fn list_portfolio(&self, user_id: &str, today: NaiveDate) -> Result<Vec<PortfolioEntry>> {
        let instances = self.store.list_user_plants(user_id).await?;
        if instances.is_empty() {
            return Ok(Vec::new());
        }

        let catalog: HashMap<String, PlantCatalogEntry> = self
            .store
            .list_catalog()
            .await?
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect();

        Ok(instances
            .into_iter()
            .filter_map(|instance| match catalog.get(&instance.plant_id) {
                Some(entry) => Some(self.project(instance, entry, today)),
                None => {
                    warn!(
                        user_plant_id = %instance.id,
                        plant_id = %instance.plant_id,
                        "User plant references a missing catalog entry, skipping"
                    );
                    None
                }
            })
            .collect())
    }

    /// Planting window for a plant in a zone
    pub async fn planting_info(&self, plant_name: &str, zone: &str) -> Result<PlantingInfo> {
        let name = normalize_plant_name(plant_name);
        let stored_days = self
            .store
            .find_catalog_entry_by_name(&name)
            .await?
            .and_then(|entry| entry.growth_days);

        resolve_planting_info(&self.calendar, &name, zone, |_| stored_days)
    }

    pub async fn list_catalog(&self) -> Result<Vec<PlantCatalogEntry>> {
        self.store.list_catalog().await
    }

    /// Resolve a ZIP code to a zone and store both on the user
    pub async fn update_zip(&self, zones: &dyn ZoneLookup, user_id: &str, zip_code: &str) -> Result<User> {
        let zip_code = zip_code.trim();
        validate_zip(zip_code)?;

        let zone = zones.resolve_zone(zip_code).await?;
        let user = self
            .store
            .set_user_location(user_id, zip_code, &zone)
            .await?
            .ok_or_else(|| GardenError::NotFound("User not found".into()))?;

        info!(user_id = %user_id, zip = %zip_code, zone = %zone, "User zone updated");
        Ok(user)
    }

    /// Create a catalog entry for every calendar plant that lacks one.
    /// Returns how many entries were created.
    pub async fn sync_catalog_from_calendar(&self) -> Result<usize> {
        let mut created = 0;
        for name in self.calendar.plant_names() {
            if self.store.find_catalog_entry_by_name(name).await?.is_some() {
                continue;
            }

            let growth_days = self.calendar.plant(name).and_then(|c| c.avg_days());
            match self
                .store
                .create_catalog_entry(NewCatalogEntry {
                    growth_days,
                    ..NewCatalogEntry::named(name)
                })
                .await
            {
                Ok(_) => created += 1,
                Err(GardenError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if created > 0 {
            info!(created, "Catalog synced from planting calendar");
        }
        Ok(created)
    }

    async fn catalog_entry_of(&self, instance: &UserPlantInstance) -> Result<PlantCatalogEntry> {
        self.store
            .find_catalog_entry(&instance.plant_id)
            .await?
            .ok_or_else(|| {
                GardenError::Internal(format!(
                    "User plant {} references missing catalog entry {}",
                    instance.id, instance.plant_id
                ))
            })
    }

    fn project(
        &self,
        instance: UserPlantInstance,
        entry: &PlantCatalogEntry,
        today: NaiveDate,
    ) -> PortfolioEntry {
        let growth_days = self.growth_days_for(entry);
        let projection = project_harvest(instance.date_planted, growth_days, today);

        PortfolioEntry {
            id: instance.id,
            plant_id: instance.plant_id,
            plant_name: entry.name.clone(),
            nickname: instance.nickname,
            date_planted: instance.date_planted,
            notes: instance.notes,
            species: entry.species.clone(),
            sunlight: entry.sunlight.clone(),
            watering: entry.watering.clone(),
            growth_days,
            days_elapsed: projection.days_elapsed,
            days_remaining: projection.days_remaining,
            expected_harvest: projection.expected_harvest,
        }
    }
}

fn user_plant_not_found() -> GardenError {
    GardenError::NotFound("User plant not found".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{MemoryStore, NewUser};
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    const CALENDAR: &str = r#"{
        "Tomato": {
            "avg_days": 75,
            "7a": { "start": "April", "end": "June" }
        },
        "Basil": {
            "6a": { "start": "May", "end": "July" }
        }
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn portfolio() -> Portfolio {
        Portfolio::new(
            Arc::new(MemoryStore::new()),
            Arc::new(CalendarDataset::from_json(CALENDAR).unwrap()),
        )
    }

    async fn user(portfolio: &Portfolio, name: &str) -> User {
        portfolio
            .store()
            .create_user(NewUser {
                username: name.into(),
                password_hash: "$argon2id$stub".into(),
            })
            .await
            .unwrap()
    }

    fn add_by_name(name: &str) -> AddPlantRequest {
        AddPlantRequest {
            plant: PlantRef::ByName(name.into()),
            date_planted: date(2025, 5, 1),
            notes: None,
        }
    }

    struct FixedZone(&'static str);

    #[async_trait]
    impl ZoneLookup for FixedZone {
        async fn resolve_zone(&self, _zip_code: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct DownZone;

    #[async_trait]
    impl ZoneLookup for DownZone {
        async fn resolve_zone(&self, _zip_code: &str) -> Result<String> {
            Err(GardenError::UpstreamUnavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_batch_numbering() {
        let p = portfolio();
        let u = user(&p, "ada").await;
        let today = date(2025, 5, 21);

        let first = p.add_plant(&u.id, add_by_name("tomato"), today).await.unwrap();
        let second = p.add_plant(&u.id, add_by_name("Tomato"), today).await.unwrap();
        let third = p.add_plant(&u.id, add_by_name("TOMATO"), today).await.unwrap();

        assert_eq!(first.nickname, "Tomato");
        assert_eq!(second.nickname, "Tomato (Batch 2)");
        assert_eq!(third.nickname, "Tomato (Batch 3)");
        assert_eq!(first.plant_id, third.plant_id);
    }

    #[tokio::test]
    async fn test_batch_numbering_is_per_user() {
        let p = portfolio();
        let ada = user(&p, "ada").await;
        let bob = user(&p, "bob").await;
        let today = date(2025, 5, 21);

        p.add_plant(&ada.id, add_by_name("basil"), today).await.unwrap();
        let bobs = p.add_plant(&bob.id, add_by_name("basil"), today).await.unwrap();
        assert_eq!(bobs.nickname, "Basil");
    }

    #[tokio::test]
    async fn test_nicknames_not_renumbered_after_delete() {
        let p = portfolio();
        let u = user(&p, "ada").await;
        let today = date(2025, 5, 21);

        let first = p.add_plant(&u.id, add_by_name("basil"), today).await.unwrap();
        p.add_plant(&u.id, add_by_name("basil"), today).await.unwrap();
        p.remove_plant(&u.id, &first.id).await.unwrap();

        let remaining = p.list_portfolio(&u.id, today).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].nickname, "Basil (Batch 2)");
    }

    #[tokio::test]
    async fn test_projection_uses_dataset_average() {
        let p = portfolio();
        let u = user(&p, "ada").await;

        let entry = p
            .add_plant(&u.id, add_by_name("tomato"), date(2025, 5, 21))
            .await
            .unwrap();
        assert_eq!(entry.growth_days, Some(75));
        assert_eq!(entry.days_elapsed, Some(20));
        assert_eq!(entry.days_remaining, Some(55));
        assert_eq!(entry.expected_harvest, Some(date(2025, 7, 15)));
    }

    #[tokio::test]
    async fn test_unknown_growth_days_gives_no_projection() {
        let p = portfolio();
        let u = user(&p, "ada").await;

        let entry = p
            .add_plant(&u.id, add_by_name("okra"), date(2025, 5, 21))
            .await
            .unwrap();
        assert_eq!(entry.plant_name, "Okra");
        assert_eq!(entry.growth_days, None);
        assert_eq!(entry.days_remaining, None);
        assert_eq!(entry.expected_harvest, None);
    }

    #[tokio::test]
    async fn test_add_by_unknown_id_is_not_found() {
        let p = portfolio();
        let u = user(&p, "ada").await;
        let request = AddPlantRequest {
            plant: PlantRef::ById("missing".into()),
            date_planted: date(2025, 5, 1),
            notes: None,
        };
        let err = p.add_plant(&u.id, request, date(2025, 5, 1)).await.unwrap_err();
        assert!(matches!(err, GardenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_by_catalog_id_then_by_name() {
        let p = portfolio();
        let u = user(&p, "ada").await;
        let today = date(2025, 5, 21);
        assert_ok!(p.sync_catalog_from_calendar().await);

        let tomato = p
            .list_catalog()
            .await
            .unwrap()
            .into_iter()
            .find(|entry| entry.name == "Tomato")
            .unwrap();

        let by_id = AddPlantRequest {
            plant: PlantRef::ById(tomato.id.clone()),
            date_planted: date(2025, 5, 1),
            notes: Some("south bed".into()),
        };
        let first = p.add_plant(&u.id, by_id, today).await.unwrap();
        assert_eq!(first.plant_id, tomato.id);
        assert_eq!(first.plant_name, "Tomato");
        assert_eq!(first.nickname, "Tomato");
        assert_eq!(first.notes, "south bed");
        assert_eq!(first.days_elapsed, Some(20));
        assert_eq!(first.days_remaining, Some(55));

        let second = p.add_plant(&u.id, add_by_name("tomato"), today).await.unwrap();
        assert_eq!(second.plant_id, tomato.id);
        assert_eq!(second.nickname, "Tomato (Batch 2)");
        assert_eq!(p.list_catalog().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let p = portfolio();
        let u = user(&p, "ada").await;
        let entry = p.add_plant(&u.id, add_by_name("basil"), date(2025, 5, 1)).await.unwrap();

        assert_ok!(p.remove_plant(&u.id, &entry.id).await);
        let err = p.remove_plant(&u.id, &entry.id).await.unwrap_err();
        assert!(matches!(err, GardenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cross_user_access_is_not_found() {
        let p = portfolio();
        let owner = user(&p, "owner").await;
        let intruder = user(&p, "intruder").await;
        let today = date(2025, 5, 1);
        let entry = p.add_plant(&owner.id, add_by_name("basil"), today).await.unwrap();

        let update = UpdatePlantRequest {
            notes: Some("mine now".into()),
            ..UpdatePlantRequest::default()
        };
        let err = p
            .update_plant(&intruder.id, &entry.id, update, today)
            .await
            .unwrap_err();
        assert!(matches!(err, GardenError::NotFound(_)));

        let err = p.remove_plant(&intruder.id, &entry.id).await.unwrap_err();
        assert!(matches!(err, GardenError::NotFound(_)));

        // Same answer as for an id that never existed
        let err = p.remove_plant(&intruder.id, "nope").await.unwrap_err();
        assert!(matches!(err, GardenError::NotFound(_)));

        let owned = p.list_portfolio(&owner.id, today).await.unwrap();
        assert_eq!(owned[0].notes, "");
    }

    #[tokio::test]
    async fn test_intruder_update_creates_no_catalog_entry() {
        let p = portfolio();
        let owner = user(&p, "owner").await;
        let intruder = user(&p, "intruder").await;
        let today = date(2025, 5, 1);
        let entry = p.add_plant(&owner.id, add_by_name("basil"), today).await.unwrap();

        let update = UpdatePlantRequest {
            plant_name: Some("Rhubarb".into()),
            ..UpdatePlantRequest::default()
        };
        assert_err!(p.update_plant(&intruder.id, &entry.id, update, today).await);
        assert!(p.store().find_catalog_entry_by_name("Rhubarb").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let p = portfolio();
        let u = user(&p, "ada").await;
        let today = date(2025, 5, 21);
        let entry = p
            .add_plant(
                &u.id,
                AddPlantRequest {
                    notes: Some("south bed".into()),
                    ..add_by_name("basil")
                },
                today,
            )
            .await
            .unwrap();

        let updated = p
            .update_plant(
                &u.id,
                &entry.id,
                UpdatePlantRequest {
                    date_planted: Some(date(2025, 5, 10)),
                    ..UpdatePlantRequest::default()
                },
                today,
            )
            .await
            .unwrap();
        assert_eq!(updated.notes, "south bed");
        assert_eq!(updated.date_planted, Some(date(2025, 5, 10)));

        let repointed = p
            .update_plant(
                &u.id,
                &entry.id,
                UpdatePlantRequest {
                    plant_name: Some("tomato".into()),
                    ..UpdatePlantRequest::default()
                },
                today,
            )
            .await
            .unwrap();
        assert_eq!(repointed.plant_name, "Tomato");
        assert_eq!(repointed.nickname, "Basil");
        assert_eq!(repointed.days_remaining, Some(75 - 11));
    }

    #[tokio::test]
    async fn test_planting_info_prefers_catalog_days() {
        let p = portfolio();
        p.store()
            .create_catalog_entry(NewCatalogEntry {
                growth_days: Some(90),
                ..NewCatalogEntry::named("Tomato")
            })
            .await
            .unwrap();

        let info = p.planting_info("tomato", "7A").await.unwrap();
        assert_eq!(info.zone, "7a");
        assert_eq!(info.growth_duration_days, Some(90));
    }

    #[tokio::test]
    async fn test_sync_catalog_is_idempotent() {
        let p = portfolio();
        assert_eq!(p.sync_catalog_from_calendar().await.unwrap(), 2);
        assert_eq!(p.sync_catalog_from_calendar().await.unwrap(), 0);

        let tomato = p.store().find_catalog_entry_by_name("Tomato").await.unwrap().unwrap();
        assert_eq!(tomato.growth_days, Some(75));
        let basil = p.store().find_catalog_entry_by_name("Basil").await.unwrap().unwrap();
        assert_eq!(basil.growth_days, None);
    }

    #[tokio::test]
    async fn test_update_zip_persists_zone() {
        let p = portfolio();
        let u = user(&p, "ada").await;

        let updated = p.update_zip(&FixedZone("7b"), &u.id, "20001").await.unwrap();
        assert_eq!(updated.zip_code.as_deref(), Some("20001"));
        assert_eq!(updated.zone.as_deref(), Some("7b"));
    }

    #[tokio::test]
    async fn test_update_zip_failures_leave_user_untouched() {
        let p = portfolio();
        let u = user(&p, "ada").await;

        let err = p.update_zip(&FixedZone("7b"), &u.id, "2000").await.unwrap_err();
        assert!(matches!(err, GardenError::InvalidInput(_)));

        let err = p.update_zip(&DownZone, &u.id, "20001").await.unwrap_err();
        assert!(matches!(err, GardenError::UpstreamUnavailable(_)));

        let stored = p.store().find_user(&u.id).await.unwrap().unwrap();
        assert_eq!(stored.zone, None);
    }
}
