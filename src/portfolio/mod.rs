//! Plant portfolio: users, the shared plant catalog and per-user plantings
//!
//! - `model`: domain types and wire-level helpers
//! - `store`: the persistence trait (MongoDB lives in `crate::db`)
//! - `memory`: in-process store for dev mode and tests
//! - `service`: add/update/remove/list orchestration with harvest projections

pub mod memory;
pub mod model;
pub mod service;
pub mod store;

pub use memory::MemoryStore;
pub use model::{
    batch_nickname, parse_date, AddPlantRequest, NewCatalogEntry, NewUser, NewUserPlant,
    PlantCatalogEntry, PlantRef, UpdatePlantRequest, User, UserPlantChanges, UserPlantInstance,
    DATE_FORMAT,
};
pub use service::{Portfolio, PortfolioEntry};
pub use store::PortfolioStore;
