//! Database schemas for the garden tracker
//!
//! Defines MongoDB document structures for users, the plant catalog and
//! user plantings.

mod metadata;
mod plant;
mod user;
mod user_plant;

pub use metadata::{Metadata, IS_DELETED_FIELD};
pub use plant::{PlantDoc, PLANT_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
pub use user_plant::{UserPlantDoc, USER_PLANT_COLLECTION};
