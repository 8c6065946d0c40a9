//! Garden tracker - personal garden tracking API
//!
//! Users keep a portfolio of plants, look up planting windows for their
//! USDA hardiness zone, and see projected harvest dates.
//!
//! ## Modules
//!
//! - **calendar**: Planting calendar dataset (plant → zone → month window)
//! - **zone**: ZIP code → hardiness zone lookup against an HTTP service
//! - **planting**: Planting window resolution with zone fallback
//! - **harvest**: Days elapsed / remaining and expected harvest date
//! - **portfolio**: Users, plant catalog and user plants over a store trait
//! - **db**: MongoDB store
//! - **auth**, **routes**, **server**: JWT-authenticated HTTP API

pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod harvest;
pub mod logging;
pub mod planting;
pub mod portfolio;
pub mod routes;
pub mod server;
pub mod types;
pub mod zone;

pub use config::Args;
pub use server::{run, serve, AppState};
pub use types::{GardenError, Result};
