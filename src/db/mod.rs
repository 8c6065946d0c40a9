//! MongoDB persistence
//!
//! - `mongo`: client and typed collection wrapper with soft delete
//! - `schemas`: document types and their indexes
//! - `store`: `PortfolioStore` backed by the three collections

pub mod mongo;
pub mod schemas;
pub mod store;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
pub use store::MongoPortfolioStore;
