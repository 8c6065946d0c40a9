//! MongoDB client and collection wrapper

use bson::{doc, oid::ObjectId, DateTime, Document};
use futures_util::{Stream, TryStreamExt};
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    results::UpdateResult,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::db::schemas::Metadata;
use crate::types::GardenError;

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping; fails fast when the server is unreachable
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, GardenError> {
        info!(uri = %uri, "Connecting to MongoDB");

        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| GardenError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| GardenError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!(db = %db_name, "Connected to MongoDB");

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection, creating its indexes
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, GardenError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }
}

/// Typed MongoDB collection that hides soft-deleted documents
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, GardenError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    async fn apply_indexes(&self) -> Result<(), GardenError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| GardenError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    ///
    /// A unique index violation surfaces as `Conflict`.
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, GardenError> {
        item.mut_metadata().stamp_inserted(DateTime::now());

        let result = self.inner.insert_one(item).await.map_err(|e| {
            if is_duplicate_key(&e) {
                GardenError::Conflict("Duplicate key".into())
            } else {
                GardenError::Database(format!("Insert failed: {}", e))
            }
        })?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| GardenError::Database("Failed to get inserted ID".into()))
    }

    /// Find one live document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, GardenError> {
        self.inner
            .find_one(live(filter))
            .await
            .map_err(|e| GardenError::Database(format!("Find failed: {}", e)))
    }

    /// Find live documents by filter in `sort` order
    ///
    /// A stored document that no longer decodes fails the whole read.
    pub async fn find_many(&self, filter: Document, sort: Document) -> Result<Vec<T>, GardenError> {
        let cursor = self
            .inner
            .find(live(filter))
            .sort(sort)
            .await
            .map_err(|e| GardenError::Database(format!("Find failed: {}", e)))?;

        collect_documents(cursor).await
    }

    /// Count live documents matching the filter
    pub async fn count(&self, filter: Document) -> Result<u64, GardenError> {
        self.inner
            .count_documents(live(filter))
            .await
            .map_err(|e| GardenError::Database(format!("Count failed: {}", e)))
    }

    /// Apply `$set` fields to one live document and return it as updated
    pub async fn set_fields(
        &self,
        filter: Document,
        mut fields: Document,
    ) -> Result<Option<T>, GardenError> {
        Metadata::touch(&mut fields, DateTime::now());

        self.inner
            .find_one_and_update(live(filter), doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| GardenError::Database(format!("Update failed: {}", e)))
    }

    /// Soft delete a live document
    pub async fn soft_delete(&self, filter: Document) -> Result<UpdateResult, GardenError> {
        self.inner
            .update_one(live(filter), Metadata::soft_delete_update(DateTime::now()))
            .await
            .map_err(|e| GardenError::Database(format!("Update failed: {}", e)))
    }
}

async fn collect_documents<T, S>(documents: S) -> Result<Vec<T>, GardenError>
where
    S: Stream<Item = mongodb::error::Result<T>>,
{
    documents
        .try_collect()
        .await
        .map_err(|e| GardenError::Database(format!("Failed to read document: {}", e)))
}

fn live(filter: Document) -> Document {
    Metadata::exclude_deleted(filter)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}
