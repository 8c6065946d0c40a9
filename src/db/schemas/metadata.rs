//! Bookkeeping embedded in every stored garden document
//!
//! Users, catalog plants and portfolio entries are never removed from
//! MongoDB. Removing a plant from a portfolio flips `is_deleted`, and every
//! read goes through [`Metadata::exclude_deleted`] so it stops showing up
//! and no longer counts toward batch numbering.

use bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

pub const IS_DELETED_FIELD: &str = "metadata.is_deleted";
pub const DELETED_AT_FIELD: &str = "metadata.deleted_at";
pub const UPDATED_AT_FIELD: &str = "metadata.updated_at";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Metadata {
    /// Reset to the state of a freshly inserted document
    pub fn stamp_inserted(&mut self, now: DateTime) {
        *self = Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: Some(now),
            created_at: Some(now),
        };
    }

    /// Restrict a query filter to documents that have not been removed
    pub fn exclude_deleted(mut filter: Document) -> Document {
        filter.insert(IS_DELETED_FIELD, doc! { "$ne": true });
        filter
    }

    /// Add the update timestamp to a `$set` document
    pub fn touch(fields: &mut Document, now: DateTime) {
        fields.insert(UPDATED_AT_FIELD, now);
    }

    /// `$set` document that removes a document from every live query
    pub fn soft_delete_update(now: DateTime) -> Document {
        let mut fields = Document::new();
        fields.insert(IS_DELETED_FIELD, true);
        fields.insert(DELETED_AT_FIELD, now);
        Self::touch(&mut fields, now);
        doc! { "$set": fields }
    }
}
