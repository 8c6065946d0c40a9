//! User document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::portfolio::User;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Unique login name
    pub username: String,

    /// Argon2 password hash
    pub password_hash: String,

    /// Last ZIP code the user saved
    #[serde(default)]
    pub zip_code: Option<String>,

    /// Hardiness zone resolved from `zip_code`
    #[serde(default)]
    pub zone: Option<String>,
}

impl UserDoc {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            username,
            password_hash,
            zip_code: None,
            zone: None,
        }
    }

    pub fn into_user(self, id: ObjectId) -> User {
        User {
            id: id.to_hex(),
            username: self.username,
            password_hash: self.password_hash,
            zip_code: self.zip_code,
            zone: self.zone,
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "username": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
