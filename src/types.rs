//! Shared error type for the garden tracker

use hyper::StatusCode;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, GardenError>;

/// Every failure the service can surface to a caller
#[derive(Debug, Error)]
pub enum GardenError {
    /// Malformed ZIP, bad date, missing field, bad JSON
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown plant, user plant or planting timeline
    #[error("{0}")]
    NotFound(String),

    /// Zone service answered but did not name a zone
    #[error("No hardiness zone found for ZIP code {0}")]
    ZoneNotFound(String),

    /// Zone service unreachable, timed out or returned a non-success status
    #[error("Zone lookup unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Bad username/password pair
    #[error("{0}")]
    Unauthenticated(String),

    /// Missing, malformed, expired or wrong-type bearer token
    #[error("{0}")]
    InvalidToken(String),

    /// Duplicate username or catalog name
    #[error("{0}")]
    Conflict(String),

    /// Calendar dataset failed validation
    #[error("Invalid calendar dataset: {0}")]
    InvalidDataset(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GardenError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            GardenError::InvalidInput(_) | GardenError::Conflict(_) => StatusCode::BAD_REQUEST,
            GardenError::NotFound(_) | GardenError::ZoneNotFound(_) => StatusCode::NOT_FOUND,
            GardenError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GardenError::InvalidToken(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GardenError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GardenError::InvalidDataset(_)
            | GardenError::Database(_)
            | GardenError::Auth(_)
            | GardenError::Config(_)
            | GardenError::Internal(_)
            | GardenError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is the server's fault rather than the caller's
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<serde_json::Error> for GardenError {
    fn from(e: serde_json::Error) -> Self {
        GardenError::Internal(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GardenError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GardenError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GardenError::ZoneNotFound("12345".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GardenError::InvalidToken("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert!(GardenError::UpstreamUnavailable("timeout".into()).is_server_error());
        assert!(!GardenError::NotFound("x".into()).is_server_error());
    }
}
