//! Account routes
//!
//! - POST /register   - Create an account
//! - POST /login      - Exchange credentials for access and refresh tokens
//! - POST /refresh    - Exchange a refresh token for a new access token
//! - GET  /me         - Current user profile
//! - POST /update-zip - Resolve a ZIP code to a hardiness zone and store both

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, verify_password, TokenKind};
use crate::portfolio::{NewUser, User};
use crate::routes::response::{
    authenticate, json_response, ok_json, parse_json_body, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::{GardenError, Result};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Trimmed username and raw password, both required
    fn into_parts(self) -> Result<(String, String)> {
        let username = self.username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(GardenError::InvalidInput(
                "Missing required fields: username, password".into(),
            ));
        }
        Ok((username, password))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub zip_code: Option<String>,
    pub zone: Option<String>,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            zip_code: user.zip_code,
            zone: user.zone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateZipRequest {
    #[serde(default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateZipResponse {
    pub message: String,
    pub zip_code: String,
    pub zone: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /register
pub async fn handle_register(req: Request<Incoming>, state: &AppState) -> Result<Response<BoxBody>> {
    let body: CredentialsRequest = parse_json_body(req).await?;
    let (username, password) = body.into_parts()?;

    let password_hash = hash_password(&password)?;
    let user = state
        .portfolio
        .store()
        .create_user(NewUser {
            username,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(json_response(
        StatusCode::CREATED,
        &MessageResponse::new("User registered successfully"),
    ))
}

/// POST /login
pub async fn handle_login(req: Request<Incoming>, state: &AppState) -> Result<Response<BoxBody>> {
    let body: CredentialsRequest = parse_json_body(req).await?;
    let (username, password) = body.into_parts()?;

    let invalid = || GardenError::Unauthenticated("Invalid credentials".into());

    let user = state
        .portfolio
        .store()
        .find_user_by_username(&username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }

    let access_token = state
        .jwt
        .generate_token(&user.id, &user.username, TokenKind::Access)?;
    let refresh_token = state
        .jwt
        .generate_token(&user.id, &user.username, TokenKind::Refresh)?;

    info!(user_id = %user.id, "User logged in");
    Ok(ok_json(&LoginResponse {
        access_token,
        refresh_token,
    }))
}

/// POST /refresh
pub async fn handle_refresh(req: Request<Incoming>, state: &AppState) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Refresh)?;
    let access_token = state
        .jwt
        .generate_token(&claims.sub, &claims.username, TokenKind::Access)?;

    Ok(ok_json(&RefreshResponse { access_token }))
}

/// GET /me
pub async fn handle_me(req: Request<Incoming>, state: &AppState) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    let user = state
        .portfolio
        .store()
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| GardenError::NotFound("User not found".into()))?;

    Ok(ok_json(&MeResponse::from(user)))
}

/// POST /update-zip
pub async fn handle_update_zip(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    let body: UpdateZipRequest = parse_json_body(req).await?;
    let zip_code = body
        .zip_code
        .ok_or_else(|| GardenError::InvalidInput("Missing required field: zip_code".into()))?;

    let user = state
        .portfolio
        .update_zip(state.zones.as_ref(), &claims.sub, &zip_code)
        .await?;

    Ok(ok_json(&UpdateZipResponse {
        message: "ZIP code updated".into(),
        zip_code: user.zip_code.unwrap_or_default(),
        zone: user.zone.unwrap_or_default(),
    }))
}
