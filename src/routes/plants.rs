//! Catalog and portfolio routes
//!
//! - GET    /plants           - Shared plant catalog
//! - GET    /user/plants      - The caller's plants with harvest projections
//! - POST   /user/plants      - Add a plant by catalog id or by name
//! - PUT    /user/plants/{id} - Partial update
//! - DELETE /user/plants/{id} - Remove

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;

use crate::auth::TokenKind;
use crate::portfolio::{parse_date, AddPlantRequest, PlantRef, UpdatePlantRequest};
use crate::routes::response::{
    authenticate, json_response, ok_json, parse_json_body, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::{GardenError, Result};

/// Wire form of an add request
#[derive(Debug, Default, Deserialize)]
pub struct AddPlantBody {
    #[serde(default)]
    pub plant_id: Option<String>,
    #[serde(default)]
    pub plant_name: Option<String>,
    #[serde(default)]
    pub date_planted: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<AddPlantBody> for AddPlantRequest {
    type Error = GardenError;

    fn try_from(body: AddPlantBody) -> Result<Self> {
        let plant = PlantRef::from_fields(body.plant_id, body.plant_name)?;
        let date_planted = body
            .date_planted
            .as_deref()
            .ok_or_else(|| GardenError::InvalidInput("Missing required field: date_planted".into()))
            .and_then(parse_date)?;

        Ok(AddPlantRequest {
            plant,
            date_planted,
            notes: body.notes,
        })
    }
}

/// Wire form of a partial update
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlantBody {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date_planted: Option<String>,
    #[serde(default)]
    pub plant_name: Option<String>,
}

impl TryFrom<UpdatePlantBody> for UpdatePlantRequest {
    type Error = GardenError;

    fn try_from(body: UpdatePlantBody) -> Result<Self> {
        let date_planted = body.date_planted.as_deref().map(parse_date).transpose()?;

        Ok(UpdatePlantRequest {
            notes: body.notes,
            date_planted,
            plant_name: body.plant_name,
        })
    }
}

/// GET /plants
pub async fn handle_list_catalog(state: &AppState) -> Result<Response<BoxBody>> {
    let catalog = state.portfolio.list_catalog().await?;
    Ok(ok_json(&catalog))
}

/// GET /user/plants
pub async fn handle_list_user_plants(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    let entries = state
        .portfolio
        .list_portfolio(&claims.sub, state.today())
        .await?;
    Ok(ok_json(&entries))
}

/// POST /user/plants
pub async fn handle_add_user_plant(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    let body: AddPlantBody = parse_json_body(req).await?;
    let request = AddPlantRequest::try_from(body)?;

    let entry = state
        .portfolio
        .add_plant(&claims.sub, request, state.today())
        .await?;
    Ok(json_response(StatusCode::CREATED, &entry))
}

/// PUT /user/plants/{id}
pub async fn handle_update_user_plant(
    req: Request<Incoming>,
    state: &AppState,
    user_plant_id: &str,
) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    let body: UpdatePlantBody = parse_json_body(req).await?;
    let request = UpdatePlantRequest::try_from(body)?;

    let entry = state
        .portfolio
        .update_plant(&claims.sub, user_plant_id, request, state.today())
        .await?;
    Ok(ok_json(&entry))
}

/// DELETE /user/plants/{id}
pub async fn handle_delete_user_plant(
    req: Request<Incoming>,
    state: &AppState,
    user_plant_id: &str,
) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    state
        .portfolio
        .remove_plant(&claims.sub, user_plant_id)
        .await?;
    Ok(ok_json(&MessageResponse::new("Plant removed from portfolio")))
}
