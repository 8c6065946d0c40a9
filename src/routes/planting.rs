//! GET /planting-info/{plant_name}?zone=
//!
//! Without a `zone` parameter the caller's saved zone is used.

use hyper::body::Incoming;
use hyper::{Request, Response};
use serde::Deserialize;

use crate::auth::TokenKind;
use crate::routes::response::{authenticate, decode_segment, ok_json, BoxBody};
use crate::server::AppState;
use crate::types::{GardenError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct PlantingQuery {
    #[serde(default)]
    pub zone: Option<String>,
}

impl PlantingQuery {
    pub fn parse(query: Option<&str>) -> Result<Self> {
        match query {
            Some(raw) => serde_urlencoded::from_str(raw)
                .map_err(|e| GardenError::InvalidInput(format!("Invalid query string: {}", e))),
            None => Ok(Self::default()),
        }
    }

    fn zone(&self) -> Option<&str> {
        self.zone.as_deref().map(str::trim).filter(|z| !z.is_empty())
    }
}

pub async fn handle_planting_info(
    req: Request<Incoming>,
    state: &AppState,
    raw_plant_name: &str,
) -> Result<Response<BoxBody>> {
    let claims = authenticate(&req, state, TokenKind::Access)?;
    let plant_name = decode_segment(raw_plant_name)?;
    let query = PlantingQuery::parse(req.uri().query())?;

    let zone = match query.zone() {
        Some(zone) => zone.to_string(),
        None => state
            .portfolio
            .store()
            .find_user(&claims.sub)
            .await?
            .and_then(|user| user.zone)
            .ok_or_else(|| {
                GardenError::InvalidInput(
                    "No zone given and no ZIP code saved; call /update-zip first".into(),
                )
            })?,
    };

    let info = state.portfolio.planting_info(&plant_name, &zone).await?;
    Ok(ok_json(&info))
}
