//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one task per connection. Every route is served
//! both at the root and under an `/api` prefix.

use chrono::NaiveDate;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::portfolio::Portfolio;
use crate::routes::{self, respond, BoxBody};
use crate::types::{GardenError, Result};
use crate::zone::ZoneLookup;

const API_PREFIX: &str = "/api";

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Catalog, user plants and the planting calendar
    pub portfolio: Portfolio,
    /// ZIP → hardiness zone resolution
    pub zones: Arc<dyn ZoneLookup>,
    pub jwt: JwtValidator,
    pub started_at: Instant,
    /// Overrides the calendar date used for harvest projections
    pub fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(args: Args, portfolio: Portfolio, zones: Arc<dyn ZoneLookup>) -> Result<Self> {
        let secret = args
            .jwt_secret()
            .ok_or_else(|| GardenError::Config("JWT_SECRET is not set".into()))?;
        let jwt = JwtValidator::new(&secret, args.jwt_expiry_seconds, args.refresh_expiry_seconds)?;

        Ok(Self {
            args,
            portfolio,
            zones,
            jwt,
            started_at: Instant::now(),
            fixed_today: None,
        })
    }

    /// Pin "today" for projections
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Date harvest projections are computed against
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Bind the configured address and serve forever
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;
    serve(listener, state).await
}

/// Serve connections from an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    info!(
        addr = %listener.local_addr()?,
        store = state.portfolio.store().backend(),
        "Garden tracker listening"
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - do not use in production");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Strip an optional `/api` prefix
fn route_path(path: &str) -> &str {
    match path.strip_prefix(API_PREFIX) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Match `{prefix}{segment}` where the segment is a single non-empty component
fn path_param<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|segment| !segment.is_empty() && !segment.contains('/'))
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!(peer = %addr, method = %method, path = %path, "Request");

    if method == Method::OPTIONS {
        return Ok(routes::cors_preflight());
    }

    let route = route_path(&path);
    let state = state.as_ref();

    if let Some(id) = path_param(route, "/user/plants/") {
        let response = match method {
            Method::PUT => respond(routes::handle_update_user_plant(req, state, id).await),
            Method::DELETE => respond(routes::handle_delete_user_plant(req, state, id).await),
            _ => routes::method_not_allowed(),
        };
        return Ok(response);
    }

    if let Some(plant_name) = path_param(route, "/planting-info/") {
        let response = match method {
            Method::GET => respond(routes::handle_planting_info(req, state, plant_name).await),
            _ => routes::method_not_allowed(),
        };
        return Ok(response);
    }

    let response = match (&method, route) {
        (&Method::GET, "/") => routes::index(),
        (&Method::GET, "/health") => routes::health_check(state),
        (&Method::GET, "/version") => routes::version_info(),

        (&Method::POST, "/register") => respond(routes::handle_register(req, state).await),
        (&Method::POST, "/login") => respond(routes::handle_login(req, state).await),
        (&Method::POST, "/refresh") => respond(routes::handle_refresh(req, state).await),
        (&Method::GET, "/me") => respond(routes::handle_me(req, state).await),
        (&Method::POST, "/update-zip") => respond(routes::handle_update_zip(req, state).await),

        (&Method::GET, "/plants") => respond(routes::handle_list_catalog(state).await),
        (&Method::GET, "/user/plants") => {
            respond(routes::handle_list_user_plants(req, state).await)
        }
        (&Method::POST, "/user/plants") => {
            respond(routes::handle_add_user_plant(req, state).await)
        }

        // Method not allowed
        (_, "/")
        | (_, "/health")
        | (_, "/version")
        | (_, "/register")
        | (_, "/login")
        | (_, "/refresh")
        | (_, "/me")
        | (_, "/update-zip")
        | (_, "/plants")
        | (_, "/user/plants") => routes::method_not_allowed(),

        _ => routes::not_found(&path),
    };

    Ok(response)
}
