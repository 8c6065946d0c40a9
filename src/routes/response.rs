//! Response and request helpers shared by every route
//!
//! All JSON responses carry permissive CORS headers. Errors are rendered as
//! `{"error": message}` with the status from `GardenError::status_code`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::auth::{extract_token_from_header, Claims, TokenKind};
use crate::server::AppState;
use crate::types::{GardenError, Result};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest JSON request body accepted
pub const MAX_BODY_BYTES: usize = 10 * 1024;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

const SERIALIZE_FAILURE_BODY: &str = r#"{"error":"Failed to serialize response"}"#;

/// Serialize `body` as JSON; a body that cannot be serialized becomes a 500
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    match serde_json::to_string(body) {
        Ok(json) => raw_json_response(status, json),
        Err(e) => {
            error!(status = %status.as_u16(), error = %e, "Failed to serialize response");
            raw_json_response(StatusCode::INTERNAL_SERVER_ERROR, SERIALIZE_FAILURE_BODY)
        }
    }
}

fn raw_json_response(status: StatusCode, json: impl Into<Bytes>) -> Response<BoxBody> {
    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    add_cors_headers(headers);
    response
}

pub fn ok_json<T: Serialize>(body: &T) -> Response<BoxBody> {
    json_response(StatusCode::OK, body)
}

/// Render an error, logging server-side failures
pub fn error_response(err: &GardenError) -> Response<BoxBody> {
    let status = err.status_code();
    if err.is_server_error() {
        error!(status = %status.as_u16(), error = %err, "Request failed");
    } else {
        warn!(status = %status.as_u16(), error = %err, "Request rejected");
    }

    json_response(
        status,
        &ErrorResponse {
            error: err.to_string(),
        },
    )
}

/// Collapse a handler result into a response
pub fn respond(result: Result<Response<BoxBody>>) -> Response<BoxBody> {
    result.unwrap_or_else(|err| error_response(&err))
}

pub fn cors_preflight() -> Response<BoxBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    add_cors_headers(headers);
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    response
}

pub fn not_found(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: format!("No route for {}", path),
        },
    )
}

pub fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            error: "Method not allowed".into(),
        },
    )
}

/// Read and decode a JSON body of at most `MAX_BODY_BYTES`
pub async fn parse_json_body<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                GardenError::InvalidInput("Request body too large".into())
            } else {
                GardenError::InvalidInput(format!("Failed to read body: {}", e))
            }
        })?;

    decode_json(&body.to_bytes())
}

pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| GardenError::InvalidInput(format!("Invalid JSON body: {}", e)))
}

pub fn get_auth_header<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Verify the bearer token on a request
pub fn authenticate<B>(req: &Request<B>, state: &AppState, kind: TokenKind) -> Result<Claims> {
    let token = extract_token_from_header(get_auth_header(req))
        .ok_or_else(|| GardenError::InvalidToken("Missing Authorization header".into()))?;

    state.jwt.verify_token(token, kind)
}

/// Decode a percent-encoded path segment
pub fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| GardenError::InvalidInput("Path segment is not valid UTF-8".into()))
}
