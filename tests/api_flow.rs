//! End-to-end API tests against a live server on an ephemeral port,
//! backed by the in-memory store and a fixed zone lookup.

use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Parser;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

use garden_tracker::{
    calendar::CalendarDataset,
    config::Args,
    portfolio::{MemoryStore, Portfolio},
    serve,
    zone::{validate_zip, ZoneLookup},
    AppState, GardenError,
};

struct FixedZone(&'static str);

#[async_trait]
impl ZoneLookup for FixedZone {
    async fn resolve_zone(&self, zip_code: &str) -> garden_tracker::Result<String> {
        validate_zip(zip_code)?;
        if zip_code == "00000" {
            return Err(GardenError::ZoneNotFound(zip_code.to_string()));
        }
        Ok(self.0.to_string())
    }
}

struct TestApp {
    base: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let args = Args::parse_from(["garden-tracker", "--dev-mode", "--jwt-secret", "api-test-secret"]);
        let calendar = CalendarDataset::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/planting_calendar.json"
        ))
        .unwrap();

        let portfolio = Portfolio::new(Arc::new(MemoryStore::new()), Arc::new(calendar));
        portfolio.sync_catalog_from_calendar().await.unwrap();

        let state = AppState::new(args, portfolio, Arc::new(FixedZone("7a")))
            .unwrap()
            .with_today(NaiveDate::from_ymd_opt(2025, 5, 21).unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(state)));

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(reqwest::Method::GET, path, token, None).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, token, Some(body)).await
    }

    /// Register and log in; returns (access, refresh)
    async fn login(&self, username: &str) -> (String, String) {
        let credentials = json!({ "username": username, "password": "hunter22" });
        let (status, _) = self.post("/register", None, credentials.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.post("/login", None, credentials).await;
        assert_eq!(status, StatusCode::OK);
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn test_index_and_api_prefix() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Garden Tracker API is live!");

    let (status, body) = app.get("/api/plants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "memory");
    assert_eq!(body["calendar_plants"], 10);

    let (status, _) = app.get("/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(reqwest::Method::DELETE, "/plants", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_registration_and_login_errors() {
    let app = TestApp::spawn().await;
    app.login("ada").await;

    let (status, body) = app
        .post("/register", None, json!({ "username": " ada ", "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    let (status, _) = app.post("/register", None, json!({ "username": "bob" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/login", None, json!({ "username": "ada", "password": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = app
        .post("/login", None, json!({ "username": "nobody", "password": "hunter22" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_policy() {
    let app = TestApp::spawn().await;
    let (access, refresh) = app.login("ada").await;

    let (status, body) = app.get("/me", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/me", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Refresh tokens cannot call protected endpoints and vice versa
    let (status, _) = app.get("/user/plants", Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app.post("/refresh", Some(&access), json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app.post("/refresh", Some(&refresh), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let renewed = body["access_token"].as_str().unwrap();

    let (status, body) = app.get("/me", Some(renewed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
    assert_eq!(body["zone"], Value::Null);
}

#[tokio::test]
async fn test_update_zip() {
    let app = TestApp::spawn().await;
    let (token, _) = app.login("ada").await;

    let (status, body) = app
        .post("/update-zip", Some(&token), json!({ "zip_code": "20001" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zone"], "7a");
    assert_eq!(body["zip_code"], "20001");

    let (status, _) = app
        .post("/update-zip", Some(&token), json!({ "zip_code": "2001" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/update-zip", Some(&token), json!({ "zip_code": "00000" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Failed updates keep the last good location
    let (_, body) = app.get("/me", Some(&token)).await;
    assert_eq!(body["zip_code"], "20001");
    assert_eq!(body["zone"], "7a");
}

#[tokio::test]
async fn test_portfolio_lifecycle() {
    let app = TestApp::spawn().await;
    let (token, _) = app.login("ada").await;

    let add = json!({ "plant_name": "tomato", "date_planted": "2025-05-01", "notes": "south bed" });
    let (status, first) = app.post("/user/plants", Some(&token), add.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["nickname"], "Tomato");
    assert_eq!(first["growth_days"], 75);
    assert_eq!(first["days_elapsed"], 20);
    assert_eq!(first["days_remaining"], 55);
    assert_eq!(first["expected_harvest"], "2025-07-15");

    let (status, second) = app.post("/user/plants", Some(&token), add).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["nickname"], "Tomato (Batch 2)");

    // A name outside the catalog creates an entry with no duration
    let (status, okra) = app
        .post(
            "/user/plants",
            Some(&token),
            json!({ "plant_name": "okra", "date_planted": "2025-05-10" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(okra["plant_name"], "Okra");
    assert_eq!(okra["days_remaining"], Value::Null);
    assert_eq!(okra["expected_harvest"], Value::Null);

    let (status, _) = app
        .post(
            "/user/plants",
            Some(&token),
            json!({ "plant_name": "basil", "date_planted": "May 1st" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = app.get("/user/plants", Some(&token)).await;
    assert_eq!(list.as_array().unwrap().len(), 3);

    let id = first["id"].as_str().unwrap();
    let (status, updated) = app
        .send(
            reqwest::Method::PUT,
            &format!("/user/plants/{}", id),
            Some(&token),
            Some(json!({ "notes": "staked" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "staked");
    assert_eq!(updated["date_planted"], "2025-05-01");

    let path = format!("/api/user/plants/{}", id);
    let (status, body) = app
        .send(reqwest::Method::DELETE, &path, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = app
        .send(reqwest::Method::DELETE, &path, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/user/plants", Some(&token)).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_by_catalog_id() {
    let app = TestApp::spawn().await;
    let (token, _) = app.login("ada").await;

    let (_, catalog) = app.get("/plants", None).await;
    let tomato = catalog
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["name"] == "Tomato")
        .unwrap();
    let tomato_id = tomato["id"].as_str().unwrap();

    let (status, first) = app
        .post(
            "/user/plants",
            Some(&token),
            json!({ "plant_id": tomato_id, "date_planted": "2025-05-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["plant_id"], tomato_id);
    assert_eq!(first["nickname"], "Tomato");
    assert_eq!(first["days_remaining"], 55);

    let (status, second) = app
        .post(
            "/user/plants",
            Some(&token),
            json!({ "plant_name": "Tomato", "date_planted": "2025-05-02" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["plant_id"], tomato_id);
    assert_eq!(second["nickname"], "Tomato (Batch 2)");

    let (status, _) = app
        .post(
            "/user/plants",
            Some(&token),
            json!({ "plant_id": "no-such-plant", "date_planted": "2025-05-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_plants_are_private() {
    let app = TestApp::spawn().await;
    let (ada, _) = app.login("ada").await;
    let (bob, _) = app.login("bob").await;

    let (_, plant) = app
        .post(
            "/user/plants",
            Some(&ada),
            json!({ "plant_name": "Basil", "date_planted": "2025-05-01" }),
        )
        .await;
    let path = format!("/user/plants/{}", plant["id"].as_str().unwrap());

    let (status, _) = app
        .send(reqwest::Method::PUT, &path, Some(&bob), Some(json!({ "notes": "mine now" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(reqwest::Method::DELETE, &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/user/plants", Some(&bob)).await;
    assert!(list.as_array().unwrap().is_empty());

    let (_, list) = app.get("/user/plants", Some(&ada)).await;
    assert_eq!(list[0]["notes"], "");
}

#[tokio::test]
async fn test_planting_info() {
    let app = TestApp::spawn().await;
    let (token, _) = app.login("ada").await;

    let (status, body) = app.get("/planting-info/tomato?zone=7A", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plant"], "Tomato");
    assert_eq!(body["zone"], "7a");
    assert_eq!(body["start_month"], "April");
    assert_eq!(body["end_month"], "June");
    assert_eq!(body["growth_duration_days"], 75);
    assert_eq!(body["zone_fallback"], false);

    // Unknown zone falls back to the first listed one
    let (status, body) = app
        .get("/planting-info/Green%20Bean?zone=10b", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zone"], "5a");
    assert_eq!(body["zone_fallback"], true);

    // No zone parameter and nothing saved yet
    let (status, _) = app.get("/planting-info/Tomato", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.post("/update-zip", Some(&token), json!({ "zip_code": "20001" }))
        .await;
    let (status, body) = app.get("/planting-info/Tomato", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zone"], "7a");

    let (status, body) = app.get("/planting-info/Kudzu?zone=7a", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Kudzu"));

    let (status, _) = app.get("/planting-info/Tomato?zone=7a", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let app = TestApp::spawn().await;
    let padding = "x".repeat(20 * 1024);
    let (status, _) = app
        .post("/register", None, json!({ "username": padding, "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
