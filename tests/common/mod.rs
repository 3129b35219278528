// Test helpers are intentionally partially used
#![allow(dead_code)]

use rentcars_api::create_router;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

// ============================================================================
// Test Setup
// ============================================================================

/// Point the router at in-process backends so no database or Redis is needed.
pub fn setup_test_env() {
    // ---
    INIT.call_once(|| {
        // ---
        std::env::set_var("AXUM_STORAGE_TYPE", "memory");
        std::env::set_var("AXUM_SESSION_TYPE", "memory");
        set_env_if_unset!("AXUM_METRICS_TYPE", "noop");

        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            std::env::set_var("RUST_LOG", "debug");
            std::env::set_var("NO_COLOR", "1");
        }
    });
}

/// A router bound to an ephemeral port with its own fresh in-memory store.
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --
        setup_test_env();

        let app = create_router()
            .await
            .expect("Should be able to create router");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        // Redirects are part of the contract under test; never follow them.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("client builds");

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    // ========================================================================
    // API shortcuts
    // ========================================================================

    /// Registers `phone` and returns its bearer token.
    pub async fn register(&self, phone: &str) -> String {
        // ---
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "first_name": "Giorgi",
                "last_name": "Test",
                "email": format!("{phone}@example.com"),
                "phone_number": phone,
                "password": "hunter22",
            }))
            .send()
            .await
            .expect("register request");
        assert_eq!(res.status(), StatusCode::CREATED, "registration failed");

        let body: Value = res.json().await.expect("register body");
        body["data"]["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }

    /// Lists a car owned by the token's user and returns its id.
    pub async fn create_car(&self, token: &str, overrides: Value) -> String {
        // ---
        let res = self
            .client
            .post(self.url("/cars"))
            .bearer_auth(token)
            .json(&car_body(overrides))
            .send()
            .await
            .expect("create car request");
        assert_eq!(res.status(), StatusCode::CREATED, "car creation failed");

        let body: Value = res.json().await.expect("car body");
        body["data"]["id"].as_str().expect("car id").to_string()
    }

    pub async fn get_car(&self, car_id: &str) -> Response {
        // ---
        self.client
            .get(self.url(&format!("/cars/{car_id}")))
            .send()
            .await
            .expect("get car request")
    }

    pub async fn rent(&self, token: &str, car_id: &str, start: &str, end: &str) -> Response {
        // ---
        self.client
            .post(self.url(&format!("/cars/{car_id}/rent")))
            .bearer_auth(token)
            .json(&json!({ "start_date": start, "end_date": end }))
            .send()
            .await
            .expect("rent request")
    }

    pub async fn toggle_like(&self, token: &str, car_id: &str) -> Response {
        // ---
        self.client
            .post(self.url(&format!("/cars/{car_id}/like")))
            .bearer_auth(token)
            .send()
            .await
            .expect("like request")
    }

    pub async fn profile(&self, token: &str) -> Value {
        // ---
        let res = self
            .client
            .get(self.url("/profile"))
            .bearer_auth(token)
            .send()
            .await
            .expect("profile request");
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.expect("profile body")
    }
}

/// A valid listing body; `overrides` replaces individual fields.
pub fn car_body(overrides: Value) -> Value {
    // ---
    let mut body = json!({
        "brand": "Toyota",
        "model": "Camry",
        "year": 2020,
        "daily_rental_price": "50.00",
        "capacity": 5,
        "transmission": "automatic",
        "city": "Tbilisi",
        "fuel_tank": 60,
        "image1": "car_images/camry.jpg",
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    body
}
