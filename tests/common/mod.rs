#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use serde_json::{json, Value};
use user_auth::auth::MIN_BCRYPT_COST;
use user_auth::configuration::{
    ApplicationSettings, DatabaseSettings, HashingSettings, JwtSettings, Settings, StorageBackend,
};
use user_auth::repository::InMemoryUserRepository;
use user_auth::startup::run;

pub const PASSWORD: &str = "Str0ng@Pass";
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn test_settings() -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            allowed_origin: ALLOWED_ORIGIN.to_string(),
            secure_cookies: false,
        },
        database: DatabaseSettings {
            backend: StorageBackend::Memory,
            ..Default::default()
        },
        jwt: JwtSettings {
            access_token_secret: "integration-access-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_secret: "integration-refresh-secret".to_string(),
            refresh_token_expiry: 1_296_000,
            issuer: "user_auth".to_string(),
        },
        hashing: HashingSettings {
            cost: MIN_BCRYPT_COST,
        },
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, Arc::new(InMemoryUserRepository::new()), &test_settings())
        .expect("Failed to create server");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

pub fn registration_body(email: &str, mobile_number: &str) -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "email": email,
        "mobileNumber": mobile_number,
        "password": PASSWORD,
        "confirmPassword": PASSWORD
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/user{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, email: &str, mobile_number: &str) -> reqwest::Response {
        self.post_json("/registerUser", &registration_body(email, mobile_number))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/login", &json!({ "email": email, "password": password }))
            .await
    }

    /// Register then log in; returns the login body
    pub async fn signed_in(&self, email: &str, mobile_number: &str) -> Value {
        assert_eq!(201, self.register(email, mobile_number).await.status().as_u16());
        let response = self.login(email, PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}

pub fn token(body: &Value, key: &str) -> String {
    body[key].as_str().expect("token missing from body").to_string()
}
