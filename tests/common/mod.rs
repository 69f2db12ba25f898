#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::SessionManager;
use chirpy::startup::run;
use chirpy::state::AppState;
use chirpy::store::{InMemoryRefreshTokenStore, InMemoryUserStore};
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let sessions = SessionManager::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryRefreshTokenStore::new()),
        JWT_SECRET,
    );
    let state = AppState::new(sessions, POLKA_KEY);

    let server = run(listener, state).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the login body
    pub async fn signed_in(&self, email: &str, password: &str) -> Value {
        assert_eq!(201, self.register(email, password).await.status().as_u16());

        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
