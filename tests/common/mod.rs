#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;

use clientbook::config::{self, Config};
use clientbook::db::MemoryStore;
use clientbook::state::AppState;

pub const PASSWORD: &str = "password123";

/// A running server on an ephemeral port, backed by an in-memory store and
/// a throwaway upload directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Register and log in, return the bearer token.
    pub async fn sign_up(&self, name: &str, email: &str) -> String {
        let (body, status) = self.register(name, email, PASSWORD).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let (body, status) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST /api/customers as multipart, with an optional image part.
    pub async fn create_customer(
        &self,
        token: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &'static [u8])>,
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/customers"))
            .bearer_auth(token)
            .multipart(customer_form(fields, image))
            .send()
            .await
            .expect("create customer failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn upload_image(
        &self,
        token: &str,
        customer_id: &str,
        image: Option<(&str, &'static [u8])>,
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(&format!("/api/customers/{customer_id}/image")))
            .bearer_auth(token)
            .multipart(customer_form(&[], image))
            .send()
            .await
            .expect("upload image failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub fn stored(&self, filename: &str) -> PathBuf {
        self.upload_dir.join(filename)
    }
}

fn customer_form(fields: &[(&str, &str)], image: Option<(&str, &'static [u8])>) -> Form {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    if let Some((filename, bytes)) = image {
        form = form.part("file", Part::bytes(bytes).file_name(filename.to_string()));
    } else {
        // Keep the body a valid multipart document even with no parts.
        form = form.text("note", "");
    }
    form
}

pub fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: None,
        jwt_secret: "integration-test-secret".to_string(),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        upload_dir,
        token_ttl_hours: 1,
        max_upload_size: 1024 * 1024,
        public_paths: config::default_public_paths(),
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let upload_dir = dir.path().join("uploads");

    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        test_config(upload_dir.clone()),
        store.clone(),
        store,
    ));
    let app = clientbook::build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr,
        client: Client::new(),
        upload_dir,
        _dir: dir,
    }
}
