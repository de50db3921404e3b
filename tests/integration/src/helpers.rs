//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers and making HTTP requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use gate_api::{create_app, create_app_state_with};
use gate_common::AppConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{test_config, RecordingEndpoints, RecordingNotifier, API_TOKEN};

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub endpoints: Arc<RecordingEndpoints>,
    pub notifier: Arc<RecordingNotifier>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let endpoints = Arc::new(RecordingEndpoints::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let state = create_app_state_with(config, endpoints.clone(), notifier.clone()).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            endpoints,
            notifier,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {API_TOKEN}"))
    }

    fn acting(&self, builder: RequestBuilder, actor: i64) -> RequestBuilder {
        self.authed(builder).header("X-Principal-Id", actor.to_string())
    }

    /// Make an unauthenticated GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with the API token
    pub async fn get_auth(&self, path: &str) -> Result<Response> {
        Ok(self.authed(self.client.get(self.url(path))).send().await?)
    }

    /// Make a POST request with the API token
    pub async fn post_auth<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self
            .authed(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request on behalf of `actor`
    pub async fn post_as<T: Serialize>(&self, path: &str, actor: i64, body: &T) -> Result<Response> {
        Ok(self
            .acting(self.client.post(self.url(path)), actor)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request on behalf of `actor`
    pub async fn put_as<T: Serialize>(&self, path: &str, actor: i64, body: &T) -> Result<Response> {
        Ok(self
            .acting(self.client.put(self.url(path)), actor)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with the API token
    pub async fn put_auth<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self
            .authed(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request on behalf of `actor`
    pub async fn delete_as(&self, path: &str, actor: i64) -> Result<Response> {
        Ok(self
            .acting(self.client.delete(self.url(path)), actor)
            .send()
            .await?)
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
