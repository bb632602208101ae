#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use asset_inventory::auth::TokenValidator;
use asset_inventory::config::AppConfig;
use asset_inventory::database::MemoryStore;
use asset_inventory::graph::DisabledDirectory;
use asset_inventory::routes;
use asset_inventory::state::AppState;
use reqwest::StatusCode;
use serde_json::Value;

pub const DEV_SECRET: &str = "integration-test-secret";

/// The API on a free local port, backed by an empty in-memory store. The
/// server task lives as long as the test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::with_config(AppConfig::development()).await
    }

    /// Authentication enabled with the shared-secret validator.
    pub async fn with_auth() -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.auth.enabled = true;
        config.security.auth.dev_secret = Some(DEV_SECRET.to_string());
        Self::with_config(config).await
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let tokens = config
            .security
            .auth
            .dev_secret
            .as_deref()
            .filter(|_| config.security.auth.enabled)
            .map(|secret| Arc::new(TokenValidator::shared_secret(secret)));
        let state = AppState::new(
            Arc::new(config),
            Arc::new(MemoryStore::new()),
            Arc::new(DisabledDirectory),
            tokens,
        );

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let app = routes::app(state).into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        read(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(body).send().await?;
        read(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.put(self.url(path)).json(body).send().await?;
        read(res).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).send().await?;
        read(res).await
    }
}

/// Status plus JSON body (`Null` for empty bodies).
pub async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let bytes = res.bytes().await?;
    if bytes.is_empty() {
        return Ok((status, Value::Null));
    }
    let body = serde_json::from_slice(&bytes)
        .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
    Ok((status, body))
}

pub fn laptop(serial: &str) -> Value {
    serde_json::json!({
        "assetCodePrefix": "LAP",
        "category": "Laptop",
        "serialNumber": serial,
        "assetName": "Latitude 5440",
        "brand": "Dell",
        "model": "Latitude 5440",
        "purchaseDate": "2024-02-01",
        "warrantyExpiry": "2027-02-01",
    })
}
