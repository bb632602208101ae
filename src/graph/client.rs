use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::{DeviceDirectory, GraphError};
use crate::config::GraphConfig;
use crate::dto::IntuneDeviceDto;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Refresh tokens this long before Graph would reject them.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const DEVICE_FIELDS: &str = "id,deviceName,serialNumber,manufacturer,model,operatingSystem,osVersion,userPrincipalName,lastSyncDateTime,complianceState";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct DeviceList {
    value: Vec<IntuneDeviceDto>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    code: String,
    message: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// App-only Graph client using the OAuth2 client-credentials grant.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl GraphClient {
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.client_secret.as_deref(),
        ) else {
            return Err(GraphError::NotConfigured);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                config.authority.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, GraphError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting Graph access token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| GraphError::Token(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Graph token endpoint returned {}: {}", status, body);
            return Err(GraphError::Token(format!("token endpoint returned {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Token(e.to_string()))?;
        info!("Acquired Graph access token (expires in {}s)", token.expires_in);

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GraphError> {
        let token = self.access_token().await?;
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(GraphError::from);
        }

        let message = response
            .json::<GraphErrorBody>()
            .await
            .map(|body| format!("{}: {}", body.error.code, body.error.message))
            .unwrap_or_else(|_| status.to_string());
        Err(match status {
            StatusCode::NOT_FOUND => GraphError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GraphError::Forbidden(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GraphError::Timeout(message),
            _ => GraphError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl DeviceDirectory for GraphClient {
    async fn get_device(&self, device_id: &str) -> Result<IntuneDeviceDto, GraphError> {
        let url = format!("{}/deviceManagement/managedDevices/{}", self.base_url, device_id);
        self.get(&url, &[("$select", DEVICE_FIELDS.to_string())])
            .await
            .map_err(|err| match err {
                GraphError::NotFound(_) => {
                    GraphError::NotFound(format!("Intune device {} not found", device_id))
                }
                other => other,
            })
    }

    async fn find_devices(&self, filter: &str, top: u32) -> Result<Vec<IntuneDeviceDto>, GraphError> {
        let url = format!("{}/deviceManagement/managedDevices", self.base_url);
        let list: DeviceList = self
            .get(
                &url,
                &[
                    ("$filter", filter.to_string()),
                    ("$select", DEVICE_FIELDS.to_string()),
                    ("$top", top.to_string()),
                ],
            )
            .await?;
        Ok(list.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn requires_credentials() {
        let config = AppConfig::development().graph;
        assert!(matches!(GraphClient::new(&config), Err(GraphError::NotConfigured)));
    }

    #[test]
    fn builds_tenant_token_url() {
        let mut config = AppConfig::development().graph;
        config.tenant_id = Some("contoso-tenant".into());
        config.client_id = Some("client".into());
        config.client_secret = Some("secret".into());
        let client = GraphClient::new(&config).unwrap();
        assert!(client.token_url.ends_with("/contoso-tenant/oauth2/v2.0/token"));
        assert!(!client.base_url.ends_with('/'));
    }
}
