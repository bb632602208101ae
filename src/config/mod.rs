use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

/// Fixed-window limiter settings for one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub name: String,
    pub permit_limit: u32,
    pub window_secs: u64,
    pub queue_limit: u32,
}

impl RateLimitPolicy {
    pub fn new(name: &str, permit_limit: u32, window_secs: u64, queue_limit: u32) -> Self {
        Self {
            name: name.to_string(),
            permit_limit,
            window_secs,
            queue_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub general_limit: RateLimitPolicy,
    pub external_limit: RateLimitPolicy,
    pub bulk_limit: RateLimitPolicy,
    pub max_request_size_bytes: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_bulk_quantity: u32,
    /// Peers whose `X-Forwarded-For`/`X-Real-IP` headers are believed when
    /// keying rate limits. Everyone else is keyed by socket address.
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
}

/// Microsoft Entra ID settings used to validate incoming bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub enabled: bool,
    pub authority: String,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    /// HS256 secret for local tokens; never used when a tenant is configured.
    #[serde(skip_serializing)]
    pub dev_secret: Option<String>,
}

/// App-only credentials for Microsoft Graph (Intune device lookups).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub base_url: String,
    pub authority: String,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub timeout_secs: u64,
}

impl GraphConfig {
    pub fn is_configured(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Some(port) = env_value::<u16>("API_PORT").or_else(|| env_value("PORT")) {
            self.server.port = port;
        }
        override_from_env(&mut self.server.host, "API_HOST");

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        override_from_env(&mut self.database.max_connections, "DATABASE_MAX_CONNECTIONS");
        override_from_env(&mut self.database.connection_timeout, "DATABASE_CONNECTION_TIMEOUT");
        override_from_env(&mut self.database.run_migrations, "DATABASE_RUN_MIGRATIONS");

        // API
        override_from_env(&mut self.api.enable_rate_limiting, "API_ENABLE_RATE_LIMITING");
        override_from_env(&mut self.api.general_limit.permit_limit, "RATE_LIMIT_GENERAL_PER_MINUTE");
        override_from_env(&mut self.api.external_limit.permit_limit, "RATE_LIMIT_EXTERNAL_PER_MINUTE");
        override_from_env(&mut self.api.bulk_limit.permit_limit, "RATE_LIMIT_BULK_PER_MINUTE");
        override_from_env(&mut self.api.max_request_size_bytes, "API_MAX_REQUEST_SIZE_BYTES");
        if let Ok(v) = env::var("RATE_LIMIT_TRUSTED_PROXIES") {
            self.api.trusted_proxies = parse_ip_list(&v);
        }

        // Security
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        override_from_env(&mut self.security.auth.enabled, "AUTH_ENABLED");
        override_from_env(&mut self.security.auth.authority, "AZURE_AUTHORITY");
        if let Ok(v) = env::var("AZURE_TENANT_ID") {
            self.security.auth.tenant_id = Some(v.clone());
            self.graph.tenant_id = Some(v);
        }
        if let Ok(v) = env::var("AZURE_CLIENT_ID") {
            self.security.auth.client_id = Some(v);
        }
        if let Ok(v) = env::var("AUTH_DEV_SECRET") {
            self.security.auth.dev_secret = Some(v);
        }

        // Graph
        override_from_env(&mut self.graph.base_url, "GRAPH_BASE_URL");
        override_from_env(&mut self.graph.authority, "AZURE_AUTHORITY");
        if let Ok(v) = env::var("GRAPH_CLIENT_ID") {
            self.graph.client_id = Some(v);
        }
        if let Ok(v) = env::var("GRAPH_CLIENT_SECRET") {
            self.graph.client_secret = Some(v);
        }
        override_from_env(&mut self.graph.timeout_secs, "GRAPH_TIMEOUT_SECS");

        self
    }

    fn defaults(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                general_limit: RateLimitPolicy::new("general", 100, 60, 10),
                external_limit: RateLimitPolicy::new("external", 20, 60, 5),
                bulk_limit: RateLimitPolicy::new("bulk", 5, 60, 2),
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                default_page_size: 25,
                max_page_size: 200,
                max_bulk_quantity: 100,
                trusted_proxies: vec![],
            },
            security: SecurityConfig {
                cors_origins: vec![],
                auth: AuthConfig {
                    enabled: true,
                    authority: "https://login.microsoftonline.com".to_string(),
                    tenant_id: None,
                    client_id: None,
                    dev_secret: None,
                },
            },
            graph: GraphConfig {
                base_url: "https://graph.microsoft.com/v1.0".to_string(),
                authority: "https://login.microsoftonline.com".to_string(),
                tenant_id: None,
                client_id: None,
                client_secret: None,
                timeout_secs: 30,
            },
        }
    }

    pub fn development() -> Self {
        let mut config = Self::defaults(Environment::Development);
        config.security.auth.enabled = false;
        config.security.cors_origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ];
        config
    }

    pub fn staging() -> Self {
        let mut config = Self::defaults(Environment::Staging);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::defaults(Environment::Production);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.run_migrations = false;
        config
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {key} (`{raw}`)");
            None
        }
    }
}

/// Comma-separated IP addresses; invalid entries are logged and skipped.
fn parse_ip_list(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!("Ignoring invalid trusted proxy address `{}`", s);
                None
            }
        })
        .collect()
}

fn override_from_env<T: FromStr>(target: &mut T, key: &str) {
    if let Some(value) = env_value(key) {
        *target = value;
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert!(!config.security.auth.enabled);
        assert_eq!(config.api.general_limit.permit_limit, 100);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.is_development());
        assert!(config.security.auth.enabled);
        assert!(config.api.enable_rate_limiting);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn rate_limit_policies_match_published_limits() {
        let api = AppConfig::staging().api;
        assert_eq!(api.general_limit, RateLimitPolicy::new("general", 100, 60, 10));
        assert_eq!(api.external_limit, RateLimitPolicy::new("external", 20, 60, 5));
        assert_eq!(api.bulk_limit, RateLimitPolicy::new("bulk", 5, 60, 2));
    }

    #[test]
    fn trusted_proxies_skip_invalid_entries() {
        let proxies = parse_ip_list("10.0.0.1, not-an-ip,,::1");
        assert_eq!(proxies, vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]);
        assert!(AppConfig::production().api.trusted_proxies.is_empty());
    }

    #[test]
    fn graph_requires_full_credentials() {
        let mut graph = AppConfig::development().graph;
        assert!(!graph.is_configured());
        graph.tenant_id = Some("t".into());
        graph.client_id = Some("c".into());
        assert!(!graph.is_configured());
        graph.client_secret = Some("s".into());
        assert!(graph.is_configured());
    }
}
