use std::time::Duration;

use crate::auth::jwt::JwtConfig;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// A non-empty variable, or `None`.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for background jobs after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Base URL of the web client, used for checkout redirects.
    pub frontend_url: String,
    /// Chat sessions idle longer than this are deleted (default: `72`).
    pub chat_session_ttl_hours: i64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// External provider endpoints and credentials.
    pub providers: ProviderConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `8000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                    |
    /// | `FRONTEND_URL`           | `http://localhost:3000` |
    /// | `CHAT_SESSION_TTL_HOURS` | `72`                    |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "8000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let frontend_url = env_or("FRONTEND_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        let chat_session_ttl_hours: i64 = env_or("CHAT_SESSION_TTL_HOURS", "72")
            .parse()
            .expect("CHAT_SESSION_TTL_HOURS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            frontend_url,
            chat_session_ttl_hours,
            jwt: JwtConfig::from_env(),
            providers: ProviderConfig::from_env(),
        }
    }
}

/// Provider settings. A provider whose key is absent runs locally.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub sd_api_url: String,
    pub sd_api_key: Option<String>,
    pub conversation_api_url: String,
    pub conversation_api_key: Option<String>,
    pub conversation_workspace_id: Option<String>,
    pub stripe_api_url: String,
    pub stripe_secret_key: Option<String>,
    /// Empty means every webhook is rejected.
    pub stripe_webhook_secret: String,
    /// Upper bound on any single provider call.
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// | Env Var                     | Default                         |
    /// |-----------------------------|---------------------------------|
    /// | `SD_API_URL`                | `https://api.stability.ai`      |
    /// | `SD_API_KEY`                | --                              |
    /// | `CONVERSATION_API_URL`      | `https://studio.inworld.ai/v1`  |
    /// | `CONVERSATION_API_KEY`      | --                              |
    /// | `CONVERSATION_WORKSPACE_ID` | --                              |
    /// | `STRIPE_API_URL`            | `https://api.stripe.com/v1`     |
    /// | `STRIPE_SECRET_KEY`         | --                              |
    /// | `STRIPE_WEBHOOK_SECRET`     | empty                           |
    /// | `PROVIDER_TIMEOUT_SECS`     | `30`                            |
    pub fn from_env() -> Self {
        Self {
            sd_api_url: env_or("SD_API_URL", "https://api.stability.ai"),
            sd_api_key: env_opt("SD_API_KEY"),
            conversation_api_url: env_or("CONVERSATION_API_URL", "https://studio.inworld.ai/v1"),
            conversation_api_key: env_opt("CONVERSATION_API_KEY"),
            conversation_workspace_id: env_opt("CONVERSATION_WORKSPACE_ID"),
            stripe_api_url: env_or("STRIPE_API_URL", "https://api.stripe.com/v1"),
            stripe_secret_key: env_opt("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: env_or("STRIPE_WEBHOOK_SECRET", ""),
            timeout_secs: env_or("PROVIDER_TIMEOUT_SECS", "30")
                .parse()
                .expect("PROVIDER_TIMEOUT_SECS must be a valid u64"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
