//! API Config

use clap::Args;

/// Remote storefront API settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront API
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:8000/api")]
    pub api_url: String,

    /// Bearer token sent with order submissions
    #[arg(long, env = "STOREFRONT_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "STOREFRONT_HTTP_TIMEOUT_SECONDS", default_value_t = 10)]
    pub http_timeout_seconds: u64,
}
