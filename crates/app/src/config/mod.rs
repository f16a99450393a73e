//! Application configuration
//!
//! Every setting can come from a flag, the environment, or a `.env` file.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

pub mod api;

pub use api::ApiConfig;

/// Storefront application settings.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Remote API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Local storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Checkout settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Where session state is kept.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding the saved cart and local order log
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = ".storefront")]
    pub data_dir: PathBuf,

    /// Read the catalog from a JSON or YAML file instead of the API
    #[arg(long, env = "STOREFRONT_CATALOG_FILE")]
    pub catalog_file: Option<PathBuf>,
}

/// Order submission target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SubmissionMode {
    /// POST orders to the remote order API.
    #[default]
    Remote,

    /// Append orders to the local order log.
    Local,
}

/// Checkout and pricing settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Where placed orders are recorded (remote, local)
    #[arg(long, env = "STOREFRONT_SUBMISSION", value_enum, default_value_t = SubmissionMode::Remote)]
    pub submission: SubmissionMode,

    /// Flat delivery fee added to every order
    #[arg(long, env = "STOREFRONT_DELIVERY_FEE", default_value = "5.00")]
    pub delivery_fee: Decimal,

    /// ISO currency code used to display amounts (USD, GBP, EUR)
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "USD")]
    pub currency: String,
}

/// How diagnostics are written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One line per event, for a terminal.
    #[default]
    Compact,

    /// One JSON object per event, for log collectors.
    Json,
}

/// Diagnostics settings. Command output on stdout is unaffected.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Minimum level of diagnostics on stderr; `RUST_LOG` directives take precedence
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Diagnostics format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
