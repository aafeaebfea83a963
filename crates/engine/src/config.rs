//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARULA_API_BASE_URL` - Base URL of the commerce API (no trailing slash)
//!
//! ## Optional
//! - `MARULA_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `MARULA_DELIVERY_FEE_STANDARD` - Flat standard delivery fee (default: 250)
//! - `MARULA_DELIVERY_FEE_EXPRESS` - Flat express delivery fee (default: 600)

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use marula_core::DeliveryOption;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FEE_STANDARD: &str = "250";
const DEFAULT_FEE_EXPRESS: &str = "600";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Flat delivery fees per delivery option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFees {
    pub standard: Decimal,
    pub express: Decimal,
}

impl DeliveryFees {
    /// The fee charged for the given delivery option.
    #[must_use]
    pub const fn fee_for(&self, option: DeliveryOption) -> Decimal {
        match option {
            DeliveryOption::Standard => self.standard,
            DeliveryOption::Express => self.express,
        }
    }
}

impl Default for DeliveryFees {
    fn default() -> Self {
        Self {
            standard: Decimal::from(250),
            express: Decimal::from(600),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the commerce API.
    pub api_base_url: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Flat delivery fees.
    pub delivery_fees: DeliveryFees,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = required("MARULA_API_BASE_URL")?;

        let timeout_secs = match std::env::var("MARULA_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("MARULA_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            delivery_fees: DeliveryFees {
                standard: optional_decimal("MARULA_DELIVERY_FEE_STANDARD", DEFAULT_FEE_STANDARD)?,
                express: optional_decimal("MARULA_DELIVERY_FEE_EXPRESS", DEFAULT_FEE_EXPRESS)?,
            },
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_decimal(name: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}
