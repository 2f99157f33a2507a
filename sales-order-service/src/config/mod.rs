//! Configuration module for sales-order-service.

use order_engine::PageLimits;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct SalesOrderConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            default_per_page: limits.default_per_page,
            max_per_page: limits.max_per_page,
        }
    }
}

impl ListingConfig {
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_per_page: self.default_per_page,
            max_per_page: self.max_per_page,
        }
    }
}

/// Parse `key` when set and non-empty; an unparsable value is a config error.
fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e))
        }),
        _ => Ok(default),
    }
}

impl SalesOrderConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let listing_defaults = ListingConfig::default();

        let listing = ListingConfig {
            default_per_page: env_or("DEFAULT_PER_PAGE", listing_defaults.default_per_page)?,
            max_per_page: env_or("MAX_PER_PAGE", listing_defaults.max_per_page)?,
        };
        if listing.max_per_page == 0 || listing.default_per_page > listing.max_per_page {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DEFAULT_PER_PAGE ({}) must be between 1 and MAX_PER_PAGE ({})",
                listing.default_per_page,
                listing.max_per_page
            )));
        }

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "sales-order-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required"))
                })?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", 2)?,
            },
            listing,
        })
    }
}
