//! Runtime configuration for storyboard services and adapters.
//!
//! Every field has a default, so an empty JSON document or an empty
//! environment yields a working in-memory configuration.

use crate::backlog::adapters::postgres::BacklogPgPool;
use crate::backlog::domain::{AnchorPolicy, ParseAnchorPolicyError};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroU32;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_ENV: &str = "STORYBOARD_DATABASE_URL";
/// Environment variable overriding the connection pool size.
pub const POOL_SIZE_ENV: &str = "STORYBOARD_POOL_SIZE";
/// Environment variable overriding the anchor policy.
pub const ANCHOR_POLICY_ENV: &str = "STORYBOARD_ANCHOR_POLICY";
/// Environment variable overriding the bulk move size limit.
pub const MAX_BULK_SIZE_ENV: &str = "STORYBOARD_MAX_BULK_SIZE";

/// Errors raised while loading configuration or building resources from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidNumber {
        /// Offending variable.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// The anchor policy name is unknown.
    #[error(transparent)]
    AnchorPolicy(#[from] ParseAnchorPolicyError),

    /// A database pool was requested but no URL is configured.
    #[error("STORYBOARD_DATABASE_URL is not set")]
    MissingDatabaseUrl,

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Settings for the reorder planner and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderConfig {
    /// Handling of anchors outside the target group.
    #[serde(default)]
    pub anchor_policy: AnchorPolicy,
    /// Largest accepted `bulk_userstories` list.
    #[serde(default = "default_max_bulk_size")]
    pub max_bulk_size: usize,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            anchor_policy: AnchorPolicy::default(),
            max_bulk_size: default_max_bulk_size(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryboardConfig {
    /// `PostgreSQL` connection URL; `None` when running in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    /// Reorder settings.
    #[serde(default)]
    pub reorder: ReorderConfig,
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_max_size: default_pool_max_size(),
            reorder: ReorderConfig::default(),
        }
    }
}

impl StoryboardConfig {
    /// Loads defaults overlaid with the `STORYBOARD_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds a malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|key| env::var(key).ok())
    }

    /// Overlays values returned by `lookup` onto `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed.
    pub fn overlay(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(raw) = lookup(POOL_SIZE_ENV) {
            self.pool_max_size = parse_number::<NonZeroU32>(POOL_SIZE_ENV, &raw)?.get();
        }
        if let Some(raw) = lookup(ANCHOR_POLICY_ENV) {
            self.reorder.anchor_policy = raw.parse()?;
        }
        if let Some(raw) = lookup(MAX_BULK_SIZE_ENV) {
            self.reorder.max_bulk_size = parse_number(MAX_BULK_SIZE_ENV, &raw)?;
        }
        Ok(self)
    }

    /// Builds a Diesel connection pool for the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] without a URL,
    /// [`ConfigError::InvalidNumber`] for a zero pool size and
    /// [`ConfigError::Pool`] when the pool cannot connect.
    pub fn build_pool(&self) -> Result<BacklogPgPool, ConfigError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        if self.pool_max_size == 0 {
            return Err(ConfigError::InvalidNumber {
                key: POOL_SIZE_ENV,
                value: self.pool_max_size.to_string(),
            });
        }
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(self.pool_max_size)
            .build(manager)?;
        tracing::info!(max_size = self.pool_max_size, "database pool ready");
        Ok(pool)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: raw.to_owned(),
    })
}

const fn default_max_bulk_size() -> usize {
    500
}

const fn default_pool_max_size() -> u32 {
    8
}
